//! Tests for role-based authorization
//! Verifies the capability table and the roles reachable through the admin API

use proptest::prelude::*;
use shared::{Action, Role};

fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(vec![Role::Client, Role::Supervisor, Role::Admin])
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::ALL.to_vec())
}

fn privilege(role: Role) -> u8 {
    match role {
        Role::Client => 0,
        Role::Supervisor => 1,
        Role::Admin => 2,
    }
}

proptest! {
    /// A higher role can do everything a lower role can
    #[test]
    fn test_roles_are_monotonic(
        lower in role_strategy(),
        higher in role_strategy(),
        action in action_strategy(),
    ) {
        prop_assume!(privilege(lower) <= privilege(higher));
        if lower.can(action) {
            prop_assert!(higher.can(action));
        }
    }

    /// Viewing is open to every role
    #[test]
    fn test_every_role_can_view(role in role_strategy()) {
        prop_assert!(role.can(Action::ViewSites));
        prop_assert!(role.can(Action::ViewComposter));
        prop_assert!(role.can(Action::ViewReport));
        prop_assert!(role.can(Action::ViewNotifications));
    }
}

mod capability_table {
    use super::*;

    #[test]
    fn only_admin_manages() {
        for action in [
            Action::ManageSites,
            Action::ManageComposters,
            Action::ManageNorms,
            Action::ManageUsers,
        ] {
            assert!(Role::Admin.can(action));
            assert!(!Role::Supervisor.can(action));
            assert!(!Role::Client.can(action));
        }
    }

    #[test]
    fn supervisors_handle_readings() {
        for action in [Action::RecordReading, Action::EditReading, Action::DeleteReading] {
            assert!(Role::Supervisor.can(action));
            assert!(Role::Admin.can(action));
            assert!(!Role::Client.can(action));
        }
    }

    #[test]
    fn only_admin_sees_every_composter() {
        assert!(Role::Admin.sees_all_composters());
        assert!(!Role::Supervisor.sees_all_composters());
        assert!(!Role::Client.sees_all_composters());
    }
}
