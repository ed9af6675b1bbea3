//! User and role models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account on the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Short user reference embedded in other resources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Platform roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Client,
    Supervisor,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Supervisor => "SUPERVISOR",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CLIENT" => Some(Role::Client),
            "SUPERVISOR" => Some(Role::Supervisor),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Capability table: whether this role may perform `action`
    pub fn can(self, action: Action) -> bool {
        match action {
            Action::ViewSites
            | Action::ViewComposter
            | Action::ViewReport
            | Action::ViewNotifications => true,
            Action::RecordReading | Action::EditReading | Action::DeleteReading => {
                matches!(self, Role::Supervisor | Role::Admin)
            }
            Action::ManageSites
            | Action::ManageComposters
            | Action::ManageNorms
            | Action::ManageUsers => self == Role::Admin,
        }
    }

    /// Whether the role sees every composter regardless of assignment
    pub fn sees_all_composters(self) -> bool {
        self == Role::Admin
    }

    /// Roles an administrator may hand out through the API
    pub fn is_assignable(self) -> bool {
        matches!(self, Role::Client | Role::Supervisor)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Actions gated by role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ViewSites,
    ViewComposter,
    ViewReport,
    ViewNotifications,
    RecordReading,
    EditReading,
    DeleteReading,
    ManageSites,
    ManageComposters,
    ManageNorms,
    ManageUsers,
}

impl Action {
    pub const ALL: [Action; 11] = [
        Action::ViewSites,
        Action::ViewComposter,
        Action::ViewReport,
        Action::ViewNotifications,
        Action::RecordReading,
        Action::EditReading,
        Action::DeleteReading,
        Action::ManageSites,
        Action::ManageComposters,
        Action::ManageNorms,
        Action::ManageUsers,
    ];
}
