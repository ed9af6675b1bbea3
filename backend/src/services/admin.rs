//! Administration service: user roles and composter assignments

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Role, User, UserRow, UserSummary};
use crate::services::composter::SiteRef;

/// Admin service
#[derive(Clone)]
pub struct AdminService {
    db: PgPool,
}

/// Short reference to a composter
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ComposterRef {
    pub id: Uuid,
    pub name: String,
}

/// A non-admin user with the composters assigned to them
#[derive(Debug, Clone, Serialize)]
pub struct ManagedUser {
    #[serde(flatten)]
    pub user: User,
    pub composters: Vec<ComposterRef>,
}

/// A composter with its site and assigned users
#[derive(Debug, Clone, Serialize)]
pub struct ManagedComposter {
    pub id: Uuid,
    pub name: String,
    pub site: SiteRef,
    pub assigned_users: Vec<UserSummary>,
}

/// Replacement set of composters for a user
#[derive(Debug, Deserialize)]
pub struct AssignmentsInput {
    pub composter_ids: Vec<Uuid>,
}

/// New role for a user
#[derive(Debug, Deserialize)]
pub struct RoleInput {
    pub role: Role,
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    user_id: Uuid,
    composter_id: Uuid,
    composter_name: String,
}

#[derive(Debug, FromRow)]
struct ComposterSiteRow {
    id: Uuid,
    name: String,
    site_id: Uuid,
    site_name: String,
}

#[derive(Debug, FromRow)]
struct AssignedUserRow {
    composter_id: Uuid,
    user_id: Uuid,
    first_name: String,
    last_name: String,
    role: String,
}

impl AdminService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// CLIENT and SUPERVISOR users with their composters, ordered by last name
    pub async fn list_users(&self) -> AppResult<Vec<ManagedUser>> {
        let users = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, first_name, last_name, email, password_hash, role, created_at
            FROM users
            WHERE role IN ('CLIENT', 'SUPERVISOR')
            ORDER BY last_name, first_name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let assignments = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT a.user_id, c.id AS composter_id, c.name AS composter_name
            FROM composter_assignments a
            JOIN composters c ON c.id = a.composter_id
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut by_user: HashMap<Uuid, Vec<ComposterRef>> = HashMap::new();
        for row in assignments {
            by_user.entry(row.user_id).or_default().push(ComposterRef {
                id: row.composter_id,
                name: row.composter_name,
            });
        }

        users
            .into_iter()
            .map(|row| -> AppResult<ManagedUser> {
                let composters = by_user.remove(&row.id).unwrap_or_default();
                Ok(ManagedUser {
                    user: row.into_user()?,
                    composters,
                })
            })
            .collect()
    }

    /// Every composter with its site and assigned users, ordered by name
    pub async fn list_composters(&self) -> AppResult<Vec<ManagedComposter>> {
        let composters = sqlx::query_as::<_, ComposterSiteRow>(
            r#"
            SELECT c.id, c.name, s.id AS site_id, s.name AS site_name
            FROM composters c
            JOIN sites s ON s.id = c.site_id
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let assigned = sqlx::query_as::<_, AssignedUserRow>(
            r#"
            SELECT a.composter_id, u.id AS user_id, u.first_name, u.last_name, u.role
            FROM composter_assignments a
            JOIN users u ON u.id = a.user_id
            ORDER BY u.last_name, u.first_name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut by_composter: HashMap<Uuid, Vec<UserSummary>> = HashMap::new();
        for row in assigned {
            let role = Role::parse(&row.role).ok_or_else(|| {
                AppError::Internal(format!("Unknown role in database: {}", row.role))
            })?;
            by_composter.entry(row.composter_id).or_default().push(UserSummary {
                id: row.user_id,
                first_name: row.first_name,
                last_name: row.last_name,
                role,
            });
        }

        Ok(composters
            .into_iter()
            .map(|row| ManagedComposter {
                assigned_users: by_composter.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                site: SiteRef {
                    id: row.site_id,
                    name: row.site_name,
                },
            })
            .collect())
    }

    /// Replace the composters assigned to a user
    pub async fn set_assignments(
        &self,
        user_id: Uuid,
        input: AssignmentsInput,
    ) -> AppResult<Vec<ComposterRef>> {
        let user = self.get_user(user_id).await?;
        ensure_managed(&user)?;

        let composter_ids = dedup_ids(input.composter_ids);

        let known = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM composters WHERE id = ANY($1)")
            .bind(&composter_ids)
            .fetch_one(&self.db)
            .await?;

        if known as usize != composter_ids.len() {
            return Err(AppError::validation(
                "composter_ids",
                "One or more composters do not exist",
                "Un ou plusieurs composteurs n'existent pas",
            ));
        }

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM composter_assignments WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO composter_assignments (user_id, composter_id)
            SELECT $1, UNNEST($2::uuid[])
            "#,
        )
        .bind(user_id)
        .bind(&composter_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, count = composter_ids.len(), "Assignments replaced");

        let composters = sqlx::query_as::<_, ComposterRef>(
            r#"
            SELECT c.id, c.name
            FROM composter_assignments a
            JOIN composters c ON c.id = a.composter_id
            WHERE a.user_id = $1
            ORDER BY c.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(composters)
    }

    /// Switch a user between CLIENT and SUPERVISOR
    pub async fn set_role(&self, user_id: Uuid, role: Role) -> AppResult<User> {
        if !role.is_assignable() {
            return Err(AppError::validation(
                "role",
                "Only CLIENT and SUPERVISOR can be assigned",
                "Seuls les rôles CLIENT et SUPERVISOR peuvent être attribués",
            ));
        }

        let user = self.get_user(user_id).await?;
        ensure_managed(&user)?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET role = $2
            WHERE id = $1
            RETURNING id, first_name, last_name, email, password_hash, role, created_at
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = %user_id, from = %user.role, to = %role, "Role changed");

        row.into_user()
    }

    async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, first_name, last_name, email, password_hash, role, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?
        .into_user()
    }
}

/// Administrator accounts are outside the reach of the admin API
fn ensure_managed(user: &User) -> AppResult<()> {
    if user.role.is_assignable() {
        Ok(())
    } else {
        Err(AppError::Forbidden {
            message: "Administrator accounts cannot be changed here".to_string(),
            message_fr: "Les comptes administrateur ne sont pas modifiables ici".to_string(),
        })
    }
}

/// Remove duplicate ids, keeping first occurrences
fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Camille".to_string(),
            last_name: "Durand".to_string(),
            email: "camille@example.fr".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_admin_accounts_are_not_managed() {
        assert!(ensure_managed(&user(Role::Client)).is_ok());
        assert!(ensure_managed(&user(Role::Supervisor)).is_ok());
        assert!(matches!(
            ensure_managed(&user(Role::Admin)),
            Err(AppError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_dedup_ids_keeps_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup_ids(vec![a, b, a, b]), vec![a, b]);
        assert!(dedup_ids(vec![]).is_empty());
    }

    #[test]
    fn test_role_input_rejects_unknown_roles() {
        let input: RoleInput = serde_json::from_str(r#"{"role":"SUPERVISOR"}"#).unwrap();
        assert_eq!(input.role, Role::Supervisor);
        assert!(serde_json::from_str::<RoleInput>(r#"{"role":"ROOT"}"#).is_err());
    }
}
