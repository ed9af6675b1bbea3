//! Notification service for in-app alerts
//!
//! Alerts are raised when a recorded reading breaks its composter's norm and
//! are delivered to every user assigned to that composter.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Notification, NotificationRow};

/// Notification service
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
}

impl NotificationService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Notifications of a user, newest first
    pub async fn list_for(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, composter_id, message, read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    /// Number of unread notifications of a user
    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Mark one of the user's notifications as read
    pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> AppResult<Notification> {
        let owner = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification".to_string()))?;

        if owner != user_id {
            return Err(AppError::Forbidden {
                message: "This notification belongs to another user".to_string(),
                message_fr: "Cette notification appartient à un autre utilisateur".to_string(),
            });
        }

        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            UPDATE notifications SET read = TRUE
            WHERE id = $1
            RETURNING id, user_id, composter_id, message, read, created_at
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Send a message to every user assigned to a composter.
    ///
    /// Runs on the caller's connection so the alerts share its transaction.
    /// Returns the number of notifications created.
    pub async fn notify_assigned(
        conn: &mut PgConnection,
        composter_id: Uuid,
        message: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, composter_id, message)
            SELECT a.user_id, a.composter_id, $2
            FROM composter_assignments a
            WHERE a.composter_id = $1
            "#,
        )
        .bind(composter_id)
        .bind(message)
        .execute(conn)
        .await?;

        let created = result.rows_affected();
        tracing::info!(composter_id = %composter_id, created, "Norm violation notifications sent");

        Ok(created)
    }
}
