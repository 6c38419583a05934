use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use crate::db::UpsertAction;

/// Stored role. Everyone starts as `user`; the fixed administrator set is
/// promoted to `superadmin` at seed time or on login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    User,
    Superadmin,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub unique_id: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Insert-or-update keyed on `unique_id`, in one atomic statement.
    /// `email` and `updated_at` always follow the caller; `role` changes only
    /// when one is explicitly passed, and `created_at` is never touched.
    pub async fn upsert(
        db: &SqlitePool,
        unique_id: &str,
        email: &str,
        role: Option<Role>,
    ) -> anyhow::Result<(UpsertAction, User)> {
        // Existence check is for reporting only; the write itself relies on
        // the unique constraint, not on this read.
        let existed: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE unique_id = ?1)")
                .bind(unique_id)
                .fetch_one(db)
                .await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (unique_id, email, role)
            VALUES (?1, ?2, COALESCE(?3, 'user'))
            ON CONFLICT(unique_id) DO UPDATE SET
                email = excluded.email,
                role = COALESCE(?3, role),
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
            RETURNING id, unique_id, email, role, created_at, updated_at
            "#,
        )
        .bind(unique_id)
        .bind(email)
        .bind(role)
        .fetch_one(db)
        .await?;

        let action = if existed {
            UpsertAction::Updated
        } else {
            UpsertAction::Inserted
        };
        Ok((action, user))
    }

    pub async fn get_by_unique_id(db: &SqlitePool, unique_id: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, unique_id, email, role, created_at, updated_at
            FROM users
            WHERE unique_id = ?1
            "#,
        )
        .bind(unique_id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn list_all(db: &SqlitePool) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, unique_id, email, role, created_at, updated_at
            FROM users
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    pub async fn count(db: &SqlitePool) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        crate::db::ensure_schema(&pool).await.expect("schema");
        pool
    }

    #[tokio::test]
    async fn fresh_unique_id_is_inserted_with_default_role() {
        let db = pool().await;
        let (action, user) = User::upsert(&db, "zuid-1", "jane@x.com", None)
            .await
            .expect("upsert");
        assert_eq!(action, UpsertAction::Inserted);
        assert_eq!(user.role, Role::User);
        assert_eq!(user.email, "jane@x.com");
    }

    #[tokio::test]
    async fn second_upsert_updates_email_and_preserves_role() {
        let db = pool().await;
        let (_, first) = User::upsert(&db, "zuid-1", "jane@x.com", Some(Role::Superadmin))
            .await
            .expect("first upsert");

        let (action, second) = User::upsert(&db, "zuid-1", "jane@new.com", None)
            .await
            .expect("second upsert");
        assert_eq!(action, UpsertAction::Updated);
        assert_eq!(second.email, "jane@new.com");
        assert_eq!(second.role, Role::Superadmin);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(User::count(&db).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn explicit_role_overrides_on_update() {
        let db = pool().await;
        User::upsert(&db, "zuid-1", "jane@x.com", None)
            .await
            .expect("insert");
        let (_, user) = User::upsert(&db, "zuid-1", "jane@x.com", Some(Role::Superadmin))
            .await
            .expect("update");
        assert_eq!(user.role, Role::Superadmin);
    }

    #[tokio::test]
    async fn lookup_misses_return_none() {
        let db = pool().await;
        let user = User::get_by_unique_id(&db, "nope").await.expect("lookup");
        assert!(user.is_none());
    }
}
