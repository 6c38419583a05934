//! Pool setup, schema bootstrap and the ad-hoc role-column migration.

use std::str::FromStr;

use anyhow::Context;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::oauth::policy::SUPER_ADMINS;
use crate::users::repo::{Role, User};

/// Outcome of an upsert, reported back to API callers as `data.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Inserted,
    Updated,
}

impl UpsertAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Updated => "updated",
        }
    }
}

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .context("invalid DATABASE_URL")?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("connect to database")?;
    Ok(pool)
}

/// Create the tables if they do not exist. Failure here is fatal.
pub async fn ensure_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            unique_id TEXT UNIQUE NOT NULL,
            email TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )
        "#,
    )
    .execute(pool)
    .await
    .context("create users table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            phone TEXT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            address TEXT,
            zeta_id TEXT UNIQUE NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )
        "#,
    )
    .execute(pool)
    .await
    .context("create students table")?;

    Ok(())
}

/// Databases created before roles existed lack the `role` column. One-time,
/// idempotent and best-effort: a failure is logged, startup continues.
pub async fn migrate_role_column(pool: &SqlitePool) {
    let has_role = match sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM pragma_table_info('users') WHERE name = 'role'",
    )
    .fetch_one(pool)
    .await
    {
        Ok(n) => n > 0,
        Err(e) => {
            warn!(error = %e, "could not inspect users schema; skipping role migration");
            return;
        }
    };

    if has_role {
        return;
    }

    match sqlx::query("ALTER TABLE users ADD COLUMN role TEXT NOT NULL DEFAULT 'user'")
        .execute(pool)
        .await
    {
        Ok(_) => info!("added role column to users"),
        Err(e) => warn!(error = %e, "adding role column failed; continuing"),
    }
}

/// Upsert the fixed administrator set with `role = superadmin` on every
/// startup. Seed rows are keyed by email; an OAuth login for the same person
/// later creates a row keyed by the real subject claim.
pub async fn seed_superadmins(pool: &SqlitePool) {
    for email in SUPER_ADMINS {
        match User::upsert(pool, email, email, Some(Role::Superadmin)).await {
            Ok((action, _)) => info!(email, action = action.as_str(), "superadmin seeded"),
            Err(e) => warn!(email, error = %e, "superadmin seed failed"),
        }
    }
}

/// Startup-banner helpers; a count failure is not worth aborting over.
pub async fn user_count_or_zero(pool: &SqlitePool) -> i64 {
    User::count(pool).await.unwrap_or(0)
}

pub async fn student_count_or_zero(pool: &SqlitePool) -> i64 {
    crate::students::repo::Student::count(pool).await.unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool")
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let pool = memory_pool().await;
        ensure_schema(&pool).await.expect("first ensure");
        ensure_schema(&pool).await.expect("second ensure");
    }

    #[tokio::test]
    async fn role_migration_adds_the_column_to_a_legacy_schema() {
        let pool = memory_pool().await;
        sqlx::query(
            r#"
            CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                unique_id TEXT UNIQUE NOT NULL,
                email TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
            )
            "#,
        )
        .execute(&pool)
        .await
        .expect("legacy users table");

        migrate_role_column(&pool).await;

        let (action, user) = User::upsert(&pool, "zuid-1", "a@b.com", None)
            .await
            .expect("upsert after migration");
        assert_eq!(action, UpsertAction::Inserted);
        assert_eq!(user.role, Role::User);

        // Running it again is a no-op.
        migrate_role_column(&pool).await;
    }

    #[tokio::test]
    async fn superadmin_seed_is_idempotent() {
        let pool = memory_pool().await;
        ensure_schema(&pool).await.expect("schema");

        seed_superadmins(&pool).await;
        seed_superadmins(&pool).await;

        let count = User::count(&pool).await.expect("count");
        assert_eq!(count, SUPER_ADMINS.len() as i64);
        for email in SUPER_ADMINS {
            let user = User::get_by_unique_id(&pool, email)
                .await
                .expect("lookup")
                .expect("seeded row");
            assert_eq!(user.role, Role::Superadmin);
        }
    }
}
