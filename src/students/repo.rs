use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use crate::db::UpsertAction;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: Option<String>,
    pub zeta_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Field set accepted by [`Student::upsert`].
#[derive(Debug, Clone, Copy)]
pub struct NewStudent<'a> {
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub address: Option<&'a str>,
    pub zeta_id: &'a str,
}

impl Student {
    /// Atomic insert-or-update with ordered conflict resolution: a `zeta_id`
    /// match wins over an `email` match. When the two keys resolve to two
    /// different existing rows the statement trips the remaining unique
    /// constraint and errors instead of updating an ambiguous target.
    pub async fn upsert(
        db: &SqlitePool,
        input: NewStudent<'_>,
    ) -> anyhow::Result<(UpsertAction, Student)> {
        // Reporting only; the write is guarded by the constraints themselves.
        let existed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM students WHERE zeta_id = ?1 OR email = ?2)",
        )
        .bind(input.zeta_id)
        .bind(input.email)
        .fetch_one(db)
        .await?;

        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (name, phone, first_name, last_name, email, address, zeta_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(zeta_id) DO UPDATE SET
                name = excluded.name,
                phone = excluded.phone,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                email = excluded.email,
                address = excluded.address,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
            ON CONFLICT(email) DO UPDATE SET
                name = excluded.name,
                phone = excluded.phone,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                zeta_id = excluded.zeta_id,
                address = excluded.address,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
            RETURNING id, name, phone, first_name, last_name, email, address, zeta_id,
                      created_at, updated_at
            "#,
        )
        .bind(input.name)
        .bind(input.phone)
        .bind(input.first_name)
        .bind(input.last_name)
        .bind(input.email)
        .bind(input.address)
        .bind(input.zeta_id)
        .fetch_one(db)
        .await?;

        let action = if existed {
            UpsertAction::Updated
        } else {
            UpsertAction::Inserted
        };
        Ok((action, student))
    }

    pub async fn get_by_email(db: &SqlitePool, email: &str) -> anyhow::Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, name, phone, first_name, last_name, email, address, zeta_id,
                   created_at, updated_at
            FROM students
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(student)
    }

    pub async fn get_by_zeta_id(db: &SqlitePool, zeta_id: &str) -> anyhow::Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, name, phone, first_name, last_name, email, address, zeta_id,
                   created_at, updated_at
            FROM students
            WHERE zeta_id = ?1
            "#,
        )
        .bind(zeta_id)
        .fetch_optional(db)
        .await?;
        Ok(student)
    }

    pub async fn list_all(db: &SqlitePool) -> anyhow::Result<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, name, phone, first_name, last_name, email, address, zeta_id,
                   created_at, updated_at
            FROM students
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(students)
    }

    pub async fn count(db: &SqlitePool) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(db)
            .await?;
        Ok(count)
    }

    /// Returns whether a row was actually removed.
    pub async fn delete_by_email(db: &SqlitePool, email: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE email = ?1")
            .bind(email)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_by_zeta_id(db: &SqlitePool, zeta_id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE zeta_id = ?1")
            .bind(zeta_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
