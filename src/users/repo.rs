use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewUser, User, UserUpdate};

const COLUMNS: &str =
    "id, name, email, password_hash, mobile_no, is_admin, status, created_at, updated_at, deleted_at";

// Every query here filters `deleted_at IS NULL`: this module is the only
// SQL surface, so soft deletion stays a repo-level default instead of a
// per-handler concern.
impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM users
            WHERE email = $1 AND deleted_at IS NULL
            "#,
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(db: &PgPool, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, mobile_no, is_admin, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(new.name)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.mobile_no)
        .bind(new.is_admin)
        .bind(new.status)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY created_at
            "#,
        ))
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    /// Applies the provided fields, returns the updated row, or `None` when
    /// no live row matched.
    pub async fn update(db: &PgPool, id: Uuid, changes: UserUpdate) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                mobile_no = COALESCE($4, mobile_no),
                is_admin = COALESCE($5, is_admin),
                status = COALESCE($6, status),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.mobile_no)
        .bind(changes.is_admin)
        .bind(changes.status)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Marks the row deleted; it stays in the table but drops out of every
    /// other query here. Returns false when no live row matched.
    pub async fn soft_delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = now(), updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Case-insensitive substring match on name, active users only.
    pub async fn search_by_name(db: &PgPool, query: &str) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM users
            WHERE name ILIKE $1 AND status = 'active' AND deleted_at IS NULL
            ORDER BY name
            "#,
        ))
        .bind(format!("%{query}%"))
        .fetch_all(db)
        .await?;
        Ok(users)
    }
}
