//! Admin user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::conflict_on_unique;
use crate::admin::{AdminUser, NewAdmin};
use crate::store::{AdminStore, RepositoryError, Result};
use crate::types::{AdminUserId, Email};

const ADMIN_COLUMNS: &str = "id, name, email, active, last_login_at, created_at";

#[derive(sqlx::FromRow)]
struct AdminRow {
    id: AdminUserId,
    name: String,
    email: Email,
    active: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<AdminRow> for AdminUser {
    fn from(row: AdminRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            active: row.active,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    admin: AdminRow,
    password_hash: String,
}

/// `PostgreSQL` implementation of [`AdminStore`].
#[derive(Clone)]
pub struct PgAdminStore {
    pool: PgPool,
}

impl PgAdminStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminStore for PgAdminStore {
    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM delivery.admin_user")
            .fetch_one(&self.pool)
            .await?;
        u64::try_from(count).map_err(|_| RepositoryError::DataCorruption(format!("negative count: {count}")))
    }

    async fn create(&self, admin: NewAdmin, password_hash: String) -> Result<AdminUser> {
        let sql = format!(
            "INSERT INTO delivery.admin_user (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {ADMIN_COLUMNS}"
        );

        let row = sqlx::query_as::<_, AdminRow>(&sql)
            .bind(&admin.name)
            .bind(&admin.email)
            .bind(&password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, |_| "email already registered".to_owned()))?;

        Ok(row.into())
    }

    async fn get(&self, id: AdminUserId) -> Result<Option<AdminUser>> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM delivery.admin_user WHERE id = $1");
        let row = sqlx::query_as::<_, AdminRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(AdminUser::from))
    }

    async fn credentials(&self, email: &Email) -> Result<Option<(AdminUser, String)>> {
        let sql = format!("SELECT {ADMIN_COLUMNS}, password_hash FROM delivery.admin_user WHERE email = $1");
        let row = sqlx::query_as::<_, CredentialRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| (r.admin.into(), r.password_hash)))
    }

    async fn record_login(&self, id: AdminUserId) -> Result<()> {
        let result = sqlx::query("UPDATE delivery.admin_user SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
