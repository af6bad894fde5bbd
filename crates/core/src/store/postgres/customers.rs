//! Customer repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, QueryBuilder};

use super::conflict_on_unique;
use crate::customer::{Customer, CustomerPage, CustomerProfile, CustomerQuery};
use crate::store::{CustomerStore, RepositoryError, Result};
use crate::types::{Address, CustomerId, Email, Phone};

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, address, active, notes, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    name: String,
    email: Email,
    phone: Phone,
    address: Json<Address>,
    active: bool,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address.0,
            active: row.active,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    customer: CustomerRow,
    password_hash: Option<String>,
}

fn duplicate_contact(constraint: Option<&str>) -> String {
    match constraint {
        Some(c) if c.contains("phone") => "phone already registered".to_owned(),
        _ => "email already registered".to_owned(),
    }
}

/// `PostgreSQL` implementation of [`CustomerStore`].
#[derive(Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn get(&self, id: CustomerId) -> Result<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM delivery.customer WHERE id = $1");
        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Customer::from))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM delivery.customer WHERE email = $1");
        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Customer::from))
    }

    async fn create(&self, profile: CustomerProfile, password_hash: Option<String>) -> Result<Customer> {
        let sql = format!(
            r"
            INSERT INTO delivery.customer (name, email, phone, address, notes, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CUSTOMER_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(&profile.name)
            .bind(&profile.email)
            .bind(&profile.phone)
            .bind(Json(&profile.address))
            .bind(profile.notes.as_deref())
            .bind(password_hash.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, duplicate_contact))?;

        Ok(row.into())
    }

    async fn update(&self, id: CustomerId, profile: CustomerProfile) -> Result<Customer> {
        let sql = format!(
            r"
            UPDATE delivery.customer
            SET name = $2, email = $3, phone = $4, address = $5, notes = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "
        );

        sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .bind(&profile.name)
            .bind(&profile.email)
            .bind(&profile.phone)
            .bind(Json(&profile.address))
            .bind(profile.notes.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, duplicate_contact))?
            .map(Customer::from)
            .ok_or(RepositoryError::NotFound)
    }

    async fn set_active(&self, id: CustomerId, active: bool) -> Result<Customer> {
        let sql = format!(
            "UPDATE delivery.customer SET active = $2, updated_at = NOW() WHERE id = $1 RETURNING {CUSTOMER_COLUMNS}"
        );

        sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .bind(active)
            .fetch_optional(&self.pool)
            .await?
            .map(Customer::from)
            .ok_or(RepositoryError::NotFound)
    }

    async fn list(&self, query: &CustomerQuery) -> Result<CustomerPage> {
        fn push_filters(builder: &mut QueryBuilder<'_, sqlx::Postgres>, query: &CustomerQuery) {
            builder.push(" WHERE TRUE");
            if let Some(active) = query.active {
                builder.push(" AND active = ").push_bind(active);
            }
            if let Some(city) = query.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
                builder
                    .push(" AND LOWER(address ->> 'city') = LOWER(")
                    .push_bind(city.to_owned())
                    .push(")");
            }
            if let Some(term) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                let pattern = format!("%{}%", term.replace('%', "\\%").replace('_', "\\_"));
                builder
                    .push(" AND (name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR email ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR phone LIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        }

        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM delivery.customer");
        push_filters(&mut count_query, query);
        let total: i64 = count_query.build_query_scalar().fetch_one(&self.pool).await?;

        let mut page_query = QueryBuilder::new(format!("SELECT {CUSTOMER_COLUMNS} FROM delivery.customer"));
        push_filters(&mut page_query, query);
        page_query.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        page_query.push_bind(i64::from(query.limit));
        page_query.push(" OFFSET ").push_bind(i64::from(query.offset()));

        let customers = page_query
            .build_query_as::<CustomerRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Customer::from)
            .collect();

        Ok(CustomerPage {
            customers,
            total: u64::try_from(total)
                .map_err(|_| RepositoryError::DataCorruption(format!("negative count: {total}")))?,
        })
    }

    async fn credentials(&self, email: &Email) -> Result<Option<(Customer, String)>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS}, password_hash FROM delivery.customer WHERE email = $1");
        let row = sqlx::query_as::<_, CredentialRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.and_then(|r| r.password_hash.map(|hash| (r.customer.into(), hash))))
    }
}
