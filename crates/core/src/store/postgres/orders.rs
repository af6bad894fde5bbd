//! Order repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{non_negative, to_i32};
use crate::order::{
    CustomerSnapshot, DashboardStats, DashboardWindow, LineItem, NewOrder, Order, OrderNumber, OrderPage,
    OrderQuery, OrderSort, OrderStats, SortDirection, StatusCount, StatusEntry, TopItem,
};
use crate::store::{OrderStore, RepositoryError, Result};
use crate::types::{Email, MenuItemId, Money, OrderId, OrderStatus, PaymentMethod, Phone};

const ORDER_COLUMNS: &str = "id, number, customer, items, subtotal, delivery_fee, discount, total, \
     status, history, payment_method, note, estimated_minutes, placed_at, confirmed_at, \
     delivered_at, whatsapp_sent, whatsapp_url, version, updated_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    number: i64,
    customer: Json<CustomerSnapshot>,
    items: Json<Vec<LineItem>>,
    subtotal: Money,
    delivery_fee: Money,
    discount: Money,
    total: Money,
    status: OrderStatus,
    history: Json<Vec<StatusEntry>>,
    payment_method: PaymentMethod,
    note: Option<String>,
    estimated_minutes: i32,
    placed_at: DateTime<Utc>,
    confirmed_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    whatsapp_sent: bool,
    whatsapp_url: Option<String>,
    version: i32,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self> {
        if row.history.0.is_empty() {
            return Err(RepositoryError::DataCorruption(format!(
                "order {} has an empty status history",
                row.id
            )));
        }
        Ok(Self {
            id: row.id,
            number: OrderNumber::new(row.number),
            customer: row.customer.0,
            items: row.items.0,
            subtotal: row.subtotal,
            delivery_fee: row.delivery_fee,
            discount: row.discount,
            total: row.total,
            status: row.status,
            history: row.history.0,
            payment_method: row.payment_method,
            note: row.note,
            estimated_minutes: non_negative("estimated_minutes", row.estimated_minutes)?,
            placed_at: row.placed_at,
            confirmed_at: row.confirmed_at,
            delivered_at: row.delivered_at,
            whatsapp_sent: row.whatsapp_sent,
            whatsapp_url: row.whatsapp_url,
            version: row.version,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    count: i64,
    revenue: Option<Money>,
}

#[derive(sqlx::FromRow)]
struct StatusCountRow {
    status: OrderStatus,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct TopItemRow {
    menu_item_id: MenuItemId,
    name: String,
    quantity: i64,
    revenue: Money,
}

fn count(value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| RepositoryError::DataCorruption(format!("negative count: {value}")))
}

/// Appends the `WHERE` clause shared by listing and aggregation.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &OrderQuery) {
    builder.push(" WHERE TRUE");
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(customer) = query.customer {
        builder.push(" AND customer_id = ").push_bind(customer);
    }
    if let Some(from) = query.placed_from {
        builder.push(" AND placed_at >= ").push_bind(from);
    }
    if let Some(to) = query.placed_to {
        builder.push(" AND placed_at < ").push_bind(to);
    }
}

/// `PostgreSQL` implementation of [`OrderStore`].
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, column: &str, bind: i64) -> Result<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM delivery.orders WHERE {column} = $1");
        sqlx::query_as::<_, OrderRow>(&sql)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await?
            .map(Order::try_from)
            .transpose()
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: NewOrder) -> Result<Order> {
        let history = vec![order.initial_entry()];
        let sql = format!(
            r"
            INSERT INTO delivery.orders (
                customer_id, customer, items, subtotal, delivery_fee, discount, total,
                status, history, payment_method, note, estimated_minutes, placed_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8, $9, $10, $11, $12, $12)
            RETURNING {ORDER_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order.customer.customer_id)
            .bind(Json(&order.customer))
            .bind(Json(&order.items))
            .bind(order.totals.subtotal)
            .bind(order.delivery_fee)
            .bind(order.discount)
            .bind(order.totals.total)
            .bind(Json(&history))
            .bind(order.payment_method)
            .bind(order.note.as_deref())
            .bind(to_i32("estimated_minutes", order.estimated_minutes)?)
            .bind(order.placed_at)
            .fetch_one(&self.pool)
            .await?;

        Order::try_from(row)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        self.fetch_one_where("id", i64::from(id.as_i32())).await
    }

    async fn get_by_number(&self, number: OrderNumber) -> Result<Option<Order>> {
        self.fetch_one_where("number", number.sequence()).await
    }

    async fn update_status(&self, order: &Order, expected_version: i32) -> Result<Order> {
        let sql = format!(
            r"
            UPDATE delivery.orders
            SET status = $3, history = $4, confirmed_at = $5, delivered_at = $6,
                updated_at = $7, version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING {ORDER_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order.id)
            .bind(expected_version)
            .bind(order.status)
            .bind(Json(&order.history))
            .bind(order.confirmed_at)
            .bind(order.delivered_at)
            .bind(order.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Order::try_from(row),
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM delivery.orders WHERE id = $1)")
                        .bind(order.id)
                        .fetch_one(&self.pool)
                        .await?;
                if exists {
                    Err(RepositoryError::Conflict(format!(
                        "order {} was modified concurrently",
                        order.id
                    )))
                } else {
                    Err(RepositoryError::NotFound)
                }
            }
        }
    }

    async fn mark_whatsapp_sent(&self, id: OrderId, url: &str) -> Result<Order> {
        let sql = format!(
            r"
            UPDATE delivery.orders
            SET whatsapp_sent = TRUE, whatsapp_url = $2, updated_at = NOW(), version = version + 1
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        );

        sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
            .and_then(Order::try_from)
    }

    async fn list(&self, query: &OrderQuery) -> Result<OrderPage> {
        let mut stats_query =
            QueryBuilder::new("SELECT COUNT(*) AS count, SUM(total) AS revenue FROM delivery.orders");
        push_filters(&mut stats_query, query);
        let stats = stats_query
            .build_query_as::<StatsRow>()
            .fetch_one(&self.pool)
            .await?;
        let stats = OrderStats::new(count(stats.count)?, stats.revenue.unwrap_or(Money::ZERO));

        let mut page_query = QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM delivery.orders"));
        push_filters(&mut page_query, query);
        let column = match query.sort {
            OrderSort::PlacedAt => "placed_at",
            OrderSort::Total => "total",
            OrderSort::Number => "number",
        };
        let direction = match query.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        page_query.push(format!(" ORDER BY {column} {direction}, number {direction}"));
        page_query.push(" LIMIT ").push_bind(i64::from(query.limit));
        page_query.push(" OFFSET ").push_bind(i64::from(query.offset()));

        let orders = page_query
            .build_query_as::<OrderRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(OrderPage {
            orders,
            total: stats.count,
            stats,
        })
    }

    async fn find_by_contact(&self, phone: Option<&Phone>, email: Option<&Email>) -> Result<Vec<Order>> {
        let sql = format!(
            r"
            SELECT {ORDER_COLUMNS} FROM delivery.orders
            WHERE ($1::TEXT IS NOT NULL AND customer ->> 'phone' = $1)
               OR ($2::TEXT IS NOT NULL AND customer ->> 'email' = $2)
            ORDER BY number DESC
            "
        );

        sqlx::query_as::<_, OrderRow>(&sql)
            .bind(phone.map(Phone::digits))
            .bind(email.map(Email::as_str))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Order::try_from)
            .collect()
    }

    async fn dashboard(&self, window: &DashboardWindow) -> Result<DashboardStats> {
        let today = sqlx::query_as::<_, StatsRow>(
            r"
            SELECT COUNT(*) AS count,
                   SUM(total) FILTER (WHERE status <> 'cancelled') AS revenue
            FROM delivery.orders
            WHERE placed_at >= $1 AND placed_at < $2
            ",
        )
        .bind(window.today_start)
        .bind(window.today_end)
        .fetch_one(&self.pool)
        .await?;

        let by_status: Vec<StatusCount> = sqlx::query_as::<_, StatusCountRow>(
            "SELECT status, COUNT(*) AS count FROM delivery.orders GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| {
            Ok(StatusCount {
                status: row.status,
                count: count(row.count)?,
            })
        })
        .collect::<Result<_>>()?;

        let top_items = sqlx::query_as::<_, TopItemRow>(
            r"
            SELECT (item ->> 'menuItemId')::INTEGER AS menu_item_id,
                   MIN(item ->> 'name') AS name,
                   SUM((item ->> 'quantity')::BIGINT)::BIGINT AS quantity,
                   SUM((item ->> 'subtotal')::NUMERIC)::NUMERIC(10, 2) AS revenue
            FROM delivery.orders, jsonb_array_elements(items) AS item
            WHERE placed_at >= $1 AND status <> 'cancelled'
            GROUP BY 1
            ORDER BY quantity DESC, revenue DESC, name
            LIMIT $2
            ",
        )
        .bind(window.top_items_since)
        .bind(i64::try_from(crate::order::query::TOP_ITEMS).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| {
            Ok(TopItem {
                menu_item_id: row.menu_item_id,
                name: row.name,
                quantity: count(row.quantity)?,
                revenue: row.revenue,
            })
        })
        .collect::<Result<_>>()?;

        Ok(DashboardStats {
            orders_today: count(today.count)?,
            revenue_today: today.revenue.unwrap_or(Money::ZERO),
            by_status,
            top_items,
        })
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
