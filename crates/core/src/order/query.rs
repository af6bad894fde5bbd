//! Order listing filters, pagination and aggregate statistics.

use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Order;
use crate::types::{CustomerId, MenuItemId, Money, OrderStatus};

/// Default page size for order listings.
pub const DEFAULT_LIMIT: u32 = 20;
/// Largest page a client may ask for.
pub const MAX_LIMIT: u32 = 100;
/// How many best sellers the dashboard shows.
pub const TOP_ITEMS: usize = 10;
/// Best sellers are ranked over this many days.
pub const TOP_ITEMS_DAYS: i64 = 30;

/// Column to sort orders by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSort {
    #[default]
    PlacedAt,
    Total,
    Number,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Filters and paging for order listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub customer: Option<CustomerId>,
    /// Inclusive lower bound on `placed_at`.
    pub placed_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `placed_at`.
    pub placed_to: Option<DateTime<Utc>>,
    pub sort: OrderSort,
    pub direction: SortDirection,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            status: None,
            customer: None,
            placed_from: None,
            placed_to: None,
            sort: OrderSort::default(),
            direction: SortDirection::default(),
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl OrderQuery {
    /// Clamps page and limit into their valid ranges.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = self.limit.clamp(1, MAX_LIMIT);
        self
    }

    /// Rows to skip for the requested page.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Whether `order` passes every set filter.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|s| s == order.status)
            && self.customer.is_none_or(|c| c == order.customer.customer_id)
            && self.placed_from.is_none_or(|from| order.placed_at >= from)
            && self.placed_to.is_none_or(|to| order.placed_at < to)
    }

    /// Sorts `orders` in place according to the query.
    pub fn sort(&self, orders: &mut [Order]) {
        orders.sort_by(|a, b| {
            let ordering = match self.sort {
                OrderSort::PlacedAt => a.placed_at.cmp(&b.placed_at).then(a.number.cmp(&b.number)),
                OrderSort::Total => a.total.cmp(&b.total).then(a.number.cmp(&b.number)),
                OrderSort::Number => a.number.cmp(&b.number),
            };
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }
}

/// Aggregates over every order matching a query, ignoring pagination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub count: u64,
    pub revenue: Money,
    pub average: Money,
}

impl OrderStats {
    /// Builds the aggregate from a count and a revenue sum.
    #[must_use]
    pub fn new(count: u64, revenue: Money) -> Self {
        let average = if count == 0 {
            Money::ZERO
        } else {
            Money::new(revenue.amount() / Decimal::from(count))
        };
        Self {
            count,
            revenue,
            average,
        }
    }

    /// Aggregates an iterator of orders.
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let (count, revenue) = orders
            .into_iter()
            .fold((0_u64, Money::ZERO), |(n, sum), o| (n + 1, sum + o.total));
        Self::new(count, revenue)
    }
}

/// One page of orders.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    /// Orders matching the filters across all pages.
    pub total: u64,
    pub stats: OrderStats,
}

/// Time ranges the dashboard aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardWindow {
    pub today_start: DateTime<Utc>,
    pub today_end: DateTime<Utc>,
    pub top_items_since: DateTime<Utc>,
}

impl DashboardWindow {
    /// The store-local calendar day containing `now`.
    #[must_use]
    pub fn for_day(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local_midnight = now.with_timezone(&offset).date_naive().and_time(NaiveTime::MIN);
        let today_start = offset
            .from_local_datetime(&local_midnight)
            .single()
            .map_or(now, |t| t.with_timezone(&Utc));
        Self {
            today_start,
            today_end: today_start + Duration::days(1),
            top_items_since: now - Duration::days(TOP_ITEMS_DAYS),
        }
    }
}

/// Orders per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

/// A best-selling menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopItem {
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub quantity: u64,
    pub revenue: Money,
}

/// Admin dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub orders_today: u64,
    /// Today's revenue, cancelled orders excluded.
    pub revenue_today: Money,
    pub by_status: Vec<StatusCount>,
    pub top_items: Vec<TopItem>,
}

impl DashboardStats {
    /// Computes the dashboard from a full scan of orders.
    pub fn compute<'a>(orders: impl IntoIterator<Item = &'a Order>, window: &DashboardWindow) -> Self {
        let mut orders_today = 0;
        let mut revenue_today = Money::ZERO;
        let mut by_status: HashMap<OrderStatus, u64> = HashMap::new();
        let mut items: HashMap<MenuItemId, TopItem> = HashMap::new();

        for order in orders {
            *by_status.entry(order.status).or_default() += 1;
            let cancelled = order.status == OrderStatus::Cancelled;

            if order.placed_at >= window.today_start && order.placed_at < window.today_end {
                orders_today += 1;
                if !cancelled {
                    revenue_today = revenue_today + order.total;
                }
            }

            if cancelled || order.placed_at < window.top_items_since {
                continue;
            }
            for line in &order.items {
                let entry = items.entry(line.menu_item_id).or_insert_with(|| TopItem {
                    menu_item_id: line.menu_item_id,
                    name: line.name.clone(),
                    quantity: 0,
                    revenue: Money::ZERO,
                });
                entry.quantity += u64::from(line.quantity);
                entry.revenue = entry.revenue + line.subtotal;
            }
        }

        let by_status = OrderStatus::ALL
            .into_iter()
            .filter_map(|status| {
                by_status
                    .get(&status)
                    .map(|&count| StatusCount { status, count })
            })
            .collect();

        let mut top_items: Vec<TopItem> = items.into_values().collect();
        top_items.sort_by(|a, b| {
            b.quantity
                .cmp(&a.quantity)
                .then(b.revenue.cmp(&a.revenue))
                .then(a.name.cmp(&b.name))
        });
        top_items.truncate(TOP_ITEMS);

        Self {
            orders_today,
            revenue_today,
            by_status,
            top_items,
        }
    }
}
