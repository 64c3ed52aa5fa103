//! Order history search

use std::cmp::Ordering;

use jiff::civil::{Date, DateTime};
use serde::{Deserialize, Serialize};

use crate::orders::{OrderRecord, PaymentStatus};

/// Field to sort search results by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Order id
    Id,
    /// Item names
    ItemName,
    /// Total units
    Quantity,
    /// Recorded total
    Price,
    /// Order timestamp
    #[default]
    OrderDate,
    /// Payment timestamp
    PaymentDate,
}

impl SortKey {
    fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ItemName => "item_name",
            Self::Quantity => "quantity",
            Self::Price => "price",
            Self::OrderDate => "order_date",
            Self::PaymentDate => "payment_date",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first
    Asc,
    /// Largest first
    #[default]
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Filters and ordering for the order history.
///
/// Unset fields do not filter. Date bounds are inclusive calendar days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuery {
    /// Payment status to match
    pub status: Option<PaymentStatus>,
    /// Substring of any line's item name, ignoring case
    pub item_name: Option<String>,
    /// Minimum total units
    pub min_quantity: Option<u64>,
    /// Maximum total units
    pub max_quantity: Option<u64>,
    /// Earliest order day
    pub order_date_start: Option<Date>,
    /// Latest order day
    pub order_date_end: Option<Date>,
    /// Earliest payment day
    pub payment_date_start: Option<Date>,
    /// Latest payment day
    pub payment_date_end: Option<Date>,
    /// Sort field
    #[serde(default)]
    pub sort_by: SortKey,
    /// Sort direction
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl OrderQuery {
    /// Query-string pairs for the backend's search endpoint, omitting unset filters.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(item_name) = self.item_name_filter() {
            pairs.push(("item_name", item_name.to_string()));
        }
        if let Some(min) = self.min_quantity {
            pairs.push(("min_quantity", min.to_string()));
        }
        if let Some(max) = self.max_quantity {
            pairs.push(("max_quantity", max.to_string()));
        }

        let dates = [
            ("order_date_start", self.order_date_start),
            ("order_date_end", self.order_date_end),
            ("payment_date_start", self.payment_date_start),
            ("payment_date_end", self.payment_date_end),
        ];
        pairs.extend(
            dates
                .into_iter()
                .filter_map(|(key, date)| date.map(|date| (key, date.to_string()))),
        );

        pairs.push(("sort_by", self.sort_by.as_str().to_string()));
        pairs.push(("sort_order", self.sort_order.as_str().to_string()));

        pairs
    }

    /// Whether a single order passes every filter.
    pub fn matches(&self, order: &OrderRecord) -> bool {
        if self.status.is_some_and(|status| status != order.payment_status) {
            return false;
        }

        if let Some(needle) = self.item_name_filter() {
            let needle = needle.to_lowercase();
            let found = order
                .items
                .iter()
                .any(|line| line.item_name.to_lowercase().contains(&needle));

            if !found {
                return false;
            }
        }

        let quantity = order.total_quantity();
        if self.min_quantity.is_some_and(|min| quantity < min)
            || self.max_quantity.is_some_and(|max| quantity > max)
        {
            return false;
        }

        within(
            Some(order.order_date.as_str()),
            self.order_date_start,
            self.order_date_end,
        ) && within(
            order.payment_date.as_deref(),
            self.payment_date_start,
            self.payment_date_end,
        )
    }

    fn item_name_filter(&self) -> Option<&str> {
        self.item_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Filter and sort orders locally.
    pub fn apply<'a>(&self, orders: &'a [OrderRecord]) -> Vec<&'a OrderRecord> {
        let mut found: Vec<&OrderRecord> = orders.iter().filter(|o| self.matches(o)).collect();

        found.sort_by(|a, b| {
            let ordering = compare(self.sort_by, a, b);

            match self.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        found
    }
}

/// Calendar day of an ISO-8601 timestamp or date.
pub fn parse_day(value: &str) -> Option<Date> {
    let value = value.trim();

    value
        .parse::<DateTime>()
        .map(DateTime::date)
        .or_else(|_| value.parse::<Date>())
        .ok()
        .or_else(|| value.get(..10).and_then(|day| day.parse::<Date>().ok()))
}

fn within(value: Option<&str>, start: Option<Date>, end: Option<Date>) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }

    let Some(day) = value.and_then(parse_day) else {
        return false;
    };

    start.is_none_or(|start| day >= start) && end.is_none_or(|end| day <= end)
}

fn compare(key: SortKey, a: &OrderRecord, b: &OrderRecord) -> Ordering {
    match key {
        SortKey::Id => a.id.cmp(&b.id),
        SortKey::ItemName => a.item_names().cmp(&b.item_names()),
        SortKey::Quantity => a.total_quantity().cmp(&b.total_quantity()),
        SortKey::Price => a.total_price.cmp(&b.total_price),
        SortKey::OrderDate => a.order_date.cmp(&b.order_date),
        SortKey::PaymentDate => a
            .payment_date
            .as_deref()
            .unwrap_or_default()
            .cmp(b.payment_date.as_deref().unwrap_or_default()),
    }
}
