//! Order records and the daily stats aggregate derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_utils::utc_day_bounds;

/// Lifecycle status of an order document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
    Completed,
}

impl OrderStatus {
    /// Whether this order counts toward earnings.
    pub fn is_earning(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Delivered)
    }
}

/// Order record stored in the `orders` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Document ID, populated on reads
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: Option<String>,
    pub partner_id: String,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub restaurant_name: String,
    pub pickup: String,
    pub drop_location: String,
}

/// Orders completed and earnings collected during the current day.
///
/// Derived by filtering a partner's orders to those created within the
/// current UTC calendar day with an earning status. Read-only to the UI;
/// recomputed whenever the backing order set changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub orders: u32,
    pub earnings: f64,
}

impl DailyStats {
    /// Fold a partner's orders into today's stats.
    pub fn from_orders<'a, I>(orders: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Order>,
    {
        let (start, end) = utc_day_bounds(now);
        let mut stats = Self::default();

        for order in orders {
            if order.created_at >= start && order.created_at <= end && order.status.is_earning() {
                stats.orders += 1;
                stats.earnings += order.total_amount;
            }
        }

        stats
    }
}
