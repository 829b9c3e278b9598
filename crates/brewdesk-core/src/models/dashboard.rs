use serde::{Deserialize, Serialize};

use super::Order;

/// Aggregate counters shown on the dashboard landing page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(default)]
pub struct DashboardStats {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub total_products: u64,
    pub pending_orders: u64,
    pub completed_orders: u64,
    pub today_orders: u64,
    pub today_revenue: f64,
}

/// Stats plus the most recent orders, fetched together
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_orders: Vec<Order>,
}
