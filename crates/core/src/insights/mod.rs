mod insights_model;
mod insights_service;

pub use insights_model::{CategoryTotals, DashboardStats, MonthlySummary};
pub use insights_service::{
    category_breakdown, dashboard_stats, monthly_summaries, recent_transactions,
};
