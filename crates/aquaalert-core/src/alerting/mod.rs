//! Alerting module for outbreak and water-contamination alerts.

mod aggregator;
mod generator;
mod summary;

pub use aggregator::{AggregatorConfig, AlertAggregator, DashboardData, VillageCount};
pub use generator::AlertGenerator;
pub use summary::{ChartData, ChartDataset, MapPoint};
