mod chart;
mod service;

pub use chart::{ChartSeries, ChartView};
pub use service::{HistoryPoint, HistoryService, HistoryWindow};
