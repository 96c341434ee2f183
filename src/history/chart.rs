use chrono::FixedOffset;
use serde::Serialize;
use utoipa::ToSchema;

use super::service::HistoryPoint;
use crate::display;

/// One plotted line. `values` lines up index-for-index with
/// [`ChartView::labels`]; `null` entries are drawn as gaps.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartSeries {
    #[schema(value_type = String)]
    pub label: &'static str,
    /// Identifier of the y-axis the series is plotted against.
    #[schema(value_type = String)]
    pub axis: &'static str,
    pub values: Vec<Option<f64>>,
}

/// Chart-ready shape of a history window.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartView {
    /// `HH:MM` per point.
    pub labels: Vec<String>,
    /// `None` when the window is empty.
    pub range: Option<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartView {
    pub fn from_points(points: impl IntoIterator<Item = HistoryPoint>, offset: FixedOffset) -> Self {
        let mut labels = Vec::new();
        let mut temperature = Vec::new();
        let mut glucose = Vec::new();
        let mut inventory = Vec::new();
        let mut bounds = None;

        for p in points {
            labels.push(display::time_of_day(p.timestamp, offset));
            temperature.push(p.temperature);
            glucose.push(p.glucose_value);
            inventory.push(p.insulin_inventory_weight);
            bounds = match bounds {
                None => Some((p.timestamp, p.timestamp)),
                Some((first, _)) => Some((first, p.timestamp)),
            };
        }

        let range = bounds.map(|(first, last)| display::range_summary(labels.len(), first, last, offset));

        Self {
            labels,
            range,
            series: vec![
                ChartSeries {
                    label: "Temperature (°C)",
                    axis: "yTemp",
                    values: temperature,
                },
                ChartSeries {
                    label: "Glucose (mg/dL)",
                    axis: "yGlucose",
                    values: glucose,
                },
                ChartSeries {
                    label: "Inventory (g)",
                    axis: "yInventory",
                    values: inventory,
                },
            ],
        }
    }
}
