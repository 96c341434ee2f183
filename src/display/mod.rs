//! Text formatting for values headed to the dashboard.

use chrono::{DateTime, FixedOffset, Utc};

use crate::classifier::Metric;

/// Shown wherever a value is absent.
pub const PLACEHOLDER: &str = "—";

/// Fixed-point rendering of an optional number; absent or NaN renders as
/// [`PLACEHOLDER`]. Ties round away from zero (2.5 -> "3").
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{:.decimals$}", round_half_away(v, decimals)),
        _ => PLACEHOLDER.to_owned(),
    }
}

fn round_half_away(v: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    let rounded = (v * scale).round() / scale;
    if rounded.is_finite() {
        rounded
    } else {
        v
    }
}

/// Decimal places the dashboard uses per metric.
pub fn decimals(metric: Metric) -> usize {
    match metric {
        Metric::Temperature | Metric::InsulinInventoryWeight => 1,
        Metric::InsulinLevel | Metric::Glucose => 0,
    }
}

pub fn format_metric(metric: Metric, value: Option<f64>) -> String {
    format_number(value, decimals(metric))
}

pub fn last_updated(at: Option<DateTime<Utc>>, offset: FixedOffset) -> String {
    match at {
        Some(at) => format!(
            "Last updated: {}",
            at.with_timezone(&offset).format("%Y-%m-%d %H:%M:%S")
        ),
        None => format!("Last updated: {PLACEHOLDER}"),
    }
}

/// `HH:MM` label for a chart axis.
pub fn time_of_day(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%H:%M").to_string()
}

/// `Showing N points • <date>`, or a `first → last` date span when the window
/// crosses midnight in the display offset.
pub fn range_summary(
    count: usize,
    first: DateTime<Utc>,
    last: DateTime<Utc>,
    offset: FixedOffset,
) -> String {
    let first = first.with_timezone(&offset).date_naive();
    let last = last.with_timezone(&offset).date_naive();
    let dates = if first == last {
        first.format("%Y-%m-%d").to_string()
    } else {
        format!("{} → {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"))
    };
    format!("Showing {count} points • {dates}")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn absent_numbers_render_as_placeholder() {
        assert_eq!(format_number(None, 1), "—");
        assert_eq!(format_number(Some(f64::NAN), 0), "—");
    }

    #[test]
    fn metrics_use_their_own_precision() {
        assert_eq!(format_metric(Metric::Temperature, Some(4.26)), "4.3");
        assert_eq!(format_metric(Metric::InsulinInventoryWeight, Some(12.0)), "12.0");
        assert_eq!(format_metric(Metric::InsulinLevel, Some(42.4)), "42");
        assert_eq!(format_metric(Metric::Glucose, Some(101.0)), "101");
    }

    #[test]
    fn ties_round_away_from_zero() {
        assert_eq!(format_metric(Metric::InsulinLevel, Some(2.5)), "3");
        assert_eq!(format_metric(Metric::Glucose, Some(100.5)), "101");
        assert_eq!(format_metric(Metric::Temperature, Some(0.25)), "0.3");
        assert_eq!(format_metric(Metric::Temperature, Some(4.25)), "4.3");
        assert_eq!(format_metric(Metric::Temperature, Some(-0.25)), "-0.3");
    }

    #[test]
    fn last_updated_applies_display_offset() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(last_updated(Some(at), utc()), "Last updated: 2024-05-01 23:30:00");
        assert_eq!(last_updated(Some(at), plus_two), "Last updated: 2024-05-02 01:30:00");
        assert_eq!(last_updated(None, utc()), "Last updated: —");
    }

    #[test]
    fn time_of_day_is_hours_and_minutes() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 7, 5, 59).unwrap();
        assert_eq!(time_of_day(at, utc()), "07:05");
    }

    #[test]
    fn range_summary_same_day() {
        let a = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        assert_eq!(range_summary(2, a, b, utc()), "Showing 2 points • 2024-05-01");
    }

    #[test]
    fn range_summary_across_days() {
        let a = Utc.with_ymd_and_hms(2024, 5, 1, 23, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 5, 2, 1, 0, 0).unwrap();
        assert_eq!(
            range_summary(3, a, b, utc()),
            "Showing 3 points • 2024-05-01 → 2024-05-02"
        );
    }
}
