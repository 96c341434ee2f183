//! Severity classification for every tracked fridge metric.
//!
//! Each numeric metric owns an ordered band table. Bands are tested top to
//! bottom and the first match wins, so overlapping bands (e.g. the glucose
//! warn bands sitting inside the crit bounds) resolve exactly as listed.
//! Missing or unparseable input always lands in [`Tier::Unknown`].

use serde::Serialize;
use utoipa::ToSchema;

const NO_DATA: &str = "No data";

// ---------------------------------------------------------------------------
// SeverityStatus
// ---------------------------------------------------------------------------

/// Coarse alert level for a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Ok,
    Warn,
    Crit,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SeverityStatus {
    #[schema(value_type = String)]
    pub label: &'static str,
    pub tier: Tier,
}

impl SeverityStatus {
    const fn new(tier: Tier, label: &'static str) -> Self {
        Self { label, tier }
    }

    pub const fn no_data() -> Self {
        Self::new(Tier::Unknown, NO_DATA)
    }
}

// ---------------------------------------------------------------------------
// MetricValue
// ---------------------------------------------------------------------------

/// A raw metric value as it reaches the classifier.
///
/// Text is coerced to a number before the not-a-number check, so a value
/// delivered as `"5.5"` classifies the same as `5.5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue<'a> {
    Missing,
    /// Present but of a kind that can never be a number (bool, array, object).
    Invalid,
    Number(f64),
    Text(&'a str),
}

impl MetricValue<'_> {
    /// Numeric interpretation of the value, `None` when absent or NaN.
    ///
    /// Blank text counts as absent rather than zero, and text spelling out
    /// an infinity (`"inf"`, `"infinity"`) is not a number.
    pub fn as_number(&self) -> Option<f64> {
        let n = match *self {
            MetricValue::Missing | MetricValue::Invalid => return None,
            MetricValue::Number(n) => n,
            MetricValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                s.parse::<f64>().ok().filter(|n| n.is_finite())?
            }
        };
        (!n.is_nan()).then_some(n)
    }
}

impl From<f64> for MetricValue<'_> {
    fn from(n: f64) -> Self {
        MetricValue::Number(n)
    }
}

impl From<Option<f64>> for MetricValue<'_> {
    fn from(n: Option<f64>) -> Self {
        n.map_or(MetricValue::Missing, MetricValue::Number)
    }
}

impl<'a> From<&'a str> for MetricValue<'a> {
    fn from(s: &'a str) -> Self {
        MetricValue::Text(s)
    }
}

impl<'a> From<&'a serde_json::Value> for MetricValue<'a> {
    fn from(v: &'a serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => MetricValue::Missing,
            Value::Number(n) => n.as_f64().map_or(MetricValue::Invalid, MetricValue::Number),
            Value::String(s) => MetricValue::Text(s),
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => MetricValue::Invalid,
        }
    }
}

// ---------------------------------------------------------------------------
// Band tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Predicate {
    Below(f64),
    Above(f64),
    AtMost(f64),
    /// Strictly below `low` or strictly above `high`.
    Outside(f64, f64),
    Always,
}

impl Predicate {
    fn matches(self, v: f64) -> bool {
        match self {
            Predicate::Below(t) => v < t,
            Predicate::Above(t) => v > t,
            Predicate::AtMost(t) => v <= t,
            Predicate::Outside(low, high) => v < low || v > high,
            Predicate::Always => true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Band {
    when: Predicate,
    status: SeverityStatus,
}

const fn band(when: Predicate, tier: Tier, label: &'static str) -> Band {
    Band {
        when,
        status: SeverityStatus::new(tier, label),
    }
}

const TEMPERATURE_BANDS: &[Band] = &[
    band(Predicate::Outside(2.0, 10.0), Tier::Crit, "Out of safe band"),
    band(Predicate::Outside(3.0, 8.0), Tier::Warn, "Borderline"),
    band(Predicate::Always, Tier::Ok, "Within 2–8 °C"),
];

const INVENTORY_BANDS: &[Band] = &[
    band(Predicate::AtMost(3.0), Tier::Crit, "Very low"),
    band(Predicate::AtMost(12.0), Tier::Warn, "Low"),
    band(Predicate::Always, Tier::Ok, "OK"),
];

const INSULIN_LEVEL_BANDS: &[Band] = &[
    band(Predicate::AtMost(5.0), Tier::Crit, "Near empty"),
    band(Predicate::AtMost(20.0), Tier::Warn, "Low"),
    band(Predicate::Always, Tier::Ok, "Healthy"),
];

const GLUCOSE_BANDS: &[Band] = &[
    band(Predicate::Below(70.0), Tier::Crit, "Hypo risk"),
    band(Predicate::Above(250.0), Tier::Crit, "Severe hyper"),
    band(Predicate::Above(180.0), Tier::Warn, "High"),
    band(Predicate::Above(140.0), Tier::Warn, "Elevated"),
    band(Predicate::Always, Tier::Ok, "In target"),
];

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// The numeric metrics carried by a reading. Door state is categorical and
/// classified separately by [`evaluate_door`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Degrees Celsius
    Temperature,
    /// Grams
    InsulinInventoryWeight,
    /// Estimated dose units left in the pen
    InsulinLevel,
    /// mg/dL
    Glucose,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Temperature,
        Metric::InsulinInventoryWeight,
        Metric::InsulinLevel,
        Metric::Glucose,
    ];

    fn bands(self) -> &'static [Band] {
        match self {
            Metric::Temperature => TEMPERATURE_BANDS,
            Metric::InsulinInventoryWeight => INVENTORY_BANDS,
            Metric::InsulinLevel => INSULIN_LEVEL_BANDS,
            Metric::Glucose => GLUCOSE_BANDS,
        }
    }

    /// Classify `value`. Total: never panics, never errors.
    pub fn evaluate<'a>(self, value: impl Into<MetricValue<'a>>) -> SeverityStatus {
        let Some(v) = value.into().as_number() else {
            return SeverityStatus::no_data();
        };
        self.bands()
            .iter()
            .find(|b| b.when.matches(v))
            .map_or(SeverityStatus::no_data(), |b| b.status)
    }
}

// ---------------------------------------------------------------------------
// Door
// ---------------------------------------------------------------------------

/// Door state paired with the value a dashboard should show for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DoorEvaluation {
    pub value: String,
    pub status: SeverityStatus,
}

/// Classify a free-form door state string.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
/// Unrecognised states are shown verbatim (untrimmed).
pub fn evaluate_door(raw: Option<&str>) -> DoorEvaluation {
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => {
            return DoorEvaluation {
                value: "Unknown".to_owned(),
                status: SeverityStatus::no_data(),
            }
        }
    };

    match raw.trim().to_uppercase().as_str() {
        "OPEN" => DoorEvaluation {
            value: "OPEN".to_owned(),
            status: SeverityStatus::new(Tier::Crit, "Open – check quickly"),
        },
        "CLOSED" => DoorEvaluation {
            value: "Closed".to_owned(),
            status: SeverityStatus::new(Tier::Ok, "Closed"),
        },
        _ => DoorEvaluation {
            value: raw.to_owned(),
            status: SeverityStatus::new(Tier::Unknown, "Unknown state"),
        },
    }
}
