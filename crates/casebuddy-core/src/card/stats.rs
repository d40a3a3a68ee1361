//! Outcome statistics card normalization.
//!
//! The backend reports outcome shares for a cohort of similar cases as a
//! `category -> percentage` map. Rendering never trusts the input order or
//! the magnitudes: categories are projected through [`OutcomeCategory`] so
//! legend and chart always list them in the same fixed order.

use super::{lenient_flag, lenient_text, or_default};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{EnumIter, IntoEnumIterator};
use tracing::warn;

pub const DEFAULT_STATS_TITLE: &str = "Similar case outcomes";
pub const DEFAULT_SKIPPED_REASON: &str = "Stats unavailable.";
pub const EMPTY_COHORT_MESSAGE: &str = "No outcome data found for this cohort.";
pub const STATS_FOOTER: &str = "Based on public Cook County disposition data (educational).";

/// The fixed outcome categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCategory {
    DismissedOrNolle,
    Plea,
    Convicted,
    Acquitted,
    OtherOrUnknown,
}

impl OutcomeCategory {
    /// Wire key used in the `outcomes_pct` map.
    pub fn key(self) -> &'static str {
        match self {
            Self::DismissedOrNolle => "dismissed_or_nolle",
            Self::Plea => "plea",
            Self::Convicted => "convicted",
            Self::Acquitted => "acquitted",
            Self::OtherOrUnknown => "other_or_unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DismissedOrNolle => "Dismissed / Nolle",
            Self::Plea => "Plea",
            Self::Convicted => "Convicted",
            Self::Acquitted => "Acquitted",
            Self::OtherOrUnknown => "Other / Unknown",
        }
    }
}

/// Raw payload of a `stats_card`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub skipped: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reason: Option<String>,
    /// Category key to percentage. Values are coerced on normalization, so
    /// numeric strings are accepted.
    #[serde(
        default,
        rename = "outcomes_pct",
        alias = "outcomes",
        alias = "outcomesPct",
        deserialize_with = "or_default"
    )]
    pub outcomes: Map<String, Value>,
}

impl StatsPayload {
    /// Decodes a payload leniently. Bad fields fall back to their defaults;
    /// only a payload that is not an object yields `None`, which renders as
    /// "unavailable".
    pub fn from_value(value: &Value) -> Option<Self> {
        match serde_json::from_value(value.clone()) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("Malformed stats payload: {}", e);
                None
            }
        }
    }
}

/// One rendered outcome entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeRow {
    pub key: OutcomeCategory,
    pub label: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StatsBody {
    /// Rows in category order, all strictly positive.
    Chart { rows: Vec<OutcomeRow> },
    /// Nothing to chart; the message explains why.
    NoData { message: String },
}

/// Render-ready stats card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsView {
    pub title: String,
    pub subtitle: String,
    pub body: StatsBody,
    pub footer: Option<&'static str>,
}

impl StatsView {
    /// The view shown for a payload that could not be decoded at all.
    pub fn unavailable() -> Self {
        Self {
            title: DEFAULT_STATS_TITLE.to_string(),
            subtitle: String::new(),
            body: StatsBody::NoData {
                message: DEFAULT_SKIPPED_REASON.to_string(),
            },
            footer: None,
        }
    }

    pub fn from_value(value: &Value) -> Self {
        StatsPayload::from_value(value)
            .map(|payload| normalize_stats(&payload))
            .unwrap_or_else(Self::unavailable)
    }

    pub fn rows(&self) -> &[OutcomeRow] {
        match &self.body {
            StatsBody::Chart { rows } => rows,
            StatsBody::NoData { .. } => &[],
        }
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(s.trim().parse::<f64>().unwrap_or(0.0)),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => Some(0.0),
    }
}

/// Projects an outcome map through the category enumeration.
///
/// Missing and null entries are dropped, values are coerced to numbers, and
/// anything not strictly positive (or not finite) is removed. The result is
/// in enumeration order, never sorted by value.
pub fn normalize_outcomes(outcomes: &Map<String, Value>) -> Vec<OutcomeRow> {
    OutcomeCategory::iter()
        .filter_map(|category| {
            let value = coerce_number(outcomes.get(category.key())?)?;
            (value.is_finite() && value > 0.0).then_some(OutcomeRow {
                key: category,
                label: category.label(),
                value,
            })
        })
        .collect()
}

/// Normalizes a stats payload into a render-ready view.
pub fn normalize_stats(payload: &StatsPayload) -> StatsView {
    let title = payload
        .title
        .clone()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_STATS_TITLE.to_string());
    let subtitle = payload.subtitle.clone().unwrap_or_default();

    if payload.skipped {
        let message = payload
            .reason
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_SKIPPED_REASON.to_string());
        return StatsView {
            title,
            subtitle,
            body: StatsBody::NoData { message },
            footer: None,
        };
    }

    let rows = normalize_outcomes(&payload.outcomes);
    let body = if rows.is_empty() {
        StatsBody::NoData {
            message: EMPTY_COHORT_MESSAGE.to_string(),
        }
    } else {
        StatsBody::Chart { rows }
    };

    StatsView {
        title,
        subtitle,
        body,
        footer: Some(STATS_FOOTER),
    }
}
