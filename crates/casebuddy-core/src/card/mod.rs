//! Card domain module.
//!
//! Cards are typed attachments on assistant messages. The backend sends them
//! as `{ "type": ..., "payload": ... }` objects with an opaque payload; this
//! module classifies them by type and normalizes each payload kind into
//! render-ready data.
//!
//! # Module Structure
//!
//! - `stats`: outcome distribution normalization (`normalize_stats`)
//! - `timeline`: procedural timeline filtering and context (`normalize_timeline`)
//! - `simulator`: static simulator graph model (`SimulatorPayload`, `SimulatorTree`)

pub mod simulator;
pub mod stats;
pub mod timeline;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use strum::{AsRefStr, EnumString};
use tracing::debug;

pub use simulator::{SimChoice, SimNode, SimulatorPayload, SimulatorTree, StageRoot};
pub use stats::{OutcomeCategory, OutcomeRow, StatsPayload, StatsView, normalize_stats};
pub use timeline::{
    ContextBlock, TimelineNode, TimelinePayload, TimelineView, derive_timeline_context,
    normalize_timeline,
};

// Field decoders for card payloads. A null or wrongly typed field degrades
// to its default instead of failing the whole payload.

/// Accepts ids sent as JSON strings or numbers; they compare as strings.
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Optional text. Scalars are stringified; null and containers are absent.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// Required text; anything that is not a scalar becomes empty.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// A flag with JavaScript truthiness: non-zero numbers, non-empty strings and
/// containers are true; null is false.
pub(crate) fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// A list of text entries. Scalars are stringified, other entries dropped.
pub(crate) fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items.into_iter().filter_map(scalar_text).collect())
}

/// A list whose undecodable entries are dropped. A non-array is empty.
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!("Dropping malformed card entry: {}", e);
                None
            }
        })
        .collect())
}

/// An id-keyed map whose undecodable entries are dropped.
pub(crate) fn lenient_map<'de, D, T>(deserializer: D) -> Result<HashMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(HashMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, item)| match serde_json::from_value(item) {
            Ok(decoded) => Some((key, decoded)),
            Err(e) => {
                debug!("Dropping malformed card entry '{}': {}", key, e);
                None
            }
        })
        .collect())
}

/// Any field that falls back to its default when it does not decode.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Discriminant of a card's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr)]
pub enum CardKind {
    #[strum(serialize = "stats_card")]
    Stats,
    #[strum(serialize = "timeline_card")]
    Timeline,
    #[strum(serialize = "simulator_card")]
    Simulator,
    /// Any type this client does not know. Accepted but never rendered.
    #[strum(disabled)]
    Other,
}

/// A raw card as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "type", default)]
    pub card_type: String,
    #[serde(default)]
    pub payload: Value,
}

impl Card {
    pub fn new(card_type: impl Into<String>, payload: Value) -> Self {
        Self {
            card_type: card_type.into(),
            payload,
        }
    }

    pub fn kind(&self) -> CardKind {
        CardKind::from_str(&self.card_type).unwrap_or(CardKind::Other)
    }
}

/// Cards of one message partitioned by kind.
///
/// Relative order inside each bucket follows the input order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CardBuckets<'a> {
    pub stats: Vec<&'a Card>,
    pub timeline: Vec<&'a Card>,
    pub simulator: Vec<&'a Card>,
    pub other: Vec<&'a Card>,
}

impl CardBuckets<'_> {
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
            && self.timeline.is_empty()
            && self.simulator.is_empty()
            && self.other.is_empty()
    }
}

/// Partitions cards into the four kind buckets.
pub fn classify(cards: &[Card]) -> CardBuckets<'_> {
    let mut buckets = CardBuckets::default();
    for card in cards {
        match card.kind() {
            CardKind::Stats => buckets.stats.push(card),
            CardKind::Timeline => buckets.timeline.push(card),
            CardKind::Simulator => buckets.simulator.push(card),
            CardKind::Other => buckets.other.push(card),
        }
    }
    buckets
}
