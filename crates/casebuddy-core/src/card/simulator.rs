//! Simulator card payload: a static, author-time node graph.
//!
//! The graph is read-only configuration. Nothing in the client mutates it;
//! the navigator walks it with its own stack.

use super::{
    lenient_flag, lenient_id, lenient_map, lenient_string, lenient_strings, lenient_text,
    lenient_vec, or_default,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Root id used when neither a stage rule nor the tree default applies.
pub const FALLBACK_ROOT_ID: &str = "general_root";

/// One row of the root-selection table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageRoot {
    /// Tokens that must all appear in the lower-cased stage label.
    #[serde(default, rename = "match", deserialize_with = "lenient_strings")]
    pub tokens: Vec<String>,
    #[serde(default, alias = "rootId", deserialize_with = "lenient_id")]
    pub root_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimChoice {
    #[serde(default, deserialize_with = "lenient_text")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub to: Option<String>,
    /// A back choice pops the navigator; `to` is ignored.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub back: bool,
}

impl SimChoice {
    pub fn to(label: &str, target: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            to: Some(target.to_string()),
            back: false,
        }
    }

    pub fn back(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            to: None,
            back: true,
        }
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().filter(|l| !l.is_empty()).unwrap_or("Option")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimNode {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub choices: Vec<SimChoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatorTree {
    #[serde(default, deserialize_with = "lenient_id")]
    pub version: Option<String>,
    #[serde(default, alias = "defaultRootId", deserialize_with = "lenient_id")]
    pub default_root_id: Option<String>,
    #[serde(default, alias = "rootsByStage", deserialize_with = "lenient_vec")]
    pub roots_by_stage: Vec<StageRoot>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub nodes: HashMap<String, SimNode>,
}

impl SimulatorTree {
    pub fn node(&self, id: &str) -> Option<&SimNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }
}

/// Raw payload of a `simulator_card`.
///
/// The tree is shared behind an `Arc` so navigators can hold it without
/// copying the graph per card instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatorPayload {
    #[serde(default, alias = "stageLabel", deserialize_with = "lenient_string")]
    pub stage_label: String,
    /// Root chosen by the backend. Wins over the stage table when present.
    #[serde(default, alias = "rootId", deserialize_with = "lenient_id")]
    pub root_id: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub tree: Arc<SimulatorTree>,
}

impl SimulatorPayload {
    /// Decodes a payload leniently. Bad fields fall back to their defaults
    /// and bad nodes or choices are dropped; a payload that is not an object
    /// becomes an empty tree, which the navigator reports as "data missing".
    pub fn from_value(value: &Value) -> Self {
        match serde_json::from_value(value.clone()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Malformed simulator payload: {}", e);
                Self::default()
            }
        }
    }
}
