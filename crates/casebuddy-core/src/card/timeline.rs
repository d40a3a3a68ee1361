//! Procedural timeline card normalization.
//!
//! A "typical next steps" entry is never drawn as a node. It becomes a prose
//! context block below the graphic instead, and the backend's generic
//! "future steps" warning is dropped when that block is present.

use super::{lenient_id, lenient_string, lenient_strings, lenient_text, lenient_vec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub const TYPICAL_STEP_TYPE: &str = "TYPICAL_STEP";
const TYPICAL_STEP_TITLE: &str = "typical next steps";
const FUTURE_STEPS_WARNING: &str = "future steps";

pub const CONTEXT_TITLE: &str = "What usually happens next (at this stage)";
pub const CONTEXT_SUBTITLE: &str =
    "Not a prediction — just the typical procedural steps people see here.";

const PRETRIAL_ARRAIGNMENT_BULLETS: &[&str] = &[
    "Pretrial status dates / conferences get scheduled",
    "Discovery: both sides exchange evidence",
    "Negotiations: possible plea discussions",
    "Motions: requests the judge can rule on (e.g., evidence issues)",
    "Either a resolution OR a trial-setting path",
];

const ARRAIGNMENT_BULLETS: &[&str] = &[
    "Next court date is usually set",
    "Bond/bail conditions may be confirmed or adjusted",
    "Initial deadlines may be assigned",
];

const GENERIC_BULLETS: &[&str] = &[
    "Next court date gets scheduled",
    "The court sets what the next procedural step is",
    "Your case moves forward based on what’s in the record",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineNode {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_text")]
    pub node_type: Option<String>,
}

impl TimelineNode {
    /// True for the "typical next steps" placeholder, matched by type tag or
    /// by a case-insensitive title match.
    pub fn is_typical_step(&self) -> bool {
        self.is_typical_by_type() || self.is_typical_by_title()
    }

    fn is_typical_by_type(&self) -> bool {
        self.node_type
            .as_deref()
            .is_some_and(|t| t.to_uppercase() == TYPICAL_STEP_TYPE)
    }

    fn is_typical_by_title(&self) -> bool {
        self.title
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(TYPICAL_STEP_TITLE))
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().filter(|t| !t.is_empty()).unwrap_or("Event")
    }
}

/// Raw payload of a `timeline_card`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelinePayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub stage: String,
    #[serde(default, alias = "nowNodeId", deserialize_with = "lenient_id")]
    pub now_node_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub nodes: Vec<TimelineNode>,
    #[serde(default, alias = "futurePlaceholders", deserialize_with = "lenient_vec")]
    pub future_placeholders: Vec<TimelineNode>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub warnings: Vec<String>,
}

impl TimelinePayload {
    pub fn from_value(value: &Value) -> Option<Self> {
        match serde_json::from_value(value.clone()) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("Malformed timeline payload: {}", e);
                None
            }
        }
    }
}

/// Prose guidance shown in place of the typical-next-step entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextBlock {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub bullets: Vec<&'static str>,
    /// Title of the placeholder entry the block was derived from.
    pub source_title: Option<String>,
}

/// Render-ready timeline card.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineView {
    pub stage: String,
    pub now_node_id: Option<String>,
    /// Nodes to draw, placeholders excluded, in input order.
    pub nodes: Vec<TimelineNode>,
    pub context: Option<ContextBlock>,
    pub warnings: Vec<String>,
}

impl TimelineView {
    pub fn from_value(value: &Value) -> Self {
        TimelinePayload::from_value(value)
            .map(|payload| normalize_timeline(&payload))
            .unwrap_or_default()
    }

    pub fn is_now(&self, node: &TimelineNode) -> bool {
        matches!((&self.now_node_id, &node.id), (Some(now), Some(id)) if now == id)
    }
}

/// A type-tagged entry anywhere in the list wins over a title match.
fn find_marker(nodes: &[TimelineNode]) -> Option<&TimelineNode> {
    nodes
        .iter()
        .find(|n| n.is_typical_by_type())
        .or_else(|| nodes.iter().find(|n| n.is_typical_by_title()))
}

fn bullets_for_stage(stage: &str) -> &'static [&'static str] {
    let stage = stage.to_lowercase();
    if stage.contains("pretrial") && stage.contains("arraignment") {
        PRETRIAL_ARRAIGNMENT_BULLETS
    } else if stage.contains("arraignment") {
        ARRAIGNMENT_BULLETS
    } else {
        GENERIC_BULLETS
    }
}

/// Builds the context block if a typical-next-step marker is present.
///
/// `future_placeholders` is searched first, then the raw node list. Bullets
/// depend only on the stage text.
pub fn derive_timeline_context(payload: &TimelinePayload) -> Option<ContextBlock> {
    let marker =
        find_marker(&payload.future_placeholders).or_else(|| find_marker(&payload.nodes))?;

    Some(ContextBlock {
        title: CONTEXT_TITLE,
        subtitle: CONTEXT_SUBTITLE,
        bullets: bullets_for_stage(&payload.stage).to_vec(),
        source_title: marker.title.clone(),
    })
}

/// Normalizes a timeline payload into a render-ready view.
pub fn normalize_timeline(payload: &TimelinePayload) -> TimelineView {
    let nodes: Vec<TimelineNode> = payload
        .nodes
        .iter()
        .filter(|n| !n.is_typical_step())
        .cloned()
        .collect();

    let context = derive_timeline_context(payload);

    let warnings = if context.is_some() {
        payload
            .warnings
            .iter()
            .filter(|w| !w.to_lowercase().contains(FUTURE_STEPS_WARNING))
            .cloned()
            .collect()
    } else {
        payload.warnings.clone()
    };

    TimelineView {
        stage: payload.stage.clone(),
        now_node_id: payload.now_node_id.clone(),
        nodes,
        context,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> TimelinePayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_typical_step_is_moved_to_context_block() {
        let p = payload(json!({
            "stage": "Filed",
            "nodes": [
                {"id": 1, "title": "Filed"},
                {"id": 2, "type": "TYPICAL_STEP", "title": "Typical next steps..."}
            ]
        }));

        let view = normalize_timeline(&p);

        assert_eq!(view.nodes.len(), 1);
        assert_eq!(view.nodes[0].id.as_deref(), Some("1"));
        let context = view.context.expect("context block");
        assert_eq!(context.title, CONTEXT_TITLE);
        assert_eq!(context.source_title.as_deref(), Some("Typical next steps..."));
        assert_eq!(context.bullets, GENERIC_BULLETS.to_vec());
    }

    #[test]
    fn test_title_match_is_case_insensitive() {
        let node = TimelineNode {
            title: Some("TYPICAL NEXT STEPS at this stage".into()),
            ..Default::default()
        };
        assert!(node.is_typical_step());

        let node = TimelineNode {
            node_type: Some("typical_step".into()),
            ..Default::default()
        };
        assert!(node.is_typical_step());

        let node = TimelineNode {
            title: Some("Arraignment".into()),
            node_type: Some("EVENT".into()),
            ..Default::default()
        };
        assert!(!node.is_typical_step());
    }

    #[test]
    fn test_future_placeholders_are_searched_first() {
        let p = payload(json!({
            "stage": "Arraignment",
            "nodes": [{"id": "a", "title": "Typical next steps (from nodes)"}],
            "future_placeholders": [{"type": "TYPICAL_STEP", "title": "from placeholders"}]
        }));

        let context = derive_timeline_context(&p).unwrap();
        assert_eq!(context.source_title.as_deref(), Some("from placeholders"));
        assert_eq!(context.bullets, ARRAIGNMENT_BULLETS.to_vec());
    }

    #[test]
    fn test_bullet_selection_by_stage() {
        assert_eq!(
            bullets_for_stage("Pretrial / Arraignment"),
            PRETRIAL_ARRAIGNMENT_BULLETS
        );
        assert_eq!(bullets_for_stage("post-ARRAIGNMENT"), ARRAIGNMENT_BULLETS);
        assert_eq!(bullets_for_stage("Sentencing"), GENERIC_BULLETS);
        assert_eq!(bullets_for_stage(""), GENERIC_BULLETS);
    }

    #[test]
    fn test_no_marker_means_no_context_and_warnings_kept() {
        let p = payload(json!({
            "stage": "Pretrial",
            "nodes": [{"id": 1, "title": "Filed"}],
            "warnings": ["Future steps are not shown", "Dates may be incomplete"]
        }));

        let view = normalize_timeline(&p);
        assert!(view.context.is_none());
        assert_eq!(view.warnings.len(), 2);
    }

    #[test]
    fn test_future_steps_warning_suppressed_with_context() {
        let p = payload(json!({
            "future_placeholders": [{"type": "TYPICAL_STEP"}],
            "warnings": ["Future steps are not predicted", "Dates may be incomplete"]
        }));

        let view = normalize_timeline(&p);
        assert!(view.context.is_some());
        assert_eq!(view.warnings, vec!["Dates may be incomplete".to_string()]);
    }

    #[test]
    fn test_now_node_compares_as_string() {
        let p = payload(json!({
            "now_node_id": "2",
            "nodes": [{"id": 1, "title": "Filed"}, {"id": 2, "title": "Arraigned"}]
        }));

        let view = normalize_timeline(&p);
        assert!(!view.is_now(&view.nodes[0]));
        assert!(view.is_now(&view.nodes[1]));
    }

    #[test]
    fn test_malformed_payload_is_empty_view() {
        let view = TimelineView::from_value(&json!("garbage"));
        assert!(view.nodes.is_empty());
        assert!(view.context.is_none());
    }

    #[test]
    fn test_type_tag_wins_over_earlier_title_match() {
        let p = payload(json!({
            "future_placeholders": [
                {"title": "Typical next steps (by title)"},
                {"type": "TYPICAL_STEP", "title": "tagged"}
            ]
        }));

        let context = derive_timeline_context(&p).unwrap();
        assert_eq!(context.source_title.as_deref(), Some("tagged"));
    }

    #[test]
    fn test_null_warnings_keep_nodes() {
        let view = TimelineView::from_value(&json!({
            "stage": "Pretrial",
            "now_node_id": 2,
            "nodes": [{"id": 1, "title": "Filed"}, {"id": 2, "title": "Arraigned"}],
            "future_placeholders": null,
            "warnings": null
        }));

        assert_eq!(view.stage, "Pretrial");
        assert_eq!(view.nodes.len(), 2);
        assert!(view.is_now(&view.nodes[1]));
        assert!(view.warnings.is_empty());
        assert!(view.context.is_none());
    }

    #[test]
    fn test_bad_entries_are_dropped_individually() {
        let view = TimelineView::from_value(&json!({
            "stage": null,
            "nodes": [
                {"id": 1, "title": null, "subtitle": 7},
                null,
                "Filed",
                {"id": 3, "title": "Arraigned", "date": null}
            ],
            "warnings": ["Dates may be incomplete", 42, null, {"x": 1}]
        }));

        assert_eq!(view.stage, "");
        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.nodes[0].display_title(), "Event");
        assert_eq!(view.nodes[0].subtitle.as_deref(), Some("7"));
        assert!(view.nodes[1].date.is_none());
        assert_eq!(view.warnings, vec!["Dates may be incomplete", "42"]);
    }
}
