//! Simulator navigator: a stack machine over a static node graph.
//!
//! States are node ids and the current node is the top of the stack. The
//! stack is never empty. Transitions are pure functions of
//! `(NavigatorState, NavEvent) -> NavigatorState` over a read-only
//! [`SimulatorTree`]; [`Navigator`] wraps that with the payload it was built
//! from and the root-reset rule.

use crate::card::simulator::{FALLBACK_ROOT_ID, SimChoice, SimulatorPayload, SimulatorTree};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

pub const SIMULATOR_TITLE: &str = "Procedural Simulator";
pub const DATA_MISSING_MESSAGE: &str = "Simulator data missing or malformed.";

/// Resolves the entry node for a stage.
///
/// An explicit hint wins unconditionally. Otherwise the first
/// `roots_by_stage` row whose tokens all occur (case-insensitively) in the
/// stage label is used, then `default_root_id`, then [`FALLBACK_ROOT_ID`].
/// Rows with no tokens or no root id never match.
pub fn pick_root(stage_label: &str, root_hint: Option<&str>, tree: &SimulatorTree) -> String {
    if let Some(hint) = root_hint.filter(|h| !h.is_empty()) {
        return hint.to_string();
    }

    let stage = stage_label.to_lowercase();
    let matched = tree.roots_by_stage.iter().find_map(|row| {
        let all_match = !row.tokens.is_empty()
            && row
                .tokens
                .iter()
                .all(|token| stage.contains(&token.to_lowercase()));
        if all_match {
            row.root_id.clone().filter(|id| !id.is_empty())
        } else {
            None
        }
    });

    matched
        .or_else(|| tree.default_root_id.clone().filter(|id| !id.is_empty()))
        .unwrap_or_else(|| FALLBACK_ROOT_ID.to_string())
}

/// Input events for the navigator state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent<'a> {
    /// A choice button was pressed.
    Activate(&'a SimChoice),
    /// The footer back button.
    Back,
    /// Discard the traversal and start over at the given root.
    Reset(String),
}

/// The navigator stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigatorState {
    stack: Vec<String>,
}

impl NavigatorState {
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            stack: vec![root_id.into()],
        }
    }

    pub fn current(&self) -> &str {
        // The stack always holds at least the root.
        self.stack.last().map(String::as_str).unwrap_or(FALLBACK_ROOT_ID)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn can_back(&self) -> bool {
        self.stack.len() > 1
    }

    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    /// Whether a choice would change the state if activated now.
    pub fn can_activate(&self, choice: &SimChoice, tree: &SimulatorTree) -> bool {
        if choice.back {
            self.can_back()
        } else {
            choice.to.as_deref().is_some_and(|to| tree.contains(to))
        }
    }

    /// Applies one event. Invalid events leave the state unchanged.
    pub fn apply(mut self, tree: &SimulatorTree, event: NavEvent<'_>) -> Self {
        match event {
            NavEvent::Back => {
                if self.can_back() {
                    self.stack.pop();
                }
            }
            NavEvent::Activate(choice) if choice.back => {
                if self.can_back() {
                    self.stack.pop();
                }
            }
            NavEvent::Activate(choice) => match choice.to.as_deref() {
                Some(to) if tree.contains(to) => self.stack.push(to.to_string()),
                target => debug!("Ignoring choice with unresolved target {:?}", target),
            },
            NavEvent::Reset(root_id) => {
                self.stack.clear();
                self.stack.push(root_id);
            }
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceView {
    pub label: String,
    pub enabled: bool,
    pub is_back: bool,
}

/// Render-ready simulator card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SimulatorView {
    Node {
        stage_label: String,
        node_id: String,
        title: String,
        body: Option<String>,
        choices: Vec<ChoiceView>,
        can_back: bool,
        depth: usize,
    },
    /// The current node id does not resolve; only this card is affected.
    DataMissing {
        stage_label: String,
        message: &'static str,
    },
}

impl SimulatorView {
    /// The "N steps deep" crumb shown in the footer.
    pub fn crumb(&self) -> Option<String> {
        match self {
            Self::Node { depth, .. } => Some(format!(
                "{} step{} deep",
                depth,
                if *depth == 1 { "" } else { "s" }
            )),
            Self::DataMissing { .. } => None,
        }
    }
}

/// A navigator bound to one simulator card instance.
#[derive(Debug, Clone)]
pub struct Navigator {
    stage_label: String,
    root_hint: Option<String>,
    tree: Arc<SimulatorTree>,
    root_id: String,
    state: NavigatorState,
}

impl Navigator {
    pub fn new(payload: &SimulatorPayload) -> Self {
        let root_id = pick_root(
            &payload.stage_label,
            payload.root_id.as_deref(),
            &payload.tree,
        );
        if !payload.tree.contains(&root_id) {
            warn!("Simulator root '{}' is not in the node graph", root_id);
        }
        Self {
            stage_label: payload.stage_label.clone(),
            root_hint: payload.root_id.clone(),
            tree: Arc::clone(&payload.tree),
            state: NavigatorState::new(root_id.clone()),
            root_id,
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    pub fn tree(&self) -> &SimulatorTree {
        &self.tree
    }

    /// Updates the stage context. When the resolved root changes the stack
    /// is reset to that root and any traversal is discarded.
    ///
    /// Returns true if a reset happened.
    pub fn set_context(&mut self, stage_label: &str, root_hint: Option<&str>) -> bool {
        self.stage_label = stage_label.to_string();
        self.root_hint = root_hint.map(str::to_string);
        let root_id = pick_root(stage_label, root_hint, &self.tree);
        if root_id == self.root_id {
            return false;
        }
        debug!("Simulator root changed {} -> {}", self.root_id, root_id);
        self.root_id = root_id.clone();
        self.transition(NavEvent::Reset(root_id));
        true
    }

    /// Rebinds to a (possibly replaced) payload, applying the reset rule.
    pub fn sync_payload(&mut self, payload: &SimulatorPayload) -> bool {
        if !Arc::ptr_eq(&self.tree, &payload.tree) && *self.tree != *payload.tree {
            self.tree = Arc::clone(&payload.tree);
            let root_id = pick_root(&payload.stage_label, payload.root_id.as_deref(), &self.tree);
            self.stage_label = payload.stage_label.clone();
            self.root_hint = payload.root_id.clone();
            self.root_id = root_id.clone();
            self.transition(NavEvent::Reset(root_id));
            return true;
        }
        self.set_context(&payload.stage_label, payload.root_id.as_deref())
    }

    fn transition(&mut self, event: NavEvent<'_>) {
        let state = std::mem::replace(&mut self.state, NavigatorState::new(self.root_id.clone()));
        self.state = state.apply(&self.tree, event);
    }

    /// Activates a choice of the current node by index.
    ///
    /// Returns false when the index is out of range or the choice is not
    /// activatable, in which case nothing changes.
    pub fn activate(&mut self, index: usize) -> bool {
        let Some(choice) = self
            .tree
            .node(self.state.current())
            .and_then(|node| node.choices.get(index))
            .cloned()
        else {
            return false;
        };
        self.activate_choice(&choice)
    }

    pub fn activate_choice(&mut self, choice: &SimChoice) -> bool {
        if !self.state.can_activate(choice, &self.tree) {
            return false;
        }
        self.transition(NavEvent::Activate(choice));
        true
    }

    pub fn back(&mut self) -> bool {
        if !self.state.can_back() {
            return false;
        }
        self.transition(NavEvent::Back);
        true
    }

    pub fn view(&self) -> SimulatorView {
        let current = self.state.current();
        let Some(node) = self.tree.node(current) else {
            return SimulatorView::DataMissing {
                stage_label: self.stage_label.clone(),
                message: DATA_MISSING_MESSAGE,
            };
        };

        let choices = node
            .choices
            .iter()
            .map(|choice| ChoiceView {
                label: choice.display_label().to_string(),
                enabled: self.state.can_activate(choice, &self.tree),
                is_back: choice.back,
            })
            .collect();

        SimulatorView::Node {
            stage_label: self.stage_label.clone(),
            node_id: current.to_string(),
            title: node.title.clone(),
            body: node.body.clone(),
            choices,
            can_back: self.state.can_back(),
            depth: self.state.depth(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::simulator::{SimNode, StageRoot};
    use std::collections::HashMap;

    fn node(id: &str, choices: Vec<SimChoice>) -> (String, SimNode) {
        (
            id.to_string(),
            SimNode {
                id: Some(id.to_string()),
                title: id.to_uppercase(),
                body: None,
                choices,
            },
        )
    }

    fn tree() -> SimulatorTree {
        SimulatorTree {
            version: Some("v1".into()),
            default_root_id: Some("general_root".into()),
            roots_by_stage: vec![
                StageRoot {
                    tokens: vec!["pretrial".into(), "arraignment".into()],
                    root_id: Some("A".into()),
                },
                StageRoot {
                    tokens: vec!["arraignment".into()],
                    root_id: Some("B".into()),
                },
            ],
            nodes: HashMap::from([
                node(
                    "general_root",
                    vec![SimChoice::to("Discovery", "discovery"), SimChoice::to("Ghost", "nowhere")],
                ),
                node("A", vec![SimChoice::to("Discovery", "discovery")]),
                node("B", vec![]),
                node(
                    "discovery",
                    vec![SimChoice::to("Again", "discovery"), SimChoice::back("Back")],
                ),
            ]),
        }
    }

    fn payload(stage: &str, hint: Option<&str>) -> SimulatorPayload {
        SimulatorPayload {
            stage_label: stage.to_string(),
            root_id: hint.map(str::to_string),
            tree: Arc::new(tree()),
        }
    }

    #[test]
    fn test_pick_root_first_full_match_wins() {
        let t = tree();
        assert_eq!(pick_root("Pretrial / Arraignment", None, &t), "A");
        assert_eq!(pick_root("Arraignment", None, &t), "B");
        assert_eq!(pick_root("Sentencing", None, &t), "general_root");
    }

    #[test]
    fn test_pick_root_hint_wins() {
        assert_eq!(pick_root("Pretrial / Arraignment", Some("B"), &tree()), "B");
        assert_eq!(pick_root("Arraignment", Some(""), &tree()), "B");
    }

    #[test]
    fn test_pick_root_fallback_literal() {
        let t = SimulatorTree::default();
        assert_eq!(pick_root("anything", None, &t), FALLBACK_ROOT_ID);
    }

    #[test]
    fn test_pick_root_skips_empty_token_rows() {
        let mut t = tree();
        t.roots_by_stage.insert(
            0,
            StageRoot {
                tokens: vec![],
                root_id: Some("B".into()),
            },
        );
        assert_eq!(pick_root("Sentencing", None, &t), "general_root");
    }

    #[test]
    fn test_back_on_root_is_noop() {
        let t = tree();
        let state = NavigatorState::new("general_root");
        let after = state.clone().apply(&t, NavEvent::Activate(&SimChoice::back("Back")));
        assert_eq!(after, state);
        let after = state.clone().apply(&t, NavEvent::Back);
        assert_eq!(after, state);
    }

    #[test]
    fn test_push_existing_then_back() {
        let t = tree();
        let state = NavigatorState::new("general_root")
            .apply(&t, NavEvent::Activate(&SimChoice::to("D", "discovery")));
        assert_eq!(state.depth(), 2);
        assert_eq!(state.current(), "discovery");

        let state = state.apply(&t, NavEvent::Activate(&SimChoice::back("Back")));
        assert_eq!(state.depth(), 1);
        assert_eq!(state.current(), "general_root");
    }

    #[test]
    fn test_push_missing_target_is_noop() {
        let t = tree();
        let state = NavigatorState::new("general_root");
        let after = state
            .clone()
            .apply(&t, NavEvent::Activate(&SimChoice::to("Ghost", "nowhere")));
        assert_eq!(after, state);

        let no_target = SimChoice {
            label: Some("Dead".into()),
            to: None,
            back: false,
        };
        assert!(!state.can_activate(&no_target, &t));
        assert_eq!(state.clone().apply(&t, NavEvent::Activate(&no_target)), state);
    }

    #[test]
    fn test_back_flag_ignores_to() {
        let t = tree();
        let choice = SimChoice {
            label: None,
            to: Some("discovery".into()),
            back: true,
        };
        let state = NavigatorState::new("general_root").apply(&t, NavEvent::Activate(&choice));
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn test_navigator_view_disables_unresolvable_choices() {
        let nav = Navigator::new(&payload("Sentencing", None));
        match nav.view() {
            SimulatorView::Node {
                choices, can_back, ..
            } => {
                assert!(choices[0].enabled);
                assert!(!choices[1].enabled);
                assert!(!can_back);
            }
            other => panic!("unexpected view {:?}", other),
        }
        assert_eq!(nav.view().crumb().as_deref(), Some("1 step deep"));
    }

    #[test]
    fn test_navigator_activate_and_back() {
        let mut nav = Navigator::new(&payload("Sentencing", None));
        assert!(!nav.activate(1));
        assert!(!nav.activate(9));
        assert!(nav.activate(0));
        assert!(nav.activate(0));
        assert_eq!(nav.state().depth(), 3);
        assert_eq!(nav.view().crumb().as_deref(), Some("3 steps deep"));
        assert!(nav.activate(1));
        assert_eq!(nav.state().current(), "discovery");
        assert!(nav.back());
        assert!(!nav.back());
    }

    #[test]
    fn test_root_change_resets_stack() {
        let mut nav = Navigator::new(&payload("Pretrial / Arraignment", None));
        assert_eq!(nav.root_id(), "A");
        nav.activate(0);
        assert_eq!(nav.state().depth(), 2);

        // Same resolved root keeps the traversal.
        assert!(!nav.set_context("pretrial arraignment hearing", None));
        assert_eq!(nav.state().depth(), 2);

        assert!(nav.set_context("Arraignment", None));
        assert_eq!(nav.state().stack(), ["B".to_string()]);
    }

    #[test]
    fn test_dangling_root_reports_data_missing() {
        let nav = Navigator::new(&payload("Sentencing", Some("does_not_exist")));
        assert_eq!(
            nav.view(),
            SimulatorView::DataMissing {
                stage_label: "Sentencing".into(),
                message: DATA_MISSING_MESSAGE,
            }
        );
        assert!(nav.view().crumb().is_none());
    }

    #[test]
    fn test_empty_payload_reports_data_missing() {
        let nav = Navigator::new(&SimulatorPayload::default());
        assert!(matches!(nav.view(), SimulatorView::DataMissing { .. }));
    }

    #[test]
    fn test_malformed_sibling_node_does_not_hide_root() {
        let payload = SimulatorPayload::from_value(&serde_json::json!({
            "stage_label": "Pretrial",
            "root_id": "r",
            "tree": {
                "nodes": {
                    "r": {"id": "r", "title": "Start", "choices": [{"label": "Go", "to": "s"}]},
                    "s": {"id": "s", "title": null, "choices": null}
                }
            }
        }));
        let mut nav = Navigator::new(&payload);

        match nav.view() {
            SimulatorView::Node {
                stage_label,
                title,
                choices,
                ..
            } => {
                assert_eq!(stage_label, "Pretrial");
                assert_eq!(title, "Start");
                assert!(choices[0].enabled);
            }
            other => panic!("unexpected view {:?}", other),
        }

        assert!(nav.activate(0));
        match nav.view() {
            SimulatorView::Node { title, choices, .. } => {
                assert_eq!(title, "");
                assert!(choices.is_empty());
            }
            other => panic!("unexpected view {:?}", other),
        }
    }
}
