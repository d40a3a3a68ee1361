//! One simulator navigator per rendered simulator card.

use crate::render::TranscriptEntry;
use casebuddy_core::navigator::Navigator;
use std::collections::HashMap;
use tracing::debug;

/// Identifies a simulator card instance within the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardKey {
    pub message_id: String,
    pub card_index: usize,
}

impl CardKey {
    pub fn new(message_id: impl Into<String>, card_index: usize) -> Self {
        Self {
            message_id: message_id.into(),
            card_index,
        }
    }
}

/// Owns navigator stacks so traversal survives re-renders.
///
/// Navigators never share state with each other or with the engine; each
/// only reads the payload of its own card.
#[derive(Debug, Default)]
pub struct NavigatorRegistry {
    navigators: HashMap<CardKey, Navigator>,
    latest: Option<CardKey>,
}

impl NavigatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.navigators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.navigators.is_empty()
    }

    /// Reconciles with freshly rendered entries.
    ///
    /// New cards get a navigator at their selected root. Existing ones are
    /// re-synced, which resets them if their root changed. Navigators for
    /// cards no longer in the transcript are dropped.
    pub fn sync(&mut self, entries: &[TranscriptEntry]) {
        let mut seen = Vec::new();

        for entry in entries {
            for layer in &entry.simulators {
                let key = CardKey::new(entry.message_id.clone(), layer.card_index);
                match self.navigators.get_mut(&key) {
                    Some(navigator) => {
                        if navigator.sync_payload(&layer.payload) {
                            debug!("Navigator {:?} reset to {}", key, navigator.root_id());
                        }
                    }
                    None => {
                        self.navigators
                            .insert(key.clone(), Navigator::new(&layer.payload));
                    }
                }
                seen.push(key);
            }
        }

        self.navigators.retain(|key, _| seen.contains(key));
        self.latest = seen.pop();
    }

    pub fn get(&self, key: &CardKey) -> Option<&Navigator> {
        self.navigators.get(key)
    }

    pub fn get_mut(&mut self, key: &CardKey) -> Option<&mut Navigator> {
        self.navigators.get_mut(key)
    }

    /// Key of the last simulator card in transcript order.
    pub fn latest_key(&self) -> Option<&CardKey> {
        self.latest.as_ref()
    }

    pub fn latest_mut(&mut self) -> Option<&mut Navigator> {
        let key = self.latest.as_ref()?;
        self.navigators.get_mut(key)
    }
}
