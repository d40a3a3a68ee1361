//! Turns transcript messages into layered, render-ready entries.
//!
//! Layer order per assistant message: timelines, stats, the text bubble,
//! then simulators. Unknown card types are counted but never rendered.

use casebuddy_core::card::{SimulatorPayload, StatsView, TimelineView, classify};
use casebuddy_core::geometry::{PieSlice, TimelineLayout, layout_timeline, pie_slices};
use casebuddy_core::session::{ChatMessage, MessageRole};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineLayer {
    pub view: TimelineView,
    pub layout: TimelineLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsLayer {
    pub view: StatsView,
    /// Empty when the view is in its "no data" state.
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatorLayer {
    /// Position among this message's simulator cards.
    pub card_index: usize,
    pub payload: SimulatorPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub message_id: String,
    pub role: MessageRole,
    pub content: String,
    pub timelines: Vec<TimelineLayer>,
    pub stats: Vec<StatsLayer>,
    pub simulators: Vec<SimulatorLayer>,
    pub inert_cards: usize,
}

pub fn render_message(message: &ChatMessage) -> TranscriptEntry {
    let mut entry = TranscriptEntry {
        message_id: message.id.clone(),
        role: message.role,
        content: message.content.clone(),
        timelines: Vec::new(),
        stats: Vec::new(),
        simulators: Vec::new(),
        inert_cards: 0,
    };
    if message.is_user() {
        return entry;
    }

    let buckets = classify(&message.cards);

    entry.timelines = buckets
        .timeline
        .iter()
        .map(|card| {
            let view = TimelineView::from_value(&card.payload);
            let layout = layout_timeline(&view);
            TimelineLayer { view, layout }
        })
        .collect();

    entry.stats = buckets
        .stats
        .iter()
        .map(|card| {
            let view = StatsView::from_value(&card.payload);
            let slices = pie_slices(view.rows());
            StatsLayer { view, slices }
        })
        .collect();

    entry.simulators = buckets
        .simulator
        .iter()
        .enumerate()
        .map(|(card_index, card)| SimulatorLayer {
            card_index,
            payload: SimulatorPayload::from_value(&card.payload),
        })
        .collect();

    entry.inert_cards = buckets.other.len();
    entry
}

pub fn render_transcript(messages: &[ChatMessage]) -> Vec<TranscriptEntry> {
    messages.iter().map(render_message).collect()
}
