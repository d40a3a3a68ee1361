//! Vertical timeline layout.

use crate::card::timeline::TimelineView;
use serde::Serialize;

pub const WIDTH: f64 = 340.0;
/// x of the vertical spine.
pub const SPINE_X: f64 = 26.0;
/// x where labels start.
pub const LABEL_X: f64 = 52.0;
pub const TOP_PAD: f64 = 14.0;
pub const ROW_HEIGHT: f64 = 62.0;
pub const ROW_OFFSET: f64 = 24.0;
pub const MIN_HEIGHT: f64 = 160.0;
pub const BOTTOM_MARGIN: f64 = 20.0;
pub const NODE_RADIUS: f64 = 6.0;
pub const NOW_RING_RADIUS: f64 = 12.0;
pub const LABEL_WIDTH: f64 = WIDTH - LABEL_X - 8.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub node_id: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub date: Option<String>,
    pub y: f64,
    /// Whether this row gets the "now" ring.
    pub is_now: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineLayout {
    pub width: f64,
    pub height: f64,
    pub spine_top: f64,
    pub spine_bottom: f64,
    pub rows: Vec<TimelineRow>,
}

/// Canvas height for `node_count` rows.
pub fn timeline_height(node_count: usize) -> f64 {
    let needed = TOP_PAD * 2.0 + node_count as f64 * ROW_HEIGHT + BOTTOM_MARGIN;
    needed.max(MIN_HEIGHT)
}

/// Vertical position of the row at `index`.
pub fn row_y(index: usize) -> f64 {
    TOP_PAD + index as f64 * ROW_HEIGHT + ROW_OFFSET
}

fn non_blank(text: &Option<String>) -> Option<String> {
    text.clone().filter(|t| !t.trim().is_empty())
}

/// Lays out the already filtered nodes of a timeline view.
pub fn layout_timeline(view: &TimelineView) -> TimelineLayout {
    let height = timeline_height(view.nodes.len());
    let rows = view
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| TimelineRow {
            node_id: node.id.clone(),
            title: node.display_title().to_string(),
            subtitle: non_blank(&node.subtitle),
            date: non_blank(&node.date),
            y: row_y(index),
            is_now: view.is_now(node),
        })
        .collect();

    TimelineLayout {
        width: WIDTH,
        height,
        spine_top: TOP_PAD,
        spine_bottom: height - TOP_PAD,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::timeline::TimelineView;
    use serde_json::json;

    #[test]
    fn test_row_positions() {
        assert_eq!(row_y(0), 38.0);
        assert_eq!(row_y(1), 100.0);
        assert_eq!(row_y(3), 224.0);
    }

    #[test]
    fn test_height_has_minimum() {
        assert_eq!(timeline_height(0), MIN_HEIGHT);
        assert_eq!(timeline_height(1), MIN_HEIGHT);
        assert_eq!(timeline_height(2), 172.0);
        assert_eq!(timeline_height(5), 358.0);
    }

    #[test]
    fn test_layout_skips_placeholder_and_marks_now() {
        let view = TimelineView::from_value(&json!({
            "stage": "Arraignment",
            "now_node_id": 2,
            "nodes": [
                {"id": 1, "title": "Filed", "date": "2024-01-02"},
                {"id": 2, "title": "Arraigned"},
                {"id": 3, "type": "TYPICAL_STEP", "title": "Typical next steps"},
                {"id": 4}
            ]
        }));

        let layout = layout_timeline(&view);

        assert_eq!(layout.rows.len(), 3);
        let now: Vec<_> = layout.rows.iter().map(|r| r.is_now).collect();
        assert_eq!(now, vec![false, true, false]);
        assert_eq!(layout.rows[0].date.as_deref(), Some("2024-01-02"));
        assert_eq!(layout.rows[2].title, "Event");
        assert_eq!(layout.rows[2].y, row_y(2));
        assert_eq!(layout.height, 234.0);
        assert_eq!(layout.spine_bottom, 220.0);
    }

    #[test]
    fn test_blank_subtitle_and_date_are_omitted() {
        let view = TimelineView::from_value(&json!({
            "nodes": [
                {"id": 1, "title": "Filed", "subtitle": "", "date": "  "},
                {"id": 2, "title": "Arraigned", "subtitle": "Courtroom 302"}
            ]
        }));

        let layout = layout_timeline(&view);
        assert!(layout.rows[0].subtitle.is_none());
        assert!(layout.rows[0].date.is_none());
        assert_eq!(layout.rows[1].subtitle.as_deref(), Some("Courtroom 302"));
    }
}
