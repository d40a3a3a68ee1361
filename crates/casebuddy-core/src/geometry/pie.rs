//! Donut chart geometry for outcome statistics.

use crate::card::stats::{OutcomeCategory, OutcomeRow};
use serde::Serialize;
use std::f64::consts::{PI, TAU};

pub const VIEW_BOX: f64 = 120.0;
pub const CENTER: f64 = 60.0;
pub const OUTER_RADIUS: f64 = 46.0;
pub const HOLE_RADIUS: f64 = 26.0;

const BASE_OPACITY: f64 = 0.22;
const OPACITY_STEP: f64 = 0.12;

/// One wedge of the donut.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub key: OutcomeCategory,
    pub label: &'static str,
    pub value: f64,
    /// Ordinal position among the rendered rows.
    pub index: usize,
    /// Start angle in radians, measured from the positive x axis.
    pub start: f64,
    pub end: f64,
}

impl PieSlice {
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Share of the whole, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        self.span() / TAU
    }

    pub fn opacity(&self) -> f64 {
        slice_opacity(self.index)
    }

    pub fn path(&self) -> String {
        arc_path(CENTER, CENTER, OUTER_RADIUS, self.start, self.end)
    }
}

/// Rendering weight for the slice at `index`.
///
/// Depends on position only, so the legend dot and the wedge for the same
/// row always agree.
pub fn slice_opacity(index: usize) -> f64 {
    BASE_OPACITY + index as f64 * OPACITY_STEP
}

/// Lays rows out around the circle in input order.
///
/// Spans are proportional to `value / total`; the total is the actual sum,
/// not 100. A zero total is treated as 1.
pub fn pie_slices(rows: &[OutcomeRow]) -> Vec<PieSlice> {
    let sum: f64 = rows.iter().map(|r| r.value).sum();
    let total = if sum == 0.0 { 1.0 } else { sum };

    let mut acc = 0.0;
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let start = acc / total * TAU;
            acc += row.value;
            let end = acc / total * TAU;
            PieSlice {
                key: row.key,
                label: row.label,
                value: row.value,
                index,
                start,
                end,
            }
        })
        .collect()
}

fn point(cx: f64, cy: f64, r: f64, angle: f64) -> (f64, f64) {
    (cx + r * angle.cos(), cy + r * angle.sin())
}

/// SVG path for one wedge: center, out to the start point, arc to the end
/// point, close. The donut hole is a separate circle drawn above.
///
/// A wedge covering the whole circle is drawn as two half arcs, since an
/// arc whose endpoints coincide renders nothing.
pub fn arc_path(cx: f64, cy: f64, r: f64, start: f64, end: f64) -> String {
    if end - start >= TAU - 1e-9 {
        let (x1, y1) = point(cx, cy, r, start);
        let (xm, ym) = point(cx, cy, r, start + PI);
        return format!(
            "M {cx} {cy} L {x1} {y1} A {r} {r} 0 1 1 {xm} {ym} A {r} {r} 0 1 1 {x1} {y1} Z"
        );
    }

    let (x1, y1) = point(cx, cy, r, start);
    let (x2, y2) = point(cx, cy, r, end);
    let large_arc = if end - start > PI { 1 } else { 0 };
    format!("M {cx} {cy} L {x1} {y1} A {r} {r} 0 {large_arc} 1 {x2} {y2} Z")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::stats::normalize_outcomes;
    use serde_json::json;

    fn rows(value: serde_json::Value) -> Vec<OutcomeRow> {
        normalize_outcomes(value.as_object().unwrap())
    }

    #[test]
    fn test_spans_sum_to_full_circle() {
        let rows = rows(json!({"plea": 12.5, "convicted": 40, "acquitted": 3.3}));
        let slices = pie_slices(&rows);

        let sum: f64 = slices.iter().map(PieSlice::span).sum();
        assert!((sum - TAU).abs() < 1e-9);
        assert_eq!(slices[0].start, 0.0);
        assert!((slices.last().unwrap().end - TAU).abs() < 1e-9);
        for pair in slices.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_slice_order_matches_category_order() {
        let rows = rows(json!({"other_or_unknown": 90, "dismissed_or_nolle": 10}));
        let keys: Vec<_> = pie_slices(&rows).iter().map(|s| s.key).collect();
        assert_eq!(
            keys,
            vec![OutcomeCategory::DismissedOrNolle, OutcomeCategory::OtherOrUnknown]
        );
    }

    #[test]
    fn test_proportional_to_actual_total() {
        let rows = rows(json!({"plea": 10, "convicted": 30}));
        let slices = pie_slices(&rows);
        assert!((slices[0].fraction() - 0.25).abs() < 1e-12);
        assert!((slices[1].fraction() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_zero_total_does_not_divide_by_zero() {
        let rows = vec![OutcomeRow {
            key: OutcomeCategory::Plea,
            label: "Plea",
            value: 0.0,
        }];
        let slices = pie_slices(&rows);
        assert_eq!(slices[0].start, 0.0);
        assert_eq!(slices[0].end, 0.0);
        assert!(pie_slices(&[]).is_empty());
    }

    #[test]
    fn test_opacity_by_index_not_value() {
        let rows = rows(json!({"plea": 99, "convicted": 1}));
        let slices = pie_slices(&rows);
        assert!((slices[0].opacity() - 0.22).abs() < 1e-12);
        assert!((slices[1].opacity() - 0.34).abs() < 1e-12);
    }

    #[test]
    fn test_large_arc_flag() {
        let small = arc_path(60.0, 60.0, 46.0, 0.0, PI / 2.0);
        assert!(small.contains(" 0 0 1 "));
        let large = arc_path(60.0, 60.0, 46.0, 0.0, PI * 1.5);
        assert!(large.contains(" 0 1 1 "));
        assert!(large.starts_with("M 60 60 L 106 60"));
        assert!(large.ends_with('Z'));
    }

    #[test]
    fn test_full_circle_uses_two_arcs() {
        let path = arc_path(60.0, 60.0, 46.0, 0.0, TAU);
        assert_eq!(path.matches(" A ").count(), 2);
    }
}
