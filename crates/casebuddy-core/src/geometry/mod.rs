//! Pure geometry derivations: donut slices for stats cards and row layout
//! for timeline cards. No state.

pub mod pie;
pub mod timeline;

pub use pie::{PieSlice, arc_path, pie_slices, slice_opacity};
pub use timeline::{TimelineLayout, TimelineRow, layout_timeline};
