use crate::config::PackingStyle;
use serde::{Deserialize, Serialize};

pub mod flip_flop;
pub mod ramp;
pub mod square;

pub use flip_flop::FlipFlopScan;
pub use ramp::RampScan;
pub use square::SquareScan;

/// Anchor cell on the placement grid. Pixel offset is `(col * step, row * step)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub col: u32,
    pub row: u32,
}

impl GridCell {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// A scan pattern decides the order in which anchor cells are tried and how a page
/// grows once every cell has been rejected.
///
/// Implementations must be pure functions of their arguments: placement ties are broken
/// by table order alone, so the same page size must always produce the same table.
pub trait ScanPattern: Sync {
    /// Appends the anchor cells for a `width x height` page with grid step `step`.
    fn fill(&self, width: u32, height: u32, step: u32, out: &mut Vec<GridCell>);

    /// Page size to retry with after an exhausted search. Both axes are capped at `max`.
    fn grow(&self, width: u32, height: u32, max: u32) -> (u32, u32) {
        (
            width.saturating_mul(2).min(max),
            height.saturating_mul(2).min(max),
        )
    }
}

/// Returns the scan pattern for a packing style.
pub fn scan_pattern(style: PackingStyle) -> &'static dyn ScanPattern {
    match style {
        PackingStyle::Ramp => &RampScan,
        PackingStyle::Default => &FlipFlopScan,
        PackingStyle::Square => &SquareScan,
    }
}

/// Builds the full candidate table for a page size.
pub fn candidate_table(style: PackingStyle, width: u32, height: u32, step: u32) -> Vec<GridCell> {
    let mut out = Vec::new();
    scan_pattern(style).fill(width, height, step, &mut out);
    out
}

/// Grid extent shared by all patterns: the larger of the column and row counts.
pub(crate) fn grid_span(width: u32, height: u32, step: u32) -> u32 {
    if step == 0 {
        return 0;
    }
    (width / step).max(height / step)
}
