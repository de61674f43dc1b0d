use super::{GridCell, ScanPattern, grid_span};

/// Default style: a full square grid walked with the outer index as the column.
///
/// The outer index is bounded by the page height and the inner one by the width, so on
/// non-square pages part of the table falls outside the active rectangle; the overlap
/// bounds check rejects those cells. Pages grow rows first to stay roughly square.
pub struct FlipFlopScan;

impl ScanPattern for FlipFlopScan {
    fn fill(&self, width: u32, height: u32, step: u32, out: &mut Vec<GridCell>) {
        let n = grid_span(width, height, step);
        out.reserve((n as usize) * (n as usize));
        for j in 0..n {
            for k in 0..n {
                if k * step > width || j * step > height {
                    continue;
                }
                out.push(GridCell::new(j, k));
            }
        }
    }

    fn grow(&self, width: u32, height: u32, max: u32) -> (u32, u32) {
        if height <= width {
            (width, height.saturating_mul(2).min(max))
        } else {
            (width.saturating_mul(2).min(max), height)
        }
    }
}
