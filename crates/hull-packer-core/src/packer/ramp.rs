use super::{GridCell, ScanPattern, grid_span};

/// Anti-diagonals from the origin corner: the upper-left triangle of the grid first,
/// then the remaining diagonals of the lower-right triangle.
pub struct RampScan;

impl ScanPattern for RampScan {
    fn fill(&self, width: u32, height: u32, step: u32, out: &mut Vec<GridCell>) {
        let n = grid_span(width, height, step);
        out.reserve((n as usize) * (n as usize));
        let mut push = |k: u32, l: u32| {
            if k * step > width || l * step > height {
                return;
            }
            out.push(GridCell::new(k, l));
        };
        for j in 0..n {
            for k in 0..=j {
                push(k, j - k);
            }
        }
        for j in 1..n {
            for (k, l) in (j..n).zip((0..n).rev()) {
                push(k, l);
            }
        }
    }
}
