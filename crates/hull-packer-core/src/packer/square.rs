use super::{GridCell, ScanPattern, grid_span};

/// Square shells around the origin corner. Shell `j` walks row `j` left to right,
/// then column `j` back up to row 0.
pub struct SquareScan;

impl ScanPattern for SquareScan {
    fn fill(&self, width: u32, height: u32, step: u32, out: &mut Vec<GridCell>) {
        let n = grid_span(width, height, step);
        out.reserve((n as usize) * (n as usize));
        for j in 0..n {
            for k in 0..=j {
                if k * step > width || j * step > height {
                    continue;
                }
                out.push(GridCell::new(k, j));
            }
            for k in (0..j).rev() {
                if j * step > width || k * step > height {
                    continue;
                }
                out.push(GridCell::new(j, k));
            }
        }
    }
}
