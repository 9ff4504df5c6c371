/// Position of a value inside a strictly increasing grid: the lower node of the
/// bracketing interval and the offset within it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FracIndex {
    pub index: usize,
    pub fraction: f64,
}

impl FracIndex {
    /// Locates `value` in `grid` (at least two nodes). Values at or past the last
    /// node reuse the last interval. The fraction is clamped to [0, 1], so there is
    /// no extrapolation.
    pub fn locate(grid: &[f64], value: f64) -> Self {
        debug_assert!(grid.len() >= 2);
        let last_interval = grid.len() - 2;
        let index = grid
            .partition_point(|&node| node <= value)
            .saturating_sub(1)
            .min(last_interval);
        let fraction = (value - grid[index]) / (grid[index + 1] - grid[index]);
        Self {
            index,
            fraction: fraction.clamp(0.0, 1.0),
        }
    }

    pub fn upper(&self) -> usize {
        self.index + 1
    }

    /// Linear blend between the values at `index` and `index + 1`.
    pub fn lerp(&self, lower: f64, upper: f64) -> f64 {
        lower + self.fraction * (upper - lower)
    }
}
