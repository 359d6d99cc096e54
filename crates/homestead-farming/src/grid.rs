//! Grid layout: enumerates every addressable plot coordinate.

use ahash::AHashSet;
use homestead_common::PlotCoord;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Generates every plot coordinate of a `rows` x `cols` grid.
///
/// The outer loop walks columns along the x axis and the inner loop walks
/// rows along the z axis, so index `col * rows + row` always maps to the same
/// cell. Offsets are `round(index * spacing)`; y stays at the origin height.
#[must_use]
pub fn generate(rows: u32, cols: u32, origin: PlotCoord, spacing: f32) -> Vec<PlotCoord> {
    let mut coords = Vec::with_capacity(rows as usize * cols as usize);
    for col in 0..cols {
        for row in 0..rows {
            coords.push(PlotCoord::new(
                origin.x + scaled(col, spacing),
                origin.y,
                origin.z + scaled(row, spacing),
            ));
        }
    }
    coords
}

fn scaled(index: u32, spacing: f32) -> i32 {
    (index as f32 * spacing).round() as i32
}

/// The addressable plots of a generated grid.
///
/// Holds each coordinate once, in generation order. Spacing below one can
/// round neighbouring cells onto the same coordinate; later repeats are
/// dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    coords: Vec<PlotCoord>,
}

impl GridLayout {
    /// Builds the layout, generating all coordinates up front.
    #[must_use]
    pub fn new(rows: u32, cols: u32, origin: PlotCoord, spacing: f32) -> Self {
        let generated = generate(rows, cols, origin, spacing);
        let mut seen = AHashSet::with_capacity(generated.len());
        let coords: Vec<PlotCoord> = generated
            .iter()
            .copied()
            .filter(|pos| seen.insert(*pos))
            .collect();
        if coords.len() < generated.len() {
            warn!(
                "Grid {rows}x{cols} at spacing {spacing} collapses to {} unique plots",
                coords.len()
            );
        }
        Self { coords }
    }

    /// All coordinates in generation order.
    #[must_use]
    pub fn coordinates(&self) -> &[PlotCoord] {
        &self.coords
    }

    /// Number of coordinates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Checks whether the layout has no coordinates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Checks whether `pos` is one of the generated coordinates.
    #[must_use]
    pub fn contains(&self, pos: PlotCoord) -> bool {
        self.coords.contains(&pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_count() {
        let coords = generate(5, 5, PlotCoord::default(), 10.0);
        assert_eq!(coords.len(), 25);

        let coords = generate(2, 7, PlotCoord::default(), 1.0);
        assert_eq!(coords.len(), 14);
    }

    #[test]
    fn test_generate_order_and_spacing() {
        let coords = generate(2, 2, PlotCoord::new(100, 3, -50), 10.0);
        assert_eq!(
            coords,
            vec![
                PlotCoord::new(100, 3, -50),
                PlotCoord::new(100, 3, -40),
                PlotCoord::new(110, 3, -50),
                PlotCoord::new(110, 3, -40),
            ]
        );
    }

    #[test]
    fn test_fractional_spacing_rounds() {
        let coords = generate(3, 1, PlotCoord::default(), 1.5);
        let zs: Vec<i32> = coords.iter().map(|c| c.z).collect();
        // 0.0, 1.5, 3.0 rounded half away from zero
        assert_eq!(zs, vec![0, 2, 3]);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = generate(4, 6, PlotCoord::new(1, 2, 3), 2.5);
        let b = generate(4, 6, PlotCoord::new(1, 2, 3), 2.5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_coordinates_unique() {
        let coords = generate(5, 5, PlotCoord::default(), 10.0);
        let unique: std::collections::HashSet<_> = coords.iter().collect();
        assert_eq!(unique.len(), coords.len());
    }

    #[test]
    fn test_layout_contains() {
        let layout = GridLayout::new(3, 3, PlotCoord::default(), 2.0);
        assert_eq!(layout.len(), 9);
        assert!(layout.contains(PlotCoord::new(4, 0, 2)));
        assert!(!layout.contains(PlotCoord::new(1, 0, 0)));
    }

    #[test]
    fn test_layout_drops_repeated_coordinates() {
        // 0.0, 0.4, 0.8, 1.2 round to 0, 0, 1, 1
        let layout = GridLayout::new(1, 4, PlotCoord::default(), 0.4);
        assert_eq!(
            layout.coordinates(),
            &[PlotCoord::new(0, 0, 0), PlotCoord::new(1, 0, 0)]
        );
        assert_eq!(generate(1, 4, PlotCoord::default(), 0.4).len(), 4);
    }
}
