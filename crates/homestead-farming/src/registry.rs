//! Plot registry: authoritative coordinate -> plot mapping with a capacity cap.

use crate::plot::{FarmPlot, SoilState};
use ahash::AHashMap;
use homestead_common::PlotCoord;
use thiserror::Error;

/// Registry error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A plot already exists at this coordinate
    #[error("Plot already registered at {0}")]
    Duplicate(PlotCoord),
    /// Activating another plot would exceed the cap
    #[error("Active plot capacity reached ({max})")]
    CapacityExceeded {
        /// Configured maximum
        max: usize,
    },
    /// No plot at this coordinate
    #[error("No plot at {0}")]
    NotFound(PlotCoord),
    /// Plot is not locked, so it cannot be unlocked
    #[error("Plot at {0} is already unlocked")]
    AlreadyUnlocked(PlotCoord),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Owns every plot and tracks which ones are active (not locked).
#[derive(Debug, Clone)]
pub struct PlotRegistry {
    /// All plots by coordinate.
    plots: AHashMap<PlotCoord, FarmPlot>,
    /// Active coordinates in activation order.
    active: Vec<PlotCoord>,
    /// Maximum number of active plots.
    max_active: usize,
}

impl PlotRegistry {
    /// Create an empty registry with the given active-plot cap.
    #[must_use]
    pub fn new(max_active: usize) -> Self {
        Self {
            plots: AHashMap::new(),
            active: Vec::new(),
            max_active,
        }
    }

    /// Get the plot at a position.
    #[must_use]
    pub fn try_get(&self, pos: PlotCoord) -> Option<&FarmPlot> {
        self.plots.get(&pos)
    }

    /// Mutable access for lifecycle and growth updates.
    ///
    /// Callers must not change `soil_state` between locked and active
    /// through this; use [`Self::unlock`] so the active list stays in sync.
    pub(crate) fn get_mut(&mut self, pos: PlotCoord) -> Option<&mut FarmPlot> {
        self.plots.get_mut(&pos)
    }

    /// Insert a new plot.
    ///
    /// Fails if the coordinate is taken, or if the plot is active and the
    /// registry is already at capacity.
    pub fn insert(&mut self, plot: FarmPlot) -> RegistryResult<()> {
        let pos = plot.position;
        if self.plots.contains_key(&pos) {
            return Err(RegistryError::Duplicate(pos));
        }
        if plot.soil_state.is_active() {
            if !self.has_capacity() {
                return Err(RegistryError::CapacityExceeded {
                    max: self.max_active,
                });
            }
            self.active.push(pos);
        }
        self.plots.insert(pos, plot);
        Ok(())
    }

    /// Promote a locked plot to unlocked-empty.
    pub fn unlock(&mut self, pos: PlotCoord) -> RegistryResult<()> {
        let has_capacity = self.has_capacity();
        let max = self.max_active;
        let plot = self
            .plots
            .get_mut(&pos)
            .ok_or(RegistryError::NotFound(pos))?;
        if plot.soil_state.is_active() {
            return Err(RegistryError::AlreadyUnlocked(pos));
        }
        if !has_capacity {
            return Err(RegistryError::CapacityExceeded { max });
        }
        plot.soil_state = SoilState::UnlockedEmpty;
        self.active.push(pos);
        Ok(())
    }

    /// Remove a plot. Only used at teardown.
    pub fn remove(&mut self, pos: PlotCoord) -> Option<FarmPlot> {
        let plot = self.plots.remove(&pos)?;
        self.active.retain(|p| *p != pos);
        Some(plot)
    }

    /// Remove every plot.
    pub fn clear(&mut self) {
        self.plots.clear();
        self.active.clear();
    }

    /// Copy of all active plots in activation order.
    ///
    /// The growth scheduler iterates this instead of the live map, so a plot
    /// reset or planted mid-pass cannot disturb the iteration.
    #[must_use]
    pub fn snapshot(&self) -> Vec<FarmPlot> {
        self.active
            .iter()
            .filter_map(|pos| self.plots.get(pos))
            .cloned()
            .collect()
    }

    /// Check whether a crop could be planted at `pos`.
    ///
    /// New coordinates need free capacity; existing ones must be unlocked
    /// and empty.
    /// An existing empty plot already counts as active, so capacity is not
    /// checked for it even when the active count is at the cap.
    #[must_use]
    pub fn can_plant_at(&self, pos: PlotCoord) -> bool {
        match self.plots.get(&pos) {
            None => self.has_capacity(),
            Some(plot) => plot.soil_state == SoilState::UnlockedEmpty,
        }
    }

    /// Check whether another plot can be activated.
    #[must_use]
    pub fn has_capacity(&self) -> bool {
        self.active.len() < self.max_active
    }

    /// Number of plots still available under the cap.
    #[must_use]
    pub fn headroom(&self) -> usize {
        self.max_active.saturating_sub(self.active.len())
    }

    /// Number of active plots.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Configured active-plot cap.
    #[must_use]
    pub const fn max_active(&self) -> usize {
        self.max_active
    }

    /// Number of mature plots waiting for harvest.
    #[must_use]
    pub fn ready_to_harvest_count(&self) -> usize {
        self.active
            .iter()
            .filter_map(|pos| self.plots.get(pos))
            .filter(|plot| plot.is_harvestable())
            .count()
    }

    /// Total number of registered plots, locked included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plots.len()
    }

    /// Check whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    /// Active coordinates in activation order.
    #[must_use]
    pub fn active_positions(&self) -> &[PlotCoord] {
        &self.active
    }

    /// Iterate over all plots (unordered).
    pub fn iter(&self) -> impl Iterator<Item = (&PlotCoord, &FarmPlot)> {
        self.plots.iter()
    }
}
