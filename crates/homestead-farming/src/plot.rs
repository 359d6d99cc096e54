//! Per-plot business data.

use homestead_common::{CropId, PlotCoord};
use serde::{Deserialize, Serialize};

/// Unlock/occupancy status of a plot's soil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SoilState {
    /// Not yet unlocked; cannot be planted.
    #[default]
    Locked,
    /// Unlocked and bare.
    UnlockedEmpty,
    /// Unlocked with a crop growing or mature.
    UnlockedPlanted,
}

impl SoilState {
    /// Get the display name of this state.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Locked => "Locked",
            Self::UnlockedEmpty => "Empty",
            Self::UnlockedPlanted => "Planted",
        }
    }

    /// Check if the plot counts against the farm capacity.
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Locked)
    }
}

/// Authoritative state of one farm plot.
///
/// Holds no visual handles; the presentation layer derives everything it
/// shows from these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmPlot {
    /// Grid address.
    pub position: PlotCoord,
    /// Crop currently planted.
    pub crop: Option<CropId>,
    /// Farm-clock time of planting (seconds).
    pub plant_time: f64,
    /// Growth progress from 0.0 to 1.0.
    pub growth_progress: f32,
    /// Whether a crop is planted.
    pub is_planted: bool,
    /// Whether the planted crop is mature.
    pub is_grown: bool,
    /// Soil unlock/occupancy state.
    pub soil_state: SoilState,
    /// Index into the crop's stage table.
    pub current_stage_index: usize,
}

impl FarmPlot {
    /// A locked plot at `position`.
    #[must_use]
    pub fn locked(position: PlotCoord) -> Self {
        Self {
            position,
            crop: None,
            plant_time: 0.0,
            growth_progress: 0.0,
            is_planted: false,
            is_grown: false,
            soil_state: SoilState::Locked,
            current_stage_index: 0,
        }
    }

    /// An unlocked, empty plot at `position`.
    #[must_use]
    pub fn empty(position: PlotCoord) -> Self {
        Self {
            soil_state: SoilState::UnlockedEmpty,
            ..Self::locked(position)
        }
    }

    /// A freshly planted plot.
    #[must_use]
    pub fn planted(position: PlotCoord, crop: CropId, now: f64) -> Self {
        let mut plot = Self::empty(position);
        plot.sow(crop, now);
        plot
    }

    /// Start a new planting cycle on this plot.
    pub(crate) fn sow(&mut self, crop: CropId, now: f64) {
        self.crop = Some(crop);
        self.plant_time = now;
        self.growth_progress = 0.0;
        self.is_planted = true;
        self.is_grown = false;
        self.soil_state = SoilState::UnlockedPlanted;
        self.current_stage_index = 0;
    }

    /// Clear crop fields after harvest, leaving the soil unlocked.
    pub(crate) fn reset(&mut self) {
        *self = Self::empty(self.position);
    }

    /// Check if the plot can be harvested.
    #[must_use]
    pub fn is_harvestable(&self) -> bool {
        self.is_planted && self.is_grown
    }

    /// Check if the plot is still growing.
    #[must_use]
    pub fn is_growing(&self) -> bool {
        self.is_planted && !self.is_grown
    }

    /// Check the per-plot invariants: an unplanted plot carries no crop data,
    /// and `is_grown` matches `growth_progress >= 1`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let crop_fields_ok = self.is_planted
            || (self.crop.is_none()
                && self.growth_progress == 0.0
                && self.current_stage_index == 0
                && !self.is_grown);
        let maturity_ok = self.is_grown == (self.growth_progress >= 1.0);
        let soil_ok = self.is_planted == (self.soil_state == SoilState::UnlockedPlanted);
        crop_fields_ok && maturity_ok && soil_ok
    }
}

/// Output of a successful harvest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestItem {
    /// Crop display name.
    pub name: String,
    /// Number of items.
    pub stack_count: u32,
    /// Sell price per item.
    pub unit_sell_price: u32,
}

impl HarvestItem {
    /// Total sell value of the stack.
    #[must_use]
    pub fn total_value(&self) -> u64 {
        u64::from(self.stack_count) * u64::from(self.unit_sell_price)
    }
}
