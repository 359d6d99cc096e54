//! Plot lifecycle: plant, harvest, and expand.
//!
//! Every operation checks all preconditions before touching the registry,
//! so a rejected call leaves the farm exactly as it was.

use crate::catalog::CropCatalog;
use crate::economy::{Economy, EconomyError};
use crate::events::{FarmEvent, FarmEventBus};
use crate::plot::{FarmPlot, HarvestItem, SoilState};
use crate::registry::PlotRegistry;
use ahash::AHashSet;
use homestead_common::{CropId, PlotCoord};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Reasons a plant request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlantError {
    /// Crop is not in the catalog
    #[error("Unknown crop {0}")]
    UnknownCrop(CropId),
    /// Plot has not been unlocked yet
    #[error("Plot at {0} is locked")]
    PlotLocked(PlotCoord),
    /// Plot already has a crop
    #[error("Plot at {0} is already planted")]
    AlreadyPlanted(PlotCoord),
    /// A new plot would exceed the active-plot cap
    #[error("Max farm plots reached ({max})")]
    CapacityExceeded {
        /// Configured maximum
        max: usize,
    },
}

/// Reasons a harvest request is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarvestError {
    /// Nothing planted here (or no plot at all)
    #[error("Nothing planted at {0}")]
    NotPlanted(PlotCoord),
    /// Crop is still growing
    #[error("Crop at {position} is not mature ({:.0}%)", .progress * 100.0)]
    NotMature {
        /// Plot position
        position: PlotCoord,
        /// Current growth progress
        progress: f32,
    },
    /// The planted crop's configuration is gone from the catalog
    #[error("No configuration for {crop} planted at {position}")]
    UnknownCropConfig {
        /// Plot position
        position: PlotCoord,
        /// Crop planted there
        crop: CropId,
    },
}

/// Reasons an expansion is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// Asked to unlock zero plots
    #[error("Expansion count must be positive")]
    ZeroCount,
    /// Every candidate is already unlocked
    #[error("No locked plots left to unlock")]
    NoLockedPlots,
    /// Capacity cap already reached
    #[error("Max farm plots reached ({max})")]
    CapacityExceeded {
        /// Configured maximum
        max: usize,
    },
    /// Economy reported too little money
    #[error("Insufficient funds: expansion costs {needed}")]
    InsufficientFunds {
        /// Total cost of the expansion
        needed: u64,
    },
    /// Economy refused the charge
    #[error("Payment failed: {0}")]
    Payment(#[from] EconomyError),
}

/// Result of a successful expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandReport {
    /// Newly unlocked positions, in candidate order.
    pub unlocked: Vec<PlotCoord>,
    /// Total amount charged.
    pub cost: u64,
}

/// Lifecycle operations over a registry, evaluated at farm-clock time `now`.
#[derive(Debug)]
pub struct PlotLifecycle<'a> {
    registry: &'a mut PlotRegistry,
    catalog: &'a CropCatalog,
    events: &'a FarmEventBus,
    now: f64,
}

impl<'a> PlotLifecycle<'a> {
    /// Borrow the pieces a lifecycle operation needs.
    #[must_use]
    pub fn new(
        registry: &'a mut PlotRegistry,
        catalog: &'a CropCatalog,
        events: &'a FarmEventBus,
        now: f64,
    ) -> Self {
        Self {
            registry,
            catalog,
            events,
            now,
        }
    }

    /// Plant `crop` at `pos`.
    ///
    /// The coordinate must be unlocked and empty, or not yet registered
    /// (in which case it needs free capacity).
    pub fn plant(&mut self, pos: PlotCoord, crop: CropId) -> Result<(), PlantError> {
        let Some(data) = self.catalog.get(crop) else {
            warn!("Plant rejected at {pos}: unknown crop {crop}");
            return Err(PlantError::UnknownCrop(crop));
        };

        let existing = self
            .registry
            .try_get(pos)
            .map(|plot| (plot.soil_state, plot.is_planted));
        match existing {
            Some((SoilState::Locked, _)) => {
                debug!("Plant rejected at {pos}: plot locked");
                return Err(PlantError::PlotLocked(pos));
            },
            Some((_, true)) => {
                debug!("Plant rejected at {pos}: already planted");
                return Err(PlantError::AlreadyPlanted(pos));
            },
            Some(_) => {
                if let Some(plot) = self.registry.get_mut(pos) {
                    plot.sow(crop, self.now);
                }
            },
            None => {
                let max = self.registry.max_active();
                if self
                    .registry
                    .insert(FarmPlot::planted(pos, crop, self.now))
                    .is_err()
                {
                    debug!("Plant rejected at {pos}: capacity {max} reached");
                    return Err(PlantError::CapacityExceeded { max });
                }
            },
        }

        self.events.publish(FarmEvent::SoilChanged {
            position: pos,
            state: SoilState::UnlockedPlanted,
        });
        if let Some(stage) = data.initial_stage() {
            self.events.publish(FarmEvent::CropPlanted {
                position: pos,
                crop,
                stage_index: 0,
                stage: stage.clone(),
            });
        }
        debug!(
            "Planted {} at {pos} (matures in {}s)",
            data.name, data.growth_time
        );
        Ok(())
    }

    /// Harvest the mature crop at `pos` and reset the plot to empty soil.
    pub fn harvest(&mut self, pos: PlotCoord) -> Result<HarvestItem, HarvestError> {
        let plot = match self.registry.try_get(pos) {
            Some(plot) if plot.is_planted => plot,
            _ => {
                debug!("Harvest rejected at {pos}: nothing planted");
                return Err(HarvestError::NotPlanted(pos));
            },
        };
        if !plot.is_grown {
            debug!(
                "Harvest rejected at {pos}: {:.0}% grown",
                plot.growth_progress * 100.0
            );
            return Err(HarvestError::NotMature {
                position: pos,
                progress: plot.growth_progress,
            });
        }
        let Some(crop) = plot.crop else {
            return Err(HarvestError::NotPlanted(pos));
        };
        let Some(data) = self.catalog.get(crop) else {
            warn!("Harvest rejected at {pos}: no configuration for {crop}");
            return Err(HarvestError::UnknownCropConfig { position: pos, crop });
        };

        let item = HarvestItem {
            name: data.name.clone(),
            stack_count: data.base_yield,
            unit_sell_price: data.unit_sell_price,
        };

        if let Some(plot) = self.registry.get_mut(pos) {
            plot.reset();
        }
        self.events.publish(FarmEvent::PlotReset { position: pos });
        self.events.publish(FarmEvent::SoilChanged {
            position: pos,
            state: SoilState::UnlockedEmpty,
        });
        self.events.publish(FarmEvent::CropHarvested {
            position: pos,
            item: item.clone(),
        });
        debug!(
            "Harvested {} x{} at {pos} (worth {})",
            item.name,
            item.stack_count,
            item.total_value()
        );
        Ok(item)
    }

    /// Unlock up to `max_count` locked plots from `candidates`, charging
    /// `cost_per_plot` for each through `economy`.
    ///
    /// The number unlocked is limited by the locked candidates left and the
    /// remaining capacity. Nothing changes unless the whole charge succeeds.
    pub fn expand(
        &mut self,
        candidates: &[PlotCoord],
        economy: &mut dyn Economy,
        max_count: usize,
        cost_per_plot: u64,
    ) -> Result<ExpandReport, ExpandError> {
        if max_count == 0 {
            return Err(ExpandError::ZeroCount);
        }
        let mut seen = AHashSet::with_capacity(candidates.len());
        let locked: Vec<PlotCoord> = candidates
            .iter()
            .copied()
            .filter(|pos| seen.insert(*pos))
            .filter(|pos| {
                self.registry
                    .try_get(*pos)
                    .is_some_and(|plot| plot.soil_state == SoilState::Locked)
            })
            .collect();
        if locked.is_empty() {
            debug!("Expand rejected: no locked plots left");
            return Err(ExpandError::NoLockedPlots);
        }
        let headroom = self.registry.headroom();
        if headroom == 0 {
            debug!("Expand rejected: capacity reached");
            return Err(ExpandError::CapacityExceeded {
                max: self.registry.max_active(),
            });
        }

        let promoted: Vec<PlotCoord> = locked
            .into_iter()
            .take(max_count.min(headroom))
            .collect();
        let cost = (promoted.len() as u64).saturating_mul(cost_per_plot);
        if !economy.has_funds(cost) {
            debug!("Expand rejected: cannot afford {cost}");
            return Err(ExpandError::InsufficientFunds { needed: cost });
        }
        economy.spend(cost)?;

        // Every promoted plot is distinct, locked and within headroom
        for &pos in &promoted {
            let unlocked = self.registry.unlock(pos);
            debug_assert!(unlocked.is_ok(), "paid unlock of {pos} failed");
            if let Err(e) = unlocked {
                error!("Paid unlock of {pos} failed: {e}");
                continue;
            }
            self.events.publish(FarmEvent::SoilChanged {
                position: pos,
                state: SoilState::UnlockedEmpty,
            });
        }
        info!("Expanded farm by {} plots for {cost}", promoted.len());
        Ok(ExpandReport {
            unlocked: promoted,
            cost,
        })
    }
}
