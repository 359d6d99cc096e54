//! The farm: an explicitly constructed owner of every farming subsystem.
//!
//! [`Farm`] wires the grid layout, crop catalog, plot registry, growth
//! scheduler and event bus together and exposes the operation surface the
//! game calls. There is no global instance; callers own the `Farm` and all
//! mutation goes through `&mut self`.

use crate::catalog::{CropCatalog, CropData};
use crate::config::FarmConfig;
use crate::economy::Economy;
use crate::events::{FarmEvent, FarmEventBus};
use crate::grid::GridLayout;
use crate::growth::{GrowthPassReport, GrowthScheduler};
use crate::lifecycle::{ExpandError, ExpandReport, HarvestError, PlantError, PlotLifecycle};
use crate::plot::{FarmPlot, HarvestItem, SoilState};
use crate::registry::PlotRegistry;
use crate::snapshot::{FarmSnapshot, SnapshotError, SnapshotResult};
use homestead_common::{ConfigResult, CropId, PlotCoord, SchemaVersion};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// A deferred player request, applied at the start of the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FarmIntent {
    /// Plant `crop` at `position`
    Plant {
        /// Target plot
        position: PlotCoord,
        /// Crop to plant
        crop: CropId,
    },
    /// Harvest the crop at `position`
    Harvest {
        /// Target plot
        position: PlotCoord,
    },
}

/// What became of a queued intent.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    /// Result of a queued plant
    Plant {
        /// Target plot
        position: PlotCoord,
        /// Plant result
        result: Result<(), PlantError>,
    },
    /// Result of a queued harvest
    Harvest {
        /// Target plot
        position: PlotCoord,
        /// Harvest result
        result: Result<HarvestItem, HarvestError>,
    },
}

impl IntentOutcome {
    /// Check whether the intent succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        match self {
            Self::Plant { result, .. } => result.is_ok(),
            Self::Harvest { result, .. } => result.is_ok(),
        }
    }
}

/// Everything that happened during one [`Farm::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Outcomes of intents applied this tick, in queue order.
    pub intents: Vec<IntentOutcome>,
    /// Growth pass report, if a pass ran.
    pub growth: Option<GrowthPassReport>,
}

impl TickReport {
    /// Items harvested by queued intents this tick.
    pub fn harvested(&self) -> impl Iterator<Item = &HarvestItem> {
        self.intents.iter().filter_map(|outcome| match outcome {
            IntentOutcome::Harvest {
                result: Ok(item), ..
            } => Some(item),
            _ => None,
        })
    }
}

/// The farming system.
#[derive(Debug)]
pub struct Farm {
    config: FarmConfig,
    layout: GridLayout,
    catalog: CropCatalog,
    registry: PlotRegistry,
    scheduler: GrowthScheduler,
    events: FarmEventBus,
    intents: VecDeque<FarmIntent>,
}

impl Farm {
    /// Build a farm from configuration.
    ///
    /// Validates the config, loads the catalog, generates the grid and
    /// registers every coordinate: the first `initial_unlocked_count` in
    /// generation order start unlocked, the rest locked. A
    /// `SoilInitialized` event is published per plot.
    pub fn new(mut config: FarmConfig) -> ConfigResult<Self> {
        config.validate()?;

        let catalog =
            CropCatalog::load(config.crops.clone(), config.catalog.builtin_fallback)?;
        let layout = GridLayout::new(
            config.grid.rows,
            config.grid.cols,
            config.grid.origin,
            config.grid.spacing,
        );

        let mut farm = Self {
            registry: PlotRegistry::new(config.capacity.max_farm_plots),
            scheduler: GrowthScheduler::new(config.scheduler.update_interval),
            events: FarmEventBus::new(),
            intents: VecDeque::new(),
            catalog,
            layout,
            config,
        };
        farm.register_layout();

        info!(
            "Farm initialized: {} plots ({} unlocked, max {}), {} crops",
            farm.registry.len(),
            farm.registry.active_count(),
            farm.registry.max_active(),
            farm.catalog.len()
        );
        Ok(farm)
    }

    fn register_layout(&mut self) {
        let initial = self.config.capacity.initial_unlocked_count;
        let mut unlocked = 0;

        for &pos in self.layout.coordinates() {
            let plot = if unlocked < initial {
                unlocked += 1;
                FarmPlot::empty(pos)
            } else {
                FarmPlot::locked(pos)
            };
            let state = plot.soil_state;
            if let Err(e) = self.registry.insert(plot) {
                warn!("Could not register plot {pos}: {e}");
                continue;
            }
            self.events.publish(FarmEvent::SoilInitialized {
                position: pos,
                state,
            });
        }

        if unlocked < initial {
            warn!("Grid has room for only {unlocked} of {initial} starter plots");
        }
    }

    fn lifecycle(&mut self) -> PlotLifecycle<'_> {
        let now = self.scheduler.now();
        PlotLifecycle::new(&mut self.registry, &self.catalog, &self.events, now)
    }

    /// Plant `crop` at `pos` immediately.
    pub fn plant(&mut self, pos: PlotCoord, crop: CropId) -> Result<(), PlantError> {
        self.lifecycle().plant(pos, crop)
    }

    /// Harvest the mature crop at `pos` immediately.
    pub fn harvest(&mut self, pos: PlotCoord) -> Result<HarvestItem, HarvestError> {
        self.lifecycle().harvest(pos)
    }

    /// Unlock up to `count` locked plots in generation order, paying the
    /// configured price per plot through `economy`.
    pub fn expand(
        &mut self,
        economy: &mut dyn Economy,
        count: usize,
    ) -> Result<ExpandReport, ExpandError> {
        let candidates = self.layout.coordinates().to_vec();
        let cost_per_plot = self.config.expansion.cost_per_plot;
        self.lifecycle()
            .expand(&candidates, economy, count, cost_per_plot)
    }

    /// Buy one standard expansion of `plots_per_expansion` plots.
    pub fn buy_expansion(
        &mut self,
        economy: &mut dyn Economy,
    ) -> Result<ExpandReport, ExpandError> {
        let count = self.config.expansion.plots_per_expansion;
        self.expand(economy, count)
    }

    /// Price of unlocking `count` plots right now, or `None` if nothing
    /// could be unlocked.
    #[must_use]
    pub fn expansion_cost(&self, count: usize) -> Option<u64> {
        let locked = self
            .layout
            .coordinates()
            .iter()
            .filter(|pos| {
                self.registry
                    .try_get(**pos)
                    .is_some_and(|plot| plot.soil_state == SoilState::Locked)
            })
            .count();
        let promoted = count.min(locked).min(self.registry.headroom());
        (promoted > 0)
            .then(|| (promoted as u64).saturating_mul(self.config.expansion.cost_per_plot))
    }

    /// Check whether a plant at `pos` would pass its positional checks.
    #[must_use]
    pub fn can_plant_at(&self, pos: PlotCoord) -> bool {
        self.registry.can_plant_at(pos)
    }

    /// Queue an intent for the next tick.
    pub fn queue(&mut self, intent: FarmIntent) {
        debug!("Queued {intent:?}");
        self.intents.push_back(intent);
    }

    /// Intents waiting for the next tick.
    #[must_use]
    pub fn pending_intents(&self) -> usize {
        self.intents.len()
    }

    /// Advance the farm by `dt` seconds.
    ///
    /// Queued intents are applied first, at the current clock time, then
    /// the growth scheduler ticks.
    pub fn tick(&mut self, dt: f64) -> TickReport {
        let mut report = TickReport::default();

        while let Some(intent) = self.intents.pop_front() {
            let outcome = match intent {
                FarmIntent::Plant { position, crop } => IntentOutcome::Plant {
                    position,
                    result: self.plant(position, crop),
                },
                FarmIntent::Harvest { position } => IntentOutcome::Harvest {
                    position,
                    result: self.harvest(position),
                },
            };
            report.intents.push(outcome);
        }

        report.growth = self
            .scheduler
            .tick(dt, &mut self.registry, &self.catalog, &self.events);
        report
    }

    /// Stop growth; the farm clock does not advance while paused.
    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    /// Resume growth.
    pub fn resume(&mut self) {
        self.scheduler.resume();
    }

    /// Check if growth is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.scheduler.is_paused()
    }

    /// The plot at `pos`, if registered.
    #[must_use]
    pub fn plot(&self, pos: PlotCoord) -> Option<&FarmPlot> {
        self.registry.try_get(pos)
    }

    /// Copies of all active plots in activation order.
    #[must_use]
    pub fn active_plots(&self) -> Vec<FarmPlot> {
        self.registry.snapshot()
    }

    /// Every registered plot, locked ones included, in no particular order.
    pub fn plots(&self) -> impl Iterator<Item = &FarmPlot> {
        self.registry.iter().map(|(_, plot)| plot)
    }

    /// Grid coordinates in generation order.
    #[must_use]
    pub fn coordinates(&self) -> &[PlotCoord] {
        self.layout.coordinates()
    }

    /// Configuration for a crop.
    #[must_use]
    pub fn crop_config(&self, crop: CropId) -> Option<&CropData> {
        self.catalog.get(crop)
    }

    /// Configured crop IDs, sorted.
    #[must_use]
    pub fn crop_ids(&self) -> Vec<CropId> {
        self.catalog.ids()
    }

    /// Number of active plots.
    #[must_use]
    pub fn active_plot_count(&self) -> usize {
        self.registry.active_count()
    }

    /// Active-plot cap.
    #[must_use]
    pub fn max_farm_plots(&self) -> usize {
        self.registry.max_active()
    }

    /// Number of plots holding a mature crop.
    #[must_use]
    pub fn ready_to_harvest_count(&self) -> usize {
        self.registry.ready_to_harvest_count()
    }

    /// Farm-clock time in seconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    /// The event bus the presentation layer drains.
    #[must_use]
    pub fn events(&self) -> &FarmEventBus {
        &self.events
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &FarmConfig {
        &self.config
    }

    /// Capture the clock and every registered plot.
    ///
    /// Plots come in grid order, followed by any planted off-grid plots
    /// sorted by coordinate.
    #[must_use]
    pub fn snapshot(&self) -> FarmSnapshot {
        let mut plots: Vec<FarmPlot> = self
            .layout
            .coordinates()
            .iter()
            .filter_map(|pos| self.registry.try_get(*pos))
            .cloned()
            .collect();

        let mut extra: Vec<FarmPlot> = self
            .plots()
            .filter(|plot| !self.layout.contains(plot.position))
            .cloned()
            .collect();
        extra.sort_by_key(|plot| plot.position);
        plots.extend(extra);

        FarmSnapshot::new(self.scheduler.now(), plots)
    }

    /// Replace the farm state with `snapshot`.
    ///
    /// Stored progress is taken as-is. Grid coordinates missing from the
    /// snapshot come back locked. On error the farm is left unchanged.
    /// Visible crops are reset, then `SoilInitialized` is published for
    /// every plot and `CropPlanted` for every planted one.
    pub fn restore(&mut self, snapshot: FarmSnapshot) -> SnapshotResult<()> {
        if !SchemaVersion::FARM_SNAPSHOT.can_read(&snapshot.version) {
            return Err(SnapshotError::VersionMismatch {
                expected: SchemaVersion::FARM_SNAPSHOT,
                found: snapshot.version,
            });
        }

        let mut registry = PlotRegistry::new(self.registry.max_active());
        for plot in snapshot.plots {
            if !plot.is_consistent() {
                return Err(SnapshotError::InconsistentPlot(plot.position));
            }
            self.check_restored_stage(&plot)?;
            registry.insert(plot)?;
        }
        for &pos in self.layout.coordinates() {
            if registry.try_get(pos).is_none() {
                registry.insert(FarmPlot::locked(pos))?;
            }
        }

        self.reset_visible_crops();
        self.registry = registry;
        self.scheduler.set_clock(snapshot.clock);
        self.intents.clear();

        for plot in self.registry.iter().map(|(_, plot)| plot) {
            self.events.publish(FarmEvent::SoilInitialized {
                position: plot.position,
                state: plot.soil_state,
            });
            let Some(crop) = plot.crop.filter(|_| plot.is_planted) else {
                continue;
            };
            match self
                .catalog
                .get(crop)
                .and_then(|data| data.stage(plot.current_stage_index))
            {
                Some(stage) => self.events.publish(FarmEvent::CropPlanted {
                    position: plot.position,
                    crop,
                    stage_index: plot.current_stage_index,
                    stage: stage.clone(),
                }),
                None => warn!(
                    "Restored plot {} has no stage {} for {crop}",
                    plot.position, plot.current_stage_index
                ),
            }
        }

        info!(
            "Restored farm at t={:.1}: {} plots, {} active",
            snapshot.clock,
            self.registry.len(),
            self.registry.active_count()
        );
        Ok(())
    }

    /// A planted plot must sit on the stage its progress resolves to.
    /// Plots whose crop is not configured are left to the growth pass.
    fn check_restored_stage(&self, plot: &FarmPlot) -> SnapshotResult<()> {
        let Some(data) = plot
            .crop
            .filter(|_| plot.is_planted)
            .and_then(|crop| self.catalog.get(crop))
        else {
            return Ok(());
        };
        let expected = data.stage_index_for(plot.growth_progress);
        if plot.current_stage_index != expected {
            return Err(SnapshotError::StageMismatch {
                position: plot.position,
                stage_index: plot.current_stage_index,
                expected,
            });
        }
        Ok(())
    }

    /// Clear every plot and pending intent.
    ///
    /// `PlotReset` is published for each planted plot so the presentation
    /// layer releases its crop visuals.
    pub fn teardown(&mut self) {
        self.reset_visible_crops();
        let removed = self.registry.len();
        self.registry.clear();
        self.intents.clear();
        info!("Farm torn down ({removed} plots released)");
    }

    fn reset_visible_crops(&self) {
        for plot in self.plots().filter(|plot| plot.is_planted) {
            self.events.publish(FarmEvent::PlotReset {
                position: plot.position,
            });
        }
    }
}
