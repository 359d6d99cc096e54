//! Growth scheduler: fixed-interval batched growth passes.
//!
//! The scheduler owns the farm clock. The clock advances only by the `dt`
//! handed to unpaused ticks, so paused time never counts toward growth.
//! Progress is derived from clock time elapsed since planting rather than
//! from the number of passes, so a late or infrequent pass still lands on
//! the correct progress.

use crate::catalog::CropCatalog;
use crate::events::{FarmEvent, FarmEventBus};
use crate::registry::PlotRegistry;
use homestead_common::PlotCoord;
use tracing::{debug, trace, warn};

/// Summary of one growth pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrowthPassReport {
    /// Farm-clock time the pass was evaluated at.
    pub evaluated_at: f64,
    /// Plots whose progress was recomputed.
    pub advanced: usize,
    /// Stage transitions emitted.
    pub stage_changes: usize,
    /// Plots that reached maturity.
    pub matured: usize,
    /// Plots skipped because their crop configuration is missing.
    pub skipped: Vec<PlotCoord>,
}

/// Advances growth for all planted, immature plots on a fixed interval.
#[derive(Debug, Clone)]
pub struct GrowthScheduler {
    /// Seconds between growth passes.
    update_interval: f64,
    /// Time accumulated since the last pass.
    accumulator: f64,
    /// Farm clock in seconds.
    clock: f64,
    /// Whether ticks are currently ignored.
    paused: bool,
    /// Number of passes run so far.
    passes_run: u64,
}

impl GrowthScheduler {
    /// Create a scheduler with the given pass interval in seconds.
    #[must_use]
    pub fn new(update_interval: f32) -> Self {
        Self {
            update_interval: f64::from(update_interval),
            accumulator: 0.0,
            clock: 0.0,
            paused: false,
            passes_run: 0,
        }
    }

    /// Current farm-clock time in seconds.
    #[must_use]
    pub const fn now(&self) -> f64 {
        self.clock
    }

    /// Restore the farm clock, e.g. from a snapshot. Resets the accumulator.
    pub fn set_clock(&mut self, clock: f64) {
        self.clock = clock;
        self.accumulator = 0.0;
    }

    /// Seconds between growth passes.
    #[must_use]
    pub const fn update_interval(&self) -> f64 {
        self.update_interval
    }

    /// Number of growth passes run so far.
    #[must_use]
    pub const fn passes_run(&self) -> u64 {
        self.passes_run
    }

    /// Stop advancing the clock and running passes.
    pub fn pause(&mut self) {
        if !self.paused {
            debug!("Growth scheduler paused at t={:.2}", self.clock);
            self.paused = true;
        }
    }

    /// Resume ticking.
    pub fn resume(&mut self) {
        if self.paused {
            debug!("Growth scheduler resumed at t={:.2}", self.clock);
            self.paused = false;
        }
    }

    /// Check if the scheduler is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance the clock by `dt` seconds and run a growth pass when the
    /// accumulator reaches the update interval.
    ///
    /// Returns the pass report if a pass ran.
    pub fn tick(
        &mut self,
        dt: f64,
        registry: &mut PlotRegistry,
        catalog: &CropCatalog,
        events: &FarmEventBus,
    ) -> Option<GrowthPassReport> {
        if self.paused {
            return None;
        }
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!("Ignoring invalid tick delta {dt}");
            0.0
        };

        self.clock += dt;
        self.accumulator += dt;
        if self.accumulator < self.update_interval {
            return None;
        }
        self.accumulator = 0.0;
        Some(self.run_pass(registry, catalog, events))
    }

    /// Run one growth pass at the current clock time.
    ///
    /// A plot whose crop configuration is missing is skipped and logged;
    /// the rest of the pass continues.
    pub fn run_pass(
        &mut self,
        registry: &mut PlotRegistry,
        catalog: &CropCatalog,
        events: &FarmEventBus,
    ) -> GrowthPassReport {
        let now = self.clock;
        let mut report = GrowthPassReport {
            evaluated_at: now,
            ..GrowthPassReport::default()
        };

        for plot in registry.snapshot() {
            if !plot.is_growing() {
                continue;
            }
            let Some(crop_id) = plot.crop else {
                continue;
            };
            let Some(data) = catalog.get(crop_id) else {
                warn!(
                    "Skipping plot {}: no configuration for {crop_id}",
                    plot.position
                );
                report.skipped.push(plot.position);
                continue;
            };

            let elapsed = (now - plot.plant_time).max(0.0);
            let progress = ((elapsed / f64::from(data.growth_time)) as f32)
                .clamp(0.0, 1.0)
                .max(plot.growth_progress);
            let stage_index = data.stage_index_for(progress);

            let Some(live) = registry.get_mut(plot.position) else {
                continue;
            };
            if !live.is_growing() {
                continue;
            }
            live.growth_progress = progress;
            report.advanced += 1;

            if stage_index > live.current_stage_index {
                live.current_stage_index = stage_index;
                if let Some(stage) = data.stage(stage_index) {
                    events.publish(FarmEvent::StageChanged {
                        position: live.position,
                        crop: crop_id,
                        stage_index,
                        stage: stage.clone(),
                    });
                }
                report.stage_changes += 1;
                trace!("{} at {} entered stage {stage_index}", data.name, live.position);
            }

            if progress >= 1.0 && !live.is_grown {
                live.is_grown = true;
                events.publish(FarmEvent::CropMatured {
                    position: live.position,
                    crop: crop_id,
                });
                report.matured += 1;
                debug!("{} matured at {}", data.name, live.position);
            }
        }

        self.passes_run += 1;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CropData;
    use crate::plot::FarmPlot;
    use homestead_common::crops;
    use proptest::prelude::*;

    fn setup() -> (PlotRegistry, CropCatalog, FarmEventBus) {
        let catalog = CropCatalog::load(vec![CropData::default_wheat()], false).expect("catalog");
        (PlotRegistry::new(10), catalog, FarmEventBus::new())
    }

    fn coord(i: i32) -> PlotCoord {
        PlotCoord::new(i, 0, 0)
    }

    #[test]
    fn test_pass_only_after_interval() {
        let (mut registry, catalog, events) = setup();
        let mut scheduler = GrowthScheduler::new(1.0);

        assert!(scheduler.tick(0.4, &mut registry, &catalog, &events).is_none());
        assert!(scheduler.tick(0.4, &mut registry, &catalog, &events).is_none());
        assert!(scheduler.tick(0.4, &mut registry, &catalog, &events).is_some());
        assert_eq!(scheduler.passes_run(), 1);
        // Accumulator resets to zero after a pass
        assert!(scheduler.tick(0.5, &mut registry, &catalog, &events).is_none());
        assert!((scheduler.now() - 1.7).abs() < 1e-9);
    }

    #[test]
    fn test_progress_and_stage() {
        let (mut registry, catalog, events) = setup();
        registry
            .insert(FarmPlot::planted(coord(0), crops::WHEAT, 0.0))
            .expect("insert");
        let mut scheduler = GrowthScheduler::new(1.0);

        let report = scheduler
            .tick(20.0, &mut registry, &catalog, &events)
            .expect("pass");
        assert_eq!(report.advanced, 1);
        assert_eq!(report.stage_changes, 1);

        let plot = registry.try_get(coord(0)).expect("plot");
        assert!((plot.growth_progress - 1.0 / 3.0).abs() < 1e-3);
        assert_eq!(plot.current_stage_index, 1);
        assert!(!plot.is_grown);

        let drained = events.drain();
        assert!(matches!(
            drained.as_slice(),
            [FarmEvent::StageChanged { stage_index: 1, .. }]
        ));
    }

    #[test]
    fn test_maturity() {
        let (mut registry, catalog, events) = setup();
        registry
            .insert(FarmPlot::planted(coord(0), crops::WHEAT, 0.0))
            .expect("insert");
        let mut scheduler = GrowthScheduler::new(1.0);

        let report = scheduler
            .tick(60.0, &mut registry, &catalog, &events)
            .expect("pass");
        assert_eq!(report.matured, 1);

        let plot = registry.try_get(coord(0)).expect("plot");
        assert!(plot.is_grown);
        assert!((plot.growth_progress - 1.0).abs() < f32::EPSILON);
        assert_eq!(plot.current_stage_index, 2);

        // Mature plots are left alone by later passes
        let report = scheduler
            .tick(5.0, &mut registry, &catalog, &events)
            .expect("pass");
        assert_eq!(report.advanced, 0);
    }

    #[test]
    fn test_catch_up_after_long_gap() {
        let (mut registry, catalog, events) = setup();
        registry
            .insert(FarmPlot::planted(coord(0), crops::WHEAT, 0.0))
            .expect("insert");
        // Interval longer than the whole growth time
        let mut scheduler = GrowthScheduler::new(90.0);
        for _ in 0..9 {
            scheduler.tick(10.0, &mut registry, &catalog, &events);
        }
        let plot = registry.try_get(coord(0)).expect("plot");
        assert!(plot.is_grown);
        // Skipped straight to the last stage in one pass
        assert_eq!(events.drain().len(), 2);
    }

    #[test]
    fn test_missing_config_skips_only_that_plot() {
        let (mut registry, catalog, events) = setup();
        registry
            .insert(FarmPlot::planted(coord(0), crops::CORN, 0.0))
            .expect("insert");
        registry
            .insert(FarmPlot::planted(coord(1), crops::WHEAT, 0.0))
            .expect("insert");
        let mut scheduler = GrowthScheduler::new(1.0);

        let report = scheduler
            .tick(30.0, &mut registry, &catalog, &events)
            .expect("pass");
        assert_eq!(report.skipped, vec![coord(0)]);
        assert_eq!(report.advanced, 1);

        let orphan = registry.try_get(coord(0)).expect("plot");
        assert!(orphan.growth_progress.abs() < f32::EPSILON);
        let wheat = registry.try_get(coord(1)).expect("plot");
        assert!((wheat.growth_progress - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_pause_freezes_clock() {
        let (mut registry, catalog, events) = setup();
        registry
            .insert(FarmPlot::planted(coord(0), crops::WHEAT, 0.0))
            .expect("insert");
        let mut scheduler = GrowthScheduler::new(1.0);

        scheduler.tick(10.0, &mut registry, &catalog, &events);
        scheduler.pause();
        assert!(scheduler.tick(100.0, &mut registry, &catalog, &events).is_none());
        assert!((scheduler.now() - 10.0).abs() < 1e-9);

        scheduler.resume();
        scheduler.tick(5.0, &mut registry, &catalog, &events);
        let plot = registry.try_get(coord(0)).expect("plot");
        assert!((plot.growth_progress - 0.25).abs() < 1e-3);
        assert!(!plot.is_grown);
    }

    #[test]
    fn test_invalid_delta_ignored() {
        let (mut registry, catalog, events) = setup();
        let mut scheduler = GrowthScheduler::new(1.0);
        assert!(scheduler
            .tick(f64::NAN, &mut registry, &catalog, &events)
            .is_none());
        assert!(scheduler.tick(-3.0, &mut registry, &catalog, &events).is_none());
        assert!(scheduler.now().abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn prop_progress_monotonic(deltas in proptest::collection::vec(0.0f64..15.0, 1..40)) {
            let (mut registry, catalog, events) = setup();
            registry.insert(FarmPlot::planted(coord(0), crops::WHEAT, 0.0)).expect("insert");
            let mut scheduler = GrowthScheduler::new(1.0);

            let mut last_progress = 0.0f32;
            let mut last_stage = 0usize;
            for dt in deltas {
                scheduler.tick(dt, &mut registry, &catalog, &events);
                let plot = registry.try_get(coord(0)).expect("plot");
                prop_assert!(plot.growth_progress >= last_progress);
                prop_assert!(plot.current_stage_index >= last_stage);
                prop_assert_eq!(plot.is_grown, plot.growth_progress >= 1.0);
                last_progress = plot.growth_progress;
                last_stage = plot.current_stage_index;
            }
        }
    }
}
