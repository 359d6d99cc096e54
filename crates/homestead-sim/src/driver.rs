//! Fixed-step simulation loop that plays the farm automatically.

use crate::bridge::LogBridge;
use homestead_common::CropId;
use homestead_farming::{Economy, Farm, FarmIntent, SoilState, ViewProjector, Wallet};
use tracing::{debug, info};

/// Simulation step in seconds.
pub const STEP: f64 = 0.1;

/// Totals gathered over a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimSummary {
    /// Farm-clock seconds simulated
    pub elapsed: f64,
    /// Harvests collected
    pub harvests: usize,
    /// Gold earned from selling harvests
    pub gold_earned: u64,
    /// Land purchases made
    pub expansions: usize,
}

/// Drives a farm with a simple plant/harvest/sell/expand policy.
#[derive(Debug)]
pub struct Driver {
    farm: Farm,
    wallet: Wallet,
    view: ViewProjector<LogBridge>,
    crop: Option<CropId>,
    summary: SimSummary,
}

impl Driver {
    /// Wrap a farm, planting its lowest-numbered crop.
    #[must_use]
    pub fn new(farm: Farm, wallet: Wallet) -> Self {
        let crop = farm.crop_ids().first().copied();
        let mut view = ViewProjector::new(LogBridge::default());
        view.sync(farm.events());
        Self {
            farm,
            wallet,
            view,
            crop,
            summary: SimSummary::default(),
        }
    }

    /// Advance one step.
    pub fn step(&mut self) {
        for plot in self.farm.active_plots() {
            if plot.is_harvestable() {
                self.farm.queue(FarmIntent::Harvest {
                    position: plot.position,
                });
            } else if plot.soil_state == SoilState::UnlockedEmpty {
                if let Some(crop) = self.crop {
                    self.farm.queue(FarmIntent::Plant {
                        position: plot.position,
                        crop,
                    });
                }
            }
        }

        let report = self.farm.tick(STEP);
        for item in report.harvested() {
            let value = item.total_value();
            self.wallet.earn(value);
            self.summary.harvests += 1;
            self.summary.gold_earned += value;
            debug!("Sold {} x{} for {value}", item.name, item.stack_count);
        }

        let per_purchase = self.farm.config().expansion.plots_per_expansion;
        if let Some(cost) = self.farm.expansion_cost(per_purchase) {
            if self.wallet.has_funds(cost) && self.farm.buy_expansion(&mut self.wallet).is_ok() {
                self.summary.expansions += 1;
            }
        }

        self.view.sync(self.farm.events());
        self.summary.elapsed = self.farm.now();
    }

    /// Run for `seconds` of farm time.
    pub fn run(&mut self, seconds: f64) -> &SimSummary {
        let steps = (seconds / STEP).round() as u64;
        info!("Simulating {seconds}s in {steps} steps");
        for _ in 0..steps {
            self.step();
        }
        &self.summary
    }

    /// Release every visual and clear the farm.
    pub fn shutdown(&mut self) {
        self.farm.teardown();
        self.view.sync(self.farm.events());
        self.view.teardown();
    }

    /// The driven farm.
    #[must_use]
    pub fn farm(&self) -> &Farm {
        &self.farm
    }

    /// The player's wallet.
    #[must_use]
    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Crop visuals currently shown.
    #[must_use]
    pub fn live_crop_visuals(&self) -> usize {
        self.view.bridge().live_crops()
    }
}
