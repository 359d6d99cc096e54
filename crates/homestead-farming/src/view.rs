//! One-way projection from farm state to a presentation layer.
//!
//! The farm core only publishes [`FarmEvent`]s. A [`ViewProjector`] turns
//! them into calls on a [`ViewSyncBridge`] implemented by the renderer, and
//! owns whatever handles the renderer hands back. Nothing here feeds back
//! into growth or lifecycle decisions.

use crate::catalog::GrowthStage;
use crate::events::{FarmEvent, FarmEventBus};
use crate::farm::Farm;
use crate::plot::SoilState;
use ahash::AHashMap;
use homestead_common::{CropId, PlotCoord};
use tracing::trace;

/// Visual operations a presentation layer provides.
pub trait ViewSyncBridge {
    /// Handle to a spawned crop visual, owned by the projector until despawned.
    type Handle;

    /// Create the soil visual for a plot.
    fn init_soil_visual(&mut self, position: PlotCoord, state: SoilState);

    /// Switch a plot's soil visual to match `state`.
    fn update_soil_visual(&mut self, position: PlotCoord, state: SoilState);

    /// Show a crop at `stage`.
    fn spawn_crop_visual(
        &mut self,
        position: PlotCoord,
        crop: CropId,
        stage: &GrowthStage,
    ) -> Self::Handle;

    /// Remove a crop visual.
    fn despawn_crop_visual(&mut self, handle: Self::Handle);
}

/// Applies farm events to a [`ViewSyncBridge`].
#[derive(Debug)]
pub struct ViewProjector<B: ViewSyncBridge> {
    bridge: B,
    crop_visuals: AHashMap<PlotCoord, B::Handle>,
}

impl<B: ViewSyncBridge> ViewProjector<B> {
    /// Wrap a bridge.
    #[must_use]
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            crop_visuals: AHashMap::new(),
        }
    }

    /// The wrapped bridge.
    #[must_use]
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Mutable access to the wrapped bridge.
    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    /// Number of crop visuals currently alive.
    #[must_use]
    pub fn crop_visual_count(&self) -> usize {
        self.crop_visuals.len()
    }

    /// Drain the bus and apply every pending event. Returns how many were applied.
    pub fn sync(&mut self, events: &FarmEventBus) -> usize {
        let pending = events.drain();
        for event in &pending {
            self.apply(event);
        }
        pending.len()
    }

    /// Apply one event.
    pub fn apply(&mut self, event: &FarmEvent) {
        trace!("View sync: {event:?}");
        match event {
            FarmEvent::SoilInitialized { position, state } => {
                self.bridge.init_soil_visual(*position, *state);
            },
            FarmEvent::SoilChanged { position, state } => {
                self.bridge.update_soil_visual(*position, *state);
            },
            FarmEvent::CropPlanted {
                position,
                crop,
                stage,
                ..
            }
            | FarmEvent::StageChanged {
                position,
                crop,
                stage,
                ..
            } => self.show_crop(*position, *crop, stage),
            FarmEvent::PlotReset { position } => self.clear_crop(*position),
            FarmEvent::CropMatured { .. } | FarmEvent::CropHarvested { .. } => {},
        }
    }

    /// Recompute every visual from the farm's current plot data.
    ///
    /// Soil visuals are refreshed for every registered plot; crop visuals
    /// are respawned at each planted plot's current stage, and removed where
    /// nothing is planted.
    pub fn resync(&mut self, farm: &Farm) {
        for plot in farm.plots() {
            self.bridge
                .update_soil_visual(plot.position, plot.soil_state);

            let stage = plot
                .crop
                .filter(|_| plot.is_planted)
                .and_then(|crop| farm.crop_config(crop).map(|data| (crop, data)))
                .and_then(|(crop, data)| {
                    data.stage(plot.current_stage_index).map(|stage| (crop, stage))
                });
            match stage {
                Some((crop, stage)) => self.show_crop(plot.position, crop, stage),
                None => self.clear_crop(plot.position),
            }
        }
    }

    /// Despawn every crop visual. Called at teardown.
    pub fn teardown(&mut self) {
        for (_, handle) in self.crop_visuals.drain() {
            self.bridge.despawn_crop_visual(handle);
        }
    }

    fn show_crop(&mut self, position: PlotCoord, crop: CropId, stage: &GrowthStage) {
        self.clear_crop(position);
        let handle = self.bridge.spawn_crop_visual(position, crop, stage);
        self.crop_visuals.insert(position, handle);
    }

    fn clear_crop(&mut self, position: PlotCoord) {
        if let Some(handle) = self.crop_visuals.remove(&position) {
            self.bridge.despawn_crop_visual(handle);
        }
    }
}
