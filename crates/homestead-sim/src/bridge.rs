//! Logging view bridge: stands in for a renderer when running headless.

use homestead_common::{CropId, PlotCoord};
use homestead_farming::{GrowthStage, SoilState, ViewSyncBridge};
use tracing::debug;

/// Logs every visual call and counts live crop visuals.
#[derive(Debug, Default)]
pub struct LogBridge {
    next_handle: u64,
    live_crops: usize,
}

impl LogBridge {
    /// Crop visuals spawned and not yet despawned.
    #[must_use]
    pub fn live_crops(&self) -> usize {
        self.live_crops
    }
}

impl ViewSyncBridge for LogBridge {
    type Handle = u64;

    fn init_soil_visual(&mut self, position: PlotCoord, state: SoilState) {
        debug!("soil {position}: {}", state.display_name());
    }

    fn update_soil_visual(&mut self, position: PlotCoord, state: SoilState) {
        debug!("soil {position} -> {}", state.display_name());
    }

    fn spawn_crop_visual(
        &mut self,
        position: PlotCoord,
        crop: CropId,
        stage: &GrowthStage,
    ) -> u64 {
        self.next_handle += 1;
        self.live_crops += 1;
        debug!(
            "spawn #{} {crop} at {position} ({})",
            self.next_handle, stage.visual_ref
        );
        self.next_handle
    }

    fn despawn_crop_visual(&mut self, handle: u64) {
        self.live_crops = self.live_crops.saturating_sub(1);
        debug!("despawn #{handle}");
    }
}
