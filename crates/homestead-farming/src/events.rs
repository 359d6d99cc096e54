//! Change notifications published by the farm core.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::catalog::GrowthStage;
use crate::plot::{HarvestItem, SoilState};
use homestead_common::{CropId, PlotCoord};

/// Structured change notifications. Consumers (the view projector, UI,
/// audio) react to these; the core never reads anything back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FarmEvent {
    /// Plot registered at startup or restore
    SoilInitialized {
        /// Plot position
        position: PlotCoord,
        /// Initial soil state
        state: SoilState,
    },
    /// Soil state changed (unlock, plant, harvest)
    SoilChanged {
        /// Plot position
        position: PlotCoord,
        /// New soil state
        state: SoilState,
    },
    /// A crop was planted and shows its initial stage
    CropPlanted {
        /// Plot position
        position: PlotCoord,
        /// Crop planted
        crop: CropId,
        /// Stage index (0 for a fresh planting)
        stage_index: usize,
        /// Stage to display
        stage: GrowthStage,
    },
    /// A growing crop entered a new stage
    StageChanged {
        /// Plot position
        position: PlotCoord,
        /// Crop growing there
        crop: CropId,
        /// New stage index
        stage_index: usize,
        /// Stage to display
        stage: GrowthStage,
    },
    /// A crop reached full growth
    CropMatured {
        /// Plot position
        position: PlotCoord,
        /// Crop that matured
        crop: CropId,
    },
    /// A plot's crop was removed and its crop fields cleared
    PlotReset {
        /// Plot position
        position: PlotCoord,
    },
    /// A mature crop was harvested
    CropHarvested {
        /// Plot position
        position: PlotCoord,
        /// Harvest output
        item: HarvestItem,
    },
}

impl FarmEvent {
    /// Position this event concerns.
    #[must_use]
    pub fn position(&self) -> PlotCoord {
        match self {
            Self::SoilInitialized { position, .. }
            | Self::SoilChanged { position, .. }
            | Self::CropPlanted { position, .. }
            | Self::StageChanged { position, .. }
            | Self::CropMatured { position, .. }
            | Self::PlotReset { position }
            | Self::CropHarvested { position, .. } => *position,
        }
    }
}

/// Event bus for broadcasting farm events to the presentation layer.
///
/// Unbounded: dropping a stage or reset notification would leave the view
/// permanently out of sync.
#[derive(Debug, Clone)]
pub struct FarmEventBus {
    /// Sender for publishing events
    sender: Sender<FarmEvent>,
    /// Receiver for collecting events
    receiver: Receiver<FarmEvent>,
}

impl Default for FarmEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl FarmEventBus {
    /// Creates a new event bus.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: FarmEvent) {
        // Only fails once every receiver is gone, and the bus holds one.
        let _ = self.sender.send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<FarmEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<FarmEvent> {
        self.sender.clone()
    }
}
