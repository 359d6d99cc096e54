//! # Homestead Farming
//!
//! Grid-based farming core for Homestead.
//!
//! This crate owns the authoritative farm state and the systems around it:
//! - Grid layout (deterministic plot coordinates)
//! - Crop catalog (growth times, yields, staged visuals)
//! - Plot registry with an active-plot cap
//! - Growth scheduler (fixed-interval batched passes on a farm clock)
//! - Plot lifecycle (plant, harvest, expand)
//! - Event bus and view projection for the presentation layer
//! - Configuration and persistence snapshots
//!
//! Presentation never feeds back into the core: the farm publishes
//! [`FarmEvent`]s and a [`ViewProjector`] turns them into visual calls.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod catalog;
pub mod config;
pub mod economy;
pub mod events;
pub mod farm;
pub mod grid;
pub mod growth;
pub mod lifecycle;
pub mod plot;
pub mod registry;
pub mod snapshot;
pub mod view;

#[cfg(test)]
mod scenarios;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::catalog::*;
    pub use crate::config::*;
    pub use crate::economy::*;
    pub use crate::events::*;
    pub use crate::farm::*;
    pub use crate::grid::*;
    pub use crate::growth::*;
    pub use crate::lifecycle::*;
    pub use crate::plot::*;
    pub use crate::registry::*;
    pub use crate::snapshot::*;
    pub use crate::view::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use homestead_common::crops;

    #[test]
    fn test_plant_and_harvest() {
        let mut farm = Farm::new(FarmConfig::default()).expect("farm");
        let pos = farm.coordinates()[0];

        assert!(farm.can_plant_at(pos));
        farm.plant(pos, crops::WHEAT).expect("plant");
        assert!(!farm.can_plant_at(pos));

        farm.tick(60.0);
        let item = farm.harvest(pos).expect("harvest");
        assert_eq!(item.stack_count, 2);
        assert!(farm.can_plant_at(pos));
    }

    #[test]
    fn test_wallet_pays_for_land() {
        let mut farm = Farm::new(FarmConfig::default()).expect("farm");
        let mut wallet = Wallet::new(250);

        let report = farm.buy_expansion(&mut wallet).expect("expand");
        assert_eq!(report.unlocked.len(), 5);
        assert_eq!(wallet.balance(), 0);
        assert_eq!(farm.active_plot_count(), 11);
    }
}
