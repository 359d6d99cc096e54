//! End-to-end farm scenarios through the public surface.

use crate::prelude::*;
use homestead_common::{crops, CropId, PlotCoord};

fn default_farm() -> Farm {
    Farm::new(FarmConfig::default()).expect("farm")
}

#[test]
fn scenario_default_grid_starter_plots() {
    let farm = default_farm();
    assert_eq!(farm.coordinates().len(), 25);

    let unlocked = farm
        .coordinates()
        .iter()
        .filter(|pos| farm.plot(**pos).map(|p| p.soil_state) == Some(SoilState::UnlockedEmpty))
        .count();
    let locked = farm
        .coordinates()
        .iter()
        .filter(|pos| farm.plot(**pos).map(|p| p.soil_state) == Some(SoilState::Locked))
        .count();
    assert_eq!(unlocked, 6);
    assert_eq!(locked, 19);
    assert_eq!(farm.active_plot_count(), 6);

    // Columns walk x, rows walk z: the sixth starter plot opens column two
    assert_eq!(farm.coordinates()[0], PlotCoord::new(0, 0, 0));
    assert_eq!(farm.coordinates()[4], PlotCoord::new(0, 0, 40));
    assert_eq!(farm.coordinates()[5], PlotCoord::new(10, 0, 0));
}

#[test]
fn scenario_wheat_grows_through_stages() {
    let mut farm = default_farm();
    let pos = farm.coordinates()[0];
    farm.plant(pos, crops::WHEAT).expect("plant");

    for _ in 0..20 {
        farm.tick(1.0);
    }
    let plot = farm.plot(pos).expect("plot");
    assert!((plot.growth_progress - 20.0 / 60.0).abs() < 1e-4);
    assert_eq!(plot.current_stage_index, 1);
    assert!(!plot.is_grown);
    assert!(matches!(farm.harvest(pos), Err(HarvestError::NotMature { .. })));

    for _ in 0..40 {
        farm.tick(1.0);
    }
    let plot = farm.plot(pos).expect("plot");
    assert!(plot.is_grown);
    assert!((plot.growth_progress - 1.0).abs() < f32::EPSILON);
    assert_eq!(plot.current_stage_index, 2);
    assert_eq!(farm.ready_to_harvest_count(), 1);

    let item = farm.harvest(pos).expect("harvest");
    assert_eq!(item.name, "Wheat");
    assert_eq!(item.total_value(), 20);
    assert_eq!(farm.plot(pos), Some(&FarmPlot::empty(pos)));
}

#[test]
fn scenario_plant_on_locked_plot_changes_nothing() {
    let mut farm = default_farm();
    farm.events().drain();
    let locked = farm.coordinates()[10];
    let before = farm.snapshot();

    assert!(!farm.can_plant_at(locked));
    assert_eq!(
        farm.plant(locked, crops::WHEAT),
        Err(PlantError::PlotLocked(locked))
    );
    assert_eq!(farm.snapshot(), before);
    assert_eq!(farm.events().pending_count(), 0);
}

#[test]
fn scenario_capacity_cap_holds() {
    let mut config = FarmConfig::default();
    config.grid.rows = 3;
    config.grid.cols = 3;
    config.capacity.initial_unlocked_count = 2;
    config.capacity.max_farm_plots = 3;
    let mut farm = Farm::new(config).expect("farm");
    let mut wallet = Wallet::new(10_000);

    let report = farm.expand(&mut wallet, 5).expect("expand");
    assert_eq!(report.unlocked.len(), 1);
    assert_eq!(farm.active_plot_count(), 3);

    assert!(matches!(
        farm.expand(&mut wallet, 1),
        Err(ExpandError::CapacityExceeded { max: 3 })
    ));

    let off_grid = PlotCoord::new(500, 0, 500);
    assert!(!farm.can_plant_at(off_grid));
    assert_eq!(
        farm.plant(off_grid, crops::WHEAT),
        Err(PlantError::CapacityExceeded { max: 3 })
    );
    assert!(farm.active_plot_count() <= farm.max_farm_plots());
}

#[test]
fn scenario_snapshot_roundtrip_is_exact() {
    let mut farm = default_farm();
    let coords = farm.coordinates().to_vec();
    farm.plant(coords[0], crops::WHEAT).expect("plant");
    farm.tick(30.0);
    farm.plant(coords[1], crops::WHEAT).expect("plant");
    farm.tick(35.0);
    farm.plant(coords[2], crops::WHEAT).expect("plant");
    farm.tick(5.0);

    let snapshot = farm.snapshot();
    let bytes = snapshot.to_bytes().expect("encode");

    let mut restored = default_farm();
    restored
        .restore(FarmSnapshot::from_bytes(&bytes).expect("decode"))
        .expect("restore");

    for pos in &coords {
        assert_eq!(restored.plot(*pos), farm.plot(*pos), "plot {pos}");
    }
    assert_eq!(restored.snapshot(), snapshot);
    assert!((restored.now() - farm.now()).abs() < f64::EPSILON);

    // Growth continues from the restored clock
    restored.tick(60.0);
    assert_eq!(restored.ready_to_harvest_count(), 3);
}

#[test]
fn scenario_restore_rebuilds_view() {
    struct Counter {
        crops: usize,
        soils: usize,
    }

    impl ViewSyncBridge for Counter {
        type Handle = ();

        fn init_soil_visual(&mut self, _: PlotCoord, _: SoilState) {
            self.soils += 1;
        }

        fn update_soil_visual(&mut self, _: PlotCoord, _: SoilState) {}

        fn spawn_crop_visual(&mut self, _: PlotCoord, _: CropId, _: &GrowthStage) {
            self.crops += 1;
        }

        fn despawn_crop_visual(&mut self, (): ()) {
            self.crops -= 1;
        }
    }

    let mut farm = default_farm();
    let pos = farm.coordinates()[3];
    farm.plant(pos, crops::WHEAT).expect("plant");
    farm.tick(40.0);
    let snapshot = farm.snapshot();

    let mut fresh = default_farm();
    let mut view = ViewProjector::new(Counter { crops: 0, soils: 0 });
    view.sync(fresh.events());
    assert_eq!(view.bridge().soils, 25);

    fresh.restore(snapshot).expect("restore");
    view.sync(fresh.events());
    assert_eq!(view.bridge().soils, 50);
    assert_eq!(view.bridge().crops, 1);
    assert_eq!(view.crop_visual_count(), 1);
}

#[test]
fn scenario_missing_crop_config_is_isolated() {
    let mut farm = default_farm();
    let coords = farm.coordinates().to_vec();
    farm.plant(coords[0], crops::WHEAT).expect("plant");

    // A save from a build that knew about corn
    let mut snapshot = farm.snapshot();
    let mut corn = FarmPlot::empty(coords[1]);
    corn.crop = Some(crops::CORN);
    corn.is_planted = true;
    corn.soil_state = SoilState::UnlockedPlanted;
    snapshot.plots[1] = corn;
    farm.restore(snapshot).expect("restore");

    let report = farm.tick(60.0).growth.expect("pass");
    assert_eq!(report.skipped, vec![coords[1]]);
    assert_eq!(report.matured, 1);
    assert!(farm.plot(coords[0]).expect("plot").is_grown);
    assert!(!farm.plot(coords[1]).expect("plot").is_grown);
}
