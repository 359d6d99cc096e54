//! Crop catalog: validated crop configurations keyed by crop ID.
//!
//! Definitions come from configuration. Loading normalizes them (stages
//! sorted by threshold), skips the ones that cannot be used, and falls back
//! to a built-in wheat crop when nothing usable remains.

use ahash::AHashMap;
use homestead_common::{crops, ConfigError, ConfigResult, CropId, VisualRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// One visual/lifecycle phase of a crop, entered once growth progress
/// reaches `progress_threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthStage {
    /// Progress (0.0 to 1.0) at which this stage begins.
    pub progress_threshold: f32,
    /// Visual asset shown during this stage.
    #[serde(default)]
    pub visual_ref: VisualRef,
}

impl GrowthStage {
    /// Create a new growth stage.
    #[must_use]
    pub fn new(progress_threshold: f32, visual_ref: impl Into<String>) -> Self {
        Self {
            progress_threshold,
            visual_ref: VisualRef::new(visual_ref),
        }
    }
}

/// Reasons a crop definition is rejected at load time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CropDefinitionError {
    /// No growth stages configured
    #[error("no growth stages")]
    NoStages,
    /// Growth time is zero, negative, or not finite
    #[error("growth time must be positive, got {0}")]
    InvalidGrowthTime(f32),
    /// Base yield is zero
    #[error("base yield must be positive")]
    ZeroYield,
    /// A threshold lies outside [0, 1]
    #[error("stage threshold {0} outside [0, 1]")]
    ThresholdOutOfRange(f32),
    /// Two stages share a threshold
    #[error("duplicate stage threshold {0}")]
    DuplicateThreshold(f32),
    /// The lowest stage does not start at zero progress
    #[error("first stage must start at 0, starts at {0}")]
    MissingInitialStage(f32),
}

/// Growth configuration for one crop type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropData {
    /// Unique identifier.
    pub id: CropId,
    /// Display name.
    pub name: String,
    /// Seconds from planting to maturity.
    pub growth_time: f32,
    /// Items produced per harvest.
    pub base_yield: u32,
    /// Sell price per harvested item.
    #[serde(default)]
    pub unit_sell_price: u32,
    /// Growth stages, sorted ascending by threshold once loaded.
    pub stages: Vec<GrowthStage>,
}

impl CropData {
    /// Create a new crop definition builder.
    #[must_use]
    pub fn builder(id: CropId, name: &str) -> CropDataBuilder {
        CropDataBuilder::new(id, name)
    }

    /// The built-in fallback crop: wheat with three stages.
    #[must_use]
    pub fn default_wheat() -> Self {
        Self::builder(crops::WHEAT, "Wheat")
            .growth_time(60.0)
            .yield_and_price(2, 10)
            .stage(0.0, "crops/wheat/stage_0")
            .stage(0.33, "crops/wheat/stage_1")
            .stage(0.66, "crops/wheat/stage_2")
            .build()
    }

    /// Sorts stages ascending by threshold.
    pub fn normalize(&mut self) {
        self.stages
            .sort_by(|a, b| a.progress_threshold.total_cmp(&b.progress_threshold));
    }

    /// Checks a normalized definition against the catalog invariants.
    pub fn validate(&self) -> Result<(), CropDefinitionError> {
        if self.stages.is_empty() {
            return Err(CropDefinitionError::NoStages);
        }
        if !self.growth_time.is_finite() || self.growth_time <= 0.0 {
            return Err(CropDefinitionError::InvalidGrowthTime(self.growth_time));
        }
        if self.base_yield == 0 {
            return Err(CropDefinitionError::ZeroYield);
        }
        for stage in &self.stages {
            let t = stage.progress_threshold;
            if !(0.0..=1.0).contains(&t) {
                return Err(CropDefinitionError::ThresholdOutOfRange(t));
            }
        }
        for pair in self.stages.windows(2) {
            if pair[0].progress_threshold == pair[1].progress_threshold {
                return Err(CropDefinitionError::DuplicateThreshold(
                    pair[0].progress_threshold,
                ));
            }
        }
        let first = self.stages[0].progress_threshold;
        if first != 0.0 {
            return Err(CropDefinitionError::MissingInitialStage(first));
        }
        Ok(())
    }

    /// Index of the stage with the greatest threshold `<= progress`.
    ///
    /// Binary search over the sorted stage table. Stage 0 always starts at
    /// zero, so any progress in [0, 1] resolves to a valid index.
    #[must_use]
    pub fn stage_index_for(&self, progress: f32) -> usize {
        self.stages
            .partition_point(|s| s.progress_threshold <= progress)
            .saturating_sub(1)
    }

    /// Stage at `index`, if any.
    #[must_use]
    pub fn stage(&self, index: usize) -> Option<&GrowthStage> {
        self.stages.get(index)
    }

    /// The stage a freshly planted crop starts in.
    #[must_use]
    pub fn initial_stage(&self) -> Option<&GrowthStage> {
        self.stages.first()
    }
}

/// Builder for crop definitions.
#[derive(Debug)]
pub struct CropDataBuilder {
    data: CropData,
}

impl CropDataBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new(id: CropId, name: &str) -> Self {
        Self {
            data: CropData {
                id,
                name: name.to_string(),
                growth_time: 60.0,
                base_yield: 1,
                unit_sell_price: 0,
                stages: Vec::new(),
            },
        }
    }

    /// Set total growth time in seconds.
    #[must_use]
    pub fn growth_time(mut self, seconds: f32) -> Self {
        self.data.growth_time = seconds;
        self
    }

    /// Set harvest yield and unit sell price.
    #[must_use]
    pub fn yield_and_price(mut self, base_yield: u32, unit_sell_price: u32) -> Self {
        self.data.base_yield = base_yield;
        self.data.unit_sell_price = unit_sell_price;
        self
    }

    /// Append a growth stage.
    #[must_use]
    pub fn stage(mut self, threshold: f32, visual_ref: &str) -> Self {
        self.data.stages.push(GrowthStage::new(threshold, visual_ref));
        self
    }

    /// Build the crop definition.
    #[must_use]
    pub fn build(self) -> CropData {
        self.data
    }
}

/// Validated, queryable collection of crop configurations.
#[derive(Debug, Clone, Default)]
pub struct CropCatalog {
    crops: AHashMap<CropId, CropData>,
}

impl CropCatalog {
    /// Load crop definitions.
    ///
    /// Invalid entries are skipped with a warning; a duplicate ID overwrites
    /// the earlier entry. If nothing usable remains the built-in wheat is
    /// installed, unless `builtin_fallback` is off, which is fatal.
    pub fn load(definitions: Vec<CropData>, builtin_fallback: bool) -> ConfigResult<Self> {
        let mut crops = AHashMap::with_capacity(definitions.len());

        for mut def in definitions {
            def.normalize();
            if let Err(e) = def.validate() {
                warn!("Skipping crop '{}' ({}): {e}", def.name, def.id);
                continue;
            }
            if crops.contains_key(&def.id) {
                warn!(
                    "Duplicate crop id {}; '{}' overwrites the earlier entry",
                    def.id, def.name
                );
            }
            debug!(
                "Loaded crop '{}' ({}): {}s, {} stages",
                def.name,
                def.id,
                def.growth_time,
                def.stages.len()
            );
            crops.insert(def.id, def);
        }

        if crops.is_empty() {
            if !builtin_fallback {
                return Err(ConfigError::EmptyCatalog);
            }
            info!("No usable crop definitions, installing built-in wheat");
            let wheat = CropData::default_wheat();
            crops.insert(wheat.id, wheat);
        }

        info!("Crop catalog loaded with {} crops", crops.len());
        Ok(Self { crops })
    }

    /// Get a crop configuration by ID.
    #[must_use]
    pub fn get(&self, id: CropId) -> Option<&CropData> {
        self.crops.get(&id)
    }

    /// Check whether a crop is configured.
    #[must_use]
    pub fn contains(&self, id: CropId) -> bool {
        self.crops.contains_key(&id)
    }

    /// All configured crop IDs, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<CropId> {
        let mut ids: Vec<CropId> = self.crops.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of configured crops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.crops.len()
    }

    /// Check whether the catalog has no crops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    /// Iterate over all crop configurations.
    pub fn iter(&self) -> impl Iterator<Item = &CropData> {
        self.crops.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn carrot() -> CropData {
        CropData::builder(crops::CARROT, "Carrot")
            .growth_time(30.0)
            .yield_and_price(3, 4)
            .stage(0.5, "carrot_1")
            .stage(0.0, "carrot_0")
            .build()
    }

    #[test]
    fn test_load_sorts_stages() {
        let catalog = CropCatalog::load(vec![carrot()], true).expect("load");
        let data = catalog.get(crops::CARROT).expect("carrot");
        assert_eq!(data.stages[0].visual_ref.as_str(), "carrot_0");
        assert_eq!(data.stages[1].visual_ref.as_str(), "carrot_1");
        assert!(catalog.get(crops::WHEAT).is_none());
    }

    #[test]
    fn test_empty_stages_skipped_and_fallback_installed() {
        let empty = CropData::builder(crops::CORN, "Corn").build();
        let catalog = CropCatalog::load(vec![empty], true).expect("load");
        assert!(!catalog.contains(crops::CORN));
        assert_eq!(catalog.ids(), vec![crops::WHEAT]);
    }

    #[test]
    fn test_empty_without_fallback_is_fatal() {
        let result = CropCatalog::load(Vec::new(), false);
        assert!(matches!(result, Err(ConfigError::EmptyCatalog)));
    }

    #[test]
    fn test_duplicate_id_later_wins() {
        let mut second = carrot();
        second.name = "Purple Carrot".to_string();
        let catalog = CropCatalog::load(vec![carrot(), second], true).expect("load");
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get(crops::CARROT).expect("carrot").name,
            "Purple Carrot"
        );
    }

    #[test]
    fn test_invalid_definitions_rejected() {
        let mut def = carrot();
        def.growth_time = 0.0;
        def.normalize();
        assert_eq!(
            def.validate(),
            Err(CropDefinitionError::InvalidGrowthTime(0.0))
        );

        let mut def = carrot();
        def.base_yield = 0;
        assert_eq!(def.validate(), Err(CropDefinitionError::ZeroYield));

        let mut def = carrot();
        def.stages.push(GrowthStage::new(0.5, "dup"));
        def.normalize();
        assert_eq!(
            def.validate(),
            Err(CropDefinitionError::DuplicateThreshold(0.5))
        );

        let mut def = carrot();
        def.stages[1].progress_threshold = 0.1;
        def.normalize();
        assert_eq!(
            def.validate(),
            Err(CropDefinitionError::MissingInitialStage(0.1))
        );

        let mut def = carrot();
        def.stages.push(GrowthStage::new(1.5, "late"));
        def.normalize();
        assert_eq!(
            def.validate(),
            Err(CropDefinitionError::ThresholdOutOfRange(1.5))
        );
    }

    #[test]
    fn test_stage_resolution() {
        let wheat = CropData::default_wheat();
        assert_eq!(wheat.stage_index_for(0.0), 0);
        assert_eq!(wheat.stage_index_for(0.2), 0);
        assert_eq!(wheat.stage_index_for(0.33), 1);
        assert_eq!(wheat.stage_index_for(0.5), 1);
        assert_eq!(wheat.stage_index_for(0.66), 2);
        assert_eq!(wheat.stage_index_for(1.0), 2);

        let stage = wheat.stage(wheat.stage_index_for(0.5)).expect("stage");
        assert!((stage.progress_threshold - 0.33).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ids_sorted() {
        let corn = CropData::builder(crops::CORN, "Corn")
            .stage(0.0, "corn")
            .build();
        let catalog =
            CropCatalog::load(vec![carrot(), corn, CropData::default_wheat()], true)
                .expect("load");
        assert_eq!(catalog.ids(), vec![crops::WHEAT, crops::CORN, crops::CARROT]);
    }

    proptest! {
        #[test]
        fn prop_stage_is_greatest_threshold_not_above_progress(progress in 0.0f32..=1.0) {
            let wheat = CropData::default_wheat();
            let index = wheat.stage_index_for(progress);
            prop_assert!(wheat.stages[index].progress_threshold <= progress);
            if let Some(next) = wheat.stages.get(index + 1) {
                prop_assert!(next.progress_threshold > progress);
            }
        }
    }
}
