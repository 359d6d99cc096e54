//! Farm configuration.
//!
//! Grid layout, capacity, scheduler, expansion pricing and crop definitions.
//! Configuration can be loaded from and saved to a TOML file.

use crate::catalog::CropData;
use homestead_common::{ConfigError, ConfigResult, PlotCoord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{info, warn};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "homestead.toml";

/// Grid generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSection {
    /// Rows along z
    pub rows: u32,
    /// Columns along x
    pub cols: u32,
    /// World-space distance between neighbouring plots
    pub spacing: f32,
    /// Position of the first plot
    pub origin: PlotCoord,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 5,
            spacing: 10.0,
            origin: PlotCoord::default(),
        }
    }
}

/// Active-plot limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacitySection {
    /// Plots unlocked at startup
    pub initial_unlocked_count: usize,
    /// Maximum number of active (non-locked) plots
    pub max_farm_plots: usize,
}

impl Default for CapacitySection {
    fn default() -> Self {
        Self {
            initial_unlocked_count: 6,
            max_farm_plots: 100,
        }
    }
}

/// Growth scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    /// Seconds between growth passes
    pub update_interval: f32,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            update_interval: 1.0,
        }
    }
}

/// Land purchase pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionSection {
    /// Price of each plot unlocked
    pub cost_per_plot: u64,
    /// Plots unlocked by one purchase
    pub plots_per_expansion: usize,
}

impl Default for ExpansionSection {
    fn default() -> Self {
        Self {
            cost_per_plot: 50,
            plots_per_expansion: 5,
        }
    }
}

/// Catalog loading behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// Install built-in wheat when no usable crop is configured
    pub builtin_fallback: bool,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            builtin_fallback: true,
        }
    }
}

/// Complete farm configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmConfig {
    /// Grid layout
    pub grid: GridSection,
    /// Capacity limits
    pub capacity: CapacitySection,
    /// Growth scheduler
    pub scheduler: SchedulerSection,
    /// Expansion pricing
    pub expansion: ExpansionSection,
    /// Catalog options
    pub catalog: CatalogSection,
    /// Crop definitions
    pub crops: Vec<CropData>,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            grid: GridSection::default(),
            capacity: CapacitySection::default(),
            scheduler: SchedulerSection::default(),
            expansion: ExpansionSection::default(),
            catalog: CatalogSection::default(),
            crops: vec![CropData::default_wheat()],
        }
    }
}

impl FarmConfig {
    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read or parsed is an error.
    pub fn load_from<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to `path` as pretty TOML.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp recoverable values and reject the rest.
    ///
    /// Zero rows or columns are raised to one. Everything returned as an
    /// error is fatal: the farm must not start with it.
    pub fn validate(&mut self) -> ConfigResult<()> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            warn!(
                "Grid {}x{} clamped to at least 1x1",
                self.grid.rows, self.grid.cols
            );
            self.grid.rows = self.grid.rows.max(1);
            self.grid.cols = self.grid.cols.max(1);
        }

        if !self.grid.spacing.is_finite() || self.grid.spacing <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "grid.spacing",
                reason: format!("must be positive, got {}", self.grid.spacing),
            });
        }

        let interval = self.scheduler.update_interval;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.update_interval",
                reason: format!("must be positive, got {interval}"),
            });
        }

        let CapacitySection {
            initial_unlocked_count: initial,
            max_farm_plots: max,
        } = self.capacity;
        if initial > max {
            return Err(ConfigError::InitialExceedsCapacity { initial, max });
        }

        Ok(())
    }
}
