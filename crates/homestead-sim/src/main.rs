//! # Homestead Sim
//!
//! Headless driver for the Homestead farming core.
//!
//! Loads a farm configuration, then plays the farm on a fixed time step:
//! planting empty plots, harvesting and selling mature crops, and buying
//! land whenever the wallet allows.
//!
//! ```text
//! homestead-sim [config.toml] [--seconds N] [--save snapshot.hsfm]
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod bridge;
mod driver;

use anyhow::{bail, Context, Result};
use driver::Driver;
use homestead_farming::{Farm, FarmConfig, Wallet, CONFIG_FILE};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Farm-clock seconds simulated when `--seconds` is not given.
const DEFAULT_SECONDS: f64 = 300.0;

/// Command-line options.
#[derive(Debug, Clone, PartialEq)]
struct SimArgs {
    config: PathBuf,
    seconds: f64,
    save: Option<PathBuf>,
}

impl SimArgs {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut parsed = Self {
            config: PathBuf::from(CONFIG_FILE),
            seconds: DEFAULT_SECONDS,
            save: None,
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seconds" => {
                    let value = args.next().context("--seconds needs a value")?;
                    parsed.seconds = value
                        .parse()
                        .with_context(|| format!("invalid --seconds value '{value}'"))?;
                    if !parsed.seconds.is_finite() || parsed.seconds < 0.0 {
                        bail!("--seconds must be a non-negative number");
                    }
                },
                "--save" => {
                    let path = args.next().context("--save needs a path")?;
                    parsed.save = Some(PathBuf::from(path));
                },
                flag if flag.starts_with("--") => bail!("unknown option {flag}"),
                path => parsed.config = PathBuf::from(path),
            }
        }
        Ok(parsed)
    }
}

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("homestead=info".parse()?))
        .init();

    info!("Homestead sim starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = SimArgs::parse(std::env::args().skip(1))?;
    let config = FarmConfig::load_from(&args.config)?;
    let farm = Farm::new(config).context("farm configuration rejected")?;

    let mut driver = Driver::new(farm, Wallet::default());
    let summary = driver.run(args.seconds).clone();
    info!(
        "Simulated {:.1}s: {} harvests, {} gold earned, {} expansions, {} active plots, {} gold left",
        summary.elapsed,
        summary.harvests,
        summary.gold_earned,
        summary.expansions,
        driver.farm().active_plot_count(),
        driver.wallet().balance()
    );

    if let Some(path) = &args.save {
        driver
            .farm()
            .snapshot()
            .save_to(path)
            .with_context(|| format!("failed to save snapshot to {}", path.display()))?;
    }

    driver.shutdown();
    info!("Homestead sim shutdown complete");
    Ok(())
}
