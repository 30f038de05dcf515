//! This library implements the core experiment-driving functionality.
//!
//! Programming interface is centered around the [`ExperimentDriver`]
//! structure, which holds the [`DriverSettings`] for one calibration setup.
//! A driver run writes a simulation configuration file using a
//! [`ConfigWriter`] strategy, invokes the external simulation program as a
//! blocking child process, and turns the resulting artifact into a single
//! floating point score using a [`Scorer`] strategy. External optimizers are
//! launched through [`OptimizerLauncher`], pointed at a directory holding an
//! experiment descriptor.
//!
//! # Filesystem contract
//!
//! Configuration files are written to `<main_dir>/<title>.yaml`. The
//! simulation program is expected to leave its result artifact at
//! `<main_dir>/output/<title>/result.yaml`. Both conventions are captured by
//! the constants in this module and by [`DriverSettings`] path helpers.
//!
//! ## Example
//!
//! ```ignore
//! use tunefish_core::{DriverSettings, ExperimentDriver, RunSpec};
//! use tunefish_core::{SeriesTailScorer, StaticConfig};
//!
//! let settings = DriverSettings::from_path("./tunefish.toml".as_ref())?;
//! let driver = ExperimentDriver::new(settings);
//! let report = driver.run(
//!     &StaticConfig::from_template("./scenario.yaml".as_ref())?,
//!     &SeriesTailScorer::default(),
//!     &RunSpec::new("baseline", 20),
//! )?;
//! println!("score: {}", report.score);
//! ```
//!
//! [`ExperimentDriver`]: experiment/struct.ExperimentDriver.html
//! [`DriverSettings`]: config/struct.DriverSettings.html
//! [`ConfigWriter`]: generate/trait.ConfigWriter.html
//! [`Scorer`]: score/trait.Scorer.html
//! [`OptimizerLauncher`]: optimizer/struct.OptimizerLauncher.html

#[macro_use]
extern crate serde;
#[macro_use]
extern crate log;

// reexports
pub use config::{DriverSettings, OptimizerProgram, SimProgram};
pub use error::{Error, Result};
pub use experiment::{ExperimentDriver, RunReport, RunSpec};
pub use generate::{ConfigWriter, OverlayConfig, StaticConfig};
pub use optimizer::{ExperimentManifest, OptimizerLauncher};
pub use result::ResultArtifact;
pub use score::{DeviationScorer, FixedScorer, Scorer, SeriesTailScorer};

pub mod config;
pub mod error;
pub mod experiment;
pub mod generate;
pub mod optimizer;
pub mod result;
pub mod score;

mod util;

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

/// Name of the output directory the simulation creates under the main
/// directory.
pub const OUTPUT_DIR_NAME: &str = "output";
/// Name of the result artifact within a run's output directory.
pub const RESULT_FILE: &str = "result.yaml";
/// File extension given to generated configuration files.
pub const CONFIG_FILE_EXTENSION: &str = "yaml";

/// Name of the experiment descriptor file within an experiment directory.
pub const EXPERIMENT_MANIFEST_FILE: &str = "config.json";
/// Driver settings manifest file name.
pub const SETTINGS_MANIFEST_FILE: &str = "tunefish.toml";

/// Result group holding the yearly time series columns.
pub const DEFAULT_SERIES_GROUP: &str = "FishState";
/// Column scored by the default scorer.
pub const DEFAULT_SERIES_COLUMN: &str = "Biomass Species 1";
