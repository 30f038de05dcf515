//! Experiment driver.
//!
//! One run is a single linear sequence: write the configuration file, call
//! the simulation program and wait for it, remove the configuration, read
//! the result artifact, score it. There is no retry, timeout or concurrency;
//! if the simulation hangs the driver hangs with it.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::config::{DriverSettings, SimProgram};
use crate::error::Error;
use crate::generate::ConfigWriter;
use crate::result::ResultArtifact;
use crate::score::Scorer;
use crate::Result;

/// Parameters of a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    /// Names the configuration file and the output subdirectory.
    pub title: String,
    /// Number of simulated years.
    pub years: u32,
    /// Ask the simulation to collect additional data.
    #[serde(default)]
    pub collect_data: bool,
    /// Optional policy script passed through to the simulation.
    #[serde(default)]
    pub policy: Option<PathBuf>,
}

impl RunSpec {
    pub fn new(title: impl Into<String>, years: u32) -> Self {
        Self {
            title: title.into(),
            years,
            collect_data: false,
            policy: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.is_empty() {
            return Err(Error::InvalidRunSpec("title must not be empty".to_string()));
        }
        if self.years == 0 {
            return Err(Error::InvalidRunSpec("years must be positive".to_string()));
        }
        Ok(())
    }
}

/// What one finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub title: String,
    pub score: f64,
    pub started_at: DateTime<Utc>,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Drives single simulation runs against the external program.
pub struct ExperimentDriver {
    settings: DriverSettings,
}

impl ExperimentDriver {
    pub fn new(settings: DriverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// Runs one experiment and returns its report.
    ///
    /// The configuration file is removed only after the simulation exits
    /// successfully; after a failed run it is left in place so the failing
    /// input can be inspected.
    pub fn run(
        &self,
        writer: &dyn ConfigWriter,
        scorer: &dyn Scorer,
        spec: &RunSpec,
    ) -> Result<RunReport> {
        spec.validate()?;

        let config_path = self.settings.config_file(&spec.title);
        info!(
            "writing configuration for run \"{}\" to: {}",
            spec.title,
            config_path.display()
        );
        writer.write_config(&config_path)?;

        let args = sim_args(&self.settings.sim, &config_path, spec);
        info!("calling simulation: {}", self.settings.sim.program);
        debug!("simulation args: {:?}", args);
        let started_at = Utc::now();
        let start = Instant::now();
        let status = Command::new(&self.settings.sim.program)
            .args(&args)
            // the simulation resolves its output directory against its own
            // working directory
            .current_dir(&self.settings.main_dir)
            .status()
            .map_err(|e| Error::FailedSpawningProcess {
                program: self.settings.sim.program.clone(),
                message: e.to_string(),
            })?;
        if !status.success() {
            warn!(
                "simulation run \"{}\" failed, keeping configuration file at: {}",
                spec.title,
                config_path.display()
            );
            return Err(Error::SimulationFailed {
                title: spec.title.clone(),
                status: status.to_string(),
                code: status.code(),
            });
        }

        fs::remove_file(&config_path)?;
        debug!("removed configuration file at: {}", config_path.display());

        info!("reading results");
        let artifact = ResultArtifact::load(&self.settings.result_file(&spec.title))?;
        let score = scorer.score(&artifact)?;
        info!("result {}", score);

        Ok(RunReport {
            title: spec.title.clone(),
            score,
            started_at,
            elapsed: start.elapsed(),
        })
    }
}

/// Builds the argument vector for one simulation invocation.
///
/// Token order is fixed: the program's own leading args, the configuration
/// file, `--years <n>`, then `--data` if requested, then `--policy <path>`
/// if given.
pub fn sim_args(sim: &SimProgram, config_file: &Path, spec: &RunSpec) -> Vec<OsString> {
    let mut args: Vec<OsString> = sim.args.iter().map(OsString::from).collect();
    args.push(config_file.as_os_str().to_os_string());
    args.push(OsString::from("--years"));
    args.push(OsString::from(spec.years.to_string()));
    if spec.collect_data {
        args.push(OsString::from("--data"));
    }
    if let Some(policy) = &spec.policy {
        args.push(OsString::from("--policy"));
        args.push(policy.as_os_str().to_os_string());
    }
    args
}
