//! External optimizer invocation.
//!
//! The optimizer is an opaque collaborator: it owns the search, the driver
//! only points it at an experiment directory and waits. The directory must
//! hold a json descriptor naming the experiment; everything else inside it
//! belongs to the optimizer.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::config::OptimizerProgram;
use crate::error::Error;
use crate::Result;
use crate::EXPERIMENT_MANIFEST_FILE;

/// Experiment descriptor read from `config.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentManifest {
    #[serde(rename = "experiment-name")]
    pub experiment_name: String,
    /// Optimizer-owned fields, kept opaque.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ExperimentManifest {
    /// Reads the descriptor from `<dir>/config.json`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(EXPERIMENT_MANIFEST_FILE);
        if !path.is_file() {
            return Err(Error::ManifestNotFound(path.display().to_string()));
        }
        let text = fs::read_to_string(&path)?;
        let manifest = serde_json::from_str(&text)?;
        Ok(manifest)
    }
}

/// Launches the external optimizer over an experiment directory.
pub struct OptimizerLauncher {
    program: OptimizerProgram,
}

impl OptimizerLauncher {
    pub fn new(program: OptimizerProgram) -> Self {
        Self { program }
    }

    /// Blocks until the optimizer exits; nonzero exit is an error.
    pub fn launch(&self, experiment_dir: &Path) -> Result<ExperimentManifest> {
        let manifest = ExperimentManifest::from_dir(experiment_dir)?;
        info!("starting {}", manifest.experiment_name);

        let status = Command::new(&self.program.program)
            .args(&self.program.args)
            .arg(experiment_dir)
            .status()
            .map_err(|e| Error::FailedSpawningProcess {
                program: self.program.program.clone(),
                message: e.to_string(),
            })?;
        if !status.success() {
            return Err(Error::OptimizerFailed {
                status: status.to_string(),
                code: status.code(),
            });
        }
        info!("optimizer finished for {}", manifest.experiment_name);
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn manifest_reads_experiment_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.json"),
            r#"{"experiment-name": "itq_plan", "likelihood": "GAUSSIAN"}"#,
        )
        .unwrap();
        let manifest = ExperimentManifest::from_dir(dir.path()).unwrap();
        assert_eq!(manifest.experiment_name, "itq_plan");
        assert_eq!(
            manifest.extra.get("likelihood").and_then(|v| v.as_str()),
            Some("GAUSSIAN")
        );
    }

    #[test]
    fn missing_descriptor_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ExperimentManifest::from_dir(dir.path()),
            Err(Error::ManifestNotFound(_))
        ));
    }

    #[test]
    fn malformed_descriptor_is_a_deser_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), "{not json").unwrap();
        assert!(matches!(
            ExperimentManifest::from_dir(dir.path()),
            Err(Error::JsonDeserError(_))
        ));
    }

    #[cfg(unix)]
    mod with_stub_optimizer {
        use super::*;
        use crate::config::OptimizerProgram;
        use std::path::PathBuf;

        // stubs are run through `sh` so no exec bit is needed
        fn write_stub(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
            let path = dir.join(name);
            fs::write(&path, body).unwrap();
            path
        }

        fn experiment_dir() -> tempfile::TempDir {
            let dir = tempfile::tempdir().unwrap();
            fs::write(
                dir.path().join("config.json"),
                r#"{"experiment-name": "itq_plan"}"#,
            )
            .unwrap();
            dir
        }

        #[test]
        fn launch_passes_the_directory_and_succeeds() {
            let dir = experiment_dir();
            // the stub records its first argument, standing in for the optimizer
            let stub = write_stub(dir.path(), "fakeopt.sh", "echo \"$1\" > \"$1/launched.txt\"\n");
            let launcher = OptimizerLauncher::new(OptimizerProgram {
                program: "sh".to_string(),
                args: vec![stub.to_string_lossy().to_string()],
            });

            let manifest = launcher.launch(dir.path()).unwrap();
            assert_eq!(manifest.experiment_name, "itq_plan");
            let recorded = fs::read_to_string(dir.path().join("launched.txt")).unwrap();
            assert_eq!(recorded.trim(), dir.path().to_string_lossy());
        }

        #[test]
        fn nonzero_exit_is_an_optimizer_failure() {
            let dir = experiment_dir();
            let stub = write_stub(dir.path(), "failopt.sh", "exit 2\n");
            let launcher = OptimizerLauncher::new(OptimizerProgram {
                program: "sh".to_string(),
                args: vec![stub.to_string_lossy().to_string()],
            });
            match launcher.launch(dir.path()) {
                Err(Error::OptimizerFailed { code, .. }) => assert_eq!(code, Some(2)),
                other => panic!("expected optimizer failure, got: {:?}", other),
            }
        }
    }
}
