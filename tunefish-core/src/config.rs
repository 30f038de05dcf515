//! Driver settings.
//!
//! All paths the driver touches are derived from [`DriverSettings`], which is
//! threaded explicitly through every operation. The driver never changes its
//! own working directory; the simulation child process is the one started
//! with `main_dir` as its working directory so that relative output
//! conventions keep working.
//!
//! [`DriverSettings`]: struct.DriverSettings.html

use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::util;
use crate::Result;
use crate::{CONFIG_FILE_EXTENSION, OUTPUT_DIR_NAME, RESULT_FILE};

/// External simulation invocation: executable plus fixed leading arguments.
///
/// The driver appends the configuration file path and the per-run flags
/// after `args`, so for a jar-packaged simulation the fixed part is the
/// runtime and the archive, e.g. `java -jar yamler.jar`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimProgram {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for SimProgram {
    fn default() -> Self {
        Self {
            program: "java".to_string(),
            args: vec!["-jar".to_string(), "yamler.jar".to_string()],
        }
    }
}

/// External optimizer invocation.
///
/// The experiment directory is appended as the single positional argument,
/// so the entry script belongs in `args` (e.g. program `python2`, args
/// `["/opt/spearmint/main.py"]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerProgram {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for OptimizerProgram {
    fn default() -> Self {
        Self {
            program: "python2".to_string(),
            args: Vec::new(),
        }
    }
}

/// Settings for one calibration setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverSettings {
    /// Directory configuration files are written to and under which the
    /// simulation leaves `output/<title>/result.yaml`.
    pub main_dir: PathBuf,
    #[serde(default)]
    pub sim: SimProgram,
    #[serde(default)]
    pub optimizer: OptimizerProgram,
}

impl DriverSettings {
    pub fn new(main_dir: impl Into<PathBuf>) -> Self {
        Self {
            main_dir: main_dir.into(),
            sim: SimProgram::default(),
            optimizer: OptimizerProgram::default(),
        }
    }

    /// Reads settings from a manifest file (`toml` or `yaml`), canonicalizes
    /// the main directory and validates the result.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut settings: Self = util::deser_struct_from_path(path)?;
        if settings.main_dir.is_relative() {
            if let Some(parent) = path.parent() {
                settings.main_dir = parent.join(&settings.main_dir);
            }
        }
        settings.main_dir = dunce::canonicalize(&settings.main_dir).map_err(|e| {
            Error::InvalidSettings(format!(
                "can't resolve main_dir \"{}\": {}",
                settings.main_dir.display(),
                e
            ))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.main_dir.is_dir() {
            return Err(Error::InvalidSettings(format!(
                "main_dir is not a directory: \"{}\"",
                self.main_dir.display()
            )));
        }
        if self.sim.program.is_empty() {
            return Err(Error::InvalidSettings(
                "sim program must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Path the configuration file for the given run title is written to.
    pub fn config_file(&self, title: &str) -> PathBuf {
        self.main_dir
            .join(format!("{}.{}", title, CONFIG_FILE_EXTENSION))
    }

    /// Path the simulation is expected to leave the result artifact at.
    pub fn result_file(&self, title: &str) -> PathBuf {
        self.main_dir
            .join(OUTPUT_DIR_NAME)
            .join(title)
            .join(RESULT_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn path_helpers_follow_the_filesystem_contract() {
        let settings = DriverSettings::new("/srv/runs");
        assert_eq!(
            settings.config_file("baseline"),
            PathBuf::from("/srv/runs/baseline.yaml")
        );
        assert_eq!(
            settings.result_file("baseline"),
            PathBuf::from("/srv/runs/output/baseline/result.yaml")
        );
    }

    #[test]
    fn settings_load_from_toml_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let runs_dir = dir.path().join("runs");
        fs::create_dir(&runs_dir).unwrap();
        let manifest = dir.path().join("tunefish.toml");
        fs::write(
            &manifest,
            r#"
main_dir = "runs"

[sim]
program = "java"
args = ["-jar", "yamler.jar"]

[optimizer]
program = "python2"
args = ["/opt/spearmint/main.py"]
"#,
        )
        .unwrap();

        let settings = DriverSettings::from_path(&manifest).unwrap();
        assert!(settings.main_dir.ends_with("runs"));
        assert_eq!(settings.sim.program, "java");
        assert_eq!(settings.optimizer.args, vec!["/opt/spearmint/main.py"]);
    }

    #[test]
    fn settings_load_from_yaml_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("tunefish.yaml");
        fs::write(
            &manifest,
            format!(
                "main_dir: {}\nsim:\n  program: java\n  args: [\"-jar\", \"sim.jar\"]\n",
                dir.path().display()
            ),
        )
        .unwrap();

        let settings = DriverSettings::from_path(&manifest).unwrap();
        assert_eq!(settings.sim.args, vec!["-jar", "sim.jar"]);
        // optimizer section omitted, default applies
        assert_eq!(settings.optimizer.program, "python2");
    }

    #[test]
    fn missing_main_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("tunefish.toml");
        fs::write(&manifest, "main_dir = \"no-such-dir\"\n").unwrap();
        match DriverSettings::from_path(&manifest) {
            Err(Error::InvalidSettings(_)) => (),
            other => panic!("expected invalid settings, got: {:?}", other),
        }
    }

    #[test]
    fn empty_sim_program_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = DriverSettings::new(dir.path());
        settings.sim.program = String::new();
        assert!(settings.validate().is_err());
    }
}
