//! Configuration generation strategies.
//!
//! A config writer produces the yaml document one simulation run consumes,
//! given the destination path. The driver owns no configuration format of
//! its own; whatever the writer produces is handed to the simulation as-is.

use std::fs;
use std::path::Path;

use serde_yaml::Value;

use crate::error::Error;
use crate::util;
use crate::Result;

/// Common trait for all configuration writers.
pub trait ConfigWriter {
    /// Writes a configuration file to the given destination.
    fn write_config(&self, dest: &Path) -> Result<()>;
}

impl<F> ConfigWriter for F
where
    F: Fn(&Path) -> Result<()>,
{
    fn write_config(&self, dest: &Path) -> Result<()> {
        self(dest)
    }
}

/// Writes a fixed yaml document.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticConfig {
    body: String,
}

impl StaticConfig {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Uses the document at the given path verbatim.
    pub fn from_template(path: &Path) -> Result<Self> {
        Ok(Self::new(util::read_file(path)?))
    }

    /// Serializes the given value into the document body.
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self::new(serde_yaml::to_string(value)?))
    }
}

impl ConfigWriter for StaticConfig {
    fn write_config(&self, dest: &Path) -> Result<()> {
        fs::write(dest, &self.body)?;
        Ok(())
    }
}

/// Loads a template document and applies dotted-path value overrides.
///
/// This is how optimizer-proposed parameter values become concrete
/// configurations: the template is the base scenario, each override
/// addresses one leaf, e.g. `gear.catchability` or
/// `biology.species 1.growth rate`.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    template: Value,
    overrides: Vec<(String, Value)>,
}

impl OverlayConfig {
    pub fn new(template: Value) -> Self {
        Self {
            template,
            overrides: Vec::new(),
        }
    }

    pub fn from_template(path: &Path) -> Result<Self> {
        let template: Value = serde_yaml::from_str(&util::read_file(path)?)?;
        Ok(Self::new(template))
    }

    pub fn set(mut self, path: impl Into<String>, value: Value) -> Self {
        self.overrides.push((path.into(), value));
        self
    }

    /// Applies all overrides to a copy of the template.
    pub fn render(&self) -> Result<Value> {
        let mut root = self.template.clone();
        for (path, value) in &self.overrides {
            apply_override(&mut root, path, value.clone())?;
        }
        Ok(root)
    }
}

impl ConfigWriter for OverlayConfig {
    fn write_config(&self, dest: &Path) -> Result<()> {
        let rendered = self.render()?;
        fs::write(dest, serde_yaml::to_string(&rendered)?)?;
        Ok(())
    }
}

/// Replaces the leaf addressed by a dotted path within a mapping tree.
///
/// Intermediate segments must already exist as mappings; the final segment
/// is inserted or replaced.
fn apply_override(root: &mut Value, path: &str, value: Value) -> Result<()> {
    let mut segments = path.split('.').peekable();
    let mut current = root;
    while let Some(segment) = segments.next() {
        let map = current.as_mapping_mut().ok_or_else(|| {
            Error::FailedGeneratingConfig(format!(
                "override \"{}\": \"{}\" doesn't address a mapping",
                path, segment
            ))
        })?;
        let key = Value::String(segment.to_string());
        if segments.peek().is_none() {
            map.insert(key, value);
            return Ok(());
        }
        current = map.get_mut(&key).ok_or_else(|| {
            Error::FailedGeneratingConfig(format!(
                "override \"{}\": no key \"{}\" in template",
                path, segment
            ))
        })?;
    }
    Err(Error::FailedGeneratingConfig(format!(
        "override with empty path: \"{}\"",
        path
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const TEMPLATE: &str = "\
gear:
  catchability: 0.01
  trawl speed: 5
biology:
  carrying capacity: 5000
";

    fn template() -> Value {
        serde_yaml::from_str(TEMPLATE).unwrap()
    }

    #[test]
    fn static_config_writes_body_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("run.yaml");
        StaticConfig::new(TEMPLATE).write_config(&dest).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), TEMPLATE);
    }

    #[test]
    fn static_config_serializes_a_value() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("run.yaml");
        StaticConfig::from_value(&template())
            .unwrap()
            .write_config(&dest)
            .unwrap();
        let back: Value = serde_yaml::from_str(&fs::read_to_string(&dest).unwrap()).unwrap();
        assert_eq!(back, template());
    }

    #[test]
    fn overlay_replaces_only_the_addressed_leaf() {
        let overlay = OverlayConfig::new(template()).set(
            "gear.catchability",
            serde_yaml::from_str("0.2").unwrap(),
        );
        let rendered = overlay.render().unwrap();
        let gear = rendered.get("gear").unwrap();
        assert_eq!(gear.get("catchability").unwrap().as_f64(), Some(0.2));
        // sibling untouched
        assert_eq!(gear.get("trawl speed").unwrap().as_i64(), Some(5));
        assert_eq!(
            rendered
                .get("biology")
                .unwrap()
                .get("carrying capacity")
                .unwrap()
                .as_i64(),
            Some(5000)
        );
    }

    #[test]
    fn overlay_can_add_a_new_leaf() {
        let overlay =
            OverlayConfig::new(template()).set("gear.mesh size", serde_yaml::from_str("2.5").unwrap());
        let rendered = overlay.render().unwrap();
        assert_eq!(
            rendered
                .get("gear")
                .unwrap()
                .get("mesh size")
                .unwrap()
                .as_f64(),
            Some(2.5)
        );
    }

    #[test]
    fn missing_intermediate_segment_is_an_error() {
        let overlay = OverlayConfig::new(template())
            .set("market.price", serde_yaml::from_str("10").unwrap());
        assert!(matches!(
            overlay.render(),
            Err(Error::FailedGeneratingConfig(_))
        ));
    }

    #[test]
    fn closures_are_config_writers() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("run.yaml");
        let writer = |path: &Path| -> Result<()> {
            fs::write(path, "species: 1\n")?;
            Ok(())
        };
        writer.write_config(&dest).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "species: 1\n");
    }
}
