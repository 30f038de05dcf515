//! Result artifact parsing.
//!
//! The simulation leaves a yaml document mapping group names to columns of
//! yearly values, e.g.:
//!
//! ```yaml
//! FishState:
//!   Biomass Species 1: [10.0, 20.0, 30.0]
//!   Average Cash-Flow: [1.5, 1.7, 1.2]
//! ```
//!
//! The artifact is parsed once per run and handed to the scoring strategy;
//! it is not retained afterwards.

use std::fs;
use std::path::Path;

use serde_yaml::Value;

use crate::error::Error;
use crate::util;
use crate::Result;

/// Parsed result artifact.
#[derive(Debug, Clone)]
pub struct ResultArtifact {
    root: Value,
}

impl ResultArtifact {
    /// Loads the artifact from the given path.
    ///
    /// A missing file is reported as [`Error::ResultNotFound`]; there is no
    /// fallback value of any kind.
    ///
    /// [`Error::ResultNotFound`]: ../error/enum.Error.html
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ResultNotFound(path.display().to_string()));
        }
        debug!("reading result artifact at: {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::parse_str(&text)
    }

    /// Parses an artifact from yaml text.
    pub fn parse_str(text: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(text)?;
        if !root.is_mapping() {
            return Err(Error::MalformedResult(
                "top level of the artifact must be a mapping".to_string(),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Gets the mapping stored under the given top-level group.
    pub fn group(&self, group: &str) -> Result<&Value> {
        self.root
            .as_mapping()
            .and_then(|m| m.get(&Value::String(group.to_string())))
            .ok_or_else(|| Error::GroupNotFound(group.to_string()))
    }

    /// Extracts a numeric series stored as `group -> column -> [values]`.
    pub fn series(&self, group: &str, column: &str) -> Result<Vec<f64>> {
        let group_value = self.group(group)?;
        let group_map = group_value.as_mapping().ok_or_else(|| {
            Error::MalformedResult(format!("group \"{}\" is not a mapping", group))
        })?;
        let column_value = match group_map.get(&Value::String(column.to_string())) {
            Some(v) => v,
            None => {
                let candidates = group_map.iter().filter_map(|(k, _)| k.as_str());
                let hint = match util::get_similar(column, candidates) {
                    Some(similar) => format!(", did you mean \"{}\"?", similar),
                    None => String::new(),
                };
                return Err(Error::ColumnNotFound {
                    group: group.to_string(),
                    column: column.to_string(),
                    hint,
                });
            }
        };
        let seq = column_value.as_sequence().ok_or_else(|| {
            Error::MalformedResult(format!(
                "column \"{}\" in group \"{}\" is not a sequence",
                column, group
            ))
        })?;
        let mut series = Vec::with_capacity(seq.len());
        for value in seq {
            match as_f64(value) {
                Some(num) => series.push(num),
                None => {
                    return Err(Error::MalformedResult(format!(
                        "column \"{}\" in group \"{}\" contains a non-numeric value",
                        column, group
                    )))
                }
            }
        }
        Ok(series)
    }

    /// Last element of a numeric series.
    pub fn last(&self, group: &str, column: &str) -> Result<f64> {
        let series = self.series(group, column)?;
        series.last().copied().ok_or_else(|| {
            Error::MalformedResult(format!(
                "column \"{}\" in group \"{}\" is empty",
                column, group
            ))
        })
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
