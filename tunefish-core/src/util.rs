//! Collection of utility functions used across the crate.

use std::fs::{read, File};
use std::io::Read;
use std::path::Path;

use crate::error::Error;
use crate::Result;

/// Reads a file at the given path to a `String`.
pub fn read_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut s = String::new();
    file.read_to_string(&mut s)?;
    Ok(s)
}

/// Create a static deser object from given path using serde.
///
/// File format is chosen based on the file extension, `toml` and
/// `yaml`/`yml` are supported.
pub fn deser_struct_from_path<T>(file_path: &Path) -> Result<T>
where
    for<'de> T: serde::Deserialize<'de>,
{
    let ext = file_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let d: T = match ext {
        "toml" => toml::from_slice(&read(file_path)?)?,
        "yaml" | "yml" => serde_yaml::from_slice(&read(file_path)?)?,
        _ => {
            return Err(Error::Other(format!(
                "unsupported manifest extension: \"{}\" (expected toml or yaml)",
                ext
            )))
        }
    };
    Ok(d)
}

/// Get a similar name based on string similarity.
pub fn get_similar<'a>(original: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    use strsim::normalized_damerau_levenshtein;
    let mut highest_sim = 0f64;
    let mut best: Option<&str> = None;
    for candidate in candidates {
        let sim = normalized_damerau_levenshtein(candidate, original);
        if sim > highest_sim {
            highest_sim = sim;
            best = Some(candidate);
        }
    }
    if highest_sim > 0.4f64 {
        best.map(|s| s.to_string())
    } else {
        None
    }
}
