//! Configuration persistence.
//!
//! A configuration document is a flat JSON object snapshotting the
//! parameter bag at save time, minus the keys excluded by the caller
//! (typically the loaded datasets). Both operations are pure: [`load`]
//! re-reads the file on every call and nothing is cached process-wide.

use crate::context::ParamBag;
use crate::errors::ConfigError;
use crate::input::TRAIN_PATH_KEY;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Loads a configuration document, returning a fresh mapping.
///
/// A `train_df_path` entry in the document is advisory only and triggers
/// a warning: the dataset path passed at pipeline construction always
/// wins over a loaded value.
///
/// # Errors
///
/// [`ConfigError::NotFound`] when `path` is not an existing regular file,
/// [`ConfigError::Format`] when the content is not a JSON object.
pub fn load(path: impl AsRef<Path>) -> Result<HashMap<String, Value>, ConfigError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let params: HashMap<String, Value> =
        serde_json::from_str(&content).map_err(|source| ConfigError::Format {
            path: path.to_path_buf(),
            source,
        })?;

    if params.contains_key(TRAIN_PATH_KEY) {
        tracing::warn!(
            "Config at {} carries '{}'; the dataset path passed at pipeline construction overrides it",
            path.display(),
            TRAIN_PATH_KEY
        );
    }

    Ok(params)
}

/// Saves a snapshot of `params` to `path`, omitting the `excluded` keys.
///
/// Excluded keys absent from the bag are silently ignored. The live bag
/// is never mutated. The document is pretty-printed JSON with sorted
/// keys, so saving the same parameters twice produces identical bytes.
///
/// # Errors
///
/// [`ConfigError::Io`] when the file cannot be written.
pub fn save(
    path: impl AsRef<Path>,
    params: &ParamBag,
    excluded: &HashSet<String>,
) -> Result<(), ConfigError> {
    let snapshot: BTreeMap<String, Value> = params
        .to_map()
        .into_iter()
        .filter(|(key, _)| !excluded.contains(key))
        .collect();

    let content = serde_json::to_string_pretty(&snapshot).map_err(|source| ConfigError::Format {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    std::fs::write(path, content)?;
    Ok(())
}
