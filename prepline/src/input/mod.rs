//! Dataset reader adapter.
//!
//! [`FileReader`] is the stage a pipeline injects at the front of the
//! sequence: it loads the primary (and optional held-out) dataset into
//! the parameter bag. Anything that goes wrong here surfaces as a stage
//! failure and aborts the run.

use crate::context::ParamBag;
use crate::frame::Frame;
use crate::stages::Stage;
use anyhow::{bail, Context as _};
use serde_json::Value;
use std::path::Path;

/// Parameter key holding the primary dataset path.
pub const TRAIN_PATH_KEY: &str = "train_df_path";
/// Parameter key holding the held-out dataset path.
pub const TEST_PATH_KEY: &str = "test_df_path";
/// Parameter key the loaded primary dataset is stored under.
pub const TRAIN_KEY: &str = "train_df";
/// Parameter key the loaded held-out dataset is stored under.
pub const TEST_KEY: &str = "test_df";

/// Reads `.csv`/`.tsv` datasets into [`Frame`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileReader;

impl FileReader {
    /// Creates a new reader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Stage for FileReader {
    fn name(&self) -> &str {
        "read_file"
    }

    fn run(&self, params: &mut ParamBag) -> anyhow::Result<()> {
        let train_path = match params.get(TRAIN_PATH_KEY) {
            Some(Value::String(path)) => path.clone(),
            Some(other) => bail!("'{TRAIN_PATH_KEY}' should be a string path. Received {other}"),
            None => bail!("'{TRAIN_PATH_KEY}' is missing from the pipeline parameters"),
        };
        let test_path = match params.get(TEST_PATH_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::String(path)) => Some(path.clone()),
            Some(other) => bail!("'{TEST_PATH_KEY}' should be a string path. Received {other}"),
        };

        let train = read_table(Path::new(&train_path))?;
        params.insert(TRAIN_KEY, serde_json::to_value(train)?);

        if let Some(path) = test_path {
            let test = read_table(Path::new(&path))?;
            params.insert(TEST_KEY, serde_json::to_value(test)?);
        }
        Ok(())
    }
}

/// Reads a delimited table at `path` into a [`Frame`].
///
/// The delimiter is picked from the extension: `.csv` is comma-separated,
/// `.tsv` tab-separated. Columns with an empty header name (unnamed index
/// columns) are dropped. Cells parse as integer, float or bool where
/// possible, empty cells become null, everything else stays a string.
///
/// # Errors
///
/// Fails on an unsupported extension, a missing file, or malformed rows.
pub fn read_table(path: &Path) -> anyhow::Result<Frame> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let delimiter = match extension.as_str() {
        "csv" => b',',
        "tsv" => b'\t',
        other => bail!(
            "Unsupported filetype '.{other}'. Supported extensions include .csv and .tsv"
        ),
    };

    if !path.is_file() {
        bail!("Dataset not found at {}", path.display());
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("Failed to open dataset at {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record =
            record.with_context(|| format!("Failed to read dataset at {}", path.display()))?;
        for (index, cell) in record.iter().enumerate() {
            if let Some(column) = columns.get_mut(index) {
                column.push(parse_cell(cell));
            }
        }
    }

    let mut frame = Frame::new();
    for (name, values) in headers.into_iter().zip(columns) {
        if name.trim().is_empty() {
            // unnamed index column
            continue;
        }
        frame.push_column(name, values)?;
    }
    Ok(frame)
}

fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = cell.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = cell.parse::<f64>() {
        return Value::from(float);
    }
    match cell {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::from(cell),
    }
}
