//! Pipeline construction with eager validation.

use super::base::Pipeline;
use crate::config;
use crate::context::ParamBag;
use crate::errors::{ArgumentsError, DuplicateStageError, PreplineError};
use crate::input::{FileReader, TEST_KEY, TEST_PATH_KEY, TRAIN_KEY, TRAIN_PATH_KEY};
use crate::stages::Stage;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for [`Pipeline`].
///
/// Exactly one of an explicit stage list or a configuration file supplies
/// the initial configuration; when both are given the explicit list wins
/// with a warning. A reader stage (the default [`FileReader`] unless
/// replaced) is injected at the front of the sequence, and the dataset
/// paths passed here are stamped into the parameter bag, overriding any
/// value a configuration file carried.
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    train_path: Option<String>,
    test_path: Option<String>,
    steps: Vec<Arc<dyn Stage>>,
    params: Option<HashMap<String, Value>>,
    config_path: Option<PathBuf>,
    reader: Option<Arc<dyn Stage>>,
    extra_excluded: HashSet<String>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Path to the primary dataset. Required.
    #[must_use]
    pub fn train_path(mut self, path: impl Into<String>) -> Self {
        self.train_path = Some(path.into());
        self
    }

    /// Path to the held-out dataset.
    #[must_use]
    pub fn test_path(mut self, path: impl Into<String>) -> Self {
        self.test_path = Some(path.into());
        self
    }

    /// The explicit stage list, run in order after the reader.
    #[must_use]
    pub fn steps(mut self, steps: Vec<Arc<dyn Stage>>) -> Self {
        self.steps = steps;
        self
    }

    /// Appends a single stage to the list.
    #[must_use]
    pub fn step(mut self, stage: Arc<dyn Stage>) -> Self {
        self.steps.push(stage);
        self
    }

    /// The initial parameter mapping.
    #[must_use]
    pub fn params(mut self, params: HashMap<String, Value>) -> Self {
        self.params = Some(params);
        self
    }

    /// Path to a saved configuration document.
    #[must_use]
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Replaces the default dataset reader injected as the first stage.
    #[must_use]
    pub fn reader(mut self, reader: Arc<dyn Stage>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Adds keys to the set omitted when saving configuration, on top of
    /// the loaded-dataset defaults.
    #[must_use]
    pub fn exclude_keys(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_excluded.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Validates the configuration and constructs the pipeline.
    ///
    /// # Errors
    ///
    /// `Arguments` when the primary dataset path is missing, when neither
    /// a stage list nor a config file is given, or when a stage list
    /// comes with no way to populate the parameter bag. `DuplicateStage`
    /// when two stages share a name. `Config` when a config file cannot
    /// be loaded.
    pub fn build(self) -> Result<Pipeline, PreplineError> {
        let Self {
            train_path,
            test_path,
            steps,
            params,
            config_path,
            reader,
            extra_excluded,
        } = self;

        let train_path = train_path.ok_or_else(|| {
            ArgumentsError::new("'train_path' is required to locate the primary dataset")
        })?;

        let have_steps = !steps.is_empty();
        if !have_steps && config_path.is_none() {
            return Err(ArgumentsError::new(
                "Either a stage list or a config file is required to construct a pipeline",
            )
            .into());
        }
        if have_steps && params.is_none() && config_path.is_none() {
            return Err(ArgumentsError::new(
                "A parameter mapping or a config file is required alongside a stage list",
            )
            .into());
        }
        if have_steps && config_path.is_some() {
            tracing::warn!(
                "Both a stage list and a config file were provided; constructing from the stage list"
            );
        }

        let initial = match (params, &config_path) {
            // explicit parameters win; the config file is not read
            (Some(params), _) => params,
            (None, Some(path)) => config::load(path)?,
            (None, None) => HashMap::new(),
        };

        let reader = reader.unwrap_or_else(|| Arc::new(FileReader::new()));
        let mut stages: Vec<Arc<dyn Stage>> = Vec::with_capacity(steps.len() + 1);
        stages.push(reader);
        stages.extend(steps);

        let mut seen = HashSet::new();
        for stage in &stages {
            if !seen.insert(stage.name().to_string()) {
                return Err(DuplicateStageError::new(stage.name()).into());
            }
        }

        let mut bag = ParamBag::from_map(initial);
        bag.insert(TRAIN_PATH_KEY, Value::from(train_path));
        if let Some(path) = test_path {
            bag.insert(TEST_PATH_KEY, Value::from(path));
        }

        let mut excluded_keys: HashSet<String> =
            [TRAIN_KEY, TEST_KEY].iter().map(|key| (*key).to_string()).collect();
        excluded_keys.extend(extra_excluded);

        Ok(Pipeline::from_parts(stages, bag, excluded_keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::NoOpStage;
    use serde_json::json;

    fn noop(name: &str) -> Arc<dyn Stage> {
        Arc::new(NoOpStage::new(name))
    }

    fn some_params() -> HashMap<String, Value> {
        let mut params = HashMap::new();
        params.insert("col_1".to_string(), json!("A"));
        params
    }

    #[test]
    fn test_build_with_steps_and_params() {
        let pipeline = Pipeline::builder()
            .train_path("./data.csv")
            .steps(vec![noop("a"), noop("b")])
            .params(some_params())
            .build()
            .unwrap();

        assert_eq!(pipeline.stage_names(), ["read_file", "a", "b"]);
        assert_eq!(pipeline.params().get_str("train_df_path"), Some("./data.csv"));
        assert_eq!(pipeline.params().get_str("col_1"), Some("A"));
    }

    #[test]
    fn test_build_requires_train_path() {
        let err = Pipeline::builder()
            .steps(vec![noop("a")])
            .params(some_params())
            .build()
            .unwrap_err();

        assert!(matches!(err, PreplineError::Arguments(_)));
    }

    #[test]
    fn test_build_requires_steps_or_config() {
        let err = Pipeline::builder()
            .train_path("./data.csv")
            .params(some_params())
            .build()
            .unwrap_err();

        assert!(matches!(err, PreplineError::Arguments(_)));
    }

    #[test]
    fn test_build_steps_need_params_or_config() {
        let err = Pipeline::builder()
            .train_path("./data.csv")
            .steps(vec![noop("a")])
            .build()
            .unwrap_err();

        assert!(matches!(err, PreplineError::Arguments(_)));
    }

    #[test]
    fn test_empty_step_list_counts_as_absent() {
        let err = Pipeline::builder()
            .train_path("./data.csv")
            .steps(Vec::new())
            .params(some_params())
            .build()
            .unwrap_err();

        assert!(matches!(err, PreplineError::Arguments(_)));
    }

    #[test]
    fn test_build_rejects_duplicate_stage_names() {
        let err = Pipeline::builder()
            .train_path("./data.csv")
            .steps(vec![noop("a"), noop("a")])
            .params(some_params())
            .build()
            .unwrap_err();

        assert!(matches!(err, PreplineError::DuplicateStage(_)));
    }

    #[test]
    fn test_build_rejects_step_shadowing_reader() {
        let err = Pipeline::builder()
            .train_path("./data.csv")
            .steps(vec![noop("read_file")])
            .params(some_params())
            .build()
            .unwrap_err();

        assert!(matches!(err, PreplineError::DuplicateStage(_)));
    }

    #[test]
    fn test_build_stamps_test_path() {
        let pipeline = Pipeline::builder()
            .train_path("./train.csv")
            .test_path("./test.csv")
            .steps(vec![noop("a")])
            .params(some_params())
            .build()
            .unwrap();

        assert_eq!(pipeline.params().get_str("test_df_path"), Some("./test.csv"));
    }

    #[test]
    fn test_default_excluded_keys() {
        let pipeline = Pipeline::builder()
            .train_path("./data.csv")
            .steps(vec![noop("a")])
            .params(some_params())
            .build()
            .unwrap();

        assert!(pipeline.excluded_keys().contains("train_df"));
        assert!(pipeline.excluded_keys().contains("test_df"));
    }

    #[test]
    fn test_exclude_keys_extends_defaults() {
        let pipeline = Pipeline::builder()
            .train_path("./data.csv")
            .steps(vec![noop("a")])
            .params(some_params())
            .exclude_keys(["train_df_copy"])
            .build()
            .unwrap();

        assert!(pipeline.excluded_keys().contains("train_df"));
        assert!(pipeline.excluded_keys().contains("train_df_copy"));
    }

    #[test]
    fn test_build_missing_config_file() {
        let err = Pipeline::builder()
            .train_path("./data.csv")
            .config_path("/nowhere/config.json")
            .build()
            .unwrap_err();

        assert!(matches!(err, PreplineError::Config(_)));
    }

    #[test]
    fn test_custom_reader_replaces_default() {
        let pipeline = Pipeline::builder()
            .train_path("./data.csv")
            .reader(noop("custom_read"))
            .steps(vec![noop("a")])
            .params(some_params())
            .build()
            .unwrap();

        assert_eq!(pipeline.stage_names(), ["custom_read", "a"]);
    }
}
