//! The pipeline: an ordered stage sequence over one parameter bag.

use super::builder::PipelineBuilder;
use crate::config;
use crate::context::ParamBag;
use crate::errors::{DuplicateStageError, PreplineError, StageNotFoundError};
use crate::stages::Stage;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// Where to insert a stage relative to the current sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// Insert at this position, clamped to the end of the sequence.
    Index(usize),
    /// Insert immediately after the named stage.
    After(String),
    /// Insert immediately before the named stage.
    Before(String),
}

impl Anchor {
    /// Anchors after the named stage.
    #[must_use]
    pub fn after(name: impl Into<String>) -> Self {
        Self::After(name.into())
    }

    /// Anchors before the named stage.
    #[must_use]
    pub fn before(name: impl Into<String>) -> Self {
        Self::Before(name.into())
    }
}

/// An ordered sequence of named stages sharing one mutable parameter bag.
///
/// Stage order is execution order, at any time. Stage names are unique
/// within the sequence; they are the identity used for anchored insertion
/// and removal.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
    params: ParamBag,
    excluded_keys: HashSet<String>,
}

impl Pipeline {
    /// Starts building a pipeline.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub(crate) fn from_parts(
        stages: Vec<Arc<dyn Stage>>,
        params: ParamBag,
        excluded_keys: HashSet<String>,
    ) -> Self {
        Self {
            stages,
            params,
            excluded_keys,
        }
    }

    /// Returns the number of registered stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<String> {
        self.stages
            .iter()
            .map(|stage| stage.name().to_string())
            .collect()
    }

    /// Returns the shared parameter bag.
    #[must_use]
    pub fn params(&self) -> &ParamBag {
        &self.params
    }

    /// Returns the shared parameter bag for mutation.
    pub fn params_mut(&mut self) -> &mut ParamBag {
        &mut self.params
    }

    /// Returns the keys omitted by [`Pipeline::save_config`].
    #[must_use]
    pub fn excluded_keys(&self) -> &HashSet<String> {
        &self.excluded_keys
    }

    /// Returns the excluded-key set for extension.
    pub fn excluded_keys_mut(&mut self) -> &mut HashSet<String> {
        &mut self.excluded_keys
    }

    /// Runs every stage once, in order, over the shared parameter bag.
    ///
    /// The first stage failure aborts the run and is returned as raised;
    /// the bag keeps whatever earlier stages wrote (no rollback). Running
    /// again re-executes the full sequence against the bag as it then
    /// stands.
    ///
    /// # Errors
    ///
    /// Returns the failing stage's error, untranslated.
    pub fn process(&mut self) -> Result<(), PreplineError> {
        tracing::info!(
            stages = self.stages.len(),
            params = self.params.len(),
            "processing pipeline"
        );
        for stage in &self.stages {
            tracing::debug!(stage = %stage.name(), "running stage");
            stage.run(&mut self.params)?;
        }
        Ok(())
    }

    /// Inserts a stage at the anchored position, merging its extra
    /// parameters into the bag.
    ///
    /// All checks run before any mutation: an unresolvable anchor, a
    /// stage name already registered, or a colliding parameter key leave
    /// both the sequence and the bag untouched.
    ///
    /// # Errors
    ///
    /// `StageNotFound` when the anchor names no registered stage,
    /// `DuplicateStage` when the new stage's name is taken,
    /// `DuplicateParam` when any key of `extra_params` already exists.
    pub fn add(
        &mut self,
        stage: Arc<dyn Stage>,
        extra_params: HashMap<String, Value>,
        anchor: Anchor,
    ) -> Result<(), PreplineError> {
        let index = self.resolve_anchor(&anchor)?;
        if self.position_of(stage.name()).is_some() {
            return Err(DuplicateStageError::new(stage.name()).into());
        }
        self.params.merge_new(extra_params)?;
        self.stages.insert(index, stage);
        Ok(())
    }

    /// Removes the named stage from the sequence.
    ///
    /// Parameters the stage (or the `add` that introduced it) placed into
    /// the bag are left as they are.
    ///
    /// # Errors
    ///
    /// `StageNotFound` when no registered stage carries that name.
    pub fn remove(&mut self, name: &str) -> Result<(), PreplineError> {
        let index = self
            .position_of(name)
            .ok_or_else(|| StageNotFoundError::new(name))?;
        self.stages.remove(index);
        Ok(())
    }

    /// Logs the current stage sequence and parameter count.
    pub fn info(&self) {
        tracing::info!(
            stages = ?self.stage_names(),
            params = self.params.len(),
            "pipeline state"
        );
    }

    /// Saves the parameter bag to `path`, omitting the excluded keys.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the document cannot be written.
    pub fn save_config(&self, path: impl AsRef<Path>) -> Result<(), PreplineError> {
        config::save(path, &self.params, &self.excluded_keys)?;
        Ok(())
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.stages.iter().position(|stage| stage.name() == name)
    }

    fn resolve_anchor(&self, anchor: &Anchor) -> Result<usize, StageNotFoundError> {
        match anchor {
            Anchor::Index(index) => Ok((*index).min(self.stages.len())),
            Anchor::After(name) => self
                .position_of(name)
                .map(|index| index + 1)
                .ok_or_else(|| StageNotFoundError::new(name)),
            // inserting at the anchor's position shifts the anchor one later
            Anchor::Before(name) => self
                .position_of(name)
                .ok_or_else(|| StageNotFoundError::new(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::NoOpStage;

    fn noop(name: &str) -> Arc<dyn Stage> {
        Arc::new(NoOpStage::new(name))
    }

    fn three_stage_pipeline() -> Pipeline {
        Pipeline::from_parts(
            vec![noop("a"), noop("b"), noop("c")],
            ParamBag::new(),
            HashSet::new(),
        )
    }

    #[test]
    fn test_add_after() {
        let mut pipeline = three_stage_pipeline();
        pipeline
            .add(noop("d"), HashMap::new(), Anchor::after("b"))
            .unwrap();

        assert_eq!(pipeline.stage_names(), ["a", "b", "d", "c"]);
    }

    #[test]
    fn test_add_before() {
        let mut pipeline = three_stage_pipeline();
        pipeline
            .add(noop("d"), HashMap::new(), Anchor::before("b"))
            .unwrap();

        assert_eq!(pipeline.stage_names(), ["a", "d", "b", "c"]);
    }

    #[test]
    fn test_add_at_index() {
        let mut pipeline = three_stage_pipeline();
        pipeline
            .add(noop("d"), HashMap::new(), Anchor::Index(0))
            .unwrap();

        assert_eq!(pipeline.stage_names(), ["d", "a", "b", "c"]);
    }

    #[test]
    fn test_add_at_index_clamps_to_end() {
        let mut pipeline = three_stage_pipeline();
        pipeline
            .add(noop("d"), HashMap::new(), Anchor::Index(99))
            .unwrap();

        assert_eq!(pipeline.stage_names(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_add_unknown_anchor() {
        let mut pipeline = three_stage_pipeline();
        let err = pipeline
            .add(noop("d"), HashMap::new(), Anchor::after("z"))
            .unwrap_err();

        assert!(err.to_string().contains("'z'"));
        assert_eq!(pipeline.stage_names(), ["a", "b", "c"]);
    }

    #[test]
    fn test_add_duplicate_stage_name() {
        let mut pipeline = three_stage_pipeline();
        let err = pipeline
            .add(noop("b"), HashMap::new(), Anchor::after("a"))
            .unwrap_err();

        assert!(matches!(err, PreplineError::DuplicateStage(_)));
        assert_eq!(pipeline.stage_count(), 3);
    }

    #[test]
    fn test_remove() {
        let mut pipeline = three_stage_pipeline();
        pipeline.remove("b").unwrap();

        assert_eq!(pipeline.stage_names(), ["a", "c"]);
    }

    #[test]
    fn test_remove_unknown_stage() {
        let mut pipeline = three_stage_pipeline();
        let err = pipeline.remove("z").unwrap_err();

        assert!(matches!(err, PreplineError::StageNotFound(_)));
        assert_eq!(pipeline.stage_count(), 3);
    }

    #[test]
    fn test_remove_leaves_params_orphaned() {
        let mut pipeline = three_stage_pipeline();
        let mut extra = HashMap::new();
        extra.insert("col_2".to_string(), serde_json::json!("A"));
        pipeline
            .add(noop("d"), extra, Anchor::after("a"))
            .unwrap();

        pipeline.remove("d").unwrap();
        assert!(pipeline.params().contains_key("col_2"));
    }

    #[test]
    fn test_info_does_not_panic() {
        three_stage_pipeline().info();
    }
}
