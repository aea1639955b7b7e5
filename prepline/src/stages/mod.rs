//! Stage trait and basic implementations.
//!
//! Stages are the units of work in a prepline pipeline. Each pairs a
//! stable name, used for anchoring and removal, with an action that
//! mutates the shared parameter bag.

use crate::context::ParamBag;
use std::fmt::Debug;

/// Trait for pipeline stages.
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Executes the stage against the shared parameter bag.
    ///
    /// Mutating the bag is the stage's only observable effect.
    ///
    /// # Errors
    ///
    /// Any error aborts the pipeline run; remaining stages do not
    /// execute and the bag keeps whatever was written before the failure.
    fn run(&self, params: &mut ParamBag) -> anyhow::Result<()>;
}

/// A stage built from an explicit name and a closure.
pub struct FnStage<F>
where
    F: Fn(&mut ParamBag) -> anyhow::Result<()> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(&mut ParamBag) -> anyhow::Result<()> + Send + Sync,
{
    /// Creates a new function-based stage.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnStage<F>
where
    F: Fn(&mut ParamBag) -> anyhow::Result<()> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(&mut ParamBag) -> anyhow::Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, params: &mut ParamBag) -> anyhow::Result<()> {
        (self.func)(params)
    }
}

/// A stage that does nothing. Useful in tests.
#[derive(Debug, Clone)]
pub struct NoOpStage {
    name: String,
}

impl NoOpStage {
    /// Creates a new no-op stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Stage for NoOpStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, _params: &mut ParamBag) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fn_stage() {
        let stage = FnStage::new("mark", |params: &mut ParamBag| {
            params.insert("marked", json!(true));
            Ok(())
        });

        assert_eq!(stage.name(), "mark");

        let mut bag = ParamBag::new();
        stage.run(&mut bag).unwrap();
        assert_eq!(bag.get("marked"), Some(&json!(true)));
    }

    #[test]
    fn test_fn_stage_error_propagates() {
        let stage = FnStage::new("boom", |_params: &mut ParamBag| {
            anyhow::bail!("no data to work with")
        });

        let mut bag = ParamBag::new();
        let err = stage.run(&mut bag).unwrap_err();
        assert!(err.to_string().contains("no data"));
    }

    #[test]
    fn test_noop_stage() {
        let stage = NoOpStage::new("noop");

        assert_eq!(stage.name(), "noop");

        let mut bag = ParamBag::new();
        stage.run(&mut bag).unwrap();
        assert!(bag.is_empty());
    }
}
