//! # Prepline
//!
//! Linear data-preparation pipelines for tabular datasets.
//!
//! A pipeline is an ordered sequence of named [`stages::Stage`]s sharing
//! one mutable [`context::ParamBag`]. Stages run strictly in order,
//! synchronously, and fail fast; the sequence can be reshaped at runtime
//! by anchored insertion and by-name removal; and the parameter bag can
//! be persisted to (and restored from) a JSON configuration document,
//! minus the bulky dataset keys.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use prepline::prelude::*;
//! use std::sync::Arc;
//!
//! let mut pipeline = Pipeline::builder()
//!     .train_path("./datasets/train.csv")
//!     .step(Arc::new(FnStage::new("drop_nulls", drop_nulls)))
//!     .step(Arc::new(FnStage::new("scale", scale)))
//!     .params(params)
//!     .build()?;
//!
//! pipeline.add(Arc::new(FnStage::new("encode", encode)), extra, Anchor::before("scale"))?;
//! pipeline.process()?;
//! pipeline.save_config("./datasets/pipeline_config.json")?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod errors;
pub mod frame;
pub mod input;
pub mod pipeline;
pub mod stages;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::ParamBag;
    pub use crate::errors::{
        ArgumentsError, ConfigError, DuplicateParamError, DuplicateStageError, PreplineError,
        StageNotFoundError,
    };
    pub use crate::frame::{Frame, FrameError};
    pub use crate::input::FileReader;
    pub use crate::pipeline::{Anchor, Pipeline, PipelineBuilder};
    pub use crate::stages::{FnStage, NoOpStage, Stage};
}
