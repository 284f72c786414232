//! Campaign pipeline orchestration.
//!
//! Drives one run through image diagnosis, post synthesis, location grounding
//! and campaign synthesis, strictly in that order. Stages 1–3 degrade to
//! fallback values on failure; a failed campaign synthesis ends the run in
//! [`StageStatus::Error`](watchdog_core::StageStatus::Error).

pub mod controller;
pub mod error;
pub mod events;
pub mod gateway;
pub mod machine;
pub mod run;

pub use controller::{Controller, PipelineOptions, SharedController, DEFAULT_IMAGE_TOPIC};
pub use error::PipelineError;
pub use events::PipelineEvent;
pub use gateway::{ContentGateway, StageOutcome, GROUNDING_FALLBACK, IMAGE_ANALYSIS_FALLBACK};
pub use machine::{next_status, Trigger};
pub use run::{PipelineRun, StageTransition, Submission};
