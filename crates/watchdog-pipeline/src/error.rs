use thiserror::Error;
use watchdog_core::StageStatus;
use watchdog_gemini::GeminiError;

use crate::machine::Trigger;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A submission arrived while another run was still in flight.
    #[error("a run is already in progress")]
    RunInProgress,

    #[error("invalid transition from {from} on {trigger:?}")]
    InvalidTransition { from: StageStatus, trigger: Trigger },

    /// Campaign synthesis failed. Fatal to the run.
    #[error("campaign synthesis failed: {0}")]
    Synthesis(#[from] GeminiError),

    #[error("stage {stage} timed out after {secs}s")]
    StageTimeout { stage: StageStatus, secs: u64 },
}
