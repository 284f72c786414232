//! Stage transition table.
//!
//! Every status change goes through [`next_status`]; the controller never
//! assigns a status directly. Illegal pairs are rejected without side effects.

use watchdog_core::StageStatus;

use crate::error::PipelineError;

/// Events that move a run between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Submit { has_image: bool },
    ImageAnalyzed,
    PostsSynthesized,
    ContextFetched,
    CampaignSucceeded,
    CampaignFailed,
    /// Abandon an in-flight run.
    Abort,
    Reset,
}

/// Resolve the status reached from `from` on `trigger`.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidTransition`] if the table has no entry
/// for the pair.
pub fn next_status(from: StageStatus, trigger: Trigger) -> Result<StageStatus, PipelineError> {
    use watchdog_core::StageStatus as S;

    let to = match (from, trigger) {
        (S::Idle, Trigger::Submit { has_image: true }) => S::AnalyzingImage,
        (S::Idle, Trigger::Submit { has_image: false })
        | (S::AnalyzingImage, Trigger::ImageAnalyzed) => S::Scraping,
        (S::Scraping, Trigger::PostsSynthesized) => S::AnalyzingMap,
        (S::AnalyzingMap, Trigger::ContextFetched) => S::Generating,
        (S::Generating, Trigger::CampaignSucceeded) => S::Finished,
        (S::Generating, Trigger::CampaignFailed) => S::Error,
        (s, Trigger::Abort) if s.is_in_flight() => S::Error,
        (S::Finished | S::Error, Trigger::Reset) => S::Idle,
        _ => return Err(PipelineError::InvalidTransition { from, trigger }),
    };
    Ok(to)
}
