use std::fmt;

use serde::Serialize;

/// Visible pipeline status, in the order a run visits them.
///
/// The derived ordering follows declaration order, so `Error` compares
/// greater than every other status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Idle,
    AnalyzingImage,
    Scraping,
    AnalyzingMap,
    Generating,
    Finished,
    Error,
}

/// Progress of a single stage relative to the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Pending,
    Active,
    Completed,
}

impl StageStatus {
    /// The four working stages, in execution order.
    pub const WORKING: [StageStatus; 4] = [
        StageStatus::AnalyzingImage,
        StageStatus::Scraping,
        StageStatus::AnalyzingMap,
        StageStatus::Generating,
    ];

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, StageStatus::Finished | StageStatus::Error)
    }

    /// `true` while a gateway call is outstanding.
    #[must_use]
    pub fn is_in_flight(self) -> bool {
        Self::WORKING.contains(&self)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StageStatus::Idle => "idle",
            StageStatus::AnalyzingImage => "analyzing_image",
            StageStatus::Scraping => "scraping",
            StageStatus::AnalyzingMap => "analyzing_map",
            StageStatus::Generating => "generating",
            StageStatus::Finished => "finished",
            StageStatus::Error => "error",
        }
    }

    /// Human-readable description of the work done in this status.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            StageStatus::Idle => "Waiting for a report",
            StageStatus::AnalyzingImage => "Analyzing photo evidence",
            StageStatus::Scraping => "Collecting social media posts",
            StageStatus::AnalyzingMap => "Verifying location context",
            StageStatus::Generating => "Drafting complaint and campaign",
            StageStatus::Finished => "Campaign ready",
            StageStatus::Error => "Campaign generation failed",
        }
    }

    /// Progress of `stage` when the pipeline is at `self`.
    #[must_use]
    pub fn step_state(self, stage: StageStatus) -> StepState {
        match self.cmp(&stage) {
            std::cmp::Ordering::Equal => StepState::Active,
            std::cmp::Ordering::Greater => StepState::Completed,
            std::cmp::Ordering::Less => StepState::Pending,
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
