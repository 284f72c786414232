//! The seam between the orchestrator and the content-generation service.
//!
//! Evidence-gathering operations never fail outright: they return a
//! [`StageOutcome`] that is either the real value or a fallback plus the
//! reason it was substituted. Campaign synthesis is the only operation whose
//! error reaches the orchestrator.

use std::future::Future;

use watchdog_core::{
    CampaignStrategy, Coordinates, GroundedContext, ImageInput, SyntheticPost,
};
use watchdog_gemini::{CampaignBrief, GeminiClient, GeminiError};

/// Substituted for the diagnosis when image analysis fails.
pub const IMAGE_ANALYSIS_FALLBACK: &str = "Błąd analizy obrazu.";

/// Substituted for the grounding summary when the lookup fails.
pub const GROUNDING_FALLBACK: &str = "Could not fetch map data.";

/// Result of a non-fatal gateway operation.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Completed(T),
    /// The call failed; `value` is the stage's fallback and `reason`
    /// describes the failure.
    Fallback { value: T, reason: String },
}

impl<T> StageOutcome<T> {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, StageOutcome::Fallback { .. })
    }

    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            StageOutcome::Completed(value) | StageOutcome::Fallback { value, .. } => value,
        }
    }

    #[must_use]
    pub fn into_value(self) -> T {
        match self {
            StageOutcome::Completed(value) | StageOutcome::Fallback { value, .. } => value,
        }
    }

    /// Map a fallible result onto an outcome, substituting `fallback` on error.
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(value) => StageOutcome::Completed(value),
            Err(e) => StageOutcome::Fallback {
                value: fallback(),
                reason: e.to_string(),
            },
        }
    }
}

/// The four request types the pipeline issues, one per stage.
pub trait ContentGateway {
    /// Diagnose a photo. Falls back to [`IMAGE_ANALYSIS_FALLBACK`].
    fn analyze_image(
        &self,
        image: &ImageInput,
    ) -> impl Future<Output = StageOutcome<String>> + Send;

    /// Generate synthetic posts. Falls back to an empty list.
    fn synthesize_posts(
        &self,
        topic: &str,
        location: &str,
    ) -> impl Future<Output = StageOutcome<Vec<SyntheticPost>>> + Send;

    /// Fetch grounded location context. Falls back to
    /// [`GROUNDING_FALLBACK`] with no references.
    fn fetch_grounded_context(
        &self,
        query: &str,
        coordinates: Option<Coordinates>,
    ) -> impl Future<Output = StageOutcome<GroundedContext>> + Send;

    /// Synthesize the campaign. Errors are fatal to the run.
    fn synthesize_campaign(
        &self,
        brief: &CampaignBrief<'_>,
    ) -> impl Future<Output = Result<CampaignStrategy, GeminiError>> + Send;
}

impl ContentGateway for GeminiClient {
    async fn analyze_image(&self, image: &ImageInput) -> StageOutcome<String> {
        StageOutcome::from_result(GeminiClient::analyze_image(self, image).await, || {
            IMAGE_ANALYSIS_FALLBACK.to_string()
        })
    }

    async fn synthesize_posts(&self, topic: &str, location: &str) -> StageOutcome<Vec<SyntheticPost>> {
        StageOutcome::from_result(
            GeminiClient::synthesize_posts(self, topic, location).await,
            Vec::new,
        )
    }

    async fn fetch_grounded_context(
        &self,
        query: &str,
        coordinates: Option<Coordinates>,
    ) -> StageOutcome<GroundedContext> {
        StageOutcome::from_result(
            GeminiClient::fetch_grounded_context(self, query, coordinates).await,
            || GroundedContext::summary_only(GROUNDING_FALLBACK),
        )
    }

    async fn synthesize_campaign(
        &self,
        brief: &CampaignBrief<'_>,
    ) -> Result<CampaignStrategy, GeminiError> {
        GeminiClient::synthesize_campaign(self, brief).await
    }
}
