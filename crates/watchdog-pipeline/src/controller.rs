//! Run controller: owns the current [`PipelineRun`] and drives it through
//! the stage sequence.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use watchdog_core::{AppConfig, Coordinates, StageStatus};
use watchdog_gemini::prompts::grounding_query;
use watchdog_gemini::CampaignBrief;

use crate::error::PipelineError;
use crate::events::PipelineEvent;
use crate::gateway::{ContentGateway, StageOutcome, GROUNDING_FALLBACK, IMAGE_ANALYSIS_FALLBACK};
use crate::machine::{next_status, Trigger};
use crate::run::{PipelineRun, Submission};

/// Topic used when a photo is submitted without one.
pub const DEFAULT_IMAGE_TOPIC: &str = "Zgłoszenie problemu miejskiego na podstawie zdjęcia";

const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    /// Biases the grounding lookup when present.
    pub coordinates: Option<Coordinates>,
    /// Upper bound for any single stage.
    pub stage_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            coordinates: None,
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
        }
    }
}

impl PipelineOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            coordinates: config.coordinates,
            stage_timeout: Duration::from_secs(config.stage_timeout_secs),
        }
    }
}

/// Drives one run at a time against a [`ContentGateway`].
pub struct Controller<G> {
    gateway: G,
    options: PipelineOptions,
    run: PipelineRun,
    events: Option<UnboundedSender<PipelineEvent>>,
}

impl<G: ContentGateway> Controller<G> {
    #[must_use]
    pub fn new(gateway: G, options: PipelineOptions) -> Self {
        Self {
            gateway,
            options,
            run: PipelineRun::idle(),
            events: None,
        }
    }

    /// Attach a progress channel. Send failures are ignored.
    #[must_use]
    pub fn with_events(mut self, events: UnboundedSender<PipelineEvent>) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub fn run(&self) -> &PipelineRun {
        &self.run
    }

    #[must_use]
    pub fn status(&self) -> StageStatus {
        self.run.status
    }

    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Start a run and drive it to a terminal status.
    ///
    /// A submission with neither a topic nor an image is ignored and the
    /// current status is returned unchanged. Submitting from `Finished` or
    /// `Error` discards the previous run first.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::RunInProgress`] if the current run is in flight
    ///   (an earlier `submit` future was dropped mid-run; call [`abort`]).
    /// - [`PipelineError::Synthesis`] or [`PipelineError::StageTimeout`] if
    ///   campaign synthesis failed. The run is left in `Error`.
    ///
    /// [`abort`]: Controller::abort
    pub async fn submit(&mut self, submission: Submission) -> Result<StageStatus, PipelineError> {
        if !submission.is_actionable() {
            tracing::debug!(status = %self.run.status, "ignoring submission without topic or image");
            return Ok(self.run.status);
        }
        if self.run.status.is_in_flight() {
            return Err(PipelineError::RunInProgress);
        }
        if self.run.status.is_terminal() {
            self.reset()?;
        }

        self.run = PipelineRun::from_submission(submission);
        tracing::info!(
            run_id = %self.run.id,
            topic = %self.run.topic,
            location = %self.run.location,
            has_image = self.run.has_image(),
            "pipeline run started"
        );
        self.advance(Trigger::Submit {
            has_image: self.run.has_image(),
        })?;

        loop {
            match self.run.status {
                StageStatus::AnalyzingImage => self.analyze_image_stage().await?,
                StageStatus::Scraping => self.posts_stage().await?,
                StageStatus::AnalyzingMap => self.grounding_stage().await?,
                StageStatus::Generating => self.campaign_stage().await?,
                status => return Ok(status),
            }
        }
    }

    /// Discard the finished run and return to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTransition`] unless the run is in
    /// `Finished` or `Error`.
    pub fn reset(&mut self) -> Result<(), PipelineError> {
        let from = self.run.status;
        let to = next_status(from, Trigger::Reset)?;
        tracing::debug!(run_id = %self.run.id, "pipeline run discarded");
        self.run = PipelineRun::idle();
        self.emit(PipelineEvent::StatusChanged { from, to });
        Ok(())
    }

    /// Move an abandoned in-flight run to `Error`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTransition`] if no run is in flight.
    pub fn abort(&mut self) -> Result<(), PipelineError> {
        self.advance(Trigger::Abort)?;
        let message = "run aborted".to_string();
        tracing::warn!(run_id = %self.run.id, "pipeline run aborted");
        self.run.failure = Some(message.clone());
        self.emit(PipelineEvent::RunFailed(message));
        Ok(())
    }

    async fn analyze_image_stage(&mut self) -> Result<(), PipelineError> {
        let limit = self.options.stage_timeout;
        let outcome = match self.run.image.as_ref() {
            Some(image) => within(limit, StageStatus::AnalyzingImage, self.gateway.analyze_image(image))
                .await
                .unwrap_or_else(|e| fallback(IMAGE_ANALYSIS_FALLBACK.to_string(), &e)),
            None => StageOutcome::Fallback {
                value: IMAGE_ANALYSIS_FALLBACK.to_string(),
                reason: "no image attached".to_string(),
            },
        };
        self.note_fallback(StageStatus::AnalyzingImage, &outcome);

        let diagnosis = outcome.into_value();
        if self.run.effective_topic.is_empty() {
            self.run.effective_topic = DEFAULT_IMAGE_TOPIC.to_string();
        }
        self.run.image_diagnosis = Some(diagnosis.clone());
        self.emit(PipelineEvent::ImageDiagnosed(diagnosis));
        self.advance(Trigger::ImageAnalyzed)?;
        Ok(())
    }

    async fn posts_stage(&mut self) -> Result<(), PipelineError> {
        let limit = self.options.stage_timeout;
        let outcome = within(
            limit,
            StageStatus::Scraping,
            self.gateway
                .synthesize_posts(&self.run.effective_topic, &self.run.location),
        )
        .await
        .unwrap_or_else(|e| fallback(Vec::new(), &e));
        self.note_fallback(StageStatus::Scraping, &outcome);

        let posts = outcome.into_value();
        tracing::info!(run_id = %self.run.id, count = posts.len(), "synthetic posts recorded");
        self.run.posts.clone_from(&posts);
        self.emit(PipelineEvent::PostsReady(posts));
        self.advance(Trigger::PostsSynthesized)?;
        Ok(())
    }

    async fn grounding_stage(&mut self) -> Result<(), PipelineError> {
        let limit = self.options.stage_timeout;
        let query = grounding_query(&self.run.effective_topic, &self.run.location);
        let outcome = within(
            limit,
            StageStatus::AnalyzingMap,
            self.gateway
                .fetch_grounded_context(&query, self.options.coordinates),
        )
        .await
        .unwrap_or_else(|e| {
            fallback(
                watchdog_core::GroundedContext::summary_only(GROUNDING_FALLBACK),
                &e,
            )
        });
        self.note_fallback(StageStatus::AnalyzingMap, &outcome);

        let context = outcome.into_value();
        tracing::info!(
            run_id = %self.run.id,
            references = context.references.len(),
            "location context recorded"
        );
        self.run.grounding = Some(context.clone());
        self.emit(PipelineEvent::ContextReady(context));
        self.advance(Trigger::ContextFetched)?;
        Ok(())
    }

    async fn campaign_stage(&mut self) -> Result<(), PipelineError> {
        let limit = self.options.stage_timeout;
        let brief = CampaignBrief {
            topic: &self.run.effective_topic,
            posts: &self.run.posts,
            location_context: self
                .run
                .grounding
                .as_ref()
                .map_or("", |g| g.summary.as_str()),
            image_diagnosis: self.run.image_diagnosis.as_deref(),
        };
        let result = within(
            limit,
            StageStatus::Generating,
            self.gateway.synthesize_campaign(&brief),
        )
        .await
        .and_then(|r| r.map_err(PipelineError::from));

        match result {
            Ok(strategy) => {
                self.run.strategy = Some(strategy.clone());
                self.advance(Trigger::CampaignSucceeded)?;
                tracing::info!(run_id = %self.run.id, headline = %strategy.headline, "campaign ready");
                self.emit(PipelineEvent::CampaignReady(strategy));
                Ok(())
            }
            Err(e) => {
                tracing::error!(run_id = %self.run.id, error = %e, "campaign synthesis failed");
                self.run.failure = Some(e.to_string());
                self.advance(Trigger::CampaignFailed)?;
                self.emit(PipelineEvent::RunFailed(e.to_string()));
                Err(e)
            }
        }
    }

    fn advance(&mut self, trigger: Trigger) -> Result<StageStatus, PipelineError> {
        let from = self.run.status;
        let to = next_status(from, trigger)?;
        self.run.record_transition(to);
        tracing::info!(run_id = %self.run.id, %from, %to, "pipeline stage transition");
        self.emit(PipelineEvent::StatusChanged { from, to });
        Ok(to)
    }

    fn note_fallback<T>(&mut self, stage: StageStatus, outcome: &StageOutcome<T>) {
        if let StageOutcome::Fallback { reason, .. } = outcome {
            tracing::warn!(run_id = %self.run.id, %stage, error = %reason, "stage degraded to fallback");
            self.run.degraded.push(stage);
            self.emit(PipelineEvent::StageDegraded {
                stage,
                reason: reason.clone(),
            });
        }
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                tracing::debug!("event receiver dropped");
            }
        }
    }
}

/// Bound `future` by `limit`, reporting `stage` on expiry.
async fn within<T>(
    limit: Duration,
    stage: StageStatus,
    future: impl Future<Output = T>,
) -> Result<T, PipelineError> {
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| PipelineError::StageTimeout {
            stage,
            secs: limit.as_secs(),
        })
}

fn fallback<T>(value: T, error: &PipelineError) -> StageOutcome<T> {
    StageOutcome::Fallback {
        value,
        reason: error.to_string(),
    }
}

/// A controller shared between tasks.
///
/// Submissions that arrive while another task holds the controller are
/// rejected with [`PipelineError::RunInProgress`] rather than queued.
pub struct SharedController<G> {
    inner: Arc<Mutex<Controller<G>>>,
}

impl<G> Clone for SharedController<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: ContentGateway> SharedController<G> {
    #[must_use]
    pub fn new(controller: Controller<G>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::RunInProgress`] if another task is driving a
    /// run, otherwise whatever [`Controller::submit`] returns.
    pub async fn try_submit(&self, submission: Submission) -> Result<StageStatus, PipelineError> {
        let mut controller = self
            .inner
            .try_lock()
            .map_err(|_| PipelineError::RunInProgress)?;
        controller.submit(submission).await
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::RunInProgress`] while a run is being driven,
    /// otherwise whatever [`Controller::reset`] returns.
    pub fn try_reset(&self) -> Result<(), PipelineError> {
        let mut controller = self
            .inner
            .try_lock()
            .map_err(|_| PipelineError::RunInProgress)?;
        controller.reset()
    }

    /// Copy of the current run, or `None` while a run is being driven.
    #[must_use]
    pub fn snapshot(&self) -> Option<PipelineRun> {
        self.inner.try_lock().ok().map(|c| c.run().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_config() {
        let config = AppConfig {
            env: watchdog_core::Environment::Test,
            log_level: "debug".to_string(),
            gemini_api_key: None,
            gemini_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 5,
            stage_timeout_secs: 7,
            default_location: "Kraków".to_string(),
            models: watchdog_core::ModelConfig::default(),
            coordinates: Coordinates::new(50.06, 19.94).ok(),
        };
        let options = PipelineOptions::from_config(&config);
        assert_eq!(options.stage_timeout, Duration::from_secs(7));
        assert_eq!(options.coordinates, config.coordinates);
    }

    #[test]
    fn default_options_use_three_minute_bound() {
        let options = PipelineOptions::default();
        assert_eq!(options.stage_timeout, Duration::from_secs(180));
        assert!(options.coordinates.is_none());
    }

    #[tokio::test]
    async fn within_reports_stage_on_expiry() {
        let err = within(
            Duration::from_millis(1),
            StageStatus::Scraping,
            std::future::pending::<()>(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::StageTimeout {
                stage: StageStatus::Scraping,
                secs: 0
            }
        ));
    }
}
