//! The per-submission run record.
//!
//! Fields are readable by anyone but writable only from within this crate;
//! the [`Controller`](crate::Controller) is the sole writer.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use watchdog_core::{
    CampaignStrategy, GroundedContext, ImageInput, StageStatus, SyntheticPost,
};

/// User intent to start a run.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub topic: String,
    pub location: String,
    pub image: Option<ImageInput>,
}

impl Submission {
    #[must_use]
    pub fn new(topic: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            location: location.into(),
            image: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: ImageInput) -> Self {
        self.image = Some(image);
        self
    }

    #[must_use]
    pub fn has_image(&self) -> bool {
        self.image.as_ref().is_some_and(|i| !i.is_empty())
    }

    /// A run needs a topic or a photo; anything else is ignored.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        !self.topic.trim().is_empty() || self.has_image()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTransition {
    pub from: StageStatus,
    pub to: StageStatus,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub(crate) id: Uuid,
    pub(crate) topic: String,
    pub(crate) effective_topic: String,
    pub(crate) location: String,
    pub(crate) image: Option<ImageInput>,
    pub(crate) status: StageStatus,
    pub(crate) history: Vec<StageTransition>,
    pub(crate) image_diagnosis: Option<String>,
    pub(crate) posts: Vec<SyntheticPost>,
    pub(crate) grounding: Option<GroundedContext>,
    pub(crate) strategy: Option<CampaignStrategy>,
    pub(crate) failure: Option<String>,
    pub(crate) degraded: Vec<StageStatus>,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::idle()
    }
}

impl PipelineRun {
    /// An empty record with nothing submitted.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            id: Uuid::nil(),
            topic: String::new(),
            effective_topic: String::new(),
            location: String::new(),
            image: None,
            status: StageStatus::Idle,
            history: Vec::new(),
            image_diagnosis: None,
            posts: Vec::new(),
            grounding: None,
            strategy: None,
            failure: None,
            degraded: Vec::new(),
        }
    }

    /// A fresh record for `submission`, still at `Idle`.
    pub(crate) fn from_submission(submission: Submission) -> Self {
        let image = submission.image.filter(|i| !i.is_empty());
        Self {
            id: Uuid::new_v4(),
            effective_topic: submission.topic.trim().to_string(),
            topic: submission.topic,
            location: submission.location,
            image,
            ..Self::idle()
        }
    }

    pub(crate) fn record_transition(&mut self, to: StageStatus) {
        self.history.push(StageTransition {
            from: self.status,
            to,
            at: Utc::now(),
        });
        self.status = to;
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn status(&self) -> StageStatus {
        self.status
    }

    /// Topic as submitted.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Topic actually used for generation, after default substitution.
    #[must_use]
    pub fn effective_topic(&self) -> &str {
        &self.effective_topic
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    #[must_use]
    pub fn history(&self) -> &[StageTransition] {
        &self.history
    }

    /// Statuses visited by this run, starting at `Idle`.
    #[must_use]
    pub fn visited(&self) -> Vec<StageStatus> {
        let mut visited = vec![StageStatus::Idle];
        visited.extend(self.history.iter().map(|t| t.to));
        visited
    }

    #[must_use]
    pub fn image_diagnosis(&self) -> Option<&str> {
        self.image_diagnosis.as_deref()
    }

    #[must_use]
    pub fn posts(&self) -> &[SyntheticPost] {
        &self.posts
    }

    #[must_use]
    pub fn grounding(&self) -> Option<&GroundedContext> {
        self.grounding.as_ref()
    }

    /// The campaign, only once the run has finished.
    #[must_use]
    pub fn strategy(&self) -> Option<&CampaignStrategy> {
        if self.status == StageStatus::Finished {
            self.strategy.as_ref()
        } else {
            None
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Stages that used a fallback value instead of a real response.
    #[must_use]
    pub fn degraded_stages(&self) -> &[StageStatus] {
        &self.degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_submission_is_not_actionable() {
        assert!(!Submission::new("", "Kraków").is_actionable());
        assert!(!Submission::new("   ", "Kraków").is_actionable());
        assert!(Submission::new("dziura", "Kraków").is_actionable());
    }

    #[test]
    fn image_alone_is_actionable_but_empty_image_is_not() {
        let with_image =
            Submission::new("", "Kraków").with_image(ImageInput::new(vec![1, 2], "image/png"));
        assert!(with_image.is_actionable());

        let empty_image = Submission::new("", "Kraków").with_image(ImageInput::new(vec![], "image/png"));
        assert!(!empty_image.is_actionable());
    }

    #[test]
    fn strategy_hidden_unless_finished() {
        let mut run = PipelineRun::idle();
        run.strategy = Some(CampaignStrategy {
            headline: "h".to_string(),
            article_content: "a".to_string(),
            hashtags: vec!["#x".to_string()],
            target_authority: "t".to_string(),
            pressure_points: vec![],
            official_complaint: watchdog_core::OfficialComplaint {
                subject: "s".to_string(),
                recipient: "r".to_string(),
                body: "b".to_string(),
            },
            social_content: watchdog_core::SocialContent {
                twitter_post: "tw".to_string(),
                facebook_post: "fb".to_string(),
            },
        });
        run.status = StageStatus::Generating;
        assert!(run.strategy().is_none());
        run.status = StageStatus::Finished;
        assert!(run.strategy().is_some());
    }

    #[test]
    fn record_transition_appends_history() {
        let mut run = PipelineRun::from_submission(Submission::new("t", "l"));
        run.record_transition(StageStatus::Scraping);
        run.record_transition(StageStatus::AnalyzingMap);
        assert_eq!(run.status(), StageStatus::AnalyzingMap);
        assert_eq!(
            run.visited(),
            [StageStatus::Idle, StageStatus::Scraping, StageStatus::AnalyzingMap]
        );
        assert_eq!(run.history()[0].from, StageStatus::Idle);
    }
}
