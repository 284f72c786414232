//! Terminal and JSON presentation of a pipeline run.

use std::fmt;

use serde_json::json;
use watchdog_core::{
    filter_posts, CampaignStrategy, GroundedContext, PostFilter, Sentiment, SentimentBreakdown,
    StageStatus, StepState,
};
use watchdog_pipeline::{PipelineEvent, PipelineRun};

pub(crate) const RETRY_PROMPT: &str =
    "Campaign generation failed. Check your connection and API key, then try again.";

fn step_marker(state: StepState) -> &'static str {
    match state {
        StepState::Pending => "[ ]",
        StepState::Active => "[>]",
        StepState::Completed => "[x]",
    }
}

/// One line per working stage, marked pending, active or completed. The
/// image step is listed only when a photo was attached.
pub(crate) fn progress(status: StageStatus, has_image: bool) -> String {
    StageStatus::WORKING
        .iter()
        .filter(|stage| has_image || **stage != StageStatus::AnalyzingImage)
        .map(|stage| format!("{} {}", step_marker(status.step_state(*stage)), stage.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stderr line for a progress event, if it has one.
pub(crate) fn event_line(event: &PipelineEvent) -> Option<String> {
    match event {
        PipelineEvent::StatusChanged { to, .. } if to.is_in_flight() => {
            Some(format!("{}...", to.label()))
        }
        PipelineEvent::StatusChanged { .. } | PipelineEvent::CampaignReady(_) => None,
        PipelineEvent::ImageDiagnosed(diagnosis) => Some(format!("  diagnosis: {diagnosis}")),
        PipelineEvent::PostsReady(posts) => Some(format!("  {} posts collected", posts.len())),
        PipelineEvent::ContextReady(context) => Some(format!(
            "  {} location references",
            context.references.len()
        )),
        PipelineEvent::StageDegraded { stage, reason } => {
            Some(format!("  ! {stage} used fallback: {reason}"))
        }
        PipelineEvent::RunFailed(reason) => Some(format!("  ! run failed: {reason}")),
    }
}

/// Machine-readable view of a run. Posts are filtered; the sentiment
/// breakdown always covers every post.
pub(crate) fn run_json(run: &PipelineRun, filter: &PostFilter) -> serde_json::Value {
    json!({
        "id": run.id().to_string(),
        "status": run.status(),
        "topic": run.effective_topic(),
        "location": run.location(),
        "imageDiagnosis": run.image_diagnosis(),
        "posts": filter_posts(run.posts(), filter),
        "sentiment": SentimentBreakdown::from_posts(run.posts()),
        "grounding": run.grounding(),
        "degradedStages": run.degraded_stages(),
        "strategy": run.strategy(),
        "failure": run.failure(),
    })
}

/// Text report of a finished (or failed) run.
pub(crate) struct Report<'a> {
    run: &'a PipelineRun,
    filter: &'a PostFilter,
}

impl<'a> Report<'a> {
    pub(crate) fn new(run: &'a PipelineRun, filter: &'a PostFilter) -> Self {
        Self { run, filter }
    }

    fn write_posts(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let posts = filter_posts(self.run.posts(), self.filter);
        writeln!(f, "## Social media ({} of {})", posts.len(), self.run.posts().len())?;
        if posts.is_empty() {
            writeln!(f, "no posts match the current filters")?;
        }
        for post in posts {
            writeln!(
                f,
                "@{} [{}/{}] {} likes\n  {}",
                post.author, post.platform, post.sentiment, post.likes, post.content
            )?;
        }

        let breakdown = SentimentBreakdown::from_posts(self.run.posts());
        if breakdown.total() > 0 {
            let shares = Sentiment::ALL
                .iter()
                .map(|s| format!("{s} {:.0}%", breakdown.percent(*s)))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "sentiment: {shares}")?;
        }
        writeln!(f)
    }

    fn write_grounding(f: &mut fmt::Formatter<'_>, context: &GroundedContext) -> fmt::Result {
        writeln!(f, "## Location context")?;
        writeln!(f, "{}", context.summary)?;
        for place in context.linked_places() {
            write!(f, "- {}", place.display_title())?;
            if let Some(uri) = &place.uri {
                write!(f, " <{uri}>")?;
            }
            writeln!(f)?;
            if let Some(snippet) = place.first_review_snippet() {
                writeln!(f, "  \"{snippet}\"")?;
            }
        }
        for source in context.web_sources() {
            writeln!(f, "- {} <{}>", source.title, source.uri)?;
        }
        writeln!(f)
    }

    fn write_campaign(f: &mut fmt::Formatter<'_>, strategy: &CampaignStrategy) -> fmt::Result {
        writeln!(f, "# {}", strategy.headline)?;
        writeln!(f, "target: {}", strategy.target_authority)?;
        writeln!(f, "{}", strategy.hashtags.join(" "))?;
        writeln!(f)?;
        writeln!(f, "{}", strategy.article_content)?;
        writeln!(f)?;
        writeln!(f, "## Pressure points")?;
        for point in &strategy.pressure_points {
            writeln!(f, "- {point}")?;
        }
        writeln!(f)?;

        let complaint = &strategy.official_complaint;
        writeln!(f, "## Official complaint")?;
        writeln!(f, "To: {}", complaint.recipient)?;
        writeln!(f, "Subject: {}", complaint.subject)?;
        writeln!(f, "{}", complaint.body)?;
        writeln!(f)?;

        writeln!(f, "## Social media drafts")?;
        writeln!(f, "Twitter: {}", strategy.social_content.twitter_post)?;
        writeln!(f, "Facebook: {}", strategy.social_content.facebook_post)
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run = self.run;
        // A failed run shows the stage it stopped in.
        let shown = match run.status() {
            StageStatus::Error => run.history().last().map_or(StageStatus::Idle, |t| t.from),
            status => status,
        };
        writeln!(f, "{}", progress(shown, run.has_image()))?;
        writeln!(f)?;
        writeln!(f, "topic: {}", run.effective_topic())?;
        writeln!(f, "location: {}", run.location())?;
        if let Some(diagnosis) = run.image_diagnosis() {
            writeln!(f, "photo: {diagnosis}")?;
        }
        writeln!(f)?;

        self.write_posts(f)?;
        if let Some(context) = run.grounding() {
            Self::write_grounding(f, context)?;
        }

        match run.strategy() {
            Some(strategy) => Self::write_campaign(f, strategy),
            None => writeln!(f, "{}", run.status().label()),
        }
    }
}
