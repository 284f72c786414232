use watchdog_core::{CampaignStrategy, GroundedContext, StageStatus, SyntheticPost};

/// Progress notifications emitted while a run advances.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StatusChanged { from: StageStatus, to: StageStatus },
    ImageDiagnosed(String),
    PostsReady(Vec<SyntheticPost>),
    ContextReady(GroundedContext),
    /// A stage substituted its fallback value.
    StageDegraded { stage: StageStatus, reason: String },
    CampaignReady(CampaignStrategy),
    RunFailed(String),
}
