//! Shared domain types for the watchdog campaign pipeline.
//!
//! Everything here is a plain value record: posts, grounding references,
//! the final campaign, the stage enumeration, and application configuration.
//! Nothing in this crate performs I/O except [`ImageInput::from_path`] and
//! the `.env` loading in [`load_app_config`].

mod app_config;
mod campaign;
mod config;
mod grounding;
mod media;
mod posts;
mod stage;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, ModelConfig};
pub use campaign::{CampaignStrategy, OfficialComplaint, SocialContent};
pub use config::{load_app_config, load_app_config_from_env};
pub use grounding::{GroundedContext, GroundingReference, PlaceReference, WebReference};
pub use media::{Coordinates, ImageInput};
pub use posts::{
    filter_posts, Platform, PlatformFilter, PostFilter, Sentiment, SentimentBreakdown,
    SentimentFilter, SyntheticPost,
};
pub use stage::{StageStatus, StepState};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("unknown sentiment: {0}")]
    UnknownSentiment(String),

    #[error("failed to read image {path}: {source}")]
    ImageRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
