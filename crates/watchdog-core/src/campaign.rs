//! The terminal campaign artifact produced by the synthesis stage.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficialComplaint {
    pub subject: String,
    pub recipient: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialContent {
    /// Short-form post.
    pub twitter_post: String,
    /// Long-form post asking for shares.
    pub facebook_post: String,
}

/// Structured campaign returned by the final stage.
///
/// Field names follow the camelCase wire schema requested from the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStrategy {
    pub headline: String,
    /// Markdown body of the press release.
    pub article_content: String,
    pub hashtags: Vec<String>,
    pub target_authority: String,
    pub pressure_points: Vec<String>,
    pub official_complaint: OfficialComplaint,
    pub social_content: SocialContent,
}

impl CampaignStrategy {
    pub const EXPECTED_PRESSURE_POINTS: usize = 3;

    /// Check the fields a campaign cannot be displayed without.
    ///
    /// # Errors
    ///
    /// Returns a description of the first missing field.
    pub fn validate(&self) -> Result<(), String> {
        if self.headline.trim().is_empty() {
            return Err("headline is empty".to_string());
        }
        if self.official_complaint.recipient.trim().is_empty() {
            return Err("officialComplaint.recipient is empty".to_string());
        }
        if !self.hashtags.iter().any(|h| !h.trim().is_empty()) {
            return Err("hashtags list is empty".to_string());
        }
        Ok(())
    }
}
