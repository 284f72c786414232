//! Synthetic social-media posts and the local filters applied to them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Social network a synthetic post pretends to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Facebook,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Twitter, Platform::Facebook, Platform::Instagram];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownPlatform(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Positive => "positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownSentiment(s.to_string()))
    }
}

/// One simulated citizen post produced by the post-synthesis stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticPost {
    pub id: String,
    pub author: String,
    pub content: String,
    pub platform: Platform,
    pub sentiment: Sentiment,
    pub likes: u32,
}

/// Platform axis of the post filter. `All` matches every post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    Only(Platform),
}

impl FromStr for PlatformFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// Sentiment axis of the post filter. `All` matches every post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentimentFilter {
    #[default]
    All,
    Only(Sentiment),
}

impl FromStr for SentimentFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// Client-local projection over already-fetched posts.
///
/// Both axes are AND-combined. Applying a filter never mutates the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PostFilter {
    pub platform: PlatformFilter,
    pub sentiment: SentimentFilter,
}

impl PostFilter {
    #[must_use]
    pub fn matches(&self, post: &SyntheticPost) -> bool {
        let platform_ok = match self.platform {
            PlatformFilter::All => true,
            PlatformFilter::Only(p) => post.platform == p,
        };
        let sentiment_ok = match self.sentiment {
            SentimentFilter::All => true,
            SentimentFilter::Only(s) => post.sentiment == s,
        };
        platform_ok && sentiment_ok
    }
}

/// Return the posts matching `filter`, preserving their original order.
#[must_use]
pub fn filter_posts<'a>(posts: &'a [SyntheticPost], filter: &PostFilter) -> Vec<&'a SyntheticPost> {
    posts.iter().filter(|post| filter.matches(post)).collect()
}

/// Sentiment counts across a post sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SentimentBreakdown {
    pub negative: usize,
    pub neutral: usize,
    pub positive: usize,
}

impl SentimentBreakdown {
    #[must_use]
    pub fn from_posts(posts: &[SyntheticPost]) -> Self {
        posts.iter().fold(Self::default(), |mut acc, post| {
            match post.sentiment {
                Sentiment::Negative => acc.negative += 1,
                Sentiment::Neutral => acc.neutral += 1,
                Sentiment::Positive => acc.positive += 1,
            }
            acc
        })
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.negative + self.neutral + self.positive
    }

    #[must_use]
    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
            Sentiment::Positive => self.positive,
        }
    }

    /// Share of posts with `sentiment`, in percent. `0.0` when there are no posts.
    #[must_use]
    pub fn percent(&self, sentiment: Sentiment) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let share = self.count(sentiment) as f64 / total as f64;
        share * 100.0
    }
}

#[cfg(test)]
#[path = "posts_test.rs"]
mod tests;
