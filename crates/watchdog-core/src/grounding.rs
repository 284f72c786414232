//! Citation-backed location context returned by the grounding stage.

use serde::{Deserialize, Serialize};

const UNKNOWN_PLACE_TITLE: &str = "Unknown Location";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebReference {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaceReference {
    pub uri: Option<String>,
    pub title: Option<String>,
    /// Review excerpts attached to the place, in service order.
    #[serde(default)]
    pub review_snippets: Vec<String>,
}

impl PlaceReference {
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(UNKNOWN_PLACE_TITLE)
    }

    #[must_use]
    pub fn first_review_snippet(&self) -> Option<&str> {
        self.review_snippets.first().map(String::as_str)
    }
}

/// One citation: a web page, a map place, or (rarely) both.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroundingReference {
    pub web: Option<WebReference>,
    pub place: Option<PlaceReference>,
}

/// Summary text plus references, in the order the service returned them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroundedContext {
    pub summary: String,
    pub references: Vec<GroundingReference>,
}

impl GroundedContext {
    /// Context carrying only a summary, used when grounding is unavailable.
    #[must_use]
    pub fn summary_only(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            references: Vec::new(),
        }
    }

    /// Place references that link somewhere. Places without a URI are not listed.
    pub fn linked_places(&self) -> impl Iterator<Item = &PlaceReference> {
        self.references
            .iter()
            .filter_map(|r| r.place.as_ref())
            .filter(|p| p.uri.as_deref().is_some_and(|u| !u.is_empty()))
    }

    pub fn web_sources(&self) -> impl Iterator<Item = &WebReference> {
        self.references.iter().filter_map(|r| r.web.as_ref())
    }
}
