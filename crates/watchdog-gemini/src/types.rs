//! Wire types for `models/{model}:generateContent`.
//!
//! Only the fields the pipeline reads or writes are modelled. Unknown
//! response fields are ignored so that additions to the API do not break
//! deserialization.

use serde::{Deserialize, Serialize};
use watchdog_core::{GroundingReference, PlaceReference, WebReference};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
}

impl GenerateContentRequest {
    /// A single user turn built from `parts`, with no extra configuration.
    #[must_use]
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: None,
            tools: Vec::new(),
            tool_config: None,
        }
    }

    #[must_use]
    pub fn from_text(prompt: impl Into<String>) -> Self {
        Self::from_parts(vec![Part::text(prompt)])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One content part: text, inline binary data, or a model thought.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    /// Set by the service on thought-summary parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Inline binary part. `data` must already be base64-encoded.
    #[must_use]
    pub fn inline(mime_type: impl Into<String>, data: String) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data,
            }),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

impl GenerationConfig {
    /// Ask for `application/json` output constrained by `schema`.
    #[must_use]
    pub fn json(schema: serde_json::Value) -> Self {
        Self {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
            thinking_config: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub thinking_budget: u32,
}

/// Tool declaration. Serializes as `{"googleMaps": {}}` when maps grounding is on.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps: Option<GoogleMaps>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GoogleMaps {}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub retrieval_config: RetrievalConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    pub lat_lng: LatLng,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebChunk>,
    #[serde(default)]
    pub maps: Option<MapsChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub place_answer_sources: Option<PlaceAnswerSources>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceAnswerSources {
    #[serde(default)]
    pub review_snippets: Vec<ReviewSnippet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewSnippet {
    #[serde(default)]
    pub snippet: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, skipping thought parts.
    ///
    /// Returns `None` when there is no candidate or the text is blank.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Grounding references of the first candidate, in service order.
    ///
    /// Chunks carrying neither a usable web link nor a place are dropped.
    #[must_use]
    pub fn grounding_references(&self) -> Vec<GroundingReference> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| {
                m.grounding_chunks
                    .iter()
                    .map(GroundingChunk::to_reference)
                    .filter(|r| r.web.is_some() || r.place.is_some())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl GroundingChunk {
    fn to_reference(&self) -> GroundingReference {
        let web = self.web.as_ref().and_then(|w| {
            let uri = w.uri.clone().filter(|u| !u.is_empty())?;
            let title = w.title.clone().unwrap_or_else(|| uri.clone());
            Some(WebReference { uri, title })
        });
        let place = self.maps.as_ref().map(|m| PlaceReference {
            uri: m.uri.clone(),
            title: m.title.clone(),
            review_snippets: m
                .place_answer_sources
                .as_ref()
                .map(|s| {
                    s.review_snippets
                        .iter()
                        .filter_map(|r| r.snippet.clone())
                        .collect()
                })
                .unwrap_or_default(),
        });
        GroundingReference { web, place }
    }
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_camel_case_and_skips_empty_fields() {
        let request = GenerateContentRequest::from_text("hello");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "contents": [{ "role": "user", "parts": [{ "text": "hello" }] }]
            })
        );
    }

    #[test]
    fn maps_tool_serializes_as_empty_object() {
        let mut request = GenerateContentRequest::from_text("q");
        request.tools.push(Tool {
            google_maps: Some(GoogleMaps {}),
        });
        request.tool_config = Some(ToolConfig {
            retrieval_config: RetrievalConfig {
                lat_lng: LatLng {
                    latitude: 50.0,
                    longitude: 19.5,
                },
            },
        });
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["tools"], serde_json::json!([{ "googleMaps": {} }]));
        assert_eq!(
            value["toolConfig"]["retrievalConfig"]["latLng"]["latitude"],
            50.0
        );
    }

    #[test]
    fn text_skips_thought_parts_and_joins_the_rest() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "{\"a\":" },
                    { "text": "1}" }
                ]}
            }]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn text_is_none_without_candidates() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
        assert!(response.grounding_references().is_empty());
    }

    #[test]
    fn grounding_chunks_map_to_references_in_order() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "summary" }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "maps": {
                            "uri": "https://maps.google.com/?cid=1",
                            "title": "Szpital Uniwersytecki",
                            "placeAnswerSources": { "reviewSnippets": [
                                { "snippet": "Korki pod izbą przyjęć" },
                                { "reviewId": "no-snippet" }
                            ]}
                        }},
                        { "web": { "uri": "https://example.pl/news" } },
                        { "web": { "title": "no uri" } }
                    ]
                }
            }]
        }))
        .unwrap();

        let refs = response.grounding_references();
        assert_eq!(refs.len(), 2);
        let place = refs[0].place.as_ref().unwrap();
        assert_eq!(place.title.as_deref(), Some("Szpital Uniwersytecki"));
        assert_eq!(place.review_snippets, ["Korki pod izbą przyjęć"]);
        let web = refs[1].web.as_ref().unwrap();
        assert_eq!(web.uri, "https://example.pl/news");
        assert_eq!(web.title, "https://example.pl/news");
    }
}
