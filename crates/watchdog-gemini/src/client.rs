//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! Wraps `reqwest` with API-key handling, model routing, and typed parsing of
//! the structured responses each pipeline stage expects. Non-2xx responses are
//! decoded from the `{"error": {...}}` envelope into [`GeminiError::Api`].

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, Url};
use watchdog_core::{
    AppConfig, CampaignStrategy, Coordinates, GroundedContext, ImageInput, ModelConfig,
    SyntheticPost,
};

use crate::error::GeminiError;
use crate::prompts::{
    campaign_prompt, grounding_prompt, posts_prompt, CampaignBrief, GROUNDING_EMPTY,
    IMAGE_DIAGNOSIS_EMPTY, IMAGE_DIAGNOSIS_INSTRUCTION,
};
use crate::schema::{campaign_schema, post_list_schema, POST_COUNT};
use crate::types::{
    ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    GoogleMaps, LatLng, Part, RetrievalConfig, ThinkingConfig, Tool, ToolConfig,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini REST API.
///
/// Use [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`]
/// to point at a mock server in tests. A client built without an API key is
/// valid; every call on it fails with [`GeminiError::MissingApiKey`] before
/// any network I/O.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
    models: ModelConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("base_url", &self.base_url.as_str())
            .field("models", &self.models)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Creates a client pointed at the production Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: Option<&str>,
        timeout_secs: u64,
        models: ModelConfig,
    ) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL, models)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`GeminiError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        api_key: Option<&str>,
        timeout_secs: u64,
        base_url: &str,
        models: ModelConfig,
    ) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("watchdog/0.1 (campaign-pipeline)")
            .build()?;

        // Exactly one trailing slash, so `join` appends below the base path
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeminiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_owned),
            base_url,
            models,
        })
    }

    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`GeminiClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, GeminiError> {
        Self::with_base_url(
            config.gemini_api_key.as_deref(),
            config.request_timeout_secs,
            &config.gemini_base_url,
            config.models.clone(),
        )
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    #[must_use]
    pub fn models(&self) -> &ModelConfig {
        &self.models
    }

    /// Diagnoses a photo of a city problem.
    ///
    /// Sends the image as base64 inline data followed by the fixed diagnostic
    /// instruction. A response without text yields a fixed "could not
    /// analyze" sentence rather than an error.
    ///
    /// # Errors
    ///
    /// - [`GeminiError::MissingApiKey`] if no key is configured.
    /// - [`GeminiError::InvalidResponse`] if the image is empty.
    /// - [`GeminiError::Http`] / [`GeminiError::Api`] on transport or API failure.
    /// - [`GeminiError::Deserialize`] if the envelope does not parse.
    pub async fn analyze_image(&self, image: &ImageInput) -> Result<String, GeminiError> {
        if image.is_empty() {
            return Err(GeminiError::InvalidResponse {
                context: "analyze_image".to_string(),
                reason: "image is empty".to_string(),
            });
        }

        let request = GenerateContentRequest::from_parts(vec![
            Part::inline(image.mime_type(), BASE64.encode(image.bytes())),
            Part::text(IMAGE_DIAGNOSIS_INSTRUCTION),
        ]);

        let response = self.generate(&self.models.vision, &request).await?;
        Ok(response
            .text()
            .unwrap_or_else(|| IMAGE_DIAGNOSIS_EMPTY.to_string()))
    }

    /// Generates synthetic citizen posts about `topic` in `location`.
    ///
    /// Requests structured JSON constrained by [`post_list_schema`]. Entries
    /// that do not match the post shape are skipped; anything past
    /// [`POST_COUNT`] is dropped. A response without text yields an empty list.
    ///
    /// # Errors
    ///
    /// - [`GeminiError::MissingApiKey`] if no key is configured.
    /// - [`GeminiError::Http`] / [`GeminiError::Api`] on transport or API failure.
    /// - [`GeminiError::Deserialize`] if the body is not JSON.
    /// - [`GeminiError::InvalidResponse`] if the JSON is not an array, or no
    ///   entry in a non-empty array is a valid post.
    pub async fn synthesize_posts(
        &self,
        topic: &str,
        location: &str,
    ) -> Result<Vec<SyntheticPost>, GeminiError> {
        let mut request = GenerateContentRequest::from_text(posts_prompt(topic, location));
        request.generation_config = Some(GenerationConfig::json(post_list_schema()));

        let response = self.generate(&self.models.posts, &request).await?;
        match response.text() {
            Some(text) => parse_posts(&text),
            None => Ok(Vec::new()),
        }
    }

    /// Looks up real places related to `query`, optionally biased toward
    /// `coordinates`, using the Google Maps grounding tool.
    ///
    /// # Errors
    ///
    /// - [`GeminiError::MissingApiKey`] if no key is configured.
    /// - [`GeminiError::Http`] / [`GeminiError::Api`] on transport or API failure.
    /// - [`GeminiError::Deserialize`] if the envelope does not parse.
    pub async fn fetch_grounded_context(
        &self,
        query: &str,
        coordinates: Option<Coordinates>,
    ) -> Result<GroundedContext, GeminiError> {
        let mut request = GenerateContentRequest::from_text(grounding_prompt(query));
        request.tools.push(Tool {
            google_maps: Some(GoogleMaps {}),
        });
        request.tool_config = coordinates.map(|c| ToolConfig {
            retrieval_config: RetrievalConfig {
                lat_lng: LatLng {
                    latitude: c.latitude(),
                    longitude: c.longitude(),
                },
            },
        });

        let response = self.generate(&self.models.grounding, &request).await?;
        Ok(GroundedContext {
            summary: response
                .text()
                .unwrap_or_else(|| GROUNDING_EMPTY.to_string()),
            references: response.grounding_references(),
        })
    }

    /// Synthesizes the final campaign from the outputs of the earlier stages.
    ///
    /// Uses the campaign model with the configured thinking budget and
    /// [`campaign_schema`]. The result is only returned if it deserializes
    /// and passes [`CampaignStrategy::validate`].
    ///
    /// # Errors
    ///
    /// - [`GeminiError::MissingApiKey`] if no key is configured.
    /// - [`GeminiError::Http`] / [`GeminiError::Api`] on transport or API failure.
    /// - [`GeminiError::InvalidResponse`] if no text was generated or a
    ///   required field is empty.
    /// - [`GeminiError::Deserialize`] if the JSON does not match the schema.
    pub async fn synthesize_campaign(
        &self,
        brief: &CampaignBrief<'_>,
    ) -> Result<CampaignStrategy, GeminiError> {
        let mut request = GenerateContentRequest::from_text(campaign_prompt(brief));
        let mut generation = GenerationConfig::json(campaign_schema());
        generation.thinking_config = Some(ThinkingConfig {
            thinking_budget: self.models.thinking_budget,
        });
        request.generation_config = Some(generation);

        let response = self.generate(&self.models.campaign, &request).await?;
        let text = response.text().ok_or_else(|| GeminiError::InvalidResponse {
            context: "synthesize_campaign".to_string(),
            reason: no_text_reason(&response),
        })?;
        parse_campaign(&text)
    }

    /// Builds the `models/{model}:generateContent` URL under the base URL.
    fn endpoint(&self, model: &str) -> Result<Url, GeminiError> {
        self.base_url
            .join(&format!("v1beta/models/{model}:generateContent"))
            .map_err(|e| GeminiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: format!("cannot build endpoint for model '{model}': {e}"),
            })
    }

    /// Sends one `generateContent` request and parses the response envelope.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::MissingApiKey`] without sending anything when no
    /// key is configured, [`GeminiError::Http`] on network failure,
    /// [`GeminiError::Api`] on a non-2xx status, and
    /// [`GeminiError::Deserialize`] if the body is not a response envelope.
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;
        let url = self.endpoint(model)?;

        tracing::debug!(model, "sending generateContent request");
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body).map_or_else(
                |_| truncate(&body, 200),
                |envelope| envelope.error.message,
            );
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| GeminiError::Deserialize {
                context: format!("generateContent(model={model})"),
                source: e,
            })?;
        tracing::debug!(
            model,
            candidates = parsed.candidates.len(),
            "generateContent response received"
        );
        Ok(parsed)
    }
}

/// Parses a post array, keeping entries that match the post shape.
fn parse_posts(text: &str) -> Result<Vec<SyntheticPost>, GeminiError> {
    let value: serde_json::Value =
        serde_json::from_str(strip_code_fence(text)).map_err(|e| GeminiError::Deserialize {
            context: "synthesize_posts".to_string(),
            source: e,
        })?;

    let serde_json::Value::Array(items) = value else {
        return Err(GeminiError::InvalidResponse {
            context: "synthesize_posts".to_string(),
            reason: "expected a JSON array of posts".to_string(),
        });
    };

    let received = items.len();
    let mut posts: Vec<SyntheticPost> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<SyntheticPost>(item) {
            Ok(post) => Some(post),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed synthetic post");
                None
            }
        })
        .collect();

    if received > 0 && posts.is_empty() {
        return Err(GeminiError::InvalidResponse {
            context: "synthesize_posts".to_string(),
            reason: format!("none of the {received} returned posts matched the schema"),
        });
    }

    if posts.len() > POST_COUNT {
        tracing::warn!(
            received = posts.len(),
            kept = POST_COUNT,
            "service returned more posts than requested; truncating"
        );
        posts.truncate(POST_COUNT);
    }

    Ok(posts)
}

fn parse_campaign(text: &str) -> Result<CampaignStrategy, GeminiError> {
    let strategy: CampaignStrategy =
        serde_json::from_str(strip_code_fence(text)).map_err(|e| GeminiError::Deserialize {
            context: "synthesize_campaign".to_string(),
            source: e,
        })?;

    strategy
        .validate()
        .map_err(|reason| GeminiError::InvalidResponse {
            context: "synthesize_campaign".to_string(),
            reason,
        })?;

    if strategy.pressure_points.len() != CampaignStrategy::EXPECTED_PRESSURE_POINTS {
        tracing::warn!(
            pressure_points = strategy.pressure_points.len(),
            "campaign has an unexpected number of pressure points"
        );
    }

    Ok(strategy)
}

/// Strips a surrounding Markdown code fence (```` ```json ... ``` ````), if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}

fn no_text_reason(response: &GenerateContentResponse) -> String {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return format!("prompt blocked: {reason}");
    }
    match response
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
    {
        Some(reason) => format!("no text generated (finish reason {reason})"),
        None => "no text generated".to_string(),
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    format!("{cut}…")
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
