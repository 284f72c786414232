//! Integration tests for `GeminiClient` using wiremock HTTP mocks.

use serde_json::json;
use watchdog_core::{Coordinates, ImageInput, ModelConfig, Platform, Sentiment};
use watchdog_gemini::{CampaignBrief, GeminiClient, GeminiError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn test_client(base_url: &str) -> GeminiClient {
    GeminiClient::with_base_url(Some("test-key"), 5, base_url, ModelConfig::default())
        .expect("client construction should not fail")
}

/// Wraps `text` in a single-candidate `generateContent` response.
fn text_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn campaign_json() -> serde_json::Value {
    json!({
        "headline": "SKANDAL w Krakowie!",
        "articleContent": "## Dość!\nUrząd śpi.",
        "hashtags": ["#Kraków", "#Dziura"],
        "targetAuthority": "Zarząd Dróg Miasta Krakowa",
        "pressurePoints": ["Bezpieczeństwo", "Podatki", "Wizerunek"],
        "officialComplaint": {
            "subject": "Skarga",
            "recipient": "ZDMK",
            "body": "Szanowni Państwo..."
        },
        "socialContent": {
            "twitterPost": "#Dziura",
            "facebookPost": "Udostępnij!"
        }
    })
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn synthesize_posts_returns_parsed_posts() {
    let server = MockServer::start().await;

    let posts = json!([
        { "id": "1", "author": "Ania", "content": "Znowu!", "platform": "twitter", "likes": 12, "sentiment": "negative" },
        { "id": "2", "author": "Tomek", "content": "Ok", "platform": "instagram", "likes": 0, "sentiment": "neutral" }
    ]);

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-flash-lite-latest:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&posts.to_string())))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .synthesize_posts("dziura w drodze", "Kraków")
        .await
        .expect("should parse posts");

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].author, "Ania");
    assert_eq!(result[0].platform, Platform::Twitter);
    assert_eq!(result[1].sentiment, Sentiment::Neutral);
}

#[tokio::test]
async fn synthesize_posts_without_text_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.synthesize_posts("t", "l").await.expect("empty is ok");
    assert!(result.is_empty());
}

#[tokio::test]
async fn api_error_envelope_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.synthesize_posts("t", "l").await.unwrap_err();
    match err {
        GeminiError::Api { status, message } => {
            assert_eq!(status, 403);
            assert!(message.contains("API key not valid"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_is_reported_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.synthesize_posts("t", "l").await.unwrap_err();
    assert!(
        matches!(err, GeminiError::Api { status: 502, ref message } if message == "Bad Gateway"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn missing_api_key_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("[]")))
        .expect(0)
        .mount(&server)
        .await;

    let client =
        GeminiClient::with_base_url(None, 5, &server.uri(), ModelConfig::default()).unwrap();
    let err = client.synthesize_posts("t", "l").await.unwrap_err();
    assert!(matches!(err, GeminiError::MissingApiKey));
}

// ---------------------------------------------------------------------------
// Image analysis
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analyze_image_sends_inline_base64_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-3-pro-preview:generateContent"))
        .and(body_partial_json(json!({
            "contents": [{
                "role": "user",
                "parts": [{ "inlineData": { "mimeType": "image/png", "data": "AQID" } }]
            }]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_response("Wyrwa w jezdni, powaga: Wysoka.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let image = ImageInput::new(vec![1, 2, 3], "image/png");
    let diagnosis = client.analyze_image(&image).await.expect("should analyze");
    assert_eq!(diagnosis, "Wyrwa w jezdni, powaga: Wysoka.");
}

#[tokio::test]
async fn analyze_image_without_text_returns_fixed_sentence() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let image = ImageInput::new(vec![0xFF, 0xD8], "image/jpeg");
    let diagnosis = client.analyze_image(&image).await.unwrap();
    assert_eq!(diagnosis, "Nie udało się przeanalizować zdjęcia.");
}

// ---------------------------------------------------------------------------
// Grounding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_grounded_context_enables_maps_and_location_bias() {
    let server = MockServer::start().await;

    let body = json!({
        "candidates": [{
            "content": { "parts": [{ "text": "W pobliżu szkoła nr 12." }] },
            "groundingMetadata": {
                "groundingChunks": [
                    { "maps": { "uri": "https://maps.google.com/?cid=7", "title": "Szkoła Podstawowa nr 12" } },
                    { "web": { "uri": "https://krakow.pl", "title": "Kraków" } }
                ]
            }
        }]
    });

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(body_partial_json(json!({
            "tools": [{ "googleMaps": {} }],
            "toolConfig": { "retrievalConfig": { "latLng": { "latitude": 50.06, "longitude": 19.94 } } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let coords = Coordinates::new(50.06, 19.94).unwrap();
    let context = client
        .fetch_grounded_context("dziura w drodze w Kraków", Some(coords))
        .await
        .expect("should parse grounding");

    assert_eq!(context.summary, "W pobliżu szkoła nr 12.");
    assert_eq!(context.references.len(), 2);
    assert_eq!(
        context.references[0].place.as_ref().unwrap().title.as_deref(),
        Some("Szkoła Podstawowa nr 12")
    );
    assert_eq!(context.references[1].web.as_ref().unwrap().uri, "https://krakow.pl");
}

#[tokio::test]
async fn fetch_grounded_context_without_coordinates_omits_tool_config() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [{}] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let context = client.fetch_grounded_context("q", None).await.unwrap();
    assert_eq!(context.summary, "No location data found.");
    assert!(context.references.is_empty());

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(sent.get("toolConfig").is_none(), "unexpected toolConfig: {sent}");
}

// ---------------------------------------------------------------------------
// Campaign
// ---------------------------------------------------------------------------

#[tokio::test]
async fn synthesize_campaign_parses_strategy_with_thinking_budget() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-3-pro-preview:generateContent"))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "thinkingConfig": { "thinkingBudget": 32768 }
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(text_response(&campaign_json().to_string())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let brief = CampaignBrief {
        topic: "dziura w drodze",
        posts: &[],
        location_context: "Obok szkoły.",
        image_diagnosis: None,
    };
    let strategy = client
        .synthesize_campaign(&brief)
        .await
        .expect("should parse campaign");

    assert_eq!(strategy.headline, "SKANDAL w Krakowie!");
    assert_eq!(strategy.hashtags.len(), 2);
    assert_eq!(strategy.official_complaint.recipient, "ZDMK");
}

#[tokio::test]
async fn synthesize_campaign_accepts_fenced_json() {
    let server = MockServer::start().await;

    let fenced = format!("```json\n{}\n```", campaign_json());
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&fenced)))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let brief = CampaignBrief {
        topic: "t",
        posts: &[],
        location_context: "c",
        image_diagnosis: None,
    };
    assert!(client.synthesize_campaign(&brief).await.is_ok());
}

#[tokio::test]
async fn synthesize_campaign_blocked_prompt_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let brief = CampaignBrief {
        topic: "t",
        posts: &[],
        location_context: "c",
        image_diagnosis: None,
    };
    let err = client.synthesize_campaign(&brief).await.unwrap_err();
    assert!(
        matches!(err, GeminiError::InvalidResponse { ref reason, .. } if reason.contains("SAFETY")),
        "got {err:?}"
    );
}

#[tokio::test]
async fn synthesize_campaign_malformed_json_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("{\"headline\": 5}")))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let brief = CampaignBrief {
        topic: "t",
        posts: &[],
        location_context: "c",
        image_diagnosis: None,
    };
    let err = client.synthesize_campaign(&brief).await.unwrap_err();
    assert!(matches!(err, GeminiError::Deserialize { .. }), "got {err:?}");
}
