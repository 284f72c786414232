//! Response schemas sent with structured-output requests.
//!
//! Gemini accepts an OpenAPI-style subset with upper-case type names.

use serde_json::{json, Value};

/// Number of posts requested from the post-synthesis call.
pub const POST_COUNT: usize = 5;

/// Array of exactly [`POST_COUNT`] synthetic posts.
#[must_use]
pub fn post_list_schema() -> Value {
    json!({
        "type": "ARRAY",
        "minItems": POST_COUNT,
        "maxItems": POST_COUNT,
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING" },
                "author": { "type": "STRING" },
                "content": { "type": "STRING" },
                "platform": { "type": "STRING", "enum": ["twitter", "facebook", "instagram"] },
                "likes": { "type": "INTEGER" },
                "sentiment": { "type": "STRING", "enum": ["negative", "neutral", "positive"] }
            },
            "required": ["id", "author", "content", "platform", "likes", "sentiment"]
        }
    })
}

#[must_use]
pub fn campaign_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "headline": { "type": "STRING" },
            "articleContent": { "type": "STRING" },
            "hashtags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "targetAuthority": { "type": "STRING" },
            "pressurePoints": { "type": "ARRAY", "items": { "type": "STRING" } },
            "officialComplaint": {
                "type": "OBJECT",
                "properties": {
                    "subject": { "type": "STRING" },
                    "recipient": { "type": "STRING" },
                    "body": { "type": "STRING" }
                },
                "required": ["subject", "recipient", "body"]
            },
            "socialContent": {
                "type": "OBJECT",
                "properties": {
                    "twitterPost": { "type": "STRING" },
                    "facebookPost": { "type": "STRING" }
                },
                "required": ["twitterPost", "facebookPost"]
            }
        },
        "required": [
            "headline",
            "articleContent",
            "hashtags",
            "targetAuthority",
            "pressurePoints",
            "officialComplaint",
            "socialContent"
        ]
    })
}
