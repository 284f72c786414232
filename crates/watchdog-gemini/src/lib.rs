//! Typed client for the Gemini `generateContent` REST API.
//!
//! [`GeminiClient`] exposes the four request types the campaign pipeline
//! needs: multimodal image diagnosis, structured post synthesis, maps-grounded
//! context lookup, and structured campaign synthesis with a thinking budget.
//! Each call is a single round trip with no retries; callers decide how to
//! degrade on failure.

pub mod client;
pub mod error;
pub mod prompts;
pub mod schema;
pub mod types;

pub use client::GeminiClient;
pub use error::GeminiError;
pub use prompts::CampaignBrief;
