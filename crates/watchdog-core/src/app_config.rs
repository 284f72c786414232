use crate::media::Coordinates;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Model identifiers used for each gateway operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Structured post synthesis (fast, cheap model).
    pub posts: String,
    /// Maps-grounded location context.
    pub grounding: String,
    /// Multimodal image diagnosis.
    pub vision: String,
    /// Final campaign synthesis with a thinking budget.
    pub campaign: String,
    pub thinking_budget: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            posts: "gemini-flash-lite-latest".to_string(),
            grounding: "gemini-2.5-flash".to_string(),
            vision: "gemini-3-pro-preview".to_string(),
            campaign: "gemini-3-pro-preview".to_string(),
            thinking_budget: 32_768,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// `None` makes every gateway call fail with a missing-credential error.
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub request_timeout_secs: u64,
    pub stage_timeout_secs: u64,
    pub default_location: String,
    pub models: ModelConfig,
    /// Caller position used to bias place lookups. Best-effort.
    pub coordinates: Option<Coordinates>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_base_url", &self.gemini_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("stage_timeout_secs", &self.stage_timeout_secs)
            .field("default_location", &self.default_location)
            .field("models", &self.models)
            .field("coordinates", &self.coordinates)
            .finish()
    }
}
