use crate::app_config::{AppConfig, Environment, ModelConfig};
use crate::media::Coordinates;
use crate::ConfigError;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_f64 = |var: &str| -> Result<Option<f64>, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(None),
        }
    };

    let env = parse_environment(&or_default("WATCHDOG_ENV", "development"))?;
    let log_level = or_default("WATCHDOG_LOG_LEVEL", "info");

    let gemini_api_key = lookup("GEMINI_API_KEY")
        .or_else(|_| lookup("API_KEY"))
        .ok()
        .filter(|key| !key.trim().is_empty());
    let gemini_base_url = or_default("WATCHDOG_GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL);

    let request_timeout_secs = parse_u64("WATCHDOG_REQUEST_TIMEOUT_SECS", "120")?;
    let stage_timeout_secs = parse_u64("WATCHDOG_STAGE_TIMEOUT_SECS", "180")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "WATCHDOG_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    if stage_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "WATCHDOG_STAGE_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let default_location = or_default("WATCHDOG_DEFAULT_LOCATION", "Warszawa");

    let defaults = ModelConfig::default();
    let models = ModelConfig {
        posts: or_default("WATCHDOG_MODEL_POSTS", &defaults.posts),
        grounding: or_default("WATCHDOG_MODEL_GROUNDING", &defaults.grounding),
        vision: or_default("WATCHDOG_MODEL_VISION", &defaults.vision),
        campaign: or_default("WATCHDOG_MODEL_CAMPAIGN", &defaults.campaign),
        thinking_budget: parse_u32("WATCHDOG_THINKING_BUDGET", "32768")?,
    };

    let latitude = parse_f64("WATCHDOG_LATITUDE")?;
    let longitude = parse_f64("WATCHDOG_LONGITUDE")?;
    let coordinates = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(
            Coordinates::new(latitude, longitude).map_err(|reason| {
                let var = if Coordinates::latitude_in_range(latitude) {
                    "WATCHDOG_LONGITUDE"
                } else {
                    "WATCHDOG_LATITUDE"
                };
                ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason,
                }
            })?,
        ),
        (None, None) => None,
        (Some(_), None) => {
            return Err(ConfigError::MissingEnvVar("WATCHDOG_LONGITUDE".to_string()));
        }
        (None, Some(_)) => {
            return Err(ConfigError::MissingEnvVar("WATCHDOG_LATITUDE".to_string()));
        }
    };

    Ok(AppConfig {
        env,
        log_level,
        gemini_api_key,
        gemini_base_url,
        request_timeout_secs,
        stage_timeout_secs,
        default_location,
        models,
        coordinates,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "WATCHDOG_ENV".to_string(),
            reason: format!("expected development, test or production, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
