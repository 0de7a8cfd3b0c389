//! Responder credentials.
//!
//! The API key is looked up in the `API_KEY` and `GEMINI_API_KEY` environment
//! variables first, then in `secret.json`:
//!
//! ```json
//! { "gemini": { "api_key": "...", "model_name": "gemini-2.5-flash" } }
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Environment variables checked for an API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Loads `secret.json` from `path`.
pub fn load_secret_config(path: &Path) -> Result<SecretConfig, String> {
    if !path.exists() {
        return Err(format!("Secret file not found at: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read secret file at {}: {}", path.display(), e))?;

    // Never echo the content: it holds the key
    serde_json::from_str(&content).map_err(|e| {
        format!(
            "Failed to parse secret file at {}: line {}",
            path.display(),
            e.line()
        )
    })
}

/// Resolves the Gemini credentials from the environment or `secret_path`.
///
/// Returns `None` when no non-empty key is configured anywhere.
pub fn resolve_gemini_config<F>(secret_path: Option<&Path>, lookup: F) -> Option<GeminiConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let from_env = API_KEY_ENV_VARS
        .into_iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty());

    if let Some(api_key) = from_env {
        return Some(GeminiConfig {
            api_key,
            model_name: None,
        });
    }

    let path = secret_path?;
    match load_secret_config(path) {
        Ok(config) => config.gemini.filter(|g| !g.api_key.trim().is_empty()),
        Err(e) => {
            tracing::debug!("[Responder] {}", e);
            None
        }
    }
}
