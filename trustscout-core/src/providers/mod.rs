//! Text-generation provider implementations.
//!
//! Use `create_generator()` to instantiate the configured backend, if any.

pub mod gemini;

use crate::config::{LlmConfig, LlmProviderKind};
use crate::error::ConfigError;
use crate::generation::TextGenerator;
use std::sync::Arc;
use tracing::{info, warn};

pub use gemini::GeminiProvider;

/// Build the text generator described by `config`.
///
/// Returns `Ok(None)` when generation is disabled or no API key can be
/// resolved; the literature stage then runs in fallback mode.
pub fn create_generator(config: &LlmConfig) -> Result<Option<Arc<dyn TextGenerator>>, ConfigError> {
    match config.provider {
        LlmProviderKind::Disabled => {
            info!("Text generation disabled; literature stage will use its fallback finding");
            Ok(None)
        }
        LlmProviderKind::Gemini => {
            let Some(api_key) = config.resolve_api_key() else {
                warn!(
                    env_var = config.api_key_env.as_str(),
                    "No Gemini API key found; literature stage will use its fallback finding"
                );
                return Ok(None);
            };
            let provider = GeminiProvider::new_with_key(config, api_key).map_err(|e| {
                ConfigError::Invalid {
                    message: format!("cannot build Gemini client: {e}"),
                }
            })?;
            info!(model = config.model.as_str(), "Using Gemini text generator");
            Ok(Some(Arc::new(provider)))
        }
    }
}
