//! Configuration system for TrustScout.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> overrides.
//! Configuration is loaded from `~/.config/trustscout/config.toml` and/or
//! `.trustscout/config.toml` in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use crate::gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for a TrustScout deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustScoutConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl TrustScoutConfig {
    /// Collect warnings from every section.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.llm.validate();
        warnings.extend(self.fusion.validate());
        warnings.extend(self.gateway.validate());
        warnings
    }
}

/// Which text-generation backend the literature stage talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    /// Google Gemini `generateContent` API.
    #[default]
    Gemini,
    /// No external capability; the literature stage always uses its fallback.
    #[serde(rename = "none")]
    Disabled,
}

impl std::fmt::Display for LlmProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProviderKind::Gemini => write!(f, "gemini"),
            LlmProviderKind::Disabled => write!(f, "none"),
        }
    }
}

/// Configuration for the text-generation capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider backend: "gemini" or "none".
    pub provider: LlmProviderKind,
    /// Model identifier (e.g., "gemini-1.5-flash").
    pub model: String,
    /// Environment variable name containing the API key.
    pub api_key_env: String,
    /// API key given directly in configuration. Takes precedence over `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Optional base URL override for the API endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Maximum tokens the model may generate for one finding.
    pub max_tokens: usize,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on a single generation call, in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::Gemini,
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: None,
            max_tokens: 128,
            temperature: 0.4,
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    /// Validate this LLM config and return any warnings.
    ///
    /// Returns an empty Vec if the config is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.max_tokens == 0 {
            warnings.push("max_tokens is 0; every generated finding will be empty".to_string());
        }
        if self.temperature < 0.0 || self.temperature > 2.0 {
            warnings.push(format!(
                "temperature ({}) is outside the typical range 0.0-2.0",
                self.temperature
            ));
        }
        if self.timeout_secs == 0 {
            warnings.push("timeout_secs is 0; every generation call will time out".to_string());
        }
        warnings
    }

    /// Resolve the API key from config, then from the configured env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Configuration for the trust analyst's rank fusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// RRF damping constant.
    pub k: u32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            k: crate::research::fusion::DEFAULT_RRF_K,
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.k == 0 {
            warnings.push("fusion.k is 0; rank-1 evidence will dominate the score".to_string());
        }
        warnings
    }
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "trustscout", "trustscout")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Path of the workspace-local config file.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".trustscout").join("config.toml")
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `TRUSTSCOUT_`)
/// 3. Workspace-local config (`.trustscout/config.toml`)
/// 4. User config (`~/.config/trustscout/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&TrustScoutConfig>,
) -> Result<TrustScoutConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(TrustScoutConfig::default()));

    if let Some(user_config) = user_config_path()
        && user_config.exists()
    {
        figment = figment.merge(Toml::file(&user_config));
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // TRUSTSCOUT_LLM__MODEL, TRUSTSCOUT_FUSION__K, TRUSTSCOUT_GATEWAY__PORT, ...
    figment = figment.merge(Env::prefixed("TRUSTSCOUT_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}

/// Check whether any TrustScout configuration file exists (user-level or workspace-level).
pub fn config_exists(workspace: Option<&Path>) -> bool {
    if user_config_path().is_some_and(|p| p.exists()) {
        return true;
    }
    workspace.is_some_and(|ws| workspace_config_path(ws).exists())
}

/// Write the default configuration to `<workspace>/.trustscout/config.toml`.
///
/// Refuses to overwrite an existing file. Returns the path written.
pub fn write_default_config(workspace: &Path) -> anyhow::Result<PathBuf> {
    let config_path = workspace_config_path(workspace);
    if config_path.exists() {
        anyhow::bail!("config file already exists: {}", config_path.display());
    }
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(&TrustScoutConfig::default())?;
    std::fs::write(&config_path, toml_str)?;
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrustScoutConfig::default();
        assert_eq!(config.llm.provider, LlmProviderKind::Gemini);
        assert_eq!(config.llm.model, "gemini-1.5-flash");
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.fusion.k, 60);
        assert_eq!(config.gateway.port, 8000);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_provider_kind_display() {
        assert_eq!(LlmProviderKind::Gemini.to_string(), "gemini");
        assert_eq!(LlmProviderKind::Disabled.to_string(), "none");
    }

    #[test]
    fn test_provider_kind_serde() {
        let kind: LlmProviderKind = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(kind, LlmProviderKind::Disabled);
        let kind: LlmProviderKind = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(kind, LlmProviderKind::Gemini);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = TrustScoutConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: TrustScoutConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.llm.model, config.llm.model);
        assert_eq!(deserialized.fusion.k, config.fusion.k);
        assert_eq!(deserialized.gateway.host, config.gateway.host);
    }

    #[test]
    fn test_load_config_with_overrides() {
        let mut overrides = TrustScoutConfig::default();
        overrides.llm.model = "gemini-2.0-flash".to_string();
        overrides.fusion.k = 10;

        let config = load_config(None, Some(&overrides)).unwrap();
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.fusion.k, 10);
    }

    #[test]
    fn test_load_config_from_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".trustscout");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            r#"
[llm]
provider = "none"
model = "gemini-1.5-pro"
api_key_env = "MY_GEMINI_KEY"
max_tokens = 64
temperature = 0.2
timeout_secs = 5

[gateway]
host = "0.0.0.0"
port = 9090
"#,
        )
        .unwrap();

        let config = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(config.llm.provider, LlmProviderKind::Disabled);
        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert_eq!(config.llm.timeout_secs, 5);
        assert_eq!(config.gateway.port, 9090);
        assert_eq!(config.gateway.cors_origins.len(), 2);
        // Section left out of the file keeps its default.
        assert_eq!(config.fusion.k, 60);
        assert!(config_exists(Some(dir.path())));
    }

    #[test]
    fn test_llm_config_validate_defaults_clean() {
        assert!(LlmConfig::default().validate().is_empty());
    }

    #[test]
    fn test_llm_config_validate_bad_values() {
        let config = LlmConfig {
            max_tokens: 0,
            temperature: 3.5,
            timeout_secs: 0,
            ..LlmConfig::default()
        };
        let warnings = config.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("temperature")));
    }

    #[test]
    fn test_resolve_api_key_prefers_inline_key() {
        let config = LlmConfig {
            api_key: Some("inline-key".to_string()),
            api_key_env: "TRUSTSCOUT_TEST_UNSET_KEY_VAR".to_string(),
            ..LlmConfig::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("inline-key"));
    }

    #[test]
    fn test_resolve_api_key_missing() {
        let config = LlmConfig {
            api_key: None,
            api_key_env: "TRUSTSCOUT_TEST_UNSET_KEY_VAR".to_string(),
            ..LlmConfig::default()
        };
        assert!(config.resolve_api_key().is_none());
    }

    #[test]
    fn test_resolve_api_key_blank_inline_is_ignored() {
        let config = LlmConfig {
            api_key: Some("   ".to_string()),
            api_key_env: "TRUSTSCOUT_TEST_UNSET_KEY_VAR".to_string(),
            ..LlmConfig::default()
        };
        assert!(config.resolve_api_key().is_none());
    }

    #[test]
    fn test_fusion_and_gateway_warnings() {
        assert_eq!(FusionConfig { k: 0 }.validate().len(), 1);
        let gateway = GatewayConfig {
            host: "0.0.0.0".to_string(),
            port: 0,
            cors_origins: Vec::new(),
        };
        assert_eq!(gateway.validate().len(), 2);
        assert_eq!(gateway.bind_addr(), "0.0.0.0:0");
    }

    #[test]
    fn test_env_overrides_workspace_file() {
        figment::Jail::expect_with(|jail| {
            std::fs::create_dir_all(jail.directory().join(".trustscout"))
                .map_err(|e| e.to_string())?;
            jail.create_file(".trustscout/config.toml", "[fusion]\nk = 10\n")?;
            jail.set_env("TRUSTSCOUT_FUSION__K", "25");
            jail.set_env("TRUSTSCOUT_LLM__MODEL", "gemini-2.0-flash");

            let config = load_config(Some(jail.directory()), None).map_err(|e| *e)?;
            assert_eq!(config.fusion.k, 25);
            assert_eq!(config.llm.model, "gemini-2.0-flash");
            Ok(())
        });
    }

    #[test]
    fn test_write_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_default_config(dir.path()).unwrap();
        assert!(path.ends_with(".trustscout/config.toml"));

        let config = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(config.fusion.k, 60);

        // Second write refuses to clobber the file.
        assert!(write_default_config(dir.path()).is_err());
    }
}
