//! # HTTP Gateway
//!
//! Exposes the research pipeline over HTTP. Every request runs its own
//! pipeline invocation on a separate Tokio task; requests share only the
//! immutable `ResearchPipeline`.

mod server;

pub use server::{
    GatewayState, ResearchRequest, router as gateway_router, run as run_gateway,
};

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Browser origins allowed to call the API.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: default_cors_origins(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.host == "0.0.0.0" {
            warnings.push("gateway binds to all interfaces (0.0.0.0)".to_string());
        }
        if self.port == 0 {
            warnings.push("gateway.port is 0; an ephemeral port will be chosen".to_string());
        }
        warnings
    }

    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
