//! # TrustScout Core
//!
//! Core library for the TrustScout evidence pipeline.
//! Provides the research state model, evidence stages, Reciprocal Rank Fusion,
//! the text-generation seam and its Gemini provider, configuration, and the
//! HTTP gateway.

pub mod config;
pub mod error;
pub mod gateway;
pub mod generation;
pub mod providers;
pub mod research;
pub mod types;

// Re-export commonly used types at the crate root.
pub use config::{LlmConfig, LlmProviderKind, TrustScoutConfig, config_exists, load_config};
pub use error::{Result, TrustScoutError};
pub use gateway::GatewayConfig;
pub use generation::{MockTextGenerator, TextGenerator};
pub use research::{OutputFormat, PipelineSettings, ResearchPipeline, Stage};
pub use types::{Evidence, ResearchState};
