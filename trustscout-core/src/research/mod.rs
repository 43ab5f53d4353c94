//! Evidence pipeline.
//!
//! Runs a fixed sequence of stages over one `ResearchState`:
//! 1. **Genomic harvester** - TCGA-style variant evidence (rank 1)
//! 2. **IP & regulatory scout** - patent and trial registry evidence (rank 2)
//! 3. **Literature review scout** - optional LLM summary with fallback (rank 3)
//! 4. **Trust analyst** - Reciprocal Rank Fusion over everything collected

pub mod fusion;
pub mod pipeline;
pub mod report;
pub mod stages;

pub use fusion::{DEFAULT_RRF_K, RrfConfig, fuse_ranked_lists, rrf_score};
pub use pipeline::{NoOpObserver, PipelineObserver, PipelineSettings, ResearchPipeline, Stage};
pub use report::OutputFormat;
