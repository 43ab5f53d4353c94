//! Pipeline orchestrator: threads one `ResearchState` through a fixed list
//! of stages, left to right.

use super::stages;
use crate::config::TrustScoutConfig;
use crate::generation::TextGenerator;
use crate::types::ResearchState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// One step of the research pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    GenomicHarvester,
    IpRegulatoryScout,
    LiteratureReview,
    TrustAnalyst,
}

impl Stage {
    /// genomic -> ip_regulatory -> literature -> trust.
    pub const DEFAULT_ORDER: [Stage; 4] = [
        Stage::GenomicHarvester,
        Stage::IpRegulatoryScout,
        Stage::LiteratureReview,
        Stage::TrustAnalyst,
    ];

    /// Stable short name, used in logs and progress output.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::GenomicHarvester => "genomic",
            Stage::IpRegulatoryScout => "ip_regulatory",
            Stage::LiteratureReview => "literature",
            Stage::TrustAnalyst => "trust",
        }
    }

    /// Whether this stage contributes evidence (as opposed to fusing it).
    pub fn produces_evidence(&self) -> bool {
        !matches!(self, Stage::TrustAnalyst)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Progress hooks for a pipeline run.
pub trait PipelineObserver: Send + Sync {
    fn on_stage_start(&self, _stage: Stage, _state: &ResearchState) {}
    fn on_stage_complete(&self, _stage: Stage, _state: &ResearchState) {}
}

/// Observer that ignores every event.
pub struct NoOpObserver;

impl PipelineObserver for NoOpObserver {}

/// Settings a run needs beyond the stage list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// RRF damping constant for the trust analyst.
    pub rrf_k: u32,
    /// Upper bound on the literature stage's generation call.
    pub generation_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            rrf_k: super::fusion::DEFAULT_RRF_K,
            generation_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&TrustScoutConfig> for PipelineSettings {
    fn from(config: &TrustScoutConfig) -> Self {
        Self {
            rrf_k: config.fusion.k,
            generation_timeout: Duration::from_secs(config.llm.timeout_secs),
        }
    }
}

/// The research pipeline.
///
/// Immutable once built, so one instance can serve many concurrent runs
/// behind an `Arc`. Each run owns its own `ResearchState`.
pub struct ResearchPipeline {
    stages: Vec<Stage>,
    generator: Option<Arc<dyn TextGenerator>>,
    settings: PipelineSettings,
    observer: Arc<dyn PipelineObserver>,
}

impl ResearchPipeline {
    /// Pipeline with the default stage order.
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, settings: PipelineSettings) -> Self {
        Self {
            stages: Stage::DEFAULT_ORDER.to_vec(),
            generator,
            settings,
            observer: Arc::new(NoOpObserver),
        }
    }

    /// Replace the stage list. The order is taken as given.
    pub fn with_stages(mut self, stages: Vec<Stage>) -> Self {
        self.stages = stages;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn settings(&self) -> PipelineSettings {
        self.settings
    }

    /// Model name of the configured generator, if any.
    pub fn model_name(&self) -> Option<&str> {
        self.generator.as_deref().map(|g| g.model_name())
    }

    /// Run every stage against a fresh state for `biological_focus`.
    pub async fn run(&self, biological_focus: impl Into<String>) -> ResearchState {
        self.run_state(ResearchState::new(biological_focus)).await
    }

    /// Fold `state` through the stage list and return the terminal state.
    pub async fn run_state(&self, state: ResearchState) -> ResearchState {
        info!(
            focus = state.biological_focus.as_str(),
            stages = self.stages.len(),
            "Starting research pipeline"
        );

        let mut state = state;
        for &stage in &self.stages {
            self.observer.on_stage_start(stage, &state);
            state = self.apply(stage, state).await;
            debug!(
                stage = stage.name(),
                evidence = state.evidence.len(),
                logs = state.logs.len(),
                "Stage complete"
            );
            self.observer.on_stage_complete(stage, &state);
        }

        info!(
            focus = state.biological_focus.as_str(),
            score = state.rrf_score,
            evidence = state.evidence.len(),
            "Research pipeline finished"
        );
        state
    }

    async fn apply(&self, stage: Stage, state: ResearchState) -> ResearchState {
        match stage {
            Stage::GenomicHarvester => stages::genomic_harvester(state),
            Stage::IpRegulatoryScout => stages::ip_regulatory_scout(state),
            Stage::LiteratureReview => {
                stages::literature_review_scout(
                    state,
                    self.generator.as_deref(),
                    self.settings.generation_timeout,
                )
                .await
            }
            Stage::TrustAnalyst => stages::trust_analyst(state, self.settings.rrf_k),
        }
    }
}
