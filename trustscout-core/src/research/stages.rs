//! Evidence-producing stages and the trust analyst.
//!
//! Every stage takes the accumulated state by value, appends to it, and
//! returns it. The returned state is the one callers must continue with.
//! Each evidence stage owns a constant rank matching its pipeline position.

use super::fusion;
use crate::error::LlmError;
use crate::generation::TextGenerator;
use crate::types::{Evidence, ResearchState};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const GENOMIC_SOURCE: &str = "TCGA";
pub const GENOMIC_FINDING: &str = "BRCA1 high-confidence somatic variant identified";
pub const GENOMIC_RANK: u32 = 1;

pub const IP_REGULATORY_SOURCE: &str = "WIPO / ClinicalTrials.gov";
pub const IP_REGULATORY_FINDING: &str = "No blocking patents or failed trials found";
pub const IP_REGULATORY_RANK: u32 = 2;

pub const LITERATURE_SOURCE: &str = "PubMed / AI Analysis";
pub const LITERATURE_FALLBACK_FINDING: &str =
    "Recent meta-analysis confirms efficacy in triple-negative breast cancer";
pub const LITERATURE_RANK: u32 = 3;

/// Prefix of the log line written when the text generator fails.
pub const AI_ERROR_PREFIX: &str = "AI Error:";

/// Scan TCGA-like genomic data for the focus.
pub fn genomic_harvester(mut state: ResearchState) -> ResearchState {
    state.push_log(format!(
        "Genomic Harvester: Scanning TCGA-like data for '{}'",
        state.biological_focus
    ));
    state.push_evidence(Evidence::new(GENOMIC_SOURCE, GENOMIC_FINDING, GENOMIC_RANK));
    debug!(stage = "genomic", rank = GENOMIC_RANK, "Evidence appended");
    state
}

/// Check patent filings and trial registries for the focus.
pub fn ip_regulatory_scout(mut state: ResearchState) -> ResearchState {
    state.push_log(format!(
        "IP & Regulatory Scout: Checking WIPO & ClinicalTrials for '{}'",
        state.biological_focus
    ));
    state.push_evidence(Evidence::new(
        IP_REGULATORY_SOURCE,
        IP_REGULATORY_FINDING,
        IP_REGULATORY_RANK,
    ));
    debug!(stage = "ip_regulatory", rank = IP_REGULATORY_RANK, "Evidence appended");
    state
}

/// Bounded prompt sent to the text generator.
pub fn literature_prompt(biological_focus: &str) -> String {
    format!(
        "You are an expert medical researcher. Provide a concise summary (under 40 words) \
         of a key scientific finding or recent study regarding: \"{biological_focus}\"."
    )
}

/// Summarize the literature for the focus.
///
/// With a generator, its trimmed output becomes the finding. Without one, or
/// when the call fails or exceeds `timeout`, the fixed fallback finding is
/// used and, for failures, an `AI Error:` line is logged. Never fails.
pub async fn literature_review_scout(
    mut state: ResearchState,
    generator: Option<&dyn TextGenerator>,
    timeout: Duration,
) -> ResearchState {
    state.push_log(format!(
        "Literature Review Scout: Analyzing literature for '{}'",
        state.biological_focus
    ));

    let mut finding = LITERATURE_FALLBACK_FINDING.to_string();

    if let Some(generator) = generator {
        let prompt = literature_prompt(&state.biological_focus);
        let outcome = match tokio::time::timeout(timeout, generator.generate(&prompt)).await {
            Ok(result) => result.and_then(|text| {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Err(LlmError::EmptyResponse)
                } else {
                    Ok(trimmed.to_string())
                }
            }),
            Err(_) => Err(LlmError::Timeout {
                timeout_secs: timeout.as_secs(),
            }),
        };

        match outcome {
            Ok(text) => {
                info!(
                    stage = "literature",
                    model = generator.model_name(),
                    "Generated literature finding"
                );
                finding = text;
            }
            Err(e) => {
                warn!(stage = "literature", error = %e, "Text generation failed, using fallback finding");
                state.push_log(format!("{AI_ERROR_PREFIX} {e}"));
            }
        }
    }

    state.push_evidence(Evidence::new(LITERATURE_SOURCE, finding, LITERATURE_RANK));
    state
}

/// Fuse all accumulated evidence into `rrf_score`.
pub fn trust_analyst(mut state: ResearchState, k: u32) -> ResearchState {
    state.push_log("Trust Analyst: Computing Reciprocal Rank Fusion");
    state.rrf_score = fusion::rrf_score(&state.evidence, k);
    info!(
        stage = "trust",
        evidence = state.evidence.len(),
        score = state.rrf_score,
        "Computed RRF score"
    );
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::MockTextGenerator;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_genomic_harvester() {
        let state = genomic_harvester(ResearchState::new("Breast Cancer BRCA1"));
        assert_eq!(state.logs.len(), 1);
        assert!(state.logs[0].starts_with("Genomic Harvester"));
        assert!(state.logs[0].contains("Breast Cancer BRCA1"));
        assert_eq!(
            state.evidence,
            vec![Evidence::new(GENOMIC_SOURCE, GENOMIC_FINDING, 1)]
        );
        assert_eq!(state.rrf_score, 0.0);
    }

    #[test]
    fn test_ip_regulatory_scout() {
        let state = ip_regulatory_scout(ResearchState::new("EGFR"));
        assert_eq!(state.logs.len(), 1);
        assert!(state.logs[0].starts_with("IP & Regulatory Scout"));
        assert_eq!(state.evidence[0].source, IP_REGULATORY_SOURCE);
        assert_eq!(state.evidence[0].rank, 2);
    }

    #[test]
    fn test_stage_ignores_prior_evidence_for_rank() {
        let mut state = ResearchState::new("EGFR");
        for _ in 0..5 {
            state.push_evidence(Evidence::new("other", "x", 9));
        }
        let state = ip_regulatory_scout(state);
        assert_eq!(state.evidence.last().unwrap().rank, IP_REGULATORY_RANK);
    }

    #[tokio::test]
    async fn test_literature_without_generator_uses_fallback() {
        let state = literature_review_scout(ResearchState::new("KRAS"), None, TIMEOUT).await;
        assert_eq!(state.logs.len(), 1);
        assert_eq!(state.evidence[0].finding, LITERATURE_FALLBACK_FINDING);
        assert_eq!(state.evidence[0].source, LITERATURE_SOURCE);
        assert_eq!(state.evidence[0].rank, 3);
    }

    #[tokio::test]
    async fn test_literature_uses_trimmed_generated_text() {
        let generator = MockTextGenerator::with_response("  PARP inhibitors extend survival.\n");
        let state =
            literature_review_scout(ResearchState::new("BRCA1"), Some(&generator), TIMEOUT).await;
        assert_eq!(state.logs.len(), 1);
        assert_eq!(state.evidence[0].finding, "PARP inhibitors extend survival.");

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("\"BRCA1\""));
        assert!(prompts[0].contains("under 40 words"));
    }

    #[tokio::test]
    async fn test_literature_failure_falls_back_and_logs() {
        let generator = MockTextGenerator::failing("invalid API key");
        let state =
            literature_review_scout(ResearchState::new("BRCA1"), Some(&generator), TIMEOUT).await;

        assert_eq!(state.logs.len(), 2);
        assert!(state.logs[0].starts_with("Literature Review Scout"));
        assert!(state.logs[1].starts_with(AI_ERROR_PREFIX));
        assert!(state.logs[1].contains("invalid API key"));
        assert_eq!(state.evidence.len(), 1);
        assert_eq!(state.evidence[0].finding, LITERATURE_FALLBACK_FINDING);
    }

    #[tokio::test]
    async fn test_literature_empty_response_falls_back() {
        let generator = MockTextGenerator::with_response("   \n ");
        let state =
            literature_review_scout(ResearchState::new("BRCA1"), Some(&generator), TIMEOUT).await;
        assert_eq!(state.evidence[0].finding, LITERATURE_FALLBACK_FINDING);
        assert!(state.logs[1].contains("empty response"));
    }

    #[tokio::test]
    async fn test_literature_auth_error_falls_back() {
        let generator = MockTextGenerator::new();
        generator.queue_error(LlmError::AuthFailed {
            provider: "Gemini".into(),
        });
        let state =
            literature_review_scout(ResearchState::new("BRCA1"), Some(&generator), TIMEOUT).await;
        assert_eq!(state.evidence[0].finding, LITERATURE_FALLBACK_FINDING);
        assert!(state.logs[1].contains("Authentication failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_literature_timeout_falls_back() {
        let generator =
            MockTextGenerator::with_response("too late").with_delay(Duration::from_secs(60));
        let state = literature_review_scout(
            ResearchState::new("BRCA1"),
            Some(&generator),
            Duration::from_secs(2),
        )
        .await;
        assert_eq!(state.evidence[0].finding, LITERATURE_FALLBACK_FINDING);
        assert!(state.logs[1].contains("timed out after 2s"));
    }

    #[test]
    fn test_trust_analyst_three_ranks() {
        let mut state = ResearchState::new("BRCA1");
        for rank in 1..=3 {
            state.push_evidence(Evidence::new("src", "finding", rank));
        }
        let state = trust_analyst(state, fusion::DEFAULT_RRF_K);
        assert_eq!(state.rrf_score, 0.05);
        assert_eq!(
            state.logs,
            vec!["Trust Analyst: Computing Reciprocal Rank Fusion".to_string()]
        );
    }

    #[test]
    fn test_trust_analyst_empty_evidence() {
        let state = trust_analyst(ResearchState::new("BRCA1"), fusion::DEFAULT_RRF_K);
        assert_eq!(state.rrf_score, 0.0);
        assert_eq!(state.logs.len(), 1);
    }
}
