//! Fundamental types for the evidence pipeline.
//!
//! `Evidence` is one finding contributed by a stage; `ResearchState` is the
//! record threaded through every stage of a run and handed back as the result.

use serde::{Deserialize, Serialize};

/// One source-attributed finding produced by a single stage.
///
/// `rank` is the position assigned by the producing stage, not a global rank
/// across all evidence. It is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub source: String,
    pub finding: String,
    pub rank: u32,
}

impl Evidence {
    pub fn new(source: impl Into<String>, finding: impl Into<String>, rank: u32) -> Self {
        debug_assert!(rank >= 1, "evidence rank must be >= 1");
        Self {
            source: source.into(),
            finding: finding.into(),
            rank,
        }
    }
}

/// State accumulated across one pipeline run.
///
/// Evidence and logs are append-only. `rrf_score` stays `0.0` until the trust
/// analyst writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchState {
    pub biological_focus: String,
    pub rrf_score: f64,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub logs: Vec<String>,
}

impl ResearchState {
    /// Fresh state for one research query.
    pub fn new(biological_focus: impl Into<String>) -> Self {
        Self {
            biological_focus: biological_focus.into(),
            rrf_score: 0.0,
            evidence: Vec::new(),
            logs: Vec::new(),
        }
    }

    pub fn push_evidence(&mut self, evidence: Evidence) {
        self.evidence.push(evidence);
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
    }

    /// Evidence sorted by ascending rank (stable, so stage order breaks ties).
    pub fn evidence_by_rank(&self) -> Vec<&Evidence> {
        let mut sorted: Vec<&Evidence> = self.evidence.iter().collect();
        sorted.sort_by_key(|e| e.rank);
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_state_is_empty() {
        let state = ResearchState::new("Breast Cancer BRCA1");
        assert_eq!(state.biological_focus, "Breast Cancer BRCA1");
        assert!(state.evidence.is_empty());
        assert!(state.logs.is_empty());
        assert_eq!(state.rrf_score, 0.0);
    }

    #[test]
    fn test_push_is_append_only() {
        let mut state = ResearchState::new("TP53");
        state.push_log("first");
        state.push_evidence(Evidence::new("TCGA", "variant", 1));
        state.push_log("second");
        state.push_evidence(Evidence::new("PubMed", "study", 3));

        assert_eq!(state.logs, vec!["first".to_string(), "second".to_string()]);
        assert_eq!(state.evidence[0].source, "TCGA");
        assert_eq!(state.evidence[1].rank, 3);
    }

    #[test]
    fn test_wire_shape() {
        let mut state = ResearchState::new("EGFR");
        state.push_evidence(Evidence::new("TCGA", "variant", 1));
        state.push_log("Genomic Harvester ran");
        state.rrf_score = 0.02;

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "biological_focus": "EGFR",
                "rrf_score": 0.02,
                "evidence": [{"source": "TCGA", "finding": "variant", "rank": 1}],
                "logs": ["Genomic Harvester ran"],
            })
        );
    }

    #[test]
    fn test_deserialize_without_optional_lists() {
        let state: ResearchState =
            serde_json::from_str(r#"{"biological_focus": "KRAS", "rrf_score": 0.0}"#).unwrap();
        assert_eq!(state, ResearchState::new("KRAS"));
    }

    #[test]
    fn test_evidence_by_rank() {
        let mut state = ResearchState::new("HER2");
        state.push_evidence(Evidence::new("C", "third", 3));
        state.push_evidence(Evidence::new("A", "first", 1));
        state.push_evidence(Evidence::new("B", "second", 2));
        let ranks: Vec<u32> = state.evidence_by_rank().iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }
}
