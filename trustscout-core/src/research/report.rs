//! Rendering of a finished `ResearchState` for people and downstream tools.

use crate::types::ResearchState;
use serde::{Deserialize, Serialize};

/// Output format for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Plain text: score, logs, evidence.
    #[default]
    Text,
    /// Pretty-printed JSON in the wire shape.
    Json,
    /// Markdown report with an evidence table.
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!(
                "unknown output format '{other}' (expected text, json, or markdown)"
            )),
        }
    }
}

/// Render `state` in `format`.
pub fn render(state: &ResearchState, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(state)),
        OutputFormat::Json => serde_json::to_string_pretty(state),
        OutputFormat::Markdown => Ok(render_markdown(state)),
    }
}

fn render_text(state: &ResearchState) -> String {
    let mut out = format!("Final RRF Score: {:.2}\n", state.rrf_score);

    out.push_str("\nLogs:\n");
    for line in &state.logs {
        out.push_str(&format!("- {line}\n"));
    }

    out.push_str("\nEvidence Collected:\n");
    for e in &state.evidence {
        out.push_str(&format!("- [{}] {} (Rank: {})\n", e.source, e.finding, e.rank));
    }
    out
}

fn render_markdown(state: &ResearchState) -> String {
    let mut out = format!("# Evidence Report: {}\n\n", state.biological_focus);
    out.push_str(&format!(
        "**Trust score (RRF):** {:.2} | **Evidence items:** {}\n\n",
        state.rrf_score,
        state.evidence.len()
    ));

    out.push_str("## Evidence\n\n");
    if state.evidence.is_empty() {
        out.push_str("_No evidence collected._\n");
    } else {
        out.push_str("| Rank | Source | Finding |\n|---:|---|---|\n");
        for e in state.evidence_by_rank() {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                e.rank,
                escape_cell(&e.source),
                escape_cell(&e.finding)
            ));
        }
    }

    out.push_str("\n## Pipeline Log\n\n");
    for (i, line) in state.logs.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, line));
    }
    out
}

/// Keep table cells on one line and stop stray pipes from splitting columns.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
