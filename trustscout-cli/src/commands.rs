//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crate::GlobalOptions;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use trustscout_core::config::{workspace_config_path, write_default_config};
use trustscout_core::error::PipelineError;
use trustscout_core::gateway::run_gateway;
use trustscout_core::providers::create_generator;
use trustscout_core::research::PipelineObserver;
use trustscout_core::research::report::render;
use trustscout_core::{
    LlmProviderKind, OutputFormat, PipelineSettings, ResearchPipeline, ResearchState, Stage,
    TrustScoutConfig,
};

/// Handle a CLI subcommand.
pub async fn handle_command(command: Commands, options: &GlobalOptions) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            focus,
            format,
            no_llm,
        } => {
            let mut config = load(options)?;
            if no_llm {
                config.llm.provider = LlmProviderKind::Disabled;
            }
            let progress = options.verbose > 0 && !options.quiet;
            let report = run_report(&config, &focus, format, progress).await?;
            println!("{}", report);
            Ok(())
        }
        Commands::Serve { host, port } => {
            let mut config = load(options)?;
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            for warning in config.gateway.validate() {
                tracing::warn!("{}", warning);
            }
            let pipeline = build_pipeline(&config)?;
            if !options.quiet {
                println!("Serving TrustScout on http://{}", config.gateway.bind_addr());
            }
            run_gateway(&config.gateway, Arc::new(pipeline)).await?;
            Ok(())
        }
        Commands::Config { action } => handle_config(action, options),
    }
}

/// Load layered configuration and apply the global CLI overrides.
fn load(options: &GlobalOptions) -> anyhow::Result<TrustScoutConfig> {
    let mut config = trustscout_core::load_config(Some(&options.workspace), None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    if let Some(model) = &options.model {
        config.llm.model = model.clone();
    }
    for warning in config.llm.validate().into_iter().chain(config.fusion.validate()) {
        tracing::warn!("{}", warning);
    }
    Ok(config)
}

fn build_pipeline(config: &TrustScoutConfig) -> anyhow::Result<ResearchPipeline> {
    let generator = create_generator(&config.llm)?;
    Ok(ResearchPipeline::new(generator, PipelineSettings::from(config)))
}

/// Run one pipeline for `focus` and render the terminal state.
async fn run_report(
    config: &TrustScoutConfig,
    focus: &str,
    format: OutputFormat,
    progress: bool,
) -> anyhow::Result<String> {
    let focus = focus.trim();
    if focus.is_empty() {
        return Err(PipelineError::InvalidFocus.into());
    }

    let mut pipeline = build_pipeline(config)?;
    if progress {
        let total = pipeline.stages().len();
        pipeline = pipeline.with_observer(Arc::new(ProgressObserver::new(total)));
    }

    let state = pipeline.run(focus).await;
    Ok(render(&state, format)?)
}

/// Prints one line per stage to stderr.
struct ProgressObserver {
    total: usize,
    started: AtomicUsize,
}

impl ProgressObserver {
    fn new(total: usize) -> Self {
        Self {
            total,
            started: AtomicUsize::new(0),
        }
    }
}

impl PipelineObserver for ProgressObserver {
    fn on_stage_start(&self, stage: Stage, _state: &ResearchState) {
        let n = self.started.fetch_add(1, Ordering::Relaxed) + 1;
        eprintln!("  [{}/{}] {} ...", n, self.total, stage);
    }

    fn on_stage_complete(&self, stage: Stage, state: &ResearchState) {
        if stage == Stage::TrustAnalyst {
            eprintln!("  RRF score: {:.2}", state.rrf_score);
        }
    }
}

fn handle_config(action: ConfigAction, options: &GlobalOptions) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = workspace_config_path(&options.workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            let written = write_default_config(&options.workspace)?;
            println!("Created default configuration at: {}", written.display());
            Ok(())
        }
        ConfigAction::Show => {
            let config = load(options)?;
            println!("{}", show_config(&config)?);
            Ok(())
        }
    }
}

/// Serialize `config` as TOML with any inline API key redacted.
fn show_config(config: &TrustScoutConfig) -> anyhow::Result<String> {
    let mut shown = config.clone();
    if shown.llm.api_key.is_some() {
        shown.llm.api_key = Some("********".to_string());
    }
    Ok(toml::to_string_pretty(&shown)?)
}
