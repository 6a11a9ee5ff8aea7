use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use agora_core::config::{AgoraConfig, ConfigLoader};
use agora_core::credentials::mask_credential;
use agora_core::llm::providers::create_llm_client;
use agora_core::{
    resolve_credential, CredentialStore, DebateOrchestrator, DebateSession, RunKind, RunReport,
    RunStatus, TrialOrchestrator, TrialSession, LLM,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use tokio_util::sync::CancellationToken;

mod console;

use console::ConsoleSink;

#[derive(Parser, Debug)]
#[clap(
    name = "Agora",
    author,
    version = "0.1.0",
    about = "Scripted LLM debates and mock criminal trials"
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(long, short, global = true, default_value = "agora.yaml")]
    config: PathBuf,

    #[clap(long, short, global = true, help = "Overrides logging.level from the config file")]
    log_level: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct RunOptions {
    #[clap(long, help = "API key for this run; takes precedence over the stored key")]
    api_key: Option<String>,

    #[clap(long, short, help = "Write the run report as JSON to this file")]
    output: Option<PathBuf>,

    #[clap(long, help = "Do not wait between turns")]
    no_pacing: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a round-robin debate between personas
    Debate {
        #[clap(long, short)]
        topic: String,

        #[clap(long = "personality", short = 'p', required = true, help = "Persona description, repeat once per agent")]
        personalities: Vec<String>,

        #[clap(long, short, default_value_t = 3)]
        iterations: usize,

        #[clap(flatten)]
        options: RunOptions,
    },
    /// Run a mock criminal trial over the given case facts
    Trial {
        #[clap(long = "case", help = "Facts of the case")]
        case_facts: String,

        #[clap(flatten)]
        options: RunOptions,
    },
    /// Manage the stored API key
    Token {
        #[clap(subcommand)]
        action: TokenCommands,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommands {
    /// Save an API key, replacing any previous one
    Set { key: String },
    /// Show the stored API key, masked
    Show,
    /// Remove the stored API key
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Filtering happens through the global max level, adjusted after the config is read
    env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .init();
    log::set_max_level(effective_log_level(cli.log_level.as_deref(), "info"));

    let config = ConfigLoader::load_or_default(&cli.config)
        .await
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    log::set_max_level(effective_log_level(
        cli.log_level.as_deref(),
        &config.logging.level,
    ));
    log::debug!("Using model {} via {:?}", config.llm.model, config.llm.provider);

    match cli.command {
        Commands::Debate {
            topic,
            personalities,
            iterations,
            options,
        } => run_debate(&config, &topic, &personalities, iterations, &options).await,
        Commands::Trial {
            case_facts,
            options,
        } => run_trial(&config, &case_facts, &options).await,
        Commands::Token { action } => handle_token_command(&config, action).await,
    }
}

async fn run_debate(
    config: &AgoraConfig,
    topic: &str,
    personalities: &[String],
    iterations: usize,
    options: &RunOptions,
) -> Result<()> {
    let session = DebateSession::new(topic, personalities, iterations)?;
    let llm = connect(config, options, RunKind::Debate).await?;

    let pacing = if options.no_pacing {
        Duration::ZERO
    } else {
        Duration::from_millis(config.pacing.debate_delay_ms)
    };
    let orchestrator = DebateOrchestrator::new(session).with_pacing(pacing);
    log::info!(
        "Starting debate with {} agents over {} iterations ({} calls)",
        orchestrator.agents().len(),
        iterations,
        orchestrator.total_steps()
    );

    let cancel = cancel_on_signal();
    let mut sink = ConsoleSink::stdout();
    let report = orchestrator.run(llm.as_ref(), &mut sink, &cancel).await;
    finish(report, options).await
}

async fn run_trial(config: &AgoraConfig, case_facts: &str, options: &RunOptions) -> Result<()> {
    let session = TrialSession::new(case_facts)?;
    let llm = connect(config, options, RunKind::Trial).await?;

    let pacing = if options.no_pacing {
        Duration::ZERO
    } else {
        Duration::from_millis(config.pacing.trial_delay_ms)
    };
    let orchestrator = TrialOrchestrator::new(session).with_pacing(pacing);

    let cancel = cancel_on_signal();
    let mut sink = ConsoleSink::stdout();
    let report = orchestrator.run(llm.as_ref(), &mut sink, &cancel).await;
    finish(report, options).await
}

/// Resolve the credential and build the inference client for one run.
async fn connect(config: &AgoraConfig, options: &RunOptions, kind: RunKind) -> Result<Arc<dyn LLM>> {
    let store = CredentialStore::from_config(&config.credentials)?;
    let credential = resolve_credential(options.api_key.as_deref(), &store, &config.credentials).await?;
    Ok(create_llm_client(&config.llm, &credential, kind)?)
}

async fn finish(report: RunReport, options: &RunOptions) -> Result<()> {
    if let Some(path) = &options.output {
        let json = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write run report to {}", path.display()))?;
        log::info!("Run report written to {}", path.display());
    }

    match report.status {
        RunStatus::Completed => Ok(()),
        RunStatus::Failed(err) => Err(anyhow::anyhow!(
            "{} stopped after {} successful calls: {}",
            report.kind.label(),
            report.transcript.len(),
            err
        )),
        RunStatus::Cancelled => anyhow::bail!(
            "{} cancelled after {} calls",
            report.kind.label(),
            report.calls
        ),
    }
}

async fn handle_token_command(config: &AgoraConfig, action: TokenCommands) -> Result<()> {
    let store = CredentialStore::from_config(&config.credentials)?;

    match action {
        TokenCommands::Set { key } => {
            store.set(&key).await?;
            println!("API key saved to {}", store.path().display());
        }
        TokenCommands::Show => match store.get().await? {
            Some(key) => println!("{} ({})", mask_credential(&key), store.path().display()),
            None => println!("No API key stored in {}", store.path().display()),
        },
        TokenCommands::Clear => {
            if store.clear().await? {
                println!("API key removed.");
            } else {
                println!("No API key was stored.");
            }
        }
    }

    Ok(())
}

/// Token cancelled on Ctrl+C or SIGTERM.
fn cancel_on_signal() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.cancel();
    });
    cancel
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C, cancelling run...");
        },
        _ = terminate => {
            log::info!("Received SIGTERM, cancelling run...");
        },
    }
}

/// `--log-level` wins over `logging.level`; unknown names fall back to info.
fn effective_log_level(flag: Option<&str>, configured: &str) -> LevelFilter {
    flag.unwrap_or(configured).parse().unwrap_or(LevelFilter::Info)
}
