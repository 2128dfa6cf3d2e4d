mod batch;
mod config;
mod errors;
#[cfg(test)]
mod fixtures;
mod generation;
mod layout;
mod models;
mod render;
mod state;
mod theme;
mod validation;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::batch::{plan, prepare_views, run, BatchReport, Emission, ViewKey};
use crate::config::{Config, GlobalArgs};
use crate::errors::EmissionError;
use crate::models::view::{Audience, Length};
use crate::render::OutputFormat;
use crate::state::AppState;
use crate::theme::colors::ColorRole;
use crate::theme::resolve;

#[derive(Parser)]
#[command(name = "vitae")]
#[command(about = "Generate a résumé portfolio from one master content store")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Emit a single document
    Generate {
        #[arg(long)]
        role: String,
        /// long or short
        #[arg(long)]
        length: Length,
        #[arg(long)]
        scheme: String,
        /// ats or human
        #[arg(long)]
        audience: Audience,
        /// pdf, docx, rtf or md
        #[arg(long)]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Emit the whole cross-product
    GenerateAll {
        #[arg(long)]
        out: Option<PathBuf>,
        /// Restrict to one audience
        #[arg(long)]
        audience: Option<Audience>,
    },
    /// Derive and validate every view without writing anything
    Validate,
    /// List the color-scheme catalogue
    Schemes,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration first so the log level can come from it
    let mut config = Config::load(&cli.global)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting vitae v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Generate {
            role,
            length,
            scheme,
            audience,
            format,
            out,
        } => {
            if let Some(out) = out {
                config.out_dir = out;
            }
            let state = AppState::load(config)?;
            let emission = Emission {
                role,
                length,
                scheme,
                audience,
                format,
            };
            let report = run_batch(&state, vec![emission]).await;
            Ok(finish(&report))
        }
        Command::GenerateAll { out, audience } => {
            if let Some(out) = out {
                config.out_dir = out;
            }
            if let Some(audience) = audience {
                config.audiences = vec![audience];
            }
            let state = AppState::load(config)?;
            let emissions = plan(
                &state.selected_roles()?,
                &state.config.lengths,
                &state.selected_schemes()?,
                &state.config.audiences,
                &state.config.formats,
            );
            let report = run_batch(&state, emissions).await;
            Ok(finish(&report))
        }
        Command::Validate => {
            let state = AppState::load(config)?;
            validate_all(&state)
        }
        Command::Schemes => {
            let state = AppState::load(config)?;
            list_schemes(&state)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_batch(state: &AppState, emissions: Vec<Emission>) -> BatchReport {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling remaining emissions");
            on_signal.cancel();
        }
    });

    info!(out = %state.config.out_dir.display(), "Writing to output root");
    run(state, emissions, &state.config.out_dir, cancel).await
}

fn finish(report: &BatchReport) -> ExitCode {
    println!("{report}");
    if report.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn validate_all(state: &AppState) -> Result<ExitCode> {
    let mut keys = Vec::new();
    for role in state.selected_roles()? {
        for &length in &state.config.lengths {
            for &audience in &state.config.audiences {
                keys.push(ViewKey {
                    role: role.clone(),
                    length,
                    audience,
                });
            }
        }
    }

    let mut failed = 0;
    for (key, prepared) in prepare_views(state, &keys) {
        match prepared {
            Ok(_) => println!("ok      {key}"),
            Err(err) => {
                failed += 1;
                println!("FAILED  {key} [{}] {err}", err.code());
                if let EmissionError::Validation(report) = &err {
                    for issue in report.errors.iter().chain(&report.warnings) {
                        println!("        {:?} at {}: {}", issue.kind, issue.field, issue.message);
                    }
                }
            }
        }
    }
    println!("{} views checked, {} failed", keys.len(), failed);
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn list_schemes(state: &AppState) -> Result<()> {
    let theme = state.config.themes.for_audience(Audience::Human);
    for key in state.schemes.keys() {
        let style = resolve(&state.schemes, key, theme)
            .with_context(|| format!("Scheme '{key}' does not resolve"))?;
        println!(
            "{key:<20} name {}  accent {}  headers {}",
            style.colors.get(ColorRole::Name).hex(),
            style.colors.get(ColorRole::Accent).hex(),
            style.colors.get(ColorRole::SectionHeader).hex()
        );
    }
    Ok(())
}
