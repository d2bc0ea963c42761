mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use ai_llm_service::telemetry;
use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use contextor::{CancellationToken, Contextor, ContextorConfig, IndicatifProgress};
use tracing::{Level, debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // `.env` is optional; real environment variables win.
    let dotenv = dotenvy::dotenv();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("warn", level))
        .with(telemetry::layer())
        .init();

    match dotenv {
        Ok(path) => debug!("loaded {}", path.display()),
        Err(e) if e.not_found() => debug!("no .env file"),
        Err(e) => warn!("ignoring unreadable .env: {e}"),
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    // Flags win over env, so range checks run only after they are applied.
    let mut cfg = ContextorConfig::from_env().context("invalid configuration")?;
    args.apply(&mut cfg);
    cfg.validate().context("invalid configuration")?;

    let mut ctx = Contextor::from_config(&cfg)
        .await
        .context("failed to initialise the query pipeline")?;
    if args.show_progress() {
        ctx = ctx.with_progress(Arc::new(IndicatifProgress::spinner()));
    }

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            on_ctrl_c.cancel();
        }
    });

    let answer = ctx.ask(&args.query, &cancel).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        println!("{answer}");
    }
    Ok(())
}
