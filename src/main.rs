mod cli;

use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, DetectArgs};
use driftwatch::providers::aws::{AwsSettings, profile};
use driftwatch::{
    DefaultDriftChecker, DetectionSummary, provider_for, reporter_for, run_drift_detection,
    state_manager_for,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_directive())),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Detect(args) => {
            let summary = detect(args).await?;
            if summary.drifted > 0 {
                // Script-friendly signal: drift was found and reported.
                std::process::exit(2);
            }
        }
    }

    Ok(())
}

async fn detect(args: DetectArgs) -> Result<DetectionSummary> {
    let state_manager = state_manager_for(&args.state_manager)?;

    // Fail before the worker pool starts when no usable profile setup
    // exists. An endpoint override (LocalStack) does not need one.
    if args.provider == "aws" && args.localstack_url.is_none() {
        profile::discover(None, &args.aws_profile)?;
    }

    let settings = AwsSettings {
        profile: args.aws_profile.clone(),
        endpoint_url: args.localstack_url.clone(),
        region: args.localstack_region.clone(),
    };
    let provider = provider_for(&args.provider, settings).await?;

    let ctx = CancellationToken::new();
    let cancel = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, draining workers");
            cancel.cancel();
        }
    });

    let summary = run_drift_detection(
        ctx,
        &args.config_file,
        &args.resource,
        &args.attributes,
        state_manager.as_ref(),
        Arc::from(provider),
        Arc::new(DefaultDriftChecker::new()),
        Arc::from(reporter_for(&args.output_file)),
    )
    .await?;

    Ok(summary)
}
