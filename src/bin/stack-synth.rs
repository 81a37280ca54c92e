// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Synthesizer
//!
//! Loads the stack configuration, composes the full resource graph and
//! hands it off:
//! - with `NATS_URL` set, the manifest is published to
//!   `stacks.{name}.declared` for the realization engine
//! - otherwise the manifest is written to stdout as JSON
//!
//! Logs go to stderr so stdout carries only the manifest.
//!
//! Run with: cargo run --bin stack-synth
//!
//! Environment:
//! 1. APP_STACK_CONFIG_FILE (default: config.yaml)
//! 2. NATS_URL (optional)
//! 3. RUST_LOG (default: info)

use anyhow::{Context, Result};
use cim_app_stack::{
    config::{config_path_from_env, StackConfig},
    nats::{NatsClient, NatsConfig},
    provisioning::{NatsProvisioningRuntime, ProvisioningRuntime, StackManifest},
    StackComposer,
};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Configuration problems stop everything before a single declaration
    let path = config_path_from_env();
    let config = match StackConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: StackConfig) -> Result<()> {
    info!(stack = %config.name(), "composing stack");
    let stack = StackComposer::new(config)
        .compose()
        .context("Failed to compose stack")?;
    let manifest = StackManifest::from_stack(&stack);

    match std::env::var("NATS_URL") {
        Ok(url) => {
            let client = NatsClient::new(NatsConfig::with_servers(&url))
                .await
                .context("Failed to connect to NATS")?;
            let receipt = NatsProvisioningRuntime::new(client)
                .submit(&manifest)
                .await
                .context("Failed to submit manifest")?;
            info!(
                manifest_id = %receipt.manifest_id,
                resources = receipt.resources,
                "manifest submitted"
            );
        }
        Err(_) => {
            println!("{}", manifest.to_json_pretty()?);
        }
    }

    Ok(())
}
