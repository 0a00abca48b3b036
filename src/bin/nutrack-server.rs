// ABOUTME: Nutrack server binary: config load, logging init, HTTP serve
// ABOUTME: Spawns the midnight recommendation scheduler when enabled
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # Nutrack Server Binary
//!
//! Starts the nutrition tracking HTTP server with bearer-token auth against
//! the hosted auth service and the nightly recommendation scheduler.

use anyhow::Result;
use clap::Parser;
use nutrack::{config::ServerConfig, logging, server};
use tracing::info;

#[derive(Parser)]
#[command(name = "nutrack-server")]
#[command(about = "Nutrack - nutrition tracking API with AI daily recommendations")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Nutrack server");
    info!("{}", config.summary());

    server::serve(config).await
}
