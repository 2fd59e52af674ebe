use std::io::{self, BufReader};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use qchess_uci::UciEngine;

fn main() -> Result<()> {
    // stdout carries the protocol, so logs go to stderr.
    let filter = EnvFilter::builder()
        .with_default_directive(Level::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .without_time()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
    info!("qchess starting");

    let engine = UciEngine::new(Arc::new(Mutex::new(io::stdout())));
    engine.run(BufReader::new(io::stdin()))?;
    Ok(())
}
