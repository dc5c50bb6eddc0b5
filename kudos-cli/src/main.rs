//! Kudos ledger sync
//!
//! Reconciles the local Kudos database with the contract on the chosen
//! network.
//!
//! Usage:
//!   kudos-sync rinkeby id --catchup
//!   kudos-sync mainnet filter --start latest
//!   kudos-sync mainnet opensea --resume --fail-fast

use anyhow::Result;
use clap::Parser;
use kudos_cli::{init_tracing, run, Args};
use std::process::ExitCode;
use tracing::warn;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.build_config(|key| std::env::var(key).ok())?;

    let report = tokio::select! {
        report = run(&args, &config) => report?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; rerun with --resume to continue an id or opensea sync");
            return Ok(ExitCode::from(130));
        }
    };

    println!("\n========================================");
    println!("  Kudos Sync Finished");
    println!("========================================");
    println!("  Network:   {}", report.network);
    println!("  Method:    {}", report.method);
    println!("  Range:     {}", report.range);
    println!("  Created:   {}", report.created);
    println!("  Updated:   {}", report.updated);
    println!("  Unchanged: {}", report.unchanged);
    if let Some(checkpoint) = report.checkpoint {
        println!("  Checkpoint: {checkpoint}");
    }
    if let Some(head) = report.head_block {
        println!("  Head block: {head} (next run: --start {})", head.saturating_add(1));
    }
    if !report.is_clean() {
        println!("\n  Failed tokens:");
        for failure in &report.failures {
            let kind = if failure.transient { "retryable" } else { "permanent" };
            println!("  {} ({kind}): {}", failure.token_id, failure.reason);
        }
    }
    println!("========================================\n");

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}
