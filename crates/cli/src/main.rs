//! `lapi-bouncer`
//!
//! Command-line access to the bouncer operations. Every command prints the
//! decoded JSON response on stdout; logs go to stderr and follow `RUST_LOG`.

#![allow(clippy::print_stdout)]

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lapi_infra::{build_bouncer, config, open_credential_store, StoreLocation, TransportKind};
use tracing_subscriber::{fmt, EnvFilter};

/// Talk to a CrowdSec local API as a registered watcher.
#[derive(Parser, Debug)]
#[command(name = "lapi-bouncer", version, about)]
struct Cli {
    /// Config file (TOML or JSON). Without it, `LAPI_*` variables are read,
    /// then the standard config locations are probed.
    #[arg(long, env = "LAPI_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory of the file credential store.
    #[arg(long, default_value = ".lapi-credentials", global = true)]
    storage_dir: PathBuf,

    /// Keep credentials in the platform keychain instead of files.
    #[arg(long, global = true, conflicts_with = "storage_dir")]
    keychain: bool,

    /// HTTP transport strategy.
    #[arg(long, default_value = "blocking", global = true)]
    transport: TransportKind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the decision stream.
    DecisionsStream(commands::StreamArgs),
    /// Fetch decisions matching a filter.
    Decisions(commands::FilterArgs),
    /// Push signals read from a JSON file.
    PushSignals(commands::SignalsArgs),
    /// Enroll the watcher on the console.
    Enroll(commands::EnrollArgs),
}

fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let configuration = match &cli.config {
        Some(path) => config::load_from_file(Some(path.clone()))
            .with_context(|| format!("cannot load configuration from {}", path.display()))?,
        None => config::load().context("cannot load configuration")?,
    };

    let location = if cli.keychain {
        StoreLocation::Keychain
    } else {
        StoreLocation::Directory(cli.storage_dir.clone())
    };
    let store = open_credential_store(&configuration, location)?;
    let bouncer = build_bouncer(configuration, cli.transport, store);

    let output = match &cli.command {
        Command::DecisionsStream(args) => commands::decisions_stream(&bouncer, args),
        Command::Decisions(args) => commands::decisions(&bouncer, args),
        Command::PushSignals(args) => commands::push_signals(&bouncer, args),
        Command::Enroll(args) => commands::enroll(&bouncer, args),
    }?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
