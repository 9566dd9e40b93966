use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use lapi_core::Bouncer;
use lapi_domain::constants::{SCOPE_IP, SCOPE_RANGE};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Ask for the full decision list instead of the delta.
    #[arg(long)]
    pub startup: bool,
    /// Query filter as a JSON object (default: ip and range scopes).
    #[arg(long, value_parser = parse_filter)]
    pub filter: Option<Map<String, Value>>,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Query filter as a JSON object, e.g. `{"ip": "1.2.3.4"}`.
    #[arg(long, value_parser = parse_filter)]
    pub filter: Option<Map<String, Value>>,
}

#[derive(Args, Debug)]
pub struct SignalsArgs {
    /// File holding a JSON array of signals (a single object is accepted).
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct EnrollArgs {
    /// Name shown on the console.
    #[arg(long)]
    pub name: String,
    /// Enrollment key from the console.
    #[arg(long, env = "LAPI_ATTACHMENT_KEY", hide_env_values = true)]
    pub attachment_key: String,
    /// Replace an existing enrollment.
    #[arg(long)]
    pub overwrite: bool,
    /// Tag to attach; repeatable.
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

pub fn decisions_stream(bouncer: &Bouncer, args: &StreamArgs) -> anyhow::Result<Value> {
    let filter = args.filter.clone().unwrap_or_else(default_stream_filter);
    Ok(bouncer.get_stream_decisions(args.startup, filter)?)
}

pub fn decisions(bouncer: &Bouncer, args: &FilterArgs) -> anyhow::Result<Value> {
    Ok(bouncer.get_filtered_decisions(args.filter.clone().unwrap_or_default())?)
}

pub fn push_signals(bouncer: &Bouncer, args: &SignalsArgs) -> anyhow::Result<Value> {
    let signals = read_signals(&args.file)?;
    debug!(count = signals.len(), file = %args.file.display(), "pushing signals");
    Ok(bouncer.push_signals(&signals)?)
}

pub fn enroll(bouncer: &Bouncer, args: &EnrollArgs) -> anyhow::Result<Value> {
    let tags: Vec<Value> = args.tags.iter().cloned().map(Value::String).collect();
    Ok(bouncer.enroll(&args.name, args.overwrite, &args.attachment_key, &tags)?)
}

/// `--filter` parser; anything but a JSON object is a usage error.
pub fn parse_filter(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(filter)) => Ok(filter),
        Ok(other) => Err(format!(
            "filter must be a JSON object, {} given",
            lapi_domain::json_type_name(&other)
        )),
        Err(e) => Err(format!("filter is not valid JSON: {e}")),
    }
}

fn default_stream_filter() -> Map<String, Value> {
    let mut filter = Map::new();
    filter.insert(
        "scopes".into(),
        Value::Array(vec![Value::String(SCOPE_IP.into()), Value::String(SCOPE_RANGE.into())]),
    );
    filter
}

fn read_signals(path: &Path) -> anyhow::Result<Vec<Value>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read signals from {}", path.display()))?;
    let document: Value = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    match document {
        Value::Array(signals) => Ok(signals),
        signal @ Value::Object(_) => Ok(vec![signal]),
        other => anyhow::bail!(
            "{} must hold a JSON array of signals, {} given",
            path.display(),
            lapi_domain::json_type_name(&other)
        ),
    }
}
