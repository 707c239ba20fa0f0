//! shellcast
//!
//! Runs a batch of commands on a remote host over SSH with exported environment
//! variables and relays stdout/stderr as `out:` / `err:` log lines

use clap::Parser;
use color_eyre::Result;
use shellcast_core::{ConsoleSink, LogSink, Orchestrator};
use shellcast_exec::SshShell;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;

use cli::{Cli, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    let sink = ConsoleSink::stdout();

    let run_config = match config::load_file(&cli)
        .and_then(|file| config::resolve(&cli, file, process_env()))
    {
        Ok(run_config) => run_config,
        Err(e) => {
            sink.fail(&format!("{e:#}"));
            std::process::exit(1);
        }
    };

    let mut shell = SshShell::new();
    let status = Orchestrator::new(&sink)
        .run(&mut shell, &run_config)
        .await;

    if !status.success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Diagnostics go to stderr so stdout carries only the relayed log lines
fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Process environment, skipping entries that are not valid UTF-8
fn process_env() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}
