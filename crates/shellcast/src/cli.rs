//! Command-line arguments
//!
//! Every run option can also come from the `INPUT_*` variables a CI runner sets for action inputs.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Parser, ValueEnum};
use shellcast_core::EnvEntry;

#[derive(Parser, Debug)]
#[command(name = "shellcast")]
#[command(about = "Run commands on a remote host over SSH and relay their output", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, env = "SHELLCAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Remote host
    #[arg(long, env = "INPUT_HOST")]
    pub host: Option<String>,

    /// SSH port
    #[arg(short, long, env = "INPUT_PORT")]
    pub port: Option<u16>,

    /// Remote user
    #[arg(short, long, env = "INPUT_USER")]
    pub user: Option<String>,

    /// Password, used only when no key is given
    #[arg(long, env = "INPUT_PASS", hide_env_values = true)]
    pub password: Option<String>,

    /// Private key material
    #[arg(long, env = "INPUT_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Private key file
    #[arg(long, env = "INPUT_KEY_PATH")]
    pub key_path: Option<PathBuf>,

    /// Name of a variable holding a base64-encoded private key
    #[arg(long, env = "INPUT_KEY_ENV")]
    pub key_env: Option<String>,

    /// Passphrase for an encrypted key
    #[arg(long, env = "INPUT_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Command to run; repeatable, and each line of a value is a separate command
    #[arg(short = 'c', long = "command", env = "INPUT_COMMAND")]
    pub commands: Vec<String>,

    /// Variable to export before the commands, as KEY=VALUE; repeatable
    #[arg(short = 'e', long = "env", value_parser = parse_env_entry)]
    pub envs: Vec<EnvEntry>,

    /// Also export variables that look like action options
    #[arg(long, env = "INPUT_EXPORT_ACTION_OPTIONS", value_parser = BoolishValueParser::new())]
    pub export_action_options: Option<bool>,

    /// Export this process's environment as well
    #[arg(long, env = "INPUT_FORWARD_ENV", value_parser = BoolishValueParser::new())]
    pub forward_env: Option<bool>,

    /// Seconds allowed for connecting and authenticating
    #[arg(long, env = "INPUT_CONNECT_TIMEOUT")]
    pub connect_timeout: Option<u64>,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, env = "SHELLCAST_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Diagnostic log format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

fn parse_env_entry(raw: &str) -> Result<EnvEntry, String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok(EnvEntry::new(key, value)),
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_entry() {
        assert_eq!(parse_env_entry("A=1").unwrap(), EnvEntry::new("A", "1"));
        assert_eq!(parse_env_entry("A=b=c").unwrap(), EnvEntry::new("A", "b=c"));
        assert_eq!(parse_env_entry("EMPTY=").unwrap(), EnvEntry::new("EMPTY", ""));
        assert!(parse_env_entry("=1").is_err());
        assert!(parse_env_entry("novalue").is_err());
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from([
            "shellcast",
            "--host",
            "example.com",
            "-u",
            "deploy",
            "-c",
            "echo one",
            "-c",
            "echo two",
            "-e",
            "FOO=1",
            "--export-action-options",
            "yes",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.host.as_deref(), Some("example.com"));
        assert_eq!(cli.user.as_deref(), Some("deploy"));
        assert_eq!(cli.commands, vec!["echo one", "echo two"]);
        assert_eq!(cli.envs, vec![EnvEntry::new("FOO", "1")]);
        assert_eq!(cli.export_action_options, Some(true));
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_rejects_bad_env() {
        assert!(Cli::try_parse_from(["shellcast", "-e", "oops"]).is_err());
    }
}
