//! Configuration loading and resolution
//!
//! Values from the command line (or `INPUT_*` variables) override the TOML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{WrapErr, bail, eyre};
use serde::Deserialize;
use shellcast_core::{EnvEntry, ExportPolicy, RunConfig};
use shellcast_exec::result::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT};
use shellcast_exec::{ConnectionInfo, Credential, KeySource};
use tracing::debug;

use crate::cli::Cli;

/// Contents of a shellcast TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub key: Option<String>,
    pub key_path: Option<PathBuf>,
    pub key_env: Option<String>,
    pub passphrase: Option<String>,
    /// Commands run in order
    pub command: Vec<String>,
    /// `[[env]]` tables
    #[serde(rename = "env")]
    pub envs: Vec<EnvEntry>,
    pub export_action_options: Option<bool>,
    pub forward_env: Option<bool>,
    /// Denylist replacing the default `INPUT_`
    pub ignored_envs: Option<Vec<String>>,
    /// Seconds
    pub connect_timeout: Option<u64>,
}

impl FileConfig {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let config: FileConfig = toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }
}

/// Load the file named by `--config`, if any
///
/// # Errors
/// Returns error if the file cannot be read or parsed
pub fn load_file(cli: &Cli) -> eyre::Result<FileConfig> {
    match &cli.config {
        Some(path) => FileConfig::load(path),
        None => Ok(FileConfig::default()),
    }
}

/// Merge command line, file and process environment into a `RunConfig`
///
/// # Errors
/// Returns error if host, user, commands or a credential are missing, or a key cannot be resolved
pub fn resolve<I>(cli: &Cli, file: FileConfig, process_env: I) -> eyre::Result<RunConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    let host = cli
        .host
        .clone()
        .or(file.host)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| eyre!("no host given"))?;
    let user = cli
        .user
        .clone()
        .or(file.user)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| eyre!("no user given"))?;
    let port = cli.port.or(file.port).unwrap_or(DEFAULT_PORT);

    let key_source = if let Some(key) = cli.key.clone().or(file.key).filter(|k| !k.is_empty()) {
        Some(KeySource::Inline(key))
    } else if let Some(path) = cli.key_path.clone().or(file.key_path) {
        Some(KeySource::Path(path))
    } else {
        cli.key_env.clone().or(file.key_env).map(KeySource::Env)
    };
    let key = key_source
        .map(|source| source.resolve().wrap_err("failed to load private key"))
        .transpose()?;

    let password = cli.password.clone().or(file.password).filter(|p| !p.is_empty());
    let passphrase = cli.passphrase.clone().or(file.passphrase).filter(|p| !p.is_empty());
    let Some(credential) = Credential::select(key, passphrase, password) else {
        bail!("no credential given: set a key or a password");
    };

    let connect_timeout = cli
        .connect_timeout
        .or(file.connect_timeout)
        .map_or(DEFAULT_CONNECT_TIMEOUT, Duration::from_secs);

    let commands = if cli.commands.is_empty() {
        split_commands(&file.command)
    } else {
        split_commands(&cli.commands)
    };
    if commands.is_empty() {
        bail!("no commands given");
    }

    let mut envs = file.envs;
    envs.extend(cli.envs.iter().cloned());
    if cli.forward_env.or(file.forward_env).unwrap_or(false) {
        envs.extend(process_env.into_iter().map(|(k, v)| EnvEntry::new(k, v)));
    }

    let mut policy = ExportPolicy::new(
        cli.export_action_options
            .or(file.export_action_options)
            .unwrap_or(false),
    );
    if let Some(denylist) = file.ignored_envs {
        policy = policy.with_denylist(denylist);
    }

    debug!(
        host = %host,
        port,
        user = %user,
        method = credential.method(),
        commands = commands.len(),
        envs = envs.len(),
        "resolved configuration"
    );

    Ok(RunConfig {
        connection: ConnectionInfo::new(host, user, credential)
            .with_port(port)
            .with_connect_timeout(connect_timeout),
        commands,
        envs,
        policy,
    })
}

/// One command per non-blank line of each value
fn split_commands(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.lines())
        .filter(|line| !line.trim().is_empty())
        .map(ToString::to_string)
        .collect()
}
