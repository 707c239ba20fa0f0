//! Configuration types for a single run

use serde::{Deserialize, Serialize};
use shellcast_exec::ConnectionInfo;

/// Substrings that mark a variable as an action option.
///
/// Every action input reaches the process as `INPUT_<NAME>`.
pub const DEFAULT_IGNORED_ENVS: &[&str] = &["INPUT_"];

/// One environment variable assignment to export remotely
///
/// Keys are not deduplicated; order is kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvEntry {
    pub key: String,
    pub value: String,
}

impl EnvEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Which entries may be exported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPolicy {
    /// Export everything, including entries matching the denylist
    pub export_action_options: bool,
    /// Case-insensitive substrings excluding a key when `export_action_options` is off
    pub denylist: Vec<String>,
}

impl ExportPolicy {
    /// Policy with the default denylist
    #[must_use]
    pub fn new(export_action_options: bool) -> Self {
        Self {
            export_action_options,
            denylist: DEFAULT_IGNORED_ENVS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Replace the denylist
    #[must_use]
    pub fn with_denylist<I, S>(mut self, denylist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.denylist = denylist.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for ExportPolicy {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Everything one invocation needs
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Where and how to connect
    pub connection: ConnectionInfo,
    /// Commands run in order inside one remote invocation
    pub commands: Vec<String>,
    /// Variables exported before the commands
    pub envs: Vec<EnvEntry>,
    /// Filter applied to `envs`
    pub policy: ExportPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = ExportPolicy::default();
        assert!(!policy.export_action_options);
        assert_eq!(policy.denylist, vec!["INPUT_".to_string()]);
    }

    #[test]
    fn test_with_denylist() {
        let policy = ExportPolicy::new(true).with_denylist(["secret", "token"]);
        assert!(policy.export_action_options);
        assert_eq!(policy.denylist, vec!["secret", "token"]);
    }

    #[test]
    fn test_env_entries_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            env: Vec<EnvEntry>,
        }

        let doc: Doc = toml::from_str(
            r#"
            [[env]]
            key = "FOO"
            value = "1"

            [[env]]
            key = "FOO"
            value = "2"
            "#,
        )
        .unwrap();

        assert_eq!(doc.env, vec![EnvEntry::new("FOO", "1"), EnvEntry::new("FOO", "2")]);
    }
}
