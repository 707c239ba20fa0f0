//! Connection and output types shared by transports

use std::fmt;
use std::time::Duration;

/// Default SSH port
pub const DEFAULT_PORT: u16 = 22;

/// Default time allowed for TCP connect plus handshake
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Credential presented to the remote host
#[derive(Clone)]
pub enum Credential {
    /// Private key material (PEM / OpenSSH format)
    PrivateKey {
        /// Key text
        key_data: String,
        /// Optional passphrase for encrypted keys
        passphrase: Option<String>,
    },
    /// Password authentication
    Password(String),
}

impl Credential {
    /// Pick a credential, preferring key material over a password
    ///
    /// Returns `None` when neither is available.
    #[must_use]
    pub fn select(
        key: Option<String>,
        passphrase: Option<String>,
        password: Option<String>,
    ) -> Option<Self> {
        match (key, password) {
            (Some(key_data), _) => Some(Credential::PrivateKey {
                key_data,
                passphrase,
            }),
            (None, Some(password)) => Some(Credential::Password(password)),
            (None, None) => None,
        }
    }

    /// Short name of the authentication method, safe to log
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Credential::PrivateKey { .. } => "publickey",
            Credential::Password(_) => "password",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::PrivateKey { passphrase, .. } => f
                .debug_struct("PrivateKey")
                .field("key_data", &"<redacted>")
                .field("passphrase", &passphrase.as_ref().map(|_| "<redacted>"))
                .finish(),
            Credential::Password(_) => f.debug_tuple("Password").field(&"<redacted>").finish(),
        }
    }
}

/// Connection information for SSH
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Host address
    pub host: String,
    /// Port (default 22)
    pub port: u16,
    /// Username
    pub user: String,
    /// Authentication credential
    pub credential: Credential,
    /// Limit on connect plus handshake
    pub connect_timeout: Duration,
}

impl ConnectionInfo {
    /// Create new connection info
    pub fn new(host: impl Into<String>, user: impl Into<String>, credential: Credential) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            user: user.into(),
            credential,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set custom port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set connect timeout
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Remote output stream a chunk belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    /// Tag written in front of every relayed line
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            StreamKind::Stdout => "out",
            StreamKind::Stderr => "err",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_takes_precedence() {
        let cred = Credential::select(
            Some("PEM".to_string()),
            None,
            Some("hunter2".to_string()),
        )
        .unwrap();
        assert!(matches!(cred, Credential::PrivateKey { ref key_data, .. } if key_data == "PEM"));
    }

    #[test]
    fn test_password_fallback() {
        let cred = Credential::select(None, None, Some("hunter2".to_string())).unwrap();
        assert_eq!(cred.method(), "password");
        assert!(Credential::select(None, None, None).is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let cred = Credential::select(
            Some("-----BEGIN KEY-----".to_string()),
            Some("phrase".to_string()),
            None,
        )
        .unwrap();
        let printed = format!("{cred:?}");
        assert!(!printed.contains("BEGIN"));
        assert!(!printed.contains("phrase"));

        let printed = format!("{:?}", Credential::Password("hunter2".to_string()));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_connection_info_defaults() {
        let info = ConnectionInfo::new("h", "u", Credential::Password("p".to_string()));
        assert_eq!(info.port, 22);
        assert_eq!(info.connect_timeout, DEFAULT_CONNECT_TIMEOUT);

        let info = info
            .with_port(2222)
            .with_connect_timeout(Duration::from_secs(3));
        assert_eq!(info.port, 2222);
        assert_eq!(info.connect_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_stream_tags() {
        assert_eq!(StreamKind::Stdout.tag(), "out");
        assert_eq!(StreamKind::Stderr.tag(), "err");
        assert_eq!(StreamKind::Stderr.to_string(), "stderr");
    }
}
