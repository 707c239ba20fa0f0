//! SSH command execution using russh crate

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use russh::keys::ssh_key;
use russh::keys::{PrivateKeyWithHashAlg, decode_secret_key};
use russh::{ChannelMsg, Disconnect, client};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::error::ExecError;
use crate::result::{ConnectionInfo, Credential, StreamKind};
use crate::traits::{OutputHandler, RemoteShell};

/// Extended data type code for stderr (RFC 4254 section 5.2)
const SSH_EXTENDED_DATA_STDERR: u32 = 1;

/// SSH client handler for russh
#[derive(Debug)]
struct SshClientHandler;

impl client::Handler for SshClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &ssh_key::PublicKey,
    ) -> Result<bool, Self::Error> {
        // Accept all server keys (like StrictHostKeyChecking=no)
        Ok(true)
    }
}

/// SSH remote shell
///
/// Holds at most one authenticated session. Every `execute` call opens a fresh
/// session channel on it.
#[derive(Default)]
pub struct SshShell {
    /// Host the session belongs to, for logging
    host: Option<String>,
    session: Option<client::Handle<SshClientHandler>>,
}

impl std::fmt::Debug for SshShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshShell")
            .field("host", &self.host)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl SshShell {
    /// Create a disconnected shell
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn authenticate(
        session: &mut client::Handle<SshClientHandler>,
        user: &str,
        credential: &Credential,
    ) -> Result<(), ExecError> {
        match credential {
            Credential::Password(password) => {
                let auth_res = session
                    .authenticate_password(user, password)
                    .await
                    .map_err(|e| ExecError::AuthenticationFailed(e.to_string()))?;

                if !auth_res.success() {
                    return Err(ExecError::AuthenticationFailed(
                        "Password authentication failed".to_string(),
                    ));
                }
            }
            Credential::PrivateKey {
                key_data,
                passphrase,
            } => {
                let key_pair = decode_secret_key(key_data, passphrase.as_deref())
                    .map_err(|e| ExecError::SshKeyError(e.to_string()))?;

                let hash_alg = session
                    .best_supported_rsa_hash()
                    .await
                    .ok()
                    .flatten()
                    .flatten();
                let auth_res = session
                    .authenticate_publickey(
                        user,
                        PrivateKeyWithHashAlg::new(Arc::new(key_pair), hash_alg),
                    )
                    .await
                    .map_err(|e| ExecError::AuthenticationFailed(e.to_string()))?;

                if !auth_res.success() {
                    return Err(ExecError::AuthenticationFailed(
                        "Public key authentication failed".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteShell for SshShell {
    #[instrument(skip(self, info), fields(host = %info.host, port = info.port))]
    async fn connect(&mut self, info: &ConnectionInfo) -> Result<(), ExecError> {
        if self.session.is_some() {
            return Ok(());
        }

        info!(
            host = %info.host,
            port = info.port,
            user = %info.user,
            method = info.credential.method(),
            "connecting to SSH"
        );

        let config = Arc::new(client::Config::default());

        // connect_timeout bounds the handshake and authentication together
        let handshake = async {
            let mut session =
                client::connect(config, (&info.host[..], info.port), SshClientHandler)
                    .await
                    .map_err(|e| ExecError::ConnectionFailed(e.to_string()))?;
            Self::authenticate(&mut session, &info.user, &info.credential).await?;
            Ok::<_, ExecError>(session)
        };
        let session = timeout(info.connect_timeout, handshake)
            .await
            .map_err(|_| ExecError::Timeout {
                timeout: info.connect_timeout,
            })??;

        info!(host = %info.host, "SSH connected and authenticated");

        self.host = Some(info.host.clone());
        self.session = Some(session);
        Ok(())
    }

    #[instrument(skip_all, fields(host = ?self.host))]
    async fn execute(
        &mut self,
        statement: &str,
        output: &mut dyn OutputHandler,
    ) -> Result<(), ExecError> {
        let session = self.session.as_mut().ok_or(ExecError::NotConnected)?;

        debug!(command = %statement, "executing remote command");

        let start = Instant::now();

        let mut channel = session
            .channel_open_session()
            .await
            .map_err(|e| ExecError::IoError(e.to_string()))?;

        channel
            .exec(true, statement)
            .await
            .map_err(|e| ExecError::IoError(e.to_string()))?;

        let mut exit_status = None;
        let mut exit_signal = None;

        // Exit status may arrive before the last data, so read until the channel closes
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => {
                    output.on_output(StreamKind::Stdout, data)?;
                }
                ChannelMsg::ExtendedData { ref data, ext } => {
                    if ext == SSH_EXTENDED_DATA_STDERR {
                        output.on_output(StreamKind::Stderr, data)?;
                    }
                }
                ChannelMsg::ExitStatus { exit_status: status } => {
                    exit_status = Some(status);
                }
                ChannelMsg::ExitSignal { signal_name, .. } => {
                    exit_signal = Some(format!("{signal_name:?}"));
                }
                _ => {}
            }
        }

        debug!(
            status = ?exit_status,
            signal = ?exit_signal,
            duration = ?start.elapsed(),
            "remote command completed"
        );

        match (exit_status, exit_signal) {
            (Some(0), _) => Ok(()),
            (Some(status), _) => Err(ExecError::CommandFailed { status }),
            (None, Some(signal)) => Err(ExecError::Signalled { signal }),
            (None, None) => {
                warn!("channel closed without an exit status");
                Ok(())
            }
        }
    }

    async fn dispose(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session
                .disconnect(Disconnect::ByApplication, "", "English")
                .await
            {
                warn!(error = %e, "SSH disconnect failed");
            }
            info!(host = ?self.host, "SSH disconnected");
        }
    }

    fn is_connected(&self) -> bool {
        self.session.is_some()
    }
}
