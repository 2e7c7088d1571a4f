//! Password authentication against a remote login service.
//!
//! The engine only cares whether a login succeeded. [`Authenticator`] is the
//! seam between the scanner and the wire protocol; [`SshAuthenticator`] is the
//! production implementation on top of `ssh2`.

use crate::types::Endpoint;
use async_trait::async_trait;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};
use thiserror::Error;

/// One login attempt as handed to an [`Authenticator`].
#[derive(Debug, Clone)]
pub struct AuthRequest<'a> {
    pub endpoint: &'a Endpoint,
    pub user: &'a str,
    pub password: &'a str,
    pub timeout: Duration,
    /// Whether the server's host key must be checked. The scanner always
    /// passes `false`.
    pub verify_host_identity: bool,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid address {0}")]
    Address(String),
    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("authentication rejected")]
    Rejected,
    #[error("host key verification is not supported")]
    HostIdentity,
    #[error("login task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `Ok(())` when the credentials open an authenticated session. Any
    /// session resources are released before returning.
    async fn authenticate(&self, req: &AuthRequest<'_>) -> Result<(), AuthError>;
}

/// Password login over SSH using libssh2.
///
/// Host keys are never checked, which suits lab and operator-owned hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshAuthenticator;

#[async_trait]
impl Authenticator for SshAuthenticator {
    async fn authenticate(&self, req: &AuthRequest<'_>) -> Result<(), AuthError> {
        if req.verify_host_identity {
            return Err(AuthError::HostIdentity);
        }
        let port = req
            .endpoint
            .port_number()
            .ok_or_else(|| AuthError::Address(req.endpoint.to_string()))?;
        let address = req.endpoint.address.clone();
        let user = req.user.to_string();
        let password = req.password.to_string();
        let timeout = req.timeout;

        tokio::task::spawn_blocking(move || ssh_login(&address, port, &user, &password, timeout))
            .await
            .map_err(|e| AuthError::Task(e.to_string()))?
    }
}

fn ssh_login(
    address: &str,
    port: u16,
    user: &str,
    password: &str,
    timeout: Duration,
) -> Result<(), AuthError> {
    let deadline = Instant::now() + timeout;
    let addr = resolve(address, port)?;
    let tcp = TcpStream::connect_timeout(&addr, timeout).map_err(|e| {
        if e.kind() == std::io::ErrorKind::TimedOut {
            AuthError::Timeout(timeout)
        } else {
            AuthError::Connect(e)
        }
    })?;
    let remaining = deadline
        .checked_duration_since(Instant::now())
        .filter(|d| !d.is_zero())
        .ok_or(AuthError::Timeout(timeout))?;
    tcp.set_read_timeout(Some(remaining)).map_err(AuthError::Connect)?;
    tcp.set_write_timeout(Some(remaining)).map_err(AuthError::Connect)?;

    let mut session = ssh2::Session::new().map_err(|e| AuthError::Handshake(e.to_string()))?;
    session.set_timeout(u32::try_from(remaining.as_millis()).unwrap_or(u32::MAX));
    session.set_tcp_stream(tcp);
    session
        .handshake()
        .map_err(|e| AuthError::Handshake(e.to_string()))?;

    let result = match session.userauth_password(user, password) {
        Ok(()) if session.authenticated() => Ok(()),
        _ => Err(AuthError::Rejected),
    };
    let _ = session.disconnect(None, "bye", None);
    result
}

fn resolve(address: &str, port: u16) -> Result<SocketAddr, AuthError> {
    (address, port)
        .to_socket_addrs()
        .map_err(|_| AuthError::Address(format!("{address}:{port}")))?
        .next()
        .ok_or_else(|| AuthError::Address(format!("{address}:{port}")))
}
