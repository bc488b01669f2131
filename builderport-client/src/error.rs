use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use std::fmt;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// An `ERROR <code> <b64>` reply. The message stays base64 until asked
/// for, so a mangled payload can never corrupt the integer code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerFailure {
    pub code: i32,
    raw: String,
}

impl ServerFailure {
    pub fn new(code: i32, raw: impl Into<String>) -> Self {
        Self { code, raw: raw.into() }
    }

    /// Decode the message text. Falls back to the raw token when the
    /// payload is not valid base64.
    pub fn message(&self) -> String {
        match B64.decode(&self.raw) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => self.raw.clone(),
        }
    }
}

impl fmt::Display for ServerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server error {}: {}", self.code, self.message())
    }
}

// ClientError is the only error type the client surfaces. Network,
// protocol, and server-reported failures are distinct kinds so callers
// can decide what is retryable.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection-level failure (refused, reset, broken pipe)
    #[error(transparent)]
    Net(#[from] std::io::Error),

    /// Read deadline elapsed with no partial line; the session is
    /// still usable
    #[error("read timed out")]
    Timeout,

    /// Malformed response line, or a command issued in the wrong
    /// session state
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// `ERROR <code> <b64>` reply from the server
    #[error("{0}")]
    Server(ServerFailure),

    /// The session was closed or poisoned by an earlier failure
    #[error("session closed")]
    Closed,
}

impl ClientError {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        ClientError::Protocol(message.into())
    }
}
