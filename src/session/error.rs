//! Session-level failures. Every variant here closes the connection.

use crate::wire::CodecError;
use std::fmt;

#[derive(Debug)]
#[non_exhaustive]
pub enum SessionError {
    /// A frame failed to decode; the underlying codec error is preserved
    /// for logging.
    Codec(CodecError),

    /// A message arrived that the session's current state does not
    /// permit — e.g. anything but `'L'` before authentication.
    ProtocolViolation { reason: &'static str },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Codec(e) => write!(f, "codec error: {e}"),
            SessionError::ProtocolViolation { reason } => write!(f, "protocol violation: {reason}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<CodecError> for SessionError {
    fn from(e: CodecError) -> Self {
        SessionError::Codec(e)
    }
}
