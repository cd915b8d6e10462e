//! Codec-level failures. Every variant here corresponds to a protocol
//! error that §7 of the protocol spec says must close the session.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecError {
    /// Fewer than [`super::HEADER_LEN`] bytes are available to even read
    /// a header. Not fatal on its own — the caller should wait for more
    /// bytes — but surfaced as an error so partial reads of the header
    /// itself are distinguishable from a decoded `NeedMore` body.
    TooShort { have: usize },

    /// The header declared `total_len` smaller than the header itself.
    LengthUnderrun { total_len: u16 },

    /// The header's `total_len` exceeds the session's safety cap.
    FrameTooLarge { total_len: u16, max: usize },

    /// The body length implied by `total_len` does not match the fixed
    /// schema for this `msg_type`.
    BodyLengthMismatch {
        msg_type: u8,
        expected: u16,
        actual: u16,
    },

    /// A field with an enumerated domain (side, order type) carried a
    /// byte outside that domain.
    InvalidFieldValue { msg_type: u8, field: &'static str, value: u8 },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::TooShort { have } => {
                write!(f, "buffer too short to decode a header: {have} bytes")
            }
            CodecError::LengthUnderrun { total_len } => {
                write!(f, "declared total_len {total_len} is smaller than the header")
            }
            CodecError::FrameTooLarge { total_len, max } => {
                write!(f, "frame of {total_len} bytes exceeds the {max}-byte cap")
            }
            CodecError::BodyLengthMismatch {
                msg_type,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "message type {:#04x} expected total_len {expected}, got {actual}",
                    msg_type
                )
            }
            CodecError::InvalidFieldValue {
                msg_type,
                field,
                value,
            } => {
                write!(
                    f,
                    "message type {msg_type:#04x} field '{field}' has invalid value {value}"
                )
            }
        }
    }
}

impl std::error::Error for CodecError {}
