//! The 5-byte frame header shared by every message on the wire.

use super::error::CodecError;

/// Size in bytes of the frame header: `seq_num(u16) + msg_type(u8) + total_len(u16)`.
pub const HEADER_LEN: usize = 5;

/// Decoded frame header. `total_len` includes the header itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub seq_num: u16,
    pub msg_type: u8,
    pub total_len: u16,
}

impl Header {
    pub fn decode(buf: &[u8]) -> Result<Header, CodecError> {
        if buf.len() < HEADER_LEN {
            return Err(CodecError::TooShort { have: buf.len() });
        }
        let seq_num = u16::from_le_bytes([buf[0], buf[1]]);
        let msg_type = buf[2];
        let total_len = u16::from_le_bytes([buf[3], buf[4]]);
        if (total_len as usize) < HEADER_LEN {
            return Err(CodecError::LengthUnderrun { total_len });
        }
        Ok(Header {
            seq_num,
            msg_type,
            total_len,
        })
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.seq_num.to_le_bytes());
        out.push(self.msg_type);
        out.extend_from_slice(&self.total_len.to_le_bytes());
    }
}
