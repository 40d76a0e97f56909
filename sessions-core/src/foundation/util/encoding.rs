use crate::foundation::{Hash32, TrackerError};

pub fn decode_hex(s: &str) -> Result<Vec<u8>, TrackerError> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(|e| e.into())
}

pub fn parse_hex_32bytes(s: &str) -> Result<Hash32, TrackerError> {
    let bytes = decode_hex(s.trim())?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| TrackerError::EncodingError(format!("expected 32 bytes, got {}", bytes.len())))
}

/// Big-endian `u24`, as used by nested signature length prefixes.
pub fn u24_be(value: usize) -> Option<[u8; 3]> {
    if value > 0x00ff_ffff {
        return None;
    }
    let bytes = (value as u32).to_be_bytes();
    Some([bytes[1], bytes[2], bytes[3]])
}
