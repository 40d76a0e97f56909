use crate::foundation::Hash32;
use std::fmt;

/// Hex formatter for 32-byte hashes.
///
/// - `Display` (`{}`) prints lowercase hex without `0x` prefix.
/// - `LowerHex` with alternate form (`{:#x}`) prints lowercase hex with `0x` prefix.
#[derive(Clone, Copy)]
pub struct Hex32<'a>(pub &'a Hash32);

pub fn hx32(bytes: &Hash32) -> Hex32<'_> {
    Hex32(bytes)
}

impl fmt::Display for Hex32<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl fmt::LowerHex for Hex32<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        f.write_str(&hex::encode(self.0))
    }
}
