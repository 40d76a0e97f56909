pub mod encoding;
pub mod hex_fmt;
