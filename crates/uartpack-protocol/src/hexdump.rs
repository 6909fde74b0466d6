//! Hex dump helpers for protocol traces.

use crate::error::CodecResult;

/// Format bytes as upper-case hex without separators.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Parse a hex dump. Whitespace between byte pairs, including line breaks,
/// is ignored.
pub fn from_hex(text: &str) -> CodecResult<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(hex::decode(digits)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    #[test]
    fn test_multiline_dump() {
        let bytes = from_hex("82 a3 72 69 64 01\n  a4 72656164 81 cdbf69 01\r\n").unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(to_hex(&bytes[..6]), "82A372696401");
    }

    #[test]
    fn test_odd_length_is_rejected() {
        assert!(matches!(from_hex("82a"), Err(CodecError::InvalidHex(_))));
    }
}
