use crate::error::{DumpError, Result};

/// Appends one dump line for `bytes` to `out`: every byte as two uppercase
/// hex digits followed by a space, then a newline.
pub fn encode_line(bytes: &[u8], out: &mut Vec<u8>) {
    let digits = hex::encode_upper(bytes);
    out.reserve(digits.len() + bytes.len() + 1);
    for pair in digits.as_bytes().chunks(2) {
        out.extend_from_slice(pair);
        out.push(b' ');
    }
    out.push(b'\n');
}

/// Reconstructs the bytes of a text dump. Whitespace is ignored; digits may
/// be either case. Error offsets count hex digits, not raw characters.
pub fn decode_dump(text: &str) -> Result<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    hex::decode(&digits).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, index } => DumpError::InvalidHex {
            offset: index,
            message: format!("unexpected character {:?}", c),
        },
        hex::FromHexError::OddLength => DumpError::InvalidHex {
            offset: digits.len().saturating_sub(1),
            message: "dangling hex digit".to_string(),
        },
        other => DumpError::InvalidHex {
            offset: 0,
            message: other.to_string(),
        },
    })
}
