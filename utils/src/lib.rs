//! Format bytes for inspection and test vectors.

/// Renders a single byte as two lowercase hexadecimal digits.
#[inline]
pub fn byte_to_hex(byte: u8) -> String {
    format!("{byte:02x}")
}

/// Converts bytes to a hexadecimal string.
pub fn hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes.iter() {
        hex.push_str(&byte_to_hex(*byte));
    }
    hex
}

/// Converts a hexadecimal string to bytes.
pub fn from_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

/// Converts a hexadecimal string to bytes, stripping whitespace and/or a `0x` prefix. Commonly used
/// in testing to encode external test vectors without modification.
pub fn from_hex_formatted(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.replace(['\t', '\n', '\r', ' '], "");
    let res = hex.strip_prefix("0x").unwrap_or(&hex);
    from_hex(res)
}

/// Renders `bytes` as space-separated hex pairs, last byte first, left-padded with `..` up to
/// `width` columns.
///
/// This is the layout used by the bin_prot test vectors: a little-endian value reads as a
/// big-endian number. Returns `None` if `bytes` does not fit in `width` columns.
pub fn hexdump(bytes: &[u8], width: usize) -> Option<String> {
    if bytes.len() > width {
        return None;
    }
    let padding = std::iter::repeat("..".to_string()).take(width - bytes.len());
    let digits = bytes.iter().rev().map(|byte| byte_to_hex(*byte));
    Some(padding.chain(digits).collect::<Vec<_>>().join(" "))
}
