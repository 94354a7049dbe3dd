pub mod disasm;
pub mod run;

/// Decodes a hex string, tolerating a `0x` prefix and surrounding
/// whitespace.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let input = input.trim();
    hex::decode(input.strip_prefix("0x").unwrap_or(input))
}
