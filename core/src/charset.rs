//! Fixed alphabet shared by transmitter and receiver.
//!
//! Symbol `i` of [`CHAR_SET`] travels as code `i + 1`; code 0 is never sent.
//! The table is part of the wire format: reordering or extending it breaks
//! interoperability with existing receivers.

/// Protocol alphabet in code order (code = index + 1).
pub const CHAR_SET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789 !@#$%^&*()-_=+[]{};:',.<>/?\n";

/// Number of symbols in [`CHAR_SET`]
pub const CHAR_COUNT: usize = 91;

/// Code sent in place of characters outside the alphabet
pub const PLACEHOLDER_CODE: u8 = 63;

const CHAR_TABLE: [u8; CHAR_COUNT] = {
    let bytes = CHAR_SET.as_bytes();
    let mut table = [0u8; CHAR_COUNT];
    let mut i = 0;
    while i < CHAR_COUNT {
        table[i] = bytes[i];
        i += 1;
    }
    table
};

/// Map a character to its wire code, substituting [`PLACEHOLDER_CODE`]
/// for anything outside the alphabet.
pub fn encode_char(c: char) -> u8 {
    if !c.is_ascii() {
        return PLACEHOLDER_CODE;
    }
    let byte = c as u8;
    CHAR_TABLE
        .iter()
        .position(|&b| b == byte)
        .map(|idx| idx as u8 + 1)
        .unwrap_or(PLACEHOLDER_CODE)
}

/// Map a wire code back to its character.
///
/// Returns `None` for 0 and for anything above the alphabet, which covers the
/// SYNC/EOT markers, zero padding and bit-error garbage.
pub fn decode_code(code: u8) -> Option<char> {
    let idx = (code as usize).checked_sub(1)?;
    CHAR_TABLE.get(idx).map(|&b| b as char)
}

/// Character a receiver reports for unmapped input.
pub fn placeholder_char() -> char {
    // PLACEHOLDER_CODE is inside the table
    CHAR_TABLE[PLACEHOLDER_CODE as usize - 1] as char
}

/// True when `c` survives transmission unchanged.
pub fn is_supported(c: char) -> bool {
    c.is_ascii() && CHAR_TABLE.contains(&(c as u8))
}
