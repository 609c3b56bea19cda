//! Console character set (international table) to Unicode and back.
//!
//! Multi-glyph tiles and control codes with no Unicode equivalent map to
//! the Private Use Area at `U+E000 + byte`.

use serde::{Deserialize, Serialize};

pub const TERMINATOR: u8 = 0xFF;
pub const UNKNOWN_BYTE: u8 = 0xAC;
pub const REPLACEMENT: char = '\u{FFFD}';
pub const NEWLINE: u8 = 0xFE;
const PUA_BASE: u32 = 0xE000;

const fn pua(byte: u8) -> char {
    match char::from_u32(PUA_BASE + byte as u32) {
        Some(c) => c,
        None => REPLACEMENT,
    }
}

const fn build_table() -> [char; 256] {
    let mut t = [REPLACEMENT; 256];

    t[0x00] = ' ';
    t[0x01] = 'À';
    t[0x02] = 'Á';
    t[0x03] = 'Â';
    t[0x04] = 'Ç';
    t[0x05] = 'È';
    t[0x06] = 'É';
    t[0x07] = 'Ê';
    t[0x08] = 'Ë';
    t[0x09] = 'Ì';
    t[0x0B] = 'Î';
    t[0x0C] = 'Ï';
    t[0x0D] = 'Ò';
    t[0x0E] = 'Ó';
    t[0x0F] = 'Ô';
    t[0x10] = 'Œ';
    t[0x11] = 'Ù';
    t[0x12] = 'Ú';
    t[0x13] = 'Û';
    t[0x14] = 'Ñ';
    t[0x15] = 'ß';
    t[0x16] = 'à';
    t[0x17] = 'á';
    t[0x19] = 'ç';
    t[0x1A] = 'è';
    t[0x1B] = 'é';
    t[0x1C] = 'ê';
    t[0x1D] = 'ë';
    t[0x1E] = 'ì';
    t[0x20] = 'î';
    t[0x21] = 'ï';
    t[0x22] = 'ò';
    t[0x23] = 'ó';
    t[0x24] = 'ô';
    t[0x25] = 'œ';
    t[0x26] = 'ù';
    t[0x27] = 'ú';
    t[0x28] = 'û';
    t[0x29] = 'ñ';
    t[0x2A] = 'º';
    t[0x2B] = 'ª';
    t[0x2C] = pua(0x2C); // superscript "er"
    t[0x2D] = '&';
    t[0x2E] = '+';
    t[0x34] = pua(0x34); // "Lv"
    t[0x35] = '=';
    t[0x36] = ';';
    t[0x50] = '▯';
    t[0x51] = '¿';
    t[0x52] = '¡';
    // PK, MN, PO, Ké, BL, OC, K
    let mut b = 0x53;
    while b <= 0x59 {
        t[b] = pua(b as u8);
        b += 1;
    }
    t[0x5A] = 'Í';
    t[0x5B] = '%';
    t[0x5C] = '(';
    t[0x5D] = ')';
    t[0x68] = 'â';
    t[0x6F] = 'í';
    t[0x79] = '↑';
    t[0x7A] = '↓';
    t[0x7B] = '←';
    t[0x7C] = '→';
    t[0x84] = 'ᵉ';
    t[0x85] = '<';
    t[0x86] = '>';
    t[0xA0] = pua(0xA0); // superscript "re"

    let mut d = 0;
    while d < 10 {
        t[0xA1 + d] = match char::from_digit(d as u32, 10) {
            Some(c) => c,
            None => REPLACEMENT,
        };
        d += 1;
    }

    t[0xAB] = '!';
    t[0xAC] = '?';
    t[0xAD] = '.';
    t[0xAE] = '-';
    t[0xAF] = '・';
    t[0xB0] = '…';
    t[0xB1] = '“';
    t[0xB2] = '”';
    t[0xB3] = '‘';
    t[0xB4] = '’';
    t[0xB5] = '♂';
    t[0xB6] = '♀';
    t[0xB7] = '$';
    t[0xB8] = ',';
    t[0xB9] = '×';
    t[0xBA] = '/';

    let mut l = 0u8;
    while l < 26 {
        t[0xBB + l as usize] = (b'A' + l) as char;
        t[0xD5 + l as usize] = (b'a' + l) as char;
        l += 1;
    }

    t[0xEF] = '▶';
    t[0xF0] = ':';
    t[0xF1] = 'Ä';
    t[0xF2] = 'Ö';
    t[0xF3] = 'Ü';
    t[0xF4] = 'ä';
    t[0xF5] = 'ö';
    t[0xF6] = 'ü';

    // Control codes: F7-F9 inline arrows, FA/FB scroll and paragraph,
    // FC/FD escape prefixes.
    let mut c = 0xF7;
    while c <= 0xFD {
        t[c] = pua(c as u8);
        c += 1;
    }
    t[NEWLINE as usize] = '\n';

    t
}

pub static DECODE_TABLE: [char; 256] = build_table();

/// A byte or character the table could not represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncodingGap {
    UnmappedByte { position: usize, byte: u8 },
    UnmappedChar { position: usize, ch: char },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextReport<T> {
    pub value: T,
    pub gaps: Vec<EncodingGap>,
}

impl<T> TextReport<T> {
    pub fn is_lossless(&self) -> bool {
        self.gaps.is_empty()
    }
}

pub fn decode_char(byte: u8) -> Option<char> {
    let ch = DECODE_TABLE[byte as usize];
    (ch != REPLACEMENT && byte != TERMINATOR).then_some(ch)
}

pub fn encode_char(ch: char) -> Option<u8> {
    if ch == REPLACEMENT {
        return None;
    }
    DECODE_TABLE
        .iter()
        .position(|&entry| entry == ch)
        .map(|index| index as u8)
}

/// Decodes up to `max_len` bytes, stopping at the terminator.
pub fn decode(bytes: &[u8], max_len: usize) -> String {
    decode_report(bytes, max_len).value
}

pub fn decode_report(bytes: &[u8], max_len: usize) -> TextReport<String> {
    let mut value = String::new();
    let mut gaps = Vec::new();
    for (position, &byte) in bytes.iter().take(max_len).enumerate() {
        if byte == TERMINATOR {
            break;
        }
        match decode_char(byte) {
            Some(ch) => value.push(ch),
            None => {
                gaps.push(EncodingGap::UnmappedByte { position, byte });
                value.push(REPLACEMENT);
            }
        }
    }
    TextReport { value, gaps }
}

/// Encodes into exactly `max_len` bytes, padded with the terminator.
pub fn encode(text: &str, max_len: usize) -> Vec<u8> {
    encode_report(text, max_len).value
}

pub fn encode_report(text: &str, max_len: usize) -> TextReport<Vec<u8>> {
    let mut value = Vec::with_capacity(max_len);
    let mut gaps = Vec::new();
    for (position, ch) in text.chars().take(max_len).enumerate() {
        match encode_char(ch) {
            Some(byte) => value.push(byte),
            None => {
                gaps.push(EncodingGap::UnmappedChar { position, ch });
                value.push(UNKNOWN_BYTE);
            }
        }
    }
    value.resize(max_len, TERMINATOR);
    TextReport { value, gaps }
}
