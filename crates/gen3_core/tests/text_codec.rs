use gen3_core::text::{
    DECODE_TABLE, EncodingGap, REPLACEMENT, TERMINATOR, UNKNOWN_BYTE, decode, decode_char,
    decode_report, encode, encode_char, encode_report,
};
use quickcheck_macros::quickcheck;

#[test]
fn nickname_encodes_to_console_bytes() {
    assert_eq!(
        encode("PIKA", 10),
        vec![0xCA, 0xC3, 0xC5, 0xBB, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
    );
    assert_eq!(encode("Ab 09!?", 7), vec![0xBB, 0xD6, 0x00, 0xA1, 0xAA, 0xAB, 0xAC]);
}

#[test]
fn decode_stops_at_terminator_and_limit() {
    assert_eq!(decode(&[0xCA, 0xC3, 0xFF, 0xC5], 10), "PI");
    assert_eq!(decode(&[0xCA, 0xC3, 0xC5, 0xBB], 2), "PI");
    assert_eq!(decode(&[], 10), "");
    assert_eq!(decode(&[TERMINATOR; 10], 10), "");
}

#[test]
fn encode_truncates_to_field_width() {
    let bytes = encode("ABCDEFGHIJKL", 10);
    assert_eq!(bytes.len(), 10);
    assert_eq!(decode(&bytes, 10), "ABCDEFGHIJ");
}

#[test]
fn unmapped_bytes_decode_to_replacement_with_report() {
    let report = decode_report(&[0xBB, 0x0A, 0xBC], 3);
    assert_eq!(report.value, format!("A{REPLACEMENT}B"));
    assert_eq!(
        report.gaps,
        vec![EncodingGap::UnmappedByte {
            position: 1,
            byte: 0x0A
        }]
    );
    assert!(!report.is_lossless());
}

#[test]
fn unmapped_characters_encode_to_question_mark() {
    let report = encode_report("a\u{263A}", 4);
    assert_eq!(report.value, vec![0xD5, UNKNOWN_BYTE, 0xFF, 0xFF]);
    assert_eq!(
        report.gaps,
        vec![EncodingGap::UnmappedChar {
            position: 1,
            ch: '\u{263A}'
        }]
    );
    assert_eq!(encode_char(REPLACEMENT), None);
}

#[test]
fn symbols_and_special_glyphs() {
    assert_eq!(decode_char(0xF1), Some('Ä'));
    assert_eq!(decode_char(0xB7), Some('$'));
    assert_eq!(decode_char(0xB5), Some('♂'));
    assert_eq!(decode_char(0xFE), Some('\n'));
    assert_eq!(decode_char(TERMINATOR), None);
    assert_eq!(encode_char('é'), Some(0x1B));
    assert_eq!(encode_char('\n'), Some(0xFE));
}

#[test]
fn multi_glyph_tiles_use_private_use_code_points() {
    for byte in [0x53u8, 0x54, 0x59, 0x2C, 0xA0, 0xFC] {
        let ch = decode_char(byte).expect("mapped tile");
        assert_eq!(ch as u32, 0xE000 + byte as u32);
        assert_eq!(encode_char(ch), Some(byte));
    }
}

#[test]
fn every_mapped_byte_round_trips() {
    for (byte, &ch) in DECODE_TABLE.iter().enumerate() {
        if ch == REPLACEMENT {
            continue;
        }
        assert_eq!(encode_char(ch), Some(byte as u8), "byte {byte:#04X}");
    }
}

#[quickcheck]
fn representable_text_round_trips(input: String) -> bool {
    let text: String = input
        .chars()
        .filter(|&c| encode_char(c).is_some())
        .take(10)
        .collect();
    decode(&encode(&text, 10), 10) == text
}

#[quickcheck]
fn canonical_bytes_round_trip(input: Vec<u8>) -> bool {
    let mut bytes: Vec<u8> = input
        .into_iter()
        .filter(|&b| decode_char(b).is_some())
        .take(10)
        .collect();
    bytes.resize(10, TERMINATOR);
    encode(&decode(&bytes, 10), 10) == bytes
}
