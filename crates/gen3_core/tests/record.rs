use gen3_core::core_api::CoreErrorCode;
use gen3_core::pk3::fields::{
    EffortValues, IndividualValues, MarkingFlags, Origins, PpUps, Pokerus, Ribbon, RibbonFlags,
    Stat,
};
use gen3_core::pk3::shuffle::SubBlock;
use gen3_core::pk3::cipher::SubstructureCipher;
use gen3_core::pk3::shuffle::DATA_SIZE;
use gen3_core::pk3::{
    ChecksumMismatch, PokemonRecord, RECORD_SIZE, decode_record, decode_record_with,
    encode_record, encode_record_with,
};
use gen3_core::text::EncodingGap;

/// PID 5 stores sub-blocks as Growth, Misc, Condition, Attacks.
fn pid5_record_bytes() -> [u8; RECORD_SIZE] {
    let mut bytes = [0u8; RECORD_SIZE];
    bytes[0..4].copy_from_slice(&5u32.to_le_bytes());
    bytes[4..8].copy_from_slice(&0x1234_5678u32.to_le_bytes());
    bytes[8..18].copy_from_slice(&[0xCA, 0xC3, 0xC5, 0xBB, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    bytes[0x12..0x14].copy_from_slice(&0x0202u16.to_le_bytes());
    bytes[0x14..0x1B].copy_from_slice(&[0xCC, 0xBF, 0xBE, 0xFF, 0xFF, 0xFF, 0xFF]);
    bytes[0x1B] = 0b0000_0101;
    bytes[0x1C..0x1E].copy_from_slice(&0x108Fu16.to_le_bytes());

    // Growth at position 0: species 25.
    bytes[0x20] = 25;
    // Misc at position 1: met location 0x10.
    bytes[0x2C + 1] = 0x10;
    // Condition at position 2: HP EVs 4.
    bytes[0x38] = 4;
    // Attacks at position 3: move 84 with 30 PP.
    bytes[0x44] = 84;
    bytes[0x44 + 8] = 30;
    bytes
}

#[test]
fn pid5_record_decodes_in_canonical_order() {
    let bytes = pid5_record_bytes();
    let record = decode_record(&bytes).expect("record decodes");

    assert_eq!(record.pid(), 5);
    assert_eq!(record.shuffle_index(), 5);
    assert_eq!(record.public_id(), 0x5678);
    assert_eq!(record.secret_id(), 0x1234);
    assert_eq!(record.nickname(), "PIKA");
    assert_eq!(record.ot_name(), "RED");
    assert_eq!(record.language(), 0x0202);
    assert!(record.markings().circle());
    assert!(!record.markings().square());
    assert!(record.markings().triangle());

    assert_eq!(record.species(), 25);
    assert_eq!(record.moves(), [84, 0, 0, 0]);
    assert_eq!(record.move_pp(), [30, 0, 0, 0]);
    assert_eq!(record.evs().hp, 4);
    assert_eq!(record.met_location(), 0x10);
    assert_eq!(record.sub_block(SubBlock::Growth)[0], 25);
    assert_eq!(record.sub_block(SubBlock::Attacks)[0], 84);

    assert_eq!(record.stored_checksum(), 0x108F);
    assert_eq!(record.computed_checksum(), 0x108F);
    assert!(record.checksum_mismatch().is_none());
    assert_eq!(encode_record(&record), bytes);
}

#[test]
fn pid5_record_built_in_memory_survives_encode_and_decode() {
    let ivs = IndividualValues {
        hp: 31,
        atk: 20,
        def: 9,
        spd: 31,
        satk: 0,
        sdef: 17,
    };
    let evs = EffortValues {
        hp: 4,
        atk: 252,
        spd: 252,
        ..EffortValues::default()
    };
    let ribbons = RibbonFlags::default()
        .with(Ribbon::Champion, true)
        .with(Ribbon::Effort, true);

    let mut record = PokemonRecord::new(5, 0x1234_5678);
    record.set_species(25);
    record.set_evs(evs);
    record.set_ivs(ivs).expect("valid ivs");
    record.set_ribbons(ribbons);
    record.set_move(0, 84).expect("move 0");
    record.set_move(3, 98).expect("move 3");

    let bytes = encode_record(&record);
    // PID 5 stores Growth, Misc, Condition, Attacks.
    assert_eq!(u16::from_le_bytes([bytes[0x20], bytes[0x21]]), 25);
    let iv_word = u32::from_le_bytes([bytes[0x30], bytes[0x31], bytes[0x32], bytes[0x33]]);
    assert_eq!(iv_word & 0x1F, 31);
    assert_eq!((iv_word >> 5) & 0x1F, 20);
    assert_eq!(bytes[0x38], 4);
    assert_eq!(u16::from_le_bytes([bytes[0x44], bytes[0x45]]), 84);

    let reread = decode_record(&bytes).expect("decode");
    assert!(reread.checksum_mismatch().is_none());
    assert_eq!(reread.pid(), 5);
    assert_eq!(reread.species(), 25);
    assert_eq!(reread.evs(), evs);
    assert_eq!(reread.ivs(), ivs);
    assert_eq!(reread.iv_word(), record.iv_word());
    assert_eq!(reread.ribbons(), ribbons);
    assert_eq!(reread.moves(), [84, 0, 0, 98]);
}

#[test]
fn bad_checksum_is_reported_but_not_fatal() {
    let mut bytes = pid5_record_bytes();
    bytes[0x1C..0x1E].copy_from_slice(&0xBEEFu16.to_le_bytes());

    let record = decode_record(&bytes).expect("mismatch is non-fatal");
    assert_eq!(
        record.checksum_mismatch(),
        Some(ChecksumMismatch {
            stored: 0xBEEF,
            computed: 0x108F
        })
    );
    assert_eq!(record.species(), 25);
    assert_eq!(encode_record(&record), bytes);
}

#[test]
fn editing_a_field_rewrites_the_checksum() {
    let mut record = decode_record(&pid5_record_bytes()).expect("decode");
    record.set_species(26);
    assert!(record.is_checksum_stale());

    let encoded = encode_record(&record);
    assert_eq!(u16::from_le_bytes([encoded[0x1C], encoded[0x1D]]), 0x1090);
    assert_eq!(encoded[0x20], 26);

    let reread = decode_record(&encoded).expect("decode");
    assert!(reread.checksum_mismatch().is_none());
}

#[test]
fn changing_pid_reorders_blocks_on_encode() {
    let mut record = decode_record(&pid5_record_bytes()).expect("decode");
    record.set_pid(0);
    let encoded = encode_record(&record);

    // Index 0 is Growth, Attacks, Condition, Misc.
    assert_eq!(encoded[0x20], 25);
    assert_eq!(encoded[0x2C], 84);
    assert_eq!(encoded[0x38], 4);
    assert_eq!(encoded[0x44 + 1], 0x10);
    assert_eq!(decode_record(&encoded).expect("decode").species(), 25);
}

#[test]
fn wrong_length_is_rejected() {
    let err = decode_record(&[0u8; 79]).expect_err("short record");
    assert_eq!(err.code, CoreErrorCode::InvalidSize);
    let err = decode_record(&[0u8; 100]).expect_err("party-sized record");
    assert_eq!(err.code, CoreErrorCode::InvalidSize);
}

#[test]
fn iv_word_packs_six_values_and_flags() {
    let mut record = PokemonRecord::new(1, 1);
    record
        .set_ivs(IndividualValues {
            hp: 31,
            atk: 0,
            def: 15,
            spd: 1,
            satk: 2,
            sdef: 30,
        })
        .expect("valid ivs");
    record.set_egg(true);

    let word = record.iv_word().0;
    assert_eq!(word & 0x1F, 31);
    assert_eq!((word >> 10) & 0x1F, 15);
    assert_eq!((word >> 25) & 0x1F, 30);
    assert_eq!(word >> 30, 0b01);
    assert!(record.is_egg());
    assert!(!record.ability_flag());

    record.set_ability_flag(true);
    assert_eq!(record.iv_word().0 >> 30, 0b11);
    assert_eq!(record.iv(Stat::Defense), 15);
}

#[test]
fn out_of_range_values_are_rejected_without_change() {
    let mut record = PokemonRecord::new(1, 1);
    record.set_iv(Stat::Speed, 20).expect("in range");

    let err = record.set_iv(Stat::Speed, 32).expect_err("six bits");
    assert_eq!(err.code, CoreErrorCode::InvalidValue);
    assert_eq!(record.iv(Stat::Speed), 20);

    let err = record
        .set_ivs(IndividualValues {
            hp: 1,
            atk: 40,
            ..IndividualValues::default()
        })
        .expect_err("atk too wide");
    assert_eq!(err.code, CoreErrorCode::InvalidValue);
    assert_eq!(record.iv(Stat::Hp), 0);

    assert_eq!(
        record.set_move(4, 1).expect_err("five moves").code,
        CoreErrorCode::OutOfRange
    );
    assert!(Origins::new(128, false, 0, 0).is_err());
    assert!(Pokerus::new(16, 0).is_err());
    assert!(PpUps::default().with(0, 4).is_err());
}

#[test]
fn origins_and_misc_fields_roundtrip_through_bytes() {
    let mut record = PokemonRecord::new(0x00AB_CDEF, 0x0001_0002);
    record.set_species(280);
    record.set_experience(1_000_000);
    record.set_friendship(70);
    record.set_held_item(13);
    record.set_origins(Origins::new(5, true, 3, 4).expect("origins"));
    record.set_pokerus(Pokerus::new(2, 1).expect("pokerus"));
    record.set_pp_ups(PpUps::default().with(3, 3).expect("pp ups"));
    record.set_evs(EffortValues {
        atk: 252,
        spd: 252,
        hp: 6,
        ..EffortValues::default()
    });
    record.set_ribbons(
        RibbonFlags::default()
            .with(Ribbon::Champion, true)
            .with(Ribbon::World, true),
    );
    record.set_markings(MarkingFlags::default().with_heart(true));

    let reread = decode_record(&encode_record(&record)).expect("decode");
    assert_eq!(reread.species(), 280);
    assert_eq!(reread.experience(), 1_000_000);
    assert_eq!(reread.friendship(), 70);
    assert_eq!(reread.held_item(), 13);

    let origins = reread.origins();
    assert_eq!(origins.0, 5 | 1 << 7 | 3 << 8 | 4 << 12);
    assert_eq!(origins.level_met(), 5);
    assert!(origins.ot_female());
    assert_eq!(origins.game(), 3);
    assert_eq!(origins.ball(), 4);

    assert!(reread.pokerus().is_infected());
    assert_eq!(reread.pokerus().days(), 2);
    assert_eq!(reread.pp_ups().get(3).expect("move 3"), 3);
    assert_eq!(reread.evs().total(), 510);
    assert_eq!(
        reread.ribbons().earned(),
        vec![Ribbon::Champion, Ribbon::World]
    );
    assert!(reread.markings().heart());
    assert!(reread.checksum_mismatch().is_none());
}

#[test]
fn nickname_setter_reports_unmappable_characters() {
    let mut record = PokemonRecord::new(1, 1);
    let gaps = record.set_nickname("Pi\u{4E00}a");
    assert_eq!(
        gaps,
        vec![EncodingGap::UnmappedChar {
            position: 2,
            ch: '\u{4E00}'
        }]
    );
    assert_eq!(
        record.nickname_bytes(),
        &[0xCA, 0xDD, 0xAC, 0xD5, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
    );
    assert_eq!(record.nickname(), "Pi?a");

    assert!(record.set_ot_name("ABCDEFGHIJ").is_empty());
    assert_eq!(record.ot_name(), "ABCDEFG");
}

#[test]
fn empty_slot_is_detected() {
    let record = decode_record(&[0u8; RECORD_SIZE]).expect("decode");
    assert!(record.is_empty());
    assert!(!PokemonRecord::new(1, 0).is_empty());
}

/// Toy keystream: XOR every byte with the low byte of `pid ^ ot_id`.
struct XorCipher;

impl SubstructureCipher for XorCipher {
    fn decrypt(&self, data: &[u8; DATA_SIZE], pid: u32, ot_id: u32) -> [u8; DATA_SIZE] {
        let key = (pid ^ ot_id) as u8;
        data.map(|b| b ^ key)
    }

    fn encrypt(&self, data: &[u8; DATA_SIZE], pid: u32, ot_id: u32) -> [u8; DATA_SIZE] {
        self.decrypt(data, pid, ot_id)
    }
}

#[test]
fn cipher_runs_on_the_shuffled_data_region() {
    let mut record = PokemonRecord::new(0x11, 0x01);
    record.set_species(25);

    let plain = encode_record(&record);
    let sealed = encode_record_with(&record, &XorCipher);
    assert_eq!(&sealed[..0x20], &plain[..0x20]);
    for (s, p) in sealed[0x20..].iter().zip(&plain[0x20..]) {
        assert_eq!(s ^ p, 0x10);
    }

    let opened = decode_record_with(&sealed, &XorCipher).expect("decode");
    assert_eq!(opened.species(), 25);
    assert!(opened.checksum_mismatch().is_none());
}
