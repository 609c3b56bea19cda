//! The 80-byte box record: a plaintext header followed by four 12-byte
//! sub-blocks stored in PID-dependent order.

pub mod cipher;
pub mod fields;
pub mod shuffle;

use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::reader::{LittleEndianReader, patch_u16, patch_u32, read_u16_at, read_u32_at};
use crate::text::{self, EncodingGap};
use cipher::{Plaintext, SubstructureCipher};
use fields::{
    ContestStats, EffortValues, IndividualValues, IvWord, MarkingFlags, Origins, PpUps, Pokerus,
    RibbonFlags, Stat,
};
use shuffle::{BLOCK_SIZE, DATA_SIZE, SubBlock};

pub const RECORD_SIZE: usize = 80;
pub const HEADER_SIZE: usize = 32;
pub const NICKNAME_LEN: usize = 10;
pub const OT_NAME_LEN: usize = 7;

const PID_OFFSET: usize = 0x00;
const OT_ID_OFFSET: usize = 0x04;
const NICKNAME_OFFSET: usize = 0x08;
const LANGUAGE_OFFSET: usize = 0x12;
const OT_NAME_OFFSET: usize = 0x14;
const MARKINGS_OFFSET: usize = 0x1B;
const CHECKSUM_OFFSET: usize = 0x1C;
const RESERVED_OFFSET: usize = 0x1E;
const DATA_OFFSET: usize = HEADER_SIZE;

// Offsets inside the canonical 48-byte data block.
const GROWTH: usize = SubBlock::Growth as usize * BLOCK_SIZE;
const ATTACKS: usize = SubBlock::Attacks as usize * BLOCK_SIZE;
const CONDITION: usize = SubBlock::Condition as usize * BLOCK_SIZE;
const MISC: usize = SubBlock::Misc as usize * BLOCK_SIZE;

const SPECIES: usize = GROWTH;
const HELD_ITEM: usize = GROWTH + 2;
const EXPERIENCE: usize = GROWTH + 4;
const PP_UPS: usize = GROWTH + 8;
const FRIENDSHIP: usize = GROWTH + 9;
const MOVES: usize = ATTACKS;
const MOVE_PP: usize = ATTACKS + 8;
const EVS: usize = CONDITION;
const CONTEST: usize = CONDITION + 6;
const POKERUS: usize = MISC;
const MET_LOCATION: usize = MISC + 1;
const ORIGINS: usize = MISC + 2;
const IV_WORD: usize = MISC + 4;
const RIBBONS: usize = MISC + 8;

/// Wrapping 16-bit sum of the canonical data block's little-endian halfwords.
pub fn data_checksum(data: &[u8; DATA_SIZE]) -> u16 {
    data.chunks_exact(2)
        .fold(0u16, |sum, pair| {
            sum.wrapping_add(u16::from_le_bytes([pair[0], pair[1]]))
        })
}

/// Reported when a record's stored checksum disagrees with its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumMismatch {
    pub stored: u16,
    pub computed: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokemonRecord {
    pid: u32,
    ot_id: u32,
    nickname: [u8; NICKNAME_LEN],
    language: u16,
    ot_name: [u8; OT_NAME_LEN],
    markings: MarkingFlags,
    checksum: u16,
    reserved: u16,
    /// Sub-blocks in canonical Growth/Attacks/Condition/Misc order.
    data: [u8; DATA_SIZE],
    checksum_stale: bool,
}

pub fn decode_record(bytes: &[u8]) -> Result<PokemonRecord, CoreError> {
    decode_record_with(bytes, &Plaintext)
}

pub fn decode_record_with<C: SubstructureCipher + ?Sized>(
    bytes: &[u8],
    cipher: &C,
) -> Result<PokemonRecord, CoreError> {
    if bytes.len() != RECORD_SIZE {
        return Err(CoreError::new(
            CoreErrorCode::InvalidSize,
            format!("record must be {RECORD_SIZE} bytes, got {}", bytes.len()),
        ));
    }

    let mut r = LittleEndianReader::new(Cursor::new(bytes));
    let pid = r.read_u32()?;
    let ot_id = r.read_u32()?;
    let nickname = r.read_array::<NICKNAME_LEN>()?;
    let language = r.read_u16()?;
    let ot_name = r.read_array::<OT_NAME_LEN>()?;
    let markings = MarkingFlags(r.read_u8()?);
    let checksum = r.read_u16()?;
    let reserved = r.read_u16()?;
    let stored = r.read_array::<DATA_SIZE>()?;

    let plain = cipher.decrypt(&stored, pid, ot_id);
    Ok(PokemonRecord {
        pid,
        ot_id,
        nickname,
        language,
        ot_name,
        markings,
        checksum,
        reserved,
        data: shuffle::unshuffle(&plain, pid),
        checksum_stale: false,
    })
}

pub fn encode_record(record: &PokemonRecord) -> [u8; RECORD_SIZE] {
    encode_record_with(record, &Plaintext)
}

pub fn encode_record_with<C: SubstructureCipher + ?Sized>(
    record: &PokemonRecord,
    cipher: &C,
) -> [u8; RECORD_SIZE] {
    let mut out = [0u8; RECORD_SIZE];
    patch_u32(&mut out, PID_OFFSET, record.pid);
    patch_u32(&mut out, OT_ID_OFFSET, record.ot_id);
    out[NICKNAME_OFFSET..NICKNAME_OFFSET + NICKNAME_LEN].copy_from_slice(&record.nickname);
    patch_u16(&mut out, LANGUAGE_OFFSET, record.language);
    out[OT_NAME_OFFSET..OT_NAME_OFFSET + OT_NAME_LEN].copy_from_slice(&record.ot_name);
    out[MARKINGS_OFFSET] = record.markings.0;
    patch_u16(&mut out, CHECKSUM_OFFSET, record.checksum_to_write());
    patch_u16(&mut out, RESERVED_OFFSET, record.reserved);

    let shuffled = shuffle::shuffle(&record.data, record.pid);
    let stored = cipher.encrypt(&shuffled, record.pid, record.ot_id);
    out[DATA_OFFSET..].copy_from_slice(&stored);
    out
}

impl PokemonRecord {
    /// An empty record with blank names and a fresh checksum.
    pub fn new(pid: u32, ot_id: u32) -> Self {
        Self {
            pid,
            ot_id,
            nickname: [text::TERMINATOR; NICKNAME_LEN],
            language: 0,
            ot_name: [text::TERMINATOR; OT_NAME_LEN],
            markings: MarkingFlags::default(),
            checksum: 0,
            reserved: 0,
            data: [0u8; DATA_SIZE],
            checksum_stale: true,
        }
    }

    /// Unused box slots are all zero.
    pub fn is_empty(&self) -> bool {
        self.pid == 0 && self.ot_id == 0 && self.species() == 0
    }

    // --- header ---

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// The data block is kept canonical, so the new PID only changes the
    /// on-disk order at encode time.
    pub fn set_pid(&mut self, pid: u32) {
        self.pid = pid;
    }

    pub fn shuffle_index(&self) -> usize {
        shuffle::shuffle_index(self.pid)
    }

    pub fn ot_id(&self) -> u32 {
        self.ot_id
    }

    pub fn public_id(&self) -> u16 {
        self.ot_id as u16
    }

    pub fn secret_id(&self) -> u16 {
        (self.ot_id >> 16) as u16
    }

    pub fn set_ot_id(&mut self, ot_id: u32) {
        self.ot_id = ot_id;
    }

    pub fn set_trainer_ids(&mut self, public_id: u16, secret_id: u16) {
        self.ot_id = public_id as u32 | (secret_id as u32) << 16;
    }

    pub fn nickname(&self) -> String {
        text::decode(&self.nickname, NICKNAME_LEN)
    }

    pub fn nickname_bytes(&self) -> &[u8; NICKNAME_LEN] {
        &self.nickname
    }

    pub fn set_nickname(&mut self, name: &str) -> Vec<EncodingGap> {
        let report = text::encode_report(name, NICKNAME_LEN);
        self.nickname.copy_from_slice(&report.value);
        report.gaps
    }

    pub fn ot_name(&self) -> String {
        text::decode(&self.ot_name, OT_NAME_LEN)
    }

    pub fn ot_name_bytes(&self) -> &[u8; OT_NAME_LEN] {
        &self.ot_name
    }

    pub fn set_ot_name(&mut self, name: &str) -> Vec<EncodingGap> {
        let report = text::encode_report(name, OT_NAME_LEN);
        self.ot_name.copy_from_slice(&report.value);
        report.gaps
    }

    pub fn language(&self) -> u16 {
        self.language
    }

    pub fn set_language(&mut self, language: u16) {
        self.language = language;
    }

    pub fn markings(&self) -> MarkingFlags {
        self.markings
    }

    pub fn set_markings(&mut self, markings: MarkingFlags) {
        self.markings = markings;
    }

    pub fn reserved(&self) -> u16 {
        self.reserved
    }

    // --- checksum ---

    pub fn stored_checksum(&self) -> u16 {
        self.checksum
    }

    pub fn computed_checksum(&self) -> u16 {
        data_checksum(&self.data)
    }

    pub fn is_checksum_stale(&self) -> bool {
        self.checksum_stale
    }

    /// `None` when the stored checksum matches, or when a setter has made it
    /// stale (it is rewritten at encode time).
    pub fn checksum_mismatch(&self) -> Option<ChecksumMismatch> {
        if self.checksum_stale {
            return None;
        }
        let computed = self.computed_checksum();
        (computed != self.checksum).then_some(ChecksumMismatch {
            stored: self.checksum,
            computed,
        })
    }

    pub fn refresh_checksum(&mut self) {
        self.checksum = self.computed_checksum();
        self.checksum_stale = false;
    }

    fn checksum_to_write(&self) -> u16 {
        if self.checksum_stale {
            self.computed_checksum()
        } else {
            self.checksum
        }
    }

    // --- data block ---

    /// Canonical (unshuffled) 48-byte data block.
    pub fn data(&self) -> &[u8; DATA_SIZE] {
        &self.data
    }

    pub fn sub_block(&self, block: SubBlock) -> &[u8] {
        let start = block as usize * BLOCK_SIZE;
        &self.data[start..start + BLOCK_SIZE]
    }

    fn touch(&mut self) {
        self.checksum_stale = true;
    }

    fn put_u8(&mut self, offset: usize, value: u8) {
        self.data[offset] = value;
        self.touch();
    }

    fn put_u16(&mut self, offset: usize, value: u16) {
        patch_u16(&mut self.data, offset, value);
        self.touch();
    }

    fn put_u32(&mut self, offset: usize, value: u32) {
        patch_u32(&mut self.data, offset, value);
        self.touch();
    }

    pub fn species(&self) -> u16 {
        read_u16_at(&self.data, SPECIES)
    }

    pub fn set_species(&mut self, species: u16) {
        self.put_u16(SPECIES, species);
    }

    pub fn held_item(&self) -> u16 {
        read_u16_at(&self.data, HELD_ITEM)
    }

    pub fn set_held_item(&mut self, item: u16) {
        self.put_u16(HELD_ITEM, item);
    }

    pub fn experience(&self) -> u32 {
        read_u32_at(&self.data, EXPERIENCE)
    }

    pub fn set_experience(&mut self, experience: u32) {
        self.put_u32(EXPERIENCE, experience);
    }

    pub fn pp_ups(&self) -> PpUps {
        PpUps(self.data[PP_UPS])
    }

    pub fn set_pp_ups(&mut self, pp_ups: PpUps) {
        self.put_u8(PP_UPS, pp_ups.0);
    }

    pub fn friendship(&self) -> u8 {
        self.data[FRIENDSHIP]
    }

    pub fn set_friendship(&mut self, friendship: u8) {
        self.put_u8(FRIENDSHIP, friendship);
    }

    pub fn moves(&self) -> [u16; 4] {
        std::array::from_fn(|i| read_u16_at(&self.data, MOVES + i * 2))
    }

    pub fn set_move(&mut self, index: usize, move_id: u16) -> Result<(), CoreError> {
        check_move_index(index)?;
        self.put_u16(MOVES + index * 2, move_id);
        Ok(())
    }

    pub fn move_pp(&self) -> [u8; 4] {
        std::array::from_fn(|i| self.data[MOVE_PP + i])
    }

    pub fn set_move_pp(&mut self, index: usize, pp: u8) -> Result<(), CoreError> {
        check_move_index(index)?;
        self.put_u8(MOVE_PP + index, pp);
        Ok(())
    }

    pub fn evs(&self) -> EffortValues {
        EffortValues::from_bytes(std::array::from_fn(|i| self.data[EVS + i]))
    }

    pub fn set_evs(&mut self, evs: EffortValues) {
        self.data[EVS..EVS + 6].copy_from_slice(&evs.to_bytes());
        self.touch();
    }

    pub fn contest(&self) -> ContestStats {
        ContestStats::from_bytes(std::array::from_fn(|i| self.data[CONTEST + i]))
    }

    pub fn set_contest(&mut self, contest: ContestStats) {
        self.data[CONTEST..CONTEST + 6].copy_from_slice(&contest.to_bytes());
        self.touch();
    }

    pub fn pokerus(&self) -> Pokerus {
        Pokerus(self.data[POKERUS])
    }

    pub fn set_pokerus(&mut self, pokerus: Pokerus) {
        self.put_u8(POKERUS, pokerus.0);
    }

    pub fn met_location(&self) -> u8 {
        self.data[MET_LOCATION]
    }

    pub fn set_met_location(&mut self, location: u8) {
        self.put_u8(MET_LOCATION, location);
    }

    pub fn origins(&self) -> Origins {
        Origins(read_u16_at(&self.data, ORIGINS))
    }

    pub fn set_origins(&mut self, origins: Origins) {
        self.put_u16(ORIGINS, origins.0);
    }

    pub fn iv_word(&self) -> IvWord {
        IvWord(read_u32_at(&self.data, IV_WORD))
    }

    fn set_iv_word(&mut self, word: IvWord) {
        self.put_u32(IV_WORD, word.0);
    }

    pub fn iv(&self, stat: Stat) -> u8 {
        self.iv_word().get(stat)
    }

    pub fn set_iv(&mut self, stat: Stat, value: u8) -> Result<(), CoreError> {
        let word = self.iv_word().with(stat, value)?;
        self.set_iv_word(word);
        Ok(())
    }

    pub fn ivs(&self) -> IndividualValues {
        self.iv_word().values()
    }

    /// Writes all six values; nothing changes if any is above 31.
    pub fn set_ivs(&mut self, ivs: IndividualValues) -> Result<(), CoreError> {
        let word = ivs.to_word(self.iv_word())?;
        self.set_iv_word(word);
        Ok(())
    }

    pub fn is_egg(&self) -> bool {
        self.iv_word().is_egg()
    }

    pub fn set_egg(&mut self, egg: bool) {
        let word = self.iv_word().with_egg(egg);
        self.set_iv_word(word);
    }

    pub fn ability_flag(&self) -> bool {
        self.iv_word().ability_flag()
    }

    pub fn set_ability_flag(&mut self, flag: bool) {
        let word = self.iv_word().with_ability_flag(flag);
        self.set_iv_word(word);
    }

    pub fn ribbons(&self) -> RibbonFlags {
        RibbonFlags(read_u32_at(&self.data, RIBBONS))
    }

    pub fn set_ribbons(&mut self, ribbons: RibbonFlags) {
        self.put_u32(RIBBONS, ribbons.0);
    }
}

fn check_move_index(index: usize) -> Result<(), CoreError> {
    if index >= 4 {
        return Err(CoreError::out_of_range(format!(
            "move index {index} out of range 0..4"
        )));
    }
    Ok(())
}
