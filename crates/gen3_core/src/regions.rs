//! Typed regions of the logical buffer that this crate reads: trainer info
//! in sector 0 and PC box storage across sectors 5-13.

use serde::{Deserialize, Serialize};

use crate::container::LogicalSaveBuffer;
use crate::core_api::CoreError;
use crate::detect::GAME_CODE_OFFSET;
use crate::layout::{ByteRange, PC_STORAGE_FIRST_SECTOR, TRAINER_INFO_SECTOR};
use crate::pk3::{self, PokemonRecord, RECORD_SIZE};
use crate::reader::{read_u16_at, read_u32_at};
use crate::sector::SECTORS_PER_SLOT;
use crate::text;

pub const TRAINER_NAME_LEN: usize = 7;
const TRAINER_NAME_OFFSET: usize = 0x00;
const TRAINER_GENDER_OFFSET: usize = 0x08;
const TRAINER_PUBLIC_ID_OFFSET: usize = 0x0A;
const TRAINER_SECRET_ID_OFFSET: usize = 0x0C;

pub const BOX_COUNT: usize = 14;
pub const SLOTS_PER_BOX: usize = 30;
pub const BOX_NAME_LEN: usize = 9;
const CURRENT_BOX_OFFSET: usize = 0;
const BOX_RECORDS_OFFSET: usize = 4;
const BOX_NAMES_OFFSET: usize = BOX_RECORDS_OFFSET + BOX_COUNT * SLOTS_PER_BOX * RECORD_SIZE;
const WALLPAPERS_OFFSET: usize = BOX_NAMES_OFFSET + BOX_COUNT * BOX_NAME_LEN;
pub const PC_STORAGE_SIZE: usize = WALLPAPERS_OFFSET + BOX_COUNT;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerInfo {
    pub name: String,
    pub female: bool,
    pub public_id: u16,
    pub secret_id: u16,
    pub game_code: u32,
}

pub fn trainer_info(buffer: &LogicalSaveBuffer) -> Result<TrainerInfo, CoreError> {
    let data = buffer.sector_payload(TRAINER_INFO_SECTOR).ok_or_else(|| {
        CoreError::out_of_range("logical buffer has no trainer info sector")
    })?;
    if data.len() < GAME_CODE_OFFSET + 4 {
        return Err(CoreError::out_of_range(format!(
            "trainer info sector too short: {} bytes",
            data.len()
        )));
    }

    Ok(TrainerInfo {
        name: text::decode(
            &data[TRAINER_NAME_OFFSET..TRAINER_NAME_OFFSET + TRAINER_NAME_LEN],
            TRAINER_NAME_LEN,
        ),
        female: data[TRAINER_GENDER_OFFSET] != 0,
        public_id: read_u16_at(data, TRAINER_PUBLIC_ID_OFFSET),
        secret_id: read_u16_at(data, TRAINER_SECRET_ID_OFFSET),
        game_code: read_u32_at(data, GAME_CODE_OFFSET),
    })
}

/// Byte range of PC storage inside the logical buffer.
pub fn pc_storage_range(buffer: &LogicalSaveBuffer) -> Result<ByteRange, CoreError> {
    let range = buffer
        .layout()
        .span(PC_STORAGE_FIRST_SECTOR, SECTORS_PER_SLOT as u16 - 1)
        .ok_or_else(|| CoreError::out_of_range("logical buffer has no PC storage sectors"))?;
    if range.len() < PC_STORAGE_SIZE || range.end > buffer.len() {
        return Err(CoreError::out_of_range(format!(
            "PC storage needs {PC_STORAGE_SIZE} bytes, layout provides {}",
            range.len()
        )));
    }
    Ok(ByteRange {
        start: range.start,
        end: range.start + PC_STORAGE_SIZE,
    })
}

fn record_offset(box_index: usize, slot: usize) -> Result<usize, CoreError> {
    if box_index >= BOX_COUNT {
        return Err(CoreError::out_of_range(format!(
            "box {box_index} out of range 0..{BOX_COUNT}"
        )));
    }
    if slot >= SLOTS_PER_BOX {
        return Err(CoreError::out_of_range(format!(
            "slot {slot} out of range 0..{SLOTS_PER_BOX}"
        )));
    }
    Ok(BOX_RECORDS_OFFSET + (box_index * SLOTS_PER_BOX + slot) * RECORD_SIZE)
}

pub fn current_box(buffer: &LogicalSaveBuffer) -> Result<u32, CoreError> {
    let range = pc_storage_range(buffer)?;
    Ok(read_u32_at(
        buffer.as_bytes(),
        range.start + CURRENT_BOX_OFFSET,
    ))
}

pub fn box_record_bytes(
    buffer: &LogicalSaveBuffer,
    box_index: usize,
    slot: usize,
) -> Result<&[u8], CoreError> {
    let start = pc_storage_range(buffer)?.start + record_offset(box_index, slot)?;
    Ok(&buffer.as_bytes()[start..start + RECORD_SIZE])
}

pub fn read_box_record(
    buffer: &LogicalSaveBuffer,
    box_index: usize,
    slot: usize,
) -> Result<PokemonRecord, CoreError> {
    pk3::decode_record(box_record_bytes(buffer, box_index, slot)?)
}

pub fn write_box_record(
    buffer: &mut LogicalSaveBuffer,
    box_index: usize,
    slot: usize,
    record: &PokemonRecord,
) -> Result<(), CoreError> {
    let start = pc_storage_range(buffer)?.start + record_offset(box_index, slot)?;
    buffer.as_mut_bytes()[start..start + RECORD_SIZE].copy_from_slice(&pk3::encode_record(record));
    Ok(())
}

pub fn box_name(buffer: &LogicalSaveBuffer, box_index: usize) -> Result<String, CoreError> {
    if box_index >= BOX_COUNT {
        return Err(CoreError::out_of_range(format!(
            "box {box_index} out of range 0..{BOX_COUNT}"
        )));
    }
    let start = pc_storage_range(buffer)?.start + BOX_NAMES_OFFSET + box_index * BOX_NAME_LEN;
    Ok(text::decode(
        &buffer.as_bytes()[start..start + BOX_NAME_LEN],
        BOX_NAME_LEN,
    ))
}

pub fn box_wallpaper(buffer: &LogicalSaveBuffer, box_index: usize) -> Result<u8, CoreError> {
    if box_index >= BOX_COUNT {
        return Err(CoreError::out_of_range(format!(
            "box {box_index} out of range 0..{BOX_COUNT}"
        )));
    }
    let start = pc_storage_range(buffer)?.start + WALLPAPERS_OFFSET;
    Ok(buffer.as_bytes()[start + box_index])
}

#[cfg(test)]
mod tests {
    use super::{PC_STORAGE_SIZE, pc_storage_range};
    use crate::container::LogicalSaveBuffer;
    use crate::layout::SaveType;

    #[test]
    fn pc_storage_fills_sectors_five_to_thirteen() {
        assert_eq!(PC_STORAGE_SIZE, 8 * 0xF80 + 0x7D0);

        let rse = LogicalSaveBuffer::blank(SaveType::Rse);
        let frlg = LogicalSaveBuffer::blank(SaveType::Frlg);
        let rse_range = pc_storage_range(&rse).expect("rse storage");
        let frlg_range = pc_storage_range(&frlg).expect("frlg storage");
        assert_eq!(rse_range.end, rse.len());
        assert_eq!(rse_range.start - frlg_range.start, 8);
    }
}
