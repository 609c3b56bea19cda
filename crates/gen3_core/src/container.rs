use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::checksum;
use crate::core_api::{CoreError, CoreErrorCode};
use crate::detect::{self, FooterSummary, StructuralIssue};
use crate::layout::{
    ByteRange, LogicalLayout, RSE_PAYLOAD_SIZES, SaveType, TRAINER_INFO_SECTOR,
};
use crate::sector::{
    SAVE_IMAGE_SIZE, SECTOR_DATA_SIZE, SECTOR_SIZE, SECTORS_PER_SLOT, SLOT_SIZE, Sector,
    slot_sectors, write_sector,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaveSlot {
    Primary,
    Backup,
}

impl SaveSlot {
    pub fn opposite(&self) -> Self {
        match *self {
            Self::Primary => Self::Backup,
            Self::Backup => Self::Primary,
        }
    }

    /// Byte range of this copy inside a raw image.
    pub fn range(&self) -> ByteRange {
        let start = match *self {
            Self::Primary => 0,
            Self::Backup => SLOT_SIZE,
        };
        ByteRange {
            start,
            end: start + SLOT_SIZE,
        }
    }
}

/// Validation outcome of one copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopyStatus {
    Valid { save_type: SaveType, save_index: u32 },
    Empty,
    BadSignature { physical_sector: usize },
    BadSectorIds,
    InconsistentSaveIndex,
    UnrecognizedVariant { save_index: u32 },
    ChecksumMismatch { sector_id: u16, save_index: u32 },
}

impl CopyStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    fn from_issue(issue: StructuralIssue) -> Self {
        match issue {
            StructuralIssue::Empty => Self::Empty,
            StructuralIssue::BadSignature { physical_sector } => {
                Self::BadSignature { physical_sector }
            }
            StructuralIssue::BadSectorIds => Self::BadSectorIds,
            StructuralIssue::InconsistentSaveIndex => Self::InconsistentSaveIndex,
        }
    }
}

/// Decode-time facts kept alongside the logical buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub save_type: SaveType,
    pub slot: SaveSlot,
    pub save_index: u32,
    pub primary: CopyStatus,
    pub backup: CopyStatus,
    /// Reassembled with the raw sector table; checksums were not verified.
    pub degraded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeOptions {
    /// Reassemble a copy whose variant is unknown instead of failing.
    pub allow_unrecognized: bool,
    /// Skip detection and read copies with this variant's table.
    pub type_hint: Option<SaveType>,
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn degraded() -> Self {
        Self {
            allow_unrecognized: true,
            type_hint: None,
        }
    }
}

/// One copy's payloads concatenated by ascending sector id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalSaveBuffer {
    bytes: Vec<u8>,
    metadata: SaveMetadata,
}

impl LogicalSaveBuffer {
    /// Zeroed buffer that encodes into the primary slot at save index 1.
    pub fn blank(save_type: SaveType) -> Self {
        let layout = LogicalLayout::for_type(save_type);
        Self {
            bytes: vec![0u8; layout.total_len],
            metadata: SaveMetadata {
                save_type,
                slot: SaveSlot::Backup,
                save_index: 0,
                primary: CopyStatus::Empty,
                backup: CopyStatus::Empty,
                degraded: save_type == SaveType::Unrecognized,
            },
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable access; the length is fixed by the variant layout.
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn metadata(&self) -> &SaveMetadata {
        &self.metadata
    }

    pub fn save_type(&self) -> SaveType {
        self.metadata.save_type
    }

    pub fn layout(&self) -> LogicalLayout {
        LogicalLayout::for_type(self.metadata.save_type)
    }

    pub fn sector_payload(&self, id: u16) -> Option<&[u8]> {
        let range = self.layout().sector_range(id)?;
        self.bytes.get(range.start..range.end)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

struct InspectedCopy {
    status: CopyStatus,
    summary: Option<FooterSummary>,
}

fn inspect_copy(slot_bytes: &[u8], type_hint: Option<SaveType>) -> InspectedCopy {
    let sectors = match slot_sectors(slot_bytes) {
        Ok(sectors) => sectors,
        Err(_) => {
            return InspectedCopy {
                status: CopyStatus::BadSectorIds,
                summary: None,
            };
        }
    };

    let summary = match detect::inspect_footers(&sectors) {
        Ok(summary) => summary,
        Err(issue) => {
            return InspectedCopy {
                status: CopyStatus::from_issue(issue),
                summary: None,
            };
        }
    };

    let save_type = match type_hint {
        Some(hint) if hint != SaveType::Unrecognized => hint,
        _ => detect::classify(&sectors, &summary),
    };
    if save_type == SaveType::Unrecognized {
        // Sectors 1-13 share one length in every known variant; if they fail
        // too, the copy is damaged rather than foreign. Sector 0 must still
        // checksum over some other length to count as a foreign layout.
        let bad_sector = first_bad_sector(&sectors, &summary, &RSE_PAYLOAD_SIZES, 1)
            .or_else(|| (!foreign_trainer_sector(&sectors, &summary)).then_some(0));
        let status = match bad_sector {
            Some(sector_id) => CopyStatus::ChecksumMismatch {
                sector_id,
                save_index: summary.save_index,
            },
            None => CopyStatus::UnrecognizedVariant {
                save_index: summary.save_index,
            },
        };
        return InspectedCopy {
            status,
            summary: Some(summary),
        };
    }

    let status = match first_bad_sector(&sectors, &summary, save_type.payload_sizes(), 0) {
        Some(sector_id) => CopyStatus::ChecksumMismatch {
            sector_id,
            save_index: summary.save_index,
        },
        None => CopyStatus::Valid {
            save_type,
            save_index: summary.save_index,
        },
    };

    InspectedCopy {
        status,
        summary: Some(summary),
    }
}

fn first_bad_sector(
    sectors: &[Sector<'_>],
    summary: &FooterSummary,
    sizes: &[usize],
    first_id: usize,
) -> Option<u16> {
    sizes
        .iter()
        .enumerate()
        .skip(first_id)
        .find(|&(id, &len)| !sectors[summary.physical_by_id[id]].verify(len))
        .map(|(id, _)| id as u16)
}

fn foreign_trainer_sector(sectors: &[Sector<'_>], summary: &FooterSummary) -> bool {
    let sector = sectors[summary.physical_by_id[TRAINER_INFO_SECTOR as usize]];
    match sector.footer() {
        Ok(footer) => checksum::matching_prefix_len(sector.data(), footer.checksum).is_some(),
        Err(_) => false,
    }
}

fn assemble(slot_bytes: &[u8], summary: &FooterSummary, save_type: SaveType) -> Vec<u8> {
    let layout = LogicalLayout::for_type(save_type);
    let mut bytes = Vec::with_capacity(layout.total_len);
    for sector in &layout.sectors {
        let physical = summary.physical_by_id[sector.id as usize];
        let start = physical * SECTOR_SIZE;
        bytes.extend_from_slice(&slot_bytes[start..start + sector.range.len()]);
    }
    bytes
}

fn check_image_len(image: &[u8]) -> Result<(), CoreError> {
    if image.len() != SAVE_IMAGE_SIZE {
        return Err(CoreError::new(
            CoreErrorCode::InvalidSize,
            format!(
                "save image must be {SAVE_IMAGE_SIZE} bytes, got {}",
                image.len()
            ),
        ));
    }
    Ok(())
}

fn slot_bytes(image: &[u8], slot: SaveSlot) -> &[u8] {
    let range = slot.range();
    &image[range.start..range.end]
}

pub fn decode_save(image: &[u8]) -> Result<LogicalSaveBuffer, CoreError> {
    decode_save_with(image, &DecodeOptions::strict())
}

pub fn decode_save_with(
    image: &[u8],
    options: &DecodeOptions,
) -> Result<LogicalSaveBuffer, CoreError> {
    check_image_len(image)?;

    let primary = inspect_copy(slot_bytes(image, SaveSlot::Primary), options.type_hint);
    let backup = inspect_copy(slot_bytes(image, SaveSlot::Backup), options.type_hint);
    debug!("primary copy: {:?}", primary.status);
    debug!("backup copy: {:?}", backup.status);

    let selected = match (primary.status, backup.status) {
        (
            CopyStatus::Valid {
                save_index: primary_index,
                ..
            },
            CopyStatus::Valid {
                save_index: backup_index,
                ..
            },
        ) => {
            if detect::is_newer(backup_index, primary_index) {
                Some(SaveSlot::Backup)
            } else {
                Some(SaveSlot::Primary)
            }
        }
        (CopyStatus::Valid { .. }, other) => {
            warn!("backup copy rejected ({other:?}); using primary");
            Some(SaveSlot::Primary)
        }
        (other, CopyStatus::Valid { .. }) => {
            warn!("primary copy rejected ({other:?}); using backup");
            Some(SaveSlot::Backup)
        }
        _ => None,
    };

    let (slot, inspected) = match selected {
        Some(SaveSlot::Primary) => (SaveSlot::Primary, &primary),
        Some(SaveSlot::Backup) => (SaveSlot::Backup, &backup),
        None => return decode_unrecognized(image, &primary, &backup, options),
    };

    let (
        CopyStatus::Valid {
            save_type,
            save_index,
        },
        Some(summary),
    ) = (inspected.status, inspected.summary)
    else {
        return Err(CoreError::new(
            CoreErrorCode::SaveCorrupted,
            "selected copy lost its validation state",
        ));
    };

    info!("selected {slot:?} copy: {save_type} save index {save_index}");
    Ok(LogicalSaveBuffer {
        bytes: assemble(slot_bytes(image, slot), &summary, save_type),
        metadata: SaveMetadata {
            save_type,
            slot,
            save_index,
            primary: primary.status,
            backup: backup.status,
            degraded: false,
        },
    })
}

fn decode_unrecognized(
    image: &[u8],
    primary: &InspectedCopy,
    backup: &InspectedCopy,
    options: &DecodeOptions,
) -> Result<LogicalSaveBuffer, CoreError> {
    let unrecognized_index = |copy: &InspectedCopy| match copy.status {
        CopyStatus::UnrecognizedVariant { save_index } => Some(save_index),
        _ => None,
    };

    let candidate = match (unrecognized_index(primary), unrecognized_index(backup)) {
        (Some(p), Some(b)) if detect::is_newer(b, p) => Some(SaveSlot::Backup),
        (Some(_), _) => Some(SaveSlot::Primary),
        (None, Some(_)) => Some(SaveSlot::Backup),
        (None, None) => None,
    };

    let Some(slot) = candidate else {
        return Err(CoreError::new(
            CoreErrorCode::SaveCorrupted,
            format!(
                "no valid save copy: primary {:?}, backup {:?}",
                primary.status, backup.status
            ),
        ));
    };

    if !options.allow_unrecognized {
        return Err(CoreError::new(
            CoreErrorCode::UnrecognizedVariant,
            format!(
                "footers are intact but the variant is unknown: primary {:?}, backup {:?}",
                primary.status, backup.status
            ),
        ));
    }

    let inspected = match slot {
        SaveSlot::Primary => primary,
        SaveSlot::Backup => backup,
    };
    let Some(summary) = inspected.summary else {
        return Err(CoreError::new(
            CoreErrorCode::SaveCorrupted,
            "unrecognized copy has no footer summary",
        ));
    };

    warn!(
        "decoding {slot:?} copy in raw sector mode (save index {})",
        summary.save_index
    );
    Ok(LogicalSaveBuffer {
        bytes: assemble(slot_bytes(image, slot), &summary, SaveType::Unrecognized),
        metadata: SaveMetadata {
            save_type: SaveType::Unrecognized,
            slot,
            save_index: summary.save_index,
            primary: primary.status,
            backup: backup.status,
            degraded: true,
        },
    })
}

/// Reads one specific copy without arbitration.
pub fn decode_slot(
    image: &[u8],
    slot: SaveSlot,
    options: &DecodeOptions,
) -> Result<LogicalSaveBuffer, CoreError> {
    check_image_len(image)?;
    let bytes = slot_bytes(image, slot);
    let inspected = inspect_copy(bytes, options.type_hint);
    let other = inspect_copy(slot_bytes(image, slot.opposite()), options.type_hint).status;
    let (primary, backup) = match slot {
        SaveSlot::Primary => (inspected.status, other),
        SaveSlot::Backup => (other, inspected.status),
    };

    match (inspected.status, inspected.summary) {
        (
            CopyStatus::Valid {
                save_type,
                save_index,
            },
            Some(summary),
        ) => Ok(LogicalSaveBuffer {
            bytes: assemble(bytes, &summary, save_type),
            metadata: SaveMetadata {
                save_type,
                slot,
                save_index,
                primary,
                backup,
                degraded: false,
            },
        }),
        (CopyStatus::UnrecognizedVariant { save_index }, Some(summary))
            if options.allow_unrecognized =>
        {
            Ok(LogicalSaveBuffer {
                bytes: assemble(bytes, &summary, SaveType::Unrecognized),
                metadata: SaveMetadata {
                    save_type: SaveType::Unrecognized,
                    slot,
                    save_index,
                    primary,
                    backup,
                    degraded: true,
                },
            })
        }
        (CopyStatus::UnrecognizedVariant { .. }, _) => Err(CoreError::new(
            CoreErrorCode::UnrecognizedVariant,
            format!("{slot:?} copy has an unknown variant"),
        )),
        (status, _) => Err(CoreError::new(
            CoreErrorCode::SaveCorrupted,
            format!("{slot:?} copy is invalid: {status:?}"),
        )),
    }
}

/// Writes `buffer` into the copy opposite the one it was read from, with
/// the save index advanced by one. Everything else in `base_image` is kept.
pub fn encode_save(base_image: &[u8], buffer: &LogicalSaveBuffer) -> Result<Vec<u8>, CoreError> {
    check_image_len(base_image)?;
    let metadata = buffer.metadata();
    if metadata.degraded || metadata.save_type == SaveType::Unrecognized {
        return Err(CoreError::new(
            CoreErrorCode::UnrecognizedVariant,
            "cannot encode a buffer decoded in raw sector mode",
        ));
    }

    let target = metadata.slot.opposite();
    let save_index = metadata.save_index.wrapping_add(1);
    let mut image = base_image.to_vec();
    write_slot(
        &mut image,
        target,
        buffer.as_bytes(),
        metadata.save_type,
        save_index,
    )?;
    info!(
        "wrote {target:?} copy: {} save index {save_index}",
        metadata.save_type
    );
    Ok(image)
}

/// Serialises a logical payload into one copy of `image`.
pub fn write_slot(
    image: &mut [u8],
    slot: SaveSlot,
    payload: &[u8],
    save_type: SaveType,
    save_index: u32,
) -> Result<(), CoreError> {
    check_image_len(image)?;
    let layout = LogicalLayout::for_type(save_type);
    layout.validate()?;
    if payload.len() != layout.total_len {
        return Err(CoreError::new(
            CoreErrorCode::InvalidSize,
            format!(
                "{save_type} payload must be {} bytes, got {}",
                layout.total_len,
                payload.len()
            ),
        ));
    }

    let slot_range = slot.range();
    let rotation = save_index as usize % SECTORS_PER_SLOT;
    for sector in &layout.sectors {
        let physical = (sector.id as usize + rotation) % SECTORS_PER_SLOT;
        let start = slot_range.start + physical * SECTOR_SIZE;
        let chunk = &payload[sector.range.start..sector.range.end];
        debug_assert!(chunk.len() <= SECTOR_DATA_SIZE);
        write_sector(
            &mut image[start..start + SECTOR_SIZE],
            sector.id,
            chunk,
            save_index,
        )?;
    }
    Ok(())
}

/// An erased flash image: every byte 0xFF, both copies empty.
pub fn create_image() -> Vec<u8> {
    vec![0xFF; SAVE_IMAGE_SIZE]
}

/// A new image holding `payload` in the primary copy at save index 1.
pub fn encode_fresh(payload: &[u8], save_type: SaveType) -> Result<Vec<u8>, CoreError> {
    let mut buffer = LogicalSaveBuffer::blank(save_type);
    if buffer.len() != payload.len() {
        return Err(CoreError::new(
            CoreErrorCode::InvalidSize,
            format!(
                "{save_type} payload must be {} bytes, got {}",
                buffer.len(),
                payload.len()
            ),
        ));
    }
    buffer.as_mut_bytes().copy_from_slice(payload);
    encode_save(&create_image(), &buffer)
}
