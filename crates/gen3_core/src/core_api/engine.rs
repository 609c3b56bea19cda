use log::{debug, warn};

use crate::container::{self, CopyStatus, DecodeOptions, LogicalSaveBuffer, SaveMetadata, SaveSlot};
use crate::layout::SaveType;
use crate::pk3::PokemonRecord;
use crate::regions::{self, BOX_COUNT, SLOTS_PER_BOX, TrainerInfo};

use super::error::{CoreError, CoreErrorCode};
use super::types::{BoxRecordEntry, Capabilities, CapabilityIssue, Snapshot};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine {
    options: DecodeOptions,
}

#[derive(Debug)]
pub struct Session {
    snapshot: Snapshot,
    capabilities: Capabilities,
    original: Vec<u8>,
    buffer: LogicalSaveBuffer,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Decodes a raw image. `hint` overrides detection for both copies.
    pub fn open_bytes<B: AsRef<[u8]>>(
        &self,
        bytes: B,
        hint: Option<SaveType>,
    ) -> Result<Session, CoreError> {
        let bytes = bytes.as_ref();
        let mut options = self.options;
        if hint.is_some() {
            options.type_hint = hint;
        }

        let buffer = container::decode_save_with(bytes, &options).map_err(|e| {
            CoreError::new(e.code, format!("failed to decode save image: {}", e.message))
        })?;
        Ok(session_from_buffer(bytes.to_vec(), buffer))
    }
}

impl Session {
    pub fn save_type(&self) -> SaveType {
        self.buffer.save_type()
    }

    pub fn metadata(&self) -> &SaveMetadata {
        self.buffer.metadata()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn logical_buffer(&self) -> &LogicalSaveBuffer {
        &self.buffer
    }

    pub fn trainer_info(&self) -> Result<TrainerInfo, CoreError> {
        regions::trainer_info(&self.buffer)
    }

    pub fn box_record(&self, box_index: usize, slot: usize) -> Result<PokemonRecord, CoreError> {
        regions::read_box_record(&self.buffer, box_index, slot)
    }

    pub fn box_records(&self, box_index: usize) -> Result<Vec<PokemonRecord>, CoreError> {
        (0..SLOTS_PER_BOX)
            .map(|slot| self.box_record(box_index, slot))
            .collect()
    }

    pub fn box_name(&self, box_index: usize) -> Result<String, CoreError> {
        regions::box_name(&self.buffer, box_index)
    }

    /// Occupied slots across every box; a record with a bad checksum is
    /// listed with its mismatch rather than skipped.
    pub fn occupied_box_records(&self) -> Vec<BoxRecordEntry> {
        collect_occupied(&self.buffer)
    }

    pub fn set_box_record(
        &mut self,
        box_index: usize,
        slot: usize,
        record: &PokemonRecord,
    ) -> Result<(), CoreError> {
        if !self.capabilities.can_apply_edits {
            return Err(CoreError::new(
                CoreErrorCode::UnrecognizedVariant,
                "session was opened in raw sector mode and cannot be edited",
            ));
        }

        let was_empty = self.box_record(box_index, slot)?.is_empty();
        regions::write_box_record(&mut self.buffer, box_index, slot, record)?;
        match (was_empty, record.is_empty()) {
            (true, false) => self.snapshot.occupied_box_slots += 1,
            (false, true) => self.snapshot.occupied_box_slots -= 1,
            _ => {}
        }
        Ok(())
    }

    pub fn to_bytes_unmodified(&self) -> Result<Vec<u8>, CoreError> {
        Ok(self.original.clone())
    }

    /// Re-encodes the logical buffer into the copy opposite the one read.
    pub fn to_bytes_modified(&self) -> Result<Vec<u8>, CoreError> {
        container::encode_save(&self.original, &self.buffer).map_err(|e| {
            CoreError::new(e.code, format!("failed to emit modified bytes: {}", e.message))
        })
    }
}

fn session_from_buffer(original: Vec<u8>, buffer: LogicalSaveBuffer) -> Session {
    let metadata = *buffer.metadata();

    let mut issues = Vec::new();
    if metadata.degraded {
        issues.push(CapabilityIssue::DegradedLayout);
    }
    if is_damaged(&metadata, SaveSlot::Primary) {
        issues.push(CapabilityIssue::PrimaryCopyInvalid);
    }
    if is_damaged(&metadata, SaveSlot::Backup) {
        issues.push(CapabilityIssue::BackupCopyInvalid);
    }

    let trainer = match regions::trainer_info(&buffer) {
        Ok(trainer) => Some(trainer),
        Err(e) => {
            warn!("trainer info unavailable: {e}");
            None
        }
    };
    let current_box = regions::current_box(&buffer).ok();
    let occupied_box_slots = collect_occupied(&buffer).len();
    debug!("{occupied_box_slots} occupied box slots");

    let snapshot = Snapshot {
        save_type: metadata.save_type,
        slot: metadata.slot,
        save_index: metadata.save_index,
        primary: metadata.primary,
        backup: metadata.backup,
        degraded: metadata.degraded,
        trainer,
        current_box,
        occupied_box_slots,
    };

    let capabilities = if metadata.degraded {
        Capabilities::read_only(issues)
    } else {
        Capabilities::editable(issues)
    };

    Session {
        snapshot,
        capabilities,
        original,
        buffer,
    }
}

/// An erased copy is not damage, and neither is the copy a degraded
/// session was read from; `DegradedLayout` already covers it.
fn is_damaged(metadata: &SaveMetadata, slot: SaveSlot) -> bool {
    let status = match slot {
        SaveSlot::Primary => metadata.primary,
        SaveSlot::Backup => metadata.backup,
    };
    if status.is_valid() || status == CopyStatus::Empty {
        return false;
    }
    !(metadata.degraded && metadata.slot == slot)
}

fn collect_occupied(buffer: &LogicalSaveBuffer) -> Vec<BoxRecordEntry> {
    let mut out = Vec::new();
    for box_index in 0..BOX_COUNT {
        for slot in 0..SLOTS_PER_BOX {
            let Ok(record) = regions::read_box_record(buffer, box_index, slot) else {
                continue;
            };
            if record.is_empty() {
                continue;
            }
            out.push(BoxRecordEntry {
                box_index,
                slot,
                pid: record.pid(),
                species: record.species(),
                nickname: record.nickname(),
                is_egg: record.is_egg(),
                checksum_mismatch: record.checksum_mismatch(),
            });
        }
    }
    out
}
