use serde::{Deserialize, Serialize};

use crate::container::{CopyStatus, SaveSlot};
use crate::layout::SaveType;
use crate::pk3::ChecksumMismatch;
use crate::regions::TrainerInfo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub save_type: SaveType,
    pub slot: SaveSlot,
    pub save_index: u32,
    pub primary: CopyStatus,
    pub backup: CopyStatus,
    pub degraded: bool,
    pub trainer: Option<TrainerInfo>,
    pub current_box: Option<u32>,
    pub occupied_box_slots: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityIssue {
    /// Opened in raw sector mode; the variant table is unknown.
    DegradedLayout,
    PrimaryCopyInvalid,
    BackupCopyInvalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Capabilities {
    pub can_query: bool,
    pub can_apply_edits: bool,
    pub issues: Vec<CapabilityIssue>,
}

impl Capabilities {
    pub fn read_only(issues: Vec<CapabilityIssue>) -> Self {
        Self {
            can_query: true,
            can_apply_edits: false,
            issues,
        }
    }

    pub fn editable(issues: Vec<CapabilityIssue>) -> Self {
        Self {
            can_query: true,
            can_apply_edits: true,
            issues,
        }
    }
}

/// One occupied PC box slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoxRecordEntry {
    pub box_index: usize,
    pub slot: usize,
    pub pid: u32,
    pub species: u16,
    pub nickname: String,
    pub is_egg: bool,
    pub checksum_mismatch: Option<ChecksumMismatch>,
}
