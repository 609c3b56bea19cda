use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

use crate::sector::{SECTOR_DATA_SIZE, SECTORS_PER_SLOT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaveType {
    /// Ruby / Sapphire / Emerald.
    Rse,
    /// FireRed / LeafGreen.
    Frlg,
    Unrecognized,
}

impl SaveType {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Rse => "RSE",
            Self::Frlg => "FRLG",
            Self::Unrecognized => "Unrecognized",
        }
    }

    /// Bytes of each sector id that belong to the logical buffer.
    pub fn payload_sizes(&self) -> &'static [usize; SECTORS_PER_SLOT] {
        match *self {
            Self::Rse => &RSE_PAYLOAD_SIZES,
            Self::Frlg => &FRLG_PAYLOAD_SIZES,
            Self::Unrecognized => &RAW_PAYLOAD_SIZES,
        }
    }
}

impl fmt::Display for SaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const TRAINER_INFO_SECTOR: u16 = 0;
pub const PC_STORAGE_FIRST_SECTOR: u16 = 5;

pub const RSE_PAYLOAD_SIZES: [usize; SECTORS_PER_SLOT] = [
    0xF2C, 0xF80, 0xF80, 0xF80, 0xF08, 0xF80, 0xF80, 0xF80, 0xF80, 0xF80, 0xF80, 0xF80, 0xF80,
    0x7D0,
];

pub const FRLG_PAYLOAD_SIZES: [usize; SECTORS_PER_SLOT] = [
    0xF24, 0xF80, 0xF80, 0xF80, 0xF08, 0xF80, 0xF80, 0xF80, 0xF80, 0xF80, 0xF80, 0xF80, 0xF80,
    0x7D0,
];

/// Degraded table: every sector contributes its whole data area.
pub const RAW_PAYLOAD_SIZES: [usize; SECTORS_PER_SLOT] = [SECTOR_DATA_SIZE; SECTORS_PER_SLOT];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorLayout {
    pub id: u16,
    pub range: ByteRange,
}

/// Where each sector's payload lives inside the logical buffer.
#[derive(Debug, Clone)]
pub struct LogicalLayout {
    pub save_type: SaveType,
    pub total_len: usize,
    pub sectors: Vec<SectorLayout>,
}

impl LogicalLayout {
    pub fn for_type(save_type: SaveType) -> Self {
        let mut sectors = Vec::with_capacity(SECTORS_PER_SLOT);
        let mut start = 0usize;
        for (id, &size) in save_type.payload_sizes().iter().enumerate() {
            sectors.push(SectorLayout {
                id: id as u16,
                range: ByteRange {
                    start,
                    end: start + size,
                },
            });
            start += size;
        }

        Self {
            save_type,
            total_len: start,
            sectors,
        }
    }

    pub fn sector_range(&self, id: u16) -> Option<ByteRange> {
        self.sectors
            .iter()
            .find(|sector| sector.id == id)
            .map(|sector| sector.range)
    }

    /// Byte range covering sectors `first..=last`.
    pub fn span(&self, first: u16, last: u16) -> Option<ByteRange> {
        let start = self.sector_range(first)?.start;
        let end = self.sector_range(last)?.end;
        (start <= end).then_some(ByteRange { start, end })
    }

    pub fn validate(&self) -> io::Result<()> {
        if self.sectors.len() != SECTORS_PER_SLOT {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "logical layout must cover {SECTORS_PER_SLOT} sectors, got {}",
                    self.sectors.len()
                ),
            ));
        }

        let mut expected = 0usize;
        for (index, sector) in self.sectors.iter().enumerate() {
            if sector.id as usize != index {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("sector id {} out of order at index {index}", sector.id),
                ));
            }
            if sector.range.start != expected {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "layout gap/overlap around sector {}: expected start {}, got {}",
                        sector.id, expected, sector.range.start
                    ),
                ));
            }
            if sector.range.is_empty()
                || sector.range.len() > SECTOR_DATA_SIZE
                || sector.range.end < sector.range.start
            {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "invalid sector range {}: {}..{}",
                        sector.id, sector.range.start, sector.range.end
                    ),
                ));
            }
            expected = sector.range.end;
        }

        if expected != self.total_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "layout does not cover buffer: ended at {}, buffer length {}",
                    expected, self.total_len
                ),
            ));
        }

        Ok(())
    }
}
