use std::io::{self, Cursor};

use crate::checksum;
use crate::reader::{LittleEndianReader, patch_u16, patch_u32};

pub const SAVE_IMAGE_SIZE: usize = 0x20000;
pub const SECTOR_SIZE: usize = 0x1000;
pub const SECTOR_DATA_SIZE: usize = 0xF80;
pub const SECTORS_PER_SLOT: usize = 14;
pub const SLOT_SIZE: usize = SECTOR_SIZE * SECTORS_PER_SLOT;
pub const SECTOR_SIGNATURE: u32 = 0x0801_2025;

pub const FOOTER_OFFSET: usize = 0xFF4;
const SECTOR_ID_OFFSET: usize = FOOTER_OFFSET;
const CHECKSUM_OFFSET: usize = FOOTER_OFFSET + 2;
const SIGNATURE_OFFSET: usize = FOOTER_OFFSET + 4;
const SAVE_INDEX_OFFSET: usize = FOOTER_OFFSET + 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorFooter {
    pub sector_id: u16,
    pub checksum: u16,
    pub signature: u32,
    pub save_index: u32,
}

impl SectorFooter {
    pub fn parse(sector: &[u8]) -> io::Result<Self> {
        if sector.len() != SECTOR_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("sector must be {SECTOR_SIZE} bytes, got {}", sector.len()),
            ));
        }

        let mut r = LittleEndianReader::new(Cursor::new(sector));
        r.seek_to(FOOTER_OFFSET as u64)?;
        Ok(Self {
            sector_id: r.read_u16()?,
            checksum: r.read_u16()?,
            signature: r.read_u32()?,
            save_index: r.read_u32()?,
        })
    }

    pub fn has_signature(&self) -> bool {
        self.signature == SECTOR_SIGNATURE
    }
}

/// Borrowed view of one 4096-byte sector.
#[derive(Debug, Clone, Copy)]
pub struct Sector<'a> {
    bytes: &'a [u8],
}

impl<'a> Sector<'a> {
    pub fn new(bytes: &'a [u8]) -> io::Result<Self> {
        if bytes.len() != SECTOR_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("sector must be {SECTOR_SIZE} bytes, got {}", bytes.len()),
            ));
        }
        Ok(Self { bytes })
    }

    pub fn data(&self) -> &'a [u8] {
        &self.bytes[..SECTOR_DATA_SIZE]
    }

    pub fn footer(&self) -> io::Result<SectorFooter> {
        SectorFooter::parse(self.bytes)
    }

    /// Recomputes the checksum over the first `payload_len` data bytes and
    /// compares it with the footer.
    pub fn verify(&self, payload_len: usize) -> bool {
        match self.footer() {
            Ok(footer) => checksum::verify(self.data(), payload_len, footer.checksum),
            Err(_) => false,
        }
    }
}

/// Checks one raw sector against its footer checksum over `payload_len`
/// data bytes. Wrongly sized sectors never verify.
pub fn verify_sector(sector: &[u8], payload_len: usize) -> bool {
    Sector::new(sector).is_ok_and(|sector| sector.verify(payload_len))
}

/// Splits a 14-sector copy into sector views.
pub fn slot_sectors(slot: &[u8]) -> io::Result<Vec<Sector<'_>>> {
    if slot.len() != SLOT_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("slot must be {SLOT_SIZE} bytes, got {}", slot.len()),
        ));
    }
    slot.chunks_exact(SECTOR_SIZE).map(Sector::new).collect()
}

/// Fills one sector: payload, zeroed tail and a fresh footer.
pub fn write_sector(
    out: &mut [u8],
    sector_id: u16,
    payload: &[u8],
    save_index: u32,
) -> io::Result<()> {
    if out.len() != SECTOR_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("sector must be {SECTOR_SIZE} bytes, got {}", out.len()),
        ));
    }
    if payload.len() > SECTOR_DATA_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "sector {sector_id} payload too large: {} > {SECTOR_DATA_SIZE}",
                payload.len()
            ),
        ));
    }

    out[..FOOTER_OFFSET].fill(0);
    out[..payload.len()].copy_from_slice(payload);

    patch_u16(out, SECTOR_ID_OFFSET, sector_id);
    patch_u16(out, CHECKSUM_OFFSET, checksum::checksum(payload));
    patch_u32(out, SIGNATURE_OFFSET, SECTOR_SIGNATURE);
    patch_u32(out, SAVE_INDEX_OFFSET, save_index);
    Ok(())
}
