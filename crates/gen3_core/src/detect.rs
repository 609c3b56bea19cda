use log::debug;

use crate::checksum;
use crate::layout::{FRLG_PAYLOAD_SIZES, RSE_PAYLOAD_SIZES, SaveType, TRAINER_INFO_SECTOR};
use crate::reader::read_u32_at;
use crate::sector::{SAVE_IMAGE_SIZE, SECTORS_PER_SLOT, SLOT_SIZE, Sector, slot_sectors};

/// Trainer-info word that holds 1 on FireRed/LeafGreen.
pub const GAME_CODE_OFFSET: usize = 0xAC;
pub const FRLG_GAME_CODE: u32 = 1;

/// Why a copy failed the structural footer checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralIssue {
    /// No sector carries the signature; the slot was never written.
    Empty,
    BadSignature { physical_sector: usize },
    BadSectorIds,
    InconsistentSaveIndex,
}

/// Footer facts of a structurally sound copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FooterSummary {
    pub save_index: u32,
    /// Physical position inside the slot of each sector id.
    pub physical_by_id: [usize; SECTORS_PER_SLOT],
}

pub fn inspect_footers(sectors: &[Sector<'_>]) -> Result<FooterSummary, StructuralIssue> {
    let mut footers = Vec::with_capacity(sectors.len());
    for sector in sectors {
        match sector.footer() {
            Ok(footer) => footers.push(footer),
            Err(_) => return Err(StructuralIssue::BadSectorIds),
        }
    }
    if footers.len() != SECTORS_PER_SLOT {
        return Err(StructuralIssue::BadSectorIds);
    }

    if footers.iter().all(|footer| !footer.has_signature()) {
        return Err(StructuralIssue::Empty);
    }
    if let Some(physical_sector) = footers.iter().position(|footer| !footer.has_signature()) {
        return Err(StructuralIssue::BadSignature { physical_sector });
    }

    let save_index = footers[0].save_index;
    if footers.iter().any(|footer| footer.save_index != save_index) {
        return Err(StructuralIssue::InconsistentSaveIndex);
    }

    let mut physical_by_id = [usize::MAX; SECTORS_PER_SLOT];
    for (physical, footer) in footers.iter().enumerate() {
        let id = footer.sector_id as usize;
        if id >= SECTORS_PER_SLOT || physical_by_id[id] != usize::MAX {
            return Err(StructuralIssue::BadSectorIds);
        }
        physical_by_id[id] = physical;
    }

    Ok(FooterSummary {
        save_index,
        physical_by_id,
    })
}

/// Classifies one 14-sector copy. Any structural anomaly yields
/// `Unrecognized`; arbitration is left to the container codec.
pub fn detect_copy(slot: &[u8]) -> SaveType {
    let Ok(sectors) = slot_sectors(slot) else {
        return SaveType::Unrecognized;
    };
    match inspect_footers(&sectors) {
        Ok(summary) => classify(&sectors, &summary),
        Err(issue) => {
            debug!("copy is structurally invalid: {issue:?}");
            SaveType::Unrecognized
        }
    }
}

/// Classifies a structurally sound copy by which variant's trainer-info
/// length reproduces the stored sector-0 checksum.
pub fn classify(sectors: &[Sector<'_>], summary: &FooterSummary) -> SaveType {
    let trainer = sectors[summary.physical_by_id[TRAINER_INFO_SECTOR as usize]];
    let Ok(footer) = trainer.footer() else {
        return SaveType::Unrecognized;
    };
    let data = trainer.data();
    let id = TRAINER_INFO_SECTOR as usize;

    let rse = checksum::verify(data, RSE_PAYLOAD_SIZES[id], footer.checksum);
    let frlg = checksum::verify(data, FRLG_PAYLOAD_SIZES[id], footer.checksum);

    let detected = match (rse, frlg) {
        (true, false) => SaveType::Rse,
        (false, true) => SaveType::Frlg,
        (true, true) => {
            if read_u32_at(data, GAME_CODE_OFFSET) == FRLG_GAME_CODE {
                SaveType::Frlg
            } else {
                SaveType::Rse
            }
        }
        (false, false) => SaveType::Unrecognized,
    };
    debug!(
        "save index {} classified as {detected} (rse={rse}, frlg={frlg})",
        summary.save_index
    );
    detected
}

/// Classifies a whole image by its newest recognisable copy.
pub fn detect_save_type(image: &[u8]) -> SaveType {
    if image.len() != SAVE_IMAGE_SIZE {
        return SaveType::Unrecognized;
    }

    let mut best: Option<(u32, SaveType)> = None;
    for slot in image[..SLOT_SIZE * 2].chunks_exact(SLOT_SIZE) {
        let Ok(sectors) = slot_sectors(slot) else {
            continue;
        };
        let Ok(summary) = inspect_footers(&sectors) else {
            continue;
        };
        let save_type = classify(&sectors, &summary);
        if save_type == SaveType::Unrecognized {
            continue;
        }
        best = match best {
            Some((index, _)) if !is_newer(summary.save_index, index) => best,
            _ => Some((summary.save_index, save_type)),
        };
    }

    best.map_or(SaveType::Unrecognized, |(_, save_type)| save_type)
}

/// True when `candidate` was written after `current`. The console only
/// special-cases the step from `u32::MAX` to 0; no other wrap is assumed.
pub fn is_newer(candidate: u32, current: u32) -> bool {
    match (candidate, current) {
        (0, u32::MAX) => true,
        (u32::MAX, 0) => false,
        _ => candidate > current,
    }
}
