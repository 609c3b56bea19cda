use gen3_core::container::{SaveSlot, create_image, encode_fresh, write_slot};
use gen3_core::detect::{GAME_CODE_OFFSET, detect_copy, detect_save_type, is_newer};
use gen3_core::layout::{LogicalLayout, SaveType};
use gen3_core::sector::{SECTOR_SIZE, SLOT_SIZE};

fn payload(save_type: SaveType, game_code: u32) -> Vec<u8> {
    let len = LogicalLayout::for_type(save_type).total_len;
    let mut bytes: Vec<u8> = (0..len).map(|i| (i % 199) as u8).collect();
    bytes[GAME_CODE_OFFSET..GAME_CODE_OFFSET + 4].copy_from_slice(&game_code.to_le_bytes());
    bytes
}

#[test]
fn rse_image_is_detected() {
    let image = encode_fresh(&payload(SaveType::Rse, 0), SaveType::Rse).expect("fresh");
    assert_eq!(detect_save_type(&image), SaveType::Rse);
    assert_eq!(detect_copy(&image[..SLOT_SIZE]), SaveType::Rse);
}

#[test]
fn frlg_image_is_detected_by_game_code_when_lengths_tie() {
    // The FRLG trainer-info sector ends in zeros, so both lengths verify.
    let image = encode_fresh(&payload(SaveType::Frlg, 1), SaveType::Frlg).expect("fresh");
    assert_eq!(detect_save_type(&image), SaveType::Frlg);
}

#[test]
fn tie_without_frlg_game_code_reads_as_rse() {
    let image = encode_fresh(&payload(SaveType::Frlg, 0), SaveType::Frlg).expect("fresh");
    assert_eq!(detect_save_type(&image), SaveType::Rse);
}

#[test]
fn frlg_length_alone_classifies_as_frlg() {
    let mut image = encode_fresh(&payload(SaveType::Frlg, 0), SaveType::Frlg).expect("fresh");
    // Save index 1 puts sector 0 at physical 1. A byte past the FRLG length
    // breaks only the RSE-length checksum.
    image[SECTOR_SIZE + 0xF28] = 0xAB;
    assert_eq!(detect_copy(&image[..SLOT_SIZE]), SaveType::Frlg);
}

#[test]
fn erased_or_wrongly_sized_images_are_unrecognized() {
    assert_eq!(detect_save_type(&create_image()), SaveType::Unrecognized);
    assert_eq!(detect_save_type(&[0u8; 4096]), SaveType::Unrecognized);
    assert_eq!(detect_copy(&[0u8; 100]), SaveType::Unrecognized);
}

#[test]
fn newest_recognisable_copy_decides() {
    let mut image = create_image();
    write_slot(
        &mut image,
        SaveSlot::Primary,
        &payload(SaveType::Rse, 0),
        SaveType::Rse,
        3,
    )
    .expect("primary");
    write_slot(
        &mut image,
        SaveSlot::Backup,
        &payload(SaveType::Frlg, 1),
        SaveType::Frlg,
        4,
    )
    .expect("backup");
    assert_eq!(detect_save_type(&image), SaveType::Frlg);
    assert_eq!(detect_copy(&image[..SLOT_SIZE]), SaveType::Rse);
}

#[test]
fn save_index_ordering() {
    assert!(is_newer(2, 1));
    assert!(!is_newer(1, 1));
    assert!(is_newer(0, u32::MAX));
    assert!(!is_newer(u32::MAX - 1, u32::MAX));
}
