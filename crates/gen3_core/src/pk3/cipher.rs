use super::shuffle::DATA_SIZE;

/// Transform between the stored 48-byte data region and its plaintext,
/// applied before unshuffling on read and after shuffling on write.
pub trait SubstructureCipher {
    fn decrypt(&self, data: &[u8; DATA_SIZE], pid: u32, ot_id: u32) -> [u8; DATA_SIZE];
    fn encrypt(&self, data: &[u8; DATA_SIZE], pid: u32, ot_id: u32) -> [u8; DATA_SIZE];
}

/// Pass-through for data that is already plaintext.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Plaintext;

impl SubstructureCipher for Plaintext {
    fn decrypt(&self, data: &[u8; DATA_SIZE], _pid: u32, _ot_id: u32) -> [u8; DATA_SIZE] {
        *data
    }

    fn encrypt(&self, data: &[u8; DATA_SIZE], _pid: u32, _ot_id: u32) -> [u8; DATA_SIZE] {
        *data
    }
}
