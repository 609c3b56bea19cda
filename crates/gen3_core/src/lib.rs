//! Generation III GBA save codec: sector validation, copy arbitration,
//! logical-buffer reassembly, box record layout and the console text
//! encoding.

pub mod checksum;
pub mod container;
pub mod core_api;
pub mod detect;
pub mod layout;
pub mod pk3;
pub mod reader;
pub mod regions;
pub mod sector;
pub mod text;

pub use container::{
    CopyStatus, DecodeOptions, LogicalSaveBuffer, SaveMetadata, SaveSlot, decode_save,
    decode_save_with, encode_save,
};
pub use layout::SaveType;
pub use pk3::{ChecksumMismatch, PokemonRecord, decode_record, encode_record};
