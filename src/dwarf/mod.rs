//! DWARF input side
//!
//! - [`EntryStore`] - the decoded DIEs of one compilation unit
//! - [`DwarfDecoder`] - reads an object file with `object` and decodes every
//!   compilation unit with `gimli` into an [`EntryStore`]

pub mod decoder;
pub mod entry_store;

pub use decoder::{CompilationUnit, DwarfDecoder};
pub use entry_store::{DanglingReference, EntryStore, EntryStoreStats};
