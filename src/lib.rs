//! # dwarf-prototypes: C prototypes from DWARF
//!
//! Reconstructs C function prototypes from the debugging information entries
//! (DIEs) a compiler emits into an object file, and renders them back as C
//! declarations such as `struct Foo* brr(const struct Foo* f);`.
//!
//! ## Architecture
//!
//! - **Decoder** ([`dwarf::DwarfDecoder`]): reads the object file with `object`
//!   and flattens each compilation unit into an [`EntryStore`] with `gimli`
//! - **Entry Store** ([`EntryStore`]): immutable per-unit arena of [`DebugEntry`]s
//!   addressed by [`EntryId`]
//! - **Type Resolver** ([`TypeResolver`]): follows `DW_AT_type` chains into
//!   [`TypeDescriptor`] trees
//! - **Signature Builder** ([`SignatureBuilder`]): assembles a [`Signature`]
//!   for each subprogram
//! - **Renderer** ([`render`]): formats signatures in C declarator syntax
//!
//! Units are independent and the store is read-only, so units can be handed
//! to separate threads without synchronisation.
//!
//! ## Example
//!
//! ```ignore
//! use dwarf_prototypes::{config::ExtractConfig, prototypes::extract_file};
//!
//! let result = extract_file("a.out".as_ref(), &ExtractConfig::default())?;
//! println!("{}", result);
//! for failure in &result.failures {
//!     eprintln!("{}", failure);
//! }
//! ```

pub mod config;
pub mod dwarf;
pub mod error;
pub mod logging;
pub mod prototypes;
pub mod signature;
pub mod types;

// Re-export commonly used types
pub use config::{ExtractConfig, OutputFormat};
pub use dwarf::{CompilationUnit, DwarfDecoder, EntryStore};
pub use error::{PrototypeError, Result, SignatureError};
pub use prototypes::{Failure, Prototype, Prototypes};
pub use signature::{render, Signature, SignatureBuilder, TypeDescriptor, TypeResolver};
pub use types::{Attr, AttrValue, DebugEntry, EntryId, Tag};
