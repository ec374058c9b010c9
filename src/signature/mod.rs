//! Signature reconstruction
//!
//! The read-only pipeline that runs over one unit's [`EntryStore`](crate::dwarf::EntryStore):
//!
//! - [`TypeResolver`] - follows `DW_AT_type` chains into [`TypeDescriptor`]s
//! - [`SignatureBuilder`] - assembles a [`Signature`] for a subprogram entry
//! - [`render`] - formats a signature as a C declaration
//!
//! # Example
//!
//! ```ignore
//! use dwarf_prototypes::signature::{render, SignatureBuilder};
//!
//! let builder = SignatureBuilder::new(&store);
//! for entry in store.subprograms() {
//!     match builder.build(entry) {
//!         Ok(signature) => println!("{}", render(&signature)),
//!         Err(err) => eprintln!("{}: {}", entry.id, err),
//!     }
//! }
//! ```

pub mod builder;
pub mod descriptor;
pub mod render;
pub mod resolver;

pub use builder::SignatureBuilder;
pub use descriptor::{
    InlineState, NamedKind, NamedType, Parameter, Qualifier, Signature, SourceLocation,
    TypeDescriptor, TypeKind,
};
pub use render::{render, render_declaration, render_type};
pub use resolver::TypeResolver;
