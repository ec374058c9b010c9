//! Error handling for dwarf-prototypes
//!
//! Two layers of errors exist:
//!
//! - [`SignatureError`] is scoped to a single subprogram. It is collected into
//!   the per-unit report and never stops the rest of the unit.
//! - [`PrototypeError`] covers the outer surface (files, object parsing,
//!   DWARF decoding, configuration) and is what the binary reports.

use crate::types::{Attr, EntryId, Tag};
use serde::Serialize;
use thiserror::Error;

/// Broad classification of a per-subprogram failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    /// The decoded data is malformed (dangling reference, missing attribute)
    DecodeInconsistency,
    /// Valid DWARF the reconstructor intentionally does not handle yet
    UnsupportedConstruct,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::DecodeInconsistency => write!(f, "decode inconsistency"),
            ErrorCategory::UnsupportedConstruct => write!(f, "unsupported construct"),
        }
    }
}

/// Constructs the reconstructor knows about but refuses to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unsupported {
    /// An array type with more than one subrange
    MultiDimensionalArray,
    /// An array whose element type is itself an array
    ArrayOfArrays,
    /// A pointer to a subroutine type
    FunctionPointer,
}

impl std::fmt::Display for Unsupported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unsupported::MultiDimensionalArray => write!(f, "multi-dimensional array"),
            Unsupported::ArrayOfArrays => write!(f, "array of arrays"),
            Unsupported::FunctionPointer => write!(f, "function pointer type"),
        }
    }
}

/// Failure to reconstruct one subprogram's signature
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SignatureError {
    #[error("reference to unknown entry {id}")]
    UnknownEntry { id: EntryId },

    #[error("unexpected {tag} at {id} in a type chain")]
    UnexpectedTag { id: EntryId, tag: Tag },

    #[error("entry {id} has no usable type")]
    MissingType { id: EntryId },

    #[error("{attr} of {id} uses a reference form that cannot be followed ({form})")]
    UnresolvedReference { id: EntryId, attr: Attr, form: String },

    #[error("subprogram {id} has no name")]
    MissingName { id: EntryId },

    #[error("formal parameter {id} follows the variadic marker")]
    MalformedVariadic { id: EntryId },

    #[error("restrict at {id} does not qualify a pointer")]
    MisplacedRestrict { id: EntryId },

    #[error("type chain loops back to {id}")]
    ReferenceCycle { id: EntryId },

    #[error("{construct} at {id} is not supported")]
    UnsupportedConstruct { id: EntryId, construct: Unsupported },
}

impl SignatureError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SignatureError::UnsupportedConstruct { .. } => ErrorCategory::UnsupportedConstruct,
            _ => ErrorCategory::DecodeInconsistency,
        }
    }

    /// The offending entry
    pub fn entry(&self) -> EntryId {
        match self {
            SignatureError::UnknownEntry { id }
            | SignatureError::UnexpectedTag { id, .. }
            | SignatureError::MissingType { id }
            | SignatureError::UnresolvedReference { id, .. }
            | SignatureError::MissingName { id }
            | SignatureError::MalformedVariadic { id }
            | SignatureError::MisplacedRestrict { id }
            | SignatureError::ReferenceCycle { id }
            | SignatureError::UnsupportedConstruct { id, .. } => *id,
        }
    }
}

/// Errors raised while building an entry store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown entry {0}")]
    UnknownEntry(EntryId),

    #[error("entry {0} inserted twice")]
    DuplicateEntry(EntryId),
}

impl From<StoreError> for SignatureError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownEntry(id) | StoreError::DuplicateEntry(id) => {
                SignatureError::UnknownEntry { id }
            }
        }
    }
}

/// Main error type for dwarf-prototypes operations
#[derive(Error, Debug)]
pub enum PrototypeError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors related to object file parsing
    #[error("Object parsing error: {0}")]
    Object(#[from] object::Error),

    /// Errors related to DWARF decoding
    #[error("DWARF error: {0}")]
    Dwarf(#[from] gimli::Error),

    /// Errors related to entry store construction
    #[error("Entry store error: {0}")]
    Store(#[from] StoreError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PrototypeError>,
    },
}

impl PrototypeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PrototypeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for PrototypeError {
    fn from(err: serde_json::Error) -> Self {
        PrototypeError::Serialization(err.to_string())
    }
}

/// Result type alias for dwarf-prototypes operations
pub type Result<T> = std::result::Result<T, PrototypeError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<PrototypeError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
