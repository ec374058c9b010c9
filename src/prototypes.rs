//! Prototype extraction pipeline
//!
//! Runs the [`SignatureBuilder`] and [`render`] over every named subprogram
//! of each compilation unit. Units are independent, and within a unit one
//! failing subprogram is recorded as a [`Failure`] while the rest carry on.

use crate::config::ExtractConfig;
use crate::dwarf::{CompilationUnit, DwarfDecoder, EntryStore};
use crate::error::{Result, SignatureError};
use crate::signature::{render, Signature, SignatureBuilder};
use crate::types::{Attr, AttrValue, DebugEntry, EntryId};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// A reconstructed and rendered prototype
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prototype {
    /// Label of the compilation unit it came from
    pub unit: String,
    pub name: String,
    /// Rendered C declaration, including the trailing `;`
    pub declaration: String,
    pub signature: Signature,
}

/// A subprogram whose signature could not be reconstructed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub unit: String,
    pub entry: EntryId,
    pub name: Option<String>,
    pub error: SignatureError,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.unit)?;
        if let Some(name) = &self.name {
            write!(f, "{}: ", name)?;
        }
        write!(f, "{} ({})", self.error, self.error.category())
    }
}

/// Extraction result over one or more units
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Prototypes {
    pub prototypes: Vec<Prototype>,
    pub failures: Vec<Failure>,
}

impl Prototypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prototype> {
        self.prototypes.iter()
    }

    /// Look up a prototype by function name
    pub fn find(&self, name: &str) -> Option<&Prototype> {
        self.prototypes.iter().find(|p| p.name == name)
    }

    /// Append another result, keeping order
    pub fn merge(&mut self, other: Prototypes) {
        self.prototypes.extend(other.prototypes);
        self.failures.extend(other.failures);
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl std::fmt::Display for Prototypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.prototypes.is_empty() {
            return write!(f, "No prototypes");
        }
        for (i, prototype) in self.prototypes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", prototype.declaration)?;
        }
        Ok(())
    }
}

/// Declarations completed by a `DW_AT_specification` definition in the unit
fn specified_declarations(store: &EntryStore) -> HashSet<EntryId> {
    store
        .subprograms()
        .filter(|entry| !entry.has_attr(Attr::AbstractOrigin))
        .filter_map(|entry| entry.attr(Attr::Specification).and_then(AttrValue::as_ref_id))
        .collect()
}

/// Whether a subprogram entry is reported on its own
///
/// A function is reported from the entry that defines it: its own named
/// entry, or the nameless definition pointing at its declaration through
/// `DW_AT_specification`, in which case the declaration is skipped.
/// Concrete instances linked by `DW_AT_abstract_origin` are skipped, so each
/// function is reported once.
fn is_selected(
    entry: &DebugEntry,
    specified: &HashSet<EntryId>,
    config: &ExtractConfig,
) -> bool {
    let defines = entry.has_attr(Attr::Name)
        || (entry.has_attr(Attr::Specification) && !entry.has_attr(Attr::AbstractOrigin));
    if !defines || specified.contains(&entry.id) {
        return false;
    }
    config.include_declarations || !entry.flag(Attr::Declaration)
}

/// Name for diagnostics, falling back to the declaration a definition completes
fn display_name(store: &EntryStore, entry: &DebugEntry) -> Option<String> {
    entry
        .name()
        .or_else(|| {
            let declaration = entry.attr(Attr::Specification)?.as_ref_id()?;
            store.get(declaration).ok()?.name()
        })
        .map(str::to_string)
}

/// Extract the prototypes of one entry store
pub fn extract_store(unit: &str, store: &EntryStore, config: &ExtractConfig) -> Prototypes {
    let builder = SignatureBuilder::new(store);
    let specified = specified_declarations(store);
    let mut result = Prototypes::new();

    for entry in store
        .subprograms()
        .filter(|e| is_selected(e, &specified, config))
    {
        match builder.build(entry) {
            Ok(signature) => {
                let declaration = render(&signature);
                tracing::debug!("{}: {}", unit, declaration);
                result.prototypes.push(Prototype {
                    unit: unit.to_string(),
                    name: signature.name.clone(),
                    declaration,
                    signature,
                });
            }
            Err(error) => {
                let name = display_name(store, entry);
                tracing::warn!(
                    "{}: skipping {} at {}: {}",
                    unit,
                    name.as_deref().unwrap_or("<unnamed>"),
                    entry.id,
                    error
                );
                result.failures.push(Failure {
                    unit: unit.to_string(),
                    entry: entry.id,
                    name,
                    error,
                });
            }
        }
    }

    result
}

/// Extract the prototypes of one decoded compilation unit
pub fn extract_unit(unit: &CompilationUnit, config: &ExtractConfig) -> Prototypes {
    let dangling = unit.store.dangling_references();
    if !dangling.is_empty() {
        tracing::debug!(
            "{}: {} reference(s) leave the unit",
            unit.label(),
            dangling.len()
        );
    }
    extract_store(&unit.label(), &unit.store, config)
}

/// Extract the prototypes of every unit, in unit order
pub fn extract_units(units: &[CompilationUnit], config: &ExtractConfig) -> Prototypes {
    let mut result = Prototypes::new();
    for unit in units {
        result.merge(extract_unit(unit, config));
    }
    result
}

/// Decode an in-memory object file and extract its prototypes
pub fn extract_bytes(data: &[u8], config: &ExtractConfig) -> Result<Prototypes> {
    let units = DwarfDecoder::parse_bytes(data)?;
    Ok(extract_units(&units, config))
}

/// Read an object file from disk and extract its prototypes
pub fn extract_file(path: &Path, config: &ExtractConfig) -> Result<Prototypes> {
    let units = DwarfDecoder::parse_file(path)?;
    let result = extract_units(&units, config);
    tracing::info!(
        "{}: {} prototype(s), {} failure(s)",
        path.display(),
        result.len(),
        result.failures.len()
    );
    Ok(result)
}
