//! Entry Store for one compilation unit
//!
//! This module provides a flat arena of decoded DIEs. Entries are stored by
//! index in insertion order (which is the order of the input stream) and
//! looked up by [`EntryId`] through a side table, so references between
//! entries never need owning pointers:
//! - Forward references are just identifiers that resolve later
//! - Self-referential types (a struct holding a pointer to itself) are plain data
//! - The store is immutable after construction and can be shared across threads
//!
//! Construction is append-only; nothing is modified or removed once inserted.

use crate::error::StoreError;
use crate::types::{Attr, DebugEntry, EntryId, Tag};
use std::collections::HashMap;

/// A reference attribute whose target is not in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingReference {
    pub from: EntryId,
    pub attr: Attr,
    pub target: EntryId,
}

/// Entry counts per tag, mostly for logging
#[derive(Debug, Default, Clone)]
pub struct EntryStoreStats {
    pub total_entries: usize,
    pub subprograms: usize,
    pub formal_parameters: usize,
    pub pointers: usize,
    pub qualifiers: usize,
    pub base_types: usize,
    pub aggregates: usize,
    pub arrays: usize,
    pub typedefs: usize,
    pub other: usize,
}

/// The decoded entries of one compilation unit
#[derive(Debug, Default, Clone)]
pub struct EntryStore {
    /// All entries, in input order
    entries: Vec<DebugEntry>,
    /// Maps entry identifiers to their index in `entries`
    index: HashMap<EntryId, usize>,
}

impl EntryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build a store from a decoded entry stream
    pub fn from_entries(
        entries: impl IntoIterator<Item = DebugEntry>,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for entry in entries {
            store.insert(entry)?;
        }
        Ok(store)
    }

    /// Append an entry. Identifiers must be unique.
    pub fn insert(&mut self, entry: DebugEntry) -> Result<EntryId, StoreError> {
        let id = entry.id;
        if self.index.contains_key(&id) {
            return Err(StoreError::DuplicateEntry(id));
        }
        self.index.insert(id, self.entries.len());
        self.entries.push(entry);
        Ok(id)
    }

    /// Get the number of entries in the store
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.index.contains_key(&id)
    }

    /// Look up an entry by identifier
    pub fn get(&self, id: EntryId) -> Result<&DebugEntry, StoreError> {
        self.index
            .get(&id)
            .map(|&idx| &self.entries[idx])
            .ok_or(StoreError::UnknownEntry(id))
    }

    /// Children of an entry in declaration order
    ///
    /// A child identifier that is not in the store is reported as
    /// [`StoreError::UnknownEntry`].
    pub fn children_of(&self, id: EntryId) -> Result<Vec<&DebugEntry>, StoreError> {
        self.get(id)?
            .children
            .iter()
            .map(|&child| self.get(child))
            .collect()
    }

    /// Iterate over all entries in input order
    pub fn iter(&self) -> impl Iterator<Item = &DebugEntry> {
        self.entries.iter()
    }

    /// Iterate over all subprogram entries in input order
    pub fn subprograms(&self) -> impl Iterator<Item = &DebugEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.tag == Tag::Subprogram)
    }

    /// The root entry (the compile unit DIE), if the stream started with one
    pub fn root(&self) -> Option<&DebugEntry> {
        self.entries
            .first()
            .filter(|entry| entry.tag == Tag::CompileUnit)
    }

    /// Every reference attribute that does not resolve inside this store
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry
                    .references()
                    .filter(|(_, target)| !self.contains(*target))
                    .map(move |(attr, target)| DanglingReference {
                        from: entry.id,
                        attr,
                        target,
                    })
            })
            .collect()
    }

    /// Get statistics about the store
    pub fn stats(&self) -> EntryStoreStats {
        let mut stats = EntryStoreStats {
            total_entries: self.entries.len(),
            ..Default::default()
        };

        for entry in &self.entries {
            match entry.tag {
                Tag::Subprogram => stats.subprograms += 1,
                Tag::FormalParameter => stats.formal_parameters += 1,
                Tag::PointerType => stats.pointers += 1,
                Tag::ConstType | Tag::VolatileType | Tag::RestrictType => stats.qualifiers += 1,
                Tag::BaseType => stats.base_types += 1,
                Tag::StructureType | Tag::UnionType | Tag::EnumerationType => {
                    stats.aggregates += 1
                }
                Tag::ArrayType => stats.arrays += 1,
                Tag::Typedef => stats.typedefs += 1,
                _ => stats.other += 1,
            }
        }

        stats
    }
}
