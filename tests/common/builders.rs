//! Test data builders for creating entry stores

use dwarf_prototypes::{Attr, AttrValue, DebugEntry, EntryId, EntryStore, Tag};

/// Builder for a single compilation unit's DIE tree
///
/// Identifiers are handed out in creation order, spaced like real DWARF
/// offsets. Type entries hang off the compile unit; parameters hang off
/// their subprogram.
pub struct StoreBuilder {
    entries: Vec<DebugEntry>,
    next_offset: u64,
}

impl StoreBuilder {
    pub fn new(unit_name: &str) -> Self {
        let root = DebugEntry::new(0x0b, Tag::CompileUnit)
            .with_attr(Attr::Name, AttrValue::String(unit_name.to_string()));
        Self {
            entries: vec![root],
            next_offset: 0x2d,
        }
    }

    pub fn root(&self) -> EntryId {
        self.entries[0].id
    }

    /// Add an entry of `tag` under `parent`
    pub fn add(&mut self, parent: EntryId, tag: Tag) -> EntryId {
        let id = EntryId(self.next_offset);
        self.next_offset += 7;
        self.entries.push(DebugEntry::new(id, tag));
        self.entry_mut(parent).children.push(id);
        id
    }

    /// Set an attribute on an existing entry
    pub fn set(&mut self, id: EntryId, attr: Attr, value: AttrValue) -> &mut Self {
        self.entry_mut(id).attrs.insert(attr, value);
        self
    }

    fn entry_mut(&mut self, id: EntryId) -> &mut DebugEntry {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .unwrap_or_else(|| panic!("no entry {} in builder", id))
    }

    fn named(&mut self, tag: Tag, name: &str) -> EntryId {
        let id = self.add(self.root(), tag);
        self.set(id, Attr::Name, AttrValue::String(name.to_string()));
        id
    }

    fn wrapper(&mut self, tag: Tag, target: Option<EntryId>) -> EntryId {
        let id = self.add(self.root(), tag);
        if let Some(target) = target {
            self.set(id, Attr::Type, AttrValue::Ref(target));
        }
        id
    }

    pub fn base(&mut self, name: &str) -> EntryId {
        self.named(Tag::BaseType, name)
    }

    pub fn structure(&mut self, name: &str) -> EntryId {
        self.named(Tag::StructureType, name)
    }

    pub fn typedef(&mut self, name: &str, target: EntryId) -> EntryId {
        let id = self.named(Tag::Typedef, name);
        self.set(id, Attr::Type, AttrValue::Ref(target));
        id
    }

    /// `None` makes a `void*`
    pub fn pointer(&mut self, target: Option<EntryId>) -> EntryId {
        self.wrapper(Tag::PointerType, target)
    }

    pub fn constant(&mut self, target: EntryId) -> EntryId {
        self.wrapper(Tag::ConstType, Some(target))
    }

    pub fn volatile(&mut self, target: EntryId) -> EntryId {
        self.wrapper(Tag::VolatileType, Some(target))
    }

    pub fn restrict(&mut self, target: EntryId) -> EntryId {
        self.wrapper(Tag::RestrictType, Some(target))
    }

    /// Single-dimension array with a `DW_AT_upper_bound` subrange
    pub fn array(&mut self, element: EntryId, len: Option<u64>) -> EntryId {
        let id = self.wrapper(Tag::ArrayType, Some(element));
        let subrange = self.add(id, Tag::SubrangeType);
        if let Some(len) = len {
            self.set(subrange, Attr::UpperBound, AttrValue::Unsigned(len - 1));
        }
        id
    }

    /// External subprogram with an optional return type
    pub fn subprogram(&mut self, name: &str, ret: Option<EntryId>) -> EntryId {
        let id = self.wrapper(Tag::Subprogram, ret);
        self.set(id, Attr::Name, AttrValue::String(name.to_string()))
            .set(id, Attr::External, AttrValue::Flag(true))
            .set(id, Attr::Prototyped, AttrValue::Flag(true));
        id
    }

    pub fn param(&mut self, function: EntryId, name: Option<&str>, ty: EntryId) -> EntryId {
        let id = self.add(function, Tag::FormalParameter);
        self.set(id, Attr::Type, AttrValue::Ref(ty));
        if let Some(name) = name {
            self.set(id, Attr::Name, AttrValue::String(name.to_string()));
        }
        id
    }

    pub fn variadic(&mut self, function: EntryId) -> EntryId {
        self.add(function, Tag::UnspecifiedParameters)
    }

    pub fn build(self) -> EntryStore {
        EntryStore::from_entries(self.entries).expect("builder ids are unique")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_builder() {
        let mut b = StoreBuilder::new("t.c");
        let int = b.base("int");
        let main = b.subprogram("main", Some(int));
        let argc = b.param(main, Some("argc"), int);
        let store = b.build();

        assert_eq!(store.root().unwrap().children, vec![int, main]);
        assert_eq!(store.get(main).unwrap().children, vec![argc]);
        assert_eq!(store.get(main).unwrap().type_ref(), Some(int));
    }
}
