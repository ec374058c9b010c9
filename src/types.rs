//! Core data types for decoded debugging information entries
//!
//! This module contains the flat, already-decoded view of a compilation
//! unit's DIEs that the rest of the crate works on. The byte-level decoder
//! (see [`crate::dwarf::decoder`]) produces these; everything downstream only
//! reads them.
//!
//! # Main Types
//!
//! - [`EntryId`] - Stable identifier of a DIE within one compilation unit
//! - [`Tag`] - Closed set of DIE kinds the reconstructor knows about
//! - [`Attr`] - Closed set of attributes the reconstructor reads
//! - [`AttrValue`] - Decoded attribute value
//! - [`DebugEntry`] - One DIE: identifier, tag, attributes, ordered children

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a DIE, unique within its compilation unit.
///
/// The decoder uses the absolute `.debug_info` offset so that unit-local and
/// section-global references land in the same identifier space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct EntryId(pub u64);

impl EntryId {
    pub fn offset(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<0x{:x}>", self.0)
    }
}

impl From<u64> for EntryId {
    fn from(offset: u64) -> Self {
        EntryId(offset)
    }
}

/// DIE tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    CompileUnit,
    Subprogram,
    FormalParameter,
    /// `DW_TAG_unspecified_parameters`, the `...` marker
    UnspecifiedParameters,
    PointerType,
    ConstType,
    VolatileType,
    RestrictType,
    BaseType,
    StructureType,
    UnionType,
    EnumerationType,
    ArrayType,
    Typedef,
    SubrangeType,
    SubroutineType,
    InlinedSubroutine,
    Variable,
    Member,
    LexicalBlock,
    /// Any tag the reconstructor has no use for, with its raw DW_TAG value
    Other(u16),
}

impl Tag {
    /// The DWARF spelling of this tag
    pub fn dwarf_name(&self) -> std::borrow::Cow<'static, str> {
        let name = match self {
            Tag::CompileUnit => "DW_TAG_compile_unit",
            Tag::Subprogram => "DW_TAG_subprogram",
            Tag::FormalParameter => "DW_TAG_formal_parameter",
            Tag::UnspecifiedParameters => "DW_TAG_unspecified_parameters",
            Tag::PointerType => "DW_TAG_pointer_type",
            Tag::ConstType => "DW_TAG_const_type",
            Tag::VolatileType => "DW_TAG_volatile_type",
            Tag::RestrictType => "DW_TAG_restrict_type",
            Tag::BaseType => "DW_TAG_base_type",
            Tag::StructureType => "DW_TAG_structure_type",
            Tag::UnionType => "DW_TAG_union_type",
            Tag::EnumerationType => "DW_TAG_enumeration_type",
            Tag::ArrayType => "DW_TAG_array_type",
            Tag::Typedef => "DW_TAG_typedef",
            Tag::SubrangeType => "DW_TAG_subrange_type",
            Tag::SubroutineType => "DW_TAG_subroutine_type",
            Tag::InlinedSubroutine => "DW_TAG_inlined_subroutine",
            Tag::Variable => "DW_TAG_variable",
            Tag::Member => "DW_TAG_member",
            Tag::LexicalBlock => "DW_TAG_lexical_block",
            Tag::Other(raw) => return format!("DW_TAG_0x{:x}", raw).into(),
        };
        name.into()
    }

    /// Check if this tag is one of the cv/restrict qualifier wrappers
    pub fn is_qualifier(&self) -> bool {
        matches!(
            self,
            Tag::ConstType | Tag::VolatileType | Tag::RestrictType
        )
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.dwarf_name())
    }
}

/// DIE attribute name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attr {
    Name,
    Type,
    Inline,
    UpperBound,
    Count,
    Declaration,
    External,
    AbstractOrigin,
    Specification,
    Prototyped,
    DeclFile,
    DeclLine,
    ByteSize,
    Encoding,
}

impl std::fmt::Display for Attr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Attr::Name => "DW_AT_name",
            Attr::Type => "DW_AT_type",
            Attr::Inline => "DW_AT_inline",
            Attr::UpperBound => "DW_AT_upper_bound",
            Attr::Count => "DW_AT_count",
            Attr::Declaration => "DW_AT_declaration",
            Attr::External => "DW_AT_external",
            Attr::AbstractOrigin => "DW_AT_abstract_origin",
            Attr::Specification => "DW_AT_specification",
            Attr::Prototyped => "DW_AT_prototyped",
            Attr::DeclFile => "DW_AT_decl_file",
            Attr::DeclLine => "DW_AT_decl_line",
            Attr::ByteSize => "DW_AT_byte_size",
            Attr::Encoding => "DW_AT_encoding",
        };
        f.write_str(name)
    }
}

/// Decoded attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
    Unsigned(u64),
    Signed(i64),
    String(String),
    Flag(bool),
    /// Reference to another entry in the same compilation unit
    Ref(EntryId),
    /// Reference in a form with no `.debug_info` offset, such as a type
    /// signature (`DW_FORM_ref_sig8`) or a supplementary object offset.
    /// Keeps the form's description for diagnostics.
    UnresolvedRef(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value is a reference of any form
    pub fn is_reference(&self) -> bool {
        matches!(self, AttrValue::Ref(_) | AttrValue::UnresolvedRef(_))
    }

    pub fn as_ref_id(&self) -> Option<EntryId> {
        match self {
            AttrValue::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// Interpret as an unsigned integer; negative signed values yield `None`
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            AttrValue::Unsigned(v) => Some(*v),
            AttrValue::Signed(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Interpret as a flag. DWARF flags may also come through as constants.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AttrValue::Flag(b) => Some(*b),
            AttrValue::Unsigned(v) => Some(*v != 0),
            _ => None,
        }
    }
}

/// A single decoded DIE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugEntry {
    pub id: EntryId,
    pub tag: Tag,
    pub attrs: BTreeMap<Attr, AttrValue>,
    /// Child entries in declaration order
    pub children: Vec<EntryId>,
}

impl DebugEntry {
    pub fn new(id: impl Into<EntryId>, tag: Tag) -> Self {
        Self {
            id: id.into(),
            tag,
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, attr: Attr, value: AttrValue) -> Self {
        self.attrs.insert(attr, value);
        self
    }

    /// Builder-style child setter
    pub fn with_children(mut self, children: impl IntoIterator<Item = EntryId>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    pub fn attr(&self, attr: Attr) -> Option<&AttrValue> {
        self.attrs.get(&attr)
    }

    pub fn has_attr(&self, attr: Attr) -> bool {
        self.attrs.contains_key(&attr)
    }

    pub fn name(&self) -> Option<&str> {
        self.attr(Attr::Name).and_then(AttrValue::as_str)
    }

    /// Target of the `DW_AT_type` reference, if any
    pub fn type_ref(&self) -> Option<EntryId> {
        self.attr(Attr::Type).and_then(AttrValue::as_ref_id)
    }

    pub fn flag(&self, attr: Attr) -> bool {
        self.attr(attr).and_then(AttrValue::as_flag).unwrap_or(false)
    }

    /// All `(attribute, target)` pairs that reference another entry
    pub fn references(&self) -> impl Iterator<Item = (Attr, EntryId)> + '_ {
        self.attrs
            .iter()
            .filter_map(|(attr, value)| value.as_ref_id().map(|id| (*attr, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_display() {
        assert_eq!(EntryId(0x2d).to_string(), "<0x2d>");
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(Tag::RestrictType.to_string(), "DW_TAG_restrict_type");
        assert_eq!(Tag::Other(0x4109).to_string(), "DW_TAG_0x4109");
        assert!(Tag::VolatileType.is_qualifier());
        assert!(!Tag::PointerType.is_qualifier());
    }

    #[test]
    fn test_attr_value_conversions() {
        assert_eq!(AttrValue::Signed(20).as_u64(), Some(20));
        assert_eq!(AttrValue::Signed(-1).as_u64(), None);
        assert_eq!(AttrValue::Unsigned(1).as_flag(), Some(true));
        assert_eq!(AttrValue::Ref(EntryId(4)).as_ref_id(), Some(EntryId(4)));
        assert_eq!(AttrValue::String("x".into()).as_ref_id(), None);

        let sig8 = AttrValue::UnresolvedRef("type signature 0x12345678".into());
        assert!(sig8.is_reference());
        assert_eq!(sig8.as_ref_id(), None);
        assert!(!AttrValue::Unsigned(3).is_reference());
    }

    #[test]
    fn test_debug_entry_accessors() {
        let entry = DebugEntry::new(0x40, Tag::FormalParameter)
            .with_attr(Attr::Name, AttrValue::String("ptr".to_string()))
            .with_attr(Attr::Type, AttrValue::Ref(EntryId(0x50)))
            .with_attr(Attr::Declaration, AttrValue::Flag(true));

        assert_eq!(entry.name(), Some("ptr"));
        assert_eq!(entry.type_ref(), Some(EntryId(0x50)));
        assert!(entry.flag(Attr::Declaration));
        assert!(!entry.flag(Attr::External));

        let refs: Vec<_> = entry.references().collect();
        assert_eq!(refs, vec![(Attr::Type, EntryId(0x50))]);
    }
}
