//! DWARF decoder
//!
//! Reads an object file with `object`, loads its DWARF sections with `gimli`
//! and flattens every compilation unit into an [`EntryStore`]. Each DIE
//! becomes one [`DebugEntry`] keyed by its absolute `.debug_info` offset, so
//! unit-local (`DW_FORM_ref*`) and section-global (`DW_FORM_ref_addr`)
//! references land in the same identifier space.
//!
//! Only the attributes in [`Attr`] are decoded. Non-reference attributes in
//! a form the reconstructor has no reading for are dropped with a trace
//! event. References in a form without a `.debug_info` offset (type
//! signatures, supplementary objects) are kept as
//! [`AttrValue::UnresolvedRef`] so the builder can reject the subprogram
//! instead of reading the reference as absent.

use super::entry_store::EntryStore;
use crate::error::{Result, ResultExt};
use crate::types::{Attr, AttrValue, DebugEntry, EntryId, Tag};
use gimli::{
    AttributeValue, DebuggingInformationEntry, Dwarf, EndianSlice, EntriesTreeNode, ReaderOffset,
    RunTimeEndian, Unit,
};
use object::{Object, ObjectSection};
use std::borrow::Cow;
use std::path::Path;

type Reader<'a> = EndianSlice<'a, RunTimeEndian>;

/// Attributes read off every DIE, with their DWARF constant
const DECODED_ATTRS: [(gimli::DwAt, Attr); 14] = [
    (gimli::DW_AT_name, Attr::Name),
    (gimli::DW_AT_type, Attr::Type),
    (gimli::DW_AT_inline, Attr::Inline),
    (gimli::DW_AT_upper_bound, Attr::UpperBound),
    (gimli::DW_AT_count, Attr::Count),
    (gimli::DW_AT_declaration, Attr::Declaration),
    (gimli::DW_AT_external, Attr::External),
    (gimli::DW_AT_abstract_origin, Attr::AbstractOrigin),
    (gimli::DW_AT_specification, Attr::Specification),
    (gimli::DW_AT_prototyped, Attr::Prototyped),
    (gimli::DW_AT_decl_file, Attr::DeclFile),
    (gimli::DW_AT_decl_line, Attr::DeclLine),
    (gimli::DW_AT_byte_size, Attr::ByteSize),
    (gimli::DW_AT_encoding, Attr::Encoding),
];

/// One decoded compilation unit
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    /// Offset of the unit header in `.debug_info`
    pub offset: u64,
    /// `DW_AT_name` of the compile unit DIE, usually the source file
    pub name: Option<String>,
    pub store: EntryStore,
}

impl CompilationUnit {
    /// Name for diagnostics: the unit name, or its offset
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("unit@0x{:x}", self.offset),
        }
    }
}

/// Decoder entry points
pub struct DwarfDecoder;

impl DwarfDecoder {
    /// Read and decode an object file from disk
    pub fn parse_file(path: &Path) -> Result<Vec<CompilationUnit>> {
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse_bytes(&data).with_context(|| format!("Failed to decode {}", path.display()))
    }

    /// Decode the DWARF of an in-memory object file
    pub fn parse_bytes(data: &[u8]) -> Result<Vec<CompilationUnit>> {
        let file = object::File::parse(data)?;

        let endian = if file.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };

        // Missing sections load as empty
        let load_section = |id: gimli::SectionId| -> std::result::Result<Cow<[u8]>, gimli::Error> {
            Ok(file
                .section_by_name(id.name())
                .and_then(|s| s.data().ok())
                .map(Cow::Borrowed)
                .unwrap_or(Cow::Borrowed(&[])))
        };

        let dwarf_sections: gimli::DwarfSections<Cow<[u8]>> =
            gimli::DwarfSections::load(load_section)?;
        let dwarf = dwarf_sections.borrow(|section| EndianSlice::new(section, endian));

        Self::decode(&dwarf)
    }

    /// Decode every compilation unit of already loaded DWARF sections
    pub fn decode(dwarf: &Dwarf<Reader<'_>>) -> Result<Vec<CompilationUnit>> {
        let mut units = dwarf.units();
        let mut decoded = Vec::new();

        while let Some(header) = units.next()? {
            let unit = dwarf.unit(header)?;
            let unit = decode_unit(dwarf, &unit)?;
            tracing::debug!(
                "Decoded {} ({} entries)",
                unit.label(),
                unit.store.len()
            );
            decoded.push(unit);
        }

        tracing::info!("Decoded {} compilation unit(s)", decoded.len());
        Ok(decoded)
    }
}

fn decode_unit<'a>(dwarf: &Dwarf<Reader<'a>>, unit: &Unit<Reader<'a>>) -> Result<CompilationUnit> {
    let offset = unit
        .header
        .offset()
        .as_debug_info_offset()
        .map(|o| o.0.into_u64())
        .unwrap_or(0);

    let mut tree = unit.entries_tree(None)?;
    let root = tree.root()?;

    let mut entries = Vec::new();
    decode_node(dwarf, unit, root, &mut entries)?;

    let name = entries
        .first()
        .and_then(|entry| entry.name())
        .map(str::to_string);
    let store = EntryStore::from_entries(entries)
        .with_context(|| format!("Failed to index unit at 0x{:x}", offset))?;

    Ok(CompilationUnit {
        offset,
        name,
        store,
    })
}

/// Flatten a DIE subtree in preorder, filling in each entry's child list
fn decode_node<'a>(
    dwarf: &Dwarf<Reader<'a>>,
    unit: &Unit<Reader<'a>>,
    node: EntriesTreeNode<Reader<'a>>,
    out: &mut Vec<DebugEntry>,
) -> Result<EntryId> {
    let entry = decode_entry(dwarf, unit, node.entry())?;
    let id = entry.id;
    let slot = out.len();
    out.push(entry);

    let mut child_ids = Vec::new();
    let mut children = node.children();
    while let Some(child) = children.next()? {
        child_ids.push(decode_node(dwarf, unit, child, out)?);
    }
    out[slot].children = child_ids;

    Ok(id)
}

fn decode_entry<'a>(
    dwarf: &Dwarf<Reader<'a>>,
    unit: &Unit<Reader<'a>>,
    entry: &DebuggingInformationEntry<Reader<'a>>,
) -> Result<DebugEntry> {
    let id = entry_id(unit, entry.offset());
    let mut decoded = DebugEntry::new(id, map_tag(entry.tag()));

    for (dw_at, attr) in DECODED_ATTRS {
        let Some(value) = entry
            .attr_value(dw_at)
            .with_context(|| format!("Failed to read {} of {}", attr, id))?
        else {
            continue;
        };
        match decode_value(dwarf, unit, attr, value) {
            Some(value) => {
                decoded.attrs.insert(attr, value);
            }
            None => tracing::trace!("{}: unreadable form for {}", id, attr),
        }
    }

    Ok(decoded)
}

/// Absolute `.debug_info` offset of a unit-relative DIE offset
fn entry_id(unit: &Unit<Reader<'_>>, offset: gimli::UnitOffset) -> EntryId {
    let absolute = offset
        .to_debug_info_offset(&unit.header)
        .map(|o| o.0.into_u64())
        .unwrap_or_else(|| offset.0.into_u64());
    EntryId(absolute)
}

fn decode_value<'a>(
    dwarf: &Dwarf<Reader<'a>>,
    unit: &Unit<Reader<'a>>,
    attr: Attr,
    value: AttributeValue<Reader<'a>>,
) -> Option<AttrValue> {
    match attr {
        Attr::Name => dwarf
            .attr_string(unit, value)
            .ok()
            .map(|s| AttrValue::String(s.to_string_lossy().to_string())),
        Attr::Type | Attr::AbstractOrigin | Attr::Specification => match value {
            AttributeValue::UnitRef(offset) => Some(AttrValue::Ref(entry_id(unit, offset))),
            // Global reference in .debug_info (ARM compilers, DW_FORM_ref_addr)
            AttributeValue::DebugInfoRef(offset) => {
                Some(AttrValue::Ref(EntryId(offset.0.into_u64())))
            }
            other => Some(AttrValue::UnresolvedRef(describe_reference(&other))),
        },
        Attr::Declaration | Attr::External | Attr::Prototyped => match value {
            AttributeValue::Flag(flag) => Some(AttrValue::Flag(flag)),
            _ => None,
        },
        Attr::Inline => match value {
            AttributeValue::Inline(inl) => Some(AttrValue::Unsigned(inl.0 as u64)),
            other => constant(other),
        },
        Attr::Encoding => match value {
            AttributeValue::Encoding(ate) => Some(AttrValue::Unsigned(ate.0 as u64)),
            other => constant(other),
        },
        Attr::DeclFile => match value {
            AttributeValue::FileIndex(index) => Some(AttrValue::Unsigned(index)),
            other => constant(other),
        },
        Attr::UpperBound | Attr::Count | Attr::DeclLine | Attr::ByteSize => constant(value),
    }
}

/// Diagnostic text for a reference form that has no `.debug_info` offset
fn describe_reference(value: &AttributeValue<Reader<'_>>) -> String {
    match value {
        AttributeValue::DebugTypesRef(signature) => {
            format!("type signature 0x{:016x}", signature.0)
        }
        AttributeValue::DebugInfoRefSup(offset) => {
            format!("supplementary .debug_info offset 0x{:x}", offset.0.into_u64())
        }
        _ => "non-reference form".to_string(),
    }
}

/// Integer constant forms
fn constant(value: AttributeValue<Reader<'_>>) -> Option<AttrValue> {
    match value {
        AttributeValue::Udata(v) => Some(AttrValue::Unsigned(v)),
        AttributeValue::Data1(v) => Some(AttrValue::Unsigned(v as u64)),
        AttributeValue::Data2(v) => Some(AttrValue::Unsigned(v as u64)),
        AttributeValue::Data4(v) => Some(AttrValue::Unsigned(v as u64)),
        AttributeValue::Data8(v) => Some(AttrValue::Unsigned(v)),
        AttributeValue::Sdata(v) => Some(AttrValue::Signed(v)),
        _ => None,
    }
}

fn map_tag(tag: gimli::DwTag) -> Tag {
    match tag {
        gimli::DW_TAG_compile_unit => Tag::CompileUnit,
        gimli::DW_TAG_subprogram => Tag::Subprogram,
        gimli::DW_TAG_formal_parameter => Tag::FormalParameter,
        gimli::DW_TAG_unspecified_parameters => Tag::UnspecifiedParameters,
        gimli::DW_TAG_pointer_type => Tag::PointerType,
        gimli::DW_TAG_const_type => Tag::ConstType,
        gimli::DW_TAG_volatile_type => Tag::VolatileType,
        gimli::DW_TAG_restrict_type => Tag::RestrictType,
        gimli::DW_TAG_base_type => Tag::BaseType,
        gimli::DW_TAG_structure_type => Tag::StructureType,
        gimli::DW_TAG_union_type => Tag::UnionType,
        gimli::DW_TAG_enumeration_type => Tag::EnumerationType,
        gimli::DW_TAG_array_type => Tag::ArrayType,
        gimli::DW_TAG_typedef => Tag::Typedef,
        gimli::DW_TAG_subrange_type => Tag::SubrangeType,
        gimli::DW_TAG_subroutine_type => Tag::SubroutineType,
        gimli::DW_TAG_inlined_subroutine => Tag::InlinedSubroutine,
        gimli::DW_TAG_variable => Tag::Variable,
        gimli::DW_TAG_member => Tag::Member,
        gimli::DW_TAG_lexical_block => Tag::LexicalBlock,
        other => Tag::Other(other.0),
    }
}
