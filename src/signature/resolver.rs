//! Type Resolver
//!
//! Follows a `DW_AT_type` reference through the wrapper entries
//! (const/volatile/restrict/pointer/array) down to a terminal and builds a
//! [`TypeDescriptor`]. Struct, union, enum and typedef entries are terminals
//! that are referenced by identifier and never expanded, which is what keeps
//! self-referential aggregates finite.
//!
//! The resolver holds no state between calls: resolving the same reference
//! twice yields equal descriptors, and concurrent resolution over one store
//! needs no locking.

use super::descriptor::{NamedKind, Qualifier, TypeDescriptor, TypeKind};
use crate::dwarf::EntryStore;
use crate::error::{SignatureError, Unsupported};
use crate::types::{Attr, AttrValue, DebugEntry, EntryId, Tag};

/// Resolves type references against one compilation unit's entries
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'s> {
    store: &'s EntryStore,
}

impl<'s> TypeResolver<'s> {
    pub fn new(store: &'s EntryStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'s EntryStore {
        self.store
    }

    /// Resolve the type entry `type_ref` into a descriptor
    pub fn resolve(&self, type_ref: EntryId) -> Result<TypeDescriptor, SignatureError> {
        let mut path = Vec::new();
        self.resolve_on_path(type_ref, &mut path)
    }

    /// Resolve `id`, tracking the wrapper entries visited on the way down.
    /// Revisiting one of them means the chain loops without a named terminal.
    fn resolve_on_path(
        &self,
        id: EntryId,
        path: &mut Vec<EntryId>,
    ) -> Result<TypeDescriptor, SignatureError> {
        if path.contains(&id) {
            return Err(SignatureError::ReferenceCycle { id });
        }
        path.push(id);
        let result = self.resolve_entry(id, path);
        path.pop();
        result
    }

    fn resolve_entry(
        &self,
        id: EntryId,
        path: &mut Vec<EntryId>,
    ) -> Result<TypeDescriptor, SignatureError> {
        let entry = self.store.get(id)?;

        match entry.tag {
            Tag::ConstType => self.resolve_qualified(entry, Qualifier::Const, path),
            Tag::VolatileType => self.resolve_qualified(entry, Qualifier::Volatile, path),
            Tag::RestrictType => {
                if !self.is_pointer_like(reference(entry, Attr::Type)?)? {
                    return Err(SignatureError::MisplacedRestrict { id });
                }
                self.resolve_qualified(entry, Qualifier::Restrict, path)
            }
            Tag::PointerType => {
                let pointee = self.resolve_target(entry, path)?;
                Ok(TypeDescriptor::pointer_to(pointee))
            }
            Tag::ArrayType => self.resolve_array(entry, path),
            Tag::BaseType => match entry.name() {
                Some(name) => Ok(TypeDescriptor::base(name)),
                None => Err(SignatureError::MissingName { id }),
            },
            Tag::StructureType => Ok(named(entry, NamedKind::Struct)),
            Tag::UnionType => Ok(named(entry, NamedKind::Union)),
            Tag::EnumerationType => Ok(named(entry, NamedKind::Enum)),
            Tag::Typedef => match entry.name() {
                Some(_) => Ok(named(entry, NamedKind::Typedef)),
                None => Err(SignatureError::MissingName { id }),
            },
            Tag::SubroutineType => Err(SignatureError::UnsupportedConstruct {
                id,
                construct: Unsupported::FunctionPointer,
            }),
            Tag::CompileUnit
            | Tag::Subprogram
            | Tag::FormalParameter
            | Tag::UnspecifiedParameters
            | Tag::SubrangeType
            | Tag::InlinedSubroutine
            | Tag::Variable
            | Tag::Member
            | Tag::LexicalBlock
            | Tag::Other(_) => Err(SignatureError::UnexpectedTag { id, tag: entry.tag }),
        }
    }

    /// Resolve the entry's own `DW_AT_type`; a wrapper without one wraps `void`
    fn resolve_target(
        &self,
        entry: &DebugEntry,
        path: &mut Vec<EntryId>,
    ) -> Result<TypeDescriptor, SignatureError> {
        match reference(entry, Attr::Type)? {
            Some(target) => self.resolve_on_path(target, path),
            None => Ok(TypeDescriptor::void()),
        }
    }

    fn resolve_qualified(
        &self,
        entry: &DebugEntry,
        qualifier: Qualifier,
        path: &mut Vec<EntryId>,
    ) -> Result<TypeDescriptor, SignatureError> {
        let inner = self.resolve_target(entry, path)?;
        Ok(prepend_qualifier(inner, qualifier))
    }

    fn resolve_array(
        &self,
        entry: &DebugEntry,
        path: &mut Vec<EntryId>,
    ) -> Result<TypeDescriptor, SignatureError> {
        let mut subranges = Vec::new();
        for &child in &entry.children {
            let child = self.store.get(child)?;
            if child.tag == Tag::SubrangeType {
                subranges.push(child);
            }
        }

        if subranges.len() > 1 {
            return Err(SignatureError::UnsupportedConstruct {
                id: entry.id,
                construct: Unsupported::MultiDimensionalArray,
            });
        }

        let element = match reference(entry, Attr::Type)? {
            Some(target) => self.resolve_on_path(target, path)?,
            None => return Err(SignatureError::MissingType { id: entry.id }),
        };
        if element.is_array() {
            return Err(SignatureError::UnsupportedConstruct {
                id: entry.id,
                construct: Unsupported::ArrayOfArrays,
            });
        }

        let len = subranges.first().and_then(|subrange| subrange_len(subrange));
        Ok(TypeDescriptor::array_of(element, len))
    }

    /// Whether `target` names a pointer, possibly behind qualifiers or typedefs.
    /// `restrict` is only meaningful on such a type.
    fn is_pointer_like(&self, target: Option<EntryId>) -> Result<bool, SignatureError> {
        let mut seen = Vec::new();
        let mut current = target;

        while let Some(id) = current {
            if seen.contains(&id) {
                return Err(SignatureError::ReferenceCycle { id });
            }
            seen.push(id);

            let entry = self.store.get(id)?;
            match entry.tag {
                Tag::PointerType => return Ok(true),
                Tag::ConstType | Tag::VolatileType | Tag::RestrictType | Tag::Typedef => {
                    current = reference(entry, Attr::Type)?;
                }
                _ => return Ok(false),
            }
        }

        Ok(false)
    }
}

/// Target of a reference attribute. A reference the decoder could not map to
/// an entry is an error, never an absent attribute.
pub(crate) fn reference(
    entry: &DebugEntry,
    attr: Attr,
) -> Result<Option<EntryId>, SignatureError> {
    match entry.attr(attr) {
        None => Ok(None),
        Some(AttrValue::Ref(target)) => Ok(Some(*target)),
        Some(AttrValue::UnresolvedRef(form)) => Err(SignatureError::UnresolvedReference {
            id: entry.id,
            attr,
            form: form.clone(),
        }),
        Some(_) if attr == Attr::Type => Err(SignatureError::MissingType { id: entry.id }),
        Some(_) => Err(SignatureError::UnresolvedReference {
            id: entry.id,
            attr,
            form: "non-reference form".to_string(),
        }),
    }
}

fn named(entry: &DebugEntry, kind: NamedKind) -> TypeDescriptor {
    TypeDescriptor::named(kind, entry.id, entry.name().map(str::to_string))
}

/// Put `qualifier` in front of the layer's existing qualifiers. A qualified
/// array is an array of qualified elements, so the qualifier moves down.
fn prepend_qualifier(mut ty: TypeDescriptor, qualifier: Qualifier) -> TypeDescriptor {
    match ty.kind {
        TypeKind::Array { element, len } => TypeDescriptor {
            qualifiers: ty.qualifiers,
            kind: TypeKind::Array {
                element: Box::new(prepend_qualifier(*element, qualifier)),
                len,
            },
        },
        _ => {
            ty.qualifiers.insert(0, qualifier);
            ty
        }
    }
}

/// Element count of a subrange: `DW_AT_count`, else inclusive
/// `DW_AT_upper_bound` + 1, else unbounded
fn subrange_len(subrange: &DebugEntry) -> Option<u64> {
    if let Some(count) = subrange.attr(Attr::Count).and_then(AttrValue::as_u64) {
        return Some(count);
    }
    subrange
        .attr(Attr::UpperBound)
        .and_then(AttrValue::as_u64)
        .and_then(|upper| upper.checked_add(1))
}
