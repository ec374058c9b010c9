//! Resolved type and signature values
//!
//! A [`TypeDescriptor`] is a by-value tree: one qualifier list per layer plus
//! a [`TypeKind`]. Structs, unions, enums and typedefs are terminal
//! [`TypeKind::Named`] leaves holding only the entry identifier and name, so
//! a self-referential struct never expands into itself.

use crate::types::EntryId;
use serde::Serialize;

/// Type qualifier. `Restrict` only ever appears on a pointer layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Qualifier {
    Const,
    Volatile,
    Restrict,
}

impl Qualifier {
    pub fn keyword(&self) -> &'static str {
        match self {
            Qualifier::Const => "const",
            Qualifier::Volatile => "volatile",
            Qualifier::Restrict => "restrict",
        }
    }
}

impl std::fmt::Display for Qualifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The kind of a named (non-primitive) terminal type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NamedKind {
    Struct,
    Union,
    Enum,
    Typedef,
}

impl NamedKind {
    /// The C keyword that must precede the name, if any
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            NamedKind::Struct => Some("struct"),
            NamedKind::Union => Some("union"),
            NamedKind::Enum => Some("enum"),
            NamedKind::Typedef => None,
        }
    }
}

/// A reference to a struct/union/enum/typedef entry, by identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NamedType {
    pub kind: NamedKind,
    pub id: EntryId,
    /// `None` for anonymous aggregates
    pub name: Option<String>,
}

impl NamedType {
    /// C spelling of the type, e.g. `struct Foo` or `size_t`
    pub fn spelling(&self) -> String {
        let name = self.name.as_deref().unwrap_or("<anonymous>");
        match self.kind.keyword() {
            Some(keyword) => format!("{} {}", keyword, name),
            None => name.to_string(),
        }
    }
}

/// One layer of a resolved type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    Void,
    /// Primitive named by its `DW_AT_name`, e.g. `unsigned char`
    Base(String),
    Named(NamedType),
    Pointer(Box<TypeDescriptor>),
    /// `len` is `None` for an unbounded array (`[]`)
    Array {
        element: Box<TypeDescriptor>,
        len: Option<u64>,
    },
}

/// A fully resolved C type
///
/// `qualifiers` apply to this layer and keep the order in which the
/// qualifier entries were met, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeDescriptor {
    pub qualifiers: Vec<Qualifier>,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            qualifiers: Vec::new(),
            kind,
        }
    }

    pub fn void() -> Self {
        Self::new(TypeKind::Void)
    }

    pub fn base(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Base(name.into()))
    }

    pub fn named(kind: NamedKind, id: EntryId, name: Option<String>) -> Self {
        Self::new(TypeKind::Named(NamedType { kind, id, name }))
    }

    pub fn pointer_to(pointee: TypeDescriptor) -> Self {
        Self::new(TypeKind::Pointer(Box::new(pointee)))
    }

    pub fn array_of(element: TypeDescriptor, len: Option<u64>) -> Self {
        Self::new(TypeKind::Array {
            element: Box::new(element),
            len,
        })
    }

    /// Builder-style qualifier append
    pub fn qualified(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeKind::Void) && self.qualifiers.is_empty()
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, TypeKind::Pointer(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array { .. })
    }

    /// Number of wrapper layers above the terminal
    pub fn depth(&self) -> usize {
        match &self.kind {
            TypeKind::Pointer(inner) => 1 + inner.depth(),
            TypeKind::Array { element, .. } => 1 + element.depth(),
            _ => 0,
        }
    }
}

/// How the compiler recorded the `inline` property (`DW_AT_inline`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InlineState {
    NotInlined,
    Inlined,
    DeclaredNotInlined,
    DeclaredInlined,
}

impl InlineState {
    pub fn from_dw_inl(value: u64) -> Option<Self> {
        match value {
            0 => Some(InlineState::NotInlined),
            1 => Some(InlineState::Inlined),
            2 => Some(InlineState::DeclaredNotInlined),
            3 => Some(InlineState::DeclaredInlined),
            _ => None,
        }
    }

    /// Whether the source declared the function `inline`
    pub fn is_declared_inline(&self) -> bool {
        matches!(
            self,
            InlineState::DeclaredNotInlined | InlineState::DeclaredInlined
        )
    }
}

/// One formal parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: Option<String>,
    pub ty: TypeDescriptor,
}

/// Where a subprogram was declared, for diagnostics only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// File index into the unit's line program header
    pub file: Option<u64>,
    pub line: Option<u64>,
}

/// A reconstructed function signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub entry: EntryId,
    pub name: String,
    /// `TypeKind::Void` when the subprogram has no `DW_AT_type`
    pub return_type: TypeDescriptor,
    pub parameters: Vec<Parameter>,
    pub is_inline: bool,
    pub is_variadic: bool,
    /// Declaration only, no body in debug info
    pub is_declaration: bool,
    pub is_external: bool,
    pub inline_state: Option<InlineState>,
    pub location: Option<SourceLocation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_spelling() {
        let foo = NamedType {
            kind: NamedKind::Struct,
            id: EntryId(0x30),
            name: Some("Foo".into()),
        };
        assert_eq!(foo.spelling(), "struct Foo");

        let anon = NamedType {
            kind: NamedKind::Union,
            id: EntryId(0x38),
            name: None,
        };
        assert_eq!(anon.spelling(), "union <anonymous>");

        let size_t = NamedType {
            kind: NamedKind::Typedef,
            id: EntryId(0x40),
            name: Some("size_t".into()),
        };
        assert_eq!(size_t.spelling(), "size_t");
    }

    #[test]
    fn test_descriptor_builders() {
        let ty = TypeDescriptor::pointer_to(
            TypeDescriptor::base("char")
                .qualified(Qualifier::Const)
                .qualified(Qualifier::Volatile),
        );
        assert!(ty.is_pointer());
        assert_eq!(ty.depth(), 1);
        assert!(!ty.is_void());
        assert!(TypeDescriptor::void().is_void());
        assert!(!TypeDescriptor::void().qualified(Qualifier::Const).is_void());
    }

    #[test]
    fn test_inline_state() {
        assert_eq!(InlineState::from_dw_inl(3), Some(InlineState::DeclaredInlined));
        assert_eq!(InlineState::from_dw_inl(7), None);
        assert!(InlineState::DeclaredNotInlined.is_declared_inline());
        assert!(!InlineState::Inlined.is_declared_inline());
    }
}
