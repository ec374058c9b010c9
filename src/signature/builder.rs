//! Signature Builder
//!
//! Turns a `DW_TAG_subprogram` entry into a [`Signature`]: return type,
//! ordered parameters, variadic marker and the inline property.
//!
//! Concrete out-of-line instances of inline functions only carry a
//! `DW_AT_abstract_origin` link, and definitions split from their declaration
//! carry `DW_AT_specification`. Name, type and inline data are inherited
//! through those links.

use super::descriptor::{InlineState, Parameter, Signature, SourceLocation, TypeDescriptor};
use super::resolver::{reference, TypeResolver};
use crate::dwarf::EntryStore;
use crate::error::SignatureError;
use crate::types::{Attr, AttrValue, DebugEntry, EntryId, Tag};

/// Limit on `abstract_origin`/`specification` hops
const MAX_ORIGIN_DEPTH: usize = 8;

/// Builds signatures for the subprograms of one compilation unit
#[derive(Debug, Clone, Copy)]
pub struct SignatureBuilder<'s> {
    store: &'s EntryStore,
    resolver: TypeResolver<'s>,
}

impl<'s> SignatureBuilder<'s> {
    pub fn new(store: &'s EntryStore) -> Self {
        Self {
            store,
            resolver: TypeResolver::new(store),
        }
    }

    pub fn resolver(&self) -> &TypeResolver<'s> {
        &self.resolver
    }

    /// Build the signature of the subprogram with identifier `id`
    pub fn build_id(&self, id: EntryId) -> Result<Signature, SignatureError> {
        let entry = self.store.get(id)?;
        self.build(entry)
    }

    /// Build the signature of a subprogram entry
    pub fn build(&self, subprogram: &DebugEntry) -> Result<Signature, SignatureError> {
        if subprogram.tag != Tag::Subprogram {
            return Err(SignatureError::UnexpectedTag {
                id: subprogram.id,
                tag: subprogram.tag,
            });
        }

        let name = self
            .inherited(subprogram, Attr::Name)?
            .and_then(|value| value.as_str().map(str::to_string))
            .ok_or(SignatureError::MissingName { id: subprogram.id })?;

        let return_type = self
            .inherited_type(subprogram)?
            .unwrap_or_else(TypeDescriptor::void);

        let (parameters, is_variadic) = self.parameters(subprogram)?;

        let inline_state = self
            .inherited(subprogram, Attr::Inline)?
            .and_then(|value| value.as_u64())
            .and_then(InlineState::from_dw_inl);
        let is_inline = inline_state.is_some_and(|state| state.is_declared_inline());

        let is_external = self
            .inherited(subprogram, Attr::External)?
            .and_then(|value| value.as_flag())
            .unwrap_or(false);

        let file = self.inherited(subprogram, Attr::DeclFile)?.and_then(|v| v.as_u64());
        let line = self.inherited(subprogram, Attr::DeclLine)?.and_then(|v| v.as_u64());
        let location = (file.is_some() || line.is_some()).then_some(SourceLocation { file, line });

        Ok(Signature {
            entry: subprogram.id,
            name,
            return_type,
            parameters,
            is_inline,
            is_variadic,
            is_declaration: subprogram.flag(Attr::Declaration),
            is_external,
            inline_state,
            location,
        })
    }

    /// Collect formal parameters in child order and detect the `...` marker,
    /// which must come after every formal parameter.
    fn parameters(
        &self,
        subprogram: &DebugEntry,
    ) -> Result<(Vec<Parameter>, bool), SignatureError> {
        let mut parameters = Vec::new();
        let mut variadic_marker: Option<EntryId> = None;

        for &child_id in &subprogram.children {
            let child = self.store.get(child_id)?;
            match child.tag {
                Tag::FormalParameter => {
                    if variadic_marker.is_some() {
                        return Err(SignatureError::MalformedVariadic { id: child.id });
                    }
                    parameters.push(self.parameter(child)?);
                }
                Tag::UnspecifiedParameters => {
                    if variadic_marker.is_some() {
                        return Err(SignatureError::MalformedVariadic { id: child.id });
                    }
                    variadic_marker = Some(child.id);
                }
                _ => {}
            }
        }

        Ok((parameters, variadic_marker.is_some()))
    }

    fn parameter(&self, entry: &DebugEntry) -> Result<Parameter, SignatureError> {
        let ty = self
            .inherited_type(entry)?
            .ok_or(SignatureError::MissingType { id: entry.id })?;
        let name = self
            .inherited(entry, Attr::Name)?
            .and_then(|value| value.as_str().map(str::to_string));

        Ok(Parameter { name, ty })
    }

    /// Resolved `DW_AT_type` of the entry or of the entry it inherits it from
    fn inherited_type(
        &self,
        entry: &DebugEntry,
    ) -> Result<Option<TypeDescriptor>, SignatureError> {
        let Some(carrier) = self.carrier(entry, Attr::Type)? else {
            return Ok(None);
        };
        match reference(carrier, Attr::Type)? {
            Some(target) => self.resolver.resolve(target).map(Some),
            None => Ok(None),
        }
    }

    /// Look up `attr` on the entry, then along its abstract origin and
    /// specification links.
    fn inherited(
        &self,
        entry: &DebugEntry,
        attr: Attr,
    ) -> Result<Option<AttrValue>, SignatureError> {
        Ok(self
            .carrier(entry, attr)?
            .and_then(|carrier| carrier.attr(attr).cloned()))
    }

    /// The first entry on the origin chain that carries `attr`
    fn carrier<'e>(
        &self,
        entry: &'e DebugEntry,
        attr: Attr,
    ) -> Result<Option<&'e DebugEntry>, SignatureError>
    where
        's: 'e,
    {
        if entry.has_attr(attr) {
            return Ok(Some(entry));
        }

        let mut visited = vec![entry.id];
        let mut current = origin_of(entry)?;

        while let Some(id) = current {
            if visited.contains(&id) || visited.len() > MAX_ORIGIN_DEPTH {
                return Err(SignatureError::ReferenceCycle { id });
            }
            visited.push(id);

            let origin = self.store.get(id)?;
            if origin.has_attr(attr) {
                return Ok(Some(origin));
            }
            current = origin_of(origin)?;
        }

        Ok(None)
    }
}

fn origin_of(entry: &DebugEntry) -> Result<Option<EntryId>, SignatureError> {
    let link = if entry.has_attr(Attr::AbstractOrigin) {
        Attr::AbstractOrigin
    } else {
        Attr::Specification
    };
    reference(entry, link)
}
