//! Renderer
//!
//! Turns resolved types and signatures back into C declarations. Rendering
//! follows C declarator syntax: the declared name (for a function, the name
//! and parameter list) is the innermost declarator, pointer layers prefix
//! `*` and their own qualifiers, array layers suffix `[N]`, and a pointer
//! to an array is parenthesised. Qualifiers of a non-pointer layer precede
//! the type name. Stars hug the type: `char* p`, `char* const* p`.

use super::descriptor::{Parameter, Signature, TypeDescriptor, TypeKind};

/// Render a signature as a C declaration, including the trailing `;`
pub fn render(signature: &Signature) -> String {
    let mut out = String::new();
    if signature.is_inline {
        // A standalone inline function in C is spelled `static inline`
        out.push_str("static inline ");
    }

    let inner = format!("{}({})", signature.name, render_parameters(signature));
    out.push_str(&declare(&signature.return_type, inner));
    out.push(';');
    out
}

/// Render a type as an abstract declarator, e.g. `const char*`
pub fn render_type(ty: &TypeDescriptor) -> String {
    declare(ty, String::new())
}

/// Render `name` declared with type `ty`, e.g. `char* const p`
pub fn render_declaration(ty: &TypeDescriptor, name: &str) -> String {
    declare(ty, name.to_string())
}

fn render_parameters(signature: &Signature) -> String {
    let mut parts: Vec<String> = signature.parameters.iter().map(render_parameter).collect();
    if signature.is_variadic {
        parts.push("...".to_string());
    }
    if parts.is_empty() {
        return "void".to_string();
    }
    parts.join(", ")
}

fn render_parameter(parameter: &Parameter) -> String {
    declare(&parameter.ty, parameter.name.clone().unwrap_or_default())
}

/// Wrap the declarator `inner` in the layers of `ty`, outermost first
fn declare(ty: &TypeDescriptor, inner: String) -> String {
    match &ty.kind {
        TypeKind::Pointer(pointee) => {
            let mut star = String::from("*");
            for qualifier in &ty.qualifiers {
                star.push(' ');
                star.push_str(qualifier.keyword());
            }

            if pointee.is_array() {
                let grouped = if ty.qualifiers.is_empty() {
                    format!("({}{})", star, hug_name(&inner))
                } else {
                    format!("({})", join_pointer(star, &inner))
                };
                declare(pointee, grouped)
            } else {
                declare(pointee, join_pointer(star, &inner))
            }
        }
        TypeKind::Array { element, len } => {
            let suffix = match len {
                Some(len) => format!("[{}]", len),
                None => "[]".to_string(),
            };
            declare(element, inner + &suffix)
        }
        TypeKind::Void => specify(ty, "void", &inner),
        TypeKind::Base(name) => specify(ty, name, &inner),
        TypeKind::Named(named) => specify(ty, &named.spelling(), &inner),
    }
}

/// Qualifiers and spelling of a terminal layer, then its declarator
fn specify(ty: &TypeDescriptor, spelling: &str, inner: &str) -> String {
    let mut specifier = String::new();
    for qualifier in &ty.qualifiers {
        specifier.push_str(qualifier.keyword());
        specifier.push(' ');
    }
    specifier.push_str(spelling);
    attach(specifier, inner)
}

/// `*` followed by a nested declarator: `** p`, `* const* p`, `* p`
fn join_pointer(star: String, inner: &str) -> String {
    if inner.is_empty() || inner.starts_with('*') {
        star + inner
    } else {
        format!("{} {}", star, inner)
    }
}

/// Inside parentheses the name hugs a run of bare stars: `**p`, not `** p`.
/// A star followed by a qualifier keeps its space: `* const p`.
fn hug_name(inner: &str) -> String {
    let stars = inner.len() - inner.trim_start_matches('*').len();
    match inner[stars..].strip_prefix(' ') {
        Some(rest) if stars > 0 && !starts_with_qualifier(rest) => {
            format!("{}{}", &inner[..stars], rest)
        }
        _ => inner.to_string(),
    }
}

fn starts_with_qualifier(declarator: &str) -> bool {
    let word = declarator
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .next()
        .unwrap_or_default();
    matches!(word, "const" | "volatile" | "restrict")
}

/// Type specifier followed by its declarator: `char* p`, `int[4]`, `int x`
fn attach(specifier: String, inner: &str) -> String {
    if inner.is_empty() || inner.starts_with('*') || inner.starts_with('[') {
        specifier + inner
    } else {
        format!("{} {}", specifier, inner)
    }
}

impl std::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render_type(self))
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::descriptor::{NamedKind, Qualifier};
    use crate::types::EntryId;

    fn signature(name: &str, return_type: TypeDescriptor, parameters: Vec<Parameter>) -> Signature {
        Signature {
            entry: EntryId(0x30),
            name: name.to_string(),
            return_type,
            parameters,
            is_inline: false,
            is_variadic: false,
            is_declaration: false,
            is_external: true,
            inline_state: None,
            location: None,
        }
    }

    fn param(name: &str, ty: TypeDescriptor) -> Parameter {
        Parameter {
            name: Some(name.to_string()),
            ty,
        }
    }

    fn foo() -> TypeDescriptor {
        TypeDescriptor::named(NamedKind::Struct, EntryId(0x40), Some("Foo".into()))
    }

    #[test]
    fn test_render_types() {
        let char_ptr = TypeDescriptor::pointer_to(TypeDescriptor::base("char"));
        assert_eq!(render_type(&char_ptr), "char*");
        assert_eq!(
            render_type(&TypeDescriptor::pointer_to(char_ptr.clone())),
            "char**"
        );
        assert_eq!(render_declaration(&char_ptr, "p"), "char* p");
        assert_eq!(
            render_type(&TypeDescriptor::void().qualified(Qualifier::Const)),
            "const void"
        );
    }

    #[test]
    fn test_pointer_qualifiers_between_stars() {
        let ty = TypeDescriptor::pointer_to(
            TypeDescriptor::pointer_to(TypeDescriptor::base("char")).qualified(Qualifier::Const),
        );
        assert_eq!(render_declaration(&ty, "p"), "char* const* p");
        assert_eq!(render_type(&ty), "char* const*");
    }

    #[test]
    fn test_arrays() {
        let ints = TypeDescriptor::array_of(TypeDescriptor::base("int"), Some(10));
        assert_eq!(render_declaration(&ints, "a"), "int a[10]");
        assert_eq!(render_type(&ints), "int[10]");

        let open = TypeDescriptor::array_of(TypeDescriptor::base("int"), None);
        assert_eq!(render_declaration(&open, "a"), "int a[]");

        let to_array = TypeDescriptor::pointer_to(ints.clone());
        assert_eq!(render_declaration(&to_array, "p"), "int (*p)[10]");
        assert_eq!(render_type(&to_array), "int (*)[10]");

        let to_to_array = TypeDescriptor::pointer_to(to_array.clone());
        assert_eq!(render_declaration(&to_to_array, "pp"), "int (**pp)[10]");
        assert_eq!(render_type(&to_to_array), "int (**)[10]");

        let const_to_array = TypeDescriptor::pointer_to(to_array.qualified(Qualifier::Const));
        assert_eq!(render_declaration(&const_to_array, "pp"), "int (* const* pp)[10]");

        let pointers = TypeDescriptor::array_of(
            TypeDescriptor::pointer_to(TypeDescriptor::base("char").qualified(Qualifier::Const))
                .qualified(Qualifier::Const),
            Some(21),
        );
        assert_eq!(
            render_declaration(&pointers, "array"),
            "const char* const array[21]"
        );
    }

    #[test]
    fn test_struct_return_and_parameter() {
        let sig = signature(
            "brr",
            TypeDescriptor::pointer_to(foo()),
            vec![param(
                "f",
                TypeDescriptor::pointer_to(foo().qualified(Qualifier::Const)),
            )],
        );
        assert_eq!(render(&sig), "struct Foo* brr(const struct Foo* f);");
    }

    #[test]
    fn test_empty_and_variadic_parameter_lists() {
        let mut sig = signature("alloc", TypeDescriptor::pointer_to(TypeDescriptor::void()), vec![]);
        assert_eq!(render(&sig), "void* alloc(void);");

        sig.is_variadic = true;
        assert_eq!(render(&sig), "void* alloc(...);");

        sig.parameters
            .push(param("fmt", TypeDescriptor::pointer_to(TypeDescriptor::base("char"))));
        assert_eq!(render(&sig), "void* alloc(char* fmt, ...);");
    }

    #[test]
    fn test_unnamed_parameter() {
        let sig = signature(
            "f",
            TypeDescriptor::base("int"),
            vec![Parameter {
                name: None,
                ty: TypeDescriptor::pointer_to(TypeDescriptor::base("char").qualified(Qualifier::Const)),
            }],
        );
        assert_eq!(render(&sig), "int f(const char*);");
    }

    #[test]
    fn test_inline_prefix() {
        let mut sig = signature(
            "tiny",
            TypeDescriptor::base("int"),
            vec![param(
                "p",
                TypeDescriptor::pointer_to(TypeDescriptor::base("unsigned char").qualified(Qualifier::Const))
                    .qualified(Qualifier::Volatile)
                    .qualified(Qualifier::Restrict),
            )],
        );
        sig.is_inline = true;
        assert_eq!(
            render(&sig),
            "static inline int tiny(const unsigned char* volatile restrict p);"
        );
    }

    #[test]
    fn test_function_returning_pointer_to_array() {
        let sig = signature(
            "rows",
            TypeDescriptor::pointer_to(TypeDescriptor::array_of(TypeDescriptor::base("int"), Some(3))),
            vec![],
        );
        assert_eq!(render(&sig), "int (*rows(void))[3];");

        let sig = signature(
            "grid",
            TypeDescriptor::pointer_to(TypeDescriptor::pointer_to(TypeDescriptor::array_of(
                TypeDescriptor::base("int"),
                Some(3),
            ))),
            vec![param("n", TypeDescriptor::base("int"))],
        );
        assert_eq!(render(&sig), "int (**grid(int n))[3];");
    }

    #[test]
    fn test_display_impls() {
        let ty = TypeDescriptor::pointer_to(foo());
        assert_eq!(ty.to_string(), "struct Foo*");

        let sig = signature("main", TypeDescriptor::base("int"), vec![]);
        assert_eq!(sig.to_string(), "int main(void);");
    }
}
