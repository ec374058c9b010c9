//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use builders::StoreBuilder;
use dwarf_prototypes::{Attr, AttrValue, EntryStore};

/// C source the fixture store describes
pub const FUNCTIONS_C: &str = include_str!("../fixtures/functions.c");

/// Reference prototypes from a C source: every single-line function
/// definition not in a comment, as `<declaration>;` with stars hugging the
/// type (`char * p` becomes `char* p`).
pub fn reference_prototypes(source: &str) -> Vec<String> {
    source
        .lines()
        .filter(|line| !line.contains("//"))
        .filter_map(|line| {
            let end = line.rfind(") {")? + 1;
            let definition = line[..end].rsplit("; ").next()?;
            Some(format!("{};", definition.replace(" *", "*")))
        })
        .collect()
}

/// The debug info GCC emits for `fixtures/functions.c`, entry for entry.
///
/// Qualifier chains nest outermost first the way GCC writes them, so
/// `volatile unsigned char * const restrict p` is
/// `const -> restrict -> pointer -> volatile -> unsigned char`.
pub fn functions_c_store() -> EntryStore {
    let mut b = StoreBuilder::new("functions.c");

    let int = b.base("int");
    let uchar = b.base("unsigned char");
    let chr = b.base("char");

    // static inline int tiny(const unsigned char * volatile restrict p)
    let const_uchar = b.constant(uchar);
    let const_uchar_ptr = b.pointer(Some(const_uchar));
    let restrict_ptr = b.restrict(const_uchar_ptr);
    let volatile_restrict_ptr = b.volatile(restrict_ptr);
    let tiny = b.subprogram("tiny", Some(int));
    b.set(tiny, Attr::External, AttrValue::Flag(false))
        .set(tiny, Attr::Inline, AttrValue::Unsigned(3));
    b.param(tiny, Some("p"), volatile_restrict_ptr);

    // void baz(const volatile char* ptr)
    let volatile_char = b.volatile(chr);
    let const_volatile_char = b.constant(volatile_char);
    let cv_char_ptr = b.pointer(Some(const_volatile_char));
    let baz = b.subprogram("baz", None);
    b.param(baz, Some("ptr"), cv_char_ptr);

    // struct Foo* brr(const struct Foo* f)
    let foo = b.structure("Foo");
    let foo_ptr = b.pointer(Some(foo));
    let const_foo = b.constant(foo);
    let const_foo_ptr = b.pointer(Some(const_foo));
    let brr = b.subprogram("brr", Some(foo_ptr));
    b.param(brr, Some("f"), const_foo_ptr);

    // void frr(volatile unsigned char * const restrict p)
    let volatile_uchar = b.volatile(uchar);
    let volatile_uchar_ptr = b.pointer(Some(volatile_uchar));
    let restrict_vptr = b.restrict(volatile_uchar_ptr);
    let const_restrict_vptr = b.constant(restrict_vptr);
    let frr = b.subprogram("frr", None);
    b.param(frr, Some("p"), const_restrict_vptr);

    // void fft(const unsigned char * volatile p)
    let volatile_const_uchar_ptr = b.volatile(const_uchar_ptr);
    let fft = b.subprogram("fft", None);
    b.param(fft, Some("p"), volatile_const_uchar_ptr);

    // void* alloc(void)
    let void_ptr = b.pointer(None);
    b.subprogram("alloc", Some(void_ptr));

    // const unsigned char* ptr = "ptr";
    let ptr = b.add(b.root(), dwarf_prototypes::Tag::Variable);
    b.set(ptr, Attr::Name, AttrValue::String("ptr".to_string()))
        .set(ptr, Attr::Type, AttrValue::Ref(const_uchar_ptr));

    // int main(void)
    b.subprogram("main", Some(int));

    b.build()
}
