//! Hand-built forests for tests.

use super::*;
use crate::graph::Span;

/// Character span of the `nth` (0-based) occurrence of `needle` in `source`.
pub fn span_of(source: &str, needle: &str, nth: usize) -> Span {
    let mut from = 0;
    let mut byte = 0;
    for _ in 0..=nth {
        byte = from
            + source[from..]
                .find(needle)
                .unwrap_or_else(|| panic!("'{needle}' not found in source"));
        from = byte + needle.len();
    }
    let start = source[..byte].chars().count();
    Span::new(start, start + needle.chars().count())
}

/// Span from the first occurrence of `from` through the end of the first
/// `to` after it.
pub fn span_between(source: &str, from: &str, to: &str) -> Span {
    let start_byte = source.find(from).expect("start marker not found");
    let end_byte = start_byte
        + source[start_byte..].find(to).expect("end marker not found")
        + to.len();
    Span::new(
        source[..start_byte].chars().count(),
        source[..end_byte].chars().count(),
    )
}

/// Dotted name located at the `nth` occurrence of `dotted`, one segment per
/// component, each bound to the matching entry of `bindings`.
pub fn qualified_name(
    source: &str,
    dotted: &str,
    nth: usize,
    bindings: &[Option<BindingId>],
) -> QualifiedName {
    let whole = span_of(source, dotted, nth);
    let mut offset = whole.start;
    let segments = dotted
        .split('.')
        .enumerate()
        .map(|(i, text)| {
            let len = text.chars().count();
            let seg = NameSegment {
                text: text.to_string(),
                span: Some(Span::new(offset, offset + len)),
                binding: bindings.get(i).copied().flatten(),
            };
            offset += len + 1;
            seg
        })
        .collect();
    QualifiedName {
        segments,
        span: Some(whole),
    }
}

/// Package declaration for `dotted`, pushing one package binding per prefix.
/// Returns the declaration and the binding of the full package.
pub fn package_decl(table: &mut BindingTable, source: &str, dotted: &str) -> (PackageDecl, BindingId) {
    let parts: Vec<&str> = dotted.split('.').collect();
    let ids: Vec<Option<BindingId>> = (1..=parts.len())
        .map(|n| Some(table.push(Binding::new(BindingKind::Package, parts[..n].join(".")))))
        .collect();
    let last = ids.last().copied().flatten().expect("empty package name");
    let decl = PackageDecl {
        name: qualified_name(source, dotted, 0, &ids),
        doc: None,
    };
    (decl, last)
}

#[test]
fn test_span_helpers() {
    let src = "package foo; class Bar { Bar b; }";
    assert_eq!(span_of(src, "Bar", 0), Span::new(19, 22));
    assert_eq!(span_of(src, "Bar", 1), Span::new(25, 28));
    assert_eq!(span_between(src, "class", "}"), Span::new(13, 33));

    let name = qualified_name(src, "foo", 0, &[None]);
    assert_eq!(name.segments[0].span, Some(Span::new(8, 11)));
}
