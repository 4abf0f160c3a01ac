//
//  span.rs
//  symgraph
//

use unicode_ident::{is_xid_continue, is_xid_start};

use super::offsets::{ByteOffsets, TargetEncoding};
use super::types::{NodeError, Span};

/// True for `[XID_Start _ $][XID_Continue $]*`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_xid_start(c) || c == '_' || c == '$' => {
            chars.all(|c| is_xid_continue(c) || c == '$')
        }
        _ => false,
    }
}

/// Locates identifier tokens inside node windows of one unit's source.
///
/// The search is a first literal match inside the window, so a name that
/// also appears earlier in the same node (`a.a`, `foo(foo)`) resolves to
/// its first occurrence.
pub struct SpanLocator<'a> {
    source: &'a str,
    offsets: ByteOffsets,
}

impl<'a> SpanLocator<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offsets: ByteOffsets::new(source, TargetEncoding::Utf8),
        }
    }

    /// Length of the source in characters.
    pub fn char_len(&self) -> usize {
        self.offsets.char_len()
    }

    /// Source text under a character span.
    pub fn text(&self, span: Span) -> Option<&'a str> {
        self.offsets.slice(self.source, span)
    }

    /// Span of `ident` inside `window`.
    pub fn name(&self, ident: &str, window: Option<Span>) -> Result<Span, NodeError> {
        if !is_identifier(ident) {
            return Err(NodeError::IllegalIdentifier(ident.to_string()));
        }
        let window = window.ok_or(NodeError::MissingSpan)?;
        let text = self.text(window).ok_or(NodeError::SpanOutOfBounds(window))?;
        let byte = text.find(ident).ok_or_else(|| NodeError::NameNotFound {
            name: ident.to_string(),
            span: window,
        })?;
        let start = window.start + text[..byte].chars().count();
        Ok(Span::new(start, start + ident.chars().count()))
    }

    /// Declaration span: the node's own bounds, checked against the source.
    pub fn decl(&self, window: Option<Span>) -> Result<Span, NodeError> {
        let window = window.ok_or(NodeError::MissingSpan)?;
        if window.start > window.end || window.end > self.char_len() {
            return Err(NodeError::SpanOutOfBounds(window));
        }
        Ok(window)
    }
}
