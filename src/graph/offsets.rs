//
//  offsets.rs
//  symgraph
//

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::types::Span;

/// Encoding output byte offsets are measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
    /// Characters outside Latin-1 count as one replacement byte.
    Latin1,
}

impl TargetEncoding {
    /// Bytes `c` occupies once encoded.
    pub fn encoded_len(self, c: char) -> usize {
        match self {
            TargetEncoding::Utf8 => c.len_utf8(),
            TargetEncoding::Utf16Le | TargetEncoding::Utf16Be => c.len_utf16() * 2,
            TargetEncoding::Latin1 => 1,
        }
    }
}

impl FromStr for TargetEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "utf8" => Ok(TargetEncoding::Utf8),
            "utf16le" | "utf16" => Ok(TargetEncoding::Utf16Le),
            "utf16be" => Ok(TargetEncoding::Utf16Be),
            "latin1" | "iso88591" => Ok(TargetEncoding::Latin1),
            other => Err(format!("unsupported encoding '{}'", other)),
        }
    }
}

impl fmt::Display for TargetEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetEncoding::Utf8 => "utf-8",
            TargetEncoding::Utf16Le => "utf-16le",
            TargetEncoding::Utf16Be => "utf-16be",
            TargetEncoding::Latin1 => "latin-1",
        };
        write!(f, "{}", s)
    }
}

/// Character index → byte offset table for one text.
///
/// Slot `i` holds the byte offset of character `i`; the last slot holds
/// the encoded length, so half-open spans ending at the text's end convert
/// too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteOffsets {
    encoding: TargetEncoding,
    offsets: Vec<usize>,
}

impl ByteOffsets {
    pub fn new(text: &str, encoding: TargetEncoding) -> Self {
        let mut offsets = Vec::with_capacity(text.len() + 1);
        let mut pos = 0;
        for c in text.chars() {
            offsets.push(pos);
            pos += encoding.encoded_len(c);
        }
        offsets.push(pos);
        Self { encoding, offsets }
    }

    pub fn encoding(&self) -> TargetEncoding {
        self.encoding
    }

    /// Number of characters in the text.
    pub fn char_len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Encoded length of the whole text.
    pub fn byte_len(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    pub fn get(&self, char_index: usize) -> Option<usize> {
        self.offsets.get(char_index).copied()
    }

    /// Convert a character span; `None` if it runs past the text.
    pub fn span(&self, span: Span) -> Option<Span> {
        if span.start > span.end {
            return None;
        }
        Some(Span::new(self.get(span.start)?, self.get(span.end)?))
    }

    /// Slice `text` by a character span. Only meaningful for tables built
    /// over that same text in UTF-8.
    pub fn slice<'a>(&self, text: &'a str, span: Span) -> Option<&'a str> {
        if self.encoding != TargetEncoding::Utf8 {
            return None;
        }
        let bytes = self.span(span)?;
        text.get(bytes.start..bytes.end)
    }
}
