//
//  types.rs
//  symgraph
//

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::forest::BindingKind;
use crate::origin::{Locator, ResolvedTarget};

/// Half-open `[start, end)` range. Character offsets inside the engine,
/// byte offsets once the sink has converted them for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Origin half of a [`PathKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Declared in the unit under analysis.
    Local,
    /// Declared in an archive or class file outside the unit.
    External(Locator),
    /// Wildcard: matches any def with the same path. Only used for lookups.
    Any,
}

impl Origin {
    pub fn from_locator(locator: Option<&Locator>) -> Self {
        match locator {
            Some(l) => Origin::External(l.clone()),
            None => Origin::Local,
        }
    }

    pub fn locator(&self) -> Option<&Locator> {
        match self {
            Origin::External(l) => Some(l),
            Origin::Local | Origin::Any => None,
        }
    }
}

/// Stable identity of a def within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathKey {
    pub origin: Origin,
    pub path: String,
}

impl PathKey {
    pub fn new(origin: Origin, path: impl Into<String>) -> Self {
        Self {
            origin,
            path: path.into(),
        }
    }

    pub fn local(path: impl Into<String>) -> Self {
        Self::new(Origin::Local, path)
    }

    /// Wildcard key: matches the path under any origin.
    pub fn any(path: impl Into<String>) -> Self {
        Self::new(Origin::Any, path)
    }

    /// Lookup match. Exact on both fields unless either side is the wildcard.
    pub fn matches(&self, other: &PathKey) -> bool {
        if self.path != other.path {
            return false;
        }
        matches!(self.origin, Origin::Any) || matches!(other.origin, Origin::Any) || self.origin == other.origin
    }

    /// Slash-separated form used by downstream consumers:
    /// `foo.Bar:type.run:java$lang$String` → `foo/Bar:type/run:java.lang.String`.
    /// Only parameter types get `$` turned back into `.`; names keep theirs.
    pub fn formatted_path(&self) -> String {
        self.path
            .split('.')
            .map(|component| {
                let mut parts = component.split(':');
                let name = parts.next().unwrap_or_default().to_string();
                std::iter::once(name)
                    .chain(parts.map(|p| p.replace('$', ".")))
                    .collect::<Vec<_>>()
                    .join(":")
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Origin::Local => write!(f, "{}", self.path),
            Origin::External(l) => write!(f, "{}@{}", self.path, l),
            Origin::Any => write!(f, "{}@*", self.path),
        }
    }
}

/// A declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Def {
    pub key: PathKey,
    pub kind: BindingKind,
    pub name: String,
    pub file: String,
    pub ident_span: Option<Span>,
    pub decl_span: Option<Span>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Package of the unit that declares it.
    pub package: String,
    pub doc: Option<String>,
    pub type_text: Option<String>,
}

impl Def {
    pub fn is_exported(&self) -> bool {
        self.modifiers.iter().any(|m| m == "public")
    }

    /// Packages, types, fields and executables are never local.
    pub fn is_local(&self) -> bool {
        !self.is_exported() && self.kind == BindingKind::Variable
    }

    pub fn has_doc(&self) -> bool {
        self.doc.as_deref().is_some_and(|d| !d.trim().is_empty())
    }
}

/// An occurrence of a def.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    pub key: PathKey,
    pub file: String,
    pub span: Span,
    pub is_def_site: bool,
    /// Where the referenced def lives, filled in by origin resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ResolvedTarget>,
}

/// Dedup identity of a ref: `(key, file, span)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RefId {
    pub key: PathKey,
    pub file: String,
    pub span: Span,
}

impl From<&Ref> for RefId {
    fn from(r: &Ref) -> Self {
        Self {
            key: r.key.clone(),
            file: r.file.clone(),
            span: r.span,
        }
    }
}

/// Documentation attached to a def.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doc {
    pub key: PathKey,
    pub format: String,
    pub data: String,
    pub file: String,
}

impl Doc {
    pub const FORMAT: &'static str = "text/html";

    pub fn from_def(def: &Def) -> Option<Self> {
        if !def.has_doc() {
            return None;
        }
        Some(Self {
            key: def.key.clone(),
            format: Self::FORMAT.to_string(),
            data: def.doc.clone().unwrap_or_default(),
            file: def.file.clone(),
        })
    }
}

/// Final output handed to the serialization layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    #[serde(serialize_with = "serialize_defs")]
    pub defs: Vec<Def>,
    pub refs: Vec<Ref>,
    pub docs: Vec<Doc>,
}

/// Output form of a def: its fields plus the slash path and derived flags.
#[derive(Serialize)]
struct DefRecord<'a> {
    #[serde(flatten)]
    def: &'a Def,
    path: String,
    exported: bool,
    local: bool,
}

impl<'a> From<&'a Def> for DefRecord<'a> {
    fn from(def: &'a Def) -> Self {
        Self {
            path: def.key.formatted_path(),
            exported: def.is_exported(),
            local: def.is_local(),
            def,
        }
    }
}

fn serialize_defs<S: Serializer>(defs: &[Def], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(defs.iter().map(DefRecord::from))
}

/// Why a single node was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("broken enclosing chain at {0}")]
    BrokenChain(String),

    #[error("anonymous type {0} has no declaration site")]
    MissingDeclarationSite(String),

    #[error("unknown binding {0}")]
    UnknownBinding(String),

    #[error("node has no binding")]
    MissingBinding,

    #[error("node has no source span")]
    MissingSpan,

    #[error("'{0}' is not an identifier")]
    IllegalIdentifier(String),

    #[error("name '{name}' not found in {span}")]
    NameNotFound { name: String, span: Span },

    #[error("span {0} is outside the source")]
    SpanOutOfBounds(Span),

    #[error("no enclosing type")]
    NoEnclosingType,
}

/// A recorded per-node failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub offset: Option<usize>,
    pub node: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(o) => write!(f, "{}:{} {} [node {}]", self.file, o, self.message, self.node),
            None => write!(f, "{} {} [node {}]", self.file, self.message, self.node),
        }
    }
}
