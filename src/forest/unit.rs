//
//  unit.rs
//  symgraph
//

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::binding::BindingId;
use crate::graph::Span;

/// Syntactic role of a node, as far as the emitter cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A named declaration; its binding decides what kind.
    Declaration,
    /// A simple name in expression or type position.
    Identifier,
    /// `expr.name`; the span covers the whole selection.
    MemberSelect,
    /// `this`, or `Outer.this` when a qualifier binding is given.
    SelfRef,
    /// `super`, or `Outer.super` when a qualifier binding is given.
    ParentRef,
    /// Anything else; only its children are visited.
    Other,
}

/// A node of the resolved syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default)]
    pub binding: Option<BindingId>,
    /// Identifier text for identifiers and member selects.
    #[serde(default)]
    pub name: Option<String>,
    /// `None` for synthetic nodes.
    #[serde(default)]
    pub span: Option<Span>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub type_text: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            binding: None,
            name: None,
            span: None,
            modifiers: Vec::new(),
            doc: None,
            type_text: None,
            children: Vec::new(),
        }
    }

    pub fn declaration(binding: BindingId, span: Option<Span>) -> Self {
        Self {
            binding: Some(binding),
            span,
            ..Self::new(NodeKind::Declaration)
        }
    }

    pub fn identifier(name: impl Into<String>, binding: BindingId, span: Span) -> Self {
        Self {
            binding: Some(binding),
            name: Some(name.into()),
            span: Some(span),
            ..Self::new(NodeKind::Identifier)
        }
    }

    pub fn member_select(name: impl Into<String>, binding: BindingId, span: Span) -> Self {
        Self {
            binding: Some(binding),
            name: Some(name.into()),
            span: Some(span),
            ..Self::new(NodeKind::MemberSelect)
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers = modifiers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_type_text(mut self, type_text: impl Into<String>) -> Self {
        self.type_text = Some(type_text.into());
        self
    }

    pub fn label(&self) -> String {
        match &self.name {
            Some(n) => format!("{:?}({})", self.kind, n),
            None => format!("{:?}", self.kind),
        }
    }
}

/// One component of a dotted name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameSegment {
    pub text: String,
    #[serde(default)]
    pub span: Option<Span>,
    #[serde(default)]
    pub binding: Option<BindingId>,
}

/// A dotted name in a package declaration or an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedName {
    pub segments: Vec<NameSegment>,
    /// Bounds of the whole name.
    #[serde(default)]
    pub span: Option<Span>,
}

impl QualifiedName {
    /// Dotted text of the first `len` segments.
    pub fn prefix(&self, len: usize) -> String {
        self.segments
            .iter()
            .take(len)
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn dotted(&self) -> String {
        self.prefix(self.segments.len())
    }

    pub fn last(&self) -> Option<&NameSegment> {
        self.segments.last()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDecl {
    pub name: QualifiedName,
    #[serde(default)]
    pub doc: Option<String>,
}

/// A compilation unit: one source file and its resolved tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub file: String,
    pub source: String,
    #[serde(default)]
    pub package: Option<PackageDecl>,
    #[serde(default)]
    pub imports: Vec<QualifiedName>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl CompilationUnit {
    pub fn new(file: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            source: source.into(),
            package: None,
            imports: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Dotted package name, empty for the unnamed package.
    pub fn package_name(&self) -> String {
        self.package
            .as_ref()
            .map(|p| p.name.dotted())
            .unwrap_or_default()
    }

    /// `package-info` units carry package-level documentation.
    pub fn is_package_info(&self) -> bool {
        Path::new(&self.file)
            .file_stem()
            .is_some_and(|s| s == "package-info")
    }
}
