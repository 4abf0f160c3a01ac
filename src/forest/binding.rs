//
//  binding.rs
//  symgraph
//

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::origin::Locator;

/// What a binding denotes. Closed set; every consumer matches it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    Package,
    Type,
    Method,
    Constructor,
    Field,
    Variable,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BindingKind::Package => "package",
            BindingKind::Type => "type",
            BindingKind::Method => "method",
            BindingKind::Constructor => "constructor",
            BindingKind::Field => "field",
            BindingKind::Variable => "variable",
        };
        write!(f, "{}", s)
    }
}

/// Index into a [`BindingTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(pub u32);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a declaration starts, in character offsets of its file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclSite {
    pub file: String,
    pub offset: usize,
}

/// A resolved semantic handle, as supplied by the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub kind: BindingKind,
    /// Simple name. Packages carry their full dotted name; anonymous types
    /// carry an empty string.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enclosing: Option<BindingId>,
    /// Erased parameter types, executables only.
    #[serde(default)]
    pub params: Vec<String>,
    /// `None` means declared in the unit under analysis.
    #[serde(default)]
    pub origin: Option<Locator>,
    #[serde(default)]
    pub site: Option<DeclSite>,
    /// Direct supertype, types only.
    #[serde(default)]
    pub supertype: Option<BindingId>,
}

impl Binding {
    pub fn new(kind: BindingKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            enclosing: None,
            params: Vec::new(),
            origin: None,
            site: None,
            supertype: None,
        }
    }

    pub fn with_enclosing(mut self, enclosing: BindingId) -> Self {
        self.enclosing = Some(enclosing);
        self
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_origin(mut self, origin: Locator) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_site(mut self, file: impl Into<String>, offset: usize) -> Self {
        self.site = Some(DeclSite {
            file: file.into(),
            offset,
        });
        self
    }

    pub fn with_supertype(mut self, supertype: BindingId) -> Self {
        self.supertype = Some(supertype);
        self
    }

    /// Anonymous types have no usable simple name.
    pub fn is_anonymous(&self) -> bool {
        self.kind == BindingKind::Type && (self.name.is_empty() || self.name == "<any?>")
    }
}

/// Arena of bindings shared by every unit of a forest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding and return its id.
    pub fn push(&mut self, binding: Binding) -> BindingId {
        let id = BindingId(self.bindings.len() as u32);
        self.bindings.push(binding);
        id
    }

    pub fn get(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.bindings
            .iter()
            .enumerate()
            .map(|(i, b)| (BindingId(i as u32), b))
    }
}
