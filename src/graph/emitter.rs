//! Tree emitter: one pass over a compilation unit, producing its defs and
//! refs.
//!
//! The walker owns its dedup sets: a key that already produced a def is not
//! emitted again, and a `(key, file, span)` triple yields at most one ref.
//! Every node handler returns a typed result; failures become
//! [`Diagnostic`]s and the node is skipped while its siblings and children
//! are still visited. An optional error budget turns too many failures into
//! a unit-level error.

use std::collections::HashSet;
use tracing::debug;

use super::offsets::{ByteOffsets, TargetEncoding};
use super::path::PathKeyBuilder;
use super::span::SpanLocator;
use super::types::{Def, Diagnostic, NodeError, Origin, PathKey, Ref, RefId, Span};
use crate::config::EmitterConfig;
use crate::error::{GraphError, Result};
use crate::forest::{Binding, BindingId, BindingKind, BindingTable, CompilationUnit, Node, NodeKind, QualifiedName};
use crate::origin::Locator;

/// Keyword that selects a class literal, never a member.
const CLASS_KEYWORD: &str = "class";
const THIS_KEYWORD: &str = "this";
const SUPER_KEYWORD: &str = "super";

/// Per-run emitter settings.
#[derive(Debug, Clone)]
pub struct EmitterOptions {
    /// Node failures tolerated per unit; `None` is unlimited.
    pub error_budget: Option<usize>,
    pub encoding: TargetEncoding,
    /// Parent of every type that names no supertype.
    pub implicit_root: Option<PathKey>,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self::from_config(&EmitterConfig::default())
    }
}

impl EmitterOptions {
    pub fn from_config(config: &EmitterConfig) -> Self {
        let implicit_root = if config.implicit_root_type.is_empty() {
            None
        } else {
            let origin = if config.implicit_root_origin.is_empty() {
                Origin::Local
            } else {
                Origin::External(Locator::new(config.implicit_root_origin.clone()))
            };
            Some(PathKey::new(origin, config.implicit_root_type.clone()))
        };
        Self {
            error_budget: config.error_budget,
            encoding: config.encoding,
            implicit_root,
        }
    }
}

/// Everything one unit produced, spans still in character offsets.
#[derive(Debug, Clone)]
pub struct UnitGraph {
    pub file: String,
    pub package: String,
    pub defs: Vec<Def>,
    pub refs: Vec<Ref>,
    pub diagnostics: Vec<Diagnostic>,
    /// Character → byte table of the unit's source in the output encoding.
    pub offsets: ByteOffsets,
}

/// Type currently being walked.
struct TypeFrame {
    id: BindingId,
    key: Option<PathKey>,
    name_span: Option<Span>,
}

/// Walk one unit.
pub fn emit_unit(
    bindings: &BindingTable,
    unit: &CompilationUnit,
    options: &EmitterOptions,
) -> Result<UnitGraph> {
    Emitter::new(bindings, unit, options).run()
}

pub struct Emitter<'a> {
    bindings: &'a BindingTable,
    paths: PathKeyBuilder<'a>,
    unit: &'a CompilationUnit,
    spans: SpanLocator<'a>,
    options: &'a EmitterOptions,
    package: String,
    seen_defs: HashSet<PathKey>,
    seen_refs: HashSet<RefId>,
    defs: Vec<Def>,
    refs: Vec<Ref>,
    diagnostics: Vec<Diagnostic>,
    frames: Vec<TypeFrame>,
}

impl<'a> Emitter<'a> {
    pub fn new(bindings: &'a BindingTable, unit: &'a CompilationUnit, options: &'a EmitterOptions) -> Self {
        Self {
            bindings,
            paths: PathKeyBuilder::new(bindings),
            unit,
            spans: SpanLocator::new(&unit.source),
            options,
            package: unit.package_name(),
            seen_defs: HashSet::new(),
            seen_refs: HashSet::new(),
            defs: Vec::new(),
            refs: Vec::new(),
            diagnostics: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub fn run(mut self) -> Result<UnitGraph> {
        let unit = self.unit;

        if let Some(decl) = &unit.package {
            if let Err(e) = self.package_def(&decl.name, decl.doc.as_deref()) {
                self.fail(decl.name.span, "PackageDecl".to_string(), e)?;
            }
            self.qualified_name(&decl.name)?;
        }
        for import in &unit.imports {
            self.qualified_name(import)?;
        }
        for node in &unit.nodes {
            self.visit(node)?;
        }

        debug!(
            file = %unit.file,
            defs = self.defs.len(),
            refs = self.refs.len(),
            errors = self.diagnostics.len(),
            "emitted unit"
        );
        Ok(UnitGraph {
            file: unit.file.clone(),
            package: self.package,
            defs: self.defs,
            refs: self.refs,
            diagnostics: self.diagnostics,
            offsets: ByteOffsets::new(&unit.source, self.options.encoding),
        })
    }

    // ─── Traversal ────────────────────────────────────────────────

    fn visit(&mut self, node: &'a Node) -> Result<()> {
        let outcome = match node.kind {
            NodeKind::Declaration => self.declaration(node),
            NodeKind::Identifier => self.identifier(node),
            NodeKind::MemberSelect => self.member_select(node),
            NodeKind::SelfRef => self.self_ref(node),
            NodeKind::ParentRef => self.parent_ref(node),
            NodeKind::Other => Ok(()),
        };
        if let Err(e) = outcome {
            self.fail(node.span, node.label(), e)?;
        }

        let frame = match node.kind {
            NodeKind::Declaration => self.type_frame(node),
            _ => None,
        };
        let pushed = frame.is_some();
        if let Some(frame) = frame {
            self.frames.push(frame);
        }
        for child in &node.children {
            self.visit(child)?;
        }
        if pushed {
            self.frames.pop();
        }
        Ok(())
    }

    /// Record a node failure; error out once the budget is spent.
    fn fail(&mut self, span: Option<Span>, node: String, err: NodeError) -> Result<()> {
        let offset = span.map(|s| s.start);
        debug!(file = %self.unit.file, offset = ?offset, node = %node, error = %err, "skipping node");
        self.diagnostics.push(Diagnostic {
            file: self.unit.file.clone(),
            offset,
            node,
            message: err.to_string(),
        });
        match self.options.error_budget {
            Some(budget) if self.diagnostics.len() > budget => Err(GraphError::ErrorBudgetExceeded {
                file: self.unit.file.clone(),
                errors: self.diagnostics.len(),
                budget,
            }),
            _ => Ok(()),
        }
    }

    fn type_frame(&self, node: &Node) -> Option<TypeFrame> {
        let id = node.binding?;
        let binding = self.bindings.get(id)?;
        if binding.kind != BindingKind::Type {
            return None;
        }
        let name_span = if binding.is_anonymous() {
            None
        } else {
            self.spans.name(&binding.name, node.span).ok()
        };
        Some(TypeFrame {
            id,
            key: self.paths.key(id).ok(),
            name_span,
        })
    }

    // ─── Defs ─────────────────────────────────────────────────────

    /// One def per package, keyed by the dotted name alone.
    fn package_def(&mut self, name: &QualifiedName, doc: Option<&str>) -> std::result::Result<(), NodeError> {
        if self.package.is_empty() {
            return Ok(());
        }
        let key = PathKey::local(self.package.clone());
        if self.seen_defs.contains(&key) {
            return Ok(());
        }
        let decl_span = self.spans.decl(name.span)?;
        let last = name.last().ok_or(NodeError::MissingSpan)?;
        let ident_span = self.spans.decl(last.span)?;
        if !decl_span.contains(&ident_span) {
            return Err(NodeError::SpanOutOfBounds(ident_span));
        }

        self.seen_defs.insert(key.clone());
        self.defs.push(Def {
            key,
            kind: BindingKind::Package,
            name: last.text.clone(),
            file: self.unit.file.clone(),
            ident_span: Some(ident_span),
            decl_span: Some(decl_span),
            modifiers: Vec::new(),
            package: self.package.clone(),
            doc: doc.map(str::to_string),
            type_text: None,
        });
        Ok(())
    }

    fn declaration(&mut self, node: &Node) -> std::result::Result<(), NodeError> {
        let id = node.binding.ok_or(NodeError::MissingBinding)?;
        let binding = self.binding(id)?;
        let key = self.paths.key(id)?;
        if self.seen_defs.contains(&key) {
            return Ok(());
        }

        let synthetic = node.span.is_none() && binding.kind == BindingKind::Constructor;
        let (name, ident_span, decl_span) = if synthetic {
            // Default constructors have no source; they borrow the type's name.
            let owner_id = binding.enclosing.ok_or(NodeError::NoEnclosingType)?;
            let owner = self.binding(owner_id)?;
            if owner.is_anonymous() {
                return Ok(());
            }
            let frame = self
                .frames
                .iter()
                .rev()
                .find(|f| f.id == owner_id)
                .ok_or(NodeError::NoEnclosingType)?;
            let span = frame.name_span.ok_or(NodeError::MissingSpan)?;
            (owner.name.clone(), Some(span), span)
        } else {
            let decl_span = self.spans.decl(node.span)?;
            let ident_span = match self.ident_text(binding)? {
                Some(text) => Some(self.spans.name(&text, Some(decl_span))?),
                None => None,
            };
            (self.display_name(binding)?, ident_span, decl_span)
        };

        self.seen_defs.insert(key.clone());
        self.defs.push(Def {
            key: key.clone(),
            kind: binding.kind,
            name,
            file: self.unit.file.clone(),
            ident_span,
            decl_span: Some(decl_span),
            modifiers: node.modifiers.clone(),
            package: self.package.clone(),
            doc: node.doc.clone(),
            type_text: node.type_text.clone(),
        });

        if !synthetic && binding.kind != BindingKind::Package {
            if let Some(span) = ident_span {
                self.add_ref(key, span, true);
            }
        }
        Ok(())
    }

    /// Text the declaration's name appears as in source, if it has one.
    fn ident_text(&self, binding: &Binding) -> std::result::Result<Option<String>, NodeError> {
        Ok(match binding.kind {
            BindingKind::Package => binding.name.rsplit('.').next().map(str::to_string),
            BindingKind::Type if binding.is_anonymous() => None,
            BindingKind::Constructor => {
                let owner_id = binding.enclosing.ok_or(NodeError::NoEnclosingType)?;
                let owner = self.binding(owner_id)?;
                if owner.is_anonymous() {
                    None
                } else {
                    Some(owner.name.clone())
                }
            }
            BindingKind::Type | BindingKind::Method | BindingKind::Field | BindingKind::Variable => {
                Some(binding.name.clone())
            }
        })
    }

    fn display_name(&self, binding: &Binding) -> std::result::Result<String, NodeError> {
        match binding.kind {
            BindingKind::Package => Ok(binding.name.rsplit('.').next().unwrap_or_default().to_string()),
            BindingKind::Type => self.paths.type_name(binding),
            BindingKind::Constructor => {
                let owner_id = binding.enclosing.ok_or(NodeError::NoEnclosingType)?;
                self.paths.type_name(self.binding(owner_id)?)
            }
            BindingKind::Method | BindingKind::Field | BindingKind::Variable => Ok(binding.name.clone()),
        }
    }

    // ─── Refs ─────────────────────────────────────────────────────

    /// One ref per segment of a package or import name.
    fn qualified_name(&mut self, name: &QualifiedName) -> Result<()> {
        for i in 0..name.segments.len() {
            if let Err(e) = self.segment_ref(name, i) {
                let seg = &name.segments[i];
                self.fail(seg.span, format!("NameSegment({})", seg.text), e)?;
            }
        }
        Ok(())
    }

    fn segment_ref(&mut self, name: &QualifiedName, i: usize) -> std::result::Result<(), NodeError> {
        let seg = &name.segments[i];
        let key = match seg.binding {
            Some(id) => self.paths.key(id)?,
            None => PathKey::local(name.prefix(i + 1)),
        };
        let span = self.spans.decl(seg.span)?;
        self.add_ref(key, span, false);
        Ok(())
    }

    fn identifier(&mut self, node: &Node) -> std::result::Result<(), NodeError> {
        if node.name.as_deref() == Some(CLASS_KEYWORD) {
            return Ok(());
        }
        let id = node.binding.ok_or(NodeError::MissingBinding)?;
        let key = self.paths.key(id)?;
        let span = self.spans.decl(node.span)?;
        self.add_ref(key, span, false);
        Ok(())
    }

    fn member_select(&mut self, node: &Node) -> std::result::Result<(), NodeError> {
        let name = node
            .name
            .as_deref()
            .ok_or_else(|| NodeError::IllegalIdentifier(String::new()))?;
        if name == CLASS_KEYWORD {
            return Ok(());
        }
        let id = node.binding.ok_or(NodeError::MissingBinding)?;
        let key = self.paths.key(id)?;
        let span = self.spans.name(name, node.span)?;
        self.add_ref(key, span, false);
        Ok(())
    }

    /// `this` refers to the innermost type, `Outer.this` to the qualifier.
    fn self_ref(&mut self, node: &Node) -> std::result::Result<(), NodeError> {
        let key = match node.binding {
            Some(id) => self.paths.key(id)?,
            None => self
                .frames
                .last()
                .and_then(|f| f.key.clone())
                .ok_or(NodeError::NoEnclosingType)?,
        };
        let span = self.keyword_span(node, THIS_KEYWORD)?;
        self.add_ref(key, span, false);
        Ok(())
    }

    /// `super` refers to the supertype of the innermost (or qualifying)
    /// type, or to the implicit root type when none is declared.
    fn parent_ref(&mut self, node: &Node) -> std::result::Result<(), NodeError> {
        let type_id = match node.binding {
            Some(id) => id,
            None => self.frames.last().ok_or(NodeError::NoEnclosingType)?.id,
        };
        let ty = self.binding(type_id)?;
        let key = match ty.supertype {
            Some(sup) => self.paths.key(sup)?,
            None => self
                .options
                .implicit_root
                .clone()
                .ok_or(NodeError::NoEnclosingType)?,
        };
        let span = self.keyword_span(node, SUPER_KEYWORD)?;
        self.add_ref(key, span, false);
        Ok(())
    }

    /// Bare keywords span the whole node; qualified forms locate the keyword.
    fn keyword_span(&self, node: &Node, keyword: &str) -> std::result::Result<Span, NodeError> {
        if node.binding.is_some() {
            self.spans.name(keyword, node.span)
        } else {
            self.spans.decl(node.span)
        }
    }

    fn add_ref(&mut self, key: PathKey, span: Span, is_def_site: bool) {
        let r = Ref {
            key,
            file: self.unit.file.clone(),
            span,
            is_def_site,
            target: None,
        };
        if self.seen_refs.insert(RefId::from(&r)) {
            self.refs.push(r);
        }
    }

    fn binding(&self, id: BindingId) -> std::result::Result<&'a Binding, NodeError> {
        self.bindings
            .get(id)
            .ok_or_else(|| NodeError::UnknownBinding(id.to_string()))
    }
}
