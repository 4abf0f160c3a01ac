//! # symgraph
//!
//! Symbol-graph extraction for resolved syntax forests.
//!
//! A front-end supplies a [`Forest`]: compilation units whose nodes already
//! point at resolved bindings. symgraph walks it once and produces a
//! [`Graph`] of declarations (defs), occurrences (refs) and doc records,
//! all keyed by stable [`PathKey`]s and located by byte spans in the
//! encoding of your choice.
//!
//! Symbols declared outside the project carry the locator of the archive
//! or class file that defines them. The [`origin`] module maps those
//! locators to dependency coordinates and on to upstream repositories.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use symgraph::{build_graph, EmitterOptions, Forest};
//!
//! let forest = Forest::load(Path::new("forest.json")).unwrap();
//! let (graph, report) = build_graph(&forest, &EmitterOptions::default(), None).unwrap();
//! println!("{} defs, {} refs, {} skipped nodes", graph.defs.len(), graph.refs.len(), report.diagnostics.len());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod forest;
pub mod graph;
pub mod origin;

// Re-exports for convenience
pub use config::SymgraphConfig;
pub use error::{GraphError, Result};
pub use forest::{Binding, BindingId, BindingKind, BindingTable, CompilationUnit, Forest, Node, NodeKind};
pub use graph::{
    build_graph, emit_unit, BuildReport, Def, Diagnostic, Doc, EmitterOptions, Graph, Origin, PathKey, Ref,
    Span, TargetEncoding,
};
pub use origin::{DepResolution, DependencyResolver, Locator, ProjectInfo, RawDependency, ResolvedTarget};
