//! Symbol graph: defs, refs and docs extracted from a resolved forest.
//!
//! Leaf to root: byte offsets, path keys and span location feed the tree
//! emitter, which produces one [`UnitGraph`] per compilation unit; the sink
//! merges them and the builder drives a whole forest through both.

pub mod builder;
pub mod emitter;
pub mod offsets;
pub mod path;
pub mod sink;
pub mod span;
pub mod types;

pub use builder::{build_graph, BuildReport, UnitFailure};
pub use emitter::{emit_unit, Emitter, EmitterOptions, UnitGraph};
pub use offsets::{ByteOffsets, TargetEncoding};
pub use path::PathKeyBuilder;
pub use sink::{GraphSink, MergeStats};
pub use span::{is_identifier, SpanLocator};
pub use types::{Def, Diagnostic, Doc, Graph, NodeError, Origin, PathKey, Ref, Span};
