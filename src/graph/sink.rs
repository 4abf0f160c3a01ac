//! Graph sink: accumulates the records of every unit of a run.
//!
//! Units are merged one at a time. `insert_def` is a check-and-insert on
//! the key index, so the first def seen for a key is the one kept no
//! matter how many units declare it. `merge` converts a unit's spans to
//! byte offsets with that unit's own table before anything is stored, so
//! a unit either lands whole or not at all.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::emitter::UnitGraph;
use super::offsets::ByteOffsets;
use super::types::{Def, Doc, Graph, Origin, PathKey, Ref, RefId, Span};
use crate::error::{GraphError, Result};
use crate::origin::{Locator, ResolvedTarget};

/// Counts from one `merge`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub defs: usize,
    pub refs: usize,
    pub duplicate_defs: usize,
}

#[derive(Debug, Default)]
pub struct GraphSink {
    defs: Vec<Def>,
    def_index: HashMap<PathKey, usize>,
    by_path: HashMap<String, Vec<usize>>,
    refs: Vec<Ref>,
    ref_index: HashSet<RefId>,
    files: HashSet<String>,
}

impl GraphSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `def` unless a def with the same key is already stored.
    pub fn insert_def(&mut self, def: Def) -> bool {
        if self.def_index.contains_key(&def.key) {
            return false;
        }
        let idx = self.defs.len();
        self.def_index.insert(def.key.clone(), idx);
        self.by_path.entry(def.key.path.clone()).or_default().push(idx);
        self.defs.push(def);
        true
    }

    /// Keep `r` unless an identical `(key, file, span)` is already stored.
    pub fn insert_ref(&mut self, r: Ref) -> bool {
        if !self.ref_index.insert(RefId::from(&r)) {
            return false;
        }
        self.refs.push(r);
        true
    }

    /// Fold one unit's records in, spans converted to byte offsets.
    ///
    /// A span outside the unit's source rejects the whole unit and leaves
    /// the sink untouched.
    pub fn merge(&mut self, unit: UnitGraph) -> Result<MergeStats> {
        let UnitGraph {
            file,
            mut defs,
            mut refs,
            offsets,
            ..
        } = unit;

        for def in &mut defs {
            if let Some(span) = def.ident_span {
                def.ident_span = Some(to_bytes(&offsets, &file, span)?);
            }
            if let Some(span) = def.decl_span {
                def.decl_span = Some(to_bytes(&offsets, &file, span)?);
            }
        }
        for r in &mut refs {
            r.span = to_bytes(&offsets, &file, r.span)?;
        }

        if !self.files.insert(file.clone()) {
            warn!(file = %file, "file name merged more than once");
        }
        let mut stats = MergeStats::default();
        for def in defs {
            if self.insert_def(def) {
                stats.defs += 1;
            } else {
                stats.duplicate_defs += 1;
            }
        }
        for r in refs {
            if self.insert_ref(r) {
                stats.refs += 1;
            }
        }
        debug!(file = %file, defs = stats.defs, refs = stats.refs, duplicates = stats.duplicate_defs, "merged unit");
        Ok(stats)
    }

    /// Exact lookup, or first def with the same path for a wildcard key.
    pub fn def(&self, key: &PathKey) -> Option<&Def> {
        if key.origin == Origin::Any {
            return self
                .by_path
                .get(&key.path)
                .and_then(|idxs| idxs.first())
                .map(|&i| &self.defs[i]);
        }
        self.def_index.get(key).map(|&i| &self.defs[i])
    }

    /// Refs whose key matches `key`, wildcard origins included.
    pub fn refs_to<'a>(&'a self, key: &'a PathKey) -> impl Iterator<Item = &'a Ref> + 'a {
        self.refs.iter().filter(move |r| r.key.matches(key))
    }

    pub fn defs(&self) -> &[Def] {
        &self.defs
    }

    pub fn refs(&self) -> &[Ref] {
        &self.refs
    }

    /// Doc records for every def with non-empty documentation.
    pub fn docs(&self) -> Vec<Doc> {
        self.defs.iter().filter_map(Doc::from_def).collect()
    }

    /// Distinct external locators referenced so far.
    pub fn external_locators(&self) -> Vec<Locator> {
        let mut seen = HashSet::new();
        self.refs
            .iter()
            .filter_map(|r| r.key.origin.locator())
            .filter(|l| seen.insert((*l).clone()))
            .cloned()
            .collect()
    }

    /// Fill in `Ref::target` for every ref with an external origin.
    pub fn attach_targets<F>(&mut self, mut resolve: F)
    where
        F: FnMut(&Locator) -> Option<ResolvedTarget>,
    {
        for r in &mut self.refs {
            if let Some(locator) = r.key.origin.locator() {
                r.target = resolve(locator);
            }
        }
    }

    /// Finish the run and emit docs.
    pub fn into_graph(self) -> Graph {
        let docs = self.docs();
        Graph {
            defs: self.defs,
            refs: self.refs,
            docs,
        }
    }
}

fn to_bytes(offsets: &ByteOffsets, file: &str, span: Span) -> Result<Span> {
    offsets.span(span).ok_or_else(|| GraphError::SpanOutOfBounds {
        file: file.to_string(),
        start: span.start,
        end: span.end,
        len: offsets.char_len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::BindingKind;
    use crate::graph::offsets::TargetEncoding;

    fn def(key: PathKey, file: &str) -> Def {
        Def {
            key,
            kind: BindingKind::Type,
            name: "Bar".to_string(),
            file: file.to_string(),
            ident_span: Some(Span::new(1, 4)),
            decl_span: Some(Span::new(0, 6)),
            modifiers: Vec::new(),
            package: "foo".to_string(),
            doc: None,
            type_text: None,
        }
    }

    fn reference(key: PathKey, file: &str, span: Span) -> Ref {
        Ref {
            key,
            file: file.to_string(),
            span,
            is_def_site: false,
            target: None,
        }
    }

    #[test]
    fn test_first_def_wins() {
        let mut sink = GraphSink::new();
        assert!(sink.insert_def(def(PathKey::local("foo.Bar:type"), "A.java")));
        assert!(!sink.insert_def(def(PathKey::local("foo.Bar:type"), "B.java")));
        assert_eq!(sink.defs().len(), 1);
        assert_eq!(sink.def(&PathKey::local("foo.Bar:type")).unwrap().file, "A.java");
    }

    #[test]
    fn test_ref_dedup() {
        let mut sink = GraphSink::new();
        let key = PathKey::local("foo.Bar:type");
        assert!(sink.insert_ref(reference(key.clone(), "A.java", Span::new(3, 6))));
        assert!(!sink.insert_ref(reference(key.clone(), "A.java", Span::new(3, 6))));
        assert!(sink.insert_ref(reference(key.clone(), "A.java", Span::new(9, 12))));
        assert!(sink.insert_ref(reference(key, "B.java", Span::new(3, 6))));
        assert_eq!(sink.refs().len(), 3);
    }

    #[test]
    fn test_wildcard_lookup() {
        let mut sink = GraphSink::new();
        let ext = PathKey::new(
            Origin::External(Locator::new("jar:file:/rt.jar")),
            "java.lang.String:type",
        );
        sink.insert_def(def(ext.clone(), "String.java"));
        sink.insert_ref(reference(ext.clone(), "A.java", Span::new(0, 6)));
        sink.insert_ref(reference(PathKey::local("java.lang.String:type"), "B.java", Span::new(0, 6)));

        let any = PathKey::any("java.lang.String:type");
        assert_eq!(sink.def(&any).map(|d| &d.key), Some(&ext));
        assert_eq!(sink.refs_to(&any).count(), 2);
        assert_eq!(sink.refs_to(&ext).count(), 1);
        assert_eq!(sink.external_locators(), vec![Locator::new("jar:file:/rt.jar")]);
    }

    fn unit(file: &str, source: &str, defs: Vec<Def>, refs: Vec<Ref>) -> UnitGraph {
        UnitGraph {
            file: file.to_string(),
            package: "foo".to_string(),
            defs,
            refs,
            diagnostics: Vec::new(),
            offsets: ByteOffsets::new(source, TargetEncoding::Utf8),
        }
    }

    #[test]
    fn test_merge_converts_spans() {
        let mut sink = GraphSink::new();
        let mut d = def(PathKey::local("foo.Bar:type"), "A.java");
        d.ident_span = Some(Span::new(2, 5));
        d.decl_span = Some(Span::new(0, 5));
        d.doc = Some("Doc.".to_string());
        let r = reference(PathKey::local("foo.Bar:type"), "A.java", Span::new(2, 5));

        let stats = sink.merge(unit("A.java", "é Bar", vec![d.clone(), d], vec![r])).unwrap();
        assert_eq!(stats, MergeStats { defs: 1, refs: 1, duplicate_defs: 1 });

        let graph = sink.into_graph();
        assert_eq!(graph.defs[0].ident_span, Some(Span::new(3, 6)));
        assert_eq!(graph.defs[0].decl_span, Some(Span::new(0, 6)));
        assert_eq!(graph.refs[0].span, Span::new(3, 6));
        assert_eq!(graph.docs.len(), 1);
    }

    #[test]
    fn test_same_file_name_units_keep_their_own_offsets() {
        let mut sink = GraphSink::new();
        let a = reference(PathKey::local("a.A:type"), "A.java", Span::new(2, 3));
        let b = reference(PathKey::local("b.A:type"), "A.java", Span::new(2, 3));

        sink.merge(unit("A.java", "éé A", Vec::new(), vec![a])).unwrap();
        sink.merge(unit("A.java", "xx A", Vec::new(), vec![b])).unwrap();

        let graph = sink.into_graph();
        assert_eq!(graph.refs[0].span, Span::new(4, 5));
        assert_eq!(graph.refs[1].span, Span::new(2, 3));
    }

    #[test]
    fn test_out_of_range_span_rejects_only_that_unit() {
        let mut sink = GraphSink::new();
        let good = def(PathKey::local("foo.Bar:type"), "A.java");
        sink.merge(unit("A.java", "class Bar", vec![good], Vec::new())).unwrap();

        let bad = unit(
            "B.java",
            "abc",
            vec![def(PathKey::local("foo.Baz:type"), "B.java")],
            vec![reference(PathKey::local("x"), "B.java", Span::new(0, 9))],
        );
        assert!(matches!(sink.merge(bad), Err(GraphError::SpanOutOfBounds { .. })));

        let graph = sink.into_graph();
        assert_eq!(graph.defs.len(), 1);
        assert!(graph.refs.is_empty());
    }

    #[test]
    fn test_attach_targets() {
        let mut sink = GraphSink::new();
        let loc = Locator::new("jar:file:/rt.jar");
        sink.insert_ref(reference(PathKey::new(Origin::External(loc), "x"), "A.java", Span::new(0, 1)));
        sink.insert_ref(reference(PathKey::local("y"), "A.java", Span::new(0, 1)));
        sink.attach_targets(|_| Some(ResolvedTarget::stdlib_runtime()));
        assert!(sink.refs()[0].target.is_some());
        assert!(sink.refs()[1].target.is_none());
    }
}
