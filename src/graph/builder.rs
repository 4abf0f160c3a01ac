//
//  builder.rs
//  symgraph
//

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use super::emitter::{emit_unit, EmitterOptions, UnitGraph};
use super::sink::GraphSink;
use super::types::{Diagnostic, Graph};
use crate::error::Result;
use crate::forest::Forest;
use crate::origin::DependencyResolver;

/// A unit that was dropped from the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFailure {
    pub file: String,
    pub error: String,
}

/// What a run did, alongside the graph it produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub units: usize,
    pub failed: Vec<UnitFailure>,
    pub diagnostics: Vec<Diagnostic>,
    pub defs: usize,
    pub refs: usize,
    pub duplicate_defs: usize,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.diagnostics.is_empty()
    }
}

/// Walk every unit of `forest` and merge the results into one graph.
///
/// Units are emitted in parallel and merged in a fixed order:
/// `package-info` units first, then input order. A unit that fails as a
/// whole, or whose spans fall outside its source, is recorded in the
/// report and skipped. When a resolver is given,
/// every ref with an external origin gets its target attached.
pub fn build_graph(
    forest: &Forest,
    options: &EmitterOptions,
    resolver: Option<&DependencyResolver>,
) -> Result<(Graph, BuildReport)> {
    let mut order: Vec<usize> = (0..forest.units.len()).collect();
    order.sort_by_key(|&i| !forest.units[i].is_package_info());

    let results: Vec<(usize, Result<UnitGraph>)> = order
        .par_iter()
        .map(|&i| (i, emit_unit(&forest.bindings, &forest.units[i], options)))
        .collect();

    let mut sink = GraphSink::new();
    let mut report = BuildReport {
        units: forest.units.len(),
        ..BuildReport::default()
    };

    for (i, result) in results {
        let merged = result.and_then(|mut unit| {
            let diagnostics = std::mem::take(&mut unit.diagnostics);
            let stats = sink.merge(unit)?;
            Ok((stats, diagnostics))
        });
        match merged {
            Ok((stats, mut diagnostics)) => {
                report.diagnostics.append(&mut diagnostics);
                report.defs += stats.defs;
                report.refs += stats.refs;
                report.duplicate_defs += stats.duplicate_defs;
            }
            Err(e) => {
                let file = forest.units[i].file.clone();
                warn!(file = %file, error = %e, "unit skipped");
                report.failed.push(UnitFailure {
                    file,
                    error: e.to_string(),
                });
            }
        }
    }

    if let Some(resolver) = resolver {
        sink.attach_targets(|locator| resolver.resolve(locator));
        info!(origins = resolver.cached_origins(), "resolved external origins");
    }

    info!(
        units = report.units,
        failed = report.failed.len(),
        defs = report.defs,
        refs = report.refs,
        diagnostics = report.diagnostics.len(),
        "graph built"
    );
    Ok((sink.into_graph(), report))
}
