//! `symgraph graph`: forest in, graph out.

use anyhow::{Context, Result};
use std::io;
use std::path::Path;

use super::print_json;
use crate::config::SymgraphConfig;
use crate::forest::Forest;
use crate::graph::{build_graph, EmitterOptions};
use crate::origin::{DependencyResolver, ProjectInfo};

/// Read a forest (`-` for stdin), build its graph and print it.
pub fn graph(
    config: &SymgraphConfig,
    forest: &Path,
    project: Option<&Path>,
    diagnostics: bool,
    pretty: bool,
) -> Result<()> {
    let forest = if forest == Path::new("-") {
        Forest::from_reader(io::stdin().lock()).context("reading forest from stdin")?
    } else {
        Forest::load(forest).with_context(|| format!("reading forest {}", forest.display()))?
    };

    let resolver = match project {
        Some(path) => {
            let info = ProjectInfo::load(path).with_context(|| format!("reading project {}", path.display()))?;
            Some(DependencyResolver::from_config(info, config))
        }
        None => None,
    };

    let options = EmitterOptions::from_config(&config.emitter);
    let (graph, report) = build_graph(&forest, &options, resolver.as_ref())?;

    if diagnostics {
        for d in &report.diagnostics {
            eprintln!("{}", d);
        }
        for failure in &report.failed {
            eprintln!("{}: unit skipped: {}", failure.file, failure.error);
        }
    }

    print_json(&graph, pretty)
}
