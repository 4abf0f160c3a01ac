//! `symgraph depresolve`: declared dependencies → repository targets.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use super::print_json;
use crate::config::SymgraphConfig;
use crate::origin::{DependencyResolver, ProjectInfo};

pub fn depresolve(config: &SymgraphConfig, project: &Path, pretty: bool) -> Result<()> {
    let info = ProjectInfo::load(project).with_context(|| format!("reading project {}", project.display()))?;
    let deps = info.dependencies.clone();

    let resolver = DependencyResolver::from_config(info, config);
    let resolutions = resolver.resolve_all(&deps);

    let unresolved = resolutions.iter().filter(|r| !r.is_resolved()).count();
    info!(total = resolutions.len(), unresolved, "dependencies resolved");

    print_json(&resolutions, pretty)
}
