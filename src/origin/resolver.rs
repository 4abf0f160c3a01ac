//
//  resolver.rs
//  symgraph
//

use rayon::prelude::*;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::{debug, info, warn};

use super::classify::OriginClassifier;
use super::locator::Locator;
use super::overrides::OverrideTable;
use super::registry::{self, DescriptorFetcher, RegistryClient};
use super::types::{absolute, DepResolution, ProjectInfo, RawDependency, ResolvedTarget, ARTIFACT_UNIT_TYPE};
use crate::config::SymgraphConfig;

const EXPLODED_AAR_MARKER: &str = "/exploded-aar/";

/// Run-scoped memo table. Each key gets one slot; concurrent callers for the
/// same key block on the slot while the first one computes.
struct Memo<K, V> {
    slots: Mutex<HashMap<K, Arc<OnceLock<V>>>>,
}

impl<K: Eq + Hash + Clone, V: Clone> Memo<K, V> {
    fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn get_or_init(&self, key: &K, init: impl FnOnce() -> V) -> V {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(key.clone()).or_default().clone()
        };
        slot.get_or_init(init).clone()
    }

    fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Maps origin locators and dependency coordinates to upstream repository
/// targets. One instance per run; every lookup is memoized for its lifetime.
pub struct DependencyResolver {
    project: ProjectInfo,
    classifier: OriginClassifier,
    overrides: OverrideTable,
    /// `None` when remote lookups are disabled.
    fetcher: Option<Arc<dyn DescriptorFetcher>>,
    max_parent_depth: usize,
    max_concurrent_fetches: usize,
    origins: Memo<Locator, Option<ResolvedTarget>>,
    deps: Memo<RawDependency, DepResolution>,
}

impl DependencyResolver {
    pub fn new(
        project: ProjectInfo,
        classifier: OriginClassifier,
        overrides: OverrideTable,
        fetcher: Option<Arc<dyn DescriptorFetcher>>,
    ) -> Self {
        Self {
            project,
            classifier,
            overrides,
            fetcher,
            max_parent_depth: 4,
            max_concurrent_fetches: 4,
            origins: Memo::new(),
            deps: Memo::new(),
        }
    }

    /// Resolver wired the way the configuration asks: built-in plus
    /// configured overrides, registry client unless offline.
    pub fn from_config(project: ProjectInfo, config: &SymgraphConfig) -> Self {
        let overrides = OverrideTable::with_builtin(config.resolver.overrides.clone());
        let fetcher: Option<Arc<dyn DescriptorFetcher>> = if config.resolver.offline {
            None
        } else {
            Some(Arc::new(RegistryClient::new(
                config.resolver.registry_url.clone(),
                config.resolver.timeout(),
            )))
        };
        Self::new(
            project,
            OriginClassifier::from_config(&config.classifier),
            overrides,
            fetcher,
        )
        .with_max_parent_depth(config.resolver.max_parent_depth)
        .with_max_concurrent_fetches(config.resolver.max_concurrent_fetches)
    }

    pub fn with_max_parent_depth(mut self, depth: usize) -> Self {
        self.max_parent_depth = depth;
        self
    }

    pub fn with_max_concurrent_fetches(mut self, n: usize) -> Self {
        self.max_concurrent_fetches = n.max(1);
        self
    }

    pub fn project(&self) -> &ProjectInfo {
        &self.project
    }

    /// Number of distinct locators looked up so far.
    pub fn cached_origins(&self) -> usize {
        self.origins.len()
    }

    // ─── Origins ──────────────────────────────────────────────────

    /// Target of the archive or source file `locator` points into, or `None`
    /// when no strategy knows it.
    pub fn resolve(&self, locator: &Locator) -> Option<ResolvedTarget> {
        self.origins
            .get_or_init(locator, || self.resolve_origin(locator))
    }

    fn resolve_origin(&self, locator: &Locator) -> Option<ResolvedTarget> {
        let normalized = locator.normalized();
        let archive = match normalized.archive_path() {
            Ok(Some(path)) => path,
            Ok(None) => return self.resolve_file(&normalized),
            Err(e) => {
                warn!(locator = %locator, error = %e, "cannot get archive path for origin");
                return None;
            }
        };

        let class = self.classifier.classify(locator, self.project.platform);
        if let Some(target) = class.target() {
            debug!(locator = %locator, class = ?class, "classified origin");
            return Some(target);
        }

        match self.project.dependency_for_archive(&archive) {
            Some(raw) => self.resolve_dependency(raw).target,
            None if self.project.platform => self.resolve_exploded_aar(&normalized),
            None => {
                debug!(archive = %archive.display(), "archive belongs to no known dependency");
                None
            }
        }
    }

    /// Source files under one of the project's source directories belong to
    /// that directory's unit.
    fn resolve_file(&self, locator: &Locator) -> Option<ResolvedTarget> {
        let file = locator.file_path()?;
        self.project
            .source_dirs
            .iter()
            .find(|sd| file.starts_with(absolute(&sd.dir)))
            .map(|sd| ResolvedTarget {
                repo_clone_url: None,
                unit: sd.unit.clone(),
                unit_type: ARTIFACT_UNIT_TYPE.to_string(),
                version: Some(sd.version.clone()),
            })
    }

    /// `.../exploded-aar/<group>/<artifact>/<version>/...` paths produced by
    /// platform builds, matched against the declared dependencies.
    fn resolve_exploded_aar(&self, locator: &Locator) -> Option<ResolvedTarget> {
        let raw = locator.as_str();
        let start = raw.find(EXPLODED_AAR_MARKER)? + EXPLODED_AAR_MARKER.len();
        let parts: Vec<&str> = raw[start..].splitn(4, '/').collect();
        let [group, artifact, version, _] = parts.as_slice() else {
            return None;
        };
        let dep = self.project.find_dependency(group, artifact, version)?;
        self.resolve_dependency(dep).target
    }

    // ─── Dependencies ─────────────────────────────────────────────

    /// Resolve one coordinate. Never fails; a miss is reported in
    /// `DepResolution::error` and cached like a hit.
    pub fn resolve_dependency(&self, raw: &RawDependency) -> DepResolution {
        self.deps
            .get_or_init(raw, || self.resolve_dependency_uncached(raw))
    }

    fn resolve_dependency_uncached(&self, raw: &RawDependency) -> DepResolution {
        if raw.group == self.project.group {
            let version = if self.project.version.is_empty() {
                raw.version.clone()
            } else {
                self.project.version.clone()
            };
            return DepResolution::resolved(
                Some(raw.clone()),
                ResolvedTarget {
                    repo_clone_url: None,
                    unit: raw.unit_name(),
                    unit_type: ARTIFACT_UNIT_TYPE.to_string(),
                    version: Some(version),
                },
            );
        }

        let known = self
            .overrides
            .lookup(&raw.lookup_key())
            .map(str::to_string)
            .or_else(|| raw.repo_uri.clone());
        if let Some(url) = known {
            return DepResolution::resolved(Some(raw.clone()), ResolvedTarget::artifact(raw, Some(url)));
        }

        let Some(fetcher) = &self.fetcher else {
            return DepResolution::failed(raw.clone(), format!("{} could not be resolved: registry lookups are disabled.", raw.artifact));
        };
        let resolution = match registry::scm_url(fetcher.as_ref(), raw, self.max_parent_depth) {
            Ok(Some(url)) => DepResolution::resolved(Some(raw.clone()), ResolvedTarget::artifact(raw, Some(url))),
            Ok(None) => DepResolution::failed(
                raw.clone(),
                format!("{} does not have an associated SCM repository.", raw.artifact),
            ),
            Err(e) => DepResolution::failed(raw.clone(), format!("Could not download file {e}")),
        };
        if let Some(error) = &resolution.error {
            info!(dep = %raw, error = %error, "unable to resolve dependency");
        }
        resolution
    }

    /// Resolve every coordinate on a pool of `max_concurrent_fetches`
    /// threads, in input order, then append the implicit standard-library
    /// or platform entries.
    pub fn resolve_all(&self, deps: &[RawDependency]) -> Vec<DepResolution> {
        let mut out: Vec<DepResolution> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_concurrent_fetches)
            .build()
        {
            Ok(pool) => pool.install(|| deps.par_iter().map(|d| self.resolve_dependency(d)).collect()),
            Err(e) => {
                warn!(error = %e, "cannot start resolver pool, resolving sequentially");
                deps.iter().map(|d| self.resolve_dependency(d)).collect()
            }
        };
        out.extend(self.implicit_resolutions());
        out
    }

    fn implicit_resolutions(&self) -> Vec<DepResolution> {
        let targets = if self.project.platform {
            vec![ResolvedTarget::platform_core(), ResolvedTarget::platform_framework()]
        } else {
            vec![ResolvedTarget::stdlib_runtime()]
        };
        targets
            .into_iter()
            .map(|t| DepResolution::resolved(None, t))
            .collect()
    }
}
