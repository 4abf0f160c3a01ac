//
//  types.rs
//  symgraph
//

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GraphError, Result};

const OPENJDK_REPO_ROOT: &str = "hg.openjdk.java.net/jdk8/jdk8/";
const PLATFORM_CORE_REPO: &str = "android.googlesource.com/platform/libcore";
const PLATFORM_FRAMEWORK_REPO: &str = "android.googlesource.com/platform/frameworks/base";
const PLATFORM_SUPPORT_REPO: &str = "android.googlesource.com/platform/frameworks/support";

/// Unit type of standard-library and platform checkouts.
pub const SOURCE_UNIT_TYPE: &str = "Java";
/// Unit type of everything addressed by a dependency coordinate.
pub const ARTIFACT_UNIT_TYPE: &str = "JavaArtifact";

/// An unresolved dependency coordinate, as listed by the build system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RawDependency {
    pub group: String,
    pub artifact: String,
    pub version: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default, rename = "type")]
    pub packaging: Option<String>,
    /// Repository already known to the build system, if any.
    #[serde(default)]
    pub repo_uri: Option<String>,
}

impl RawDependency {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            scope: None,
            classifier: None,
            packaging: None,
            repo_uri: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// `group/artifact`, the form override prefixes are matched against.
    pub fn lookup_key(&self) -> String {
        format!("{}/{}", self.group, self.artifact)
    }

    /// Unit name of the artifact's source checkout.
    pub fn unit_name(&self) -> String {
        self.lookup_key()
    }
}

impl fmt::Display for RawDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(scope) = &self.scope {
            write!(f, ":{}", scope)?;
        }
        Ok(())
    }
}

/// Where a dependency's or locator's source actually lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_clone_url: Option<String>,
    pub unit: String,
    pub unit_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ResolvedTarget {
    fn checkout(repo: &str, unit: &str, unit_type: &str) -> Self {
        Self {
            repo_clone_url: Some(repo.to_string()),
            unit: unit.to_string(),
            unit_type: unit_type.to_string(),
            version: None,
        }
    }

    /// Runtime classes (`rt.jar`).
    pub fn stdlib_runtime() -> Self {
        Self::checkout(&format!("{OPENJDK_REPO_ROOT}jdk"), ".", SOURCE_UNIT_TYPE)
    }

    /// Compiler and tooling classes (`tools.jar`).
    pub fn stdlib_tools() -> Self {
        Self::checkout(&format!("{OPENJDK_REPO_ROOT}langtools"), ".", SOURCE_UNIT_TYPE)
    }

    /// Script engine classes (`nashorn.jar`).
    pub fn stdlib_scripting() -> Self {
        Self::checkout(&format!("{OPENJDK_REPO_ROOT}nashorn"), ".", SOURCE_UNIT_TYPE)
    }

    pub fn platform_core() -> Self {
        Self::checkout(PLATFORM_CORE_REPO, "AndroidCore", ARTIFACT_UNIT_TYPE)
    }

    pub fn platform_framework() -> Self {
        Self::checkout(PLATFORM_FRAMEWORK_REPO, "AndroidSDK", ARTIFACT_UNIT_TYPE)
    }

    pub fn platform_support() -> Self {
        Self::checkout(PLATFORM_SUPPORT_REPO, "AndroidSupport", ARTIFACT_UNIT_TYPE)
    }

    /// Target for a dependency coordinate, optionally with a known repository.
    pub fn artifact(raw: &RawDependency, repo_clone_url: Option<String>) -> Self {
        Self {
            repo_clone_url,
            unit: raw.unit_name(),
            unit_type: ARTIFACT_UNIT_TYPE.to_string(),
            version: Some(raw.version.clone()),
        }
    }
}

/// Outcome of resolving one dependency. Exactly one of `target` and
/// `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepResolution {
    #[serde(default)]
    pub raw: Option<RawDependency>,
    #[serde(default)]
    pub target: Option<ResolvedTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DepResolution {
    pub fn resolved(raw: Option<RawDependency>, target: ResolvedTarget) -> Self {
        Self {
            raw,
            target: Some(target),
            error: None,
        }
    }

    pub fn failed(raw: RawDependency, error: impl Into<String>) -> Self {
        Self {
            raw: Some(raw),
            target: None,
            error: Some(error.into()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}

/// A source directory that belongs to some unit of the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDir {
    pub unit: String,
    pub version: String,
    pub dir: PathBuf,
}

/// What the build-system scanner knows about the project being graphed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// `group/artifact` of the unit under analysis.
    pub unit_name: String,
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub dependencies: Vec<RawDependency>,
    /// Archive path on disk → the coordinate it was fetched for.
    #[serde(default)]
    pub archives: BTreeMap<String, RawDependency>,
    #[serde(default)]
    pub source_dirs: Vec<SourceDir>,
    /// Project targets the split platform SDK.
    #[serde(default)]
    pub platform: bool,
}

impl ProjectInfo {
    pub fn new(unit_name: impl Into<String>, group: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            unit_name: unit_name.into(),
            group: group.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GraphError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Coordinate an archive was fetched for. Paths are compared in full,
    /// relative ones resolved against the working directory; platform
    /// dependencies all unpack to `jars/classes.jar`, so a bare file name
    /// identifies nothing.
    pub fn dependency_for_archive(&self, archive: &Path) -> Option<&RawDependency> {
        if let Some(dep) = self.archives.get(archive.to_string_lossy().as_ref()) {
            return Some(dep);
        }
        let wanted = absolute(archive);
        self.archives
            .iter()
            .find(|(path, _)| absolute(Path::new(path)) == wanted)
            .map(|(_, dep)| dep)
    }

    /// Declared dependency matching `group/artifact/version`.
    pub fn find_dependency(&self, group: &str, artifact: &str, version: &str) -> Option<&RawDependency> {
        self.dependencies
            .iter()
            .find(|d| d.group == group && d.artifact == artifact && d.version == version)
    }
}

/// `path` made absolute against the working directory.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}
