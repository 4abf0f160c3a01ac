//! Origin classifier: buckets a locator into standard library, one of the
//! platform SDK components, or an ordinary external archive.
//!
//! The platform SDK ships as a single archive assembled from several source
//! trees, so the archive name alone cannot say where a class came from. The
//! top-level class path is looked up in sorted membership lists instead.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::locator::Locator;
use super::types::ResolvedTarget;
use crate::config::ClassifierConfig;

const RUNTIME_DIR_MARKER: &str = "jre/lib/";
const RUNTIME_ARCHIVE: &str = "rt.jar";
const TOOLS_ARCHIVE: &str = "tools.jar";
const SCRIPTING_ARCHIVE: &str = "nashorn.jar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdlibComponent {
    Runtime,
    Tools,
    Scripting,
}

/// Coarse category of an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginClass {
    StandardLibrary(StdlibComponent),
    /// Platform component A: the core library tree.
    PlatformCore,
    /// Platform component B: the framework tree. Default for platform classes
    /// found in no list.
    PlatformFramework,
    PlatformSupport,
    External,
}

impl OriginClass {
    /// Fixed repository target for every class except `External`.
    pub fn target(self) -> Option<ResolvedTarget> {
        match self {
            OriginClass::StandardLibrary(StdlibComponent::Runtime) => Some(ResolvedTarget::stdlib_runtime()),
            OriginClass::StandardLibrary(StdlibComponent::Tools) => Some(ResolvedTarget::stdlib_tools()),
            OriginClass::StandardLibrary(StdlibComponent::Scripting) => {
                Some(ResolvedTarget::stdlib_scripting())
            }
            OriginClass::PlatformCore => Some(ResolvedTarget::platform_core()),
            OriginClass::PlatformFramework => Some(ResolvedTarget::platform_framework()),
            OriginClass::PlatformSupport => Some(ResolvedTarget::platform_support()),
            OriginClass::External => None,
        }
    }
}

/// Sorted list of top-level class paths (`android/view/View`).
#[derive(Debug, Clone, Default)]
pub struct ClassMembership {
    classes: Vec<String>,
}

impl ClassMembership {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Read one class path per line. A missing or unreadable file yields an
    /// empty list.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => {
                let list = Self::new(
                    content
                        .lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty() && !l.starts_with('#')),
                );
                debug!(path = %path.display(), classes = list.len(), "loaded membership list");
                list
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "membership list unavailable, using empty list");
                Self::default()
            }
        }
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(class))
            .is_ok()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Classifies locators. Lists are loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct OriginClassifier {
    core: ClassMembership,
    support: ClassMembership,
    framework: ClassMembership,
    platform_archive: String,
}

impl Default for OriginClassifier {
    fn default() -> Self {
        Self::new(
            ClassMembership::default(),
            ClassMembership::default(),
            ClassMembership::default(),
        )
    }
}

impl OriginClassifier {
    pub fn new(core: ClassMembership, support: ClassMembership, framework: ClassMembership) -> Self {
        Self {
            core,
            support,
            framework,
            platform_archive: ClassifierConfig::default().platform_archive,
        }
    }

    pub fn with_platform_archive(mut self, name: impl Into<String>) -> Self {
        self.platform_archive = name.into();
        self
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        let load = |p: &Option<std::path::PathBuf>| {
            p.as_deref().map(ClassMembership::load).unwrap_or_default()
        };
        Self::new(
            load(&config.core_list),
            load(&config.support_list),
            load(&config.framework_list),
        )
        .with_platform_archive(config.platform_archive.clone())
    }

    /// Categorize `locator`. `platform_project` is set when the project under
    /// analysis targets the platform SDK.
    pub fn classify(&self, locator: &Locator, platform_project: bool) -> OriginClass {
        let archive = match locator.archive_path() {
            Ok(Some(path)) => path,
            Ok(None) => return OriginClass::External,
            Err(e) => {
                debug!(locator = %locator, error = %e, "unclassifiable locator");
                return OriginClass::External;
            }
        };
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if is_runtime_archive(&archive, &name) {
            if platform_project {
                return self.membership(locator, true);
            }
            return OriginClass::StandardLibrary(StdlibComponent::Runtime);
        }
        match name.as_str() {
            TOOLS_ARCHIVE => OriginClass::StandardLibrary(StdlibComponent::Tools),
            SCRIPTING_ARCHIVE => OriginClass::StandardLibrary(StdlibComponent::Scripting),
            n if n == self.platform_archive => self.membership(locator, true),
            _ if platform_project => self.membership(locator, false),
            _ => OriginClass::External,
        }
    }

    /// Membership lookup on the locator's top-level class. With `force`, a
    /// class found in no list is attributed to the framework tree.
    pub fn membership(&self, locator: &Locator, force: bool) -> OriginClass {
        let Some(class) = locator.top_class_name() else {
            return OriginClass::External;
        };
        if self.core.contains(&class) {
            OriginClass::PlatformCore
        } else if self.support.contains(&class) {
            OriginClass::PlatformSupport
        } else if force || self.framework.contains(&class) {
            OriginClass::PlatformFramework
        } else {
            OriginClass::External
        }
    }
}

fn is_runtime_archive(path: &Path, name: &str) -> bool {
    name == RUNTIME_ARCHIVE || path.to_string_lossy().replace('\\', "/").contains(RUNTIME_DIR_MARKER)
}
