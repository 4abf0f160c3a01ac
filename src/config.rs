//
//  config.rs
//  symgraph
//

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::graph::TargetEncoding;

/// Top-level configuration, read from `symgraph.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymgraphConfig {
    #[serde(default)]
    pub emitter: EmitterConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Tree emitter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Node failures tolerated per unit before the unit is abandoned.
    /// Unset means unlimited.
    #[serde(default)]
    pub error_budget: Option<usize>,
    /// Encoding output spans are measured in.
    #[serde(default)]
    pub encoding: TargetEncoding,
    /// Path of the type every class extends when it names no supertype.
    #[serde(default = "default_implicit_root_type")]
    pub implicit_root_type: String,
    /// Origin locator of the implicit root type.
    #[serde(default = "default_implicit_root_origin")]
    pub implicit_root_origin: String,
}

/// Dependency origin resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_registry_url")]
    pub registry_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Size of the worker pool used by batch resolution.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// Parent descriptors followed when a descriptor has no SCM URL.
    #[serde(default = "default_max_parent_depth")]
    pub max_parent_depth: usize,
    /// Skip the registry entirely.
    #[serde(default)]
    pub offline: bool,
    /// Extra `group/artifact` prefix → clone URL entries.
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

/// Origin classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Class lists, one top-level class path per line.
    #[serde(default)]
    pub core_list: Option<PathBuf>,
    #[serde(default)]
    pub support_list: Option<PathBuf>,
    #[serde(default)]
    pub framework_list: Option<PathBuf>,
    /// File name of the combined platform SDK archive.
    #[serde(default = "default_platform_archive")]
    pub platform_archive: String,
}

fn default_implicit_root_type() -> String {
    "java.lang.Object:type".to_string()
}

fn default_implicit_root_origin() -> String {
    "jar:file:/jre/lib/rt.jar".to_string()
}

fn default_registry_url() -> String {
    "https://repo1.maven.org/maven2".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_concurrent_fetches() -> usize {
    4
}

fn default_max_parent_depth() -> usize {
    4
}

fn default_platform_archive() -> String {
    "android.jar".to_string()
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            error_budget: None,
            encoding: TargetEncoding::default(),
            implicit_root_type: default_implicit_root_type(),
            implicit_root_origin: default_implicit_root_origin(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            registry_url: default_registry_url(),
            timeout_secs: default_timeout_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            max_parent_depth: default_max_parent_depth(),
            offline: false,
            overrides: BTreeMap::new(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            core_list: None,
            support_list: None,
            framework_list: None,
            platform_archive: default_platform_archive(),
        }
    }
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SymgraphConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = SymgraphConfig::load(&dir.path().join("symgraph.toml"));
        assert_eq!(config.resolver.registry_url, "https://repo1.maven.org/maven2");
        assert_eq!(config.classifier.platform_archive, "android.jar");
        assert_eq!(config.emitter.error_budget, None);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("symgraph.toml");
        std::fs::write(
            &path,
            r#"
[emitter]
error_budget = 3
encoding = "utf16le"

[resolver]
offline = true

[resolver.overrides]
"org.acme/" = "https://git.acme.org/acme"
"#,
        )
        .unwrap();

        let config = SymgraphConfig::load(&path);
        assert_eq!(config.emitter.error_budget, Some(3));
        assert_eq!(config.emitter.encoding, TargetEncoding::Utf16Le);
        assert_eq!(config.emitter.implicit_root_type, "java.lang.Object:type");
        assert!(config.resolver.offline);
        assert_eq!(config.resolver.timeout_secs, 10);
        assert_eq!(
            config.resolver.overrides.get("org.acme/").map(String::as_str),
            Some("https://git.acme.org/acme")
        );
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("symgraph.toml");
        std::fs::write(&path, "[emitter\nerror_budget = ").unwrap();
        let config = SymgraphConfig::load(&path);
        assert_eq!(config.resolver.max_concurrent_fetches, 4);
    }
}
