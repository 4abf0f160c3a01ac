//! Resolved syntax forest: the front-end's output, as the engine consumes it.
//!
//! The engine never parses source. A forest arrives fully resolved: every
//! interesting node already points at a [`Binding`] in a shared
//! [`BindingTable`], and every span is in character offsets of its unit's
//! source text.

mod binding;
mod unit;

#[cfg(test)]
pub(crate) mod test_utils;

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::Path;

pub use binding::{Binding, BindingId, BindingKind, BindingTable, DeclSite};
pub use unit::{CompilationUnit, NameSegment, Node, NodeKind, PackageDecl, QualifiedName};

use crate::error::{GraphError, Result};

/// Bindings plus the units that reference them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Forest {
    #[serde(default)]
    pub bindings: BindingTable,
    #[serde(default)]
    pub units: Vec<CompilationUnit>,
}

impl Forest {
    /// Load a forest from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GraphError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Read a forest from any JSON stream (stdin in the CLI).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(GraphError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = Forest::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, GraphError::NotFound(_)));
    }

    #[test]
    fn test_load_roundtrip_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("forest.json");
        fs::write(
            &path,
            r#"{"bindings": [{"kind": "package", "name": "foo"}], "units": [{"file": "A.java", "source": ""}]}"#,
        )
        .unwrap();

        let forest = Forest::load(&path).unwrap();
        assert_eq!(forest.bindings.len(), 1);
        assert_eq!(forest.units[0].file, "A.java");
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let err = Forest::from_reader("{not json".as_bytes()).unwrap_err();
        assert!(matches!(err, GraphError::Json(_)));
    }
}
