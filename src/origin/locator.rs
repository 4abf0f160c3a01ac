//! Origin locators: where an out-of-unit binding physically lives.
//!
//! A locator is kept as the opaque string the front-end hands over
//! (`jar:file:/repo/lib/x.jar!/com/a/X.class`, `file:/src/Foo.java`).
//! The helpers here only pick it apart; nothing is resolved on disk.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

const JAR_SCHEME: &str = "jar:";
const FILE_SCHEME: &str = "file:";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LocatorError {
    #[error("Archive locator must wrap a file: URI, got {0}")]
    UnsupportedScheme(String),
}

/// Opaque archive/class-file descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `jar:` locators point inside an archive.
    pub fn is_archive(&self) -> bool {
        self.0.starts_with(JAR_SCHEME)
    }

    pub fn is_file(&self) -> bool {
        self.0.starts_with(FILE_SCHEME)
    }

    /// Drop the in-archive entry: `jar:file:/a.jar!/x/Y.class` → `jar:file:/a.jar`.
    /// Non-archive locators are returned unchanged.
    pub fn normalized(&self) -> Locator {
        if !self.is_archive() {
            return self.clone();
        }
        match self.0.rfind('!') {
            Some(i) => Locator(self.0[..i].to_string()),
            None => self.clone(),
        }
    }

    /// Path of the archive on disk, `None` for non-archive locators.
    pub fn archive_path(&self) -> Result<Option<PathBuf>, LocatorError> {
        let Some(inner) = self.0.strip_prefix(JAR_SCHEME) else {
            return Ok(None);
        };
        if !inner.starts_with(FILE_SCHEME) {
            return Err(LocatorError::UnsupportedScheme(self.0.clone()));
        }
        let inner = match inner.find('!') {
            Some(i) => &inner[..i],
            None => inner,
        };
        Ok(Some(PathBuf::from(strip_file_scheme(inner))))
    }

    /// Path of a plain `file:` locator.
    pub fn file_path(&self) -> Option<PathBuf> {
        if self.is_file() {
            Some(PathBuf::from(strip_file_scheme(&self.0)))
        } else {
            None
        }
    }

    /// Entry inside the archive without the leading slash: `x/Y.class`.
    pub fn entry(&self) -> Option<&str> {
        if !self.is_archive() {
            return None;
        }
        let i = self.0.rfind('!')?;
        let entry = self.0[i + 1..].trim_start_matches('/');
        if entry.is_empty() {
            None
        } else {
            Some(entry)
        }
    }

    /// Top-level class path of the entry: `com/a/X$Inner.class` → `com/a/X`.
    pub fn top_class_name(&self) -> Option<String> {
        let entry = self.entry()?;
        if let Some(i) = entry.find('$') {
            return Some(entry[..i].to_string());
        }
        entry.find('.').map(|i| entry[..i].to_string())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Locator {
    fn from(s: &str) -> Self {
        Locator::new(s)
    }
}

/// `file:/a`, `file:///a` and `file://host/a` all map to `/a`.
fn strip_file_scheme(uri: &str) -> &str {
    let rest = uri.strip_prefix(FILE_SCHEME).unwrap_or(uri);
    match rest.strip_prefix("//") {
        Some(authority) => match authority.find('/') {
            Some(i) => &authority[i..],
            None => authority,
        },
        None => rest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_normalized_strips_entry() {
        let loc = Locator::new("jar:file:/m2/junit.jar!/org/junit/Assert.class");
        assert_eq!(loc.normalized().as_str(), "jar:file:/m2/junit.jar");

        let file = Locator::new("file:/src/Foo.java");
        assert_eq!(file.normalized(), file);
    }

    #[test]
    fn test_archive_path() {
        let loc = Locator::new("jar:file:///m2/junit.jar!/org/junit/Assert.class");
        assert_eq!(
            loc.archive_path().unwrap().as_deref(),
            Some(Path::new("/m2/junit.jar"))
        );

        assert_eq!(Locator::new("file:/src/Foo.java").archive_path(), Ok(None));
        assert!(matches!(
            Locator::new("jar:http://x/y.jar!/A.class").archive_path(),
            Err(LocatorError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_top_class_name() {
        let inner = Locator::new("jar:file:/sdk/android.jar!/android/view/View$OnClickListener.class");
        assert_eq!(inner.top_class_name().as_deref(), Some("android/view/View"));

        let plain = Locator::new("jar:file:/sdk/android.jar!/com/a/X.class");
        assert_eq!(plain.top_class_name().as_deref(), Some("com/a/X"));

        assert_eq!(Locator::new("jar:file:/sdk/android.jar").top_class_name(), None);
        assert_eq!(Locator::new("file:/x/Y.class").top_class_name(), None);
    }

    #[test]
    fn test_file_path() {
        assert_eq!(
            Locator::new("file:/work/src/Foo.java").file_path(),
            Some(PathBuf::from("/work/src/Foo.java"))
        );
        assert_eq!(Locator::new("jar:file:/a.jar").file_path(), None);
    }
}
