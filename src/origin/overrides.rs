//
//  overrides.rs
//  symgraph
//

use std::collections::BTreeMap;

/// Curated `group/artifact` prefixes whose published descriptors carry no
/// usable repository URL.
const BUILTIN_OVERRIDES: &[(&str, &str)] = &[
    ("org.hamcrest/", "https://github.com/hamcrest/JavaHamcrest"),
    ("junit/junit", "https://github.com/junit-team/junit4"),
    ("com.google.guava/", "https://github.com/google/guava"),
    ("com.google.code.gson/", "https://github.com/google/gson"),
    ("org.slf4j/", "https://github.com/qos-ch/slf4j"),
    ("org.apache.commons/commons-lang3", "https://github.com/apache/commons-lang"),
    ("commons-io/commons-io", "https://github.com/apache/commons-io"),
];

/// Prefix table from `group/artifact` to a clone URL.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: BTreeMap<String, String>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in entries, then `extra` on top (same prefix replaces).
    pub fn with_builtin<I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut table = Self::new();
        for (prefix, url) in BUILTIN_OVERRIDES {
            table.insert(*prefix, *url);
        }
        for (prefix, url) in extra {
            table.insert(prefix, url);
        }
        table
    }

    pub fn insert(&mut self, prefix: impl Into<String>, url: impl Into<String>) {
        self.entries.insert(prefix.into(), url.into());
    }

    /// URL of the longest prefix of `lookup`, verbatim.
    pub fn lookup(&self, lookup: &str) -> Option<&str> {
        self.entries
            .iter()
            .filter(|(prefix, _)| lookup.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, url)| url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
