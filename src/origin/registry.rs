//! Remote metadata lookup: fetch a dependency's published descriptor (POM)
//! from a package registry and read its source-control URL.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::time::Duration;
use tracing::debug;

use super::types::RawDependency;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("{0}")]
    Http(String),

    #[error("{url} (HTTP {status})")]
    Status { url: String, status: u16 },

    #[error("malformed descriptor: {0}")]
    Malformed(String),
}

/// Coordinates of a parent descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentRef {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

/// The few descriptor fields the resolver reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomDescriptor {
    pub group: Option<String>,
    pub artifact: Option<String>,
    pub version: Option<String>,
    pub scm_url: Option<String>,
    pub parent: Option<ParentRef>,
}

impl PomDescriptor {
    pub fn parse(xml: &str) -> Result<Self, FetchError> {
        let mut reader = Reader::from_str(xml.trim_start_matches('\u{feff}'));
        reader.config_mut().trim_text(true);

        let mut pom = PomDescriptor::default();
        let mut parent = ParentRef::default();
        let mut has_parent = false;
        let mut path: Vec<String> = Vec::new();
        let mut saw_project = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    if path.is_empty() {
                        saw_project = name == "project";
                    }
                    if path.len() == 1 && name == "parent" {
                        has_parent = true;
                    }
                    path.push(name);
                }
                Ok(Event::End(_)) => {
                    path.pop();
                }
                Ok(Event::Text(t)) => {
                    let text = t
                        .unescape()
                        .map_err(|e| FetchError::Malformed(e.to_string()))?
                        .trim()
                        .to_string();
                    if text.is_empty() {
                        continue;
                    }
                    let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                    match segments.as_slice() {
                        ["project", "groupId"] => pom.group = Some(text),
                        ["project", "artifactId"] => pom.artifact = Some(text),
                        ["project", "version"] => pom.version = Some(text),
                        ["project", "scm", "url"] => pom.scm_url = Some(text),
                        ["project", "parent", "groupId"] => parent.group = text,
                        ["project", "parent", "artifactId"] => parent.artifact = text,
                        ["project", "parent", "version"] => parent.version = text,
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(FetchError::Malformed(format!(
                        "XML parse error at position {}: {e}",
                        reader.error_position()
                    )));
                }
                _ => {}
            }
        }

        if !saw_project {
            return Err(FetchError::Malformed("missing <project> root".to_string()));
        }
        if has_parent {
            pom.parent = Some(parent);
        }
        Ok(pom)
    }
}

/// Source of published descriptors. The resolver only ever talks to this.
pub trait DescriptorFetcher: Send + Sync {
    fn fetch(&self, dep: &RawDependency) -> Result<PomDescriptor, FetchError>;
}

/// Blocking HTTP client against a Maven-layout registry.
pub struct RegistryClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// `<base>/<group as path>/<artifact>/<version>/<artifact>-<version>.pom`
    pub fn descriptor_url(&self, dep: &RawDependency) -> String {
        format!(
            "{}/{}/{}/{}/{}-{}.pom",
            self.base_url,
            dep.group.replace('.', "/"),
            dep.artifact,
            dep.version,
            dep.artifact,
            dep.version
        )
    }
}

impl DescriptorFetcher for RegistryClient {
    fn fetch(&self, dep: &RawDependency) -> Result<PomDescriptor, FetchError> {
        let url = self.descriptor_url(dep);
        debug!(url = %url, "fetching descriptor");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::Http(format!("{url}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let body = response
            .text()
            .map_err(|e| FetchError::Http(format!("{url}: {e}")))?;
        PomDescriptor::parse(&body)
    }
}

/// SCM URL of `dep`. When the descriptor has none and its parent shares the
/// group, the parent is tried instead, up to `max_parent_depth` hops.
pub fn scm_url(
    fetcher: &dyn DescriptorFetcher,
    dep: &RawDependency,
    max_parent_depth: usize,
) -> Result<Option<String>, FetchError> {
    let mut current = dep.clone();
    for _ in 0..=max_parent_depth {
        let pom = fetcher.fetch(&current)?;
        if let Some(url) = pom.scm_url {
            return Ok(Some(url));
        }
        let Some(parent) = pom.parent else {
            return Ok(None);
        };
        if parent.group != dep.group {
            return Ok(None);
        }
        debug!(dep = %current, parent = %parent.artifact, "no scm url, trying parent descriptor");
        current = RawDependency::new(parent.group, parent.artifact, parent.version);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>org.acme</groupId>
    <artifactId>acme-parent</artifactId>
    <version>3</version>
  </parent>
  <artifactId>widgets</artifactId>
  <dependencies>
    <dependency><groupId>x</groupId><artifactId>y</artifactId></dependency>
  </dependencies>
  <scm>
    <url>https://github.com/acme/widgets?a=1&amp;b=2</url>
  </scm>
</project>"#;

    struct MapFetcher {
        poms: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl DescriptorFetcher for MapFetcher {
        fn fetch(&self, dep: &RawDependency) -> Result<PomDescriptor, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.poms.get(&dep.lookup_key()) {
                Some(xml) => PomDescriptor::parse(xml),
                None => Err(FetchError::Status {
                    url: dep.lookup_key(),
                    status: 404,
                }),
            }
        }
    }

    fn fetcher(poms: &[(&str, &str)]) -> MapFetcher {
        MapFetcher {
            poms: poms
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_parse_descriptor() {
        let pom = PomDescriptor::parse(POM).unwrap();
        assert_eq!(pom.artifact.as_deref(), Some("widgets"));
        assert_eq!(pom.group, None);
        assert_eq!(
            pom.scm_url.as_deref(),
            Some("https://github.com/acme/widgets?a=1&b=2")
        );
        let parent = pom.parent.unwrap();
        assert_eq!(parent.artifact, "acme-parent");
        assert_eq!(parent.version, "3");
    }

    #[test]
    fn test_parse_rejects_non_descriptor() {
        assert!(matches!(
            PomDescriptor::parse("<html><body>Not Found</body></html>"),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_descriptor_url() {
        let client = RegistryClient::new("https://repo1.maven.org/maven2/", Duration::from_secs(1));
        let dep = RawDependency::new("org.hamcrest", "hamcrest-core", "1.3");
        assert_eq!(
            client.descriptor_url(&dep),
            "https://repo1.maven.org/maven2/org/hamcrest/hamcrest-core/1.3/hamcrest-core-1.3.pom"
        );
    }

    #[test]
    fn test_scm_url_walks_parent_in_same_group() {
        let f = fetcher(&[
            (
                "org.acme/child",
                "<project><parent><groupId>org.acme</groupId><artifactId>root</artifactId><version>1</version></parent></project>",
            ),
            ("org.acme/root", "<project><scm><url>https://git.acme.org/root</url></scm></project>"),
        ]);
        let dep = RawDependency::new("org.acme", "child", "1");
        assert_eq!(
            scm_url(&f, &dep, 4).unwrap().as_deref(),
            Some("https://git.acme.org/root")
        );
        assert_eq!(f.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_scm_url_stops_at_foreign_parent_and_depth() {
        let foreign = fetcher(&[(
            "org.acme/child",
            "<project><parent><groupId>org.other</groupId><artifactId>root</artifactId><version>1</version></parent></project>",
        )]);
        let dep = RawDependency::new("org.acme", "child", "1");
        assert_eq!(scm_url(&foreign, &dep, 4).unwrap(), None);

        let looping = fetcher(&[(
            "org.acme/child",
            "<project><parent><groupId>org.acme</groupId><artifactId>child</artifactId><version>1</version></parent></project>",
        )]);
        assert_eq!(scm_url(&looping, &dep, 2).unwrap(), None);
        assert_eq!(looping.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_scm_url_propagates_fetch_errors() {
        let empty = fetcher(&[]);
        let dep = RawDependency::new("org.acme", "missing", "1");
        assert!(matches!(
            scm_url(&empty, &dep, 1),
            Err(FetchError::Status { status: 404, .. })
        ));
    }
}
