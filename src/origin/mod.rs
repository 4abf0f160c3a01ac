//! Origin resolution: from "where was this symbol declared" to "which
//! upstream repository holds its source".
//!
//! A locator is first classified (standard library, platform SDK parts);
//! anything else is mapped to a dependency coordinate through the project's
//! archive table and resolved by identity, override table, and finally the
//! package registry.

pub mod classify;
pub mod locator;
pub mod overrides;
pub mod registry;
pub mod resolver;
pub mod types;

pub use classify::{ClassMembership, OriginClass, OriginClassifier, StdlibComponent};
pub use locator::{Locator, LocatorError};
pub use overrides::OverrideTable;
pub use registry::{DescriptorFetcher, FetchError, PomDescriptor, RegistryClient};
pub use resolver::DependencyResolver;
pub use types::{DepResolution, ProjectInfo, RawDependency, ResolvedTarget, SourceDir};
