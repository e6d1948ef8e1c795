//! Package inspectors: where versions and manifests come from.
//!
//! The pipeline only talks to the [`PackageInspector`] trait. Each call is a
//! self-contained unit of work that either fully succeeds or fails.

/// Adapter for `swift package dump-package` output.
pub mod dump;
/// Working-directory checkout cache backed by `git`.
pub mod git;
/// In-memory fixtures.
pub mod memory;

pub use git::GitInspector;
pub use memory::MemoryInspector;

use async_trait::async_trait;
use pcg_schema::{License, Platform, PlatformVersion, Product, Target};

use crate::error::InspectError;

/// Manifest facts for one tagged version of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionManifest {
    /// Name declared by the manifest.
    pub package_name: String,
    /// Targets in manifest order.
    pub targets: Vec<Target>,
    /// Products in manifest order.
    pub products: Vec<Product>,
    /// Minimum toolchain version.
    pub tools_version: String,
    /// Minimum deployment version per platform.
    pub minimum_platform_versions: Option<Vec<PlatformVersion>>,
    /// Platforms the version was verified on.
    pub verified_platforms: Option<Vec<Platform>>,
    /// Toolchain versions the version was verified with.
    pub verified_swift_versions: Option<Vec<String>>,
    /// License of the version.
    pub license: Option<License>,
}

/// A source of package versions and manifests (e.g. a git checkout cache).
#[async_trait]
pub trait PackageInspector: Send + Sync {
    /// List every version tag of the package, in the source's order.
    async fn list_versions(&self, url: &str) -> Result<Vec<String>, InspectError>;

    /// Read the manifest of the package at `tag`.
    async fn inspect(&self, url: &str, tag: &str) -> Result<VersionManifest, InspectError>;

    /// README location for the package, when the source can derive one.
    async fn readme_url(&self, _url: &str) -> Option<String> {
        None
    }
}

#[async_trait]
impl<T: PackageInspector + ?Sized> PackageInspector for std::sync::Arc<T> {
    async fn list_versions(&self, url: &str) -> Result<Vec<String>, InspectError> {
        (**self).list_versions(url).await
    }

    async fn inspect(&self, url: &str, tag: &str) -> Result<VersionManifest, InspectError> {
        (**self).inspect(url, tag).await
    }

    async fn readme_url(&self, url: &str) -> Option<String> {
        (**self).readme_url(url).await
    }
}
