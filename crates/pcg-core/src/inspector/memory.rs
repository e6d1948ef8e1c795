use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{PackageInspector, VersionManifest};
use crate::error::InspectError;

#[derive(Debug, Default, Clone)]
struct FixturePackage {
    tags: Vec<String>,
    manifests: HashMap<String, Result<VersionManifest, InspectError>>,
    unreachable: Option<String>,
    readme_url: Option<String>,
    delay: Option<Duration>,
}

/// An inspector answering from fixtures registered up front.
///
/// Tags listed without a manifest fail with `ManifestUnreadable`; tags not
/// listed at all fail with `VersionUnavailable`.
#[derive(Debug, Default)]
pub struct MemoryInspector {
    packages: HashMap<String, FixturePackage>,
    calls: Mutex<Vec<String>>,
}

impl MemoryInspector {
    /// Create an inspector that knows no packages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package and its tags.
    #[must_use]
    pub fn with_package<I, S>(mut self, url: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry(url).tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Register the manifest returned for `url` at `tag`.
    #[must_use]
    pub fn with_manifest(mut self, url: &str, tag: &str, manifest: VersionManifest) -> Self {
        self.entry(url).manifests.insert(tag.to_string(), Ok(manifest));
        self
    }

    /// Make inspecting `url` at `tag` fail with `error`.
    #[must_use]
    pub fn with_failure(mut self, url: &str, tag: &str, error: InspectError) -> Self {
        self.entry(url).manifests.insert(tag.to_string(), Err(error));
        self
    }

    /// Make every call for `url` fail as unreachable.
    #[must_use]
    pub fn with_unreachable(mut self, url: &str, reason: &str) -> Self {
        self.entry(url).unreachable = Some(reason.to_string());
        self
    }

    /// Set the README location reported for `url`.
    #[must_use]
    pub fn with_readme(mut self, url: &str, readme_url: &str) -> Self {
        self.entry(url).readme_url = Some(readme_url.to_string());
        self
    }

    /// Delay every call for `url`, to shuffle completion order.
    #[must_use]
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.entry(url).delay = Some(delay);
        self
    }

    /// Every call made so far, as `list <url>` or `inspect <url>@<tag>`.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn entry(&mut self, url: &str) -> &mut FixturePackage {
        self.packages.entry(url.to_string()).or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    async fn lookup(&self, url: &str) -> Result<&FixturePackage, InspectError> {
        let package = self
            .packages
            .get(url)
            .ok_or_else(|| InspectError::UnreachablePackage {
                url: url.to_string(),
                reason: "unknown package".to_string(),
            })?;
        if let Some(delay) = package.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &package.unreachable {
            return Err(InspectError::UnreachablePackage {
                url: url.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(package)
    }
}

#[async_trait]
impl PackageInspector for MemoryInspector {
    async fn list_versions(&self, url: &str) -> Result<Vec<String>, InspectError> {
        self.record(format!("list {url}"));
        Ok(self.lookup(url).await?.tags.clone())
    }

    async fn inspect(&self, url: &str, tag: &str) -> Result<VersionManifest, InspectError> {
        self.record(format!("inspect {url}@{tag}"));
        let package = self.lookup(url).await?;
        if !package.tags.iter().any(|t| t == tag) {
            return Err(InspectError::VersionUnavailable {
                url: url.to_string(),
                version: tag.to_string(),
            });
        }
        package
            .manifests
            .get(tag)
            .cloned()
            .unwrap_or_else(|| {
                Err(InspectError::ManifestUnreadable {
                    url: url.to_string(),
                    version: tag.to_string(),
                    reason: "no manifest registered".to_string(),
                })
            })
    }

    async fn readme_url(&self, url: &str) -> Option<String> {
        self.packages.get(url).and_then(|p| p.readme_url.clone())
    }
}
