//! Structural checks for collections and input descriptors.

use std::collections::HashSet;

use crate::collection::{Collection, License, Package, Product, Target, Version};
use crate::input::{InputDescriptor, InputPackage};

/// A violated schema invariant, tagged with the path of the offending field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A required string or list is empty.
    #[error("{0}: must not be empty")]
    Empty(String),

    /// A location is not a usable URL.
    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl {
        /// Path of the offending field.
        field: String,
        /// The rejected value.
        value: String,
    },

    /// A version string is not a semantic version.
    #[error("{field}: '{value}' is not a semantic version")]
    InvalidVersion {
        /// Path of the offending field.
        field: String,
        /// The rejected value.
        value: String,
    },

    /// The same version appears twice in one list.
    #[error("{field}: duplicate version '{value}'")]
    DuplicateVersion {
        /// Path of the offending list.
        field: String,
        /// The repeated version.
        value: String,
    },

    /// A numeric field is out of range.
    #[error("{field}: {reason}")]
    OutOfRange {
        /// Path of the offending field.
        field: String,
        /// What the allowed range is.
        reason: String,
    },
}

impl SchemaError {
    /// Path of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            SchemaError::Empty(field)
            | SchemaError::InvalidUrl { field, .. }
            | SchemaError::InvalidVersion { field, .. }
            | SchemaError::DuplicateVersion { field, .. }
            | SchemaError::OutOfRange { field, .. } => field,
        }
    }
}

/// Parse a version string as semver, tolerating a leading `v`.
pub fn parse_semver(s: &str) -> Option<semver::Version> {
    let trimmed = s.strip_prefix('v').unwrap_or(s);
    semver::Version::parse(trimmed).ok()
}

/// Whether `url` looks like a repository location: `scheme://host/...` or
/// scp-like `user@host:path`.
pub fn is_repository_url(url: &str) -> bool {
    if let Some((scheme, rest)) = url.split_once("://") {
        return !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
            && !rest.is_empty();
    }
    match url.split_once('@') {
        Some((user, rest)) => {
            !user.is_empty()
                && rest
                    .split_once(':')
                    .is_some_and(|(h, p)| !h.is_empty() && !p.is_empty())
        }
        None => false,
    }
}

/// Whether `url` is an absolute `http` or `https` URL.
pub fn is_web_url(url: &str) -> bool {
    ["https://", "http://"]
        .iter()
        .any(|prefix| url.len() > prefix.len() && url.starts_with(prefix))
}

fn non_empty(field: impl FnOnce() -> String, value: &str) -> Result<(), SchemaError> {
    if value.trim().is_empty() {
        return Err(SchemaError::Empty(field()));
    }
    Ok(())
}

impl Collection {
    /// Check every invariant a consumer relies on.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found, in document order.
    pub fn validate(&self) -> Result<(), SchemaError> {
        non_empty(|| "name".into(), &self.name)?;
        if self.packages.is_empty() {
            return Err(SchemaError::Empty("packages".into()));
        }
        if self.revision == Some(0) {
            return Err(SchemaError::OutOfRange {
                field: "revision".into(),
                reason: "must be at least 1".into(),
            });
        }
        for (i, package) in self.packages.iter().enumerate() {
            package.validate(&format!("packages[{i}]"))?;
        }
        Ok(())
    }
}

impl Package {
    fn validate(&self, path: &str) -> Result<(), SchemaError> {
        if !is_repository_url(&self.url) {
            return Err(SchemaError::InvalidUrl {
                field: format!("{path}.url"),
                value: self.url.clone(),
            });
        }
        if let Some(readme) = &self.readme_url {
            if !is_web_url(readme) {
                return Err(SchemaError::InvalidUrl {
                    field: format!("{path}.readmeURL"),
                    value: readme.clone(),
                });
            }
        }
        if self.versions.is_empty() {
            return Err(SchemaError::Empty(format!("{path}.versions")));
        }

        let mut seen = HashSet::new();
        for (i, version) in self.versions.iter().enumerate() {
            let vpath = format!("{path}.versions[{i}]");
            version.validate(&vpath)?;
            if !seen.insert(version.version.as_str()) {
                return Err(SchemaError::DuplicateVersion {
                    field: format!("{path}.versions"),
                    value: version.version.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Version {
    /// Check one version record; `path` prefixes the field in the error.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self, path: &str) -> Result<(), SchemaError> {
        if parse_semver(&self.version).is_none() {
            return Err(SchemaError::InvalidVersion {
                field: format!("{path}.version"),
                value: self.version.clone(),
            });
        }
        non_empty(|| format!("{path}.packageName"), &self.package_name)?;
        non_empty(|| format!("{path}.toolsVersion"), &self.tools_version)?;
        for (i, target) in self.targets.iter().enumerate() {
            target.validate(&format!("{path}.targets[{i}]"))?;
        }
        for (i, product) in self.products.iter().enumerate() {
            product.validate(&format!("{path}.products[{i}]"))?;
        }
        if let Some(license) = &self.license {
            license.validate(&format!("{path}.license"))?;
        }
        Ok(())
    }
}

impl Target {
    fn validate(&self, path: &str) -> Result<(), SchemaError> {
        non_empty(|| format!("{path}.name"), &self.name)
    }
}

impl Product {
    fn validate(&self, path: &str) -> Result<(), SchemaError> {
        non_empty(|| format!("{path}.name"), &self.name)?;
        if self.targets.is_empty() {
            return Err(SchemaError::Empty(format!("{path}.targets")));
        }
        Ok(())
    }
}

impl License {
    fn validate(&self, path: &str) -> Result<(), SchemaError> {
        non_empty(|| format!("{path}.name"), &self.name)?;
        if !is_web_url(&self.url) {
            return Err(SchemaError::InvalidUrl {
                field: format!("{path}.url"),
                value: self.url.clone(),
            });
        }
        Ok(())
    }
}

impl InputDescriptor {
    /// Check the descriptor before any package is inspected.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found, in document order.
    pub fn validate(&self) -> Result<(), SchemaError> {
        non_empty(|| "title".into(), &self.title)?;
        if self.packages.is_empty() {
            return Err(SchemaError::Empty("packages".into()));
        }
        for (i, package) in self.packages.iter().enumerate() {
            package.validate(&format!("packages[{i}]"))?;
        }
        Ok(())
    }
}

impl InputPackage {
    fn validate(&self, path: &str) -> Result<(), SchemaError> {
        if !is_repository_url(&self.url) {
            return Err(SchemaError::InvalidUrl {
                field: format!("{path}.url"),
                value: self.url.clone(),
            });
        }
        if let Some(readme) = &self.readme_url {
            if !is_web_url(readme) {
                return Err(SchemaError::InvalidUrl {
                    field: format!("{path}.readmeURL"),
                    value: readme.clone(),
                });
            }
        }
        if let Some(versions) = &self.versions {
            let mut seen = HashSet::new();
            for (i, version) in versions.iter().enumerate() {
                let field = format!("{path}.versions[{i}]");
                non_empty(|| field.clone(), version)?;
                if parse_semver(version).is_none() {
                    return Err(SchemaError::InvalidVersion {
                        field,
                        value: version.clone(),
                    });
                }
                if !seen.insert(version.as_str()) {
                    return Err(SchemaError::DuplicateVersion {
                        field: format!("{path}.versions"),
                        value: version.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{Author, FormatVersion};
    use crate::product::{LibraryType, ProductType};

    fn version(v: &str) -> Version {
        Version {
            version: v.into(),
            package_name: "Foo".into(),
            targets: vec![Target::new("Foo", Some("Foo".into()))],
            products: vec![Product::new(
                "Foo",
                ProductType::Library(LibraryType::Automatic),
                vec!["Foo".into()],
            )],
            tools_version: "5.2.0".into(),
            minimum_platform_versions: None,
            verified_platforms: None,
            verified_swift_versions: None,
            license: None,
        }
    }

    fn collection(versions: Vec<Version>) -> Collection {
        Collection {
            name: "Test".into(),
            overview: None,
            keywords: None,
            packages: vec![Package {
                url: "https://example.com/foo.git".into(),
                summary: None,
                keywords: None,
                versions,
                readme_url: None,
            }],
            format_version: FormatVersion::V1_0,
            revision: None,
            generated_at: crate::timestamp::now(),
            generated_by: Some(Author { name: "tests".into() }),
        }
    }

    #[test]
    fn accepts_well_formed_collection() {
        collection(vec![version("1.0.0"), version("0.1.0")])
            .validate()
            .unwrap();
    }

    #[test]
    fn rejects_non_semver_version() {
        let err = collection(vec![version("latest")]).validate().unwrap_err();
        assert_eq!(err.field(), "packages[0].versions[0].version");
    }

    #[test]
    fn rejects_duplicate_versions() {
        let err = collection(vec![version("1.0.0"), version("1.0.0")])
            .validate()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateVersion { .. }));
    }

    #[test]
    fn rejects_empty_versions_and_zero_revision() {
        let err = collection(vec![]).validate().unwrap_err();
        assert_eq!(err.field(), "packages[0].versions");

        let mut doc = collection(vec![version("1.0.0")]);
        doc.revision = Some(0);
        assert_eq!(doc.validate().unwrap_err().field(), "revision");
    }

    #[test]
    fn rejects_product_without_targets() {
        let mut v = version("1.0.0");
        v.products[0].targets.clear();
        let err = collection(vec![v]).validate().unwrap_err();
        assert_eq!(err.field(), "packages[0].versions[0].products[0].targets");
    }

    #[test]
    fn single_version_reports_its_own_path() {
        let mut v = version("1.0.0");
        v.tools_version = "  ".into();
        let err = v.validate("version").unwrap_err();
        assert_eq!(err, SchemaError::Empty("version.toolsVersion".into()));
        version("0.1.0").validate("version").unwrap();
    }

    #[test]
    fn repository_url_forms() {
        assert!(is_repository_url("https://github.com/apple/swift-nio.git"));
        assert!(is_repository_url("file:///tmp/repo"));
        assert!(is_repository_url("git@github.com:apple/swift-nio.git"));
        assert!(!is_repository_url("swift-nio"));
        assert!(!is_repository_url("https://"));
    }

    #[test]
    fn semver_tolerates_v_prefix() {
        assert_eq!(parse_semver("v1.2.3"), Some(semver::Version::new(1, 2, 3)));
        assert_eq!(parse_semver("1.2"), None);
    }
}
