//! The package collection document and its records.
//!
//! Every optional field is an `Option` that is omitted from the wire when
//! absent. Lists keep the order they were built in; nothing here re-sorts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::product::ProductType;
use crate::timestamp;

/// Top-level package collection ("feed") document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Display name of the collection.
    pub name: String,

    /// Free-form description of the collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,

    /// Keywords the collection is associated with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    /// Packages in input order.
    pub packages: Vec<Package>,

    /// Schema revision this document conforms to.
    pub format_version: FormatVersion,

    /// Monotonic revision number supplied by the publisher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u32>,

    /// When the document was generated.
    #[serde(with = "timestamp")]
    pub generated_at: DateTime<Utc>,

    /// Who generated the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<Author>,
}

/// Wire schema revision of a [`Collection`].
///
/// Append-only: a new schema gets a new variant, existing variants never
/// change meaning. Unknown strings fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FormatVersion {
    /// Version 1.0 of the collection schema.
    #[default]
    #[serde(rename = "1.0")]
    V1_0,
}

impl FormatVersion {
    /// Every format version this crate can read and write.
    pub const SUPPORTED: &'static [FormatVersion] = &[FormatVersion::V1_0];

    /// The wire string for this version.
    pub fn as_str(self) -> &'static str {
        match self {
            FormatVersion::V1_0 => "1.0",
        }
    }

    /// Look up a format version by its wire string.
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::SUPPORTED.iter().copied().find(|v| v.as_str() == s)
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribution for the tool or person that generated a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Author name.
    pub name: String,
}

/// One package and its selected versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Repository location; the package's identity.
    pub url: String,

    /// What the package does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Keywords the package is associated with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    /// Selected versions, in caller order (usually newest first).
    pub versions: Vec<Version>,

    /// Location of the package README.
    #[serde(
        rename = "readmeURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub readme_url: Option<String>,
}

/// Metadata for one tagged release of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Semantic version of the release.
    pub version: String,

    /// Name declared by the package manifest, which may differ from the
    /// repository name.
    pub package_name: String,

    /// Targets in manifest order.
    pub targets: Vec<Target>,

    /// Products in manifest order.
    pub products: Vec<Product>,

    /// Minimum toolchain version the manifest declares.
    pub tools_version: String,

    /// Minimum deployment version per platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_platform_versions: Option<Vec<PlatformVersion>>,

    /// Platforms the release was verified on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_platforms: Option<Vec<Platform>>,

    /// Toolchain versions the release was verified with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_swift_versions: Option<Vec<String>>,

    /// License of the release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

/// A buildable module of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Target name.
    pub name: String,

    /// Importable module name, when the producer knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
}

impl Target {
    /// Create a target with an explicit module name.
    pub fn new(name: impl Into<String>, module_name: Option<String>) -> Self {
        Self {
            name: name.into(),
            module_name,
        }
    }
}

/// A publishable artifact built from one or more targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product name.
    pub name: String,

    /// Kind of product.
    #[serde(rename = "type")]
    pub kind: ProductType,

    /// Names of the targets the product is built from.
    pub targets: Vec<String>,
}

impl Product {
    /// Create a product.
    pub fn new(name: impl Into<String>, kind: ProductType, targets: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            targets,
        }
    }
}

/// A platform identifier such as `macos` or `linux`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    /// Platform name.
    pub name: String,
}

impl Platform {
    /// Create a platform.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A platform paired with the minimum version a release supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformVersion {
    /// Platform name.
    pub name: String,

    /// Minimum supported version of the platform.
    pub version: String,
}

impl PlatformVersion {
    /// Create a platform/version pair.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// License of a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// License name (e.g. `Apache-2.0`, `MIT`).
    pub name: String,

    /// Location of the license text.
    pub url: String,
}
