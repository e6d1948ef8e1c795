//! JSON reading and writing for [`Collection`].
//!
//! Output goes through `serde_json::Value`, whose object map is ordered by
//! key, so equal documents always produce identical bytes.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::collection::{Collection, FormatVersion};
use crate::validate::SchemaError;

const FORMAT_VERSION_KEY: &str = "formatVersion";

/// Errors that can occur while encoding or decoding a collection.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The payload is not valid JSON or does not match the schema.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The payload has no `formatVersion`.
    #[error("missing formatVersion")]
    MissingFormatVersion,

    /// The payload declares a schema this crate does not know.
    #[error("unsupported formatVersion '{0}'")]
    UnsupportedFormatVersion(String),

    /// The document decoded but breaks a schema invariant.
    #[error("invalid collection: {0}")]
    Invalid(#[from] SchemaError),
}

/// Encode a collection as pretty-printed JSON with lexicographic keys.
///
/// # Errors
///
/// Returns [`CodecError::Invalid`] if the collection fails validation, or
/// [`CodecError::Json`] if encoding fails.
pub fn to_json(collection: &Collection) -> Result<String, CodecError> {
    collection.validate()?;
    let value = serde_json::to_value(collection)?;
    let mut out = serde_json::to_string_pretty(&value)?;
    out.push('\n');
    Ok(out)
}

/// Decode a collection, rejecting unknown format versions before anything
/// else is looked at.
///
/// # Errors
///
/// Returns [`CodecError::MissingFormatVersion`] or
/// [`CodecError::UnsupportedFormatVersion`] for schema mismatches,
/// [`CodecError::Json`] for malformed payloads and [`CodecError::Invalid`]
/// for documents that break an invariant.
pub fn from_json(content: &str) -> Result<Collection, CodecError> {
    let value: Value = serde_json::from_str(content)?;
    check_format_version(&value)?;
    let collection: Collection = serde_json::from_value(value)?;
    collection.validate()?;
    Ok(collection)
}

fn check_format_version(value: &Value) -> Result<FormatVersion, CodecError> {
    let raw = value
        .get(FORMAT_VERSION_KEY)
        .ok_or(CodecError::MissingFormatVersion)?;
    let Some(s) = raw.as_str() else {
        return Err(CodecError::UnsupportedFormatVersion(raw.to_string()));
    };
    FormatVersion::from_wire(s).ok_or_else(|| CodecError::UnsupportedFormatVersion(s.to_string()))
}

impl Collection {
    /// Read and decode a collection file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded; see
    /// [`from_json`].
    pub async fn load(path: &Path) -> Result<Self, CodecError> {
        let content = tokio::fs::read_to_string(path).await?;
        from_json(&content)
    }

    /// Atomically write this collection to `path`.
    ///
    /// The document is written to a sibling temporary file and renamed into
    /// place, so readers never observe a partial document.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding, writing or the rename fails.
    pub async fn save(&self, path: &Path) -> Result<(), CodecError> {
        let content = to_json(self)?;

        let temp_path = path.with_extension("json.tmp");
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&temp_path, &content).await?;
        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{
        Author, License, Package, Platform, PlatformVersion, Product, Target, Version,
    };
    use crate::product::{LibraryType, ProductType};
    use chrono::{TimeZone, Utc};

    fn sample() -> Collection {
        Collection {
            name: "Test Package Collection".into(),
            overview: Some("A few test packages".into()),
            keywords: Some(vec!["swift packages".into()]),
            packages: vec![Package {
                url: "https://package-collection-tests.com/repos/TestRepoTwo.git".into(),
                summary: Some("Package Foo & Bar".into()),
                keywords: None,
                versions: vec![
                    Version {
                        version: "0.2.0".into(),
                        package_name: "TestPackageTwo".into(),
                        targets: vec![
                            Target::new("Bar", Some("Bar".into())),
                            Target::new("Foo", Some("Foo".into())),
                        ],
                        products: vec![
                            Product::new(
                                "Bar",
                                ProductType::Library(LibraryType::Automatic),
                                vec!["Bar".into()],
                            ),
                            Product::new("foo-cli", ProductType::Executable, vec!["Foo".into()]),
                        ],
                        tools_version: "5.2.0".into(),
                        minimum_platform_versions: Some(vec![PlatformVersion::new(
                            "macos", "10.15",
                        )]),
                        verified_platforms: Some(vec![Platform::new("linux")]),
                        verified_swift_versions: Some(vec!["5.3".into()]),
                        license: Some(License {
                            name: "Apache-2.0".into(),
                            url: "https://www.apache.org/licenses/LICENSE-2.0.txt".into(),
                        }),
                    },
                    Version {
                        version: "0.1.0".into(),
                        package_name: "TestPackageTwo".into(),
                        targets: vec![Target::new("Bar", None)],
                        products: vec![Product::new(
                            "Bar",
                            ProductType::Library(LibraryType::Dynamic),
                            vec!["Bar".into()],
                        )],
                        tools_version: "5.2.0".into(),
                        minimum_platform_versions: None,
                        verified_platforms: None,
                        verified_swift_versions: None,
                        license: None,
                    },
                ],
                readme_url: Some("https://example.com/README.md".into()),
            }],
            format_version: FormatVersion::V1_0,
            revision: Some(3),
            generated_at: Utc.with_ymd_and_hms(2020, 10, 22, 6, 3, 52).unwrap(),
            generated_by: Some(Author {
                name: "Jane Doe".into(),
            }),
        }
    }

    #[test]
    fn round_trip_preserves_every_field_and_order() {
        let original = sample();
        let decoded = from_json(&to_json(&original).unwrap()).unwrap();
        assert_eq!(decoded, original);
        let versions: Vec<_> = decoded.packages[0]
            .versions
            .iter()
            .map(|v| v.version.as_str())
            .collect();
        assert_eq!(versions, ["0.2.0", "0.1.0"]);
    }

    #[test]
    fn output_is_deterministic_with_sorted_keys() {
        let a = to_json(&sample()).unwrap();
        let b = to_json(&sample()).unwrap();
        assert_eq!(a, b);

        let name = a.find("\"name\"").unwrap();
        let format = a.find("\"formatVersion\"").unwrap();
        let generated = a.find("\"generatedAt\"").unwrap();
        assert!(format < generated && generated < name);
        assert!(a.contains("\"generatedAt\": \"2020-10-22T06:03:52Z\""));
    }

    #[test]
    fn absent_optionals_are_not_emitted_as_null() {
        let mut doc = sample();
        doc.overview = None;
        doc.revision = None;
        let json = to_json(&doc).unwrap();
        assert!(!json.contains("\"overview\""));
        assert!(!json.contains("\"revision\""));
        // the one explicit null the schema requires
        assert!(json.contains("\"executable\": null"));
    }

    #[test]
    fn unknown_format_version_is_rejected() {
        let json = to_json(&sample()).unwrap().replace("\"1.0\"", "\"2.0\"");
        match from_json(&json) {
            Err(CodecError::UnsupportedFormatVersion(v)) => assert_eq!(v, "2.0"),
            other => panic!("expected schema-version error, got {other:?}"),
        }
    }

    #[test]
    fn missing_format_version_is_rejected() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value.as_object_mut().unwrap().remove("formatVersion");
        let err = from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, CodecError::MissingFormatVersion));
    }

    #[test]
    fn writer_refuses_invalid_documents() {
        let mut doc = sample();
        doc.packages.clear();
        assert!(matches!(to_json(&doc), Err(CodecError::Invalid(_))));
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("collection.json");
        let doc = sample();
        doc.save(&path).await.unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(Collection::load(&path).await.unwrap(), doc);
    }
}
