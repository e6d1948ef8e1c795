//! The user-authored request describing what a collection should contain.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collection::Author;
use crate::validate::SchemaError;

/// Errors that can occur while loading an [`InputDescriptor`].
#[derive(Error, Debug)]
pub enum InputError {
    /// The input file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The payload is not a valid descriptor.
    #[error("malformed input at {field}: {message}")]
    Malformed {
        /// Path of the offending field, or `<root>` when unknown.
        field: String,
        /// What was wrong with it.
        message: String,
    },
}

impl From<SchemaError> for InputError {
    fn from(err: SchemaError) -> Self {
        Self::Malformed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// Which packages and versions to put in a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    /// Display name of the collection.
    #[serde(alias = "name")]
    pub title: String,

    /// Description of the collection.
    #[serde(alias = "description", default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,

    /// Keywords the collection is associated with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    /// Packages to process, in output order.
    pub packages: Vec<InputPackage>,

    /// Author recorded as `generatedBy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

/// One package to include in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputPackage {
    /// Repository location.
    pub url: String,

    /// What the package does; becomes the package summary.
    #[serde(alias = "summary", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Keywords the package is associated with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    /// Exact tags to include, in output order. `None` selects automatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<String>>,

    /// Product names to leave out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_products: Option<Vec<String>>,

    /// Target names to leave out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_targets: Option<Vec<String>>,

    /// README location, overriding whatever the inspector derives.
    #[serde(
        rename = "readmeURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub readme_url: Option<String>,
}

impl InputPackage {
    /// A package entry with only a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
            keywords: None,
            versions: None,
            excluded_products: None,
            excluded_targets: None,
            readme_url: None,
        }
    }
}

impl InputDescriptor {
    /// Decode and validate a JSON descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Malformed`] naming the offending field.
    pub fn from_json(content: &str) -> Result<Self, InputError> {
        let input: Self = serde_json::from_str(content).map_err(|e| InputError::Malformed {
            field: field_from_message(&e.to_string()),
            message: e.to_string(),
        })?;
        input.validate()?;
        Ok(input)
    }

    /// Decode and validate a TOML descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Malformed`] naming the offending field.
    pub fn from_toml(content: &str) -> Result<Self, InputError> {
        let input: Self = toml::from_str(content).map_err(|e| InputError::Malformed {
            field: field_from_message(e.message()),
            message: e.message().to_string(),
        })?;
        input.validate()?;
        Ok(input)
    }

    /// Read a descriptor from disk. Files ending in `.toml` are parsed as
    /// TOML, everything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Io`] if the file cannot be read and
    /// [`InputError::Malformed`] if it does not describe a valid input.
    pub async fn load(path: &Path) -> Result<Self, InputError> {
        let content = tokio::fs::read_to_string(path).await?;
        if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml(&content)
        } else {
            Self::from_json(&content)
        }
    }
}

/// Pull the field name out of a serde message such as
/// "missing field `url` at line 3 column 5".
fn field_from_message(message: &str) -> String {
    message
        .split('`')
        .nth(1)
        .filter(|_| message.contains("field"))
        .map_or_else(|| "<root>".to_string(), str::to_string)
}
