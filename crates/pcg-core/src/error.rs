//! Error taxonomy for collection generation.
//!
//! Fatal errors abort the run before anything is written. Everything else is
//! recorded as a [`Warning`] next to the generated collection.

use pcg_schema::{CodecError, InputError};
use thiserror::Error;

/// Failures reported by a [`PackageInspector`](crate::inspector::PackageInspector).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InspectError {
    /// The package location cannot be resolved at all.
    #[error("package {url} is unreachable: {reason}")]
    UnreachablePackage {
        /// Package location.
        url: String,
        /// Underlying cause.
        reason: String,
    },

    /// The manifest at this version is missing or cannot be parsed.
    #[error("manifest of {url} at {version} is unreadable: {reason}")]
    ManifestUnreadable {
        /// Package location.
        url: String,
        /// Requested tag.
        version: String,
        /// Underlying cause.
        reason: String,
    },

    /// The tag disappeared between listing and inspection.
    #[error("version {version} of {url} is no longer available")]
    VersionUnavailable {
        /// Package location.
        url: String,
        /// Requested tag.
        version: String,
    },
}

/// Errors raised while generating a collection.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// The input descriptor failed validation.
    #[error("malformed input at {field}: {message}")]
    MalformedInput {
        /// Path of the offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// A package location could not be resolved.
    #[error(transparent)]
    Inspect(#[from] InspectError),

    /// A version was requested (or selected) that the package does not have.
    #[error("version {version} not found for {url}")]
    VersionNotFound {
        /// Package location.
        url: String,
        /// Missing tag.
        version: String,
    },

    /// No package survived generation.
    #[error("no packages left to put in the collection")]
    EmptyCatalog,

    /// The collection could not be encoded or written.
    #[error("failed to write collection: {0}")]
    SerializationFailure(#[from] CodecError),
}

impl GenerateError {
    /// Whether this error aborts the whole run.
    ///
    /// Per-package and per-version errors are recorded and skipped instead.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GenerateError::MalformedInput { .. }
                | GenerateError::VersionNotFound { .. }
                | GenerateError::EmptyCatalog
                | GenerateError::SerializationFailure(_)
        )
    }
}

impl From<InputError> for GenerateError {
    fn from(err: InputError) -> Self {
        match err {
            InputError::Malformed { field, message } => Self::MalformedInput { field, message },
            InputError::Io(e) => Self::MalformedInput {
                field: "<input>".to_string(),
                message: e.to_string(),
            },
        }
    }
}

/// A non-fatal problem recorded while generating a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Package the problem belongs to.
    pub url: String,
    /// Version the problem belongs to, if it is version-specific.
    pub version: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl Warning {
    /// A warning about a whole package.
    pub fn package(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            version: None,
            message: message.into(),
        }
    }

    /// A warning about one version of a package.
    pub fn version(
        url: impl Into<String>,
        version: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            version: Some(version.into()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} @ {}: {}", self.url, version, self.message),
            None => write!(f, "{}: {}", self.url, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(GenerateError::EmptyCatalog.is_fatal());
        assert!(
            GenerateError::VersionNotFound {
                url: "u".into(),
                version: "1.0.0".into()
            }
            .is_fatal()
        );
        let skip = GenerateError::from(InspectError::VersionUnavailable {
            url: "u".into(),
            version: "1.0.0".into(),
        });
        assert!(!skip.is_fatal());
    }

    #[test]
    fn malformed_input_keeps_field() {
        let err = GenerateError::from(InputError::Malformed {
            field: "packages[0].url".into(),
            message: "bad".into(),
        });
        assert!(matches!(
            err,
            GenerateError::MalformedInput { ref field, .. } if field == "packages[0].url"
        ));
    }

    #[test]
    fn warning_display() {
        let w = Warning::version("https://example.com/a.git", "1.0.0", "boom");
        assert_eq!(w.to_string(), "https://example.com/a.git @ 1.0.0: boom");
    }
}
