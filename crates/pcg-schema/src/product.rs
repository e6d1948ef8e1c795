//! Product kinds and their single-key wire encoding.
//!
//! ```text
//! {"library": ["automatic"]}
//! {"executable": null}
//! ```

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Linkage of a library product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryType {
    /// Let the consumer choose static or dynamic linkage.
    #[default]
    Automatic,
    /// Always linked statically.
    Static,
    /// Always linked dynamically.
    Dynamic,
}

impl LibraryType {
    /// The wire string for this linkage.
    pub fn as_str(self) -> &'static str {
        match self {
            LibraryType::Automatic => "automatic",
            LibraryType::Static => "static",
            LibraryType::Dynamic => "dynamic",
        }
    }
}

/// Kind of a published product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductType {
    /// A library with the given linkage.
    Library(LibraryType),
    /// An executable.
    Executable,
    /// A build tool plugin.
    Plugin,
    /// A test product.
    Test,
}

const VARIANTS: &[&str] = &["library", "executable", "plugin", "test"];

impl ProductType {
    /// The wire key for this product type.
    pub fn key(self) -> &'static str {
        match self {
            ProductType::Library(_) => "library",
            ProductType::Executable => "executable",
            ProductType::Plugin => "plugin",
            ProductType::Test => "test",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductType::Library(linkage) => write!(f, "library({})", linkage.as_str()),
            other => f.write_str(other.key()),
        }
    }
}

impl Serialize for ProductType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            ProductType::Library(linkage) => map.serialize_entry("library", &[linkage])?,
            other => map.serialize_entry(other.key(), &())?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProductType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ProductTypeVisitor)
    }
}

struct ProductTypeVisitor;

impl<'de> Visitor<'de> for ProductTypeVisitor {
    type Value = ProductType;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a single-key product type object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let key: String = map
            .next_key()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;

        let kind = match key.as_str() {
            "library" => {
                let linkage: Vec<LibraryType> = map.next_value()?;
                match linkage.as_slice() {
                    [only] => ProductType::Library(*only),
                    other => {
                        return Err(de::Error::invalid_length(
                            other.len(),
                            &"exactly one library type",
                        ));
                    }
                }
            }
            "executable" => {
                map.next_value::<IgnoredAny>()?;
                ProductType::Executable
            }
            "plugin" => {
                map.next_value::<IgnoredAny>()?;
                ProductType::Plugin
            }
            "test" => {
                map.next_value::<IgnoredAny>()?;
                ProductType::Test
            }
            other => return Err(de::Error::unknown_variant(other, VARIANTS)),
        };

        if map.next_key::<IgnoredAny>()?.is_some() {
            return Err(de::Error::custom("product type must have exactly one key"));
        }

        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn library_encodes_linkage_array() {
        let value = serde_json::to_value(ProductType::Library(LibraryType::Static)).unwrap();
        assert_eq!(value, json!({ "library": ["static"] }));
    }

    #[test]
    fn executable_encodes_explicit_null() {
        let value = serde_json::to_value(ProductType::Executable).unwrap();
        assert_eq!(value, json!({ "executable": null }));
    }

    #[test]
    fn decodes_every_variant() {
        let cases = [
            (json!({ "library": ["dynamic"] }), ProductType::Library(LibraryType::Dynamic)),
            (json!({ "executable": null }), ProductType::Executable),
            (json!({ "plugin": null }), ProductType::Plugin),
            (json!({ "test": {} }), ProductType::Test),
        ];
        for (input, expected) in cases {
            let decoded: ProductType = serde_json::from_value(input).unwrap();
            assert_eq!(decoded, expected);
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = serde_json::from_value::<ProductType>(json!({ "snippet": null })).unwrap_err();
        assert!(err.to_string().contains("unknown variant"));
    }

    #[test]
    fn library_linkage_must_be_a_single_entry() {
        assert!(serde_json::from_value::<ProductType>(json!({ "library": [] })).is_err());
        let err = serde_json::from_value::<ProductType>(json!({ "library": ["static", "dynamic"] }))
            .unwrap_err();
        assert!(err.to_string().contains("exactly one library type"), "{err}");
    }

    #[test]
    fn display_form() {
        assert_eq!(
            ProductType::Library(LibraryType::Automatic).to_string(),
            "library(automatic)"
        );
        assert_eq!(ProductType::Plugin.to_string(), "plugin");
    }
}
