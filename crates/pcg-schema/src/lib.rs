//! Shared types and wire format for package collections.
//!
//! A [`Collection`] is the generated, schema-versioned catalog of packages;
//! an [`InputDescriptor`] is the request it is generated from. This crate
//! owns both shapes, their validation, the JSON codec and the diagnostic
//! text rendering. It performs no network access.

pub mod codec;
pub mod collection;
pub mod input;
pub mod product;
pub mod render;
pub mod timestamp;
pub mod validate;

// Re-exports
pub use codec::{CodecError, from_json, to_json};
pub use collection::*;
pub use input::{InputDescriptor, InputError, InputPackage};
pub use product::{LibraryType, ProductType};
pub use render::{Describe, Node, render};
pub use validate::{SchemaError, parse_semver};
