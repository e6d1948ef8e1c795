//! Collection generation: inspect packages, pick versions, assemble the
//! catalog.

pub mod config;
pub mod error;
pub mod filter;
pub mod inspector;
pub mod pipeline;
pub mod repo;
pub mod reporter;
pub mod selection;

pub use config::GeneratorOptions;
pub use error::{GenerateError, InspectError, Warning};
pub use inspector::{GitInspector, MemoryInspector, PackageInspector, VersionManifest};
pub use pipeline::{GenerationReport, Generator};
pub use reporter::{NullReporter, Reporter};

