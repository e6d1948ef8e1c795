//! Collection generation: input descriptor in, collection out.
//!
//! Packages are handled concurrently up to [`GeneratorOptions::jobs`] but
//! their results are consumed in input order, so the document never depends
//! on which inspector call finished first. Versions of a single package are
//! inspected one after another.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use pcg_schema::{
    CodecError, Collection, FormatVersion, InputDescriptor, InputError, InputPackage, Package,
    Version, timestamp,
};

use crate::config::GeneratorOptions;
use crate::error::{GenerateError, InspectError, Warning};
use crate::filter::apply_exclusions;
use crate::inspector::{PackageInspector, VersionManifest};
use crate::reporter::{NullReporter, Reporter};
use crate::selection::{latest_per_major, resolve_explicit};

/// A generated collection plus everything that was skipped on the way.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// The assembled collection.
    pub collection: Collection,
    /// Packages and versions that were left out, in input order.
    pub warnings: Vec<Warning>,
}

/// Result of processing one input package.
struct PackageOutcome {
    package: Option<Package>,
    warnings: Vec<Warning>,
}

impl PackageOutcome {
    fn skipped(warning: Warning) -> Self {
        Self {
            package: None,
            warnings: vec![warning],
        }
    }
}

/// Builds collections from input descriptors using a [`PackageInspector`].
pub struct Generator<I> {
    inspector: I,
    options: GeneratorOptions,
    reporter: Arc<dyn Reporter>,
}

impl<I> std::fmt::Debug for Generator<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<I: PackageInspector> Generator<I> {
    /// Create a generator that reports nothing.
    pub fn new(inspector: I, options: GeneratorOptions) -> Self {
        Self {
            inspector,
            options,
            reporter: Arc::new(NullReporter),
        }
    }

    /// Send progress to `reporter`.
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// Generate a collection for `input`.
    ///
    /// Unreachable packages and versions that cannot be inspected are
    /// skipped and returned as warnings.
    ///
    /// # Errors
    ///
    /// - [`GenerateError::MalformedInput`] if `input` is invalid; no package
    ///   is inspected in that case.
    /// - [`GenerateError::VersionNotFound`] if an explicitly requested version
    ///   does not exist.
    /// - [`GenerateError::EmptyCatalog`] if no package survives.
    /// - [`GenerateError::SerializationFailure`] if the assembled collection
    ///   breaks a schema invariant.
    pub async fn generate(
        &self,
        input: &InputDescriptor,
    ) -> Result<GenerationReport, GenerateError> {
        input.validate().map_err(InputError::from)?;

        tracing::info!(
            "generating collection {:?} from {} packages",
            input.title,
            input.packages.len()
        );
        self.reporter.section("Processing packages");

        let mut outcomes = stream::iter(&input.packages)
            .map(|package| self.process_package(package))
            .buffered(self.options.effective_jobs());

        let mut packages = Vec::with_capacity(input.packages.len());
        let mut warnings = Vec::new();
        while let Some(outcome) = outcomes.next().await {
            let outcome = outcome?;
            warnings.extend(outcome.warnings);
            packages.extend(outcome.package);
        }

        if packages.is_empty() {
            return Err(GenerateError::EmptyCatalog);
        }

        let collection = Collection {
            name: input.title.clone(),
            overview: input.overview.clone(),
            keywords: input.keywords.clone(),
            packages,
            format_version: FormatVersion::V1_0,
            revision: self.options.revision,
            generated_at: timestamp::now(),
            generated_by: input.author.clone(),
        };
        collection.validate().map_err(CodecError::from)?;
        tracing::info!(
            "generated {} packages with {} warnings",
            collection.packages.len(),
            warnings.len()
        );
        self.reporter.info(&format!(
            "{} of {} packages included",
            collection.packages.len(),
            input.packages.len()
        ));
        Ok(GenerationReport {
            collection,
            warnings,
        })
    }

    async fn process_package(
        &self,
        input: &InputPackage,
    ) -> Result<PackageOutcome, GenerateError> {
        let url = input.url.as_str();
        self.reporter.package(url);

        tracing::debug!("listing versions of {url}");
        let tags = match self.inspector.list_versions(url).await {
            Ok(tags) => tags,
            Err(e) => {
                let warning = self.warn(Warning::package(url, e.to_string()));
                return Ok(PackageOutcome::skipped(warning));
            }
        };

        let selected = match &input.versions {
            Some(requested) => resolve_explicit(url, requested, &tags)?,
            None => latest_per_major(&tags),
        };
        if selected.is_empty() {
            return Ok(PackageOutcome::skipped(
                self.warn(Warning::package(url, "no release versions found")),
            ));
        }

        let mut versions = Vec::with_capacity(selected.len());
        let mut warnings = Vec::new();
        for tag in &selected {
            tracing::debug!("inspecting {url} at {tag}");
            let record = self
                .inspector
                .inspect(url, tag)
                .await
                .and_then(|manifest| version_record(input, tag, manifest));
            match record {
                Ok(version) => {
                    versions.push(version);
                    self.reporter.version(url, tag);
                }
                Err(e) => warnings.push(self.warn(version_warning(url, tag, &e))),
            }
        }

        if versions.is_empty() {
            warnings.push(self.warn(Warning::package(
                url,
                "no version could be inspected; package left out",
            )));
            return Ok(PackageOutcome {
                package: None,
                warnings,
            });
        }

        let readme_url = match &input.readme_url {
            Some(readme) => Some(readme.clone()),
            None => self.inspector.readme_url(url).await,
        };

        Ok(PackageOutcome {
            package: Some(Package {
                url: input.url.clone(),
                summary: input.description.clone(),
                keywords: input.keywords.clone(),
                versions,
                readme_url,
            }),
            warnings,
        })
    }

    fn warn(&self, warning: Warning) -> Warning {
        tracing::warn!("{warning}");
        self.reporter.warning(&warning.to_string());
        warning
    }
}

fn version_warning(url: &str, tag: &str, err: &InspectError) -> Warning {
    Warning::version(url, tag, err.to_string())
}

/// Assemble and check the record for one inspected tag.
fn version_record(
    input: &InputPackage,
    tag: &str,
    manifest: VersionManifest,
) -> Result<Version, InspectError> {
    let (targets, products) = apply_exclusions(
        manifest.targets,
        manifest.products,
        input.excluded_products.as_deref().unwrap_or_default(),
        input.excluded_targets.as_deref().unwrap_or_default(),
    );
    let version = Version {
        version: tag.to_string(),
        package_name: manifest.package_name,
        targets,
        products,
        tools_version: manifest.tools_version,
        minimum_platform_versions: manifest.minimum_platform_versions,
        verified_platforms: manifest.verified_platforms,
        verified_swift_versions: manifest.verified_swift_versions,
        license: manifest.license,
    };
    version
        .validate("version")
        .map_err(|e| InspectError::ManifestUnreadable {
            url: input.url.clone(),
            version: tag.to_string(),
            reason: e.to_string(),
        })?;
    Ok(version)
}
