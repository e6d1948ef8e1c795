//! The generate command: input descriptor in, collection file out.

use anyhow::{Context, Result};
use pcg_core::{GenerateError, Generator, GeneratorOptions, GitInspector};
use pcg_schema::InputDescriptor;
use tempfile::TempDir;

use crate::Cli;
use crate::ui::ConsoleReporter;

/// Run a full generation as described by `cli`.
///
/// # Errors
///
/// Returns an error for any fatal generation error; nothing is written to
/// the output path in that case.
pub async fn generate(cli: &Cli) -> Result<()> {
    let input = InputDescriptor::load(&cli.input_path)
        .await
        .map_err(GenerateError::from)
        .with_context(|| format!("Failed to read input {}", cli.input_path.display()))?;

    // Lives until the end of the run; dropping it removes the checkouts.
    let scratch = if cli.working_directory_path.is_none() {
        Some(TempDir::new().context("Failed to create a temporary working directory")?)
    } else {
        None
    };
    let working_dir = cli
        .working_directory_path
        .as_deref()
        .or_else(|| scratch.as_ref().map(TempDir::path))
        .context("No working directory available")?
        .to_path_buf();
    tracing::debug!("using working directory {}", working_dir.display());

    let inspector = GitInspector::new(&working_dir)?;
    let options = GeneratorOptions::default()
        .with_revision(cli.revision)
        .with_jobs(cli.jobs);
    let reporter = ConsoleReporter::new(cli.verbose);
    let generator = Generator::new(inspector, options).with_reporter(reporter);

    let report = generator.generate(&input).await?;

    if !report.warnings.is_empty() {
        eprintln!("{} package(s) or version(s) skipped", report.warnings.len());
    }
    if cli.verbose {
        println!("{}", report.collection);
    }

    report
        .collection
        .save(&cli.output_path)
        .await
        .map_err(GenerateError::from)
        .with_context(|| format!("Failed to write {}", cli.output_path.display()))?;

    println!("Package collection saved to {}", cli.output_path.display());
    Ok(())
}
