//! package-collection-generate
//!
//! Reads an input descriptor naming packages, inspects each package through
//! a git checkout cache and writes the resulting package collection.
//!
//! ```text
//! package-collection-generate input.json collection.json \
//!     --working-directory-path ./checkouts --revision 3
//! ```

pub mod generate;
pub mod ui;

use std::path::PathBuf;

use clap::Parser;
use pcg_core::config::DEFAULT_JOBS;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "package-collection-generate")]
#[command(
    version = env!("PCG_VERSION"),
    about = "Generate a package collection from an input descriptor"
)]
pub struct Cli {
    /// Input descriptor (JSON, or TOML with a .toml extension)
    pub input_path: PathBuf,

    /// Where to write the package collection
    pub output_path: PathBuf,

    /// Directory for package checkouts; a temporary directory is used when omitted
    #[arg(long, env = "PCG_WORKING_DIRECTORY")]
    pub working_directory_path: Option<PathBuf>,

    /// Revision number stamped on the collection
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub revision: Option<u32>,

    /// Number of packages inspected concurrently
    #[arg(short, long, env = "PCG_JOBS", default_value_t = DEFAULT_JOBS)]
    pub jobs: usize,

    /// Show debug logging and print the generated collection
    #[arg(short, long)]
    pub verbose: bool,
}
