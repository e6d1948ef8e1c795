//! Console output for generation progress.

use pcg_core::Reporter;

/// Prints progress as terse, indented lines.
///
/// Warnings go to stderr so stdout stays limited to progress and the final
/// result.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a reporter; `verbose` also lists every added version.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, title: &str) {
        println!("{title}...");
    }

    fn package(&self, url: &str) {
        println!("  {url}");
    }

    fn version(&self, url: &str, version: &str) {
        if self.verbose {
            println!("    {url} @ {version}");
        }
    }

    fn warning(&self, msg: &str) {
        eprintln!("  warning: {msg}");
    }

    fn info(&self, msg: &str) {
        println!("  {msg}");
    }
}
