//! Reporter trait for dependency injection
//!
//! Generation reports progress through this trait so the pipeline stays
//! independent of any particular console output.

/// Progress sink for a generation run.
pub trait Reporter: Send + Sync {
    /// A new phase has started (e.g. "Processing packages").
    fn section(&self, title: &str);

    /// Work on a package has started.
    fn package(&self, url: &str);

    /// A version of a package was added to the collection.
    fn version(&self, url: &str, version: &str);

    /// A package or version was skipped.
    fn warning(&self, msg: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn package(&self, url: &str) {
        (**self).package(url);
    }
    fn version(&self, url: &str, version: &str) {
        (**self).version(url, version);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn package(&self, _: &str) {}
    fn version(&self, _: &str, _: &str) {}
    fn warning(&self, _: &str) {}
    fn info(&self, _: &str) {}
}
