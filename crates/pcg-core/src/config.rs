//! Run-level settings for the generator.

/// Default number of packages inspected concurrently.
pub const DEFAULT_JOBS: usize = 4;

/// Options that are not part of the input descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Revision stamped on the collection.
    pub revision: Option<u32>,
    /// How many packages are inspected at the same time. Zero is treated as one.
    pub jobs: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            revision: None,
            jobs: DEFAULT_JOBS,
        }
    }
}

impl GeneratorOptions {
    /// Set the collection revision.
    #[must_use]
    pub fn with_revision(mut self, revision: Option<u32>) -> Self {
        self.revision = revision;
        self
    }

    /// Set the concurrency limit.
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub(crate) fn effective_jobs(&self) -> usize {
        self.jobs.max(1)
    }
}
