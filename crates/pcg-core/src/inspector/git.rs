use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Mutex;

use super::dump::{parse_dump, tools_version_from_manifest};
use super::{PackageInspector, VersionManifest};
use crate::error::InspectError;
use crate::repo::{GitHubRepo, checkout_dir, same_location};

/// Upper bound for a single `git` or `swift` invocation.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

const MANIFEST_FILE: &str = "Package.swift";
const README_FILES: &[&str] = &["README.md", "README.markdown", "README"];

/// Inspects packages through git checkouts kept in a working directory.
///
/// A package URL maps to `<working_dir>/<host>/<path>` (see
/// [`checkout_dir`]). Existing checkouts whose `origin` matches the URL are
/// reused, so pre-populating the working directory avoids cloning. Version
/// checkouts on the same working tree are serialised.
#[derive(Debug)]
pub struct GitInspector {
    working_dir: PathBuf,
    git: PathBuf,
    swift: Option<PathBuf>,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
    prepared: Mutex<HashSet<PathBuf>>,
}

#[derive(Debug)]
struct CommandFailure(String);

impl GitInspector {
    /// Create an inspector rooted at `working_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if no `git` executable is on `PATH`.
    pub fn new(working_dir: impl Into<PathBuf>) -> Result<Self> {
        let git = which::which("git").context("git executable not found on PATH")?;
        let swift = which::which("swift").ok();
        if swift.is_none() {
            tracing::warn!("swift executable not found; manifests cannot be read");
        }
        Ok(Self {
            working_dir: working_dir.into(),
            git,
            swift,
            locks: Mutex::new(HashMap::new()),
            prepared: Mutex::new(HashSet::new()),
        })
    }

    /// Where the checkout for `url` lives, or `None` if the URL does not map
    /// to a directory inside the working directory.
    pub fn checkout_path(&self, url: &str) -> Option<PathBuf> {
        checkout_dir(url).map(|dir| self.working_dir.join(dir))
    }

    fn checkout_for(&self, url: &str) -> Result<PathBuf, InspectError> {
        self.checkout_path(url)
            .ok_or_else(|| InspectError::UnreachablePackage {
                url: url.to_string(),
                reason: "URL does not name a repository path".to_string(),
            })
    }

    async fn lock_for(&self, dir: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(dir.to_path_buf()).or_default().clone()
    }

    async fn run(
        &self,
        program: &Path,
        dir: Option<&Path>,
        args: &[&str],
    ) -> Result<String, CommandFailure> {
        let mut cmd = Command::new(program);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true);

        tracing::debug!("running {} {}", program.display(), args.join(" "));
        let output = tokio::time::timeout(COMMAND_TIMEOUT, cmd.output())
            .await
            .map_err(|_| {
                CommandFailure(format!("timed out after {}s", COMMAND_TIMEOUT.as_secs()))
            })?
            .map_err(|e| CommandFailure(e.to_string()))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(CommandFailure(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )))
        }
    }

    /// Clone or refresh the checkout once per run. Caller holds the checkout lock.
    async fn prepare(&self, url: &str, dir: &Path) -> Result<(), InspectError> {
        if self.prepared.lock().await.contains(dir) {
            return Ok(());
        }

        let unreachable = |reason: String| InspectError::UnreachablePackage {
            url: url.to_string(),
            reason,
        };

        if dir.join(".git").exists() {
            let origin = self
                .run(&self.git, Some(dir), &["remote", "get-url", "origin"])
                .await
                .map_err(|CommandFailure(reason)| unreachable(reason))?;
            if !same_location(&origin, url) {
                return Err(unreachable(format!(
                    "checkout {} belongs to {}",
                    dir.display(),
                    origin.trim()
                )));
            }
            if let Err(CommandFailure(reason)) =
                self.run(&self.git, Some(dir), &["fetch", "--tags", "--quiet"]).await
            {
                tracing::warn!("could not refresh {url}, using existing checkout: {reason}");
            }
        } else {
            let parent = dir.parent().unwrap_or(self.working_dir.as_path());
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| unreachable(e.to_string()))?;
            let target = dir.to_string_lossy().into_owned();
            self.run(&self.git, None, &["clone", "--quiet", url, target.as_str()])
                .await
                .map_err(|CommandFailure(reason)| unreachable(reason))?;
        }

        self.prepared.lock().await.insert(dir.to_path_buf());
        Ok(())
    }

    async fn read_manifest(
        &self,
        url: &str,
        tag: &str,
        dir: &Path,
    ) -> Result<VersionManifest, InspectError> {
        let unreadable = |reason: String| InspectError::ManifestUnreadable {
            url: url.to_string(),
            version: tag.to_string(),
            reason,
        };

        let source = tokio::fs::read_to_string(dir.join(MANIFEST_FILE))
            .await
            .map_err(|e| unreadable(format!("{MANIFEST_FILE}: {e}")))?;
        let hint = tools_version_from_manifest(&source);

        let swift = self
            .swift
            .as_deref()
            .ok_or_else(|| unreadable("swift executable not found".to_string()))?;
        let dir_arg = dir.to_string_lossy().into_owned();
        let args = ["package", "--package-path", dir_arg.as_str(), "dump-package"];
        let json = self
            .run(swift, Some(dir), &args)
            .await
            .map_err(|CommandFailure(reason)| unreadable(reason))?;

        parse_dump(&json, hint.as_deref()).map_err(unreadable)
    }
}

#[async_trait]
impl PackageInspector for GitInspector {
    async fn list_versions(&self, url: &str) -> Result<Vec<String>, InspectError> {
        let dir = self.checkout_for(url)?;
        let lock = self.lock_for(&dir).await;
        let _guard = lock.lock().await;

        self.prepare(url, &dir).await?;
        let out = self
            .run(&self.git, Some(dir.as_path()), &["tag", "--list"])
            .await
            .map_err(|CommandFailure(reason)| InspectError::UnreachablePackage {
                url: url.to_string(),
                reason,
            })?;

        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn inspect(&self, url: &str, tag: &str) -> Result<VersionManifest, InspectError> {
        let dir = self.checkout_for(url)?;
        let lock = self.lock_for(&dir).await;
        let _guard = lock.lock().await;

        self.prepare(url, &dir).await?;

        let tag_ref = format!("refs/tags/{tag}^{{commit}}");
        let unavailable = || InspectError::VersionUnavailable {
            url: url.to_string(),
            version: tag.to_string(),
        };
        self.run(
            &self.git,
            Some(dir.as_path()),
            &["rev-parse", "--verify", "--quiet", tag_ref.as_str()],
        )
        .await
        .map_err(|_| unavailable())?;

        let tag_name = format!("refs/tags/{tag}");
        self.run(
            &self.git,
            Some(dir.as_path()),
            &["checkout", "--quiet", "--force", "--detach", tag_name.as_str()],
        )
        .await
        .map_err(|CommandFailure(reason)| InspectError::ManifestUnreadable {
            url: url.to_string(),
            version: tag.to_string(),
            reason: format!("checkout failed: {reason}"),
        })?;

        self.read_manifest(url, tag, &dir).await
    }

    async fn readme_url(&self, url: &str) -> Option<String> {
        let repo = GitHubRepo::from_url(url)?;
        let dir = self.checkout_path(url)?;
        README_FILES
            .iter()
            .find(|name| dir.join(name).is_file())
            .map(|name| repo.raw_url(name))
    }
}

#[cfg(test)]
mod tests {
    use std::process::Command as StdCommand;

    use super::*;

    /// Run git with a fixed identity so fixtures build on any machine.
    fn git(dir: &Path, args: &[&str]) {
        let status = StdCommand::new("git")
            .current_dir(dir)
            .args(["-c", "user.name=Tests", "-c", "user.email=tests@example.com"])
            .args(["-c", "commit.gpgsign=false", "-c", "tag.gpgsign=false"])
            .args(args)
            .status()
            .expect("git must be installed to run these tests");
        assert!(status.success(), "git {args:?} failed in {}", dir.display());
    }

    /// A repository under `root/path` with one commit and tag per entry.
    fn fixture_repo(root: &Path, path: &str, tags: &[&str]) -> String {
        let dir = root.join(path);
        std::fs::create_dir_all(&dir).unwrap();
        git(&dir, &["init", "--quiet"]);
        for tag in tags {
            std::fs::write(
                dir.join(MANIFEST_FILE),
                format!("// swift-tools-version:5.2\n// release {tag}\n"),
            )
            .unwrap();
            git(&dir, &["add", "."]);
            git(&dir, &["commit", "--quiet", "-m", tag]);
            git(&dir, &["tag", tag]);
        }
        format!("file://{}", dir.display())
    }

    #[test]
    fn checkout_path_keeps_the_whole_location() {
        let inspector = GitInspector::new("/tmp/pcg-work").unwrap();
        assert_eq!(
            inspector.checkout_path("https://example.com/repos/TestRepoOne.git"),
            Some(PathBuf::from("/tmp/pcg-work/example.com/repos/TestRepoOne"))
        );
        assert_eq!(inspector.checkout_path("https://example.com/.."), None);
    }

    #[tokio::test]
    async fn lists_tags_of_a_cloned_repository() {
        let repos = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let url = fixture_repo(repos.path(), "team/pkg", &["0.1.0", "0.2.0", "1.0.0"]);
        let inspector = GitInspector::new(work.path()).unwrap();

        let mut tags = inspector.list_versions(&url).await.unwrap();
        tags.sort();
        assert_eq!(tags, ["0.1.0", "0.2.0", "1.0.0"]);
        assert!(inspector.checkout_path(&url).unwrap().join(".git").is_dir());
    }

    #[tokio::test]
    async fn repositories_sharing_a_name_stay_apart() {
        let repos = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let alice = fixture_repo(repos.path(), "alice/utils", &["1.0.0"]);
        let bob = fixture_repo(repos.path(), "bob/utils", &["7.0.0"]);
        let inspector = GitInspector::new(work.path()).unwrap();

        assert_eq!(inspector.list_versions(&alice).await.unwrap(), ["1.0.0"]);
        assert_eq!(inspector.list_versions(&bob).await.unwrap(), ["7.0.0"]);
    }

    #[tokio::test]
    async fn unknown_tag_is_unavailable() {
        let repos = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let url = fixture_repo(repos.path(), "team/pkg", &["1.0.0"]);
        let inspector = GitInspector::new(work.path()).unwrap();

        let err = inspector.inspect(&url, "9.9.9").await.unwrap_err();
        assert_eq!(
            err,
            InspectError::VersionUnavailable {
                url: url.clone(),
                version: "9.9.9".into(),
            }
        );
    }

    #[tokio::test]
    async fn manifest_that_cannot_be_dumped_is_unreadable() {
        let repos = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let url = fixture_repo(repos.path(), "team/pkg", &["1.0.0"]);
        let inspector = GitInspector::new(work.path()).unwrap();

        // The fixture manifest declares no package, so this fails with or
        // without a swift toolchain.
        let err = inspector.inspect(&url, "1.0.0").await.unwrap_err();
        let InspectError::ManifestUnreadable { version, .. } = &err else {
            panic!("expected an unreadable manifest, got {err:?}");
        };
        assert_eq!(version, "1.0.0");
    }

    #[tokio::test]
    async fn existing_checkout_is_reused_and_refreshed() {
        let repos = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let url = fixture_repo(repos.path(), "team/pkg", &["1.0.0"]);
        let inspector = GitInspector::new(work.path()).unwrap();

        let checkout = inspector.checkout_path(&url).unwrap();
        std::fs::create_dir_all(checkout.parent().unwrap()).unwrap();
        git(
            work.path(),
            &["clone", "--quiet", url.as_str(), checkout.to_str().unwrap()],
        );
        std::fs::write(checkout.join("marker"), "kept").unwrap();

        let upstream = repos.path().join("team/pkg");
        git(&upstream, &["commit", "--quiet", "--allow-empty", "-m", "2.0.0"]);
        git(&upstream, &["tag", "2.0.0"]);

        let mut tags = inspector.list_versions(&url).await.unwrap();
        tags.sort();
        assert_eq!(tags, ["1.0.0", "2.0.0"]);
        assert!(checkout.join("marker").is_file(), "checkout was cloned again");
    }

    #[tokio::test]
    async fn checkout_of_another_repository_is_not_reused() {
        let repos = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let alice = fixture_repo(repos.path(), "alice/utils", &["1.0.0"]);
        let bob = fixture_repo(repos.path(), "bob/utils", &["7.0.0"]);
        let inspector = GitInspector::new(work.path()).unwrap();

        let checkout = inspector.checkout_path(&bob).unwrap();
        std::fs::create_dir_all(checkout.parent().unwrap()).unwrap();
        git(
            work.path(),
            &["clone", "--quiet", alice.as_str(), checkout.to_str().unwrap()],
        );

        let err = inspector.list_versions(&bob).await.unwrap_err();
        assert!(matches!(err, InspectError::UnreachablePackage { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn readme_url_needs_github_and_a_readme() {
        let dir = tempfile::tempdir().unwrap();
        let inspector = GitInspector::new(dir.path()).unwrap();
        let url = "https://github.com/apple/swift-nio.git";
        assert_eq!(inspector.readme_url(url).await, None);

        let checkout = inspector.checkout_path(url).unwrap();
        std::fs::create_dir_all(&checkout).unwrap();
        std::fs::write(checkout.join("README.md"), "# nio").unwrap();
        assert_eq!(
            inspector.readme_url(url).await.as_deref(),
            Some("https://raw.githubusercontent.com/apple/swift-nio/HEAD/README.md")
        );
        assert_eq!(inspector.readme_url("https://example.com/swift-nio.git").await, None);
    }

    #[tokio::test]
    async fn unreachable_remote_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let inspector = GitInspector::new(dir.path()).unwrap();
        let missing = dir.path().join("does-not-exist.git");
        let url = format!("file://{}", missing.display());
        let err = inspector.list_versions(&url).await.unwrap_err();
        assert!(matches!(err, InspectError::UnreachablePackage { .. }));
    }
}
