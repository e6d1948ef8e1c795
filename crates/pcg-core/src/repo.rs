//! Repository locations: GitHub coordinates and checkout directories.

use std::path::PathBuf;

use regex::Regex;

/// A GitHub repository, as found in a clone URL.
///
/// # Example
///
/// ```
/// use pcg_core::repo::GitHubRepo;
///
/// let repo = GitHubRepo::from_url("git@github.com:apple/swift-nio.git").unwrap();
/// assert_eq!(
///     repo.raw_url("README.md"),
///     "https://raw.githubusercontent.com/apple/swift-nio/HEAD/README.md"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitHubRepo {
    owner: String,
    name: String,
}

impl GitHubRepo {
    /// Extract the repository from a GitHub clone URL, either
    /// `https://github.com/owner/repo(.git)` or `git@github.com:owner/repo(.git)`.
    pub fn from_url(url: &str) -> Option<Self> {
        let re = Regex::new(concat!(
            r"^(?:https?://(?:www\.)?|ssh://git@|git@)github\.com[/:]",
            r"([^/:]+)/([^/]+?)(?:\.git)?/?$",
        ))
        .ok()?;
        let caps = re.captures(url)?;
        Some(Self {
            owner: caps[1].to_string(),
            name: caps[2].to_string(),
        })
    }

    /// Raw location of a file on the default branch.
    pub fn raw_url(&self, file: &str) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/HEAD/{file}",
            self.owner, self.name
        )
    }
}

/// Relative checkout directory for a package URL.
///
/// Every host and path component of the URL becomes a directory level, so
/// two repositories only share a checkout when their locations match. The
/// scheme, any user part and a trailing `.git` are dropped. Returns `None`
/// if the URL has no usable component or contains `.` or `..` segments.
///
/// ```
/// use std::path::PathBuf;
/// use pcg_core::repo::checkout_dir;
///
/// assert_eq!(
///     checkout_dir("https://example.com/repos/TestRepoOne.git"),
///     Some(PathBuf::from("example.com/repos/TestRepoOne"))
/// );
/// assert_eq!(
///     checkout_dir("git@github.com:apple/swift-nio"),
///     Some(PathBuf::from("github.com/apple/swift-nio"))
/// );
/// assert_eq!(checkout_dir("https://example.com/repos/.."), None);
/// ```
pub fn checkout_dir(url: &str) -> Option<PathBuf> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let rest = match rest.split_once('@') {
        Some((user, host)) if !user.contains('/') => host,
        _ => rest,
    };
    let rest = rest.trim_end_matches('/');
    let rest = rest.strip_suffix(".git").unwrap_or(rest);

    let mut dir = PathBuf::new();
    for component in rest.split(['/', ':']).filter(|c| !c.is_empty()) {
        if component == "." || component == ".." {
            return None;
        }
        dir.push(sanitize(component));
    }
    (!dir.as_os_str().is_empty()).then_some(dir)
}

/// Whether two clone URLs name the same location, ignoring surrounding
/// whitespace, trailing slashes and a `.git` suffix.
pub(crate) fn same_location(a: &str, b: &str) -> bool {
    fn key(url: &str) -> &str {
        let url = url.trim().trim_end_matches('/');
        url.strip_suffix(".git").unwrap_or(url)
    }
    key(a) == key(b)
}

fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
