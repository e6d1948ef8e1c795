//! Choosing which tags of a package end up in the collection.

use std::collections::BTreeMap;

use semver::Version;

use crate::error::GenerateError;

/// Parse a version tag, accepting an optional leading `v`.
///
/// ```
/// use pcg_core::selection::parse_tag;
///
/// assert_eq!(parse_tag("v1.2.3").unwrap().to_string(), "1.2.3");
/// assert!(parse_tag("release-1").is_none());
/// ```
pub fn parse_tag(tag: &str) -> Option<Version> {
    pcg_schema::parse_semver(tag)
}

/// Default policy: the latest release of every major line, newest first.
///
/// Unparseable tags and pre-releases are ignored. When two tags name the same
/// version (`1.0.0` and `v1.0.0`) the one listed first is kept.
pub fn latest_per_major(tags: &[String]) -> Vec<String> {
    let mut best: BTreeMap<u64, (Version, &String)> = BTreeMap::new();

    for tag in tags {
        let Some(version) = parse_tag(tag) else {
            tracing::debug!("ignoring non-semver tag {tag}");
            continue;
        };
        if !version.pre.is_empty() {
            continue;
        }
        let newer = best
            .get(&version.major)
            .is_none_or(|(current, _)| version > *current);
        if newer {
            best.insert(version.major, (version, tag));
        }
    }

    best.into_values().rev().map(|(_, tag)| tag.clone()).collect()
}

/// Explicitly requested tags, in the requested order.
///
/// # Errors
///
/// Returns [`GenerateError::VersionNotFound`] for the first requested tag the
/// package does not have.
pub fn resolve_explicit(
    url: &str,
    requested: &[String],
    available: &[String],
) -> Result<Vec<String>, GenerateError> {
    requested
        .iter()
        .map(|tag| {
            if available.contains(tag) {
                Ok(tag.clone())
            } else {
                Err(GenerateError::VersionNotFound {
                    url: url.to_string(),
                    version: tag.clone(),
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn picks_latest_of_each_major_newest_first() {
        let selected = latest_per_major(&tags(&["0.1.0", "0.2.0", "1.0.0"]));
        assert_eq!(selected, ["1.0.0", "0.2.0"]);
    }

    #[test]
    fn ignores_noise_and_prereleases() {
        let selected = latest_per_major(&tags(&[
            "v2.0.0-beta.1",
            "1.4.0",
            "nightly",
            "1.10.0",
            "v1.9.3",
            "3.0.0-rc.1",
        ]));
        assert_eq!(selected, ["1.10.0"]);
    }

    #[test]
    fn first_tag_wins_on_ties() {
        assert_eq!(latest_per_major(&tags(&["v1.0.0", "1.0.0"])), ["v1.0.0"]);
        assert_eq!(latest_per_major(&tags(&["1.0.0", "v1.0.0"])), ["1.0.0"]);
    }

    #[test]
    fn nothing_to_select() {
        assert!(latest_per_major(&[]).is_empty());
        assert!(latest_per_major(&tags(&["main", "1.0"])).is_empty());
    }

    #[test]
    fn explicit_versions_keep_requested_order() {
        let available = tags(&["0.1.0", "0.2.0"]);
        let selected =
            resolve_explicit("u", &tags(&["0.2.0", "0.1.0"]), &available).unwrap();
        assert_eq!(selected, ["0.2.0", "0.1.0"]);

        let err = resolve_explicit("u", &tags(&["0.1.0", "0.3.0"]), &available).unwrap_err();
        assert!(
            matches!(err, GenerateError::VersionNotFound { ref version, .. } if version == "0.3.0")
        );
    }
}
