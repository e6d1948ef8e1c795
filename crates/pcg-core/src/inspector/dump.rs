use pcg_schema::{PlatformVersion, Product, ProductType, Target};
use regex::Regex;
use serde::Deserialize;

use super::VersionManifest;

/// Shape of `swift package dump-package` output, reduced to what a
/// collection needs. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DumpedManifest {
    name: String,
    tools_version: Option<DumpedToolsVersion>,
    #[serde(default)]
    platforms: Vec<DumpedPlatform>,
    #[serde(default)]
    targets: Vec<DumpedTarget>,
    #[serde(default)]
    products: Vec<DumpedProduct>,
}

#[derive(Debug, Deserialize)]
struct DumpedToolsVersion {
    #[serde(rename = "_version")]
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DumpedPlatform {
    platform_name: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct DumpedTarget {
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct DumpedProduct {
    name: String,
    #[serde(default)]
    targets: Vec<String>,
    #[serde(rename = "type")]
    kind: serde_json::Value,
}

/// Turn `dump-package` JSON into a [`VersionManifest`].
///
/// Test targets are left out. `tools_version_hint` is used when the dump
/// has no tools version (older toolchains); see [`tools_version_from_manifest`].
///
/// # Errors
///
/// Returns a description of the problem when the JSON is not a manifest or
/// no tools version can be determined.
pub fn parse_dump(
    json: &str,
    tools_version_hint: Option<&str>,
) -> Result<VersionManifest, String> {
    let dumped: DumpedManifest =
        serde_json::from_str(json).map_err(|e| format!("invalid dump-package output: {e}"))?;

    let tools_version = dumped
        .tools_version
        .map(|t| t.version)
        .or_else(|| tools_version_hint.map(str::to_string))
        .map(|v| normalize_tools_version(&v))
        .ok_or_else(|| "manifest declares no tools version".to_string())?;

    let targets = dumped
        .targets
        .into_iter()
        .filter(|t| t.kind != "test")
        .map(|t| {
            let module = c99_name(&t.name);
            Target::new(t.name, Some(module))
        })
        .collect();

    let products = dumped
        .products
        .into_iter()
        .filter_map(|p| match serde_json::from_value::<ProductType>(p.kind) {
            Ok(kind) => Some(Product::new(p.name, kind, p.targets)),
            Err(e) => {
                tracing::debug!("skipping product {}: {e}", p.name);
                None
            }
        })
        .collect();

    let platforms: Vec<PlatformVersion> = dumped
        .platforms
        .into_iter()
        .map(|p| PlatformVersion::new(p.platform_name, p.version))
        .collect();

    Ok(VersionManifest {
        package_name: dumped.name,
        targets,
        products,
        tools_version,
        minimum_platform_versions: (!platforms.is_empty()).then_some(platforms),
        verified_platforms: None,
        verified_swift_versions: None,
        license: None,
    })
}

/// Read the tools version from the `// swift-tools-version:X.Y` comment on
/// the first line of a manifest.
pub fn tools_version_from_manifest(manifest: &str) -> Option<String> {
    let re = Regex::new(r"^\s*//\s*swift-tools-version\s*:\s*(\d+(?:\.\d+)*)").ok()?;
    let caps = re.captures(manifest.lines().next()?)?;
    Some(normalize_tools_version(&caps[1]))
}

/// Pad a tools version to three components (`5.2` -> `5.2.0`).
fn normalize_tools_version(version: &str) -> String {
    let mut parts: Vec<&str> = version.split('.').filter(|p| !p.is_empty()).collect();
    while parts.len() < 3 {
        parts.push("0");
    }
    parts.join(".")
}

/// The importable module name for a target: every character that is not
/// alphanumeric becomes `_`, and a leading digit is prefixed with `_`.
pub fn c99_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
