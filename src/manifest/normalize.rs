//! Schema reconciliation: collapses every historical manifest shape into the
//! canonical `Manifest`.
//!
//! All "which schema am I looking at" logic lives here. Inconsistencies are
//! returned as warning values rather than short-circuiting so callers can
//! surface every issue at once and decide how strict to be.

use crate::manifest::model::{
    Artifact, Manifest, PlatformId, PlatformKeyed, PlatformMap, RawManifest, ScriptKind,
};
use std::fmt;

/// Canonical manifest plus the inconsistencies found while deriving it.
#[derive(Clone, Debug)]
pub struct Normalized {
    pub manifest: Manifest,
    pub warnings: Vec<SchemaWarning>,
}

/// Non-fatal data-integrity defect found during normalization.
///
/// The unmatched entry is dropped from the canonical form, never silently
/// merged or rendered half-complete.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SchemaWarning {
    /// Platform has a checksum but no download URL.
    UrlMissing {
        package: String,
        platform: PlatformId,
    },
    /// Platform has a download URL but no checksum.
    ChecksumMissing {
        package: String,
        platform: PlatformId,
    },
    /// A script map names a platform absent from the platform set.
    UnknownScriptPlatform {
        package: String,
        kind: ScriptKind,
        platform: PlatformId,
    },
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaWarning::UrlMissing { package, platform } => write!(
                f,
                "package '{package}': platform '{platform}' has a sha256 entry but no url entry; dropped"
            ),
            SchemaWarning::ChecksumMissing { package, platform } => write!(
                f,
                "package '{package}': platform '{platform}' has a url entry but no sha256 entry; dropped"
            ),
            SchemaWarning::UnknownScriptPlatform {
                package,
                kind,
                platform,
            } => write!(
                f,
                "package '{package}': {kind} script targets unknown platform '{platform}'; dropped"
            ),
        }
    }
}

/// Reduce a raw manifest to the canonical platform-keyed form.
///
/// The platform set is the keys of `sha256` (in declared order) intersected
/// with the keys of `url`; a string on either side counts as a one-entry map
/// under the synthetic `default` platform. Scripts resolve per platform:
/// a matching map entry wins, a flat list fans out to every platform, and a
/// map without an entry resolves to an empty script.
pub fn normalize(raw: RawManifest) -> Normalized {
    let mut warnings = Vec::new();
    let universal = raw.sha256.is_flat();

    let sha256 = into_platform_map(raw.sha256);
    let url = into_platform_map(raw.url);

    let mut platforms = PlatformMap::new();
    for (platform, digest) in sha256.iter() {
        match url.get(platform) {
            Some(location) => {
                platforms.insert(
                    platform.clone(),
                    Artifact {
                        url: location.clone(),
                        sha256: digest.clone(),
                    },
                );
            }
            None => warnings.push(SchemaWarning::UrlMissing {
                package: raw.name.clone(),
                platform: platform.clone(),
            }),
        }
    }
    for platform in url.keys() {
        if !sha256.contains_key(platform) {
            warnings.push(SchemaWarning::ChecksumMissing {
                package: raw.name.clone(),
                platform: platform.clone(),
            });
        }
    }

    let install = resolve_scripts(
        raw.scripts.install,
        &platforms,
        &raw.name,
        ScriptKind::Install,
        &mut warnings,
    );
    let latest = resolve_scripts(
        raw.scripts.latest,
        &platforms,
        &raw.name,
        ScriptKind::Latest,
        &mut warnings,
    );
    let completions = resolve_scripts(
        raw.scripts.completions,
        &platforms,
        &raw.name,
        ScriptKind::Completions,
        &mut warnings,
    );

    Normalized {
        manifest: Manifest {
            name: raw.name,
            description: raw.description,
            homepage: raw.homepage,
            version: raw.version,
            platforms,
            install,
            latest,
            completions,
            dependencies: raw.dependencies,
            caveats: raw.caveats,
            universal,
        },
        warnings,
    }
}

fn into_platform_map(field: PlatformKeyed<String>) -> PlatformMap<String> {
    match field {
        PlatformKeyed::Flat(value) => {
            let mut map = PlatformMap::new();
            map.insert(PlatformId::universal(), value);
            map
        }
        PlatformKeyed::PerPlatform(map) => map,
    }
}

fn resolve_scripts(
    field: Option<PlatformKeyed<Vec<String>>>,
    platforms: &PlatformMap<Artifact>,
    package: &str,
    kind: ScriptKind,
    warnings: &mut Vec<SchemaWarning>,
) -> PlatformMap<Vec<String>> {
    let mut resolved = PlatformMap::new();
    match field {
        None => {
            for platform in platforms.keys() {
                resolved.insert(platform.clone(), Vec::new());
            }
        }
        Some(PlatformKeyed::Flat(lines)) => {
            for platform in platforms.keys() {
                resolved.insert(platform.clone(), lines.clone());
            }
        }
        Some(PlatformKeyed::PerPlatform(map)) => {
            for platform in platforms.keys() {
                resolved.insert(
                    platform.clone(),
                    map.get(platform).cloned().unwrap_or_default(),
                );
            }
            for platform in map.keys() {
                if !platforms.contains_key(platform) {
                    warnings.push(SchemaWarning::UnknownScriptPlatform {
                        package: package.to_string(),
                        kind,
                        platform: platform.clone(),
                    });
                }
            }
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawManifest {
        serde_json::from_value(value).expect("fixture manifest must parse")
    }

    #[test]
    fn legacy_manifest_normalizes_to_single_default_platform() {
        let normalized = normalize(raw(json!({
            "name": "tool",
            "description": "a tool",
            "homepage": "https://example.com",
            "version": "1.0.0",
            "sha256": "deadbeef",
            "url": "https://example.com/tool.tar.gz",
            "scripts": {"install": ["make install"]}
        })));

        assert!(normalized.warnings.is_empty());
        let manifest = normalized.manifest;
        assert!(manifest.is_universal());
        assert_eq!(manifest.platforms.len(), 1);
        let default = PlatformId::universal();
        let artifact = manifest.platforms.get(&default).unwrap();
        assert_eq!(artifact.url, "https://example.com/tool.tar.gz");
        assert_eq!(artifact.sha256, "deadbeef");
        assert_eq!(manifest.install.get(&default).unwrap(), &["make install"]);
        assert!(manifest.latest.get(&default).unwrap().is_empty());
    }

    #[test]
    fn flat_scripts_fan_out_to_every_platform() {
        let normalized = normalize(raw(json!({
            "name": "tool",
            "description": "a tool",
            "homepage": "https://example.com",
            "version": "1.0.0",
            "sha256": {"macos": "aa", "linux": "bb"},
            "url": {"macos": "https://x/mac", "linux": "https://x/linux"},
            "scripts": {"latest": ["curl https://x/latest"]}
        })));

        assert!(normalized.warnings.is_empty());
        let manifest = normalized.manifest;
        assert!(!manifest.is_universal());
        let macos = PlatformId("macos".into());
        let linux = PlatformId("linux".into());
        assert_eq!(
            manifest.latest.get(&macos).unwrap(),
            manifest.latest.get(&linux).unwrap()
        );
        assert_eq!(manifest.latest.get(&macos).unwrap(), &["curl https://x/latest"]);
    }

    #[test]
    fn platform_order_follows_sha256_declaration() {
        let normalized = normalize(raw(json!({
            "name": "tool",
            "description": "a tool",
            "homepage": "https://example.com",
            "version": "1.0.0",
            "sha256": {"windows": "cc", "macos": "aa", "linux": "bb"},
            "url": {"linux": "l", "macos": "m", "windows": "w"}
        })));

        let keys: Vec<&str> = normalized
            .manifest
            .platforms
            .keys()
            .map(PlatformId::as_str)
            .collect();
        assert_eq!(keys, ["windows", "macos", "linux"]);
    }

    #[test]
    fn key_set_mismatch_drops_platform_and_warns() {
        let normalized = normalize(raw(json!({
            "name": "tool",
            "description": "a tool",
            "homepage": "https://example.com",
            "version": "1.0.0",
            "sha256": {"macos": "aa", "linux": "bb"},
            "url": {"macos": "https://x/mac", "freebsd": "https://x/bsd"}
        })));

        let manifest = &normalized.manifest;
        assert_eq!(manifest.platforms.len(), 1);
        assert!(manifest.platforms.contains_key(&PlatformId("macos".into())));
        assert_eq!(
            normalized.warnings,
            vec![
                SchemaWarning::UrlMissing {
                    package: "tool".into(),
                    platform: PlatformId("linux".into()),
                },
                SchemaWarning::ChecksumMissing {
                    package: "tool".into(),
                    platform: PlatformId("freebsd".into()),
                },
            ]
        );
    }

    #[test]
    fn script_map_missing_platform_resolves_empty() {
        let normalized = normalize(raw(json!({
            "name": "tool",
            "description": "a tool",
            "homepage": "https://example.com",
            "version": "1.0.0",
            "sha256": {"macos": "aa", "linux": "bb"},
            "url": {"macos": "m", "linux": "l"},
            "scripts": {"install": {"macos": ["brew-style step"]}}
        })));

        assert!(normalized.warnings.is_empty());
        let manifest = normalized.manifest;
        assert_eq!(
            manifest.install.get(&PlatformId("macos".into())).unwrap(),
            &["brew-style step"]
        );
        assert!(
            manifest
                .install
                .get(&PlatformId("linux".into()))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn script_map_with_unknown_platform_warns() {
        let normalized = normalize(raw(json!({
            "name": "tool",
            "description": "a tool",
            "homepage": "https://example.com",
            "version": "1.0.0",
            "sha256": {"macos": "aa"},
            "url": {"macos": "m"},
            "scripts": {"completions": {"haiku": ["cp comp"]}}
        })));

        assert_eq!(
            normalized.warnings,
            vec![SchemaWarning::UnknownScriptPlatform {
                package: "tool".into(),
                kind: ScriptKind::Completions,
                platform: PlatformId("haiku".into()),
            }]
        );
        assert!(
            normalized
                .manifest
                .completions
                .get(&PlatformId("macos".into()))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn dependencies_and_caveats_pass_through() {
        let normalized = normalize(raw(json!({
            "name": "tool",
            "description": "a tool",
            "homepage": "https://example.com",
            "version": "1.0.0",
            "sha256": "aa",
            "url": "https://x/t",
            "dependencies": ["zlib", "openssl"],
            "caveats": "needs a login shell"
        })));

        let manifest = normalized.manifest;
        assert_eq!(manifest.dependencies, ["zlib", "openssl"]);
        assert_eq!(manifest.caveats.as_deref(), Some("needs a login shell"));
    }
}
