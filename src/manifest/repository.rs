//! Loads every manifest in a source directory into typed records.
//!
//! A manifest that fails to parse, validate, or carry a path-safe name is
//! fatal for the whole build: cross-links between pages must stay globally
//! consistent, so a partial site is worse than no site.

use crate::manifest::model::RawManifest;
use crate::schema::ManifestSchema;
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

/// A parsed manifest plus the file it came from.
///
/// The source path is kept so the build can republish manifest files
/// byte-for-byte and name the offending file in diagnostics.
#[derive(Clone, Debug)]
pub struct SourceManifest {
    pub path: PathBuf,
    pub raw: RawManifest,
}

/// Load every `*.json` manifest directly under `source_dir`.
///
/// Non-manifest files (icons, READMEs) are ignored. The result is sorted by
/// package name under `collate`, which is the build's canonical ordering.
/// Duplicate package names abort the build.
pub fn load_all(source_dir: &Path, schema: &ManifestSchema) -> Result<Vec<SourceManifest>> {
    let mut paths = Vec::new();
    let entries = fs::read_dir(source_dir)
        .with_context(|| format!("reading manifest directory {}", source_dir.display()))?;
    for entry in entries {
        let entry = entry
            .with_context(|| format!("reading manifest directory {}", source_dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        paths.push(path);
    }
    // Read in path order so fatal diagnostics are deterministic.
    paths.sort();

    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        let data = fs::read_to_string(&path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        let value: Value = serde_json::from_str(&data)
            .with_context(|| format!("parsing manifest {}", path.display()))?;
        schema.validate(&value, &path)?;
        // Typed parse goes straight from the source text so the deserializer
        // yields platform keys in declared order; declared order is the
        // display order and must survive loading.
        let raw: RawManifest = serde_json::from_str(&data)
            .with_context(|| format!("decoding manifest {}", path.display()))?;
        validate_package_name(&raw.name)
            .with_context(|| format!("manifest {}", path.display()))?;
        loaded.push(SourceManifest { path, raw });
    }

    loaded.sort_by(|a, b| collate(&a.raw.name, &b.raw.name));
    for pair in loaded.windows(2) {
        if pair[0].raw.name == pair[1].raw.name {
            bail!(
                "duplicate package name '{}' ({} and {})",
                pair[0].raw.name,
                pair[0].path.display(),
                pair[1].path.display()
            );
        }
    }

    Ok(loaded)
}

/// Fixed locale-style collation: case-insensitive primary, byte tiebreak.
///
/// Host locale collation would make the canonical ordering machine-dependent;
/// this keeps two builds of the same manifest set byte-identical everywhere.
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if folded != Ordering::Equal {
        return folded;
    }
    a.cmp(b)
}

fn validate_package_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("package name must not be empty");
    }
    if name.starts_with('.') {
        bail!("package name '{name}' must not start with '.'");
    }
    // The name doubles as the output file stem and the dependency link target.
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        bail!("package name '{name}' must match ^[A-Za-z0-9_.-]+$");
    }
    Ok(())
}
