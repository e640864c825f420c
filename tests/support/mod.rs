use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub fn write_manifest(dir: &Path, file_name: &str, value: &Value) -> Result<()> {
    let path = dir.join(file_name);
    fs::write(&path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("writing fixture {}", path.display()))?;
    Ok(())
}

/// Creates a temp directory containing one `<name>.json` per fixture.
pub fn manifest_dir(manifests: &[(&str, Value)]) -> Result<TempDir> {
    let dir = TempDir::new().context("allocating fixture manifest dir")?;
    for (name, value) in manifests {
        write_manifest(dir.path(), &format!("{name}.json"), value)?;
    }
    Ok(dir)
}

/// The worked multi-platform example: per-platform install scripts, a flat
/// latest script, and `{{ version }}` URL templates.
pub fn multi_platform_manifest(name: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{name} description"),
        "homepage": format!("https://{name}.example.com"),
        "version": "1.2.0",
        "sha256": {"macos": "aa11", "linux": "bb22"},
        "url": {
            "macos": "https://x/{{ version }}/mac.tar",
            "linux": "https://x/{{ version }}/linux.tar"
        },
        "scripts": {
            "install": {
                "macos": ["curl -o f {{ pkg.tmp_dir }}/f"],
                "linux": ["curl -o f {{ pkg.tmp_dir }}/f"]
            },
            "latest": ["curl https://x/latest"]
        }
    })
}

/// A legacy single-platform manifest: flat `sha256`/`url`, flat scripts.
pub fn legacy_manifest(name: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{name} description"),
        "homepage": format!("https://{name}.example.com"),
        "version": "0.5.0",
        "sha256": "deadbeef",
        "url": format!("https://x/{{{{ version }}}}/{name}.tar.gz"),
        "scripts": {"install": ["make install"], "latest": ["curl https://x/latest"]}
    })
}

/// Reads every file in a built site into a name → contents map.
pub fn read_site(dir: &Path) -> Result<BTreeMap<String, String>> {
    let mut pages = BTreeMap::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading site {}", dir.display()))? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let text = fs::read_to_string(entry.path())
            .with_context(|| format!("reading page {}", entry.path().display()))?;
        pages.insert(name, text);
    }
    Ok(pages)
}
