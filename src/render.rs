//! Renders canonical manifests into documentation pages.
//!
//! Output is Markdown with the container extensions the site framework
//! understands: `::: warning` callouts and `::: code-group` tabbed fences.
//! Rendering is a pure function of the manifest set; section order is fixed,
//! platform order follows the manifest's declared order, and absent optional
//! fields produce no section at all.

use crate::manifest::{Manifest, ScriptKind};
use crate::template;
use anyhow::Result;
use std::collections::BTreeMap;

pub const INDEX_PAGE: &str = "index.md";
pub const SEARCH_INDEX_PAGE: &str = "index.json";

/// Immutable rendered document plus its file name under the output directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderedPage {
    pub file_name: String,
    pub text: String,
}

/// `{name, description}` pair exposed by the index for the client-side
/// filter/search widget.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexEntry {
    pub name: String,
    pub description: String,
}

pub fn index_entries(manifests: &[Manifest]) -> Vec<IndexEntry> {
    manifests
        .iter()
        .map(|manifest| IndexEntry {
            name: manifest.name.clone(),
            description: manifest.description.clone(),
        })
        .collect()
}

/// Render the package index: one line per package in canonical order, each
/// carrying its name and description as machine-readable attributes.
pub fn render_index(manifests: &[Manifest]) -> RenderedPage {
    let mut text = String::from("# Packages\n\n");
    for entry in index_entries(manifests) {
        text.push_str(&format!(
            "- [{name}](./{name}) — {desc}{{data-name=\"{name}\" data-desc=\"{desc}\"}}\n",
            name = entry.name,
            desc = entry.description,
        ));
    }
    RenderedPage {
        file_name: INDEX_PAGE.to_string(),
        text,
    }
}

/// Render the machine-readable search index consumed by the client's
/// `search` command: `{name: {version, description}}`.
pub fn render_search_index(manifests: &[Manifest]) -> Result<RenderedPage> {
    let mut index: BTreeMap<&str, BTreeMap<&str, &str>> = BTreeMap::new();
    for manifest in manifests {
        index.insert(
            &manifest.name,
            BTreeMap::from([
                ("version", manifest.version.as_str()),
                ("description", manifest.description.as_str()),
            ]),
        );
    }
    let mut text = serde_json::to_string_pretty(&index)?;
    text.push('\n');
    Ok(RenderedPage {
        file_name: SEARCH_INDEX_PAGE.to_string(),
        text,
    })
}

/// Render one package page.
///
/// Section order is fixed: title, install command, description, metadata
/// list, downloads, dependencies, caveats, scripts. Dependency links are
/// rendered even when the target manifest is absent from the set; dependency
/// manifests may live outside the build.
pub fn render_package_page(manifest: &Manifest) -> RenderedPage {
    let mut text = String::new();
    text.push_str(&format!("# {}\n\n", manifest.name));
    text.push_str(&format!("```sh\npkg add {}\n```\n\n", manifest.name));
    text.push_str(&format!("{}\n\n", manifest.description));
    text.push_str(&format!("- Version: {}\n", manifest.version));
    text.push_str(&format!("- Homepage: <{}>\n", manifest.homepage));
    text.push_str(&format!(
        "- Manifest: [{name}.json](/{name}.json)\n\n",
        name = manifest.name
    ));

    push_downloads(&mut text, manifest);
    push_dependencies(&mut text, manifest);
    push_caveats(&mut text, manifest);
    push_scripts(&mut text, manifest);

    // Exactly one trailing newline regardless of which sections rendered.
    let trimmed_len = text.trim_end_matches('\n').len();
    text.truncate(trimmed_len);
    text.push('\n');

    RenderedPage {
        file_name: format!("{}.md", manifest.name),
        text,
    }
}

fn push_downloads(text: &mut String, manifest: &Manifest) {
    if manifest.platforms.is_empty() {
        // Every platform was dropped by normalization; nothing to list.
        return;
    }
    text.push_str("## Downloads\n\n");
    if manifest.is_universal() {
        for (_, artifact) in manifest.platforms.iter() {
            let url = template::substitute(&artifact.url, &manifest.version);
            text.push_str(&format!("- URL: <{url}>\n"));
            text.push_str(&format!("- SHA256: `{}`\n", artifact.sha256));
        }
        text.push('\n');
    } else {
        text.push_str("| Platform | URL | SHA256 |\n");
        text.push_str("| --- | --- | --- |\n");
        for (platform, artifact) in manifest.platforms.iter() {
            let url = template::substitute(&artifact.url, &manifest.version);
            text.push_str(&format!(
                "| {platform} | {url} | `{sha}` |\n",
                sha = artifact.sha256
            ));
        }
        text.push('\n');
    }
}

fn push_dependencies(text: &mut String, manifest: &Manifest) {
    if manifest.dependencies.is_empty() {
        return;
    }
    text.push_str("Dependencies:\n");
    for dependency in &manifest.dependencies {
        text.push_str(&format!("- [{dependency}](./{dependency}.md)\n"));
    }
    text.push('\n');
}

fn push_caveats(text: &mut String, manifest: &Manifest) {
    let Some(caveats) = &manifest.caveats else {
        return;
    };
    text.push_str(&format!("::: warning CAVEATS\n{caveats}\n:::\n\n"));
}

fn push_scripts(text: &mut String, manifest: &Manifest) {
    let mut section = String::new();
    for kind in ScriptKind::ALL {
        // Tabs whose resolved script is empty are omitted; a kind with no
        // non-empty script on any platform omits its subsection.
        let tabs: Vec<(&str, String)> = manifest
            .scripts(kind)
            .iter()
            .filter(|(_, lines)| !lines.is_empty())
            .map(|(platform, lines)| {
                (
                    platform.as_str(),
                    template::substitute(&lines.join("\n"), &manifest.version),
                )
            })
            .collect();
        if tabs.is_empty() {
            continue;
        }

        section.push_str(&format!("### {}\n\n", kind.heading()));
        if manifest.is_universal() {
            for (_, script) in &tabs {
                section.push_str(&format!("```sh\n{script}\n```\n\n"));
            }
        } else {
            section.push_str("::: code-group\n\n");
            for (platform, script) in &tabs {
                section.push_str(&format!("```sh [{platform}]\n{script}\n```\n\n"));
            }
            section.push_str(":::\n\n");
        }
    }

    if !section.is_empty() {
        text.push_str("## Scripts\n\n");
        text.push_str(&section);
    }
}
