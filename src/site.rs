//! Orchestrates one build: load, normalize, render, write.
//!
//! The pipeline is a single batch pass with two ordering points: the full
//! sorted manifest list exists before the index renders, and staging completes
//! before the output swap. Everything else is a pure function of one manifest.

use crate::manifest::{self, Manifest, Normalized, SourceManifest};
use crate::render::{self, RenderedPage};
use crate::schema::ManifestSchema;
use crate::writer;
use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

/// How a class of non-fatal findings is handled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IssuePolicy {
    Ignore,
    Warn,
    Fail,
}

/// One build's inputs and policies.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    pub manifest_dir: PathBuf,
    pub out_dir: PathBuf,
    /// On-disk schema override; the bundled schema is used when absent.
    pub schema_path: Option<PathBuf>,
    /// Platform key-set mismatches between `sha256` and `url`, and script maps
    /// naming unknown platforms. Origin intent is ambiguous, so the default
    /// reports without failing.
    pub platform_policy: IssuePolicy,
    /// Dependencies with no manifest in the set. Dependency manifests may live
    /// outside the set being built, so the default is silent.
    pub dependency_policy: IssuePolicy,
    /// Copy each loaded manifest file into the output as `<name>.json` so the
    /// pages' raw-manifest links resolve from the same tree.
    pub publish_manifests: bool,
}

impl BuildOptions {
    pub fn new(manifest_dir: PathBuf, out_dir: PathBuf) -> Self {
        Self {
            manifest_dir,
            out_dir,
            schema_path: None,
            platform_policy: IssuePolicy::Warn,
            dependency_policy: IssuePolicy::Ignore,
            publish_manifests: false,
        }
    }
}

/// What a completed build produced.
#[derive(Clone, Debug)]
pub struct BuildReport {
    pub packages: usize,
    pub pages_written: usize,
    pub warnings: Vec<String>,
}

/// Run one full build.
///
/// Fatal errors (unreadable directory, malformed manifest, duplicate name,
/// escalated policy) abort before the output directory is touched.
pub fn build_site(options: &BuildOptions) -> Result<BuildReport> {
    let schema = match &options.schema_path {
        Some(path) => ManifestSchema::from_path(path)?,
        None => ManifestSchema::bundled()?,
    };
    let sources = manifest::load_all(&options.manifest_dir, &schema)?;

    let mut warnings = Vec::new();
    let mut manifests: Vec<Manifest> = Vec::with_capacity(sources.len());
    for source in &sources {
        let Normalized {
            manifest,
            warnings: schema_warnings,
        } = manifest::normalize(source.raw.clone());
        if !schema_warnings.is_empty() {
            match options.platform_policy {
                IssuePolicy::Fail => bail!(
                    "manifest {} is inconsistent:\n{}",
                    source.path.display(),
                    schema_warnings
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("\n")
                ),
                IssuePolicy::Warn => {
                    warnings.extend(schema_warnings.iter().map(ToString::to_string));
                }
                IssuePolicy::Ignore => {}
            }
        }
        manifests.push(manifest);
    }

    if options.dependency_policy != IssuePolicy::Ignore {
        let known: BTreeSet<&str> = manifests.iter().map(|m| m.name.as_str()).collect();
        let mut dangling = Vec::new();
        for manifest in &manifests {
            for dependency in &manifest.dependencies {
                if !known.contains(dependency.as_str()) {
                    dangling.push(format!(
                        "package '{}' depends on '{dependency}', which has no manifest in this set",
                        manifest.name
                    ));
                }
            }
        }
        if !dangling.is_empty() {
            match options.dependency_policy {
                IssuePolicy::Fail => bail!("unresolved dependencies:\n{}", dangling.join("\n")),
                IssuePolicy::Warn => warnings.extend(dangling),
                IssuePolicy::Ignore => {}
            }
        }
    }

    let mut pages: Vec<RenderedPage> = Vec::with_capacity(manifests.len() + 2);
    pages.push(render::render_index(&manifests));
    for manifest in &manifests {
        pages.push(render::render_package_page(manifest));
    }
    pages.push(render::render_search_index(&manifests)?);
    if options.publish_manifests {
        for source in &sources {
            pages.push(published_manifest(source)?);
        }
    }

    let pages_written = writer::write_pages(&options.out_dir, &pages)?;

    Ok(BuildReport {
        packages: manifests.len(),
        pages_written,
        warnings,
    })
}

fn published_manifest(source: &SourceManifest) -> Result<RenderedPage> {
    let text = fs::read_to_string(&source.path)
        .with_context(|| format!("reading manifest {}", source.path.display()))?;
    Ok(RenderedPage {
        file_name: format!("{}.json", source.raw.name),
        text,
    })
}
