//! Persists rendered pages and manages the output directory's lifecycle.
//!
//! Pages are staged into a fresh temporary directory next to the output
//! directory, then swapped into place by rename. A failed build leaves the
//! previous site untouched, and readers never observe a half-built tree.
//! Stale pages from removed packages cannot survive because the whole
//! directory is replaced.

use crate::render::RenderedPage;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use tempfile::Builder;

/// Write every page and swap the result into place at `out_dir`.
///
/// Returns the number of pages written. Page names must be bare file names;
/// anything path-like is rejected before any file is touched.
pub fn write_pages(out_dir: &Path, pages: &[RenderedPage]) -> Result<usize> {
    for page in pages {
        validate_page_name(&page.file_name)?;
    }

    let parent = match out_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("creating output parent {}", parent.display()))?;

    let staging = Builder::new()
        .prefix(".site-stage-")
        .tempdir_in(parent)
        .with_context(|| format!("creating staging directory in {}", parent.display()))?;
    for page in pages {
        fs::write(staging.path().join(&page.file_name), &page.text)
            .with_context(|| format!("writing page {}", page.file_name))?;
    }

    // Every page landed; stop cleaning up the staging dir and swap it in.
    let staged = staging.keep();
    let retired = if out_dir.exists() {
        let retired = parent.join(format!(".site-retired-{}", std::process::id()));
        if retired.exists() {
            fs::remove_dir_all(&retired)
                .with_context(|| format!("clearing {}", retired.display()))?;
        }
        fs::rename(out_dir, &retired)
            .with_context(|| format!("retiring previous site at {}", out_dir.display()))?;
        Some(retired)
    } else {
        None
    };

    if let Err(err) = fs::rename(&staged, out_dir) {
        // Put the previous site back before reporting the failure.
        if let Some(previous) = &retired {
            let _ = fs::rename(previous, out_dir);
        }
        let _ = fs::remove_dir_all(&staged);
        return Err(err)
            .with_context(|| format!("installing site at {}", out_dir.display()));
    }

    if let Some(previous) = retired {
        fs::remove_dir_all(&previous)
            .with_context(|| format!("removing retired site at {}", previous.display()))?;
    }

    Ok(pages.len())
}

fn validate_page_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("page name must not be empty");
    }
    if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        bail!("page name '{name}' must be a bare file name");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn page(name: &str, text: &str) -> RenderedPage {
        RenderedPage {
            file_name: name.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn writes_all_pages() -> Result<()> {
        let scratch = TempDir::new()?;
        let out = scratch.path().join("site");
        let written = write_pages(&out, &[page("index.md", "index"), page("a.md", "a")])?;
        assert_eq!(written, 2);
        assert_eq!(fs::read_to_string(out.join("index.md"))?, "index");
        assert_eq!(fs::read_to_string(out.join("a.md"))?, "a");
        Ok(())
    }

    #[test]
    fn rebuild_replaces_the_whole_directory() -> Result<()> {
        let scratch = TempDir::new()?;
        let out = scratch.path().join("site");
        write_pages(&out, &[page("index.md", "v1"), page("removed.md", "old")])?;
        write_pages(&out, &[page("index.md", "v2")])?;

        assert_eq!(fs::read_to_string(out.join("index.md"))?, "v2");
        assert!(
            !out.join("removed.md").exists(),
            "stale pages must not survive a rebuild"
        );
        Ok(())
    }

    #[test]
    fn no_staging_leftovers_after_swap() -> Result<()> {
        let scratch = TempDir::new()?;
        let out = scratch.path().join("site");
        write_pages(&out, &[page("index.md", "v1")])?;
        write_pages(&out, &[page("index.md", "v2")])?;

        let siblings: Vec<String> = fs::read_dir(scratch.path())?
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(siblings, ["site"], "only the live site should remain: {siblings:?}");
        Ok(())
    }

    #[test]
    fn path_like_page_name_is_rejected_before_writing() -> Result<()> {
        let scratch = TempDir::new()?;
        let out = scratch.path().join("site");
        write_pages(&out, &[page("index.md", "v1")])?;

        let err = write_pages(&out, &[page("../escape.md", "bad")])
            .expect_err("path-like names must be rejected");
        assert!(err.to_string().contains("bare file name"));
        assert_eq!(
            fs::read_to_string(out.join("index.md"))?,
            "v1",
            "failed build must leave the previous site untouched"
        );
        Ok(())
    }
}
