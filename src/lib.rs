//! Documentation-site generator for a package-manifest repository.
//!
//! A directory of JSON manifests goes in; a directory of Markdown pages plus
//! a machine-readable search index comes out. The pipeline is one batch pass:
//! `manifest::load_all` reads and sorts the manifests, `manifest::normalize`
//! collapses every historical schema shape into one canonical form,
//! `render` turns canonical manifests into pages (resolving placeholder
//! tokens via `template`), and `writer` swaps the finished page set into
//! place atomically. `site::build_site` wires the pass together for the
//! `site-build` binary.

pub mod manifest;
pub mod render;
pub mod schema;
pub mod site;
pub mod template;
pub mod writer;

pub use manifest::{
    Artifact, Manifest, Normalized, PlatformId, PlatformKeyed, PlatformMap, RawManifest,
    RawScripts, SchemaWarning, ScriptKind, SourceManifest, collate, load_all, normalize,
};
pub use render::{
    INDEX_PAGE, IndexEntry, RenderedPage, SEARCH_INDEX_PAGE, index_entries, render_index,
    render_package_page, render_search_index,
};
pub use schema::ManifestSchema;
pub use site::{BuildOptions, BuildReport, IssuePolicy, build_site};
pub use template::substitute;
pub use writer::write_pages;
