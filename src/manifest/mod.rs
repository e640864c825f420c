//! Manifest loading, data model, and schema normalization.

mod model;
mod normalize;
mod repository;

pub use model::{
    Artifact, Manifest, PlatformId, PlatformKeyed, PlatformMap, RawManifest, RawScripts,
    ScriptKind,
};
pub use normalize::{Normalized, SchemaWarning, normalize};
pub use repository::{SourceManifest, collate, load_all};
