//! Compiled JSON Schema for manifest files.
//!
//! Validation runs before typed deserialization so malformed manifests fail
//! with property-level diagnostics naming the offending file. The bundled
//! schema accepts both historical shapes; `--schema PATH` swaps in an on-disk
//! copy for repositories that publish their own.

use anyhow::{Context, Result, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

const BUNDLED_SCHEMA: &str = include_str!("../schema/manifest.schema.json");

/// Compiled manifest schema. Compile once, validate per file.
pub struct ManifestSchema {
    compiled: JSONSchema,
    // Keeps the schema document alive for the compiled validator's borrows.
    _raw: Arc<Value>,
}

impl ManifestSchema {
    /// Compile the schema shipped with the crate.
    pub fn bundled() -> Result<Self> {
        let value: Value =
            serde_json::from_str(BUNDLED_SCHEMA).context("parsing bundled manifest schema")?;
        Self::compile(value).context("compiling bundled manifest schema")
    }

    /// Compile a schema loaded from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("opening schema {}", path.display()))?;
        let value: Value = serde_json::from_reader(file)
            .with_context(|| format!("parsing schema {}", path.display()))?;
        Self::compile(value).with_context(|| format!("compiling schema {}", path.display()))
    }

    fn compile(value: Value) -> Result<Self> {
        let raw = Arc::new(value);
        let raw_static: &'static Value = unsafe { &*(Arc::as_ptr(&raw)) };
        let compiled = JSONSchema::compile(raw_static)
            .map_err(|err| anyhow::anyhow!("invalid schema: {err}"))?;
        Ok(Self {
            compiled,
            _raw: raw,
        })
    }

    /// Validate one manifest document, reporting every violation at once.
    pub fn validate(&self, manifest: &Value, origin: &Path) -> Result<()> {
        if let Err(errors) = self.compiled.validate(manifest) {
            let details = errors
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            bail!(
                "manifest {} failed schema validation:\n{}",
                origin.display(),
                details
            );
        }
        Ok(())
    }
}
