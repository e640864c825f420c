//! Deserializable representation of on-disk package manifests.
//!
//! Manifests were written against two historical schemas: the legacy shape
//! keeps `sha256`/`url` as single strings and scripts as flat command lists,
//! the current shape keys all of them by platform. Both parse into the same
//! `RawManifest`; `normalize` collapses them into one canonical `Manifest`
//! so the renderer never branches on shape.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Platform identifier under which a package has a distinct artifact
/// (e.g. `macos-arm64`, `linux-x64`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformId(pub String);

impl PlatformId {
    /// Synthetic platform id assigned to legacy single-platform manifests.
    pub const UNIVERSAL: &'static str = "default";

    pub fn universal() -> Self {
        Self(Self::UNIVERSAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insertion-ordered platform-keyed map.
///
/// Declared key order in a manifest is author intent for display, so this map
/// never re-sorts. Lookups are linear; platform sets are tiny.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlatformMap<T> {
    entries: Vec<(PlatformId, T)>,
}

impl<T> PlatformMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts a value, replacing and returning any previous value for the key.
    pub fn insert(&mut self, key: PlatformId, value: T) -> Option<T> {
        for (existing, slot) in &mut self.entries {
            if *existing == key {
                return Some(std::mem::replace(slot, value));
            }
        }
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &PlatformId) -> Option<&T> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &PlatformId) -> bool {
        self.get(key).is_some()
    }

    /// Iterates keys in declared order.
    pub fn keys(&self) -> impl Iterator<Item = &PlatformId> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Iterates entries in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&PlatformId, &T)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for PlatformMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'de, T> Deserialize<'de> for PlatformMap<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MapVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for MapVisitor<T>
        where
            T: Deserialize<'de>,
        {
            type Value = PlatformMap<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a platform-keyed map")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = PlatformMap::new();
                while let Some((key, value)) = access.next_entry::<PlatformId, T>()? {
                    if map.insert(key.clone(), value).is_some() {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate platform key '{key}'"
                        )));
                    }
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(MapVisitor(PhantomData))
    }
}

/// A manifest field that is either flat (legacy, applies to every platform)
/// or keyed by platform (current schema).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PlatformKeyed<T> {
    Flat(T),
    PerPlatform(PlatformMap<T>),
}

impl<T> PlatformKeyed<T> {
    pub fn is_flat(&self) -> bool {
        matches!(self, PlatformKeyed::Flat(_))
    }
}

/// One package manifest as parsed from disk, schema shape undetermined.
#[derive(Clone, Debug, Deserialize)]
pub struct RawManifest {
    /// Schema URL declared by the manifest; carried but not interpreted.
    #[serde(rename = "$schema", default)]
    pub schema: Option<String>,
    pub name: String,
    pub description: String,
    pub homepage: String,
    pub version: String,
    pub sha256: PlatformKeyed<String>,
    pub url: PlatformKeyed<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub caveats: Option<String>,
    #[serde(default)]
    pub scripts: RawScripts,
}

/// Script block of a raw manifest. Every kind tolerates both shapes and
/// absence.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawScripts {
    #[serde(default)]
    pub install: Option<PlatformKeyed<Vec<String>>>,
    #[serde(default)]
    pub latest: Option<PlatformKeyed<Vec<String>>>,
    #[serde(default)]
    pub completions: Option<PlatformKeyed<Vec<String>>>,
}

/// Download location and checksum for one platform.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Artifact {
    pub url: String,
    pub sha256: String,
}

/// Canonical manifest every schema shape reduces to.
///
/// All maps share the same key set: the platforms advertised by `sha256`
/// intersected with `url`. Script entries are present for every platform,
/// possibly empty.
#[derive(Clone, Debug)]
pub struct Manifest {
    pub name: String,
    pub description: String,
    pub homepage: String,
    pub version: String,
    pub platforms: PlatformMap<Artifact>,
    pub install: PlatformMap<Vec<String>>,
    pub latest: PlatformMap<Vec<String>>,
    pub completions: PlatformMap<Vec<String>>,
    pub dependencies: Vec<String>,
    pub caveats: Option<String>,
    pub(crate) universal: bool,
}

impl Manifest {
    /// True when the manifest was written in the legacy single-platform shape
    /// and carries only the synthetic `default` platform.
    pub fn is_universal(&self) -> bool {
        self.universal
    }

    pub fn scripts(&self, kind: ScriptKind) -> &PlatformMap<Vec<String>> {
        match kind {
            ScriptKind::Install => &self.install,
            ScriptKind::Latest => &self.latest,
            ScriptKind::Completions => &self.completions,
        }
    }
}

/// The three script kinds a manifest can carry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScriptKind {
    Install,
    Latest,
    Completions,
}

impl ScriptKind {
    pub const ALL: [ScriptKind; 3] = [
        ScriptKind::Install,
        ScriptKind::Latest,
        ScriptKind::Completions,
    ];

    /// The manifest field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptKind::Install => "install",
            ScriptKind::Latest => "latest",
            ScriptKind::Completions => "completions",
        }
    }

    /// The section heading used on package pages.
    pub fn heading(&self) -> &'static str {
        match self {
            ScriptKind::Install => "Install",
            ScriptKind::Latest => "Latest version",
            ScriptKind::Completions => "Completions",
        }
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
