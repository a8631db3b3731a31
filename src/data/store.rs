//! File-backed access to the repository's `data/` and `builds/` directories.
//!
//! Every call reads and parses the file fresh from disk; nothing is cached
//! between calls.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use super::types::Build;
use crate::error::DataError;
use crate::metrics::{inc_file_load_failures, LatencyTimer};

/// Directory holding build documents, relative to the repository root.
pub const BUILDS_DIR: &str = "builds";

/// Build served by the fixed alias route.
pub const PERMAFROST_MARSHAL_ID: &str = "permafrost-marshal";

/// A top-level reference collection under `data/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Skills,
    Effects,
    Sets,
    CpStars,
}

impl Collection {
    /// File path relative to the repository root.
    pub fn path(&self) -> &'static str {
        match self {
            Collection::Skills => "data/skills.json",
            Collection::Effects => "data/effects.json",
            Collection::Sets => "data/sets.json",
            Collection::CpStars => "data/cp-stars.json",
        }
    }

    /// Key of the wrapper object's array.
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Skills => "skills",
            Collection::Effects => "effects",
            Collection::Sets => "sets",
            Collection::CpStars => "cpstars",
        }
    }
}

/// Strip every character outside `[A-Za-z0-9-]`.
pub fn sanitize_build_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// Relative path of a build document.
pub fn build_path(id: &str) -> PathBuf {
    Path::new(BUILDS_DIR).join(format!("{id}.json"))
}

/// Read-only view over a repository root.
#[derive(Debug, Clone)]
pub struct DataRoot {
    root: PathBuf,
}

impl DataRoot {
    /// Create a view rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read and parse a JSON file relative to the root.
    #[instrument(skip(self, relative), fields(file = %relative.as_ref().display()))]
    pub async fn load_json<T: DeserializeOwned>(
        &self,
        relative: impl AsRef<Path>,
    ) -> Result<T, DataError> {
        let relative = relative.as_ref();
        let label = relative.display().to_string();
        let _timer = LatencyTimer::new(label.clone());

        let result = self.read_and_parse(relative).await;
        if result.is_err() {
            inc_file_load_failures(&label);
        }
        result
    }

    async fn read_and_parse<T: DeserializeOwned>(&self, relative: &Path) -> Result<T, DataError> {
        let path = self.root.join(relative);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| DataError::from_io(path.clone(), source))?;
        debug!(bytes = bytes.len(), "Read data file");
        serde_json::from_slice(&bytes).map_err(|source| DataError::Parse { path, source })
    }

    /// Load the top-level array of a collection file verbatim.
    pub async fn load_collection(&self, collection: Collection) -> Result<Vec<Value>, DataError> {
        let mut doc: Value = self.load_json(collection.path()).await?;
        match doc.get_mut(collection.key()).map(Value::take) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(DataError::Shape {
                path: self.root.join(collection.path()),
                key: collection.key(),
            }),
        }
    }

    /// Load a collection and decode each element as `T`.
    pub async fn load_typed<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, DataError> {
        let items = self.load_collection(collection).await?;
        serde_json::from_value(Value::Array(items)).map_err(|source| DataError::Parse {
            path: self.root.join(collection.path()),
            source,
        })
    }

    /// Load a build document verbatim. `id` must already be sanitized.
    pub async fn load_build_raw(&self, id: &str) -> Result<Value, DataError> {
        self.load_json(build_path(id)).await
    }

    /// Load and decode a build document. `id` must already be sanitized.
    pub async fn load_build(&self, id: &str) -> Result<Build, DataError> {
        self.load_json(build_path(id)).await
    }

    /// Sorted stems of every `builds/*.json` file.
    pub async fn list_builds(&self) -> Result<Vec<String>, DataError> {
        let dir = self.root.join(BUILDS_DIR);
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|source| DataError::from_io(dir.clone(), source))?;

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| DataError::from_io(dir.clone(), source))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }

        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::Skill;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn sanitize_strips_disallowed_characters() {
        assert_eq!(sanitize_build_id("permafrost-marshal"), "permafrost-marshal");
        assert_eq!(sanitize_build_id("perma!frost-marshal"), "permafrost-marshal");
        assert_eq!(sanitize_build_id("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_build_id("build_01.json"), "build01json");
        assert_eq!(sanitize_build_id("!!!"), "");
        assert_eq!(sanitize_build_id("héllo"), "hllo");
    }

    #[test]
    fn build_path_is_under_builds() {
        assert_eq!(build_path("abc"), PathBuf::from("builds/abc.json"));
    }

    #[tokio::test]
    async fn load_collection_returns_array_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "data/cp-stars.json",
            r#"{"cpstars":[{"id":"cp.a","extra":1},{"id":"cp.b"}]}"#,
        );

        let store = DataRoot::new(dir.path());
        let items = store.load_collection(Collection::CpStars).await.unwrap();
        assert_eq!(items, vec![json!({"id":"cp.a","extra":1}), json!({"id":"cp.b"})]);
    }

    #[tokio::test]
    async fn load_collection_rejects_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "data/sets.json", r#"{"items":[]}"#);

        let store = DataRoot::new(dir.path());
        let err = store.load_collection(Collection::Sets).await.unwrap_err();
        assert!(matches!(err, DataError::Shape { key: "sets", .. }));
    }

    #[tokio::test]
    async fn load_json_classifies_failures() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "builds/broken.json", "{ not json");

        let store = DataRoot::new(dir.path());
        let missing = store.load_build_raw("absent").await.unwrap_err();
        assert!(missing.is_not_found());

        let broken = store.load_build_raw("broken").await.unwrap_err();
        assert!(matches!(broken, DataError::Parse { .. }));
    }

    #[tokio::test]
    async fn reads_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "data/skills.json", r#"{"skills":[]}"#);

        let store = DataRoot::new(dir.path());
        assert_eq!(store.load_collection(Collection::Skills).await.unwrap().len(), 0);

        write(dir.path(), "data/skills.json", r#"{"skills":[{},{}]}"#);
        assert_eq!(store.load_collection(Collection::Skills).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn load_typed_decodes_elements() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "data/skills.json",
            r#"{"skills":[{"id":"skill.frozen_gate","name":"Frozen Gate","line":"Winter's Embrace",
                "role":"control","cost_type":"magicka","tooltip":"Roots enemies.",
                "effects":[{"effect_id":"debuff.root","timing":"on_trigger","target":"enemy","duration_seconds":3}]}]}"#,
        );

        let store = DataRoot::new(dir.path());
        let skills: Vec<Skill> = store.load_typed(Collection::Skills).await.unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].effects[0].duration_seconds, Some(3.0));
    }

    #[tokio::test]
    async fn list_builds_returns_sorted_json_stems() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "builds/zeta.json", "{}");
        write(dir.path(), "builds/alpha.json", "{}");
        write(dir.path(), "builds/notes.md", "");

        let store = DataRoot::new(dir.path());
        assert_eq!(store.list_builds().await.unwrap(), vec!["alpha", "zeta"]);
    }
}
