use anyhow::{Context, Result};
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

use crate::schema::CandidateMatch;

/// Candidate lists of previously matched mentions for one KB, persisted
/// across runs.
#[derive(Debug, Default)]
pub struct MatchCache {
    entries: DashMap<String, Vec<CandidateMatch>>,
}

impl MatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a cache file; a missing file yields an empty (cold) cache.
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            debug!(path = ?path, "No cache file, starting cold");
            return Ok(Self::new());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .context(format!("Failed to read cache file: {:?}", path))?;
        let entries: HashMap<String, Vec<CandidateMatch>> =
            serde_json::from_str(&content).context("Failed to parse cache file")?;

        debug!(path = ?path, entries = entries.len(), "Loaded candidate cache");

        Ok(Self {
            entries: entries.into_iter().collect(),
        })
    }

    pub fn get(&self, mention_text: &str) -> Option<Vec<CandidateMatch>> {
        self.entries.get(mention_text).map(|r| r.value().clone())
    }

    pub fn insert(&self, mention_text: &str, matches: Vec<CandidateMatch>) {
        self.entries.insert(mention_text.to_string(), matches);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the whole cache at once. The previous file is only replaced
    /// after the new one is completely written.
    pub async fn persist(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create cache directory: {:?}", parent))?;
        }

        let snapshot: BTreeMap<String, Vec<CandidateMatch>> = self
            .entries
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        let json = serde_json::to_string(&snapshot).context("Failed to serialize cache")?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .context(format!("Failed to write cache file: {:?}", tmp_path))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .context(format!("Failed to replace cache file: {:?}", path))?;

        info!(path = ?path, entries = snapshot.len(), "Persisted candidate cache");
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CacheStats {
    pub entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("medic.json");

        let cache = MatchCache::new();
        cache.insert("fever", vec![CandidateMatch::name("fever", 1.0)]);
        cache.insert("pyrexia", vec![CandidateMatch::synonym("pyrexia", 1.0)]);
        cache.persist(&path).await.unwrap();

        assert!(!path.with_extension("json.tmp").exists());

        let reloaded = MatchCache::load(&path).await.unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.stats().entries, 2);
        assert_eq!(reloaded.get("pyrexia").unwrap()[0].name, "pyrexia");
        assert!(reloaded.get("pyrexia").unwrap()[0].is_synonym());
    }

    #[tokio::test]
    async fn test_missing_file_is_cold_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MatchCache::load(&dir.path().join("chebi.json")).await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chebi.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(MatchCache::load(&path).await.is_err());
    }
}
