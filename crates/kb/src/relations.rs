use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Relations mined from an external corpus: `kb_id -> [related kb_id]`.
///
/// Lookups are directed; symmetric relations must be stored both ways by the
/// producer of the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedRelations {
    relations: HashMap<String, Vec<String>>,
}

impl ExtractedRelations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(relations: HashMap<String, Vec<String>>) -> Self {
        Self { relations }
    }

    /// Load a relations file; a missing file yields an empty set.
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            debug!(path = ?path, "No extracted relations file");
            return Ok(Self::new());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .context(format!("Failed to read relations file: {:?}", path))?;
        let relations: Self =
            serde_json::from_str(&content).context("Failed to parse relations file")?;

        info!(path = ?path, concepts = relations.len(), "Loaded extracted relations");
        Ok(relations)
    }

    pub fn contains(&self, source: &str, target: &str) -> bool {
        self.relations
            .get(source)
            .is_some_and(|related| related.iter().any(|r| r == target))
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
