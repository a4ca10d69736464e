use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::index::{ConceptInfo, KbEdges, KbIndex};
use crate::profile::KbProfile;

const NAMES_FILE: &str = "name_to_id.json";
const FULL_SYNONYMS_FILE: &str = "synonym_to_id_full.json";
const SYNONYMS_FILE: &str = "synonym_to_id.json";
const INFO_FILE: &str = "id_to_info.json";
const EDGES_FILE: &str = "node_to_node.json";

/// Loads the preprocessed JSON dictionaries of a knowledge base.
pub struct KbLoader;

impl KbLoader {
    /// Load `<dicts_dir>/{name_to_id, synonym_to_id[_full], id_to_info, node_to_node}.json`.
    /// Structure files are skipped for KBs without them.
    pub async fn load(dicts_dir: &Path, profile: &KbProfile) -> Result<KbIndex> {
        let name_to_id: HashMap<String, String> =
            read_json(&dicts_dir.join(NAMES_FILE)).await?;

        let full_synonyms = dicts_dir.join(FULL_SYNONYMS_FILE);
        let synonyms_path = if tokio::fs::try_exists(&full_synonyms).await.unwrap_or(false) {
            full_synonyms
        } else {
            dicts_dir.join(SYNONYMS_FILE)
        };
        let synonym_to_id: HashMap<String, String> = read_json(&synonyms_path).await?;

        let (id_to_info, edges) = if profile.has_structure {
            let id_to_info: HashMap<String, ConceptInfo> =
                read_json(&dicts_dir.join(INFO_FILE)).await?;
            let edges: KbEdges = read_json(&dicts_dir.join(EDGES_FILE)).await?;
            (id_to_info, edges)
        } else {
            (HashMap::new(), KbEdges::new())
        };

        let index = KbIndex::new(name_to_id, synonym_to_id, id_to_info, edges);
        let stats = index.stats();

        info!(
            kb = %profile.name,
            names = stats.names,
            synonyms = stats.synonyms,
            concepts = stats.concepts,
            "Loaded knowledge base"
        );

        Ok(index)
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .context(format!("Failed to read KB dictionary: {:?}", path))?;

    serde_json::from_str(&content).context(format!("Failed to parse KB dictionary: {:?}", path))
}
