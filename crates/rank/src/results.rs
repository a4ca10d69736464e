use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use graph::candidate_file;

use crate::layout::RunLayout;

/// `mention -> (kb_id, entity_type)`, serialized as `{"fever": ["MESH:D005334", "disease"]}`.
pub type DocResults = BTreeMap<String, (String, String)>;

/// Linked entities of a run, keyed by document id.
pub type LinkedEntities = BTreeMap<String, DocResults>;

/// Ranker and candidate file ids use `_` where KB ids use `:`.
pub fn normalize_answer(answer: &str) -> String {
    answer.replace('_', ":")
}

/// Parse the ranker's `candidate_scores` output.
///
/// ```text
/// === doc1 ===
/// 0	entity=fever	...	ANS=MESH_D005334
/// ```
pub fn parse_candidate_scores(content: &str, entity_type: &str) -> Result<LinkedEntities> {
    let mut linked = LinkedEntities::new();
    let mut doc_id: Option<String> = None;

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('=') {
            let id = line
                .split(' ')
                .nth(1)
                .filter(|id| !id.is_empty())
                .context(format!("Document separator without id at line {}", line_no + 1))?;
            doc_id = Some(id.to_string());
            continue;
        }

        let doc = doc_id
            .as_ref()
            .context(format!("Result before any document at line {}", line_no + 1))?;

        let fields: Vec<&str> = line.split('\t').collect();
        let entity = fields
            .iter()
            .find_map(|f| f.strip_prefix("entity="))
            .context(format!("Result line {} without entity", line_no + 1))?;
        let answer = fields
            .iter()
            .find_map(|f| f.strip_prefix("ANS="))
            .context(format!("Result line {} without answer", line_no + 1))?;

        linked.entry(doc.clone()).or_default().insert(
            entity.to_string(),
            (normalize_answer(answer), entity_type.to_string()),
        );
    }

    Ok(linked)
}

pub async fn read_candidate_scores(path: &Path, entity_type: &str) -> Result<LinkedEntities> {
    let content = tokio::fs::read_to_string(path)
        .await
        .context(format!("Failed to read ranker results: {:?}", path))?;
    parse_candidate_scores(&content, entity_type)
        .context(format!("Malformed ranker results: {:?}", path))
}

/// Without a ranker, each mention takes the first candidate listed in its
/// document's candidate file.
pub async fn first_candidate_results(
    candidates_dir: &Path,
    entity_type: &str,
) -> Result<LinkedEntities> {
    let mut linked = LinkedEntities::new();

    let mut entries = tokio::fs::read_dir(candidates_dir)
        .await
        .context(format!("Failed to list {:?}", candidates_dir))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let doc_id = entry.file_name().to_string_lossy().to_string();
        let content = tokio::fs::read_to_string(&path)
            .await
            .context(format!("Failed to read candidate file: {:?}", path))?;
        let blocks = candidate_file::parse(&content)
            .context(format!("Malformed candidate file: {:?}", path))?;

        for block in blocks {
            if let Some(top) = block.candidates.first() {
                linked.entry(doc_id.clone()).or_default().insert(
                    block.text,
                    (normalize_answer(&top.kb_id), entity_type.to_string()),
                );
            }
        }
    }

    Ok(linked)
}

/// Write one `<doc_id>.json` per document into the run's results directory.
pub async fn write_results(layout: &RunLayout, linked: &LinkedEntities) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(linked.len());

    for (doc_id, doc_results) in linked {
        let path = layout.doc_results_path(doc_id);
        let json = serde_json::to_string(doc_results)
            .context(format!("Failed to serialize results of {}", doc_id))?;
        tokio::fs::write(&path, json)
            .await
            .context(format!("Failed to write results file: {:?}", path))?;
        written.push(path);
    }

    info!(dir = ?layout.results_dir(), documents = written.len(), "Wrote results");
    Ok(written)
}
