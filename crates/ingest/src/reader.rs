use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::mention::{Document, Mention};

/// Reads NER output stored as brat standoff (`.ann`) files.
pub struct AnnotationReader;

impl AnnotationReader {
    pub async fn read_file(path: &Path) -> Result<Document> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        if extension != "ann" {
            anyhow::bail!("Unsupported annotation format: {}", extension);
        }

        let doc_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .context(format!("Invalid annotation file name: {:?}", path))?
            .to_string();

        let content = fs::read_to_string(path)
            .await
            .context(format!("Failed to read annotation file: {:?}", path))?;

        let mentions = parse_brat(&doc_id, &content)
            .context(format!("Failed to parse annotation file: {:?}", path))?;

        Ok(Document::new(doc_id, mentions))
    }

    /// Read every `.ann` file in `dir`, ordered by document id.
    pub async fn read_directory(dir: &Path) -> Result<Vec<Document>> {
        let mut documents = Vec::new();

        let mut entries = fs::read_dir(dir)
            .await
            .context(format!("Failed to read NER directory: {:?}", dir))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            if path.is_file() && path.extension().is_some_and(|ext| ext == "ann") {
                documents.push(Self::read_file(&path).await?);
            }
        }

        documents.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));
        debug!(dir = ?dir, documents = documents.len(), "Read NER annotations");

        Ok(documents)
    }
}

/// Parse text-bound (`T`) annotations; normalization lines and other
/// annotation kinds are skipped.
pub fn parse_brat(doc_id: &str, content: &str) -> Result<Vec<Mention>> {
    let mut mentions = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        if !line.starts_with('T') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            anyhow::bail!("Malformed annotation at line {}: {:?}", line_no + 1, line);
        }

        let entity_type = fields[1]
            .split(' ')
            .next()
            .filter(|t| !t.is_empty())
            .context(format!("Missing entity type at line {}", line_no + 1))?;

        mentions.push(Mention::new(
            fields[2].to_string(),
            entity_type.to_string(),
            doc_id.to_string(),
            0,
        ));
    }

    Ok(mentions)
}
