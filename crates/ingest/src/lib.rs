pub mod abbreviations;
pub mod entity_type;
pub mod mention;
pub mod reader;

pub use abbreviations::{Abbreviations, DocAbbreviations};
pub use entity_type::EntityType;
pub use mention::{Document, Mention};
pub use reader::AnnotationReader;

use anyhow::Result;
use std::path::Path;

/// Read all NER output documents from a directory
pub async fn ingest_directory(ner_dir: &Path) -> Result<Vec<Document>> {
    AnnotationReader::read_directory(ner_dir).await
}
