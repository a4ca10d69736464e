use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Abbreviations detected per document: `doc_id -> {abbreviation: long_form}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Abbreviations {
    docs: HashMap<String, HashMap<String, String>>,
}

impl Abbreviations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(docs: HashMap<String, HashMap<String, String>>) -> Self {
        Self { docs }
    }

    /// Load the abbreviation detector output (JSON).
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .context(format!("Failed to read abbreviations file: {:?}", path))?;

        serde_json::from_str(&content).context("Failed to parse abbreviations file")
    }

    pub fn insert(&mut self, doc_id: &str, abbreviation: &str, long_form: &str) {
        self.docs
            .entry(doc_id.to_string())
            .or_default()
            .insert(abbreviation.to_string(), long_form.to_string());
    }

    pub fn for_doc(&self, doc_id: &str) -> DocAbbreviations<'_> {
        DocAbbreviations {
            map: self.docs.get(doc_id),
        }
    }
}

/// Abbreviations of a single document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocAbbreviations<'a> {
    map: Option<&'a HashMap<String, String>>,
}

impl<'a> DocAbbreviations<'a> {
    pub fn none() -> Self {
        Self { map: None }
    }

    /// The long form of `text` if it is a known abbreviation, else `text`.
    pub fn expand<'s>(&'s self, text: &'s str) -> &'s str {
        self.map
            .and_then(|m| m.get(text))
            .map(String::as_str)
            .unwrap_or(text)
    }
}
