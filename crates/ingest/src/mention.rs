use serde::{Deserialize, Serialize};

/// A recognized entity span awaiting disambiguation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mention {
    pub text: String,
    pub normalized_text: String,
    pub entity_type: String,
    pub doc_id: String,
    /// Zero when the annotation source carries no sentence boundaries (brat).
    pub sentence_index: usize,
}

impl Mention {
    pub fn new(
        text: String,
        entity_type: String,
        doc_id: String,
        sentence_index: usize,
    ) -> Self {
        let normalized_text = text.to_lowercase();

        Self {
            text,
            normalized_text,
            entity_type,
            doc_id,
            sentence_index,
        }
    }

    /// Entity types are compared case-insensitively ("Disease" == "disease")
    pub fn is_of_type(&self, entity_type: &str) -> bool {
        self.entity_type.eq_ignore_ascii_case(entity_type)
    }
}

/// All mentions recognized in one document, in source order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub mentions: Vec<Mention>,
}

impl Document {
    pub fn new(doc_id: String, mentions: Vec<Mention>) -> Self {
        Self { doc_id, mentions }
    }

    /// Mentions of the given type, keeping only the first occurrence of
    /// each surface form.
    pub fn unique_mentions(&self, entity_type: &str) -> Vec<&Mention> {
        let mut seen: Vec<&str> = Vec::new();
        let mut unique = Vec::new();

        for mention in &self.mentions {
            if !mention.is_of_type(entity_type) || seen.contains(&mention.text.as_str()) {
                continue;
            }
            seen.push(&mention.text);
            unique.push(mention);
        }

        unique
    }
}
