use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::terms::{Term, sorted_terms};

/// Structural facts about a KB concept, stored as `[out, in, descendants]`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "(u32, u32, u32)", into = "(u32, u32, u32)")]
pub struct ConceptInfo {
    pub out_degree: u32,
    pub in_degree: u32,
    pub descendant_count: u32,
}

impl From<(u32, u32, u32)> for ConceptInfo {
    fn from((out_degree, in_degree, descendant_count): (u32, u32, u32)) -> Self {
        Self {
            out_degree,
            in_degree,
            descendant_count,
        }
    }
}

impl From<ConceptInfo> for (u32, u32, u32) {
    fn from(info: ConceptInfo) -> Self {
        (info.out_degree, info.in_degree, info.descendant_count)
    }
}

/// Undirected KB adjacency: every directed ontology edge is stored both ways.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KbEdges {
    adjacency: HashMap<String, Vec<String>>,
}

impl KbEdges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_directed<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut kb_edges = Self::new();
        for (source, target) in edges {
            kb_edges.add_edge(source.into(), target.into());
        }
        kb_edges
    }

    pub fn add_edge(&mut self, source: String, target: String) {
        self.adjacency
            .entry(source.clone())
            .or_default()
            .push(target.clone());
        self.adjacency.entry(target).or_default().push(source);
    }

    pub fn neighbors(&self, kb_id: &str) -> &[String] {
        self.adjacency
            .get(kb_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, source: &str, target: &str) -> bool {
        self.neighbors(source).iter().any(|n| n == target)
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

/// Read-only lookup tables of one knowledge base.
#[derive(Debug, Clone, Default)]
pub struct KbIndex {
    name_to_id: HashMap<String, String>,
    synonym_to_id: HashMap<String, String>,
    id_to_info: HashMap<String, ConceptInfo>,
    edges: KbEdges,
    // Token-sorted once here, scored on every fuzzy lookup
    names: Vec<Term>,
    synonyms: Vec<Term>,
}

impl KbIndex {
    pub fn new(
        name_to_id: HashMap<String, String>,
        synonym_to_id: HashMap<String, String>,
        id_to_info: HashMap<String, ConceptInfo>,
        edges: KbEdges,
    ) -> Self {
        let names = sorted_terms(name_to_id.keys());
        let synonyms = sorted_terms(synonym_to_id.keys());

        Self {
            name_to_id,
            synonym_to_id,
            id_to_info,
            edges,
            names,
            synonyms,
        }
    }

    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.name_to_id.get(name).map(String::as_str)
    }

    pub fn id_for_synonym(&self, synonym: &str) -> Option<&str> {
        self.synonym_to_id.get(synonym).map(String::as_str)
    }

    pub fn is_name(&self, text: &str) -> bool {
        self.name_to_id.contains_key(text)
    }

    pub fn is_synonym(&self, text: &str) -> bool {
        self.synonym_to_id.contains_key(text)
    }

    pub fn names(&self) -> &[Term] {
        &self.names
    }

    pub fn synonyms(&self) -> &[Term] {
        &self.synonyms
    }

    pub fn concept_info(&self, kb_id: &str) -> Option<&ConceptInfo> {
        self.id_to_info.get(kb_id)
    }

    pub fn total_concepts(&self) -> usize {
        self.id_to_info.len()
    }

    pub fn edges(&self) -> &KbEdges {
        &self.edges
    }

    pub fn stats(&self) -> KbStats {
        KbStats {
            names: self.name_to_id.len(),
            synonyms: self.synonym_to_id.len(),
            concepts: self.id_to_info.len(),
            connected_concepts: self.edges.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KbStats {
    pub names: usize,
    pub synonyms: usize,
    pub concepts: usize,
    pub connected_concepts: usize,
}
