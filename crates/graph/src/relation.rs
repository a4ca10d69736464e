use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use kb::{ExtractedRelations, KbEdges};

/// Which sources decide that two candidates are linked.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// KB ontology edges only
    Kb,
    /// Corpus-mined relations only
    Corpus,
    /// KB edges, falling back to corpus relations
    #[default]
    KbCorpus,
}

impl LinkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkMode::Kb => "kb",
            LinkMode::Corpus => "corpus",
            LinkMode::KbCorpus => "kb_corpus",
        }
    }

    pub fn uses_corpus(&self) -> bool {
        matches!(self, LinkMode::Corpus | LinkMode::KbCorpus)
    }
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kb" => Ok(LinkMode::Kb),
            "corpus" => Ok(LinkMode::Corpus),
            "kb_corpus" => Ok(LinkMode::KbCorpus),
            _ => anyhow::bail!("Invalid link mode {:?}! Options: kb, corpus, kb_corpus", s),
        }
    }
}

pub struct RelationResolver<'a> {
    mode: LinkMode,
    relations: &'a ExtractedRelations,
    edges: &'a KbEdges,
}

impl<'a> RelationResolver<'a> {
    pub fn new(mode: LinkMode, relations: &'a ExtractedRelations, edges: &'a KbEdges) -> Self {
        Self {
            mode,
            relations,
            edges,
        }
    }

    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    /// Whether `a` links to `b`. Corpus lookups go in the `a -> b` direction
    /// only; KB lookups check both.
    pub fn related(&self, a: &str, b: &str) -> bool {
        match self.mode {
            LinkMode::Corpus => self.relations.contains(a, b),
            LinkMode::Kb => self.kb_related(a, b),
            LinkMode::KbCorpus => self.kb_related(a, b) || self.relations.contains(a, b),
        }
    }

    fn kb_related(&self, a: &str, b: &str) -> bool {
        a == b || self.edges.contains(a, b) || self.edges.contains(b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn relations() -> ExtractedRelations {
        ExtractedRelations::from_map(HashMap::from([(
            "ID_01".to_string(),
            vec!["ID_02".to_string()],
        )]))
    }

    #[test]
    fn test_corpus_mode_is_directed() {
        let relations = relations();
        let edges = KbEdges::new();
        let resolver = RelationResolver::new(LinkMode::Corpus, &relations, &edges);

        assert!(resolver.related("ID_01", "ID_02"));
        assert!(!resolver.related("ID_02", "ID_01"));
        assert!(!resolver.related("ID_01", "ID_01"));
    }

    #[test]
    fn test_self_links_in_kb_modes() {
        let relations = ExtractedRelations::new();
        let edges = KbEdges::new();

        for mode in [LinkMode::Kb, LinkMode::KbCorpus] {
            let resolver = RelationResolver::new(mode, &relations, &edges);
            assert!(resolver.related("ID_07", "ID_07"));
        }
    }

    #[test]
    fn test_kb_mode_ignores_corpus() {
        let relations = relations();
        let edges = KbEdges::from_directed(vec![("ID_04", "ID_05")]);
        let resolver = RelationResolver::new(LinkMode::Kb, &relations, &edges);

        assert!(resolver.related("ID_04", "ID_05"));
        assert!(resolver.related("ID_05", "ID_04"));
        assert!(!resolver.related("ID_01", "ID_02"));
    }

    #[test]
    fn test_kb_corpus_falls_back_to_corpus() {
        let relations = relations();
        let edges = KbEdges::from_directed(vec![("ID_04", "ID_05")]);
        let resolver = RelationResolver::new(LinkMode::KbCorpus, &relations, &edges);

        assert!(resolver.related("ID_04", "ID_05"));
        assert!(resolver.related("ID_01", "ID_02"));
        assert!(!resolver.related("ID_02", "ID_04"));
    }

    #[test]
    fn test_parse_link_mode() {
        assert_eq!("kb_corpus".parse::<LinkMode>().unwrap(), LinkMode::KbCorpus);
        assert!("graph".parse::<LinkMode>().is_err());
    }
}
