use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use candidates::Candidate;
use ingest::Mention;

use crate::relation::RelationResolver;

/// One mention and the candidates proposed for it.
#[derive(Debug, Clone)]
pub struct MentionCandidates {
    pub mention: Mention,
    pub candidates: Vec<Candidate>,
}

/// Every disambiguated mention of one document, in source order.
#[derive(Debug, Clone)]
pub struct DocumentCandidateSet {
    pub doc_id: String,
    /// 1-based position of the document in the run, written as `qid:Q<seq>`.
    pub seq: usize,
    pub entity_type: String,
    pub entries: Vec<MentionCandidates>,
}

impl DocumentCandidateSet {
    pub fn new(doc_id: String, seq: usize, entity_type: String) -> Self {
        Self {
            doc_id,
            seq,
            entity_type,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, mention: Mention, candidates: Vec<Candidate>) {
        self.entries.push(MentionCandidates {
            mention,
            candidates,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn candidate_count(&self) -> usize {
        self.entries.iter().map(|e| e.candidates.len()).sum()
    }
}

#[derive(Debug, Clone, Copy)]
struct CandidateNode {
    entry: usize,
    candidate: usize,
    numeric_id: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
}

/// Connects the candidates of different mentions of a document.
pub struct GraphBuilder<'a> {
    resolver: RelationResolver<'a>,
    skip_linking: bool,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(resolver: RelationResolver<'a>, skip_linking: bool) -> Self {
        Self {
            resolver,
            skip_linking,
        }
    }

    /// Fill every candidate's `links` with the ids of related candidates of
    /// the other mentions. NIL placeholders take part like any candidate, so
    /// two NIL mentions link to each other's id (-1) in KB modes.
    pub fn link(&self, set: &mut DocumentCandidateSet) -> GraphStats {
        for entry in &mut set.entries {
            for candidate in &mut entry.candidates {
                candidate.links.clear();
            }
        }

        if self.skip_linking {
            return GraphStats {
                nodes: set.candidate_count(),
                edges: 0,
            };
        }

        let mut graph: DiGraph<CandidateNode, ()> = DiGraph::new();
        let mut nodes: Vec<NodeIndex> = Vec::new();

        for (entry_idx, entry) in set.entries.iter().enumerate() {
            for (candidate_idx, candidate) in entry.candidates.iter().enumerate() {
                nodes.push(graph.add_node(CandidateNode {
                    entry: entry_idx,
                    candidate: candidate_idx,
                    numeric_id: candidate.numeric_id,
                }));
            }
        }

        for &source in &nodes {
            let from = graph[source];
            let from_kb_id = &set.entries[from.entry].candidates[from.candidate].kb_id;

            for &target in &nodes {
                let to = graph[target];
                if to.entry == from.entry {
                    continue;
                }

                let to_kb_id = &set.entries[to.entry].candidates[to.candidate].kb_id;
                if self.resolver.related(from_kb_id, to_kb_id) {
                    graph.add_edge(source, target, ());
                }
            }
        }

        for &node in &nodes {
            let from = graph[node];
            let links: BTreeSet<i64> = graph
                .neighbors(node)
                .map(|neighbor| graph[neighbor].numeric_id)
                .collect();
            set.entries[from.entry].candidates[from.candidate].links = links;
        }

        let stats = GraphStats {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
        };

        debug!(
            doc_id = %set.doc_id,
            mode = %self.resolver.mode(),
            nodes = stats.nodes,
            edges = stats.edges,
            "Built disambiguation graph"
        );

        stats
    }
}
