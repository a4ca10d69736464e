use anyhow::Result;
use serde::Serialize;

/// Knowledge bases with preprocessed dictionaries.
pub const KNOWN_KBS: [&str; 14] = [
    "medic",
    "do",
    "chebi",
    "ctd_chem",
    "ncbi_gene",
    "ctd_gene",
    "go_bp",
    "go_cc",
    "ncbi_taxon",
    "uberon",
    "ctd_anat",
    "cellosaurus",
    "cell_ontology",
    "hp",
];

/// KBs served by the neural NIL linker.
pub const NIL_LINKER_KBS: [&str; 4] = ["chebi", "medic", "go_bp", "hp"];

const GENE_KB: &str = "ncbi_gene";
const DEFAULT_FUZZY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum KbKind {
    StandardOntology,
    /// Very large flat vocabulary, disambiguated on lexical score alone.
    GeneKb,
}

/// Per-KB behaviour, resolved once when a run is planned.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KbProfile {
    pub name: String,
    pub kind: KbKind,
    /// Candidate links are left empty in the candidate files.
    pub skip_graph_linking: bool,
    /// How many fuzzy matches to keep per lookup.
    pub fuzzy_limit: usize,
    /// Whether the external PPR ranker is invoked for this KB.
    pub uses_ranker: bool,
    /// Whether `id_to_info.json` and `node_to_node.json` exist for this KB.
    pub has_structure: bool,
    pub nil_linker_available: bool,
}

impl KbProfile {
    pub fn lookup(kb: &str) -> Result<Self> {
        if !KNOWN_KBS.contains(&kb) {
            anyhow::bail!(
                "{} is an invalid knowledge base! Options: {}",
                kb,
                KNOWN_KBS.join(", ")
            );
        }

        let nil_linker_available = NIL_LINKER_KBS.contains(&kb);

        if kb == GENE_KB {
            return Ok(Self {
                name: kb.to_string(),
                kind: KbKind::GeneKb,
                skip_graph_linking: true,
                fuzzy_limit: 1,
                uses_ranker: false,
                has_structure: false,
                nil_linker_available,
            });
        }

        Ok(Self {
            name: kb.to_string(),
            kind: KbKind::StandardOntology,
            skip_graph_linking: false,
            fuzzy_limit: DEFAULT_FUZZY_LIMIT,
            uses_ranker: true,
            has_structure: true,
            nil_linker_available,
        })
    }

    pub fn is_gene_kb(&self) -> bool {
        self.kind == KbKind::GeneKb
    }
}
