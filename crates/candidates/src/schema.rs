use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use kb::KbIndex;

/// Identifier of the placeholder candidate given to unlinked mentions.
pub const NIL_KB_ID: &str = "NIL";

/// Where a match came from, which decides how its KB id is resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrigin {
    Name,
    Synonym,
    /// Predicted by the NIL linker, which supplies the id directly.
    Linker { kb_id: String },
}

/// Raw matcher output for one KB string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateMatch {
    pub name: String,
    /// In `[0, 1]`; `1.0` is an exact match.
    pub match_score: f64,
    pub origin: MatchOrigin,
}

impl CandidateMatch {
    pub fn name(name: &str, match_score: f64) -> Self {
        Self {
            name: name.to_string(),
            match_score,
            origin: MatchOrigin::Name,
        }
    }

    pub fn synonym(synonym: &str, match_score: f64) -> Self {
        Self {
            name: synonym.to_string(),
            match_score,
            origin: MatchOrigin::Synonym,
        }
    }

    pub fn linker(kb_id: String, name: String) -> Self {
        Self {
            name,
            match_score: 1.0,
            origin: MatchOrigin::Linker { kb_id },
        }
    }

    pub fn is_synonym(&self) -> bool {
        self.origin == MatchOrigin::Synonym
    }

    pub fn resolve_kb_id<'a>(&'a self, index: &'a KbIndex) -> Option<&'a str> {
        match &self.origin {
            MatchOrigin::Name => index.id_for_name(&self.name),
            MatchOrigin::Synonym => index.id_for_synonym(&self.name),
            MatchOrigin::Linker { kb_id } => Some(kb_id.as_str()),
        }
    }
}

/// A match enriched with the data the disambiguation graph needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub kb_id: String,
    pub name: String,
    pub match_score: f64,
    pub out_degree: u32,
    pub in_degree: u32,
    /// Graph node id, unique per distinct `kb_id` within one document.
    pub numeric_id: i64,
    pub links: BTreeSet<i64>,
}

impl Candidate {
    /// Placeholder row for a mention nothing could be linked to.
    pub fn nil() -> Self {
        Self {
            kb_id: NIL_KB_ID.to_string(),
            name: "none".to_string(),
            match_score: 0.0,
            out_degree: 0,
            in_degree: 0,
            numeric_id: -1,
            links: BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kb::KbEdges;
    use std::collections::HashMap;

    #[test]
    fn test_resolve_kb_id_by_origin() {
        let index = KbIndex::new(
            HashMap::from([("fever".to_string(), "D1".to_string())]),
            HashMap::from([("pyrexia".to_string(), "D1".to_string())]),
            HashMap::new(),
            KbEdges::new(),
        );

        assert_eq!(CandidateMatch::name("fever", 1.0).resolve_kb_id(&index), Some("D1"));
        assert_eq!(CandidateMatch::synonym("pyrexia", 1.0).resolve_kb_id(&index), Some("D1"));
        assert_eq!(CandidateMatch::name("pyrexia", 1.0).resolve_kb_id(&index), None);

        let predicted = CandidateMatch::linker("HP_0001945".to_string(), "Fever".to_string());
        assert_eq!(predicted.resolve_kb_id(&index), Some("HP_0001945"));
        assert_eq!(predicted.match_score, 1.0);
    }

    #[test]
    fn test_nil_candidate() {
        let nil = Candidate::nil();
        assert_eq!(nil.kb_id, NIL_KB_ID);
        assert_eq!(nil.numeric_id, -1);
        assert_eq!(nil.match_score, 0.0);
        assert_eq!((nil.out_degree, nil.in_degree), (0, 0));
    }
}
