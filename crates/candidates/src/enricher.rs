use std::collections::{BTreeSet, HashMap};

use kb::KbIndex;

use crate::schema::{Candidate, CandidateMatch, NIL_KB_ID};

/// Hands out graph node ids for KB concepts within one document.
///
/// Ids are assigned on first sight, counting up from 1, so the same
/// document always gets the same ids.
#[derive(Debug)]
pub struct IdAllocator {
    ids: HashMap<String, i64>,
    next_id: i64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn id_for(&mut self, kb_id: &str) -> i64 {
        if let Some(&id) = self.ids.get(kb_id) {
            return id;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(kb_id.to_string(), id);
        id
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Turns raw matches into graph-ready candidates.
pub struct CandidateEnricher<'a> {
    index: &'a KbIndex,
    min_match_score: f64,
}

impl<'a> CandidateEnricher<'a> {
    pub fn new(index: &'a KbIndex, min_match_score: f64) -> Self {
        Self {
            index,
            min_match_score,
        }
    }

    /// Matches at or below the minimum score, or without a KB id, are dropped.
    pub fn enrich(
        &self,
        matches: &[CandidateMatch],
        allocator: &mut IdAllocator,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for candidate_match in matches {
            if candidate_match.match_score <= self.min_match_score {
                continue;
            }

            let Some(kb_id) = candidate_match.resolve_kb_id(self.index) else {
                continue;
            };
            if kb_id == NIL_KB_ID {
                continue;
            }

            let info = self.index.concept_info(kb_id).copied().unwrap_or_default();

            candidates.push(Candidate {
                kb_id: kb_id.to_string(),
                name: candidate_match.name.clone(),
                match_score: candidate_match.match_score,
                out_degree: info.out_degree,
                in_degree: info.in_degree,
                numeric_id: allocator.id_for(kb_id),
                links: BTreeSet::new(),
            });
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kb::{ConceptInfo, KbEdges};

    fn index() -> KbIndex {
        KbIndex::new(
            HashMap::from([
                ("palpitation".to_string(), "HP_0001962".to_string()),
                ("fever".to_string(), "HP_0001945".to_string()),
            ]),
            HashMap::from([("pyrexia".to_string(), "HP_0001945".to_string())]),
            HashMap::from([(
                "HP_0001962".to_string(),
                ConceptInfo {
                    out_degree: 3,
                    in_degree: 1,
                    descendant_count: 0,
                },
            )]),
            KbEdges::new(),
        )
    }

    #[test]
    fn test_allocator_reuses_ids() {
        let mut allocator = IdAllocator::new();
        let a = allocator.id_for("A");
        let b = allocator.id_for("B");

        assert_eq!(allocator.id_for("A"), a);
        assert_ne!(a, b);
        assert!(a > 0 && b > 0);
        assert_eq!(allocator.len(), 2);
    }

    #[test]
    fn test_enrich_fuzzy_match() {
        let index = index();
        let enricher = CandidateEnricher::new(&index, 0.0);
        let mut allocator = IdAllocator::new();

        let matches = [CandidateMatch::name("palpitation", 0.667)];
        let candidates = enricher.enrich(&matches, &mut allocator);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kb_id, "HP_0001962");
        assert_eq!(candidates[0].match_score, 0.667);
        assert_eq!((candidates[0].out_degree, candidates[0].in_degree), (3, 1));
        assert!(candidates[0].links.is_empty());
    }

    #[test]
    fn test_missing_info_defaults_to_zero_degrees() {
        let index = index();
        let enricher = CandidateEnricher::new(&index, 0.0);

        let matches = [CandidateMatch::synonym("pyrexia", 1.0)];
        let candidates = enricher.enrich(&matches, &mut IdAllocator::new());

        assert_eq!(candidates[0].kb_id, "HP_0001945");
        assert_eq!((candidates[0].out_degree, candidates[0].in_degree), (0, 0));
    }

    #[test]
    fn test_threshold_and_unresolvable_dropped() {
        let index = index();
        let enricher = CandidateEnricher::new(&index, 0.5);

        let candidates = enricher.enrich(
            &[
                CandidateMatch::name("fever", 0.5),
                CandidateMatch::name("not in kb", 0.9),
                CandidateMatch::linker(NIL_KB_ID.to_string(), "none".to_string()),
            ],
            &mut IdAllocator::new(),
        );

        assert!(candidates.is_empty());
    }

    #[test]
    fn test_same_concept_shares_id_across_mentions() {
        let index = index();
        let enricher = CandidateEnricher::new(&index, 0.0);
        let mut allocator = IdAllocator::new();

        let first = enricher.enrich(&[CandidateMatch::name("fever", 1.0)], &mut allocator);
        let second = enricher.enrich(&[CandidateMatch::synonym("pyrexia", 1.0)], &mut allocator);

        assert_eq!(first[0].numeric_id, second[0].numeric_id);
    }
}
