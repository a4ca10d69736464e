use anyhow::Result;
use std::collections::{HashMap, HashSet};
use tracing::trace;

use ingest::DocAbbreviations;
use kb::{KbIndex, KbProfile};

use crate::cache::MatchCache;
use crate::fuzzy;
use crate::schema::CandidateMatch;

const PERFECT_SCORE: f64 = 100.0;

/// Matches returned for one mention, and whether the cache gained an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub matches: Vec<CandidateMatch>,
    pub cache_dirty: bool,
}

/// Maps mention strings to KB names and synonyms by exact lookup, then by
/// token-sort similarity.
pub struct CandidateMatcher<'a> {
    index: &'a KbIndex,
    profile: &'a KbProfile,
}

impl<'a> CandidateMatcher<'a> {
    pub fn new(index: &'a KbIndex, profile: &'a KbProfile) -> Self {
        Self { index, profile }
    }

    pub fn match_mention(
        &self,
        mention_text: &str,
        abbreviations: &DocAbbreviations<'_>,
        cache: &MatchCache,
    ) -> Result<MatchOutcome> {
        let text = abbreviations.expand(mention_text);

        if let Some(matches) = cache.get(text) {
            trace!(mention = text, "Cache hit");
            return Ok(MatchOutcome {
                matches,
                cache_dirty: false,
            });
        }

        let matches = self.lookup(text)?;
        cache.insert(text, matches.clone());

        Ok(MatchOutcome {
            matches,
            cache_dirty: true,
        })
    }

    fn lookup(&self, text: &str) -> Result<Vec<CandidateMatch>> {
        if self.index.is_name(text) {
            return Ok(vec![CandidateMatch::name(text, 1.0)]);
        }

        if self.index.is_synonym(text) {
            return Ok(vec![CandidateMatch::synonym(text, 1.0)]);
        }

        self.fuzzy_lookup(text)
    }

    fn fuzzy_lookup(&self, text: &str) -> Result<Vec<CandidateMatch>> {
        if self.index.names().is_empty() {
            anyhow::bail!(
                "Cannot match {:?}: knowledge base {} has no names loaded",
                text,
                self.profile.name
            );
        }

        let limit = self.profile.fuzzy_limit;
        let top_names = fuzzy::extract(text, self.index.names(), limit);

        let (best_name, best_score) = top_names[0];
        if best_score >= PERFECT_SCORE {
            return Ok(vec![CandidateMatch::name(best_name, 1.0)]);
        }

        let worst_name_score = top_names[top_names.len() - 1].1;
        let mut merged: Vec<CandidateMatch> = top_names
            .iter()
            .map(|(name, score)| CandidateMatch::name(name, score / 100.0))
            .collect();

        for (synonym, score) in fuzzy::extract(text, self.index.synonyms(), limit) {
            if score >= PERFECT_SCORE {
                // An exact synonym outranks every fuzzy name
                return Ok(vec![CandidateMatch::synonym(synonym, 1.0)]);
            }
            if score >= worst_name_score {
                merged.push(CandidateMatch::synonym(synonym, score / 100.0));
            }
        }

        Ok(self.dedup_by_kb_id(merged))
    }

    /// Keep the best-scoring match of each KB concept. Order is left as
    /// merged, names first, since the gene answer is the first candidate.
    fn dedup_by_kb_id(&self, matches: Vec<CandidateMatch>) -> Vec<CandidateMatch> {
        let mut best: HashMap<String, f64> = HashMap::new();
        for m in &matches {
            if let Some(kb_id) = m.resolve_kb_id(self.index) {
                let score = best.entry(kb_id.to_string()).or_insert(m.match_score);
                *score = score.max(m.match_score);
            }
        }

        let mut kept: HashSet<String> = HashSet::new();
        matches
            .into_iter()
            .filter(|m| match m.resolve_kb_id(self.index) {
                Some(kb_id) => best[kb_id] == m.match_score && kept.insert(kb_id.to_string()),
                None => true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest::Abbreviations;
    use kb::KbEdges;
    use std::collections::HashMap;

    fn index(names: &[(&str, &str)], synonyms: &[(&str, &str)]) -> KbIndex {
        let to_map = |pairs: &[(&str, &str)]| -> HashMap<String, String> {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };
        KbIndex::new(to_map(names), to_map(synonyms), HashMap::new(), KbEdges::new())
    }

    fn medic() -> KbProfile {
        KbProfile::lookup("medic").unwrap()
    }

    #[test]
    fn test_exact_name_match() {
        let index = index(
            &[("fever", "D1"), ("fevers", "D2"), ("hay fever", "D3")],
            &[("fever", "D9")],
        );
        let profile = medic();
        let matcher = CandidateMatcher::new(&index, &profile);
        let cache = MatchCache::new();

        let outcome = matcher
            .match_mention("fever", &DocAbbreviations::none(), &cache)
            .unwrap();

        assert_eq!(outcome.matches, vec![CandidateMatch::name("fever", 1.0)]);
        assert!(!outcome.matches[0].is_synonym());
        assert!(outcome.cache_dirty);
    }

    #[test]
    fn test_exact_synonym_match() {
        let index = index(&[("fever", "D1")], &[("pyrexia", "D1")]);
        let profile = medic();
        let matcher = CandidateMatcher::new(&index, &profile);

        let outcome = matcher
            .match_mention("pyrexia", &DocAbbreviations::none(), &MatchCache::new())
            .unwrap();

        assert_eq!(outcome.matches.len(), 1);
        assert!(outcome.matches[0].is_synonym());
        assert_eq!(outcome.matches[0].match_score, 1.0);
    }

    #[test]
    fn test_second_lookup_hits_cache() {
        let index = index(&[("palpitation", "D1"), ("tachycardia", "D2")], &[]);
        let profile = medic();
        let matcher = CandidateMatcher::new(&index, &profile);
        let cache = MatchCache::new();
        let abbreviations = DocAbbreviations::none();

        let first = matcher.match_mention("palpitations", &abbreviations, &cache).unwrap();
        let second = matcher.match_mention("palpitations", &abbreviations, &cache).unwrap();

        assert!(first.cache_dirty);
        assert!(!second.cache_dirty);
        assert_eq!(first.matches, second.matches);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_fuzzy_single_name() {
        let index = index(&[("palpitation", "D1")], &[]);
        let profile = medic();
        let matcher = CandidateMatcher::new(&index, &profile);

        let outcome = matcher
            .match_mention("arrhythmic palpitation", &DocAbbreviations::none(), &MatchCache::new())
            .unwrap();

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].name, "palpitation");
        assert!(outcome.matches[0].match_score < 1.0);
        assert!(outcome.matches[0].match_score > 0.0);
    }

    #[test]
    fn test_exact_synonym_after_processing_overrides_names() {
        // Case differs, so no exact lookup hit; the fuzzy synonym scores 100
        let index = index(
            &[("heart attack", "D1"), ("heart disease", "D2")],
            &[("Myocardial Infarction", "D1")],
        );
        let profile = medic();
        let matcher = CandidateMatcher::new(&index, &profile);

        let outcome = matcher
            .match_mention("myocardial infarction", &DocAbbreviations::none(), &MatchCache::new())
            .unwrap();

        assert_eq!(
            outcome.matches,
            vec![CandidateMatch::synonym("Myocardial Infarction", 1.0)]
        );
    }

    #[test]
    fn test_fuzzy_name_at_100_keeps_only_that_name() {
        let index = index(&[("Fever", "D1"), ("fevers", "D2")], &[]);
        let profile = medic();
        let matcher = CandidateMatcher::new(&index, &profile);

        let outcome = matcher
            .match_mention("fever", &DocAbbreviations::none(), &MatchCache::new())
            .unwrap();

        assert_eq!(outcome.matches, vec![CandidateMatch::name("Fever", 1.0)]);
    }

    #[test]
    fn test_synonyms_merged_when_tying_worst_name() {
        let index = index(
            &[("renal failure", "D1"), ("liver failure", "D2")],
            &[("kidney failure", "D1"), ("heart failure", "D3"), ("cough", "D4")],
        );
        let profile = medic();
        let matcher = CandidateMatcher::new(&index, &profile);

        let outcome = matcher
            .match_mention("kidney failures", &DocAbbreviations::none(), &MatchCache::new())
            .unwrap();

        let names: Vec<&str> = outcome.matches.iter().map(|m| m.name.as_str()).collect();
        // Fuzzy names keep their place ahead of merged synonyms. "kidney failure"
        // is D1 like "renal failure" and outscores it, so it replaces it.
        assert_eq!(names[0], "liver failure");
        assert_eq!(names[1], "kidney failure");
        assert!(outcome.matches[1].is_synonym());
        assert!(!names.contains(&"renal failure"));
        assert!(!names.contains(&"cough"));
    }

    #[test]
    fn test_gene_kb_keeps_single_best() {
        let index = index(&[("BRCA1", "G1"), ("BRCA2", "G2"), ("BRCC3", "G3")], &[]);
        let profile = KbProfile::lookup("ncbi_gene").unwrap();
        let matcher = CandidateMatcher::new(&index, &profile);

        let outcome = matcher
            .match_mention("brca-1", &DocAbbreviations::none(), &MatchCache::new())
            .unwrap();

        assert_eq!(outcome.matches.len(), 1);
    }

    #[test]
    fn test_gene_name_stays_ahead_of_better_synonym() {
        let index = index(&[("BRCA2", "G2")], &[("BRCA1", "G1")]);
        let profile = KbProfile::lookup("ncbi_gene").unwrap();
        let matcher = CandidateMatcher::new(&index, &profile);

        let outcome = matcher
            .match_mention("BRCA1 protein", &DocAbbreviations::none(), &MatchCache::new())
            .unwrap();

        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.matches[0].name, "BRCA2");
        assert!(!outcome.matches[0].is_synonym());
        assert_eq!(outcome.matches[1].name, "BRCA1");
        assert!(outcome.matches[1].match_score > outcome.matches[0].match_score);
    }

    #[test]
    fn test_abbreviation_expanded_before_lookup() {
        let index = index(&[("myocardial infarction", "D1")], &[]);
        let profile = medic();
        let matcher = CandidateMatcher::new(&index, &profile);
        let cache = MatchCache::new();

        let mut abbreviations = Abbreviations::new();
        abbreviations.insert("doc1", "MI", "myocardial infarction");

        let outcome = matcher
            .match_mention("MI", &abbreviations.for_doc("doc1"), &cache)
            .unwrap();

        assert_eq!(outcome.matches[0].match_score, 1.0);
        assert!(cache.get("myocardial infarction").is_some());
        assert!(cache.get("MI").is_none());
    }

    #[test]
    fn test_empty_kb_is_error() {
        let index = index(&[], &[]);
        let profile = medic();
        let matcher = CandidateMatcher::new(&index, &profile);

        assert!(matcher
            .match_mention("fever", &DocAbbreviations::none(), &MatchCache::new())
            .is_err());
    }
}
