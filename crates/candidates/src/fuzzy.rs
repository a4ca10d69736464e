//! Token-order-insensitive string similarity.
//!
//! Scores are on a 0-100 scale: the normalized indel similarity of both
//! strings after lowercasing, replacing non-alphanumeric characters with
//! spaces and sorting the tokens.

use rapidfuzz::fuzz;

use kb::{Term, sorted_tokens};

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let (a, b) = (sorted_tokens(a), sorted_tokens(b));
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    fuzz::ratio(a.chars(), b.chars()) * 100.0
}

/// Best `limit` terms for `query`, highest score first.
///
/// Terms are scored on their precomputed sorted tokens. Ties keep the
/// order of `choices`.
pub fn extract<'c>(query: &str, choices: &'c [Term], limit: usize) -> Vec<(&'c str, f64)> {
    let query = sorted_tokens(query);
    let scorer = fuzz::RatioBatchComparator::new(query.chars());

    let mut top: Vec<(&str, f64)> = Vec::with_capacity(limit + 1);
    for term in choices {
        let score = if query.is_empty() || term.sorted_tokens.is_empty() {
            0.0
        } else {
            scorer.similarity(term.sorted_tokens.chars()) * 100.0
        };

        if top.len() == limit && top.last().is_some_and(|(_, worst)| score <= *worst) {
            continue;
        }
        let position = top.partition_point(|(_, kept)| *kept >= score);
        top.insert(position, (term.text.as_str(), score));
        top.truncate(limit);
    }

    top
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(texts: &[&str]) -> Vec<Term> {
        texts.iter().map(|t| Term::new(*t)).collect()
    }

    #[test]
    fn test_token_order_is_ignored() {
        assert_eq!(token_sort_ratio("heart failure", "failure heart"), 100.0);
        assert_eq!(token_sort_ratio("Heart-Failure", "heart failure"), 100.0);
    }

    #[test]
    fn test_partial_overlap() {
        let score = token_sort_ratio("arrhythmic palpitation", "palpitation");
        assert!((score - 200.0 * 11.0 / 33.0).abs() < 1e-6);
        assert!(score < 100.0);
    }

    #[test]
    fn test_empty_strings_score_zero() {
        assert_eq!(token_sort_ratio("", "fever"), 0.0);
        assert_eq!(token_sort_ratio("!!", "fever"), 0.0);
    }

    #[test]
    fn test_extract_orders_and_limits() {
        let choices = terms(&["cough", "fever", "fevers", "hay fever"]);

        let top = extract("fever", &choices, 2);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0], ("fever", 100.0));
        assert_eq!(top[1].0, "fevers");
    }

    #[test]
    fn test_extract_ties_keep_input_order() {
        let choices = terms(&["abe", "abd"]);
        let top = extract("abc", &choices, 10);
        assert_eq!(top[0].1, top[1].1);
        assert_eq!(top[0].0, "abe");
        assert_eq!(top[1].0, "abd");
    }

    #[test]
    fn test_extract_scores_precomputed_tokens() {
        // Only the sorted form matches, so the raw text is never rescored
        let choices = vec![Term {
            text: "unrelated label".to_string(),
            sorted_tokens: "failure heart".to_string(),
        }];

        let top = extract("Heart failure", &choices, 1);

        assert_eq!(top, vec![("unrelated label", 100.0)]);
    }

    #[test]
    fn test_extract_matches_pairwise_ratio() {
        let choices = terms(&["palpitation", "tachycardia", "arrhythmia"]);

        for (text, score) in extract("arrhythmic palpitation", &choices, 3) {
            let expected = token_sort_ratio("arrhythmic palpitation", text);
            assert!((score - expected).abs() < 1e-9, "{text}: {score} != {expected}");
        }
    }
}
