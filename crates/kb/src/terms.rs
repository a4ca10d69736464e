//! Lexical forms of KB names and synonyms.

use regex::Regex;
use std::sync::LazyLock;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid regex"));

/// Lowercase, strip punctuation and sort the whitespace-separated tokens.
pub fn sorted_tokens(text: &str) -> String {
    let lowered = text.to_lowercase();
    let cleaned = NON_ALPHANUMERIC.replace_all(&lowered, " ");

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// A dictionary string together with its token-sorted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub text: String,
    pub sorted_tokens: String,
}

impl Term {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let sorted_tokens = sorted_tokens(&text);
        Self {
            text,
            sorted_tokens,
        }
    }
}

/// Terms ordered by text, so fuzzy ties resolve lexically.
pub fn sorted_terms<'a>(texts: impl Iterator<Item = &'a String>) -> Vec<Term> {
    let mut terms: Vec<Term> = texts.map(|text| Term::new(text.as_str())).collect();
    terms.sort_by(|a, b| a.text.cmp(&b.text));
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_tokens() {
        assert_eq!(sorted_tokens("Heart-Failure, Acute"), "acute failure heart");
        assert_eq!(sorted_tokens("  "), "");
        assert_eq!(sorted_tokens("BRCA1"), "brca1");
    }

    #[test]
    fn test_terms_sorted_by_text() {
        let texts = vec!["fever".to_string(), "Cough Syndrome".to_string()];
        let terms = sorted_terms(texts.iter());

        assert_eq!(terms[0].text, "Cough Syndrome");
        assert_eq!(terms[0].sorted_tokens, "cough syndrome");
        assert_eq!(terms[1], Term::new("fever"));
    }
}
