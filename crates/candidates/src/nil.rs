use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::retry::RetryPolicy;
use crate::schema::CandidateMatch;

/// One ranked prediction of a neural linker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkerPrediction {
    pub kb_id: String,
    pub name: String,
}

/// A model proposing KB concepts for mentions with no lexical candidate.
#[async_trait]
pub trait NilLinker: Send + Sync {
    async fn predict(&self, mention_text: &str) -> Result<Vec<LinkerPrediction>>;
}

/// `CHEBI:1234` -> `CHEBI_1234`, the id form used in candidate files.
pub fn normalize_kb_id(kb_id: &str) -> String {
    kb_id.replace(':', "_")
}

/// Ask the linker for candidates, trusting its output as exact matches.
pub async fn dispatch(mention_text: &str, linker: &dyn NilLinker) -> Result<Vec<CandidateMatch>> {
    let predictions = linker
        .predict(mention_text)
        .await
        .context(format!("NIL linker failed for mention {:?}", mention_text))?;

    debug!(mention = mention_text, predictions = predictions.len(), "NIL linker predictions");

    Ok(predictions
        .into_iter()
        .map(|p| CandidateMatch::linker(normalize_kb_id(&p.kb_id), p.name))
        .collect())
}

/// Client for a NIL linker served over HTTP.
#[derive(Clone)]
pub struct HttpNilLinker {
    base_url: String,
    kb: String,
    top_k: usize,
    retry: RetryPolicy,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    kb: &'a str,
    mention: &'a str,
    top_k: usize,
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<LinkerPrediction>,
}

impl HttpNilLinker {
    pub fn new(base_url: String, kb: String, top_k: usize, retry: RetryPolicy) -> Self {
        Self {
            base_url,
            kb,
            top_k,
            retry,
            client: reqwest::Client::new(),
        }
    }

    async fn request(&self, mention_text: &str) -> Result<Vec<LinkerPrediction>> {
        let url = format!("{}/predict", self.base_url.trim_end_matches('/'));

        let request = PredictRequest {
            kb: &self.kb,
            mention: mention_text,
            top_k: self.top_k,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to NIL linker")?;

        if !response.status().is_success() {
            anyhow::bail!("NIL linker request failed: {}", response.status());
        }

        let predict_response: PredictResponse = response
            .json()
            .await
            .context("Failed to parse NIL linker response")?;

        let mut predictions = predict_response.predictions;
        predictions.truncate(self.top_k);
        Ok(predictions)
    }
}

#[async_trait]
impl NilLinker for HttpNilLinker {
    async fn predict(&self, mention_text: &str) -> Result<Vec<LinkerPrediction>> {
        self.retry
            .retry("nil_linker", || self.request(mention_text))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MatchOrigin;

    struct FixedLinker(Vec<LinkerPrediction>);

    #[async_trait]
    impl NilLinker for FixedLinker {
        async fn predict(&self, _mention_text: &str) -> Result<Vec<LinkerPrediction>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_normalize_kb_id() {
        assert_eq!(normalize_kb_id("CHEBI:15365"), "CHEBI_15365");
        assert_eq!(normalize_kb_id("HP_0001945"), "HP_0001945");
    }

    #[tokio::test]
    async fn test_dispatch_trusts_predictions() {
        let linker = FixedLinker(vec![LinkerPrediction {
            kb_id: "CHEBI:15365".to_string(),
            name: "acetylsalicylic acid".to_string(),
        }]);

        let matches = dispatch("asa tablets", &linker).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].match_score, 1.0);
        assert_eq!(
            matches[0].origin,
            MatchOrigin::Linker {
                kb_id: "CHEBI_15365".to_string()
            }
        );
    }
}
