use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const RUN_ID_LEN: usize = 15;

/// A fresh run identifier: 15 uppercase alphanumerics followed by the entity
/// type, e.g. `3F9A0C1D2E4B5A6_disease`.
pub fn new_run_id(entity_type: &str) -> String {
    let id: String = Uuid::new_v4()
        .simple()
        .to_string()
        .to_uppercase()
        .chars()
        .take(RUN_ID_LEN)
        .collect();
    format!("{}_{}", id, entity_type)
}

/// On-disk locations used by one disambiguation run.
///
/// ```text
/// <tmp_root>/<run_id>/REEL/candidates/<doc_id>
/// <tmp_root>/<run_id>/REEL/ic
/// <tmp_root>/<run_id>/REEL/results/candidate_scores
/// <tmp_root>/<run_id>/REEL/results/<doc_id>.json
/// <tmp_root>/REEL/cache/<kb>.json
/// ```
#[derive(Debug, Clone)]
pub struct RunLayout {
    tmp_root: PathBuf,
    run_id: String,
}

impl RunLayout {
    pub fn new(tmp_root: impl Into<PathBuf>, run_id: impl Into<String>) -> Self {
        Self {
            tmp_root: tmp_root.into(),
            run_id: run_id.into(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn tmp_root(&self) -> &Path {
        &self.tmp_root
    }

    pub fn run_root(&self) -> PathBuf {
        self.tmp_root.join(&self.run_id)
    }

    pub fn reel_dir(&self) -> PathBuf {
        self.run_root().join("REEL")
    }

    pub fn candidates_dir(&self) -> PathBuf {
        self.reel_dir().join("candidates")
    }

    pub fn candidate_file(&self, doc_id: &str) -> PathBuf {
        self.candidates_dir().join(doc_id)
    }

    pub fn ic_path(&self) -> PathBuf {
        self.reel_dir().join("ic")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.reel_dir().join("results")
    }

    pub fn scores_path(&self) -> PathBuf {
        self.results_dir().join("candidate_scores")
    }

    pub fn doc_results_path(&self, doc_id: &str) -> PathBuf {
        self.results_dir().join(format!("{}.json", doc_id))
    }

    /// Shared across runs, keyed by KB.
    pub fn cache_path(&self, kb: &str) -> PathBuf {
        self.tmp_root
            .join("REEL")
            .join("cache")
            .join(format!("{}.json", kb))
    }

    /// Create the run directories, dropping candidate files left by an
    /// earlier run with the same id.
    pub async fn prepare(&self) -> Result<()> {
        let candidates_dir = self.candidates_dir();

        if tokio::fs::try_exists(&candidates_dir).await.unwrap_or(false) {
            debug!(path = ?candidates_dir, "Removing stale candidate files");
            tokio::fs::remove_dir_all(&candidates_dir)
                .await
                .context(format!("Failed to clean {:?}", candidates_dir))?;
        }

        for dir in [candidates_dir, self.results_dir()] {
            tokio::fs::create_dir_all(&dir)
                .await
                .context(format!("Failed to create run directory: {:?}", dir))?;
        }

        Ok(())
    }

    /// Remove everything under `<tmp_root>/<run_id>`. The cache is kept.
    pub async fn teardown(&self) -> Result<()> {
        let run_root = self.run_root();
        if tokio::fs::try_exists(&run_root).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&run_root)
                .await
                .context(format!("Failed to remove run directory: {:?}", run_root))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_shape() {
        let run_id = new_run_id("disease");
        let (id, entity_type) = run_id.split_once('_').unwrap();

        assert_eq!(id.len(), 15);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert_eq!(entity_type, "disease");
        assert_ne!(run_id, new_run_id("disease"));
    }

    #[test]
    fn test_paths() {
        let layout = RunLayout::new("/tmp/bent", "ABC_disease");

        assert_eq!(
            layout.candidate_file("doc1"),
            PathBuf::from("/tmp/bent/ABC_disease/REEL/candidates/doc1")
        );
        assert_eq!(layout.ic_path(), PathBuf::from("/tmp/bent/ABC_disease/REEL/ic"));
        assert_eq!(
            layout.scores_path(),
            PathBuf::from("/tmp/bent/ABC_disease/REEL/results/candidate_scores")
        );
        assert_eq!(
            layout.cache_path("medic"),
            PathBuf::from("/tmp/bent/REEL/cache/medic.json")
        );
    }

    #[tokio::test]
    async fn test_prepare_cleans_stale_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::new(dir.path(), "RUN_disease");

        tokio::fs::create_dir_all(layout.candidates_dir()).await.unwrap();
        tokio::fs::write(layout.candidate_file("old"), "stale").await.unwrap();

        layout.prepare().await.unwrap();

        assert!(layout.candidates_dir().is_dir());
        assert!(layout.results_dir().is_dir());
        assert!(!layout.candidate_file("old").exists());

        layout.teardown().await.unwrap();
        assert!(!layout.run_root().exists());
        assert!(dir.path().exists());
    }
}
