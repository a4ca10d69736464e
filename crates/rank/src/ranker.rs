use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::ExitStatus;
use tracing::{info, warn};

use crate::layout::RunLayout;

#[derive(Debug, thiserror::Error)]
pub enum RankerError {
    #[error("failed to start ranker {program:?}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ranker exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("ranker produced no results file at {0:?}")]
    MissingResults(PathBuf),
}

/// Scores the candidates of a prepared run and returns the path of the
/// `candidate_scores` file.
#[async_trait]
pub trait Ranker: Send + Sync {
    async fn rank(&self, layout: &RunLayout) -> Result<PathBuf, RankerError>;
}

/// Program and argument template of the PPR ranker. Arguments may contain
/// `{run_id}`, `{run_dir}` and `{tmp_root}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for RankerCommand {
    fn default() -> Self {
        Self {
            program: "java".to_string(),
            args: vec![
                "-classpath".to_string(),
                ":bin/REEL/".to_string(),
                "ppr_for_ned_all".to_string(),
                "{run_id}".to_string(),
                "ppr_ic".to_string(),
            ],
        }
    }
}

impl RankerCommand {
    pub fn expand_args(&self, layout: &RunLayout) -> Vec<String> {
        let run_dir = layout.reel_dir();
        let run_dir = run_dir.to_string_lossy();
        let tmp_root = layout.tmp_root().to_string_lossy();

        self.args
            .iter()
            .map(|arg| {
                arg.replace("{run_id}", layout.run_id())
                    .replace("{run_dir}", &run_dir)
                    .replace("{tmp_root}", &tmp_root)
            })
            .collect()
    }
}

/// Runs the external Personalized PageRank ranker as a child process.
pub struct PprRanker {
    command: RankerCommand,
}

impl PprRanker {
    pub fn new(command: RankerCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl Ranker for PprRanker {
    async fn rank(&self, layout: &RunLayout) -> Result<PathBuf, RankerError> {
        let args = self.command.expand_args(layout);
        info!(program = %self.command.program, args = ?args, "Running PPR ranker");

        let output = tokio::process::Command::new(&self.command.program)
            .args(&args)
            .output()
            .await
            .map_err(|source| RankerError::Spawn {
                program: self.command.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = %output.status, "PPR ranker failed");
            return Err(RankerError::Failed {
                status: output.status,
                stderr,
            });
        }

        let scores_path = layout.scores_path();
        if !tokio::fs::try_exists(&scores_path).await.unwrap_or(false) {
            return Err(RankerError::MissingResults(scores_path));
        }

        Ok(scores_path)
    }
}
