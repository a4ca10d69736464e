use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;
use walkdir::WalkDir;

use kb::KbIndex;

use crate::candidate_file::{self, CANDIDATE_PREFIX};

/// Probability assumed for concepts without a descendant count.
pub const MISSING_PROBABILITY: f64 = 1e-6;

// Added twice on top of -ln(p)
const IC_OFFSET: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IcMode {
    /// From the KB structure: concepts with fewer descendants score higher.
    #[default]
    Intrinsic,
    /// From candidate frequencies across the run.
    Extrinsic,
}

/// How often each KB id occurs as a candidate across all candidate files in
/// `candidates_dir`. Blocking; see [`count_terms`] for async callers.
pub fn term_counts(candidates_dir: &Path) -> Result<BTreeMap<String, usize>> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for entry in WalkDir::new(candidates_dir).min_depth(1).max_depth(1) {
        let entry = entry.context(format!("Failed to list {:?}", candidates_dir))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let content = std::fs::read_to_string(entry.path())
            .context(format!("Failed to read candidate file: {:?}", entry.path()))?;

        for line in content.lines().filter(|l| l.starts_with(CANDIDATE_PREFIX)) {
            let record = candidate_file::parse_candidate_line(line)
                .context(format!("Malformed candidate in {:?}", entry.path()))?;
            *counts.entry(record.kb_id).or_insert(0) += 1;
        }
    }

    Ok(counts)
}

/// Runs [`term_counts`] on the blocking thread pool.
pub async fn count_terms(candidates_dir: &Path) -> Result<BTreeMap<String, usize>> {
    let candidates_dir = candidates_dir.to_path_buf();
    tokio::task::spawn_blocking(move || term_counts(&candidates_dir))
        .await
        .context("Candidate counting task panicked")?
}

/// `-ln(p) + 1 + 1` with `p = (descendants + 1) / total_concepts`.
pub fn intrinsic_ic(descendant_count: Option<u32>, total_concepts: usize) -> f64 {
    let probability = match descendant_count {
        Some(descendants) if total_concepts > 0 => {
            (descendants as f64 + 1.0) / total_concepts as f64
        }
        _ => MISSING_PROBABILITY,
    };

    offset_ic(probability)
}

pub fn extrinsic_ic(count: usize, max_count: usize) -> f64 {
    offset_ic((count as f64 + 1.0) / (max_count as f64 + 1.0))
}

fn offset_ic(probability: f64) -> f64 {
    let information_content = -probability.ln() + IC_OFFSET;
    information_content + IC_OFFSET
}

pub fn build_information_content(
    counts: &BTreeMap<String, usize>,
    index: &KbIndex,
    mode: IcMode,
) -> BTreeMap<String, f64> {
    let total_concepts = index.total_concepts();
    let max_count = counts.values().copied().max().unwrap_or(0);

    counts
        .iter()
        .map(|(kb_id, &count)| {
            let ic = match mode {
                IcMode::Intrinsic => intrinsic_ic(
                    index.concept_info(kb_id).map(|info| info.descendant_count),
                    total_concepts,
                ),
                IcMode::Extrinsic => extrinsic_ic(count, max_count),
            };
            (kb_id.clone(), ic)
        })
        .collect()
}

pub fn render(ic: &BTreeMap<String, f64>) -> String {
    ic.iter()
        .map(|(kb_id, value)| format!("{}\t{}\n", kb_id, value))
        .collect()
}

/// Count candidates in `candidates_dir` and write their information content
/// to `out_path`.
pub async fn write_ic_file(
    candidates_dir: &Path,
    out_path: &Path,
    index: &KbIndex,
    mode: IcMode,
) -> Result<BTreeMap<String, f64>> {
    let counts = count_terms(candidates_dir).await?;
    let ic = build_information_content(&counts, index, mode);

    tokio::fs::write(out_path, render(&ic))
        .await
        .context(format!("Failed to write information content file: {:?}", out_path))?;

    info!(path = ?out_path, terms = ic.len(), "Wrote information content file");
    Ok(ic)
}
