use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use candidates::{HttpNilLinker, RetryPolicy};
use graph::{IcMode, LinkMode};
use ingest::EntityType;
use kb::KbProfile;
use rank::RankerCommand;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NelConfig {
    /// `entity_type -> kb`. An empty KB leaves the type unlinked.
    pub types: BTreeMap<String, String>,
    pub link_mode: LinkMode,
    pub min_match_score: f64,
    pub tmp_root: PathBuf,
    pub data_dir: PathBuf,
    pub ranker: RankerCommand,
    pub nil_linker: Option<NilLinkerConfig>,
    pub ic_mode: IcMode,
    /// Keep `<tmp_root>/<run_id>` after the run.
    pub keep_temp: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NilLinkerConfig {
    pub base_url: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_top_k() -> usize {
    1
}

impl Default for NelConfig {
    fn default() -> Self {
        Self {
            types: BTreeMap::new(),
            link_mode: LinkMode::KbCorpus,
            min_match_score: 0.0,
            tmp_root: PathBuf::from("tmp"),
            data_dir: PathBuf::from("data"),
            ranker: RankerCommand::default(),
            nil_linker: None,
            ic_mode: IcMode::Intrinsic,
            keep_temp: false,
        }
    }
}

/// One entity type to link against one KB.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub entity_type: EntityType,
    pub profile: KbProfile,
}

impl RunPlan {
    pub fn kb(&self) -> &str {
        &self.profile.name
    }

    pub fn dicts_dir(&self, config: &NelConfig) -> PathBuf {
        config.data_dir.join("dicts").join(self.kb())
    }

    pub fn relations_path(&self, config: &NelConfig) -> PathBuf {
        config
            .data_dir
            .join("relations")
            .join(format!("{}_{}_relations.json", self.entity_type, self.kb()))
    }
}

impl NelConfig {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .context(format!("Failed to read config file: {:?}", path))?;

        serde_json::from_str(&content).context(format!("Failed to parse config file: {:?}", path))
    }

    /// Check every target before any work starts and resolve its KB profile.
    pub fn validate(&self) -> Result<Vec<RunPlan>> {
        if self.types.is_empty() {
            anyhow::bail!("No entity types to link: 'types' is empty");
        }

        if !(0.0..=1.0).contains(&self.min_match_score) {
            anyhow::bail!(
                "min_match_score must be within [0, 1], got {}",
                self.min_match_score
            );
        }

        let mut plans = Vec::new();

        for (entity_type, kb) in &self.types {
            let entity_type: EntityType = entity_type.parse()?;
            if kb.is_empty() {
                continue;
            }

            let profile = KbProfile::lookup(kb)
                .context(format!("Invalid knowledge base for entity type {}", entity_type))?;
            plans.push(RunPlan {
                entity_type,
                profile,
            });
        }

        Ok(plans)
    }

    /// The HTTP NIL linker for a plan, when one is configured and serves its KB.
    pub fn nil_linker_for(&self, plan: &RunPlan) -> Option<HttpNilLinker> {
        let settings = self.nil_linker.as_ref()?;
        if !plan.profile.nil_linker_available {
            return None;
        }

        Some(HttpNilLinker::new(
            settings.base_url.clone(),
            plan.kb().to_string(),
            settings.top_k,
            settings.retry.clone(),
        ))
    }
}
