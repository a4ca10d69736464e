pub mod config;
pub mod metrics;
pub mod run;

pub use config::{NelConfig, NilLinkerConfig, RunPlan};
pub use metrics::{RunStats, TimedOperation};
pub use run::{Orchestrator, RunOutcome};

use anyhow::Result;

use candidates::NilLinker;
use ingest::{Abbreviations, Document};
use rank::Ranker;

/// Link every configured entity type in turn. All targets are validated
/// before the first run starts.
pub async fn link_all(
    config: &NelConfig,
    documents: &[Document],
    abbreviations: &Abbreviations,
    ranker: &dyn Ranker,
) -> Result<Vec<RunOutcome>> {
    let plans = config.validate()?;
    let orchestrator = Orchestrator::new(config, ranker);
    let mut outcomes = Vec::with_capacity(plans.len());

    for plan in &plans {
        let linker = config.nil_linker_for(plan);
        let outcome = orchestrator
            .run(
                plan,
                documents,
                abbreviations,
                linker.as_ref().map(|l| l as &dyn NilLinker),
            )
            .await?;
        outcomes.push(outcome);
    }

    Ok(outcomes)
}
