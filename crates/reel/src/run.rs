use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use candidates::nil;
use candidates::{
    Candidate, CandidateEnricher, CandidateMatcher, IdAllocator, MatchCache, NilLinker,
};
use graph::candidate_file;
use graph::information_content;
use graph::{DocumentCandidateSet, GraphBuilder, RelationResolver};
use ingest::{Abbreviations, Document, EntityType};
use kb::{ExtractedRelations, KbIndex, KbLoader};
use rank::results;
use rank::{LinkedEntities, Ranker, RunLayout};

use crate::config::{NelConfig, RunPlan};
use crate::metrics::{RunStats, TimedOperation};

/// Result of linking one entity type.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: String,
    pub entity_type: EntityType,
    pub kb: String,
    pub linked: LinkedEntities,
    /// Per-document JSON files, only kept with `keep_temp`.
    pub results_dir: Option<PathBuf>,
    pub stats: RunStats,
}

/// Drives one pass over a document set: candidate files, information
/// content, ranking, results and cache.
pub struct Orchestrator<'a> {
    config: &'a NelConfig,
    ranker: &'a dyn Ranker,
}

struct RunContext<'r> {
    plan: &'r RunPlan,
    layout: RunLayout,
    index: KbIndex,
    relations: ExtractedRelations,
    cache: MatchCache,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a NelConfig, ranker: &'a dyn Ranker) -> Self {
        Self { config, ranker }
    }

    pub async fn run(
        &self,
        plan: &RunPlan,
        documents: &[Document],
        abbreviations: &Abbreviations,
        nil_linker: Option<&dyn NilLinker>,
    ) -> Result<RunOutcome> {
        let mut stats = RunStats::default();
        let nil_linker = nil_linker.filter(|_| plan.profile.nil_linker_available);

        let timer = TimedOperation::start();
        let ctx = self.init(plan).await?;
        let cache_dirty = self
            .write_candidate_files(&ctx, documents, abbreviations, nil_linker, &mut stats)
            .await?;
        stats.preprocess_ms = timer.elapsed_ms();

        let timer = TimedOperation::start();
        information_content::write_ic_file(
            &ctx.layout.candidates_dir(),
            &ctx.layout.ic_path(),
            &ctx.index,
            self.config.ic_mode,
        )
        .await?;
        stats.ic_ms = timer.elapsed_ms();

        let linked = self.rank(&ctx, &mut stats).await?;

        let timer = TimedOperation::start();
        results::write_results(&ctx.layout, &linked).await?;
        stats.linked_mentions = linked.values().map(|doc| doc.len()).sum();

        if cache_dirty {
            ctx.cache
                .persist(&ctx.layout.cache_path(plan.kb()))
                .await
                .context("Failed to persist candidate cache")?;
        }

        let results_dir = if self.config.keep_temp {
            Some(ctx.layout.results_dir())
        } else {
            ctx.layout.teardown().await?;
            None
        };
        stats.postprocess_ms = timer.elapsed_ms();

        info!(
            run_id = %ctx.layout.run_id(),
            entity_type = %plan.entity_type,
            kb = %plan.kb(),
            documents = stats.candidate_files,
            mentions = stats.mentions,
            linked = stats.linked_mentions,
            elapsed_ms = stats.total_ms(),
            "Finished disambiguation run"
        );

        Ok(RunOutcome {
            run_id: ctx.layout.run_id().to_string(),
            entity_type: plan.entity_type,
            kb: plan.kb().to_string(),
            linked,
            results_dir,
            stats,
        })
    }

    async fn init<'r>(&self, plan: &'r RunPlan) -> Result<RunContext<'r>> {
        let run_id = rank::new_run_id(plan.entity_type.as_str());
        let layout = RunLayout::new(&self.config.tmp_root, run_id);
        layout.prepare().await?;

        let index = KbLoader::load(&plan.dicts_dir(self.config), &plan.profile)
            .await
            .context(format!("Failed to load knowledge base {}", plan.kb()))?;

        let relations = if self.config.link_mode.uses_corpus() {
            ExtractedRelations::load(&plan.relations_path(self.config)).await?
        } else {
            ExtractedRelations::new()
        };

        let cache = MatchCache::load(&layout.cache_path(plan.kb())).await?;

        info!(
            run_id = %layout.run_id(),
            kb = %plan.kb(),
            cached_mentions = cache.stats().entries,
            "Starting disambiguation run"
        );

        Ok(RunContext {
            plan,
            layout,
            index,
            relations,
            cache,
        })
    }

    /// Match, enrich and link the mentions of every document, writing one
    /// candidate file per document with at least one mention. Returns whether
    /// the cache changed.
    async fn write_candidate_files(
        &self,
        ctx: &RunContext<'_>,
        documents: &[Document],
        abbreviations: &Abbreviations,
        nil_linker: Option<&dyn NilLinker>,
        stats: &mut RunStats,
    ) -> Result<bool> {
        let entity_type = ctx.plan.entity_type.as_str();
        let matcher = CandidateMatcher::new(&ctx.index, &ctx.plan.profile);
        let enricher = CandidateEnricher::new(&ctx.index, self.config.min_match_score);
        let builder = GraphBuilder::new(
            RelationResolver::new(self.config.link_mode, &ctx.relations, ctx.index.edges()),
            ctx.plan.profile.skip_graph_linking,
        );

        let mut cache_dirty = false;

        for (position, document) in documents.iter().enumerate() {
            stats.documents += 1;

            let doc_abbreviations = abbreviations.for_doc(&document.doc_id);
            let mut allocator = IdAllocator::new();
            let mut set = DocumentCandidateSet::new(
                document.doc_id.clone(),
                position + 1,
                entity_type.to_string(),
            );

            for mention in document.unique_mentions(entity_type) {
                let outcome = matcher
                    .match_mention(&mention.text, &doc_abbreviations, &ctx.cache)
                    .context(format!(
                        "Failed to match {:?} in document {}",
                        mention.text, document.doc_id
                    ))?;
                cache_dirty |= outcome.cache_dirty;
                stats.record_match(&outcome);

                let mut candidates = enricher.enrich(&outcome.matches, &mut allocator);
                if candidates.is_empty() {
                    candidates = self
                        .nil_fallback(&mention.text, &enricher, &mut allocator, nil_linker, stats)
                        .await;
                }

                set.push(mention.clone(), candidates);
            }

            if set.is_empty() {
                continue;
            }

            let graph_stats = builder.link(&mut set);
            stats.graph_edges += graph_stats.edges;
            stats.candidates_written += set.candidate_count();

            let path = ctx.layout.candidate_file(&document.doc_id);
            tokio::fs::write(&path, candidate_file::render(&set))
                .await
                .context(format!("Failed to write candidate file: {:?}", path))?;
            stats.candidate_files += 1;

            debug!(
                doc_id = %document.doc_id,
                mentions = set.entries.len(),
                candidates = set.candidate_count(),
                "Wrote candidate file"
            );
        }

        Ok(cache_dirty)
    }

    /// Candidates for a mention with no lexical match: the NIL linker's
    /// predictions when available, otherwise the NIL placeholder.
    async fn nil_fallback(
        &self,
        mention_text: &str,
        enricher: &CandidateEnricher<'_>,
        allocator: &mut IdAllocator,
        nil_linker: Option<&dyn NilLinker>,
        stats: &mut RunStats,
    ) -> Vec<Candidate> {
        if let Some(linker) = nil_linker {
            match nil::dispatch(mention_text, linker).await {
                Ok(matches) => {
                    let candidates = enricher.enrich(&matches, allocator);
                    if !candidates.is_empty() {
                        stats.nil_fallbacks += 1;
                        return candidates;
                    }
                }
                Err(err) => {
                    warn!(
                        mention = mention_text,
                        error = %err,
                        "NIL linker failed, using placeholder"
                    );
                }
            }
        }

        stats.nil_sentinels += 1;
        vec![Candidate::nil()]
    }

    async fn rank(&self, ctx: &RunContext<'_>, stats: &mut RunStats) -> Result<LinkedEntities> {
        let entity_type = ctx.plan.entity_type.as_str();

        if !ctx.plan.profile.uses_ranker {
            let candidates_dir = ctx.layout.candidates_dir();
            return results::first_candidate_results(&candidates_dir, entity_type).await;
        }

        if stats.candidate_files == 0 {
            info!(kb = %ctx.plan.kb(), "No candidate files, skipping ranking");
            return Ok(LinkedEntities::new());
        }

        let timer = TimedOperation::start();
        let scores_path = self
            .ranker
            .rank(&ctx.layout)
            .await
            .context(format!("Ranking failed for run {}", ctx.layout.run_id()))?;
        stats.rank_ms = timer.elapsed_ms();

        results::read_candidate_scores(&scores_path, entity_type).await
    }
}
