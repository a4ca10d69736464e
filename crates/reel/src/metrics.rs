use serde::Serialize;
use std::time::{Duration, Instant};

use candidates::MatchOutcome;

/// Counters and phase timings of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub documents: usize,
    pub candidate_files: usize,
    pub mentions: usize,
    pub cache_hits: usize,
    pub fuzzy_matches: usize,
    pub nil_fallbacks: usize,
    pub nil_sentinels: usize,
    pub candidates_written: usize,
    pub graph_edges: usize,
    pub linked_mentions: usize,

    pub preprocess_ms: u64,
    pub ic_ms: u64,
    pub rank_ms: u64,
    pub postprocess_ms: u64,
}

impl RunStats {
    pub fn record_match(&mut self, outcome: &MatchOutcome) {
        self.mentions += 1;
        if !outcome.cache_dirty {
            self.cache_hits += 1;
        } else if outcome.matches.iter().any(|m| m.match_score < 1.0) {
            self.fuzzy_matches += 1;
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.preprocess_ms + self.ic_ms + self.rank_ms + self.postprocess_ms
    }
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candidates::CandidateMatch;

    #[test]
    fn test_record_match() {
        let mut stats = RunStats::default();

        stats.record_match(&MatchOutcome {
            matches: vec![CandidateMatch::name("fever", 1.0)],
            cache_dirty: false,
        });
        stats.record_match(&MatchOutcome {
            matches: vec![CandidateMatch::name("palpitation", 0.5)],
            cache_dirty: true,
        });
        stats.record_match(&MatchOutcome {
            matches: vec![CandidateMatch::synonym("pyrexia", 1.0)],
            cache_dirty: true,
        });

        assert_eq!(stats.mentions, 3);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.fuzzy_matches, 1);
    }
}
