pub mod cache;
pub mod enricher;
pub mod fuzzy;
pub mod matcher;
pub mod nil;
pub mod retry;
pub mod schema;

pub use cache::{CacheStats, MatchCache};
pub use enricher::{CandidateEnricher, IdAllocator};
pub use matcher::{CandidateMatcher, MatchOutcome};
pub use nil::{HttpNilLinker, LinkerPrediction, NilLinker};
pub use retry::RetryPolicy;
pub use schema::{Candidate, CandidateMatch, MatchOrigin, NIL_KB_ID};
