pub mod candidate_file;
pub mod document;
pub mod information_content;
pub mod relation;

pub use candidate_file::{CandidateRecord, EntityBlock};
pub use document::{DocumentCandidateSet, GraphBuilder, GraphStats, MentionCandidates};
pub use information_content::IcMode;
pub use relation::{LinkMode, RelationResolver};
