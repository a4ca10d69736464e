pub mod layout;
pub mod ranker;
pub mod results;

pub use layout::{RunLayout, new_run_id};
pub use ranker::{PprRanker, Ranker, RankerCommand, RankerError};
pub use results::{DocResults, LinkedEntities};
