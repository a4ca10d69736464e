pub mod index;
pub mod loader;
pub mod profile;
pub mod relations;
pub mod terms;

pub use index::{ConceptInfo, KbEdges, KbIndex, KbStats};
pub use loader::KbLoader;
pub use profile::{KbKind, KbProfile, KNOWN_KBS, NIL_LINKER_KBS};
pub use relations::ExtractedRelations;
pub use terms::{Term, sorted_tokens};
