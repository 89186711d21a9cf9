pub mod batch;
pub mod error;
pub mod exclude;
pub mod extract;
pub mod name;

pub use batch::MessageExtraction;
pub use error::CoreError;
pub use exclude::{ExclusionSet, DEFAULT_EXCLUDE};
pub use extract::entity::{EntityLabel, EntitySpan, HeuristicChunker, SpanFinder};
pub use extract::{ExtractionResult, Extractor};
