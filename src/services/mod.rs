pub mod completion;
pub mod enricher;
pub mod extractor;
pub mod language;
pub mod matcher;
pub mod prompt;
pub mod providers;
pub mod ranking;
pub mod recommendations;

pub use completion::{CompletionChain, CompletionProvider};
pub use providers::{CatalogProvider, TmdbProvider};
pub use recommendations::RecommendationService;
