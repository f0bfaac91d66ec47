pub mod candidate;
pub mod catalog;
pub mod preferences;
pub mod recommendation;

pub use candidate::{MatchQuality, RawCandidate};
pub use catalog::{
    CastMember, CatalogDetails, CatalogEntry, CatalogPage, Credits, CrewMember, DiscoverQuery,
    ExternalIds, Genre, GenreList, MediaKind, TitleSearch,
};
pub use preferences::{normalize_language, split_list, MediaType, PreferenceSpec, YearPreference};
pub use recommendation::{
    EnrichedResult, PreviousRecommendation, RecommendationResponse, ResultType,
};

/// Upper bound on results returned for any request
pub const MAX_RESULTS: usize = 5;
