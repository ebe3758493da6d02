pub mod fallback;
pub mod similarity;

pub use fallback::{
    best_match, filter_by_terms, fuzzy_candidates, search_terms, search_with_fallback, TextSearch,
    DEFAULT_THRESHOLD,
};
pub use similarity::weighted_ratio;
