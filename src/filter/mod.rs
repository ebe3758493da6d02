pub mod cascade;

pub use cascade::{apply_cascade, is_truthy, FilterSet, Predicate, TRUE_TOKENS};
