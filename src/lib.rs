pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod query;
pub mod scoring;
pub mod search;
pub mod table;

pub use error::{Error, Result};
