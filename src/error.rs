use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures that abort a ranking request.
///
/// An empty result set is not represented here; filters and the fuzzy
/// fallback report that through the page message instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Vehicle table not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Required column '{field}' could not be resolved in the vehicle table")]
    Schema { field: &'static str },

    #[error("Failed to read vehicle table at {}: {cause}", path.display())]
    Parse { path: PathBuf, cause: String },

    /// A single-vehicle lookup (`show`, `compare`) found no row
    #[error("No vehicle matches '{selector}'")]
    VehicleNotFound { selector: String },
}
