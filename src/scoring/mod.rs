pub mod attributes;
pub mod engine;
pub mod profile;
pub mod quartile;
pub mod validation;

pub use attributes::{Category, EngineClass, FuelType, Transmission};
pub use engine::{co2_cohort, score_vehicle, score_working_set, ScoreBreakdown, ScoredVehicle};
pub use profile::{weights, Pollutant, ProfileWeights, DEFAULT_PROFILE, PROFILES};
pub use quartile::{assign_cohorts, bin_working_set, quartile_edges, Cohort, MetricCohorts};
pub use validation::{validate_profile, validate_profiles};
