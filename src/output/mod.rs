pub mod formatter;
pub mod json;

pub use formatter::{
    format_breakdown, format_comparison, format_page_table, format_profile, format_score, format_vehicle,
    should_use_colors,
};
pub use json::{to_json, write_json};
