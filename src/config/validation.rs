use super::schema::Config;
use crate::query::MAX_PAGE_SIZE;
use crate::table::Field;

/// Validate a configuration, collecting every problem rather than
/// stopping at the first.
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if !(1..=5).contains(&config.profile) {
        errors.push(format!("profile: must be between 1 and 5, got {}", config.profile));
    }

    if config.page_size == 0 || config.page_size > MAX_PAGE_SIZE {
        errors.push(format!(
            "page_size: must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.page_size
        ));
    }

    if !(0.0..=100.0).contains(&config.fuzzy_threshold) {
        errors.push(format!(
            "fuzzy_threshold: must be between 0 and 100, got {}",
            config.fuzzy_threshold
        ));
    }

    if config.delimiter.len() != 1 {
        errors.push(format!(
            "delimiter: must be a single ASCII character, got '{}'",
            config.delimiter
        ));
    }

    let mut names: Vec<&String> = config.columns.keys().collect();
    names.sort();
    for name in names {
        if Field::from_name(name).is_none() {
            errors.push(format!("columns.{}: unknown field", name));
        } else if config.columns[name].iter().any(|s| s.trim().is_empty()) {
            errors.push(format!("columns.{}: empty header spelling", name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
