use super::profile::{
    ProfileWeights, CATEGORY_BLOCK, ENERGY_BLOCK, ENGINE_BLOCK, POLLUTANT_BLOCK, POLLUTANT_SHARE, PROFILES,
    TRANSMISSION_BLOCK,
};

const TOLERANCE: f64 = 1e-6;

/// Validate the built-in weight tables at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_profiles() -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let top_level = POLLUTANT_BLOCK + ENERGY_BLOCK + CATEGORY_BLOCK + TRANSMISSION_BLOCK + ENGINE_BLOCK;
    if (top_level - 1.0).abs() > TOLERANCE {
        errors.push(format!("block weights: sum to {:.6}, expected 1", top_level));
    }
    if (4.0 * POLLUTANT_SHARE - 1.0).abs() > TOLERANCE {
        errors.push(format!("pollutant shares: sum to {:.6}, expected 1", 4.0 * POLLUTANT_SHARE));
    }

    for weights in &PROFILES {
        errors.extend(validate_profile(weights));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check one profile: every weight within [0, 1] and every block summing to 1.
pub fn validate_profile(weights: &ProfileWeights) -> Vec<String> {
    let mut errors = Vec::new();

    for (name, block) in weights.blocks() {
        for (i, w) in block.iter().enumerate() {
            if !(0.0..=1.0).contains(w) {
                errors.push(format!(
                    "profile {}.{}[{}]: weight {} outside [0, 1]",
                    weights.profile, name, i, w
                ));
            }
        }
        let sum: f64 = block.iter().sum();
        if (sum - 1.0).abs() > TOLERANCE {
            errors.push(format!(
                "profile {}.{}: weights sum to {:.6}, expected 1",
                weights.profile, name, sum
            ));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::weights;

    #[test]
    fn test_builtin_profiles_are_valid() {
        assert!(validate_profiles().is_ok());
    }

    #[test]
    fn test_block_not_summing_to_one() {
        let mut bad = *weights(2);
        bad.energy = [0.10, 0.20, 0.30, 0.30];
        let errors = validate_profile(&bad);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("profile 2.energy"));
    }

    #[test]
    fn test_weight_outside_unit_range() {
        let mut bad = *weights(1);
        bad.transmission = [1.5, -0.25, -0.25];
        let errors = validate_profile(&bad);
        assert!(errors.iter().any(|e| e.contains("transmission[0]")));
        assert!(errors.iter().any(|e| e.contains("transmission[1]")));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut bad = *weights(3);
        bad.co = [0.5, 0.5, 0.5, 0.5]; // Error 1
        bad.engine = [0.0, 0.0, 0.0, 0.0]; // Error 2
        assert_eq!(validate_profile(&bad).len(), 2);
    }
}
