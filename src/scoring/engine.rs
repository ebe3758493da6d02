use serde::Serialize;

use super::attributes::{Category, EngineClass, FuelType, Transmission};
use super::profile::{Pollutant, ProfileWeights};
use super::quartile::{bin_working_set, Cohort, MetricCohorts};
use crate::table::{Table, VehicleRecord};

/// Per-component contributions to one vehicle's composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub category: f64,
    pub engine: f64,
    pub transmission: f64,
    pub nmhc: f64,
    pub co: f64,
    pub nox: f64,
    pub co2: f64,
    pub energy: f64,
    pub total: f64,
    /// Cohorts the pollutant and energy contributions were looked up with
    pub cohorts: MetricCohorts,
    /// CO2 cohort after fuel-type selection
    pub co2_cohort: Cohort,
}

/// A vehicle together with its score. Serializes as the record's fields
/// followed by `scoreBreakdown` and `score`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredVehicle {
    #[serde(flatten)]
    pub record: VehicleRecord,
    pub score_breakdown: ScoreBreakdown,
    pub score: f64,
}

/// Pick the CO2 cohort matching the vehicle's fuel.
///
/// Flex vehicles take the worse of their two per-fuel cohorts. Unknown fuels
/// use whichever CO2 figure the vehicle actually has, gasoline/diesel first.
pub fn co2_cohort(record: &VehicleRecord, cohorts: &MetricCohorts) -> Cohort {
    match FuelType::classify(record.fuel.as_deref()) {
        FuelType::Ethanol => cohorts.co2_ethanol,
        FuelType::GasolineDiesel => cohorts.co2_gasoline,
        FuelType::Flex => cohorts.co2_ethanol.max(cohorts.co2_gasoline),
        FuelType::Unknown => {
            if record.co2_gasoline.is_some() {
                cohorts.co2_gasoline
            } else if record.co2_ethanol.is_some() {
                cohorts.co2_ethanol
            } else {
                Cohort::NEUTRAL
            }
        }
    }
}

/// Composite score of one vehicle given its cohorts in the working set.
/// Lower is more sustainable.
pub fn score_vehicle(record: &VehicleRecord, cohorts: &MetricCohorts, weights: &ProfileWeights) -> ScoreBreakdown {
    let category = weights.category(record.category.as_deref().and_then(Category::classify));
    let engine = weights.engine(record.engine.as_deref().and_then(EngineClass::classify));
    let transmission = weights.transmission(record.transmission.as_deref().and_then(Transmission::classify));

    let co2_cohort = co2_cohort(record, cohorts);
    let nmhc = weights.pollutant(Pollutant::Nmhc, cohorts.nmhc);
    let co = weights.pollutant(Pollutant::Co, cohorts.co);
    let nox = weights.pollutant(Pollutant::Nox, cohorts.nox);
    let co2 = weights.pollutant(Pollutant::Co2, co2_cohort);
    let energy = weights.energy(cohorts.energy);

    ScoreBreakdown {
        category,
        engine,
        transmission,
        nmhc,
        co,
        nox,
        co2,
        energy,
        total: category + engine + transmission + co + nox + nmhc + co2 + energy,
        cohorts: *cohorts,
        co2_cohort,
    }
}

/// Bin the working set and score every vehicle in it, preserving row order.
pub fn score_working_set(working_set: &Table, weights: &ProfileWeights) -> Vec<ScoredVehicle> {
    let cohorts = bin_working_set(working_set.rows());
    working_set
        .rows()
        .iter()
        .zip(cohorts.iter())
        .map(|(record, cohorts)| {
            let breakdown = score_vehicle(record, cohorts, weights);
            ScoredVehicle {
                record: record.clone(),
                score: breakdown.total,
                score_breakdown: breakdown,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::weights;
    use crate::table::ColumnMap;

    fn vehicle(row: usize, model: &str, co: f64) -> VehicleRecord {
        let mut r = VehicleRecord::new(row, "FIAT", model, Some(2023));
        r.category = Some("Compacto".to_string());
        r.engine = Some("1.0".to_string());
        r.transmission = Some("M-5".to_string());
        r.fuel = Some("F".to_string());
        r.co = Some(co);
        r.nox = Some(co / 10.0);
        r.nmhc = Some(co / 20.0);
        r.co2_ethanol = Some(co * 100.0);
        r.co2_gasoline = Some(co * 110.0);
        r.energy_consumption = Some(1.0 + co);
        r
    }

    fn table(rows: Vec<VehicleRecord>) -> Table {
        Table::new(Vec::new(), ColumnMap::default(), rows)
    }

    fn all(cohort: Cohort) -> MetricCohorts {
        MetricCohorts {
            nmhc: cohort,
            co: cohort,
            nox: cohort,
            co2_ethanol: cohort,
            co2_gasoline: cohort,
            energy: cohort,
        }
    }

    #[test]
    fn test_exact_score_best_cohorts_profile_two() {
        // Compact is profile 2's emphasized category, so it contributes 0
        let record = vehicle(0, "ARGO", 0.1);
        let b = score_vehicle(&record, &all(Cohort::Q1), weights(2));

        assert_eq!(b.category, 0.0);
        assert!((b.engine - 0.10 / 9.0).abs() < 1e-12);
        assert!((b.transmission - 0.25 / 9.0).abs() < 1e-12);
        assert!((b.co - 0.10 / 9.0).abs() < 1e-12);
        assert!((b.energy - 0.20 / 9.0).abs() < 1e-12);
        // 4 x 0.1/9 + 0.2/9 + 0 + 0.25/9 + 0.1/9 = 0.95/9
        assert!((b.total - 0.1056).abs() < 1e-4);
    }

    #[test]
    fn test_unknown_categoricals_contribute_zero() {
        let mut record = vehicle(0, "ARGO", 0.1);
        record.category = Some("Picape".to_string());
        record.engine = None;
        record.transmission = Some("?".to_string());
        let b = score_vehicle(&record, &all(Cohort::Q2), weights(1));
        assert_eq!(b.category, 0.0);
        assert_eq!(b.engine, 0.0);
        assert_eq!(b.transmission, 0.0);
        assert!(b.total > 0.0);
    }

    #[test]
    fn test_flex_takes_worse_co2_cohort() {
        let record = vehicle(0, "ARGO", 0.1);
        let mut cohorts = all(Cohort::Q2);
        cohorts.co2_ethanol = Cohort::Q1;
        cohorts.co2_gasoline = Cohort::Q3;
        assert_eq!(co2_cohort(&record, &cohorts), Cohort::Q3);
    }

    #[test]
    fn test_single_fuel_co2_selection() {
        let mut record = vehicle(0, "ARGO", 0.1);
        let mut cohorts = all(Cohort::Q2);
        cohorts.co2_ethanol = Cohort::Q1;
        cohorts.co2_gasoline = Cohort::Q4;

        record.fuel = Some("E".to_string());
        assert_eq!(co2_cohort(&record, &cohorts), Cohort::Q1);
        record.fuel = Some("Diesel".to_string());
        assert_eq!(co2_cohort(&record, &cohorts), Cohort::Q4);
    }

    #[test]
    fn test_unknown_fuel_fallback_order() {
        let mut record = vehicle(0, "ARGO", 0.1);
        record.fuel = None;
        let mut cohorts = all(Cohort::Q2);
        cohorts.co2_ethanol = Cohort::Q1;
        cohorts.co2_gasoline = Cohort::Q4;

        assert_eq!(co2_cohort(&record, &cohorts), Cohort::Q4);
        record.co2_gasoline = None;
        assert_eq!(co2_cohort(&record, &cohorts), Cohort::Q1);
        record.co2_ethanol = None;
        assert_eq!(co2_cohort(&record, &cohorts), Cohort::Q2);
    }

    #[test]
    fn test_score_invariant_under_row_permutation() {
        let rows: Vec<VehicleRecord> = [0.4, 0.1, 0.3, 0.2, 0.5]
            .iter()
            .enumerate()
            .map(|(i, co)| vehicle(i, &format!("M{}", i), *co))
            .collect();
        let mut reversed = rows.clone();
        reversed.reverse();

        let forward = score_working_set(&table(rows), weights(1));
        let backward = score_working_set(&table(reversed), weights(1));
        for scored in &forward {
            let twin = backward
                .iter()
                .find(|s| s.record.model == scored.record.model)
                .unwrap();
            assert_eq!(scored.score, twin.score);
        }
    }

    #[test]
    fn test_cleaner_vehicle_scores_lower() {
        let rows = vec![vehicle(0, "CLEAN", 0.1), vehicle(1, "MID", 0.2), vehicle(2, "DIRTY", 0.9)];
        let scored = score_working_set(&table(rows), weights(1));
        assert!(scored[0].score < scored[1].score);
        assert!(scored[1].score < scored[2].score);
        assert_eq!(scored[0].score, scored[0].score_breakdown.total);
    }

    #[test]
    fn test_scored_vehicle_json_shape() {
        let scored = score_working_set(&table(vec![vehicle(0, "ARGO", 0.1)]), weights(1));
        let json = serde_json::to_value(&scored[0]).unwrap();
        assert_eq!(json["brand"], "FIAT");
        assert!(json["score"].is_number());
        assert!(json["scoreBreakdown"]["co2"].is_number());
        assert_eq!(json["scoreBreakdown"]["cohorts"]["co"], "Q2");
    }
}
