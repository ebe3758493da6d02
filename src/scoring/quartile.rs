use serde::Serialize;

use crate::table::{Metric, VehicleRecord};

/// Quartile cohort of one metric within the current working set.
/// `Q1` holds the lowest (best) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Cohort {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Cohort {
    pub const ALL: [Cohort; 4] = [Cohort::Q1, Cohort::Q2, Cohort::Q3, Cohort::Q4];

    /// Assigned when a value is missing or the quartiles are undefined
    pub const NEUTRAL: Cohort = Cohort::Q2;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Upper edges of Q1..Q4 over the finite values, or `None` when fewer than
/// two distinct finite values exist.
pub fn quartile_edges(values: &[Option<f64>]) -> Option<[f64; 4]> {
    let mut finite: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    finite.sort_by(|a, b| a.total_cmp(b));

    let distinct = finite.windows(2).filter(|w| w[0] != w[1]).count() + 1;
    if finite.is_empty() || distinct < 2 {
        return None;
    }

    Some([
        quantile(&finite, 0.25),
        quantile(&finite, 0.50),
        quantile(&finite, 0.75),
        finite[finite.len() - 1],
    ])
}

/// Assign a cohort to every value.
///
/// Bins are right-closed, so a value sitting exactly on an edge lands in the
/// lower cohort; repeated edges leave the higher of the collapsed cohorts
/// empty. Missing values and degenerate series get `Cohort::NEUTRAL`.
pub fn assign_cohorts(values: &[Option<f64>]) -> Vec<Cohort> {
    let Some(edges) = quartile_edges(values) else {
        return vec![Cohort::NEUTRAL; values.len()];
    };

    values
        .iter()
        .map(|value| match value {
            Some(v) if v.is_finite() => Cohort::ALL
                .into_iter()
                .zip(edges)
                .find(|(_, edge)| *v <= *edge)
                .map(|(cohort, _)| cohort)
                .unwrap_or(Cohort::NEUTRAL),
            _ => Cohort::NEUTRAL,
        })
        .collect()
}

/// Cohorts of every scored metric for one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricCohorts {
    pub nmhc: Cohort,
    pub co: Cohort,
    pub nox: Cohort,
    pub co2_ethanol: Cohort,
    pub co2_gasoline: Cohort,
    pub energy: Cohort,
}

impl Default for MetricCohorts {
    fn default() -> Self {
        Self {
            nmhc: Cohort::NEUTRAL,
            co: Cohort::NEUTRAL,
            nox: Cohort::NEUTRAL,
            co2_ethanol: Cohort::NEUTRAL,
            co2_gasoline: Cohort::NEUTRAL,
            energy: Cohort::NEUTRAL,
        }
    }
}

impl MetricCohorts {
    pub fn get(&self, metric: Metric) -> Cohort {
        match metric {
            Metric::Nmhc => self.nmhc,
            Metric::Co => self.co,
            Metric::Nox => self.nox,
            Metric::Co2Ethanol => self.co2_ethanol,
            Metric::Co2Gasoline => self.co2_gasoline,
            Metric::EnergyConsumption => self.energy,
        }
    }

    fn set(&mut self, metric: Metric, cohort: Cohort) {
        match metric {
            Metric::Nmhc => self.nmhc = cohort,
            Metric::Co => self.co = cohort,
            Metric::Nox => self.nox = cohort,
            Metric::Co2Ethanol => self.co2_ethanol = cohort,
            Metric::Co2Gasoline => self.co2_gasoline = cohort,
            Metric::EnergyConsumption => self.energy = cohort,
        }
    }
}

/// Bin every metric over `rows`, which must be the post-filter working set.
/// Output is parallel to `rows`.
pub fn bin_working_set(rows: &[VehicleRecord]) -> Vec<MetricCohorts> {
    let mut cohorts = vec![MetricCohorts::default(); rows.len()];
    for metric in Metric::ALL {
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.metric(metric)).collect();
        for (slot, cohort) in cohorts.iter_mut().zip(assign_cohorts(&values)) {
            slot.set(metric, cohort);
        }
    }
    cohorts
}
