use serde::Serialize;

use super::columns::Field;

/// Numeric columns that take part in cohort scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Nmhc,
    Co,
    Nox,
    Co2Ethanol,
    Co2Gasoline,
    EnergyConsumption,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Nmhc,
        Metric::Co,
        Metric::Nox,
        Metric::Co2Ethanol,
        Metric::Co2Gasoline,
        Metric::EnergyConsumption,
    ];

    pub fn field(self) -> Field {
        match self {
            Metric::Nmhc => Field::Nmhc,
            Metric::Co => Field::Co,
            Metric::Nox => Field::Nox,
            Metric::Co2Ethanol => Field::Co2Ethanol,
            Metric::Co2Gasoline => Field::Co2Gasoline,
            Metric::EnergyConsumption => Field::EnergyConsumption,
        }
    }
}

/// One row of the vehicle table after column resolution.
///
/// Brand, model and year text are stored upper-cased. Numeric cells that
/// were empty or not a finite number are `None` and serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    /// Zero-based position in the source file, used as the stable tie-breaker
    #[serde(skip)]
    pub row: usize,
    pub code: Option<String>,
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    #[serde(skip)]
    pub year_text: String,
    pub trim: Option<String>,
    pub category: Option<String>,
    pub engine: Option<String>,
    pub transmission: Option<String>,
    pub air_conditioning: Option<String>,
    pub power_steering: Option<String>,
    pub fuel: Option<String>,
    pub nmhc: Option<f64>,
    pub co: Option<f64>,
    pub nox: Option<f64>,
    pub co2_ethanol: Option<f64>,
    pub co2_gasoline: Option<f64>,
    pub city_ethanol: Option<f64>,
    pub highway_ethanol: Option<f64>,
    pub city_gasoline: Option<f64>,
    pub highway_gasoline: Option<f64>,
    pub energy_consumption: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
}

impl VehicleRecord {
    /// Empty record for the given identity; everything else unset
    pub fn new(row: usize, brand: &str, model: &str, year: Option<i32>) -> Self {
        Self {
            row,
            code: None,
            brand: brand.trim().to_uppercase(),
            model: model.trim().to_uppercase(),
            year,
            year_text: year.map(|y| y.to_string()).unwrap_or_default(),
            trim: None,
            category: None,
            engine: None,
            transmission: None,
            air_conditioning: None,
            power_steering: None,
            fuel: None,
            nmhc: None,
            co: None,
            nox: None,
            co2_ethanol: None,
            co2_gasoline: None,
            city_ethanol: None,
            highway_ethanol: None,
            city_gasoline: None,
            highway_gasoline: None,
            energy_consumption: None,
            final_score: None,
        }
    }

    /// Text value of a textual field. Numeric fields return `None`.
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Code => self.code.as_deref(),
            Field::Brand => Some(&self.brand),
            Field::Model => Some(&self.model),
            Field::Year => Some(&self.year_text),
            Field::Trim => self.trim.as_deref(),
            Field::Category => self.category.as_deref(),
            Field::Engine => self.engine.as_deref(),
            Field::Transmission => self.transmission.as_deref(),
            Field::AirConditioning => self.air_conditioning.as_deref(),
            Field::PowerSteering => self.power_steering.as_deref(),
            Field::Fuel => self.fuel.as_deref(),
            _ => None,
        }
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Nmhc => self.nmhc,
            Metric::Co => self.co,
            Metric::Nox => self.nox,
            Metric::Co2Ethanol => self.co2_ethanol,
            Metric::Co2Gasoline => self.co2_gasoline,
            Metric::EnergyConsumption => self.energy_consumption,
        }
    }

    pub fn set_metric(&mut self, metric: Metric, value: Option<f64>) {
        let value = value.filter(|v| v.is_finite());
        match metric {
            Metric::Nmhc => self.nmhc = value,
            Metric::Co => self.co = value,
            Metric::Nox => self.nox = value,
            Metric::Co2Ethanol => self.co2_ethanol = value,
            Metric::Co2Gasoline => self.co2_gasoline = value,
            Metric::EnergyConsumption => self.energy_consumption = value,
        }
    }

    /// Identity used for the per-load uniqueness check
    pub fn key(&self) -> (&str, &str, &str, Option<&str>) {
        (&self.brand, &self.model, &self.year_text, self.code.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uppercases_identity() {
        let record = VehicleRecord::new(0, " Toyota ", "corolla", Some(2023));
        assert_eq!(record.brand, "TOYOTA");
        assert_eq!(record.model, "COROLLA");
        assert_eq!(record.text(Field::Year), Some("2023"));
    }

    #[test]
    fn test_set_metric_drops_non_finite() {
        let mut record = VehicleRecord::new(0, "FIAT", "MOBI", Some(2022));
        record.set_metric(Metric::Co, Some(f64::NAN));
        assert_eq!(record.co, None);
        record.set_metric(Metric::Co, Some(0.25));
        assert_eq!(record.metric(Metric::Co), Some(0.25));
    }

    #[test]
    fn test_serializes_missing_numbers_as_null() {
        let record = VehicleRecord::new(3, "FIAT", "MOBI", Some(2022));
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["nmhc"].is_null());
        assert_eq!(json["brand"], "FIAT");
        assert!(json.get("row").is_none());
        assert!(json.get("finalScore").is_none());
        assert!(json.get("energyConsumption").is_some());
    }
}
