use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::scoring::{score_working_set, weights, FuelType, ScoredVehicle};
use crate::table::{Table, VehicleRecord};

/// Picks one vehicle out of the table.
///
/// Parsed from `BRAND/MODEL[/YEAR]` (identity) or any other text (the
/// vehicle code).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleSelector {
    Code(String),
    Identity {
        brand: String,
        model: String,
        year: Option<i32>,
    },
}

impl FromStr for VehicleSelector {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("empty vehicle selector".to_string());
        }
        if !raw.contains('/') {
            return Ok(VehicleSelector::Code(raw.to_string()));
        }

        let parts: Vec<&str> = raw.split('/').map(str::trim).collect();
        let (brand, model, year) = match parts.as_slice() {
            [brand, model] => (*brand, *model, None),
            [brand, model, year] => {
                let year = year
                    .parse::<i32>()
                    .map_err(|_| format!("invalid year '{}' in '{}'", year, raw))?;
                (*brand, *model, Some(year))
            }
            _ => return Err(format!("expected BRAND/MODEL[/YEAR], got '{}'", raw)),
        };
        if brand.is_empty() || model.is_empty() {
            return Err(format!("expected BRAND/MODEL[/YEAR], got '{}'", raw));
        }

        Ok(VehicleSelector::Identity {
            brand: brand.to_uppercase(),
            model: model.to_uppercase(),
            year,
        })
    }
}

impl fmt::Display for VehicleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleSelector::Code(code) => write!(f, "{}", code),
            VehicleSelector::Identity { brand, model, year } => match year {
                Some(year) => write!(f, "{}/{}/{}", brand, model, year),
                None => write!(f, "{}/{}", brand, model),
            },
        }
    }
}

impl VehicleSelector {
    pub fn matches(&self, record: &VehicleRecord) -> bool {
        match self {
            VehicleSelector::Code(code) => record
                .code
                .as_deref()
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(code)),
            VehicleSelector::Identity { brand, model, year } => {
                let year_matches = match year {
                    Some(wanted) => record.year == Some(*wanted),
                    None => true,
                };
                record.brand == *brand && record.model == *model && year_matches
            }
        }
    }
}

/// Score the whole table and return the first vehicle (in row order) the
/// selector matches, with its breakdown.
pub fn show(table: &Table, selector: &VehicleSelector, profile: i64) -> Result<ScoredVehicle> {
    let found = score_working_set(table, weights(profile))
        .into_iter()
        .find(|scored| selector.matches(&scored.record));
    debug!(%selector, found = found.is_some(), "vehicle lookup");
    found.ok_or_else(|| Error::VehicleNotFound {
        selector: selector.to_string(),
    })
}

/// Which side of a comparison did better on a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Left,
    Right,
}

/// One metric of a two-vehicle comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    pub metric: &'static str,
    pub unit: &'static str,
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub lower_is_better: bool,
    /// `None` when either value is missing or both are equal
    pub better: Option<Side>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub left: ScoredVehicle,
    pub right: ScoredVehicle,
    pub metrics: Vec<MetricComparison>,
}

pub fn better(left: Option<f64>, right: Option<f64>, lower_is_better: bool) -> Option<Side> {
    let (l, r) = (left?, right?);
    if l == r {
        None
    } else if (l < r) == lower_is_better {
        Some(Side::Left)
    } else {
        Some(Side::Right)
    }
}

/// CO2 figure for the vehicle's fuel; flex vehicles report the higher one.
pub fn effective_co2(record: &VehicleRecord) -> Option<f64> {
    match FuelType::classify(record.fuel.as_deref()) {
        FuelType::Ethanol => record.co2_ethanol,
        FuelType::GasolineDiesel => record.co2_gasoline,
        FuelType::Flex => match (record.co2_ethanol, record.co2_gasoline) {
            (Some(e), Some(g)) => Some(e.max(g)),
            (e, g) => g.or(e),
        },
        FuelType::Unknown => record.co2_gasoline.or(record.co2_ethanol),
    }
}

/// City and highway yield (km/l) for the vehicle's fuel. Anything but a
/// pure ethanol vehicle reports gasoline/diesel figures when it has them.
pub fn effective_yield(record: &VehicleRecord) -> (Option<f64>, Option<f64>) {
    match FuelType::classify(record.fuel.as_deref()) {
        FuelType::Ethanol => (record.city_ethanol, record.highway_ethanol),
        _ => (
            record.city_gasoline.or(record.city_ethanol),
            record.highway_gasoline.or(record.highway_ethanol),
        ),
    }
}

fn metric(
    metric: &'static str,
    unit: &'static str,
    left: Option<f64>,
    right: Option<f64>,
    lower_is_better: bool,
) -> MetricComparison {
    MetricComparison {
        metric,
        unit,
        left,
        right,
        lower_is_better,
        better: better(left, right, lower_is_better),
    }
}

/// Compare two vehicles, both scored within the whole table.
pub fn compare(table: &Table, left: &VehicleSelector, right: &VehicleSelector, profile: i64) -> Result<Comparison> {
    let left = show(table, left, profile)?;
    let right = show(table, right, profile)?;

    let (l, r) = (&left.record, &right.record);
    let (l_city, l_highway) = effective_yield(l);
    let (r_city, r_highway) = effective_yield(r);

    let metrics = vec![
        metric("score", "", Some(left.score), Some(right.score), true),
        metric("co", "g/km", l.co, r.co, true),
        metric("co2", "g/km", effective_co2(l), effective_co2(r), true),
        metric("nox", "g/km", l.nox, r.nox, true),
        metric("nmhc", "g/km", l.nmhc, r.nmhc, true),
        metric("cityYield", "km/l", l_city, r_city, false),
        metric("highwayYield", "km/l", l_highway, r_highway, false),
        metric(
            "energyConsumption",
            "MJ/km",
            l.energy_consumption,
            r.energy_consumption,
            true,
        ),
    ];

    Ok(Comparison {
        left,
        right,
        metrics,
    })
}
