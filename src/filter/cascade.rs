use tracing::{debug, warn};

use crate::table::{Field, Table, VehicleRecord};

/// Cell values read as "yes" for boolean columns
pub const TRUE_TOKENS: [&str; 4] = ["sim", "s", "true", "1"];

pub fn is_truthy(raw: &str) -> bool {
    let folded = raw.trim().to_lowercase();
    TRUE_TOKENS.contains(&folded.as_str())
}

/// A single attribute filter over a canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Exact model-year match
    Year(i32),
    /// Case-insensitive substring match on a text field
    Contains { field: Field, needle: String },
    /// Air-conditioning flag equivalence
    AirConditioning(bool),
}

impl Predicate {
    pub fn field(&self) -> Field {
        match self {
            Predicate::Year(_) => Field::Year,
            Predicate::Contains { field, .. } => *field,
            Predicate::AirConditioning(_) => Field::AirConditioning,
        }
    }

    pub fn matches(&self, record: &VehicleRecord) -> bool {
        match self {
            Predicate::Year(year) => record.year == Some(*year),
            Predicate::Contains { field, needle } => record
                .text(*field)
                .is_some_and(|value| value.to_lowercase().contains(&needle.to_lowercase())),
            Predicate::AirConditioning(wanted) => {
                record.air_conditioning.as_deref().is_some_and(is_truthy) == *wanted
            }
        }
    }

    /// Narrow `table` to matching rows. A predicate over a column the table
    /// never resolved matches nothing.
    pub fn apply(&self, table: &Table) -> Table {
        if !table.columns().contains(self.field()) {
            warn!(field = self.field().name(), "filter on unresolved column matches nothing");
            return table.with_rows(Vec::new());
        }
        table.retain(|record| self.matches(record))
    }
}

/// Structured query filters, all optional. Blank strings are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub year: Option<i32>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub engine: Option<String>,
    pub transmission: Option<String>,
    pub air_conditioning: Option<String>,
    pub power_steering: Option<String>,
    pub fuel: Option<String>,
}

impl FilterSet {
    /// Active predicates in cascade order
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(year) = self.year {
            predicates.push(Predicate::Year(year));
        }

        let text_filters = [
            (Field::Category, &self.category),
            (Field::Brand, &self.brand),
            (Field::Engine, &self.engine),
            (Field::Transmission, &self.transmission),
        ];
        for (field, value) in text_filters {
            if let Some(needle) = non_blank(value) {
                predicates.push(Predicate::Contains { field, needle });
            }
        }

        if let Some(flag) = non_blank(&self.air_conditioning) {
            predicates.push(Predicate::AirConditioning(is_truthy(&flag)));
        }

        for (field, value) in [(Field::PowerSteering, &self.power_steering), (Field::Fuel, &self.fuel)] {
            if let Some(needle) = non_blank(value) {
                predicates.push(Predicate::Contains { field, needle });
            }
        }

        predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Apply predicates one after another, each to the output of the previous.
/// Stops as soon as the working set is empty.
pub fn apply_cascade(table: &Table, predicates: &[Predicate]) -> Table {
    let mut working = table.clone();
    for predicate in predicates {
        if working.is_empty() {
            break;
        }
        working = predicate.apply(&working);
        debug!(field = predicate.field().name(), remaining = working.len(), "filter applied");
    }
    working
}
