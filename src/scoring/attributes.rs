use serde::Serialize;

use crate::table::normalize_header;

/// Body category keys, in profile order (profile 1 emphasizes `Subcompact`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Subcompact,
    Compact,
    Medium,
    Large,
    Suv,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Subcompact,
        Category::Compact,
        Category::Medium,
        Category::Large,
        Category::Suv,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Subcompact => "Subcompacto",
            Category::Compact => "Compacto",
            Category::Medium => "Médio",
            Category::Large => "Grande",
            Category::Suv => "Utilitário Esportivo",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Category::Subcompact => &["subcompacto", "subcompact"],
            Category::Compact => &["compacto", "compact"],
            Category::Medium => &["medio", "medium"],
            Category::Large => &["grande", "large"],
            Category::Suv => &["utilitario esportivo", "suv"],
        }
    }

    /// Exact match after folding accents, case and whitespace. Sized
    /// sport-utility labels ("Utilitário Esportivo Compacto") are all `Suv`.
    pub fn classify(raw: &str) -> Option<Category> {
        let folded = normalize_header(raw);
        if folded.is_empty() {
            return None;
        }
        if folded.starts_with("utilitarioesportivo") {
            return Some(Category::Suv);
        }
        Category::ALL.into_iter().find(|c| {
            c.aliases()
                .iter()
                .any(|alias| normalize_header(alias) == folded)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transmission {
    Manual,
    Automatic,
    Cvt,
}

impl Transmission {
    pub const ALL: [Transmission; 3] = [Transmission::Manual, Transmission::Automatic, Transmission::Cvt];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Accepts codes like "M-5", "A-6", "AMT", "CVT" as well as spelled-out names.
    pub fn classify(raw: &str) -> Option<Transmission> {
        let folded = normalize_header(raw);
        if folded.contains("cvt") {
            Some(Transmission::Cvt)
        } else if folded.starts_with('m') {
            Some(Transmission::Manual)
        } else if folded.starts_with('a') {
            Some(Transmission::Automatic)
        } else {
            None
        }
    }
}

/// Displacement class of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineClass {
    UpTo1_0,
    UpTo1_6,
    UpTo2_0,
    Above2_0,
}

impl EngineClass {
    pub const ALL: [EngineClass; 4] = [
        EngineClass::UpTo1_0,
        EngineClass::UpTo1_6,
        EngineClass::UpTo2_0,
        EngineClass::Above2_0,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            EngineClass::UpTo1_0 => "<=1.0",
            EngineClass::UpTo1_6 => "<=1.6",
            EngineClass::UpTo2_0 => "<=2.0",
            EngineClass::Above2_0 => ">2.0",
        }
    }

    /// Classify from the displacement in the engine cell ("1.0 TSI", "2,0",
    /// "16V 1.6"). Values above 20 are taken as cubic centimetres.
    pub fn classify(raw: &str) -> Option<EngineClass> {
        let litres = displacement(raw)?;
        let litres = if litres > 20.0 { litres / 1000.0 } else { litres };
        if litres <= 0.0 {
            None
        } else if litres <= 1.0 {
            Some(EngineClass::UpTo1_0)
        } else if litres <= 1.6 {
            Some(EngineClass::UpTo1_6)
        } else if litres <= 2.0 {
            Some(EngineClass::UpTo2_0)
        } else {
            Some(EngineClass::Above2_0)
        }
    }
}

/// Numbers in the cell with whether they carry a decimal separator.
/// Valve counts written as "16V" are skipped.
fn numbers(raw: &str) -> Vec<(f64, bool)> {
    let mut found = Vec::new();
    let mut rest = raw;
    while let Some(start) = rest.find(|c: char| c.is_ascii_digit()) {
        let tail = &rest[start..];
        let len = tail
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
            .unwrap_or(tail.len());
        let token = tail[..len].trim_end_matches(['.', ',']);
        let valves = tail[len..].starts_with(['v', 'V']);
        if !valves {
            if let Ok(value) = token.replace(',', ".").parse::<f64>() {
                found.push((value, token.contains(['.', ','])));
            }
        }
        rest = &tail[len..];
    }
    found
}

/// Prefer a decimal number ("1.6"), else the first plain one ("1598").
fn displacement(raw: &str) -> Option<f64> {
    let found = numbers(raw);
    found
        .iter()
        .find(|(_, decimal)| *decimal)
        .or_else(|| found.first())
        .map(|(value, _)| *value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Ethanol,
    GasolineDiesel,
    Flex,
    Unknown,
}

impl FuelType {
    pub fn classify(raw: Option<&str>) -> FuelType {
        let Some(raw) = raw else {
            return FuelType::Unknown;
        };
        let folded = normalize_header(raw);
        match folded.as_str() {
            "f" => FuelType::Flex,
            "e" => FuelType::Ethanol,
            "g" | "d" => FuelType::GasolineDiesel,
            s if s.starts_with("flex") => FuelType::Flex,
            s if s.starts_with("etanol") || s.starts_with("alcool") || s.starts_with("ethanol") => {
                FuelType::Ethanol
            }
            s if s.starts_with("gasolina") || s.starts_with("gasoline") || s.starts_with("diesel") => {
                FuelType::GasolineDiesel
            }
            _ => FuelType::Unknown,
        }
    }
}
