use std::collections::HashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Header of the optional precomputed ranking column. Matched literally
/// (after trimming), unlike the canonical fields.
pub const FINAL_SCORE_HEADER: &str = "Final Score";

/// Canonical vehicle fields the engine knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Code,
    Brand,
    Model,
    Year,
    Trim,
    Category,
    Engine,
    Transmission,
    AirConditioning,
    PowerSteering,
    Fuel,
    Nmhc,
    Co,
    Nox,
    Co2Ethanol,
    Co2Gasoline,
    CityEthanol,
    HighwayEthanol,
    CityGasoline,
    HighwayGasoline,
    EnergyConsumption,
}

impl Field {
    pub const ALL: [Field; 21] = [
        Field::Code,
        Field::Brand,
        Field::Model,
        Field::Year,
        Field::Trim,
        Field::Category,
        Field::Engine,
        Field::Transmission,
        Field::AirConditioning,
        Field::PowerSteering,
        Field::Fuel,
        Field::Nmhc,
        Field::Co,
        Field::Nox,
        Field::Co2Ethanol,
        Field::Co2Gasoline,
        Field::CityEthanol,
        Field::HighwayEthanol,
        Field::CityGasoline,
        Field::HighwayGasoline,
        Field::EnergyConsumption,
    ];

    /// Stable snake_case name, used in config files and error messages
    pub fn name(self) -> &'static str {
        match self {
            Field::Code => "code",
            Field::Brand => "brand",
            Field::Model => "model",
            Field::Year => "year",
            Field::Trim => "trim",
            Field::Category => "category",
            Field::Engine => "engine",
            Field::Transmission => "transmission",
            Field::AirConditioning => "air_conditioning",
            Field::PowerSteering => "power_steering",
            Field::Fuel => "fuel",
            Field::Nmhc => "nmhc",
            Field::Co => "co",
            Field::Nox => "nox",
            Field::Co2Ethanol => "co2_ethanol",
            Field::Co2Gasoline => "co2_gasoline",
            Field::CityEthanol => "city_ethanol",
            Field::HighwayEthanol => "highway_ethanol",
            Field::CityGasoline => "city_gasoline",
            Field::HighwayGasoline => "highway_gasoline",
            Field::EnergyConsumption => "energy_consumption",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name.trim())
    }

    /// Brand, model and year identify a vehicle; a table without them is unusable.
    pub fn is_mandatory(self) -> bool {
        matches!(self, Field::Brand | Field::Model | Field::Year)
    }

    /// Built-in header spellings, most specific first.
    ///
    /// Candidates are substrings of the normalized header, so short ones
    /// must not occur inside unrelated headers ("co" would hit "combustivel").
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Field::Code => &["codigo", "cod"],
            Field::Brand => &["marca"],
            Field::Model => &["modelo"],
            Field::Year => &["ano"],
            Field::Trim => &["versao"],
            Field::Category => &["categoria"],
            Field::Engine => &["motor"],
            Field::Transmission => &["transmissao", "cambio"],
            Field::AirConditioning => &["ar-condicionado", "ar condicionado", "ar_condicionado"],
            Field::PowerSteering => &["direcao assistida", "direcao_assistida", "direcao"],
            Field::Fuel => &["combustivel"],
            Field::Nmhc => &["nmhc"],
            Field::Co => &["emissao de co (", "co (g/km)", "emissao_co"],
            Field::Nox => &["nox"],
            Field::Co2Ethanol => &[
                "co2 do etanol",
                "co2 etanol",
                "co2 (g/km) etanol",
                "emissao_co2_etanol",
            ],
            Field::Co2Gasoline => &[
                "co2 da gasolina",
                "co2 gasolina",
                "co2 do diesel",
                "emissao_co2_gasolina",
                "emissao de co2 (g",
            ],
            Field::CityEthanol => &["etanol na cidade", "etanol cidade", "etanol_cidade"],
            Field::HighwayEthanol => &["etanol na estrada", "etanol estrada", "etanol_estrada"],
            Field::CityGasoline => &[
                "diesel na cidade",
                "gasolina na cidade",
                "diesel cidade",
                "gasolina_cidade",
                "diesel_cidade",
            ],
            Field::HighwayGasoline => &[
                "diesel na estrada",
                "diesel estrada",
                "gasolina na estrada",
                "gasolina_estrada",
                "diesel_estrada",
            ],
            Field::EnergyConsumption => &["consumo energetico", "consumo_energetico"],
        }
    }
}

/// Fold a header for loose comparison: strip diacritics, lowercase,
/// drop all whitespace.
pub fn normalize_header(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c) && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Return the index of the first header (in column order) whose normalized
/// form contains any normalized candidate.
///
/// An occurrence immediately followed by a digit does not count, so "co"
/// spellings never land on a "co2" column.
pub fn resolve<S: AsRef<str>>(headers: &[String], candidates: &[S]) -> Option<usize> {
    let needles: Vec<String> = candidates
        .iter()
        .map(|c| normalize_header(c.as_ref()))
        .filter(|c| !c.is_empty())
        .collect();

    headers.iter().position(|header| {
        let folded = normalize_header(header);
        needles.iter().any(|needle| contains_bounded(&folded, needle))
    })
}

fn contains_bounded(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        !haystack[start + needle.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub index: usize,
    pub header: String,
}

/// Canonical field -> actual header, built once per table load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: HashMap<Field, ResolvedColumn>,
    final_score: Option<ResolvedColumn>,
}

impl ColumnMap {
    /// Resolve every canonical field against `headers`. `extra` spellings
    /// are tried after the built-in ones.
    pub fn build(headers: &[String], extra: &HashMap<Field, Vec<String>>) -> Self {
        let mut columns = HashMap::new();
        for field in Field::ALL {
            let mut candidates: Vec<&str> = field.candidates().to_vec();
            if let Some(more) = extra.get(&field) {
                candidates.extend(more.iter().map(String::as_str));
            }
            if let Some(index) = resolve(headers, &candidates) {
                columns.insert(
                    field,
                    ResolvedColumn {
                        index,
                        header: headers[index].clone(),
                    },
                );
            }
        }

        let final_score = headers
            .iter()
            .position(|h| h.trim() == FINAL_SCORE_HEADER)
            .map(|index| ResolvedColumn {
                index,
                header: headers[index].clone(),
            });

        Self {
            columns,
            final_score,
        }
    }

    pub fn get(&self, field: Field) -> Option<&ResolvedColumn> {
        self.columns.get(&field)
    }

    pub fn header(&self, field: Field) -> Option<&str> {
        self.get(field).map(|c| c.header.as_str())
    }

    pub fn contains(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn final_score(&self) -> Option<&ResolvedColumn> {
        self.final_score.as_ref()
    }

    /// First mandatory field that failed to resolve, if any
    pub fn missing_mandatory(&self) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.is_mandatory() && !self.contains(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn pbev_headers() -> Vec<String> {
        headers(&[
            "Código",
            "Ano",
            "Categoria",
            "Marca",
            "Modelo",
            "Versão",
            "Motor",
            "Transmissão",
            "Ar-Condicionado",
            "Direção Assistida",
            "Combustível",
            "Emissão de NMHC (g/km)",
            "Emissão de CO (g/km)",
            "Emissão de NOx (g/km)",
            "Emissão de CO2 do etanol (g/km)",
            "Emissão de CO2 da gasolina ou diesel (g/km)",
            "Rendimento do etanol na cidade (km/l)",
            "Rendimento do etanol na estrada (km/l)",
            "Rendimento da gasolina ou diesel na cidade (km/l)",
            "Rendimento da gasolina ou diesel estrada (km/l)",
            "Consumo energético (MJ/km)",
        ])
    }

    #[test]
    fn test_normalize_strips_accents_case_and_spaces() {
        assert_eq!(normalize_header("  Consumo Energético (MJ/km) "), "consumoenergetico(mj/km)");
        assert_eq!(normalize_header("TRANSMISSÃO"), "transmissao");
    }

    #[test]
    fn test_resolve_accent_insensitive() {
        let hs = headers(&["Marca", "Transmissão"]);
        assert_eq!(resolve(&hs, &["transmissao"]), Some(1));
    }

    #[test]
    fn test_resolve_prefers_first_column() {
        let hs = headers(&["Marca", "marca ", "MARCA"]);
        assert_eq!(resolve(&hs, &["marca"]), Some(0));
    }

    #[test]
    fn test_resolve_not_found() {
        let hs = headers(&["Marca", "Modelo"]);
        assert_eq!(resolve(&hs, &["categoria"]), None);
    }

    #[test]
    fn test_build_resolves_every_pbev_field() {
        let hs = pbev_headers();
        let map = ColumnMap::build(&hs, &HashMap::new());
        for field in Field::ALL {
            assert!(map.contains(field), "unresolved {}", field.name());
        }
        assert_eq!(map.header(Field::Co), Some("Emissão de CO (g/km)"));
        assert_eq!(map.header(Field::Co2Ethanol), Some("Emissão de CO2 do etanol (g/km)"));
        assert_eq!(
            map.header(Field::Co2Gasoline),
            Some("Emissão de CO2 da gasolina ou diesel (g/km)")
        );
        assert_eq!(
            map.header(Field::HighwayGasoline),
            Some("Rendimento da gasolina ou diesel estrada (km/l)")
        );
        assert!(map.missing_mandatory().is_none());
    }

    #[test]
    fn test_build_resolves_snake_case_headers() {
        let hs = headers(&[
            "codigo",
            "ano",
            "categoria",
            "marca",
            "modelo",
            "versao",
            "motor",
            "transmissao",
            "ar_condicionado",
            "direcao_assistida",
            "combustivel",
            "emissao_nmhc",
            "emissao_co2_gasolina",
            "emissao_co2_etanol",
            "emissao_co",
            "emissao_nox",
            "rendimento_etanol_cidade",
            "rendimento_etanol_estrada",
            "rendimento_gasolina_cidade",
            "rendimento_gasolina_estrada",
            "consumo_energetico",
        ]);
        let map = ColumnMap::build(&hs, &HashMap::new());
        for field in Field::ALL {
            assert!(map.contains(field), "unresolved {}", field.name());
        }
        assert_eq!(map.header(Field::Co), Some("emissao_co"));
        assert_eq!(map.header(Field::Co2Gasoline), Some("emissao_co2_gasolina"));
        assert_eq!(map.header(Field::Co2Ethanol), Some("emissao_co2_etanol"));
        assert_eq!(map.header(Field::CityEthanol), Some("rendimento_etanol_cidade"));
        assert_eq!(map.header(Field::HighwayGasoline), Some("rendimento_gasolina_estrada"));
    }

    #[test]
    fn test_co_spelling_skips_co2_columns() {
        let hs = headers(&["emissao_co2_gasolina", "emissao_co"]);
        assert_eq!(resolve(&hs, &["emissao_co"]), Some(1));
        assert_eq!(resolve(&hs, &["emissao_co2"]), Some(0));
    }

    #[test]
    fn test_extra_candidates_are_used() {
        let hs = headers(&["Fabricante", "Modelo", "Ano"]);
        let mut extra = HashMap::new();
        extra.insert(Field::Brand, vec!["fabricante".to_string()]);
        let map = ColumnMap::build(&hs, &extra);
        assert_eq!(map.header(Field::Brand), Some("Fabricante"));
    }

    #[test]
    fn test_missing_mandatory_reports_field() {
        let hs = headers(&["Marca", "Ano"]);
        let map = ColumnMap::build(&hs, &HashMap::new());
        assert_eq!(map.missing_mandatory(), Some(Field::Model));
    }

    #[test]
    fn test_final_score_matched_literally() {
        let hs = headers(&["Marca", "final score", " Final Score "]);
        let map = ColumnMap::build(&hs, &HashMap::new());
        assert_eq!(map.final_score().map(|c| c.index), Some(2));
    }

    #[test]
    fn test_field_name_roundtrip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
        }
        assert_eq!(Field::from_name("horsepower"), None);
    }
}
