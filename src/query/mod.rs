pub mod lookup;
pub mod ranker;

pub use lookup::{compare, show, Comparison, MetricComparison, Side, VehicleSelector};
pub use ranker::{paginate, sort_scored, Paging, SortMode, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use serde::Serialize;
use tracing::{debug, warn};

use crate::filter::{apply_cascade, FilterSet};
use crate::scoring::{score_working_set, weights, ScoredVehicle};
use crate::search::{search_with_fallback, DEFAULT_THRESHOLD};
use crate::table::Table;

pub const NO_MATCH_MESSAGE: &str = "No vehicles matched the given filters";

/// Structured ranking request.
#[derive(Debug, Clone, PartialEq)]
pub struct RankQuery {
    pub filters: FilterSet,
    /// Weight profile; values outside 1..=5 fall back to profile 1
    pub profile: i64,
    pub paging: Paging,
    pub sort: SortMode,
}

impl Default for RankQuery {
    fn default() -> Self {
        Self {
            filters: FilterSet::default(),
            profile: 1,
            paging: Paging::default(),
            sort: SortMode::Composite,
        }
    }
}

/// Free-text request over brand, model and year.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub profile: i64,
    pub paging: Paging,
    /// Minimum fuzzy similarity (0-100) for a substitution
    pub threshold: f64,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: String::new(),
            profile: 1,
            paging: Paging::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// One page of ranked vehicles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankPage {
    /// Matches after filtering, before pagination
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub results: Vec<ScoredVehicle>,
}

/// Score, order and page a working set that has already been filtered.
fn rank_working_set(
    working: &Table,
    profile: i64,
    mut sort: SortMode,
    paging: Paging,
    message: Option<String>,
) -> RankPage {
    if sort == SortMode::Precomputed && working.columns().final_score().is_none() {
        warn!("no 'Final Score' column, ranking by composite score");
        sort = SortMode::Composite;
    }

    let mut scored = score_working_set(working, weights(profile));
    sort_scored(&mut scored, sort);

    let total = scored.len();
    let results = paginate(scored, paging);
    debug!(total, returned = results.len(), page = paging.page(), "ranked");

    RankPage {
        total,
        page: paging.page(),
        page_size: paging.page_size(),
        message,
        results,
    }
}

/// Filter cascade -> cohort binning -> scoring -> sort -> page.
pub fn rank(table: &Table, query: &RankQuery) -> RankPage {
    let working = apply_cascade(table, &query.filters.predicates());
    let message = working.is_empty().then(|| NO_MATCH_MESSAGE.to_string());
    rank_working_set(&working, query.profile, query.sort, query.paging, message)
}

/// Free-text search with fuzzy fallback, then scored and paged like `rank`.
pub fn search(table: &Table, query: &SearchQuery) -> RankPage {
    let outcome = search_with_fallback(table, &query.text, query.threshold);
    rank_working_set(
        &outcome.working,
        query.profile,
        SortMode::Composite,
        query.paging,
        outcome.message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{read_table, LoadOptions};
    use std::path::Path;

    const DATA: &str = "\
Ano,Categoria,Marca,Modelo,Motor,Transmissão,Combustível,Emissão de NMHC (g/km),Emissão de CO (g/km),Emissão de NOx (g/km),Emissão de CO2 do etanol (g/km),Emissão de CO2 da gasolina ou diesel (g/km),Consumo energético (MJ/km),Final Score
2023,Subcompacto,Fiat,Mobi,1.0,M-5,F,0.010,0.20,0.008,80,85,1.30,4
2023,Compacto,Toyota,Yaris,1.5,CVT,F,0.015,0.25,0.010,90,95,1.45,9
2023,Médio,Toyota,Corolla,2.0,CVT,F,0.020,0.30,0.012,100,105,1.60,7
2023,Grande,Ford,Ranger,3.0,A-6,D,0.040,0.50,0.080,,230,2.80,1
2022,Compacto,Fiat,Argo,1.0,M-5,F,0.012,0.22,0.009,85,90,1.35,
";

    fn table() -> Table {
        read_table(DATA.as_bytes(), Path::new("memory.csv"), &LoadOptions::default()).unwrap()
    }

    fn models(page: &RankPage) -> Vec<&str> {
        page.results.iter().map(|s| s.record.model.as_str()).collect()
    }

    #[test]
    fn test_rank_orders_best_first() {
        let page = rank(&table(), &RankQuery::default());
        assert_eq!(page.total, 5);
        assert_eq!(page.results.first().map(|s| s.record.model.as_str()), Some("MOBI"));
        assert_eq!(page.results.last().map(|s| s.record.model.as_str()), Some("RANGER"));
        for pair in page.results.windows(2) {
            assert!(pair[0].score <= pair[1].score);
        }
        assert!(page.message.is_none());
    }

    #[test]
    fn test_rank_paginates_after_counting() {
        let query = RankQuery {
            paging: Paging::new(2, 2),
            ..RankQuery::default()
        };
        let page = rank(&table(), &query);
        assert_eq!(page.total, 5);
        assert_eq!(page.page, 2);
        assert_eq!(page.page_size, 2);
        assert_eq!(page.results.len(), 2);
    }

    #[test]
    fn test_cohorts_follow_the_filtered_set() {
        let everything = rank(&table(), &RankQuery::default());
        let yaris_all = everything
            .results
            .iter()
            .find(|s| s.record.model == "YARIS")
            .unwrap()
            .score_breakdown
            .cohorts
            .co;

        let toyota_only = RankQuery {
            filters: FilterSet {
                brand: Some("toyota".to_string()),
                ..FilterSet::default()
            },
            ..RankQuery::default()
        };
        let page = rank(&table(), &toyota_only);
        assert_eq!(models(&page), vec!["YARIS", "COROLLA"]);
        let yaris_filtered = page.results[0].score_breakdown.cohorts.co;
        assert_ne!(yaris_all, yaris_filtered);
    }

    #[test]
    fn test_empty_filter_result_has_message() {
        let query = RankQuery {
            filters: FilterSet {
                year: Some(1999),
                ..FilterSet::default()
            },
            ..RankQuery::default()
        };
        let page = rank(&table(), &query);
        assert_eq!(page.total, 0);
        assert!(page.results.is_empty());
        assert_eq!(page.message.as_deref(), Some(NO_MATCH_MESSAGE));
    }

    #[test]
    fn test_precomputed_ranking() {
        let query = RankQuery {
            sort: SortMode::Precomputed,
            ..RankQuery::default()
        };
        let page = rank(&table(), &query);
        assert_eq!(models(&page), vec!["YARIS", "COROLLA", "MOBI", "RANGER", "ARGO"]);
    }

    #[test]
    fn test_precomputed_without_column_uses_composite() {
        let data = "Marca,Modelo,Ano,Emissão de CO (g/km)\nA,X,2023,0.9\nB,Y,2023,0.1\n";
        let t = read_table(data.as_bytes(), Path::new("memory.csv"), &LoadOptions::default()).unwrap();
        let query = RankQuery {
            sort: SortMode::Precomputed,
            ..RankQuery::default()
        };
        let page = rank(&t, &query);
        assert_eq!(models(&page), vec!["Y", "X"]);
    }

    #[test]
    fn test_search_fuzzy_fallback_is_scored() {
        let query = SearchQuery {
            text: "Toyoto".to_string(),
            ..SearchQuery::default()
        };
        let page = search(&table(), &query);
        assert_eq!(page.total, 2);
        assert!(page.message.unwrap().contains("TOYOTA"));
        assert!(page.results.iter().all(|s| s.record.brand == "TOYOTA"));
    }

    #[test]
    fn test_search_not_found() {
        let query = SearchQuery {
            text: "qwerty".to_string(),
            ..SearchQuery::default()
        };
        let page = search(&table(), &query);
        assert_eq!(page.total, 0);
        assert_eq!(page.message.as_deref(), Some("No vehicles found for 'qwerty'"));
    }

    #[test]
    fn test_page_json_shape() {
        let page = rank(&table(), &RankQuery::default());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["total"], 5);
        assert_eq!(json["pageSize"], 20);
        assert!(json.get("message").is_none());
        assert!(json["results"][0]["scoreBreakdown"].is_object());
        // Ranger has no ethanol CO2 figure
        let ranger = json["results"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["model"] == "RANGER")
            .unwrap();
        assert!(ranger["co2Ethanol"].is_null());
    }
}
