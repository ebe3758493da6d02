use std::collections::HashSet;

use tracing::{debug, info};

use super::similarity::weighted_ratio;
use crate::table::{Table, VehicleRecord};

/// Minimum similarity (0-100) for a fuzzy substitution
pub const DEFAULT_THRESHOLD: f64 = 70.0;

/// Outcome of a free-text search.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearch {
    pub working: Table,
    /// Present when the fuzzy fallback ran
    pub message: Option<String>,
    /// Term substituted for the user's first token, if any
    pub substitute: Option<String>,
}

/// Upper-cased whitespace-separated terms of a query
pub fn search_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_uppercase).collect()
}

fn identity_contains(record: &VehicleRecord, term: &str) -> bool {
    let term = term.to_uppercase();
    record.brand.contains(&term) || record.model.contains(&term) || record.year_text.contains(&term)
}

/// Narrow `table` term by term to rows whose brand, model or year contains
/// every term. Stops early once nothing is left.
pub fn filter_by_terms(table: &Table, terms: &[String]) -> Table {
    let mut working = table.clone();
    for term in terms {
        working = working.retain(|record| identity_contains(record, term));
        if working.is_empty() {
            break;
        }
    }
    working
}

/// Distinct non-empty brands, then models, then years, each in first-seen order.
pub fn fuzzy_candidates(table: &Table) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    let columns: [fn(&VehicleRecord) -> &str; 3] = [
        |r| r.brand.as_str(),
        |r| r.model.as_str(),
        |r| r.year_text.as_str(),
    ];
    for column in columns {
        for record in table.rows() {
            let value = column(record).trim();
            if !value.is_empty() && seen.insert(value.to_string()) {
                candidates.push(value.to_string());
            }
        }
    }
    candidates
}

/// Highest-scoring candidate; the earliest one wins a tie.
pub fn best_match<'a>(token: &str, candidates: &'a [String]) -> Option<(&'a str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for candidate in candidates {
        let score = weighted_ratio(token, candidate);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((candidate.as_str(), score)),
        }
    }
    best
}

/// Free-text search over brand, model and year, falling back to the closest
/// known term when the direct match comes up empty.
pub fn search_with_fallback(table: &Table, query: &str, threshold: f64) -> TextSearch {
    let terms = search_terms(query);
    if terms.is_empty() {
        return TextSearch {
            working: table.clone(),
            message: None,
            substitute: None,
        };
    }

    let direct = filter_by_terms(table, &terms);
    if !direct.is_empty() {
        debug!(query, matches = direct.len(), "direct text match");
        return TextSearch {
            working: direct,
            message: None,
            substitute: None,
        };
    }

    let candidates = fuzzy_candidates(table);
    let best = best_match(&terms[0], &candidates);
    match best {
        Some((candidate, score)) if score >= threshold => {
            info!(query, candidate, score, "substituting closest known term");
            let working = table.retain(|record| identity_contains(record, candidate));
            TextSearch {
                working,
                message: Some(format!(
                    "No vehicles found for '{}', showing results similar to '{}'",
                    query.trim(),
                    candidate
                )),
                substitute: Some(candidate.to_string()),
            }
        }
        _ => {
            debug!(query, best = ?best, "no close match");
            TextSearch {
                working: table.with_rows(Vec::new()),
                message: Some(format!("No vehicles found for '{}'", query.trim())),
                substitute: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{read_table, LoadOptions};
    use std::path::Path;

    const DATA: &str = "\
Marca,Modelo,Ano
Toyota,Corolla,2023
Toyota,Yaris,2022
Fiat,Mobi,2023
Honda,Civic,2021
";

    fn table() -> Table {
        read_table(DATA.as_bytes(), Path::new("memory.csv"), &LoadOptions::default()).unwrap()
    }

    #[test]
    fn test_direct_match_needs_every_term() {
        let result = search_with_fallback(&table(), "toyota 2023", DEFAULT_THRESHOLD);
        assert_eq!(result.working.len(), 1);
        assert_eq!(result.working.rows()[0].model, "COROLLA");
        assert!(result.message.is_none());
    }

    #[test]
    fn test_misspelled_brand_falls_back() {
        let result = search_with_fallback(&table(), "TOYOTO", DEFAULT_THRESHOLD);
        assert_eq!(result.substitute.as_deref(), Some("TOYOTA"));
        assert_eq!(result.working.len(), 2);
        let message = result.message.unwrap();
        assert!(message.contains("TOYOTO"));
        assert!(message.contains("TOYOTA"));
    }

    #[test]
    fn test_low_similarity_returns_not_found() {
        let result = search_with_fallback(&table(), "xpto", DEFAULT_THRESHOLD);
        assert!(result.working.is_empty());
        assert!(result.substitute.is_none());
        assert_eq!(result.message.as_deref(), Some("No vehicles found for 'xpto'"));
    }

    #[test]
    fn test_blank_query_returns_everything() {
        let result = search_with_fallback(&table(), "   ", DEFAULT_THRESHOLD);
        assert_eq!(result.working.len(), 4);
        assert!(result.message.is_none());
    }

    #[test]
    fn test_candidates_are_column_major_and_distinct() {
        let candidates = fuzzy_candidates(&table());
        assert_eq!(
            candidates,
            vec!["TOYOTA", "FIAT", "HONDA", "COROLLA", "YARIS", "MOBI", "CIVIC", "2023", "2022", "2021"]
        );
    }

    #[test]
    fn test_ties_keep_first_seen_candidate() {
        let candidates = vec!["ABCD".to_string(), "ABCE".to_string()];
        let (best, _) = best_match("ABCX", &candidates).unwrap();
        assert_eq!(best, "ABCD");
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let first = search_with_fallback(&table(), "civik", DEFAULT_THRESHOLD);
        for _ in 0..5 {
            assert_eq!(search_with_fallback(&table(), "civik", DEFAULT_THRESHOLD), first);
        }
        assert_eq!(first.substitute.as_deref(), Some("CIVIC"));
    }
}
