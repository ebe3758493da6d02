//! Weighted string similarity on a 0-100 scale.
//!
//! Mirrors the usual "weighted ratio" recipe: a plain indel ratio, upgraded
//! by partial (substring) matching when the lengths differ a lot, and by
//! token-sorted / token-set comparisons that ignore word order.

const UNBASE_SCALE: f64 = 0.95;

/// Lowercase, replace anything non-alphanumeric with a space, trim.
pub fn preprocess(s: &str) -> String {
    let mapped: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();
    mapped.trim().to_string()
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(a, b) as f64 / total as f64
}

/// Normalized indel similarity
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best ratio of the shorter string against any equally long window of the
/// longer one (windows are clipped at both ends).
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let n = short.len();
    let mut best: f64 = 0.0;
    // Windows starting before the long string and running past its end
    let first = -(n as isize - 1);
    let last = long.len() as isize - 1;
    for start in first..=last {
        let lo = start.max(0) as usize;
        let hi = ((start + n as isize) as usize).min(long.len());
        if lo >= hi {
            continue;
        }
        best = best.max(ratio_chars(&short, &long[lo..hi]));
        if best >= 100.0 {
            break;
        }
    }
    best
}

fn sorted_tokens(s: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a).join(" "), &sorted_tokens(b).join(" "))
}

struct TokenSets {
    intersection: String,
    diff_ab: String,
    diff_ba: String,
}

fn token_sets(a: &str, b: &str) -> TokenSets {
    let mut ta = sorted_tokens(a);
    let mut tb = sorted_tokens(b);
    ta.dedup();
    tb.dedup();
    let intersection: Vec<&str> = ta.iter().copied().filter(|t| tb.contains(t)).collect();
    let diff_ab: Vec<&str> = ta.iter().copied().filter(|t| !tb.contains(t)).collect();
    let diff_ba: Vec<&str> = tb.iter().copied().filter(|t| !ta.contains(t)).collect();
    TokenSets {
        intersection: intersection.join(" "),
        diff_ab: diff_ab.join(" "),
        diff_ba: diff_ba.join(" "),
    }
}

fn join_nonempty(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{} {}", a, b),
    }
}

pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let sets = token_sets(a, b);
    if sets.intersection.is_empty() && sets.diff_ab.is_empty() && sets.diff_ba.is_empty() {
        return 0.0;
    }
    if !sets.intersection.is_empty() && (sets.diff_ab.is_empty() || sets.diff_ba.is_empty()) {
        return 100.0;
    }

    let combined_ab = join_nonempty(&sets.intersection, &sets.diff_ab);
    let combined_ba = join_nonempty(&sets.intersection, &sets.diff_ba);
    let mut best = ratio(&combined_ab, &combined_ba);
    if !sets.intersection.is_empty() {
        best = best
            .max(ratio(&sets.intersection, &combined_ab))
            .max(ratio(&sets.intersection, &combined_ba));
    }
    best
}

fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let sets = token_sets(a, b);
    if !sets.intersection.is_empty() {
        return 100.0;
    }
    let sorted = partial_ratio(&sorted_tokens(a).join(" "), &sorted_tokens(b).join(" "));
    sorted.max(partial_ratio(&sets.diff_ab, &sets.diff_ba))
}

/// Weighted ratio of two strings, 0..=100. Inputs are preprocessed first.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let a = preprocess(a);
    let b = preprocess(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let len_a = a.chars().count() as f64;
    let len_b = b.chars().count() as f64;
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    let base = ratio(&a, &b);
    if len_ratio < 1.5 {
        let token = token_sort_ratio(&a, &b).max(token_set_ratio(&a, &b));
        return base.max(token * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    let best = base.max(partial_ratio(&a, &b) * partial_scale);
    best.max(partial_token_ratio(&a, &b) * UNBASE_SCALE * partial_scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(weighted_ratio("TOYOTA", "toyota"), 100.0);
    }

    #[test]
    fn test_single_typo_scores_high() {
        let score = weighted_ratio("TOYOTO", "TOYOTA");
        assert!((score - 83.333).abs() < 0.01, "got {}", score);
    }

    #[test]
    fn test_unrelated_strings_score_low() {
        assert!(weighted_ratio("XPTO", "TOYOTA") < 70.0);
        assert!(weighted_ratio("ZZZZ", "FIAT") < 40.0);
    }

    #[test]
    fn test_ratio_basics() {
        assert_eq!(ratio("", ""), 100.0);
        assert_eq!(ratio("abc", ""), 0.0);
        assert!((ratio("abcd", "abce") - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_ratio_finds_substring() {
        assert_eq!(partial_ratio("corolla", "corolla cross xre"), 100.0);
    }

    #[test]
    fn test_partial_match_is_scaled() {
        // Length ratio >= 1.5 routes through partial matching at 0.9
        let score = weighted_ratio("ONIX", "ONIX PLUS PREMIER");
        assert!((score - 90.0).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_token_order_is_ignored() {
        assert_eq!(token_sort_ratio("cross corolla", "corolla cross"), 100.0);
        assert!(weighted_ratio("cross corolla", "corolla cross") > 94.9);
    }

    #[test]
    fn test_token_set_subset() {
        assert_eq!(token_set_ratio("corolla", "corolla altis"), 100.0);
    }

    #[test]
    fn test_preprocess() {
        assert_eq!(preprocess("  HB-20s! "), "hb 20s");
    }
}
