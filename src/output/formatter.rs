use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::query::{Comparison, MetricComparison, RankPage, Side};
use crate::scoring::{ProfileWeights, ScoredVehicle};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Composite scores are small fractions; four decimals tell them apart.
pub fn format_score(score: f64) -> String {
    format!("{:.4}", score)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// "BRAND MODEL TRIM" for display
fn vehicle_title(scored: &ScoredVehicle) -> String {
    let record = &scored.record;
    match record.trim.as_deref() {
        Some(trim) => format!("{} {} {}", record.brand, record.model, trim),
        None => format!("{} {}", record.brand, record.model),
    }
}

/// Format a page as a table: index, score, year, fuel, vehicle.
/// Indices continue across pages (page 2 of size 20 starts at 21).
pub fn format_page_table(page: &RankPage, use_colors: bool) -> String {
    let mut lines = Vec::new();

    if let Some(message) = &page.message {
        lines.push(if use_colors {
            message.yellow().to_string()
        } else {
            message.clone()
        });
    }

    if page.results.is_empty() {
        if page.message.is_none() {
            lines.push("No vehicles found.".to_string());
        }
        return lines.join("\n");
    }

    let term_width = get_terminal_width();
    let index_width = 4;
    let score_width = 7;
    let year_width = 6;
    let fuel_width = 4;
    let separator = "  ";
    let fixed_width = index_width + 1 + score_width + year_width + fuel_width + separator.len() * 3;
    let offset = (page.page - 1) * page.page_size;

    for (idx, scored) in page.results.iter().enumerate() {
        let index_str = format!("{:>3}.", offset + idx + 1);
        let score_str = format!("{:>width$}", format_score(scored.score), width = score_width);
        let year_str = format!("{:<width$}", scored.record.year_text, width = year_width);
        let fuel_str = format!(
            "{:<width$}",
            scored.record.fuel.as_deref().unwrap_or("-"),
            width = fuel_width
        );

        let title = vehicle_title(scored);
        let title = match term_width {
            Some(width) if width > fixed_width + 10 => truncate(&title, width - fixed_width),
            Some(_) => truncate(&title, 20),
            None => title,
        };

        let line = if use_colors {
            format!(
                "{} {}{}{}{}{}{}{}",
                index_str.dimmed(),
                score_str.bold(),
                separator,
                year_str,
                separator,
                fuel_str.cyan(),
                separator,
                title
            )
        } else {
            format!(
                "{} {}{}{}{}{}{}{}",
                index_str, score_str, separator, year_str, separator, fuel_str, separator, title
            )
        };
        lines.push(line);
    }

    let shown_to = offset + page.results.len();
    lines.push(format!(
        "Showing {}-{} of {} (page {})",
        offset + 1,
        shown_to,
        page.total,
        page.page
    ));

    lines.join("\n")
}

/// Per-component breakdown for one vehicle (verbose mode)
pub fn format_breakdown(scored: &ScoredVehicle) -> String {
    let b = &scored.score_breakdown;
    format!(
        "{}\n  Category:     {:.4}\n  Engine:       {:.4}\n  Transmission: {:.4}\n  NMHC ({:?}):    {:.4}\n  CO ({:?}):      {:.4}\n  NOx ({:?}):     {:.4}\n  CO2 ({:?}):     {:.4}\n  Energy ({:?}):  {:.4}\n  Total:        {:.4}",
        vehicle_title(scored),
        b.category,
        b.engine,
        b.transmission,
        b.cohorts.nmhc,
        b.nmhc,
        b.cohorts.co,
        b.co,
        b.cohorts.nox,
        b.nox,
        b.co2_cohort,
        b.co2,
        b.cohorts.energy,
        b.energy,
        b.total
    )
}

/// Full record of one vehicle followed by its score breakdown
pub fn format_vehicle(scored: &ScoredVehicle) -> String {
    let r = &scored.record;
    let number = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{}", v));
    let rows = [
        ("Code", r.code.clone()),
        ("Year", Some(r.year_text.clone()).filter(|y| !y.is_empty())),
        ("Category", r.category.clone()),
        ("Engine", r.engine.clone()),
        ("Transmission", r.transmission.clone()),
        ("Fuel", r.fuel.clone()),
        ("A/C", r.air_conditioning.clone()),
        ("Steering", r.power_steering.clone()),
    ];

    let mut lines = vec![vehicle_title(scored)];
    for (label, value) in rows {
        lines.push(format!("  {:<16}{}", format!("{}:", label), value.as_deref().unwrap_or("-")));
    }
    let metrics = [
        ("NMHC g/km", r.nmhc),
        ("CO g/km", r.co),
        ("NOx g/km", r.nox),
        ("CO2 E g/km", r.co2_ethanol),
        ("CO2 G/D g/km", r.co2_gasoline),
        ("City E km/l", r.city_ethanol),
        ("Hwy E km/l", r.highway_ethanol),
        ("City G/D km/l", r.city_gasoline),
        ("Hwy G/D km/l", r.highway_gasoline),
        ("Energy MJ/km", r.energy_consumption),
    ];
    for (label, value) in metrics {
        lines.push(format!("  {:<16}{}", format!("{}:", label), number(value)));
    }
    lines.push(format_breakdown(scored));
    lines.join("\n")
}

const BAR_WIDTH: usize = 20;

/// Bar length relative to the larger of the two values
fn bar_len(value: f64, max: f64) -> usize {
    if max <= 0.0 || value <= 0.0 {
        0
    } else {
        ((value / max) * BAR_WIDTH as f64).round() as usize
    }
}

fn comparison_line(label: &str, value: Option<f64>, max: f64, side: Side, metric: &MetricComparison, use_colors: bool) -> String {
    let label = format!("{:<20}", truncate(label, 20));
    let Some(value) = value else {
        return format!("  {} -", label);
    };
    let bar = "#".repeat(bar_len(value, max));
    let padded = format!("{:<width$}", bar, width = BAR_WIDTH);
    let value = format!("{:.4}", value);

    if !use_colors {
        return format!("  {} {} {}", label, padded, value);
    }
    match metric.better {
        Some(better) if better == side => format!("  {} {} {}", label, padded.green(), value),
        Some(_) => format!("  {} {} {}", label, padded.red(), value),
        None => format!("  {} {} {}", label, padded, value),
    }
}

/// Side-by-side metric bars; the better side is green when colors are on.
pub fn format_comparison(cmp: &Comparison, use_colors: bool) -> String {
    let left = vehicle_title(&cmp.left);
    let right = vehicle_title(&cmp.right);
    let mut lines = vec![format!("{}  vs  {}", left, right)];

    for m in &cmp.metrics {
        let max = m.left.into_iter().chain(m.right).fold(0.0_f64, f64::max);
        let direction = if m.lower_is_better { "lower is better" } else { "higher is better" };
        let heading = if m.unit.is_empty() {
            format!("{} ({})", m.metric, direction)
        } else {
            format!("{} {} ({})", m.metric, m.unit, direction)
        };
        lines.push(if use_colors { heading.bold().to_string() } else { heading });
        lines.push(comparison_line(&left, m.left, max, Side::Left, m, use_colors));
        lines.push(comparison_line(&right, m.right, max, Side::Right, m, use_colors));
    }
    lines.join("\n")
}

/// Effective weights of one profile, block by block
pub fn format_profile(weights: &ProfileWeights) -> String {
    let mut lines = vec![format!("Profile {}", weights.profile)];
    for (name, block) in weights.blocks() {
        let scale = crate::scoring::profile::block_scale(name);
        let values: Vec<String> = block.iter().map(|w| format!("{:.4}", w * scale)).collect();
        lines.push(format!("  {:<13}{}", name, values.join("  ")));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{compare, rank, RankQuery};
    use crate::scoring::weights;
    use crate::table::{read_table, LoadOptions};
    use std::path::Path;

    fn page() -> RankPage {
        let data = "Marca,Modelo,Ano,Versão,Combustível,Emissão de CO (g/km)\nFiat,Mobi,2023,Like,F,0.2\nToyota,Corolla,2023,,F,0.3\n";
        let table = read_table(data.as_bytes(), Path::new("memory.csv"), &LoadOptions::default()).unwrap();
        rank(&table, &RankQuery::default())
    }

    #[test]
    fn test_format_score_four_decimals() {
        assert_eq!(format_score(0.105555), "0.1056");
        assert_eq!(format_score(0.0), "0.0000");
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(truncate("This is a very long title", 15), "This is a ve...");
        assert_eq!(truncate("Short", 20), "Short");
        assert_eq!(truncate("Hello world", 3), "Hel");
    }

    #[test]
    fn test_page_table_lines() {
        let result = format_page_table(&page(), false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("  1."));
        assert!(lines[0].contains("FIAT MOBI Like"));
        assert!(lines[1].contains("TOYOTA COROLLA"));
        assert_eq!(lines[2], "Showing 1-2 of 2 (page 1)");
    }

    #[test]
    fn test_page_table_empty_with_message() {
        let empty = RankPage {
            total: 0,
            page: 1,
            page_size: 20,
            message: Some("No vehicles found for 'xpto'".to_string()),
            results: vec![],
        };
        assert_eq!(format_page_table(&empty, false), "No vehicles found for 'xpto'");
    }

    #[test]
    fn test_page_table_empty_without_message() {
        let empty = RankPage {
            total: 0,
            page: 3,
            page_size: 20,
            message: None,
            results: vec![],
        };
        assert_eq!(format_page_table(&empty, false), "No vehicles found.");
    }

    #[test]
    fn test_breakdown_lists_components() {
        let page = page();
        let text = format_breakdown(&page.results[0]);
        assert!(text.starts_with("FIAT MOBI Like"));
        assert!(text.contains("CO (Q1)"));
        assert!(text.contains("Total:"));
    }

    fn comparison() -> Comparison {
        let data = "Código,Marca,Modelo,Ano,Combustível,Emissão de CO (g/km),Emissão de NOx (g/km)\n1,Fiat,Mobi,2023,F,0.2,\n2,Ford,Ranger,2023,D,0.5,0.08\n";
        let table = read_table(data.as_bytes(), Path::new("memory.csv"), &LoadOptions::default()).unwrap();
        compare(&table, &"1".parse().unwrap(), &"2".parse().unwrap(), 1).unwrap()
    }

    #[test]
    fn test_bar_len_scales_to_larger_value() {
        assert_eq!(bar_len(0.5, 0.5), 20);
        assert_eq!(bar_len(0.2, 0.5), 8);
        assert_eq!(bar_len(1.0, 0.0), 0);
    }

    #[test]
    fn test_comparison_bars() {
        let text = format_comparison(&comparison(), false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "FIAT MOBI  vs  FORD RANGER");
        // header + three lines per metric
        assert_eq!(lines.len(), 1 + 8 * 3);

        let co = lines.iter().position(|l| l.starts_with("co g/km")).unwrap();
        assert!(lines[co].contains("lower is better"));
        assert!(lines[co + 1].contains(&format!("{} 0.2000", format!("{:<20}", "#".repeat(8)))));
        assert!(lines[co + 2].contains(&"#".repeat(20)));
        assert!(lines[co + 2].ends_with("0.5000"));
    }

    #[test]
    fn test_comparison_missing_value_shows_dash() {
        let text = format_comparison(&comparison(), false);
        let lines: Vec<&str> = text.lines().collect();
        let nox = lines.iter().position(|l| l.starts_with("nox g/km")).unwrap();
        assert!(lines[nox + 1].ends_with(" -"));
        assert!(lines[nox + 2].ends_with("0.0800"));
    }

    #[test]
    fn test_format_vehicle_lists_fields_and_breakdown() {
        let cmp = comparison();
        let text = format_vehicle(&cmp.right);
        assert!(text.starts_with("FORD RANGER"));
        assert!(text.contains("  Code:           2"));
        assert!(text.contains("  Category:       -"));
        assert!(text.contains("  CO g/km:        0.5"));
        assert!(text.contains("Total:"));
    }

    #[test]
    fn test_format_profile() {
        let text = format_profile(weights(1));
        assert!(text.starts_with("Profile 1"));
        assert!(text.contains("category     0.0000  0.0278"));
        assert_eq!(text.lines().count(), 9);
    }
}
