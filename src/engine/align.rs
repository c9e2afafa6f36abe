// ============================================================================
// Engine : Comparison data alignment
// ============================================================================
// Merges N independent, possibly-gapped NAV histories onto one shared date
// axis so they can be charted together:
//
//   1. union of every date string across all histories
//   2. chronological ascending sort
//   3. window to the most recent 100 dates
//   4. one row per date, value-or-absent cell per fund (exact-date lookup)
//   5. drop rows where every cell is absent
//
// Upstream dates are DD-MM-YYYY, which do not sort lexicographically, so the
// sort key is a parsed NaiveDate with string order as the last resort.
// ============================================================================

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::models::FundDetail;

/// Rows retained after windowing, newest-first trimmed to this many dates.
pub const MAX_CHART_ROWS: usize = 100;

/// Scheme names longer than this are truncated in series labels.
const LABEL_NAME_CHARS: usize = 30;

/// One row of the merged table: a date and one cell per fund, positionally
/// parallel to `ComparisonTable::labels`. `None` = that fund has no entry
/// for this date.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub date: String,
    pub cells: Vec<Option<f64>>,
}

/// The merged, windowed comparison table.
#[derive(Debug, Clone, Default)]
pub struct ComparisonTable {
    /// One series label per fund, in selection order.
    pub labels: Vec<String>,
    pub rows: Vec<ChartRow>,
}

impl ComparisonTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Extracts one fund's series as (row index, value) points, skipping
    /// absent cells. Ready for a ratatui `Dataset`.
    pub fn series_points(&self, fund_index: usize) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                row.cells
                    .get(fund_index)
                    .copied()
                    .flatten()
                    .map(|nav| (i as f64, nav))
            })
            .collect()
    }

    /// Min and max over every present cell, for chart axis bounds.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let mut bounds: Option<(f64, f64)> = None;
        for row in &self.rows {
            for nav in row.cells.iter().copied().flatten() {
                bounds = Some(match bounds {
                    Some((min, max)) => (min.min(nav), max.max(nav)),
                    None => (nav, nav),
                });
            }
        }
        bounds
    }
}

/// Builds the stable, unique series label for a fund: the scheme name
/// truncated to its first 30 characters plus an ellipsis marker, with the
/// scheme code appended in parentheses. The code keeps labels distinct even
/// when two names share the same prefix.
pub fn series_label(detail: &FundDetail) -> String {
    let truncated: String = detail.fund.scheme_name.chars().take(LABEL_NAME_CHARS).collect();
    format!("{}... ({})", truncated, detail.fund.scheme_code)
}

// Chronological sort key for an upstream date string. DD-MM-YYYY first
// (mfapi's format), ISO second; both failing falls back to string order,
// which at least keeps the sort deterministic.
fn date_sort_key(date: &str) -> (Option<NaiveDate>, String) {
    let parsed = NaiveDate::parse_from_str(date, "%d-%m-%Y")
        .or_else(|_| NaiveDate::parse_from_str(date, "%Y-%m-%d"))
        .ok();
    if parsed.is_none() {
        warn!(date, "Unparsable date, falling back to string ordering");
    }
    (parsed, date.to_string())
}

/// Aligns the given fund histories onto one shared date axis.
///
/// Input order = selection order; it is preserved in `labels` and in each
/// row's cells. Output has at most [`MAX_CHART_ROWS`] rows.
pub fn align(details: &[FundDetail]) -> ComparisonTable {
    if details.is_empty() {
        return ComparisonTable::default();
    }

    // Union of all date strings
    let mut dates = BTreeSet::new();
    for detail in details {
        for entry in &detail.data {
            dates.insert(entry.date.as_str());
        }
    }

    // Chronological ascending, then keep the most recent window
    let mut sorted: Vec<&str> = dates.into_iter().collect();
    sorted.sort_by_cached_key(|date| date_sort_key(date));
    let window_start = sorted.len().saturating_sub(MAX_CHART_ROWS);
    let window = &sorted[window_start..];

    // Per-fund exact-date lookup maps; NAV text parses to the cell value
    let lookups: Vec<HashMap<&str, f64>> = details
        .iter()
        .map(|detail| {
            detail
                .data
                .iter()
                .filter_map(|entry| {
                    entry
                        .nav
                        .trim()
                        .parse::<f64>()
                        .ok()
                        .map(|nav| (entry.date.as_str(), nav))
                })
                .collect()
        })
        .collect();

    let labels = details.iter().map(series_label).collect();

    let rows: Vec<ChartRow> = window
        .iter()
        .map(|&date| ChartRow {
            date: date.to_string(),
            cells: lookups.iter().map(|lookup| lookup.get(date).copied()).collect(),
        })
        // Guards against an all-null window edge case; every windowed date
        // normally originates from at least one fund.
        .filter(|row| row.cells.iter().any(Option::is_some))
        .collect();

    debug!(
        funds = details.len(),
        rows = rows.len(),
        "Comparison table aligned"
    );

    ComparisonTable { labels, rows }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fund, NavEntry};

    fn detail(code: u32, name: &str, entries: &[(&str, &str)]) -> FundDetail {
        FundDetail::new(
            Fund::new(code, name),
            entries
                .iter()
                .map(|&(date, nav)| NavEntry::new(date, nav))
                .collect(),
        )
    }

    #[test]
    fn test_union_axis_with_gaps() {
        // Spec scenario: A has 01+02 Jan, B has 02+03 Jan
        let a = detail(1, "Fund A", &[("2024-01-01", "10.0"), ("2024-01-02", "11.0")]);
        let b = detail(2, "Fund B", &[("2024-01-02", "20.0"), ("2024-01-03", "21.0")]);

        let table = align(&[a, b]);

        let dates: Vec<&str> = table.rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);

        // Row for 01 Jan: A's value present, B absent
        assert_eq!(table.rows[0].cells, vec![Some(10.0), None]);
        assert_eq!(table.rows[1].cells, vec![Some(11.0), Some(20.0)]);
        assert_eq!(table.rows[2].cells, vec![None, Some(21.0)]);
    }

    #[test]
    fn test_dd_mm_yyyy_sorts_chronologically() {
        // Lexicographic order would put 02-01-2024 (Jan 2) after 01-12-2023
        // only by accident of the day field; month/year dominate here.
        let a = detail(
            1,
            "Fund A",
            &[("02-01-2024", "12.0"), ("15-12-2023", "10.0"), ("01-01-2024", "11.0")],
        );

        let table = align(&[a]);
        let dates: Vec<&str> = table.rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["15-12-2023", "01-01-2024", "02-01-2024"]);
    }

    #[test]
    fn test_window_caps_at_100_most_recent() {
        let entries: Vec<(String, String)> = (0..250)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2023, 1, 1)
                    .unwrap()
                    .checked_add_days(chrono::Days::new(i))
                    .unwrap();
                (date.format("%d-%m-%Y").to_string(), format!("{}", 100 + i))
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = entries
            .iter()
            .map(|(d, n)| (d.as_str(), n.as_str()))
            .collect();
        let a = detail(1, "Fund A", &borrowed);

        let table = align(&[a]);
        assert_eq!(table.rows.len(), MAX_CHART_ROWS);

        // The retained rows are the most recent ones
        assert_eq!(table.rows.last().unwrap().cells[0], Some(349.0));
        assert_eq!(table.rows.first().unwrap().cells[0], Some(250.0));
    }

    #[test]
    fn test_cells_come_from_exact_date_entries() {
        let a = detail(1, "Fund A", &[("01-01-2024", "10.5")]);
        let b = detail(2, "Fund B", &[("02-01-2024", "20.25")]);

        let table = align(&[a, b]);
        for row in &table.rows {
            for (i, cell) in row.cells.iter().enumerate() {
                if let Some(nav) = cell {
                    // A non-null cell must match an actual history entry
                    let expected = if i == 0 { (10.5, "01-01-2024") } else { (20.25, "02-01-2024") };
                    assert_eq!(*nav, expected.0);
                    assert_eq!(row.date, expected.1);
                }
            }
        }
    }

    #[test]
    fn test_unparsable_nav_is_absent_cell() {
        let a = detail(1, "Fund A", &[("01-01-2024", "bogus"), ("02-01-2024", "10.0")]);
        let b = detail(2, "Fund B", &[("01-01-2024", "5.0")]);

        let table = align(&[a, b]);
        assert_eq!(table.rows[0].cells, vec![None, Some(5.0)]);
        assert_eq!(table.rows[1].cells, vec![Some(10.0), None]);
    }

    #[test]
    fn test_all_null_rows_dropped() {
        // Single fund whose only entry has unparsable NAV text: its date
        // survives the union but produces an all-null row, which is dropped.
        let a = detail(1, "Fund A", &[("01-01-2024", "x"), ("02-01-2024", "10.0")]);

        let table = align(&[a]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].date, "02-01-2024");
    }

    #[test]
    fn test_labels_unique_on_shared_prefix() {
        let shared = "Axis Bluechip Fund Direct Growth Plan Something";
        let a = detail(120503, shared, &[]);
        let b = detail(120504, shared, &[]);

        let la = series_label(&a);
        let lb = series_label(&b);
        assert_ne!(la, lb);
        assert_eq!(la, "Axis Bluechip Fund Direct Grow... (120503)");
        assert_eq!(lb, "Axis Bluechip Fund Direct Grow... (120504)");
    }

    #[test]
    fn test_empty_input() {
        let table = align(&[]);
        assert!(table.is_empty());
        assert!(table.labels.is_empty());
    }

    #[test]
    fn test_series_points_skip_gaps() {
        let a = detail(1, "A", &[("01-01-2024", "1.0"), ("03-01-2024", "3.0")]);
        let b = detail(2, "B", &[("02-01-2024", "2.0")]);

        let table = align(&[a, b]);
        assert_eq!(table.series_points(0), vec![(0.0, 1.0), (2.0, 3.0)]);
        assert_eq!(table.series_points(1), vec![(1.0, 2.0)]);
        assert_eq!(table.value_bounds(), Some((1.0, 3.0)));
    }
}
