// ============================================================================
// Engine : Fund filtering
// ============================================================================
// Narrows the full catalog down to the visible subset. All predicates are
// ANDed; an unset predicate matches everything; catalog order is preserved.
// Facet lists (distinct category / fund house / scheme type values) depend
// only on the unfiltered catalog, so the app derives them once per catalog
// load instead of per keystroke.
// ============================================================================

use std::collections::BTreeSet;

use crate::models::Fund;

/// The active filter configuration. Default = match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundFilter {
    /// Case-insensitive substring match against scheme name or fund house.
    pub search_text: Option<String>,
    /// Exact match against `scheme_category`.
    pub category: Option<String>,
    /// Exact match against `fund_house`.
    pub fund_house: Option<String>,
    /// Exact match against `scheme_type`.
    pub scheme_type: Option<String>,
    /// Inclusive lower NAV bound (fund NAV treated as 0 when absent).
    pub min_nav: Option<f64>,
    /// Inclusive upper NAV bound.
    pub max_nav: Option<f64>,
}

impl FundFilter {
    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether a single fund passes every active predicate.
    pub fn matches(&self, fund: &Fund) -> bool {
        if let Some(text) = &self.search_text {
            let needle = text.to_lowercase();
            let in_name = fund.scheme_name.to_lowercase().contains(&needle);
            let in_house = fund
                .fund_house
                .as_ref()
                .map(|h| h.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_name && !in_house {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if fund.scheme_category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }

        if let Some(house) = &self.fund_house {
            if fund.fund_house.as_deref() != Some(house.as_str()) {
                return false;
            }
        }

        if let Some(scheme_type) = &self.scheme_type {
            if fund.scheme_type.as_deref() != Some(scheme_type.as_str()) {
                return false;
            }
        }

        let nav = fund.nav_or_zero();
        if let Some(min) = self.min_nav {
            if nav < min {
                return false;
            }
        }
        if let Some(max) = self.max_nav {
            if nav > max {
                return false;
            }
        }

        true
    }

    /// Returns the indices of the catalog entries passing the filter, in
    /// catalog order. Indices (not clones) keep the scan cheap on large
    /// catalogs.
    pub fn apply_indices(&self, catalog: &[Fund]) -> Vec<usize> {
        catalog
            .iter()
            .enumerate()
            .filter(|(_, fund)| self.matches(fund))
            .map(|(i, _)| i)
            .collect()
    }

    /// Convenience for callers wanting the funds themselves.
    pub fn apply<'a>(&self, catalog: &'a [Fund]) -> Vec<&'a Fund> {
        catalog.iter().filter(|fund| self.matches(fund)).collect()
    }
}

/// Distinct facet values for the filter dropdowns, each sorted
/// lexicographically.
#[derive(Debug, Clone, Default)]
pub struct Facets {
    pub categories: Vec<String>,
    pub fund_houses: Vec<String>,
    pub scheme_types: Vec<String>,
}

impl Facets {
    /// Derives the facet lists from the unfiltered catalog.
    pub fn derive(catalog: &[Fund]) -> Self {
        let mut categories = BTreeSet::new();
        let mut fund_houses = BTreeSet::new();
        let mut scheme_types = BTreeSet::new();

        for fund in catalog {
            if let Some(v) = fund.scheme_category.as_deref().filter(|v| !v.is_empty()) {
                categories.insert(v.to_string());
            }
            if let Some(v) = fund.fund_house.as_deref().filter(|v| !v.is_empty()) {
                fund_houses.insert(v.to_string());
            }
            if let Some(v) = fund.scheme_type.as_deref().filter(|v| !v.is_empty()) {
                scheme_types.insert(v.to_string());
            }
        }

        Self {
            categories: categories.into_iter().collect(),
            fund_houses: fund_houses.into_iter().collect(),
            scheme_types: scheme_types.into_iter().collect(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fund(
        code: u32,
        name: &str,
        house: Option<&str>,
        category: Option<&str>,
        scheme_type: Option<&str>,
        nav: Option<f64>,
    ) -> Fund {
        Fund {
            scheme_code: code,
            scheme_name: name.to_string(),
            fund_house: house.map(str::to_string),
            scheme_category: category.map(str::to_string),
            scheme_type: scheme_type.map(str::to_string),
            nav,
            date: None,
        }
    }

    fn sample_catalog() -> Vec<Fund> {
        vec![
            fund(1, "Axis Bluechip Fund", Some("Axis"), Some("Equity"), Some("Open"), Some(58.4)),
            fund(2, "HDFC Liquid Fund", Some("HDFC"), Some("Debt"), Some("Open"), Some(4200.0)),
            fund(3, "Axis Small Cap Fund", Some("Axis"), Some("Equity"), Some("Closed"), Some(75.1)),
            fund(4, "SBI Gold Fund", Some("SBI"), None, Some("Open"), None),
        ]
    }

    #[test]
    fn test_empty_filter_matches_all_in_order() {
        let catalog = sample_catalog();
        let filter = FundFilter::default();
        assert!(filter.is_empty());

        let indices = filter.apply_indices(&catalog);
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let catalog = sample_catalog();
        let filter = FundFilter {
            search_text: Some("bluechip".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply_indices(&catalog), vec![0]);
    }

    #[test]
    fn test_search_also_matches_fund_house() {
        let catalog = sample_catalog();
        let filter = FundFilter {
            search_text: Some("hdfc".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply_indices(&catalog), vec![1]);
    }

    #[test]
    fn test_predicates_are_conjunctive() {
        let catalog = sample_catalog();
        let filter = FundFilter {
            search_text: Some("fund".to_string()),
            fund_house: Some("Axis".to_string()),
            scheme_type: Some("Open".to_string()),
            ..Default::default()
        };
        // "fund" matches all four, Axis narrows to {0, 2}, Open to {0}
        assert_eq!(filter.apply_indices(&catalog), vec![0]);
    }

    #[test]
    fn test_category_exact_match() {
        let catalog = sample_catalog();
        let filter = FundFilter {
            category: Some("Equity".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply_indices(&catalog), vec![0, 2]);

        // No partial category matches
        let filter = FundFilter {
            category: Some("Equ".to_string()),
            ..Default::default()
        };
        assert!(filter.apply_indices(&catalog).is_empty());
    }

    #[test]
    fn test_nav_bounds_inclusive_absent_as_zero() {
        let catalog = sample_catalog();
        let filter = FundFilter {
            min_nav: Some(58.4),
            max_nav: Some(75.1),
            ..Default::default()
        };
        // Inclusive on both ends; fund 4 has no NAV -> 0.0, excluded by min
        assert_eq!(filter.apply_indices(&catalog), vec![0, 2]);

        let filter = FundFilter {
            max_nav: Some(10.0),
            ..Default::default()
        };
        // Only the NAV-less fund (treated as 0.0) fits under 10
        assert_eq!(filter.apply_indices(&catalog), vec![3]);
    }

    #[test]
    fn test_result_is_order_preserving_subsequence() {
        let catalog = sample_catalog();
        let filter = FundFilter {
            fund_house: Some("Axis".to_string()),
            ..Default::default()
        };
        let indices = filter.apply_indices(&catalog);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        for &i in &indices {
            assert!(filter.matches(&catalog[i]));
        }
    }

    #[test]
    fn test_facets_distinct_sorted_non_empty() {
        let mut catalog = sample_catalog();
        catalog.push(fund(5, "Empty house", Some(""), Some("Equity"), None, None));

        let facets = Facets::derive(&catalog);
        assert_eq!(facets.categories, vec!["Debt", "Equity"]);
        assert_eq!(facets.fund_houses, vec!["Axis", "HDFC", "SBI"]);
        assert_eq!(facets.scheme_types, vec!["Closed", "Open"]);
    }
}
