// ============================================================================
// Models : Fund, NavEntry, FundDetail
// ============================================================================
// Core data structures for the mutual fund catalog and per-fund NAV history.
// A fund is identified by its scheme code; the optional fields are only
// populated on the detail endpoint, the catalog listing carries code + name.
// ============================================================================

use serde::{Deserialize, Serialize};

/// A mutual fund as listed in the catalog.
///
/// Identity is `scheme_code`; everything else is descriptive. Immutable once
/// fetched. Serialized as-is into the local store when selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fund {
    #[serde(rename = "schemeCode")]
    pub scheme_code: u32,

    #[serde(rename = "schemeName")]
    pub scheme_name: String,

    #[serde(rename = "fundHouse", default, skip_serializing_if = "Option::is_none")]
    pub fund_house: Option<String>,

    #[serde(rename = "schemeType", default, skip_serializing_if = "Option::is_none")]
    pub scheme_type: Option<String>,

    #[serde(rename = "schemeCategory", default, skip_serializing_if = "Option::is_none")]
    pub scheme_category: Option<String>,

    /// Latest NAV, only present on the detail endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav: Option<f64>,

    /// Date of the latest NAV, only present on the detail endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Fund {
    /// Minimal constructor for a catalog-level fund (code + name only).
    pub fn new(scheme_code: u32, scheme_name: impl Into<String>) -> Self {
        Self {
            scheme_code,
            scheme_name: scheme_name.into(),
            fund_house: None,
            scheme_type: None,
            scheme_category: None,
            nav: None,
            date: None,
        }
    }

    /// NAV with the filter-engine convention: absent counts as 0.0.
    pub fn nav_or_zero(&self) -> f64 {
        self.nav.unwrap_or(0.0)
    }
}

/// One NAV observation as delivered by the upstream API.
///
/// The NAV stays as decimal text until the aligner parses it; dates are
/// plain strings (upstream format is DD-MM-YYYY) and only ever compared
/// by exact equality outside the aligner's sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEntry {
    pub date: String,
    pub nav: String,
}

impl NavEntry {
    pub fn new(date: impl Into<String>, nav: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            nav: nav.into(),
        }
    }
}

/// Full NAV history for one fund, fetched independently per fund.
///
/// `data` keeps the upstream order (typically newest first); histories of
/// different funds are not guaranteed to share a date grid.
#[derive(Debug, Clone)]
pub struct FundDetail {
    pub fund: Fund,
    pub data: Vec<NavEntry>,
}

impl FundDetail {
    pub fn new(fund: Fund, data: Vec<NavEntry>) -> Self {
        Self { fund, data }
    }

    /// Latest NAV entry (upstream order is newest first).
    pub fn latest(&self) -> Option<&NavEntry> {
        self.data.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fund_new() {
        let fund = Fund::new(100, "Alpha Fund");
        assert_eq!(fund.scheme_code, 100);
        assert_eq!(fund.scheme_name, "Alpha Fund");
        assert!(fund.fund_house.is_none());
        assert_eq!(fund.nav_or_zero(), 0.0);
    }

    #[test]
    fn test_fund_catalog_json_round_trip() {
        // Catalog listing shape: camelCase keys, no optional fields
        let json = r#"{"schemeCode":120503,"schemeName":"Axis Bluechip Fund Direct Growth"}"#;
        let fund: Fund = serde_json::from_str(json).unwrap();
        assert_eq!(fund.scheme_code, 120503);
        assert!(fund.scheme_category.is_none());

        let back = serde_json::to_string(&fund).unwrap();
        assert!(back.contains("\"schemeCode\":120503"));
        assert!(!back.contains("fundHouse"));
    }

    #[test]
    fn test_detail_latest() {
        let detail = FundDetail::new(
            Fund::new(1, "F"),
            vec![
                NavEntry::new("02-01-2024", "101.5"),
                NavEntry::new("01-01-2024", "100.0"),
            ],
        );
        assert_eq!(detail.latest().unwrap().date, "02-01-2024");
    }
}
