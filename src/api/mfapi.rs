// ============================================================================
// API Client : mfapi.in
// ============================================================================
// Fetches the mutual fund catalog and per-fund NAV histories from the public
// mfapi.in REST API.
//
// Two endpoints:
//   GET /mf          -> full catalog, [{schemeCode, schemeName, ...}, ...]
//   GET /mf/{code}   -> {meta: {...}, data: [{date, nav}, ...]}
//
// The detail endpoint's `meta` object uses snake_case field names while the
// catalog (and our internal model) uses camelCase; the mapping happens here.
// ============================================================================

use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::models::{Fund, FundDetail, NavEntry};

const BASE_URL: &str = "https://api.mfapi.in/mf";

// ============================================================================
// Response structures for the detail endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
struct DetailResponse {
    meta: DetailMeta,
    #[serde(default)]
    data: Vec<NavEntry>,
}

/// Fund metadata as served by `GET /mf/{code}` (snake_case).
#[derive(Debug, Deserialize)]
struct DetailMeta {
    scheme_code: u32,
    scheme_name: String,
    fund_house: Option<String>,
    scheme_type: Option<String>,
    scheme_category: Option<String>,
    /// Latest NAV as decimal text.
    nav: Option<String>,
    date: Option<String>,
}

impl DetailMeta {
    /// Maps the snake_case API meta onto the internal `Fund` model.
    fn into_fund(self) -> Fund {
        // The latest NAV arrives as decimal text; an unparsable value is
        // treated as absent rather than failing the whole fetch.
        let nav = match self.nav.as_deref() {
            Some(text) => match text.trim().parse::<f64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(scheme_code = self.scheme_code, nav = %text, "Unparsable meta NAV, treating as absent");
                    None
                }
            },
            None => None,
        };

        Fund {
            scheme_code: self.scheme_code,
            scheme_name: self.scheme_name,
            fund_house: self.fund_house,
            scheme_type: self.scheme_type,
            scheme_category: self.scheme_category,
            nav,
            date: self.date,
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Process-wide HTTP client, built once so every request shares the same
/// connection pool. Concurrent first calls may each build a client; only
/// the one that wins the init is kept.
fn shared_client() -> Result<&'static reqwest::Client> {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    if let Some(client) = CLIENT.get() {
        return Ok(client);
    }
    let client = reqwest::Client::builder()
        .user_agent(concat!("navscope/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    Ok(CLIENT.get_or_init(|| client))
}

/// Fetches the full fund catalog.
///
/// The catalog is large (tens of thousands of entries) but this is a single
/// request; callers cache the result and filter locally.
#[instrument]
pub async fn fetch_all_funds() -> Result<Vec<Fund>> {
    let client = shared_client()?;

    debug!(url = BASE_URL, "Fetching fund catalog");
    let response = client
        .get(BASE_URL)
        .send()
        .await
        .context("Catalog request to mfapi.in failed")?;

    let status = response.status();
    if !status.is_success() {
        error!(status = %status, "mfapi.in returned error status for catalog");
        anyhow::bail!("mfapi.in returned HTTP {} for the fund catalog", status);
    }

    let funds: Vec<Fund> = response
        .json()
        .await
        .context("Failed to parse fund catalog JSON")?;

    info!(funds = funds.len(), "Fund catalog fetched");
    Ok(funds)
}

/// Fetches the NAV history for one fund.
#[instrument]
pub async fn fetch_fund_detail(scheme_code: u32) -> Result<FundDetail> {
    let client = shared_client()?;
    let url = format!("{}/{}", BASE_URL, scheme_code);

    debug!(url = %url, "Fetching fund detail");
    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Detail request for scheme {} failed", scheme_code))?;

    let status = response.status();
    if !status.is_success() {
        error!(scheme_code, status = %status, "mfapi.in returned error status for detail");
        anyhow::bail!(
            "mfapi.in returned HTTP {} for scheme {}",
            status,
            scheme_code
        );
    }

    let detail: DetailResponse = response
        .json()
        .await
        .with_context(|| format!("Failed to parse detail JSON for scheme {}", scheme_code))?;

    info!(scheme_code, entries = detail.data.len(), "Fund detail fetched");
    Ok(FundDetail::new(detail.meta.into_fund(), detail.data))
}

/// Fetches NAV histories for several funds at once.
///
/// All requests are issued concurrently with no cap and the call waits for
/// every one of them; a single failure fails the whole batch. No partial
/// results, no per-item retry. Results come back in the order of `codes`.
#[instrument(skip(codes), fields(count = codes.len()))]
pub async fn fetch_many_details(codes: &[u32]) -> Result<Vec<FundDetail>> {
    let handles: Vec<_> = codes
        .iter()
        .map(|&code| tokio::spawn(fetch_fund_detail(code)))
        .collect();

    let mut details = Vec::with_capacity(handles.len());
    for handle in handles {
        let detail = handle
            .await
            .context("Detail fetch task panicked")??;
        details.push(detail);
    }

    info!(funds = details.len(), "All fund details fetched");
    Ok(details)
}

// ============================================================================
// Tests
// ============================================================================
