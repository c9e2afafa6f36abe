// ============================================================================
// Module : api
// ============================================================================
// Clients for the remote data sources. Currently a single one: the public
// mfapi.in mutual fund catalog.
// ============================================================================

pub mod mfapi; // mfapi.in catalog + NAV history client

// Re-export the main entry points
pub use mfapi::{fetch_all_funds, fetch_fund_detail, fetch_many_details};
