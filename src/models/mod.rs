// ============================================================================
// Module : models
// ============================================================================
// All application data structures
// ============================================================================

pub mod fund;    // Fund, NavEntry, FundDetail
pub mod session; // Logged-in user session

// Re-export the main structures to simplify imports
pub use fund::{Fund, FundDetail, NavEntry};
pub use session::Session;
