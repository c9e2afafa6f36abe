// ============================================================================
// Module : state
// ============================================================================
// Explicit state-store objects, constructed once at startup and owned by the
// application. Each store persists its own record through the local store.
// ============================================================================

pub mod auth;      // Logged-in session
pub mod selection; // Funds picked for comparison

pub use auth::AuthStore;
pub use selection::{SelectionStore, MAX_FUNDS};
