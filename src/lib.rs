// ============================================================================
// NavScope - Library
// ============================================================================
// Exposes the modules for the binary, examples and tests
// ============================================================================

pub mod api;     // mfapi.in catalog client
pub mod app;     // Application state machine
pub mod engine;  // Fund filtering and comparison alignment
pub mod models;  // Data structures
pub mod state;   // Auth and selection state stores
pub mod storage; // Local JSON persistence
pub mod ui;      // Terminal user interface
