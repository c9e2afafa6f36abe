// ============================================================================
// Module : engine
// ============================================================================
// The business logic: catalog filtering and comparison-chart alignment.
// Pure functions over the models, no I/O.
// ============================================================================

pub mod align;  // Multi-series NAV alignment for the comparison chart
pub mod filter; // Catalog filtering and facet derivation

pub use align::{align, series_label, ChartRow, ComparisonTable, MAX_CHART_ROWS};
pub use filter::{Facets, FundFilter};
