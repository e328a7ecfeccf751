//! Data layer: core types, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  sheet CSV export / .csv / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  fetch + parse → Dataset { headcount, pipeline }
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  Selection → rows of each table
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  query    │  options, KPI, monthly targets, funnel → DashboardView
//!   └──────────┘
//! ```

pub mod dates;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod query;
pub mod source;

#[cfg(test)]
pub mod testing;
