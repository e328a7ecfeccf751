use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Which of the two source tables an error refers to
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Headcount,
    Pipeline,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Headcount => write!(f, "headcount"),
            TableKind::Pipeline => write!(f, "pipeline"),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard errors
// ---------------------------------------------------------------------------

/// Hard failures of the load and query pipeline.
///
/// None of these are recovered from automatically: they end up in the status
/// line of the UI so the operator sees them instead of a wrong chart.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("{table} source '{location}' unavailable: {reason}")]
    SourceUnavailable {
        table: TableKind,
        location: String,
        reason: String,
    },

    #[error("{table} row {row}: '{value}' in column '{column}' is not a date")]
    MalformedDate {
        table: TableKind,
        column: String,
        row: usize,
        value: String,
    },

    #[error("{table} row {row}: '{value}' in column '{column}' is not a number")]
    MalformedNumber {
        table: TableKind,
        column: String,
        row: usize,
        value: String,
    },

    #[error("{table} table has no column '{column}'")]
    SchemaMismatch { table: TableKind, column: String },

    #[error("sum of '{column}' is not a whole number: {value}")]
    NonIntegralSum { column: String, value: f64 },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
