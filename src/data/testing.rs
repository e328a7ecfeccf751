//! Row builders shared by unit tests.

use super::dates::parse_date;
use super::model::{Dimension, HeadcountRow, OrgUnit, PipelineRow};

/// Build an [`OrgUnit`] from up to six values in cascade order; `""` is missing.
pub fn org(dims: &[&str]) -> OrgUnit {
    let mut org = OrgUnit::default();
    for (dim, value) in Dimension::ALL.iter().zip(dims) {
        if !value.is_empty() {
            org.set(*dim, Some(value.to_string()));
        }
    }
    org
}

pub fn headcount(dims: &[&str], start: &str, planned: f64, hired: f64) -> HeadcountRow {
    HeadcountRow {
        org: org(dims),
        expected_start: parse_date(start),
        planned,
        hired,
    }
}

pub fn pipeline(dims: &[&str], stage: &str, candidate: Option<&str>, positions: f64) -> PipelineRow {
    PipelineRow {
        org: org(dims),
        stage: stage.to_string(),
        candidate_name: candidate.map(str::to_string),
        position_count: positions,
        expected_start: None,
    }
}
