use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};

use super::dates::month_key;
use super::error::{DashboardError, Result};
use super::filter::filter_table;
use super::model::{
    Dataset, Dimension, Dimensional, HeadcountRow, HeadcountTable, PipelineRow, Selection,
    StageMetric, FUNNEL_STAGES, HIRED_COLUMN, PLANNED_COLUMN, POSITIONS_COLUMN,
};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Selectable values for the five cascading dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeOptions {
    by_dimension: BTreeMap<Dimension, Vec<String>>,
}

impl CascadeOptions {
    pub fn get(&self, dim: Dimension) -> &[String] {
        self.by_dimension.get(&dim).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Planned vs hired headcount for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTarget {
    /// `YYYY-MM`
    pub month: String,
    pub planned: i64,
    pub hired: i64,
}

/// One bar of the recruitment funnel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunnelEntry {
    pub stage: &'static str,
    pub quantity: i64,
}

/// Everything the dashboard shows for one selection, computed in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    /// Companies of the whole headcount table (first dropdown).
    pub company_options: Vec<String>,
    pub options: CascadeOptions,
    pub total_hired: i64,
    pub monthly: Vec<MonthlyTarget>,
    pub funnel: Vec<FunnelEntry>,
    pub headcount_rows: usize,
    pub pipeline_rows: usize,
}

impl DashboardView {
    pub fn kpi_label(&self) -> String {
        format!("Total de ativos: {}", self.total_hired)
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Distinct non-missing values of `dim`, in first-seen order.
pub fn distinct_values<'a, R, I>(rows: I, dim: Dimension) -> Vec<String>
where
    R: Dimensional + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in rows {
        if let Some(v) = row.org().get(dim) {
            if seen.insert(v) {
                out.push(v.to_string());
            }
        }
    }
    out
}

/// Options of the company dropdown, taken from the unfiltered table.
pub fn company_options(headcount: &HeadcountTable) -> Vec<String> {
    distinct_values(&headcount.rows, Dimension::Company)
}

/// Options of the cascading dropdowns, taken from the filtered headcount.
pub fn derive_options(filtered: &[&HeadcountRow]) -> CascadeOptions {
    let by_dimension = Dimension::CASCADING
        .iter()
        .map(|&dim| (dim, distinct_values(filtered.iter().copied(), dim)))
        .collect();
    CascadeOptions { by_dimension }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Convert a float sum of counts into an integer, refusing fractions.
fn whole(column: &str, sum: f64) -> Result<i64> {
    let rounded = sum.round();
    if !sum.is_finite() || (sum - rounded).abs() > 1e-9 {
        return Err(DashboardError::NonIntegralSum {
            column: column.to_string(),
            value: sum,
        });
    }
    Ok(rounded as i64)
}

/// KPI: total hired over the filtered rows.
pub fn total_hired(filtered: &[&HeadcountRow]) -> Result<i64> {
    whole(HIRED_COLUMN, filtered.iter().map(|r| r.hired).sum())
}

/// Planned and hired per month, ascending. Rows without a start date have no
/// month and are left out.
pub fn monthly_targets(filtered: &[&HeadcountRow]) -> Result<Vec<MonthlyTarget>> {
    let mut groups: BTreeMap<(i32, u32), (NaiveDate, f64, f64)> = BTreeMap::new();
    for row in filtered {
        let Some(date) = row.expected_start else {
            continue;
        };
        let acc = groups
            .entry((date.year(), date.month()))
            .or_insert((date, 0.0, 0.0));
        acc.1 += row.planned;
        acc.2 += row.hired;
    }

    groups
        .into_values()
        .map(|(date, planned, hired)| {
            Ok(MonthlyTarget {
                month: month_key(date),
                planned: whole(PLANNED_COLUMN, planned)?,
                hired: whole(HIRED_COLUMN, hired)?,
            })
        })
        .collect()
}

/// Tally the eight funnel stages, always in vocabulary order.
pub fn pipeline_funnel(filtered: &[&PipelineRow]) -> Result<Vec<FunnelEntry>> {
    FUNNEL_STAGES
        .iter()
        .map(|stage| {
            let rows = filtered.iter().filter(|r| r.stage == stage.label);
            let quantity = match stage.metric {
                StageMetric::OpenPositions => {
                    whole(POSITIONS_COLUMN, rows.map(|r| r.position_count).sum())?
                }
                StageMetric::NamedCandidates => {
                    rows.filter(|r| r.candidate_name.is_some()).count() as i64
                }
            };
            Ok(FunnelEntry {
                stage: stage.label,
                quantity,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Recompute the whole dashboard for `selection`.
///
/// The same selection is applied independently to both tables; dropdown
/// options come from the headcount side only.
pub fn evaluate(dataset: &Dataset, selection: &Selection) -> Result<DashboardView> {
    let headcount = filter_table(&dataset.headcount, selection);
    let pipeline = filter_table(&dataset.pipeline, selection);

    Ok(DashboardView {
        company_options: company_options(&dataset.headcount),
        options: derive_options(&headcount),
        total_hired: total_hired(&headcount)?,
        monthly: monthly_targets(&headcount)?,
        funnel: pipeline_funnel(&pipeline)?,
        headcount_rows: headcount.len(),
        pipeline_rows: pipeline.len(),
    })
}
