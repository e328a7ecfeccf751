use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Source column names (after header trimming)
// ---------------------------------------------------------------------------

pub const START_DATE_COLUMN: &str = "Início previsto";
pub const PLANNED_COLUMN: &str = "Previsto";
pub const HIRED_COLUMN: &str = "Contratado";
pub const STAGE_COLUMN: &str = "Etapa";
pub const CANDIDATE_COLUMN: &str = "Nome do candidato";
pub const POSITIONS_COLUMN: &str = "Total de posições";

// ---------------------------------------------------------------------------
// Dimension – one of the six organisational filter axes
// ---------------------------------------------------------------------------

/// An organisational dimension shared by both tables. Declaration order is
/// the cascade order of the dropdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Company,
    Department,
    Area,
    Section,
    Role,
    Function,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Company,
        Dimension::Department,
        Dimension::Area,
        Dimension::Section,
        Dimension::Role,
        Dimension::Function,
    ];

    /// Dimensions whose options are recomputed from the filtered headcount.
    pub const CASCADING: [Dimension; 5] = [
        Dimension::Department,
        Dimension::Area,
        Dimension::Section,
        Dimension::Role,
        Dimension::Function,
    ];

    /// Header of the column holding this dimension in both source tables.
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Company => "Empresa",
            Dimension::Department => "Departamento",
            Dimension::Area => "Área",
            Dimension::Section => "Seção",
            Dimension::Role => "Cargo",
            Dimension::Function => "Função",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// OrgUnit – the six dimension cells of a row
// ---------------------------------------------------------------------------

/// Dimension values of one row. `None` is a missing cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgUnit {
    pub company: Option<String>,
    pub department: Option<String>,
    pub area: Option<String>,
    pub section: Option<String>,
    pub role: Option<String>,
    pub function: Option<String>,
}

impl OrgUnit {
    pub fn get(&self, dim: Dimension) -> Option<&str> {
        let cell = match dim {
            Dimension::Company => &self.company,
            Dimension::Department => &self.department,
            Dimension::Area => &self.area,
            Dimension::Section => &self.section,
            Dimension::Role => &self.role,
            Dimension::Function => &self.function,
        };
        cell.as_deref()
    }

    pub fn set(&mut self, dim: Dimension, value: Option<String>) {
        let cell = match dim {
            Dimension::Company => &mut self.company,
            Dimension::Department => &mut self.department,
            Dimension::Area => &mut self.area,
            Dimension::Section => &mut self.section,
            Dimension::Role => &mut self.role,
            Dimension::Function => &mut self.function,
        };
        *cell = value;
    }
}

/// Anything that can be filtered by [`Selection`].
pub trait Dimensional {
    fn org(&self) -> &OrgUnit;
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// One line of the headcount plan.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadcountRow {
    pub org: OrgUnit,
    /// Missing when the cell was empty; such rows have no month.
    pub expected_start: Option<NaiveDate>,
    pub planned: f64,
    pub hired: f64,
}

impl Dimensional for HeadcountRow {
    fn org(&self) -> &OrgUnit {
        &self.org
    }
}

/// One requisition or candidate in the recruitment pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRow {
    pub org: OrgUnit,
    /// Trimmed stage label, e.g. `"4. Entrevistas"`.
    pub stage: String,
    pub candidate_name: Option<String>,
    pub position_count: f64,
    pub expected_start: Option<NaiveDate>,
}

impl Dimensional for PipelineRow {
    fn org(&self) -> &OrgUnit {
        &self.org
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// An immutable, ordered table of typed rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    pub rows: Vec<R>,
}

impl<R> Table<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub type HeadcountTable = Table<HeadcountRow>;
pub type PipelineTable = Table<PipelineRow>;

/// Both source tables, loaded together and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub headcount: HeadcountTable,
    pub pipeline: PipelineTable,
}

// ---------------------------------------------------------------------------
// Funnel vocabulary
// ---------------------------------------------------------------------------

/// What a funnel stage counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageMetric {
    /// Sum of open positions (requisitions without a candidate yet).
    OpenPositions,
    /// Number of rows naming a candidate.
    NamedCandidates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunnelStage {
    pub label: &'static str,
    pub metric: StageMetric,
}

pub const FUNNEL_STAGES: [FunnelStage; 8] = [
    FunnelStage { label: "1. Não iniciado", metric: StageMetric::OpenPositions },
    FunnelStage { label: "2. Divulgação", metric: StageMetric::OpenPositions },
    FunnelStage { label: "3. Triagem", metric: StageMetric::OpenPositions },
    FunnelStage { label: "4. Entrevistas", metric: StageMetric::NamedCandidates },
    FunnelStage { label: "5. Testes e avaliações", metric: StageMetric::NamedCandidates },
    FunnelStage { label: "6. Proposta", metric: StageMetric::NamedCandidates },
    FunnelStage { label: "7. Contratados", metric: StageMetric::NamedCandidates },
    FunnelStage { label: "8. Reprovados", metric: StageMetric::NamedCandidates },
];

// ---------------------------------------------------------------------------
// Selection – the user's dropdown choices
// ---------------------------------------------------------------------------

/// Per-dimension equality constraints. An absent dimension means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    values: BTreeMap<Dimension, String>,
}

impl Selection {
    /// Builder-style setter.
    #[cfg(test)]
    pub fn with(mut self, dim: Dimension, value: impl Into<String>) -> Self {
        self.values.insert(dim, value.into());
        self
    }

    pub fn get(&self, dim: Dimension) -> Option<&str> {
        self.values.get(&dim).map(String::as_str)
    }

    /// Set or clear one dimension. Returns whether the selection changed.
    pub fn set(&mut self, dim: Dimension, value: Option<String>) -> bool {
        let before = self.values.get(&dim).cloned();
        match value {
            Some(v) => {
                self.values.insert(dim, v);
            }
            None => {
                self.values.remove(&dim);
            }
        }
        before.as_ref() != self.values.get(&dim)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The constraints that are actually set.
    pub fn active(&self) -> impl Iterator<Item = (Dimension, &str)> {
        self.values.iter().map(|(d, v)| (*d, v.as_str()))
    }

    /// Whether a row satisfies every set constraint.
    pub fn matches(&self, org: &OrgUnit) -> bool {
        self.active().all(|(dim, want)| org.get(dim) == Some(want))
    }
}
