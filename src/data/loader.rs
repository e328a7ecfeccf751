use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::dates::parse_date;
use super::error::{DashboardError, Result, TableKind};
use super::model::{
    Dataset, Dimension, HeadcountRow, HeadcountTable, OrgUnit, PipelineRow, PipelineTable,
    CANDIDATE_COLUMN, HIRED_COLUMN, PLANNED_COLUMN, POSITIONS_COLUMN, STAGE_COLUMN,
    START_DATE_COLUMN,
};
use super::source::{Fetcher, SourceLocation};
use crate::config::DashboardConfig;

// ---------------------------------------------------------------------------
// RawTable – untyped cells straight from the source
// ---------------------------------------------------------------------------

/// A header row plus text cells. Empty cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column names, already trimmed.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    fn column(&self, table: TableKind, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DashboardError::SchemaMismatch {
                table,
                column: name.to_string(),
            })
    }

    fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

fn cell(row: &[Option<String>], idx: usize) -> Option<&str> {
    row.get(idx).and_then(|c| c.as_deref())
}

/// Cell texts spreadsheet exports use for "no value". `#N/A` is what Google
/// Sheets writes for a failed formula.
pub const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Turn a raw cell into `None` when it is empty or a missing-value marker.
fn present(text: &str) -> Option<String> {
    (!text.is_empty() && !MISSING_MARKERS.contains(&text)).then(|| text.to_string())
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Loads both tables from their configured sources.
pub struct Loader {
    fetcher: Fetcher,
    headcount: SourceLocation,
    pipeline: SourceLocation,
}

impl Loader {
    pub fn new(config: &DashboardConfig) -> anyhow::Result<Self> {
        let fetcher = Fetcher::new(
            Duration::from_secs(config.request_timeout_secs),
            config.retry,
        )?;
        Ok(Self {
            fetcher,
            headcount: config.headcount_source.clone(),
            pipeline: config.pipeline_source.clone(),
        })
    }

    /// Fetch and parse both tables. Either one failing fails the load.
    pub fn load(&self) -> Result<Dataset> {
        let started = Instant::now();

        let raw = self.read(TableKind::Headcount, &self.headcount)?;
        let headcount = headcount_from_raw(&raw)?;
        log::info!(
            "Loaded {} headcount rows from {}",
            headcount.len(),
            self.headcount
        );

        let raw = self.read(TableKind::Pipeline, &self.pipeline)?;
        let pipeline = pipeline_from_raw(&raw)?;
        log::info!(
            "Loaded {} pipeline rows from {}",
            pipeline.len(),
            self.pipeline
        );

        if headcount.is_empty() {
            log::warn!("Headcount table from {} has no rows", self.headcount);
        }
        if pipeline.is_empty() {
            log::warn!("Pipeline table from {} has no rows", self.pipeline);
        }

        log::info!("Dataset loaded in {:?}", started.elapsed());
        Ok(Dataset {
            headcount,
            pipeline,
        })
    }

    fn read(&self, table: TableKind, location: &SourceLocation) -> Result<RawTable> {
        let result = match location {
            SourceLocation::Url(url) => self
                .fetcher
                .fetch(url)
                .and_then(|body| read_csv(body.as_slice())),
            SourceLocation::File(path) => read_file(path),
        };
        result.map_err(|e| DashboardError::SourceUnavailable {
            table,
            location: location.to_string(),
            reason: format!("{e:#}"),
        })
    }
}

/// Read a local snapshot. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`             – header row plus comma-separated cells
/// * `.parquet` / `.pq` – any flat schema of string, numeric, bool or date columns
pub fn read_file(path: &Path) -> anyhow::Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            read_csv(file)
        }
        "parquet" | "pq" => read_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Parse CSV text. Short rows are padded with missing cells; empty fields and
/// [`MISSING_MARKERS`] are missing.
pub fn read_csv<R: Read>(input: R) -> anyhow::Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has no header row");
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        let mut row: Vec<Option<String>> = record
            .iter()
            .map(present)
            .collect();
        row.resize(headers.len(), None);
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Read a parquet snapshot, rendering every cell as text so it goes through
/// the same typing rules as a CSV export.
pub fn read_parquet(path: &Path) -> anyhow::Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().trim().to_string())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .zip(&headers)
                .map(|(col, name)| {
                    cell_text(col, row).with_context(|| format!("column '{name}'"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}

/// Render one Arrow cell as text; nulls, empty strings, NaN and
/// [`MISSING_MARKERS`] are missing.
fn cell_text(col: &Arc<dyn Array>, row: usize) -> anyhow::Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let text = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .context("expected StringArray")?
            .value(row)
            .to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .value(row)
            .to_string(),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row)
            .to_string(),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .value(row)
            .to_string(),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .value(row)
            .to_string(),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .context("expected BooleanArray")?
            .value(row)
            .to_string(),
        DataType::Date32 => col
            .as_any()
            .downcast_ref::<Date32Array>()
            .context("expected Date32Array")?
            .value_as_date(row)
            .map(|d: NaiveDate| d.format("%Y-%m-%d").to_string())
            .context("date out of range")?,
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(present(&text))
}

// ---------------------------------------------------------------------------
// Typing
// ---------------------------------------------------------------------------

/// Resolved positions of the six dimension columns.
struct DimensionColumns([usize; 6]);

impl DimensionColumns {
    fn resolve(raw: &RawTable, table: TableKind) -> Result<Self> {
        let mut idx = [0; 6];
        for (slot, dim) in idx.iter_mut().zip(Dimension::ALL) {
            *slot = raw.column(table, dim.column())?;
        }
        Ok(Self(idx))
    }

    fn org(&self, row: &[Option<String>]) -> OrgUnit {
        let mut org = OrgUnit::default();
        for (dim, &i) in Dimension::ALL.iter().zip(&self.0) {
            org.set(*dim, cell(row, i).map(str::to_string));
        }
        org
    }
}

fn parse_number(table: TableKind, column: &str, row: usize, value: Option<&str>) -> Result<f64> {
    let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(0.0);
    };
    v.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| DashboardError::MalformedNumber {
            table,
            column: column.to_string(),
            row,
            value: v.to_string(),
        })
}

fn parse_start(
    table: TableKind,
    column: &str,
    row: usize,
    value: Option<&str>,
) -> Result<Option<NaiveDate>> {
    let Some(v) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    parse_date(v)
        .map(Some)
        .ok_or_else(|| DashboardError::MalformedDate {
            table,
            column: column.to_string(),
            row,
            value: v.to_string(),
        })
}

/// Type the headcount table. The first unparseable date or number fails the
/// whole table; rows are numbered from 1 below the header.
pub fn headcount_from_raw(raw: &RawTable) -> Result<HeadcountTable> {
    let table = TableKind::Headcount;
    let dims = DimensionColumns::resolve(raw, table)?;
    let start = raw.column(table, START_DATE_COLUMN)?;
    let planned = raw.column(table, PLANNED_COLUMN)?;
    let hired = raw.column(table, HIRED_COLUMN)?;

    let rows = raw
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let n = i + 1;
            Ok(HeadcountRow {
                org: dims.org(row),
                expected_start: parse_start(table, START_DATE_COLUMN, n, cell(row, start))?,
                planned: parse_number(table, PLANNED_COLUMN, n, cell(row, planned))?,
                hired: parse_number(table, HIRED_COLUMN, n, cell(row, hired))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(HeadcountTable::new(rows))
}

/// Type the pipeline table. Stage labels are trimmed; the start date column
/// is optional here.
pub fn pipeline_from_raw(raw: &RawTable) -> Result<PipelineTable> {
    let table = TableKind::Pipeline;
    let dims = DimensionColumns::resolve(raw, table)?;
    let stage = raw.column(table, STAGE_COLUMN)?;
    let candidate = raw.column(table, CANDIDATE_COLUMN)?;
    let positions = raw.column(table, POSITIONS_COLUMN)?;
    let start = raw.optional_column(START_DATE_COLUMN);

    let rows = raw
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let n = i + 1;
            let expected_start = match start {
                Some(idx) => parse_start(table, START_DATE_COLUMN, n, cell(row, idx))?,
                None => None,
            };
            Ok(PipelineRow {
                org: dims.org(row),
                stage: cell(row, stage).map(str::trim).unwrap_or_default().to_string(),
                candidate_name: cell(row, candidate).map(str::to_string),
                position_count: parse_number(table, POSITIONS_COLUMN, n, cell(row, positions))?,
                expected_start,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PipelineTable::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADCOUNT_CSV: &str = "\
 Empresa ,Departamento,Área,Seção,Cargo,Função, Início previsto ,Previsto,Contratado
A,Eng,Core,S1,Dev,Back,2024-01-15,2,1
A,Eng,Core,S1,Dev,Back,20/01/2024,1,1
B,,Core,S2,Analyst,Data,,3,
";

    const PIPELINE_CSV: &str = "\
Empresa,Departamento,Área,Seção,Cargo,Função,Etapa,Nome do candidato,Total de posições
A,Eng,Core,S1,Dev,Back,  3. Triagem ,,5
A,Eng,Core,S1,Dev,Back,4. Entrevistas,X,
A,Eng,Core,S1,Dev,Back,4. Entrevistas,,
";

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn csv_headers_are_trimmed_and_empty_cells_missing() {
        let raw = read_csv(HEADCOUNT_CSV.as_bytes()).unwrap();
        assert_eq!(raw.headers[0], "Empresa");
        assert_eq!(raw.headers[6], "Início previsto");
        assert_eq!(raw.rows.len(), 3);
        assert_eq!(raw.rows[2][1], None);
        assert_eq!(raw.rows[2][8], None);
    }

    #[test]
    fn short_rows_are_padded() {
        let raw = read_csv("a,b,c\n1\n".as_bytes()).unwrap();
        assert_eq!(raw.rows[0], vec![Some("1".to_string()), None, None]);
    }

    #[test]
    fn headcount_is_typed() {
        let raw = read_csv(HEADCOUNT_CSV.as_bytes()).unwrap();
        let table = headcount_from_raw(&raw).unwrap();
        assert_eq!(table.len(), 3);

        let first = &table.rows[0];
        assert_eq!(first.org.get(Dimension::Company), Some("A"));
        assert_eq!(first.expected_start, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!((first.planned, first.hired), (2.0, 1.0));

        assert_eq!(table.rows[1].expected_start, NaiveDate::from_ymd_opt(2024, 1, 20));

        let last = &table.rows[2];
        assert_eq!(last.org.get(Dimension::Department), None);
        assert_eq!(last.expected_start, None);
        assert_eq!(last.hired, 0.0);
    }

    #[test]
    fn missing_column_is_a_schema_mismatch() {
        let raw = read_csv("Empresa,Departamento\nA,Eng\n".as_bytes()).unwrap();
        match headcount_from_raw(&raw) {
            Err(DashboardError::SchemaMismatch { table, column }) => {
                assert_eq!(table, TableKind::Headcount);
                assert_eq!(column, "Área");
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn bad_date_fails_the_whole_table() {
        let csv = HEADCOUNT_CSV.replace("20/01/2024", "next month");
        let raw = read_csv(csv.as_bytes()).unwrap();
        match headcount_from_raw(&raw) {
            Err(DashboardError::MalformedDate { row, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "next month");
            }
            other => panic!("expected MalformedDate, got {other:?}"),
        }
    }

    #[test]
    fn bad_number_is_reported() {
        let csv = HEADCOUNT_CSV.replace(",2,1", ",two,1");
        let raw = read_csv(csv.as_bytes()).unwrap();
        assert!(matches!(
            headcount_from_raw(&raw),
            Err(DashboardError::MalformedNumber { row: 1, .. })
        ));
    }

    #[test]
    fn missing_markers_in_numeric_cells_count_as_zero() {
        let csv = HEADCOUNT_CSV
            .replace(",2,1\n", ",#N/A,NaN\n")
            .replace(",1,1\n", ",NA,1\n");
        let raw = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(raw.rows[0][7], None);
        assert_eq!(raw.rows[0][8], None);

        let table = headcount_from_raw(&raw).unwrap();
        assert_eq!((table.rows[0].planned, table.rows[0].hired), (0.0, 0.0));
        assert_eq!((table.rows[1].planned, table.rows[1].hired), (0.0, 1.0));
    }

    #[test]
    fn infinite_number_is_malformed() {
        let csv = HEADCOUNT_CSV.replace(",2,1\n", ",2,inf\n");
        let raw = read_csv(csv.as_bytes()).unwrap();
        match headcount_from_raw(&raw) {
            Err(DashboardError::MalformedNumber { column, row, value, .. }) => {
                assert_eq!(column, HIRED_COLUMN);
                assert_eq!(row, 1);
                assert_eq!(value, "inf");
            }
            other => panic!("expected MalformedNumber, got {other:?}"),
        }
    }

    #[test]
    fn missing_markers_are_not_candidate_names() {
        let csv = PIPELINE_CSV
            .replace(",X,\n", ",#N/A,\n")
            .replace("Entrevistas,,\n", "Entrevistas,NA,\n");
        let raw = read_csv(csv.as_bytes()).unwrap();
        let table = pipeline_from_raw(&raw).unwrap();
        assert_eq!(table.rows[1].candidate_name, None);
        assert_eq!(table.rows[2].candidate_name, None);

        let rows: Vec<&PipelineRow> = table.rows.iter().collect();
        let funnel = crate::data::query::pipeline_funnel(&rows).unwrap();
        assert_eq!(funnel[3].quantity, 0);
    }

    #[test]
    fn marker_text_inside_a_value_is_kept() {
        let raw = read_csv("Nome\nNAtalia\n N/A\n".as_bytes()).unwrap();
        assert_eq!(raw.rows[0][0].as_deref(), Some("NAtalia"));
        assert_eq!(raw.rows[1][0].as_deref(), Some(" N/A"));
    }

    #[test]
    fn header_only_table_loads_empty() {
        let header = PIPELINE_CSV.lines().next().unwrap();
        let raw = read_csv(header.as_bytes()).unwrap();
        let table = pipeline_from_raw(&raw).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn pipeline_stage_is_trimmed() {
        let raw = read_csv(PIPELINE_CSV.as_bytes()).unwrap();
        let table = pipeline_from_raw(&raw).unwrap();
        assert_eq!(table.rows[0].stage, "3. Triagem");
        assert_eq!(table.rows[0].position_count, 5.0);
        assert_eq!(table.rows[1].candidate_name.as_deref(), Some("X"));
        assert_eq!(table.rows[2].candidate_name, None);
        assert!(table.rows.iter().all(|r| r.expected_start.is_none()));
    }

    #[test]
    fn pipeline_start_date_is_parsed_when_present() {
        let csv = "\
Empresa,Departamento,Área,Seção,Cargo,Função,Etapa,Nome do candidato,Total de posições,Início previsto
A,Eng,Core,S1,Dev,Back,1. Não iniciado,,2,2024-05-01
";
        let raw = read_csv(csv.as_bytes()).unwrap();
        let table = pipeline_from_raw(&raw).unwrap();
        assert_eq!(table.rows[0].expected_start, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn read_file_dispatches_on_extension() {
        let f = write_temp(".csv", PIPELINE_CSV);
        let raw = read_file(f.path()).unwrap();
        assert_eq!(raw.rows.len(), 3);

        let other = write_temp(".xlsx", "");
        let err = read_file(other.path()).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn parquet_snapshot_reads_like_csv() {
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let text = |v: &[Option<&str>]| Arc::new(StringArray::from(v.to_vec())) as Arc<dyn Array>;
        let mut fields: Vec<Field> = Dimension::ALL
            .iter()
            .map(|d| Field::new(d.column(), DataType::Utf8, true))
            .collect();
        fields.push(Field::new(" Etapa", DataType::Float64, true));
        fields.push(Field::new("Nome do candidato", DataType::Utf8, true));
        fields.push(Field::new("Total de posições", DataType::Int64, true));
        let schema = Arc::new(Schema::new(fields));

        let mut columns: Vec<Arc<dyn Array>> = Dimension::ALL
            .iter()
            .map(|_| text(&[Some("A"), None]))
            .collect();
        columns.push(Arc::new(Float64Array::from(vec![Some(3.0), None])));
        columns.push(text(&[None, Some("Ana")]));
        columns.push(Arc::new(Int64Array::from(vec![Some(4), None])));
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let f = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(std::fs::File::create(f.path()).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let raw = read_file(f.path()).unwrap();
        assert_eq!(raw.headers[6], "Etapa");
        let table = pipeline_from_raw(&raw).unwrap();
        assert_eq!(table.rows[0].stage, "3");
        assert_eq!(table.rows[0].position_count, 4.0);
        assert_eq!(table.rows[1].stage, "");
        assert_eq!(table.rows[1].org.get(Dimension::Company), None);
        assert_eq!(table.rows[1].candidate_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn loader_reads_local_files_and_reports_missing_ones() {
        let head = write_temp(".csv", HEADCOUNT_CSV);
        let pipe = write_temp(".csv", PIPELINE_CSV);
        let mut config = DashboardConfig {
            headcount_source: SourceLocation::File(head.path().to_path_buf()),
            pipeline_source: SourceLocation::File(pipe.path().to_path_buf()),
            ..Default::default()
        };
        let dataset = Loader::new(&config).unwrap().load().unwrap();
        assert_eq!(dataset.headcount.len(), 3);
        assert_eq!(dataset.pipeline.len(), 3);

        config.pipeline_source = SourceLocation::File("/nonexistent/pipeline.csv".into());
        match Loader::new(&config).unwrap().load() {
            Err(DashboardError::SourceUnavailable { table, location, .. }) => {
                assert_eq!(table, TableKind::Pipeline);
                assert_eq!(location, "/nonexistent/pipeline.csv");
            }
            other => panic!("expected SourceUnavailable, got {other:?}"),
        }
    }
}
