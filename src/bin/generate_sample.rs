//! Writes `sample_headcount.csv` and `sample_pipeline.csv` with the headers the
//! dashboard expects, so it can run without network access:
//!
//! ```text
//! cargo run --bin generate_sample
//! HR_HEADCOUNT_SOURCE=sample_headcount.csv HR_PIPELINE_SOURCE=sample_pipeline.csv cargo run
//! ```

use anyhow::{Context, Result};
use chrono::{Datelike, Months, NaiveDate};

const DIMENSIONS: [&str; 6] = ["Empresa", "Departamento", "Área", "Seção", "Cargo", "Função"];

const STAGES: [&str; 8] = [
    "1. Não iniciado",
    "2. Divulgação",
    "3. Triagem",
    "4. Entrevistas",
    "5. Testes e avaliações",
    "6. Proposta",
    "7. Contratados",
    "8. Reprovados",
];

const FIRST_NAMES: [&str; 8] = ["Ana", "Bruno", "Carla", "Diego", "Elisa", "Fábio", "Gabi", "Hugo"];

/// (company, department, area, section, role, function)
const UNITS: [[&str; 6]; 6] = [
    ["Alfa", "Tecnologia", "Engenharia", "Backend", "Desenvolvedor", "API"],
    ["Alfa", "Tecnologia", "Engenharia", "Frontend", "Desenvolvedor", "Web"],
    ["Alfa", "Operações", "Logística", "Armazém", "Analista", "Estoque"],
    ["Beta", "Comercial", "Vendas", "Varejo", "Consultor", "Loja"],
    ["Beta", "Comercial", "Marketing", "Digital", "Analista", "Mídia"],
    ["Beta", "Financeiro", "Controladoria", "Fiscal", "Analista", "Tributos"],
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform integer in `0..n`.
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len() as u64) as usize]
    }
}

fn write_headcount(rng: &mut SimpleRng, path: &str) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    let mut header: Vec<&str> = DIMENSIONS.to_vec();
    header.extend(["Início previsto", "Previsto", "Contratado"]);
    writer.write_record(&header)?;

    let first_month = NaiveDate::from_ymd_opt(2024, 1, 1).context("invalid start date")?;
    let mut rows = 0;
    for unit in &UNITS {
        for month in 0..6u32 {
            let start = first_month
                .checked_add_months(Months::new(month))
                .and_then(|d| d.with_day0(rng.below(28) as u32))
                .context("date out of range")?;
            let planned = 1 + rng.below(4);
            let hired = rng.below(planned + 1);

            let mut record: Vec<String> = unit.iter().map(|s| s.to_string()).collect();
            record.push(start.format("%Y-%m-%d").to_string());
            record.push(planned.to_string());
            record.push(hired.to_string());
            writer.write_record(&record)?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}

fn write_pipeline(rng: &mut SimpleRng, path: &str) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    let mut header: Vec<&str> = DIMENSIONS.to_vec();
    header.extend(["Etapa", "Nome do candidato", "Total de posições"]);
    writer.write_record(&header)?;

    let mut rows = 0;
    for unit in &UNITS {
        // Open requisitions: no candidate yet, counted by positions.
        for stage in &STAGES[..3] {
            let mut record: Vec<String> = unit.iter().map(|s| s.to_string()).collect();
            record.push(stage.to_string());
            record.push(String::new());
            record.push((rng.below(4)).to_string());
            writer.write_record(&record)?;
            rows += 1;
        }
        // Named candidates further down the funnel.
        for _ in 0..6 {
            let mut record: Vec<String> = unit.iter().map(|s| s.to_string()).collect();
            record.push(rng.pick(&STAGES[3..]).to_string());
            record.push(format!("{} {}", rng.pick(&FIRST_NAMES), rows));
            record.push(String::new());
            writer.write_record(&record)?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let headcount = write_headcount(&mut rng, "sample_headcount.csv")?;
    let pipeline = write_pipeline(&mut rng, "sample_pipeline.csv")?;

    println!(
        "Wrote {headcount} headcount rows to sample_headcount.csv and {pipeline} pipeline rows to sample_pipeline.csv"
    );
    Ok(())
}
