//! Genetic mapping results: parsing, grouping and the chromosome x trait matrix.

use crate::libs::error::{HeatmapError, Result};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use std::cmp::Ordering;
use std::io::BufRead;
use std::path::Path;

/// One row of the mapping engine's main output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingRow {
    pub id: String,
    pub chr: String,
    pub locus: String,
    pub cm: Option<f64>,
    pub mb: f64,
    pub lrs: f64,
    pub additive: Option<f64>,
    pub p_value: Option<f64>,
}

/// A locus within one trait's results on one chromosome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocusResult {
    pub locus: String,
    pub mb: f64,
    pub lrs: f64,
}

/// trait id -> chromosome -> loci, in order of first appearance
pub type Organised = IndexMap<String, IndexMap<String, Vec<LocusResult>>>;

/// Rows are chromosomes, columns are traits, cells are LRS runs.
pub type HeatmapMatrix = Vec<Vec<Vec<Option<f64>>>>;

/// Runs genetic mapping over a traits file.
pub trait MappingEngine {
    fn run(&self, traits_file: &Path) -> Result<Vec<MappingRow>>;
}

/// Main output of a mapping run that has already happened
#[derive(Debug, Clone)]
pub struct ReaperOutput {
    pub path: String,
}

impl ReaperOutput {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

impl MappingEngine for ReaperOutput {
    fn run(&self, traits_file: &Path) -> Result<Vec<MappingRow>> {
        log::debug!(
            "Using precomputed mapping results {} for {}",
            self.path,
            traits_file.display()
        );
        if self.path != "stdin" && !Path::new(&self.path).is_file() {
            return Err(HeatmapError::Collaborator(format!(
                "mapping results not found: {}",
                self.path
            )));
        }
        parse_reaper_main_results(intspan::reader(&self.path))
    }
}

/// Parse tab separated reaper output.
///
/// Columns are located by header name; `ID`, `Chr`, `Locus`, `Mb` and `LRS`
/// are required.
pub fn parse_reaper_main_results<R: BufRead>(reader: R) -> Result<Vec<MappingRow>> {
    let mut lines = reader.lines().enumerate();

    let header = match lines.next() {
        Some((_, line)) => line?,
        None => return Ok(vec![]),
    };
    let columns: Vec<String> = header.split('\t').map(|s| s.trim().to_string()).collect();
    let position = |name: &str| columns.iter().position(|c| c == name);
    let required = |name: &str| {
        position(name).ok_or_else(|| HeatmapError::Parse {
            line: 1,
            message: format!("missing column `{}`", name),
        })
    };

    let col_id = required("ID")?;
    let col_chr = required("Chr")?;
    let col_locus = required("Locus")?;
    let col_mb = required("Mb")?;
    let col_lrs = required("LRS")?;
    let col_cm = position("cM");
    let col_additive = position("Additive");
    let col_p = position("pValue");

    let mut rows = vec![];
    for (idx, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let lineno = idx + 1;
        let fields: Vec<&str> = line.split('\t').map(|s| s.trim()).collect();

        let field = |col: usize| {
            fields.get(col).copied().ok_or_else(|| HeatmapError::Parse {
                line: lineno,
                message: format!("expected {} fields, found {}", columns.len(), fields.len()),
            })
        };
        let number = |col: usize| -> Result<f64> {
            let s = field(col)?;
            s.parse::<f64>().map_err(|_| HeatmapError::Parse {
                line: lineno,
                message: format!("`{}` in column `{}` is not a number", s, columns[col]),
            })
        };
        let optional = |col: Option<usize>| {
            col.and_then(|c| fields.get(c))
                .and_then(|s| s.parse::<f64>().ok())
        };

        rows.push(MappingRow {
            id: field(col_id)?.to_string(),
            chr: field(col_chr)?.to_string(),
            locus: field(col_locus)?.to_string(),
            cm: optional(col_cm),
            mb: number(col_mb)?,
            lrs: number(col_lrs)?,
            additive: optional(col_additive),
            p_value: optional(col_p),
        });
    }

    Ok(rows)
}

/// Group rows by trait id, then by chromosome.
pub fn organise_reaper_main_results(rows: &[MappingRow]) -> Organised {
    rows.iter().fold(Organised::new(), |mut organised, row| {
        organised
            .entry(row.id.clone())
            .or_default()
            .entry(row.chr.clone())
            .or_default()
            .push(LocusResult {
                locus: row.locus.clone(),
                mb: row.mb,
                lrs: row.lrs,
            });
        organised
    })
}

/// Numbered names first in numeric order, then the rest alphabetically.
///
/// Used both for chromosomes (`1 < 2 < 10 < M < X < Y`) and for trait ids.
pub fn chromosome_cmp(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Distinct chromosome names in display order
pub fn chromosome_names(rows: &[MappingRow]) -> Vec<String> {
    rows.iter()
        .map(|row| row.chr.clone())
        .unique()
        .sorted_by(|a, b| chromosome_cmp(a, b))
        .collect()
}

/// Distinct trait ids, numerically sorted
pub fn trait_ids(rows: &[MappingRow]) -> Vec<String> {
    rows.iter()
        .map(|row| row.id.clone())
        .unique()
        .sorted_by(|a, b| chromosome_cmp(a, b))
        .collect()
}

/// LRS values of a trait on one chromosome, ordered by locus name.
///
/// `[None]` when the trait has nothing on that chromosome.
pub fn get_lrs_from_chr(
    chromosomes: Option<&IndexMap<String, Vec<LocusResult>>>,
    chr_name: &str,
) -> Vec<Option<f64>> {
    match chromosomes.and_then(|chrs| chrs.get(chr_name)) {
        Some(loci) if !loci.is_empty() => loci
            .iter()
            .sorted_by(|a, b| a.locus.cmp(&b.locus))
            .map(|locus| Some(locus.lrs))
            .collect(),
        _ => vec![None],
    }
}

/// Build the chromosome x trait matrix, row major.
pub fn process_traits_data_for_heatmap(
    organised: &Organised,
    trait_ids: &[String],
    chromosome_names: &[String],
) -> HeatmapMatrix {
    chromosome_names
        .iter()
        .map(|chr_name| {
            trait_ids
                .iter()
                .map(|id| get_lrs_from_chr(organised.get(id), chr_name))
                .collect()
        })
        .collect()
}
