use crate::libs::error::{HeatmapError, Result};
use crate::libs::io::de_opt_label;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between the parts of a trait fullname
pub const FULLNAME_DELIMITER: &str = "::";

/// One value per strain slot; `None` marks missing data.
pub type AlignedVector = Vec<Option<f64>>;

/// Parsed trait fullname: `dataset::trait` or `dataset::trait::cellid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitName {
    pub dataset: String,
    pub name: String,
    pub cellid: Option<String>,
}

impl TraitName {
    pub fn parse(fullname: &str) -> Result<Self> {
        let parts: Vec<&str> = fullname.split(FULLNAME_DELIMITER).collect();
        let bad = |message: &str| HeatmapError::Parse {
            line: 1,
            message: format!("trait fullname `{}`: {}", fullname, message),
        };

        match parts.as_slice() {
            [dataset, name] | [dataset, name, _] if dataset.is_empty() || name.is_empty() => {
                Err(bad("empty dataset or trait name"))
            }
            [dataset, name] => Ok(Self {
                dataset: dataset.to_string(),
                name: name.to_string(),
                cellid: None,
            }),
            [dataset, name, cellid] => Ok(Self {
                dataset: dataset.to_string(),
                name: name.to_string(),
                cellid: if cellid.is_empty() {
                    None
                } else {
                    Some(cellid.to_string())
                },
            }),
            _ => Err(bad("expected 2 or 3 parts")),
        }
    }
}

impl fmt::Display for TraitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.dataset, FULLNAME_DELIMITER, self.name)?;
        if let Some(cellid) = &self.cellid {
            write!(f, "{}{}", FULLNAME_DELIMITER, cellid)?;
        }
        Ok(())
    }
}

/// Per-strain measurement of a trait
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub variance: Option<f64>,
    #[serde(default)]
    pub ndata: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    #[serde(default)]
    pub dataset_name: String,
    #[serde(default)]
    pub displayname: String,
    #[serde(default)]
    pub dataset_type: String,
    #[serde(default)]
    pub riset: Option<String>,
    #[serde(default = "default_public")]
    pub public: i32,
}

fn default_public() -> i32 {
    2
}

/// A trait with its metadata and per-strain data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitRecord {
    pub fullname: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_opt_label")]
    pub chr: Option<String>,
    #[serde(default)]
    pub mb: Option<f64>,
    #[serde(default)]
    pub dataset: Option<DatasetInfo>,
    #[serde(default)]
    pub data: IndexMap<String, SampleRecord>,
}

impl TraitRecord {
    /// A record that carries nothing but its name
    pub fn empty(fullname: &str) -> Self {
        Self {
            fullname: fullname.to_string(),
            ..Default::default()
        }
    }

    /// Name used to label the trait on a heatmap.
    pub fn display_name(&self) -> String {
        let description = self.description.clone().unwrap_or_default();
        let (dataset, name) = match (&self.dataset, TraitName::parse(&self.fullname)) {
            (Some(dataset), Ok(name)) => (dataset, name),
            _ => return description,
        };

        if dataset.dataset_type == "Temp" {
            let label = if description.contains("PCA") {
                let start = description.rfind(':').map(|i| i + 1).unwrap_or(0);
                description[start..].trim()
            } else {
                let end = description.find("entered").unwrap_or(description.len());
                description[..end].trim()
            };
            return format!("{}{}{}", dataset.displayname, FULLNAME_DELIMITER, label);
        }

        let prefix = format!(
            "{}{}{}",
            dataset.dataset_name, FULLNAME_DELIMITER, name.name
        );
        match name.cellid {
            Some(cellid) => format!("{}{}{}", prefix, FULLNAME_DELIMITER, cellid),
            None => prefix,
        }
    }
}

/// Which field(s) of a [`SampleRecord`] to export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldMode {
    #[default]
    Value,
    Variance,
    Ndata,
    All,
}

impl FromStr for FieldMode {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "val" => Ok(FieldMode::Value),
            "var" => Ok(FieldMode::Variance),
            "N" => Ok(FieldMode::Ndata),
            "all" => Ok(FieldMode::All),
            _ => Err(HeatmapError::InvalidFieldMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for FieldMode {
    type Error = HeatmapError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<FieldMode> for String {
    fn from(mode: FieldMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for FieldMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldMode::Value => "val",
            FieldMode::Variance => "var",
            FieldMode::Ndata => "N",
            FieldMode::All => "all",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub mode: FieldMode,
    pub include_variance: bool,
    pub include_ndata: bool,
}

impl ExportOptions {
    pub fn new(mode: FieldMode, include_variance: bool, include_ndata: bool) -> Self {
        Self {
            mode,
            include_variance,
            include_ndata,
        }
    }

    /// Number of slots emitted per strain
    pub fn width(&self) -> usize {
        match self.mode {
            FieldMode::All => 1 + self.include_variance as usize + self.include_ndata as usize,
            _ => 1,
        }
    }

    fn slots(&self, sample: Option<&SampleRecord>) -> Vec<Option<f64>> {
        let sample = match sample {
            Some(sample) => sample,
            None => return vec![None; self.width()],
        };

        match self.mode {
            FieldMode::Value => vec![sample.value],
            FieldMode::Variance => vec![sample.variance],
            FieldMode::Ndata => vec![sample.ndata.map(|n| n as f64)],
            FieldMode::All => {
                let mut slots = vec![sample.value];
                if self.include_variance {
                    slots.push(sample.variance);
                }
                if self.include_ndata {
                    slots.push(sample.ndata.map(|n| n as f64));
                }
                slots
            }
        }
    }
}

/// Lay out one trait's data along `strains`.
///
/// The result always holds `strains.len() * opts.width()` slots.
///
/// ```
/// use gnhm::libs::trait_data::{export_trait_data, ExportOptions, SampleRecord, TraitRecord};
///
/// let mut record = TraitRecord::empty("BXDPublish::10001");
/// record.data.insert("BXD1".into(), SampleRecord { value: Some(5.0), ..Default::default() });
/// record.data.insert("BXD3".into(), SampleRecord { value: Some(7.2), ..Default::default() });
///
/// let strains = vec!["BXD1".to_string(), "BXD2".to_string(), "BXD3".to_string()];
/// let exported = export_trait_data(&record, &strains, &ExportOptions::default());
/// assert_eq!(exported, vec![Some(5.0), None, Some(7.2)]);
/// ```
pub fn export_trait_data(
    record: &TraitRecord,
    strains: &[String],
    opts: &ExportOptions,
) -> AlignedVector {
    strains.iter().fold(
        Vec::with_capacity(strains.len() * opts.width()),
        |mut acc, strain| {
            acc.extend(opts.slots(record.data.get(strain)));
            acc
        },
    )
}
