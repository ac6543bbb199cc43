use crate::libs::error::{HeatmapError, Result};
use crate::libs::io::de_label;
use crate::libs::trait_data::TraitRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A genotyped marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub name: String,
    #[serde(rename = "Mb", alias = "mb")]
    pub mb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chromosome {
    #[serde(deserialize_with = "de_label")]
    pub name: String,
    #[serde(default)]
    pub loci: Vec<Marker>,
}

/// Strains and marker positions of a genotype reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenotypeMap {
    #[serde(default)]
    pub strains: Vec<String>,
    /// Marker positions are physical (Mb) positions
    #[serde(rename = "Mbmap", alias = "has_map", default)]
    pub has_map: bool,
    #[serde(default)]
    pub chromosomes: Vec<Chromosome>,
}

/// Supplies the genotype reference for a set of recombinant inbred strains.
pub trait GenotypeSource {
    fn load(&self, riset: &str) -> Result<GenotypeMap>;
}

/// Genotype reference stored as one JSON document
#[derive(Debug, Clone)]
pub struct JsonGenotype {
    pub path: String,
}

impl JsonGenotype {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

impl GenotypeSource for JsonGenotype {
    fn load(&self, riset: &str) -> Result<GenotypeMap> {
        if self.path != "stdin" && !Path::new(&self.path).is_file() {
            return Err(HeatmapError::Collaborator(format!(
                "genotype file not found: {}",
                self.path
            )));
        }
        let genotype: GenotypeMap = crate::libs::io::read_json(&self.path)?;
        log::info!(
            "Genotype {} ({}): {} strains, {} chromosomes",
            self.path,
            if riset.is_empty() { "-" } else { riset },
            genotype.strains.len(),
            genotype.chromosomes.len()
        );

        Ok(genotype)
    }
}

/// Returns a closure that finds the marker closest to a trait's position.
///
/// Every chromosome entry named like the trait's chromosome is searched; on
/// equal distances the first marker wins. Markers at an undefined distance
/// (a `NaN` position) are skipped.
pub fn nearest_marker_finder(genotype: &GenotypeMap) -> impl Fn(&TraitRecord) -> Option<String> + '_ {
    move |record: &TraitRecord| {
        let chr = record.chr.as_deref()?;
        let mb = record.mb?;

        let mut nearest: Option<(&str, f64)> = None;
        for marker in genotype
            .chromosomes
            .iter()
            .filter(|c| c.name == chr)
            .flat_map(|c| c.loci.iter())
        {
            let distance = (marker.mb - mb).abs();
            if distance.is_nan() {
                continue;
            }
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((marker.name.as_str(), distance));
            }
        }

        nearest.map(|(name, _)| name.to_string())
    }
}

/// Nearest marker for each trait; all `None` when the map has no Mb positions.
pub fn get_nearest_marker(records: &[TraitRecord], genotype: &GenotypeMap) -> Vec<Option<String>> {
    if !genotype.has_map {
        return vec![None; records.len()];
    }

    let finder = nearest_marker_finder(genotype);
    records.iter().map(finder).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genotype() -> GenotypeMap {
        serde_json::from_str(
            r#"{
                "strains": ["BXD1", "BXD2"],
                "Mbmap": true,
                "chromosomes": [
                    {"name": "1", "loci": [
                        {"name": "rs1", "Mb": 3.0},
                        {"name": "rs2", "Mb": 10.0},
                        {"name": "rs3", "Mb": 17.0}
                    ]},
                    {"name": 2, "loci": [{"name": "rs4", "Mb": 5.0}]},
                    {"name": "X", "loci": []},
                    {"name": "1", "loci": [{"name": "rs5", "Mb": 12.5}]}
                ]
            }"#,
        )
        .unwrap()
    }

    fn record(chr: Option<&str>, mb: Option<f64>) -> TraitRecord {
        let mut record = TraitRecord::empty("BXDPublish::1");
        record.chr = chr.map(|s| s.to_string());
        record.mb = mb;
        record
    }

    #[test]
    fn test_nearest() {
        let geno = genotype();
        let find = nearest_marker_finder(&geno);

        assert_eq!(find(&record(Some("1"), Some(4.0))), Some("rs1".to_string()));
        assert_eq!(find(&record(Some("2"), Some(100.0))), Some("rs4".to_string()));
        // searches every entry named "1"
        assert_eq!(find(&record(Some("1"), Some(12.0))), Some("rs5".to_string()));
        // tie between rs1 and rs2 goes to the first
        assert_eq!(find(&record(Some("1"), Some(6.5))), Some("rs1".to_string()));
    }

    #[test]
    fn test_nothing_to_find() {
        let geno = genotype();
        let find = nearest_marker_finder(&geno);

        assert_eq!(find(&record(Some("19"), Some(4.0))), None);
        assert_eq!(find(&record(Some("X"), Some(4.0))), None);
        assert_eq!(find(&record(None, Some(4.0))), None);
        assert_eq!(find(&record(Some("1"), None)), None);
    }

    #[test]
    fn test_nan_positions_are_skipped() {
        let mut geno = genotype();
        geno.chromosomes[0].loci[0].mb = f64::NAN;
        let find = nearest_marker_finder(&geno);

        assert_eq!(find(&record(Some("1"), Some(4.0))), Some("rs2".to_string()));
        assert_eq!(find(&record(Some("1"), Some(f64::NAN))), None);
    }

    #[test]
    fn test_get_nearest_marker() {
        let mut geno = genotype();
        let records = vec![
            record(Some("1"), Some(16.0)),
            record(Some("3"), Some(1.0)),
            record(Some("2"), Some(5.0)),
        ];
        assert_eq!(
            get_nearest_marker(&records, &geno),
            vec![Some("rs3".to_string()), None, Some("rs4".to_string())]
        );

        geno.has_map = false;
        assert_eq!(get_nearest_marker(&records, &geno), vec![None, None, None]);
    }
}
