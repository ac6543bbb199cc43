use crate::libs::error::{HeatmapError, Result};
use crate::libs::trait_data::TraitRecord;
use indexmap::IndexMap;
use std::path::Path;

/// Looks up a trait's metadata and per-strain data by fullname.
///
/// Unknown or hidden traits come back as an empty record, not as an error.
pub trait TraitRetriever {
    fn retrieve(&self, fullname: &str, threshold: i32) -> Result<TraitRecord>;
}

/// Traits loaded from a JSON array of records
#[derive(Debug, Clone, Default)]
pub struct JsonTraitStore {
    traits: IndexMap<String, TraitRecord>,
}

impl JsonTraitStore {
    pub fn from_records(records: Vec<TraitRecord>) -> Self {
        let traits = records
            .into_iter()
            .map(|record| (record.fullname.clone(), record))
            .collect();
        Self { traits }
    }

    pub fn from_file(path: &str) -> Result<Self> {
        if path != "stdin" && !Path::new(path).is_file() {
            return Err(HeatmapError::Collaborator(format!(
                "trait store not found: {}",
                path
            )));
        }
        let records: Vec<TraitRecord> = crate::libs::io::read_json(path)?;
        log::debug!("Loaded {} traits from {}", records.len(), path);

        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// All stored records, in file order
    pub fn records(&self) -> Vec<TraitRecord> {
        self.traits.values().cloned().collect()
    }
}

impl TraitRetriever for JsonTraitStore {
    fn retrieve(&self, fullname: &str, threshold: i32) -> Result<TraitRecord> {
        match self.traits.get(fullname) {
            Some(record) if record.dataset.as_ref().map_or(true, |ds| ds.public > threshold) => {
                Ok(record.clone())
            }
            Some(_) => {
                log::warn!("Trait {} is not public at threshold {}", fullname, threshold);
                Ok(TraitRecord::empty(fullname))
            }
            None => {
                log::warn!("Trait {} not found", fullname);
                Ok(TraitRecord::empty(fullname))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> JsonTraitStore {
        let records: Vec<TraitRecord> = serde_json::from_str(
            r#"[
                {"fullname": "BXDPublish::10001", "data": {"BXD1": {"value": 1.0}}},
                {"fullname": "Hidden::1", "dataset": {"dataset_name": "Hidden", "public": 0},
                 "data": {"BXD1": {"value": 2.0}}}
            ]"#,
        )
        .unwrap();
        JsonTraitStore::from_records(records)
    }

    #[test]
    fn test_retrieve() {
        let store = store();
        assert_eq!(store.len(), 2);

        let record = store.retrieve("BXDPublish::10001", 0).unwrap();
        assert_eq!(record.data["BXD1"].value, Some(1.0));
    }

    #[test]
    fn test_unknown_and_hidden_are_empty() {
        let store = store();

        let record = store.retrieve("BXDPublish::99999", 0).unwrap();
        assert_eq!(record.fullname, "BXDPublish::99999");
        assert!(record.data.is_empty());

        let record = store.retrieve("Hidden::1", 0).unwrap();
        assert!(record.data.is_empty());

        let record = store.retrieve("Hidden::1", -1).unwrap();
        assert_eq!(record.data.len(), 1);
    }
}
