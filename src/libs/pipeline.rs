//! Clusters a set of traits and lays out their mapping results as a heatmap.
//!
//! Stages run one after another, each on the complete output of the one
//! before; nothing is shared between runs.

use crate::libs::align::{generate_traits_file, retrieve_strains_and_values, StrainValues};
use crate::libs::config::PipelineConfig;
use crate::libs::correlation::Correlation;
use crate::libs::distance::{build_distance_matrix, DistanceMatrix};
use crate::libs::error::{HeatmapError, Result};
use crate::libs::genotype::{get_nearest_marker, GenotypeMap, GenotypeSource};
use crate::libs::merge_tree::{compute_traits_order, Clusterer, MergeTree};
use crate::libs::qtl::{
    chromosome_names, organise_reaper_main_results, process_traits_data_for_heatmap,
    HeatmapMatrix, MappingEngine,
};
use crate::libs::store::TraitRetriever;
use crate::libs::trait_data::{export_trait_data, AlignedVector, ExportOptions, TraitRecord};
use serde::Serialize;
use std::io::Write;

/// What the renderer receives
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapPayload {
    pub clustering_data: DistanceMatrix,
    pub heatmap_data: HeatmapMatrix,
    /// Trait fullnames in display order
    pub traits: Vec<String>,
    pub chromosomes: Vec<String>,
    /// Closest marker per trait, in display order
    pub nearest_markers: Vec<Option<String>>,
}

/// Everything up to, but not including, genetic mapping
#[derive(Debug, Clone)]
pub struct Clustered {
    pub traits: Vec<TraitRecord>,
    pub genotype: GenotypeMap,
    pub vectors: Vec<AlignedVector>,
    pub distances: DistanceMatrix,
    pub tree: MergeTree,
    pub order: Vec<usize>,
    pub strains_and_values: Vec<StrainValues>,
}

impl Clustered {
    /// Records in display order
    pub fn ordered_traits(&self) -> Vec<TraitRecord> {
        self.order.iter().map(|&i| self.traits[i].clone()).collect()
    }

    /// Input for the mapping engine
    pub fn traits_file(&self) -> String {
        generate_traits_file(&self.genotype.strains, &self.strains_and_values)
    }
}

pub struct Pipeline<'a> {
    pub config: &'a PipelineConfig,
    pub retriever: &'a dyn TraitRetriever,
    pub genotype: &'a dyn GenotypeSource,
    pub correlation: &'a dyn Correlation,
    pub clusterer: &'a dyn Clusterer,
}

impl<'a> Pipeline<'a> {
    /// Retrieve, export, cluster and order the traits.
    pub fn cluster(&self, fullnames: &[String]) -> Result<Clustered> {
        if fullnames.is_empty() {
            return Err(HeatmapError::InvalidInput("no traits given".to_string()));
        }

        let traits = fullnames
            .iter()
            .map(|name| self.retriever.retrieve(name, self.config.threshold))
            .collect::<Result<Vec<_>>>()?;
        log::info!("Retrieved {} traits", traits.len());

        let riset = traits[0]
            .dataset
            .as_ref()
            .and_then(|ds| ds.riset.clone())
            .unwrap_or_default();
        let genotype = self.genotype.load(&riset)?;
        let strains = &genotype.strains;

        // clustering always works on values, one slot per strain
        let opts = ExportOptions::default();
        let vectors: Vec<AlignedVector> = traits
            .iter()
            .map(|record| export_trait_data(record, strains, &opts))
            .collect();
        log::debug!("Exported {} traits over {} strains", vectors.len(), strains.len());

        let distances = build_distance_matrix(&vectors, self.correlation);
        log::info!("Distance matrix: {0} x {0}", distances.size());

        let tree = self.clusterer.cluster(&distances)?;
        if !tree.is_permutation_of(traits.len()) {
            return Err(HeatmapError::MalformedMergeTree(format!(
                "leaves {:?} do not cover {} traits",
                tree.leaves(),
                traits.len()
            )));
        }
        let order = compute_traits_order(&tree);
        log::debug!("Display order: {:?}", order);

        let strains_and_values = retrieve_strains_and_values(&order, strains, &vectors)?;

        Ok(Clustered {
            traits,
            genotype,
            vectors,
            distances,
            tree,
            order,
            strains_and_values,
        })
    }

    /// Run the whole pipeline, mapping with `engine`.
    pub fn build_heatmap(
        &self,
        fullnames: &[String],
        engine: &dyn MappingEngine,
    ) -> Result<HeatmapPayload> {
        let clustered = self.cluster(fullnames)?;

        let mut traits_file = tempfile::Builder::new()
            .prefix("traits_file_")
            .suffix(".txt")
            .tempfile_in(&self.config.tmpdir)?;
        traits_file.write_all(clustered.traits_file().as_bytes())?;
        traits_file.flush()?;

        let rows = engine.run(traits_file.path())?;
        log::info!("Mapping engine returned {} rows", rows.len());

        let organised = organise_reaper_main_results(&rows);
        let chromosomes = chromosome_names(&rows);

        // rows of the traits file are numbered by display position
        let trait_ids: Vec<String> = (1..=clustered.order.len())
            .map(|i| i.to_string())
            .collect();
        for id in organised.keys() {
            if !trait_ids.contains(id) {
                log::warn!("Ignoring mapping results for unknown trait id {}", id);
            }
        }
        let heatmap_data = process_traits_data_for_heatmap(&organised, &trait_ids, &chromosomes);

        let ordered = clustered.ordered_traits();
        let nearest_markers = get_nearest_marker(&ordered, &clustered.genotype);
        log::info!(
            "Resolved {} of {} nearest markers",
            nearest_markers.iter().filter(|m| m.is_some()).count(),
            nearest_markers.len()
        );

        Ok(HeatmapPayload {
            clustering_data: clustered.distances,
            heatmap_data,
            traits: ordered.into_iter().map(|t| t.fullname).collect(),
            chromosomes,
            nearest_markers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::correlation::Pearson;
    use crate::libs::genotype::{Chromosome, Marker};
    use crate::libs::merge_tree::SingleLinkage;
    use crate::libs::qtl::{parse_reaper_main_results, MappingRow};
    use crate::libs::store::JsonTraitStore;
    use std::cell::RefCell;
    use std::io::BufReader;
    use std::path::Path;

    struct FixedGenotype(GenotypeMap);

    impl GenotypeSource for FixedGenotype {
        fn load(&self, _riset: &str) -> Result<GenotypeMap> {
            Ok(self.0.clone())
        }
    }

    // Records the traits file it was given and answers with canned rows
    struct CannedEngine {
        rows: Vec<MappingRow>,
        seen: RefCell<String>,
    }

    impl MappingEngine for CannedEngine {
        fn run(&self, traits_file: &Path) -> Result<Vec<MappingRow>> {
            *self.seen.borrow_mut() = std::fs::read_to_string(traits_file)?;
            Ok(self.rows.clone())
        }
    }

    struct FailingEngine;

    impl MappingEngine for FailingEngine {
        fn run(&self, _traits_file: &Path) -> Result<Vec<MappingRow>> {
            Err(HeatmapError::Collaborator("reaper exited with 1".to_string()))
        }
    }

    struct BadClusterer;

    impl Clusterer for BadClusterer {
        fn cluster(&self, _matrix: &DistanceMatrix) -> Result<MergeTree> {
            Ok(MergeTree::node(MergeTree::Leaf(0), MergeTree::Leaf(0)))
        }
    }

    fn store() -> JsonTraitStore {
        let records: Vec<TraitRecord> = serde_json::from_str(
            r#"[
                {"fullname": "BXDPublish::1", "chr": "1", "mb": 4.0,
                 "data": {"A": {"value": 1.0}, "B": {"value": 2.0}, "C": {"value": 3.0}, "D": {"value": 4.0}}},
                {"fullname": "BXDPublish::2", "chr": "2", "mb": 1.0,
                 "data": {"A": {"value": 4.0}, "B": {"value": 1.0}, "C": {"value": 3.5}, "D": {"value": 1.5}}},
                {"fullname": "BXDPublish::3", "chr": "1", "mb": 9.0,
                 "data": {"A": {"value": 2.0}, "B": {"value": 4.0}, "C": {"value": 6.0}}}
            ]"#,
        )
        .unwrap();
        JsonTraitStore::from_records(records)
    }

    fn genotype() -> FixedGenotype {
        FixedGenotype(GenotypeMap {
            strains: ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect(),
            has_map: true,
            chromosomes: vec![Chromosome {
                name: "1".to_string(),
                loci: vec![
                    Marker {
                        name: "rs1".to_string(),
                        mb: 3.0,
                    },
                    Marker {
                        name: "rs2".to_string(),
                        mb: 10.0,
                    },
                ],
            }],
        })
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cluster() {
        let config = PipelineConfig::default();
        let store = store();
        let geno = genotype();
        let pipeline = Pipeline {
            config: &config,
            retriever: &store,
            genotype: &geno,
            correlation: &Pearson,
            clusterer: &SingleLinkage,
        };

        let clustered = pipeline
            .cluster(&names(&["BXDPublish::1", "BXDPublish::2", "BXDPublish::3"]))
            .unwrap();

        // traits 1 and 3 are perfectly correlated on their shared strains
        assert_eq!(clustered.distances.get(0, 2), 0.0);
        assert_eq!(clustered.order, vec![0, 2, 1]);
        assert_eq!(clustered.strains_and_values[1].strains, vec!["A", "B", "C"]);
        assert_eq!(
            clustered.traits_file(),
            "Trait\tA\tB\tC\tD\n1\t1\t2\t3\t4\n2\t2\t4\t6\tx\n3\t4\t1\t3.5\t1.5\n"
        );
    }

    #[test]
    fn test_build_heatmap() {
        let config = PipelineConfig::default();
        let store = store();
        let geno = genotype();
        let pipeline = Pipeline {
            config: &config,
            retriever: &store,
            genotype: &geno,
            correlation: &Pearson,
            clusterer: &SingleLinkage,
        };

        let reaper = "ID\tLocus\tChr\tcM\tMb\tLRS
1\trs2\t1\t10\t10.0\t3.0
1\trs1\t1\t3\t3.0\t1.0
3\trs9\tX\t1\t1.0\t8.0
2\trs1\t1\t3\t3.0\t2.0
";
        let engine = CannedEngine {
            rows: parse_reaper_main_results(BufReader::new(reaper.as_bytes())).unwrap(),
            seen: RefCell::new(String::new()),
        };

        let payload = pipeline
            .build_heatmap(
                &names(&["BXDPublish::1", "BXDPublish::2", "BXDPublish::3"]),
                &engine,
            )
            .unwrap();

        assert!(engine.seen.borrow().starts_with("Trait\tA\tB\tC\tD\n"));
        assert_eq!(
            payload.traits,
            vec!["BXDPublish::1", "BXDPublish::3", "BXDPublish::2"]
        );
        assert_eq!(payload.chromosomes, vec!["1", "X"]);
        assert_eq!(
            payload.heatmap_data,
            vec![
                vec![vec![Some(1.0), Some(3.0)], vec![Some(2.0)], vec![None]],
                vec![vec![None], vec![None], vec![Some(8.0)]],
            ]
        );
        assert_eq!(
            payload.nearest_markers,
            vec![Some("rs1".to_string()), Some("rs2".to_string()), None]
        );
        assert_eq!(payload.clustering_data.size(), 3);
    }

    #[test]
    fn test_errors_pass_through() {
        let config = PipelineConfig::default();
        let store = store();
        let geno = genotype();
        let mut pipeline = Pipeline {
            config: &config,
            retriever: &store,
            genotype: &geno,
            correlation: &Pearson,
            clusterer: &SingleLinkage,
        };
        let traits = names(&["BXDPublish::1", "BXDPublish::2"]);

        match pipeline.build_heatmap(&traits, &FailingEngine) {
            Err(HeatmapError::Collaborator(msg)) => assert_eq!(msg, "reaper exited with 1"),
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            pipeline.cluster(&[]),
            Err(HeatmapError::InvalidInput(_))
        ));

        pipeline.clusterer = &BadClusterer;
        assert!(matches!(
            pipeline.cluster(&traits),
            Err(HeatmapError::MalformedMergeTree(_))
        ));
    }
}
