//! Subcommand modules for the `gnhm` binary.

use clap::*;
use gnhm::libs::config::PipelineConfig;
use gnhm::libs::correlation::Pearson;
use gnhm::libs::genotype::JsonGenotype;
use gnhm::libs::merge_tree::SingleLinkage;
use gnhm::libs::pipeline::Pipeline;
use gnhm::libs::store::JsonTraitStore;
use std::path::PathBuf;

pub mod dist;
pub mod export;
pub mod heatmap;
pub mod marker;
pub mod order;
pub mod traits_file;

/// Config layers plus `--threshold` / `--tmpdir` when the subcommand has them
pub fn load_config(args: &ArgMatches) -> anyhow::Result<PipelineConfig> {
    let explicit = args.get_one::<String>("config").map(|s| s.as_str());
    let mut config = PipelineConfig::load(explicit)?;

    if let Some(threshold) = args.try_get_one::<i32>("threshold").ok().flatten() {
        config.threshold = *threshold;
    }
    if let Some(tmpdir) = args.try_get_one::<String>("tmpdir").ok().flatten() {
        config.tmpdir = PathBuf::from(tmpdir);
    }

    Ok(config)
}

pub fn arg_geno() -> Arg {
    Arg::new("geno")
        .long("geno")
        .short('g')
        .required(true)
        .num_args(1)
        .help("Genotype reference, JSON")
}

pub fn arg_store() -> Arg {
    Arg::new("store")
        .long("store")
        .short('s')
        .required(true)
        .num_args(1)
        .help("Trait store, a JSON array of traits")
}

pub fn arg_threshold() -> Arg {
    Arg::new("threshold")
        .long("threshold")
        .num_args(1)
        .value_parser(value_parser!(i32))
        .allow_negative_numbers(true)
        .help("Only traits of datasets with `public` above this are visible")
}

pub fn arg_outfile() -> Arg {
    Arg::new("outfile")
        .short('o')
        .long("outfile")
        .num_args(1)
        .default_value("stdout")
        .help("Output filename. [stdout] for screen")
}

/// File backed collaborators for one pipeline run
pub struct Sources {
    pub store: JsonTraitStore,
    pub genotype: JsonGenotype,
}

impl Sources {
    pub fn from_args(args: &ArgMatches) -> anyhow::Result<Self> {
        Ok(Self {
            store: JsonTraitStore::from_file(args.get_one::<String>("store").unwrap())?,
            genotype: JsonGenotype::new(args.get_one::<String>("geno").unwrap()),
        })
    }

    pub fn pipeline<'a>(&'a self, config: &'a PipelineConfig) -> Pipeline<'a> {
        Pipeline {
            config,
            retriever: &self.store,
            genotype: &self.genotype,
            correlation: &Pearson,
            clusterer: &SingleLinkage,
        }
    }
}
