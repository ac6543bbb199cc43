use clap::*;
use gnhm::libs::correlation::Pearson;
use gnhm::libs::distance::build_distance_matrix;
use gnhm::libs::genotype::{GenotypeSource, JsonGenotype};
use gnhm::libs::store::JsonTraitStore;
use gnhm::libs::trait_data::{export_trait_data, ExportOptions};
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("dist")
        .about("Correlation distances between traits")
        .after_help(
            r###"
Computes `1 - r` (Pearson, pairwise complete strains) between every pair of
traits in the store. Distances below 0 are raised to 0.

Notes:
* `phylip`: relaxed PHYLIP, labelled by trait fullname.
* `json`: nested arrays, rows in store order.

Examples:
1. PHYLIP matrix:
   gnhm dist traits.json -g genotype.json

2. JSON matrix:
   gnhm dist traits.json -g genotype.json --format json

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Trait store, a JSON array of traits"),
        )
        .arg(super::arg_geno())
        .arg(
            Arg::new("format")
                .long("format")
                .num_args(1)
                .default_value("phylip")
                .value_parser([
                    builder::PossibleValue::new("phylip"),
                    builder::PossibleValue::new("json"),
                ])
                .help("Output format"),
        )
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let outfile = args.get_one::<String>("outfile").unwrap();
    let opt_format = args.get_one::<String>("format").unwrap();

    let store = JsonTraitStore::from_file(args.get_one::<String>("infile").unwrap())?;
    let genotype = JsonGenotype::new(args.get_one::<String>("geno").unwrap()).load("")?;

    let records = store.records();
    let opts = ExportOptions::default();
    let vectors: Vec<_> = records
        .iter()
        .map(|record| export_trait_data(record, &genotype.strains, &opts))
        .collect();
    let matrix = build_distance_matrix(&vectors, &Pearson);

    if opt_format == "json" {
        gnhm::write_json(outfile, &matrix)?;
    } else {
        let names: Vec<String> = records.iter().map(|r| r.fullname.clone()).collect();
        let mut writer = intspan::writer(outfile);
        writer.write_all(matrix.to_phylip(&names).as_ref())?;
    }

    Ok(())
}
