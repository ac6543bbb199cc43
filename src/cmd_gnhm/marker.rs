use clap::*;
use gnhm::libs::genotype::{get_nearest_marker, GenotypeSource, JsonGenotype};
use gnhm::libs::store::JsonTraitStore;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("marker")
        .about("Nearest genotype marker of each trait")
        .after_help(
            r###"
For each trait, finds the marker closest (in Mb) to the trait's own position
on the same chromosome.

Notes:
* Traits without a chromosome or position get `NA`.
* When the genotype has no Mb map (`"Mbmap": false`) every trait gets `NA`.

Examples:
1. gnhm marker traits.json -g genotype.json

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
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());

    let store = JsonTraitStore::from_file(args.get_one::<String>("infile").unwrap())?;
    let genotype = JsonGenotype::new(args.get_one::<String>("geno").unwrap()).load("")?;

    let records = store.records();
    let markers = get_nearest_marker(&records, &genotype);

    for (record, marker) in records.iter().zip(markers) {
        writer.write_all(
            format!(
                "{}\t{}\n",
                record.fullname,
                marker.unwrap_or_else(|| "NA".to_string())
            )
            .as_ref(),
        )?;
    }

    Ok(())
}
