use clap::*;
use gnhm::libs::genotype::{GenotypeSource, JsonGenotype};
use gnhm::libs::store::JsonTraitStore;
use gnhm::libs::trait_data::{export_trait_data, ExportOptions, FieldMode};
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("export")
        .about("Lay out trait data along the strain list")
        .after_help(
            r###"
Writes one row per trait: the fullname, then the exported slots of every
strain in genotype order.

Notes:
* Modes: `val` (value), `var` (variance), `N` (number of samples), `all`.
* `--var` and `--n` only widen `all` mode, to 2 or 3 slots per strain.
* Missing data is written as `NA`.

Examples:
1. Values:
   gnhm export traits.json -g genotype.json

2. Value, variance and N for each strain:
   gnhm export traits.json -g genotype.json --mode all --var --n

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
            Arg::new("mode")
                .long("mode")
                .num_args(1)
                .help("Field(s) to export: val, var, N or all"),
        )
        .arg(
            Arg::new("var")
                .long("var")
                .action(ArgAction::SetTrue)
                .help("Include variance in `all` mode"),
        )
        .arg(
            Arg::new("n")
                .long("n")
                .action(ArgAction::SetTrue)
                .help("Include N in `all` mode"),
        )
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let config = super::load_config(args)?;
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());

    let mut opts = config.export_options();
    if let Some(mode) = args.get_one::<String>("mode") {
        opts.mode = mode.parse::<FieldMode>()?;
    }
    if args.get_flag("var") {
        opts.include_variance = true;
    }
    if args.get_flag("n") {
        opts.include_ndata = true;
    }

    let store = JsonTraitStore::from_file(args.get_one::<String>("infile").unwrap())?;
    let genotype = JsonGenotype::new(args.get_one::<String>("geno").unwrap()).load("")?;

    //----------------------------
    // Output
    //----------------------------
    writer.write_all(format!("Trait\t{}\n", header(&genotype.strains, &opts)).as_ref())?;
    for record in store.records() {
        let exported = export_trait_data(&record, &genotype.strains, &opts);
        let cells: Vec<String> = exported.into_iter().map(gnhm::fmt_opt).collect();
        writer.write_all(format!("{}\t{}\n", record.fullname, cells.join("\t")).as_ref())?;
    }

    Ok(())
}

fn header(strains: &[String], opts: &ExportOptions) -> String {
    if opts.width() == 1 {
        return strains.join("\t");
    }

    let mut fields = vec!["value"];
    if opts.include_variance {
        fields.push("variance");
    }
    if opts.include_ndata {
        fields.push("ndata");
    }
    strains
        .iter()
        .flat_map(|strain| fields.iter().map(move |field| format!("{}:{}", strain, field)))
        .collect::<Vec<_>>()
        .join("\t")
}
