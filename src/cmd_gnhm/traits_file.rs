use clap::*;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("traits-file")
        .about("Input for the mapping engine, in display order")
        .after_help(
            r###"
Clusters the listed traits and writes their values as a traits file for
qtlreaper: header `Trait` plus all strains, then one row per trait in display
order numbered from 1. Missing values are `x`.

Run the mapping engine on this file, then feed its main output to
`gnhm heatmap --qtl`.

Examples:
1. gnhm traits-file names.lst -s traits.json -g genotype.json -o traits.txt

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Trait fullnames, one per line. [stdin] for standard input"),
        )
        .arg(super::arg_store())
        .arg(super::arg_geno())
        .arg(super::arg_threshold())
        .arg(
            Arg::new("order")
                .long("order")
                .action(ArgAction::SetTrue)
                .help("Write `position<TAB>fullname` lines instead"),
        )
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let config = super::load_config(args)?;
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());

    let names = intspan::read_first_column(args.get_one::<String>("infile").unwrap());
    let sources = super::Sources::from_args(args)?;
    let clustered = sources.pipeline(&config).cluster(&names)?;

    if args.get_flag("order") {
        for (pos, record) in clustered.ordered_traits().iter().enumerate() {
            writer.write_all(format!("{}\t{}\n", pos + 1, record.fullname).as_ref())?;
        }
    } else {
        writer.write_all(clustered.traits_file().as_ref())?;
    }

    Ok(())
}
