use clap::*;
use gnhm::libs::qtl::ReaperOutput;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("heatmap")
        .about("Clustering plus QTL heatmap data as JSON")
        .after_help(
            r###"
Clusters the listed traits and arranges the mapping results into a
chromosome x trait matrix of LRS values.

Output keys:
* clustering_data - distance matrix, in input order
* heatmap_data    - one row per chromosome, one cell per trait in display order;
                    a cell holds the LRS of each locus sorted by locus name,
                    or [null] when the trait has no result on the chromosome
* traits          - trait fullnames in display order
* chromosomes     - chromosome names, numbered ones first
* nearest_markers - closest marker of each trait, in display order

Notes:
* `--qtl` is the tab separated main output of qtlreaper run on the file from
  `gnhm traits-file`, with columns ID, Chr, Locus, Mb and LRS.

Examples:
1. gnhm heatmap names.lst -s traits.json -g genotype.json --qtl reaper.tsv

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
        .arg(
            Arg::new("qtl")
                .long("qtl")
                .required(true)
                .num_args(1)
                .help("Mapping engine main output"),
        )
        .arg(super::arg_threshold())
        .arg(
            Arg::new("tmpdir")
                .long("tmpdir")
                .num_args(1)
                .help("Directory for the intermediate traits file"),
        )
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let config = super::load_config(args)?;
    let outfile = args.get_one::<String>("outfile").unwrap();

    let names = intspan::read_first_column(args.get_one::<String>("infile").unwrap());
    if names.is_empty() {
        anyhow::bail!("No trait names in {}", args.get_one::<String>("infile").unwrap());
    }

    let sources = super::Sources::from_args(args)?;
    let engine = ReaperOutput::new(args.get_one::<String>("qtl").unwrap());
    let payload = sources.pipeline(&config).build_heatmap(&names, &engine)?;

    gnhm::write_json(outfile, &payload)?;

    Ok(())
}
