extern crate clap;
use clap::*;

mod cmd_gnhm;

fn main() -> anyhow::Result<()> {
    let app = Command::new("gnhm")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`gnhm` - GeneNetwork HeatMap: cluster traits and lay out their QTL scores")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .global(true)
                .help("Log progress to stderr; repeat for more detail"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .num_args(1)
                .global(true)
                .help("JSON config file, applied over $GNHM_CONF"),
        )
        .subcommand(cmd_gnhm::export::make_subcommand())
        .subcommand(cmd_gnhm::dist::make_subcommand())
        .subcommand(cmd_gnhm::order::make_subcommand())
        .subcommand(cmd_gnhm::marker::make_subcommand())
        .subcommand(cmd_gnhm::traits_file::make_subcommand())
        .subcommand(cmd_gnhm::heatmap::make_subcommand())
        .after_help(
            r###"Subcommand groups:

* Stages:
    * export      - Lay out trait data along the strain list
    * dist        - Correlation distances between traits
    * order       - Display order of a merge tree
    * marker      - Nearest genotype marker of each trait

* Pipelines:
    * traits-file - Input for the mapping engine, in display order
    * heatmap     - Clustering plus QTL heatmap data as JSON

"###,
        );

    let matches = app.get_matches();

    let level = match matches.get_count("verbose") {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // Check which subcomamnd the user ran...
    match matches.subcommand() {
        Some(("export", sub_matches)) => cmd_gnhm::export::execute(sub_matches),
        Some(("dist", sub_matches)) => cmd_gnhm::dist::execute(sub_matches),
        Some(("order", sub_matches)) => cmd_gnhm::order::execute(sub_matches),
        Some(("marker", sub_matches)) => cmd_gnhm::marker::execute(sub_matches),
        Some(("traits-file", sub_matches)) => cmd_gnhm::traits_file::execute(sub_matches),
        Some(("heatmap", sub_matches)) => cmd_gnhm::heatmap::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
