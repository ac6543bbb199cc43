use clap::*;
use gnhm::libs::merge_tree::{compute_traits_order, MergeTree};
use std::io::{Read, Write};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("order")
        .about("Display order of a merge tree")
        .after_help(
            r###"
Flattens a merge tree into the order its leaves are displayed in: depth
first, left subtree before right subtree.

Notes:
* The tree is JSON: a leaf is a trait index, a node is a pair,
  e.g. `[0, [[1, 2], 3]]`.
* Anything else, like a node with three children, is an error.
* `--labels` names leaf `i` after line `i + 1` of the file.

Examples:
1. One index per line:
   gnhm order tree.json

2. As Newick, with trait names:
   gnhm order tree.json --newick --labels names.lst

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input filename. [stdin] for standard input"),
        )
        .arg(
            Arg::new("newick")
                .long("newick")
                .action(ArgAction::SetTrue)
                .help("Write the tree as Newick instead"),
        )
        .arg(
            Arg::new("labels")
                .long("labels")
                .short('l')
                .num_args(1)
                .help("Leaf names, one per line"),
        )
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());

    let mut reader = intspan::reader(args.get_one::<String>("infile").unwrap());
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let tree = MergeTree::from_json(&text)?;

    let labels = match args.get_one::<String>("labels") {
        Some(file) => intspan::read_first_column(file),
        None => vec![],
    };

    if args.get_flag("newick") {
        writer.write_all((tree.to_newick(&labels) + "\n").as_ref())?;
    } else {
        for idx in compute_traits_order(&tree) {
            let line = match labels.get(idx) {
                Some(label) => format!("{}\t{}\n", idx, label),
                None => format!("{}\n", idx),
            };
            writer.write_all(line.as_ref())?;
        }
    }

    Ok(())
}
