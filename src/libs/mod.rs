pub mod align;
pub mod config;
pub mod correlation;
pub mod distance;
pub mod error;
pub mod genotype;
pub mod io;
pub mod merge_tree;
pub mod pipeline;
pub mod qtl;
pub mod store;
pub mod trait_data;
