pub mod libs;

pub use crate::libs::error::{HeatmapError, Result};
pub use crate::libs::io::*;
