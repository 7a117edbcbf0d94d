pub mod status;

pub use status::{format_row, report, LEGEND};
