mod filesystem_access;
mod match_report;
mod registry;
mod time_calc;
pub mod insights;
pub mod records;
pub mod send_channels;

pub use filesystem_access::FsAccess;
pub use match_report::*;
pub use registry::*;
pub use time_calc::{Stage, TimeCalc};
