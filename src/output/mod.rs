//! Output module: audit metadata and result rendering

pub mod formatter;
pub mod report;
