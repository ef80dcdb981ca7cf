//! Tabular input and output - client/sold CSV ingestion and the skip report

mod reader;
mod skip_report;

pub use reader::{load_address_records, parse_address_records};
pub use skip_report::{read_skip_report, write_skip_report, SKIP_REPORT_FILE};
