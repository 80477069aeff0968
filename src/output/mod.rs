//! Terminal output.
//!
//! Results go to stdout. Diagnostics go through `tracing` to stderr, so the
//! report can be piped.

pub mod browser;
pub mod logs;
pub mod report;
pub mod table;

pub use browser::{explore_url, open_in_browser};
pub use logs::{format_entry, write_entries};
pub use report::write_report;
pub use table::tabulate;
