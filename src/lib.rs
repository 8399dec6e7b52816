//! Mention tracker: recent Reddit mentions of a term, summarised and exported.
//!
//! Collection itself lives in the `mention-search` crate. This crate adds
//! the pieces around it:
//! - **Config**: `config.toml` with search defaults, collector and export settings
//! - **Search**: resolving command-line overrides into a request and running it
//! - **Report**: aggregate statistics rendered as plain text
//! - **Export**: one CSV row per mention

pub mod config;
pub mod error;
pub mod export;
pub mod report;
pub mod search;

pub use config::{ExportConfig, SearchDefaults, TrackerConfig};
pub use error::{Result, TrackerError};
pub use report::Summary;
pub use search::{SearchOverrides, build_request, run_search};

pub use mention_search;
