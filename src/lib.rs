//! Per-station min/mean/max over a `<station>;<temperature>` file.
//!
//! The input is cut into newline-aligned chunks by [`reader::ChunkReader`],
//! each worker folds chunks into its own [`table::StationTable`], and the
//! tables are merged into a sorted [`report::ResultSet`] at the end.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod hash;
pub mod pipeline;
pub mod pool;
pub mod reader;
pub mod report;
pub mod scanner;
pub mod table;
pub mod temperature;
pub mod verify;

pub use config::Config;
pub use error::{Error, Result};
pub use report::ResultSet;
