//! swmsgen-xlsx - Risk register workbook writer
//!
//! Emits a two-sheet .xlsx workbook from a TOML register config: the
//! register table with summaries and hold points, and a matrix/lists
//! sheet the dropdowns reference. Parts are written directly as
//! SpreadsheetML strings and zipped; strings are inline, so the writer
//! stays single-pass.

pub mod config;
pub mod error;
pub mod sheet;
pub mod styles;
pub mod writer;

pub use config::{RegisterConfig, RiskEntry};
pub use error::{Result, XlsxError};
pub use writer::{write_register, write_register_file};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
