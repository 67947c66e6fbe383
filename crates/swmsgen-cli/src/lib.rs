//! swmsgen CLI - Command-line interface library
//!
//! This library provides the CLI functionality for swmsgen:
//! - Build: generate an SWMS document from a template and a plan
//! - Register: write the risk-register workbook
//! - Bulletize: convert consolidated-summary controls to bullet lists
//! - Validate: run the PPE gate over a finished document
//!
//! # Binary Usage
//!
//! ```bash
//! # Build an SWMS from a template and plan
//! swmsgen build --template template.docx --plan works.toml
//!
//! # Write the risk register
//! swmsgen register --config register.toml --out register.xlsx
//!
//! # Bulletize the consolidated summary
//! swmsgen bulletize swms.docx
//!
//! # Gate a finished document (exit 1 on violations)
//! swmsgen validate swms.docx
//! ```

pub mod app;

pub use app::{
    build_command, bulletize_command, register_command, run_cli, validate_command, OutputFormat,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
