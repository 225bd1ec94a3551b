//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Configuration and health | `init`, `check`, `status` |
//! | Planning | Validation and ordering | `validate`, `order`, `plan` |
//! | Query | Dependency lookups | `deps`, `dependents`, `ready`, `blocked` |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod plan;
mod query;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
