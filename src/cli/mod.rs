//! # CLI Module
//!
//! Command-line surface of the `apiforge-gen` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Run the batch pipeline and write every accepted artifact set:
//!
//! ```bash
//! apiforge-gen generate --spec orders.raml users.raml --output out --client
//! ```
//!
//! Options:
//! - `--spec <FILE>...` - RAML specifications, processed in order (required)
//! - `--output <DIR>` - Output directory (required)
//! - `--app-name`, `--api-version` - Override generator settings
//! - `--no-auth`, `--no-cors`, `--no-tests` - Leave features out
//! - `--client` - Also generate a Python client per specification
//! - `--config <FILE>` - `apiforge.toml`; auto-detected next to the first spec
//! - `--dry-run` - List output paths only
//!
//! Specifications that fail are reported on stderr and the command exits
//! non-zero, after the successful ones have been written.
//!
//! ### `inspect`
//!
//! Print resources, groups and the canonical names derived for them:
//!
//! ```bash
//! apiforge-gen inspect --spec orders.raml
//! ```
//!
//! ### `check`
//!
//! Parse, generate and validate without writing:
//!
//! ```bash
//! apiforge-gen check --spec orders.raml --client
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,no_run
//! use apiforge::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run_cli(cli).unwrap();
//! ```

mod commands;


pub use commands::{run_cli, write_files, Cli, Commands};
