//! CLI module.
//!
//! - Argument parsing
//! - Version and usage text
//! - Interactive prompt commands
//!
//! ```ignore
//! use ragstream::cli::{parse_args, CliCommand};
//!
//! let args = parse_args(std::env::args())?;
//! match args.command {
//!     CliCommand::Version => println!("{}", version_line()),
//!     CliCommand::Help => println!("{}", USAGE),
//!     CliCommand::Query(q) => ask_once(&q).await?,
//!     CliCommand::Interactive => run_repl().await?,
//! }
//! ```

pub mod args;
pub mod repl;
pub mod version;

pub use args::{parse_args, ArgsError, CliArgs, CliCommand};
pub use repl::{parse_repl_line, ReplCommand};
pub use version::{version_line, USAGE, VERSION};
