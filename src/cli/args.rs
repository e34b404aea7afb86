//! Command-line argument parsing.

use thiserror::Error;

/// What the binary should do.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Ask a single question and exit
    Query(String),
    /// Read questions from stdin (default)
    Interactive,
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub command: CliCommand,
    /// `--url` override
    pub url: Option<String>,
    /// `--token` override
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("unknown argument '{0}' (try --help)")]
    Unknown(String),
}

/// Parse command-line arguments.
///
/// `--version` and `--help` win over everything else.
///
/// # Examples
///
/// ```
/// use ragstream::cli::{parse_args, CliCommand};
///
/// let args = vec!["ragstream".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).unwrap().command, CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> Result<CliArgs, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut parsed = CliArgs {
        command: CliCommand::Interactive,
        url: None,
        token: None,
    };

    // Skip the program name
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                parsed.command = CliCommand::Version;
                return Ok(parsed);
            }
            "--help" | "-h" => {
                parsed.command = CliCommand::Help;
                return Ok(parsed);
            }
            "--url" => parsed.url = Some(value(&mut args, &arg)?),
            "--token" => parsed.token = Some(value(&mut args, &arg)?),
            "--query" | "-q" => parsed.command = CliCommand::Query(value(&mut args, &arg)?),
            _ => return Err(ArgsError::Unknown(arg)),
        }
    }
    Ok(parsed)
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, ArgsError> {
    args.next()
        .filter(|v| !v.starts_with("--"))
        .ok_or_else(|| ArgsError::MissingValue(flag.to_string()))
}
