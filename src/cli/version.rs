//! Version and usage text.

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Usage text for `--help`.
pub const USAGE: &str = "\
Usage: ragstream [--url URL] [--token TOKEN] [--query TEXT]

Ask questions against a retrieval-augmented generation backend and watch
the answer stream in.

Options:
  --url URL        Backend base URL (env RAGSTREAM_URL, default http://localhost:8000)
  --token TOKEN    Bearer token (env RAGSTREAM_TOKEN)
  -q, --query TEXT Ask one question and exit
  -V, --version    Print version
  -h, --help       Print this help

Interactive commands:
  /good [text]     Rate the last answer as helpful
  /bad [text]      Rate the last answer as unhelpful
  /docs            List ingested documents
  /help            Show commands
  /quit            Exit
  Ctrl+C           Cancel the answer in progress";

/// Version line printed by `--version`.
pub fn version_line() -> String {
    format!("ragstream {}", VERSION)
}
