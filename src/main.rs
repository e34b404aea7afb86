use std::io::Write;
use std::sync::Arc;

use color_eyre::eyre::{eyre, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use ragstream::cli::{parse_args, parse_repl_line, version_line, CliCommand, ReplCommand, USAGE};
use ragstream::client::RagClient;
use ragstream::config::ClientConfig;
use ragstream::models::{Message, MessageId, Rating, ResponseMetrics, Source, UNTITLED_SOURCE};
use ragstream::turn::{CancelHandle, RejectReason, TurnController, TurnObserver, TurnOutcome};

/// Number of documents shown by `/docs`.
const DOCUMENT_PAGE_SIZE: u32 = 20;

/// Prints the answer as it streams in.
struct TerminalPrinter;

impl TurnObserver for TerminalPrinter {
    fn on_token(&self, _message_id: MessageId, delta: &str) {
        print_token(&mut std::io::stdout(), delta);
    }

    fn on_error(&self, message: &str) {
        eprintln!("\n[error] {}", message);
    }

    fn on_finalized(&self, message: &Message) {
        println!();
        print_sources(&message.sources);
        if let Some(metrics) = &message.metadata {
            print_metrics(metrics);
        }
    }
}

/// Write a token and flush so it shows up immediately. A closed pipe is
/// logged and otherwise ignored.
fn print_token(out: &mut impl Write, delta: &str) -> bool {
    match write!(out, "{}", delta).and_then(|()| out.flush()) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!("Failed to print token: {}", err);
            false
        }
    }
}

fn print_sources(sources: &[Source]) {
    if sources.is_empty() {
        return;
    }
    println!("Sources:");
    for (rank, source) in sources.iter().enumerate() {
        println!(
            "  [{}] {} ({}% match)",
            rank + 1,
            source.display_title(),
            source.similarity_percent()
        );
    }
}

fn print_metrics(metrics: &ResponseMetrics) {
    println!(
        "Confidence {}%, answered in {:.0} ms",
        metrics.confidence_percent(),
        metrics.latency_ms
    );
}

/// Ctrl+C cancels the answer in progress, or exits when idle.
fn spawn_cancel_on_ctrl_c(handle: CancelHandle) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !handle.cancel() {
                println!();
                std::process::exit(130);
            }
        }
    });
}

async fn list_documents(client: &RagClient) {
    match client.list_documents(DOCUMENT_PAGE_SIZE, 0).await {
        Ok(list) if list.documents.is_empty() => println!("No documents ingested."),
        Ok(list) => {
            println!("{} document(s):", list.total);
            for doc in &list.documents {
                println!(
                    "  {}  {}",
                    doc.document_id,
                    doc.metadata.title.as_deref().unwrap_or(UNTITLED_SOURCE)
                );
            }
        }
        Err(e) => eprintln!("[error] {}", e.user_message()),
    }
}

async fn run_interactive(controller: &TurnController) -> Result<()> {
    let client = controller.client();
    println!("{} - {}", version_line(), client.config().base_url);
    match client.health_check().await {
        Ok(true) => {}
        Ok(false) => eprintln!("Warning: the backend reports it is unhealthy"),
        Err(e) => eprintln!("Warning: {} {}", e.user_message(), e.recovery_hint()),
    }
    println!("Type a question, or /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_repl_line(&line) {
            ReplCommand::Ask(query) => {
                if let TurnOutcome::Rejected(RejectReason::Busy) = controller.submit(&query).await
                {
                    eprintln!("Still answering the previous question.");
                }
            }
            ReplCommand::Feedback { rating, text } => {
                let helpful = rating == Rating::Positive;
                if controller.send_feedback(rating, helpful, text) {
                    println!("Thanks for the feedback.");
                } else {
                    println!("No answer to rate yet.");
                }
            }
            ReplCommand::Docs => list_documents(client).await,
            ReplCommand::Help => println!("{}", USAGE),
            ReplCommand::Quit => break,
            ReplCommand::Empty => {}
            ReplCommand::Unknown(command) => {
                eprintln!("Unknown command {} (try /help)", command)
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args(std::env::args())?;
    match args.command {
        CliCommand::Version => {
            println!("{}", version_line());
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        CliCommand::Query(_) | CliCommand::Interactive => {}
    }

    color_eyre::install()?;

    // Logs go to stderr so they never interleave with the streamed answer
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = args.url {
        config = config.with_base_url(url);
    }
    if let Some(token) = args.token {
        config = config.with_auth_token(Some(token));
    }
    config.validate()?;
    tracing::info!("Starting ragstream v{} against {}", env!("CARGO_PKG_VERSION"), config.base_url);

    let controller = TurnController::with_observer(RagClient::new(config), Arc::new(TerminalPrinter));
    spawn_cancel_on_ctrl_c(controller.cancel_handle());

    match args.command {
        CliCommand::Query(query) => match controller.submit(&query).await {
            TurnOutcome::Failed { error, .. } => Err(eyre!(error)),
            TurnOutcome::Rejected(reason) => Err(eyre!("query not submitted: {:?}", reason)),
            TurnOutcome::Completed { .. } => Ok(()),
        },
        _ => run_interactive(&controller).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_print_token_writes_delta() {
        let mut out = Vec::new();
        assert!(print_token(&mut out, "Hel"));
        assert!(print_token(&mut out, "lo"));
        assert_eq!(out, b"Hello");
    }

    #[test]
    fn test_print_token_survives_closed_stdout() {
        assert!(!print_token(&mut ClosedPipe, "lost"));
    }
}
