use clap::{CommandFactory, Parser};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tracing_subscriber::EnvFilter;

use command_console::cli::{Args, Mode};
use command_console::runner;
use command_console::transport::{select_transport, RestTransport};
use command_console::{ConsoleConfig, ConsoleSession, PanelSession, TerminalView};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    // Diagnostics go to stderr; stdout belongs to the console view.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ConsoleConfig::resolve(&args)?;
    if !config.color {
        colored::control::set_override(false);
    }

    let view = TerminalView::new(std::io::stdout(), config.color);
    let lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());

    match args.mode {
        Mode::Console => {
            let (transport, events) = select_transport(&config).await;
            let mut session = ConsoleSession::new(view, transport, config.max_lines);
            runner::run(&mut session, lines, events).await;
        }
        Mode::Panel => {
            let transport = Box::new(RestTransport::from_config(&config));
            let mut session = PanelSession::new(view, transport, config.max_lines);
            runner::run(&mut session, lines, None).await;
        }
    }

    Ok(())
}
