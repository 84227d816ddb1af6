//! tasklens - Summarize personal time-tracking spreadsheets

use clap::Parser;
use std::io;
use std::sync::Arc;
use tasklens::{
    cli::{Cli, Command},
    interactive::run_interactive,
    output::get_formatter,
    watch::FileWatcher,
};
use tasklens_core::{Result, Session, sample::sample_dataset};
use tasklens_ingest::SpreadsheetNormalizer;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "tasklens=info,tasklens_core=info,tasklens_ingest=info";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise quiet unless --verbose. Logs stay on stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { VERBOSE_FILTER } else { "warn" })
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let command = cli.command.clone().unwrap_or(Command::Show);

    // Watch mode uploads the file on its first refresh
    let events = match command {
        Command::Watch(_) => cli.view_events()?,
        _ => cli.startup_events()?,
    };
    let mut session = Session::new(Arc::new(sample_dataset()), SpreadsheetNormalizer::new());
    for event in events {
        session.apply(event);
    }

    let formatter = get_formatter(cli.json);

    match command {
        Command::Show => {
            println!("{}", formatter.format_views(session.views()));
        }

        Command::Interactive => {
            info!("Starting interactive session");
            let prompt = is_terminal::is_terminal(io::stdin()) && !cli.json;
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            run_interactive(
                &mut session,
                formatter.as_ref(),
                stdin.lock(),
                &mut stdout,
                prompt,
            )?;
        }

        Command::Watch(args) => {
            let path = cli.watch_target()?.to_path_buf();
            info!("Starting watch mode for {}", path.display());
            FileWatcher::new(session, path, formatter, cli.json, args.interval)
                .with_category(cli.category.clone())
                .run()
                .await?;
        }
    }

    Ok(())
}
