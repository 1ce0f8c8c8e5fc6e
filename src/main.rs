//! `itinera` - follow an itinerary server as it plans your trip
//!
//! Collects a destination and date, opens a planning session, streams the
//! server's progress, asks for a choice when the server needs one, and
//! prints (and optionally saves or copies) the finished itinerary.

use anyhow::{bail, Context, Result};
use clap::Parser;
use console::Style;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cli::{Cli, Commands, ConfigCommand, PlanArgs};
use itinera_core::classifier::ClassifierMode;
use itinera_core::config::{find_config_file, Config};
use itinera_core::logger;
use itinera_core::output::OutputFormatter;
use itinera_core::session::{SessionController, SessionEvent, SessionState};
use itinera_core::transport::WebSocketConnector;

mod cli;
mod clipboard;

const RECENT_LOG_LINES: usize = 10;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        let blue = Style::new().blue();
        println!(
            "{} v{} ({})",
            blue.apply_to("itinera"),
            env!("CARGO_PKG_VERSION"),
            env!("GIT_HASH")
        );
        return Ok(());
    }

    let source = find_config_file();
    let config = match &source {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        config.logging.level_filter()?
    };
    if let Err(e) = logger::init(level, config.logging.resolved_file()) {
        eprintln!("Logging disabled: {}", e);
    }
    log::debug!("itinera {} starting", env!("CARGO_PKG_VERSION"));

    let formatter = OutputFormatter::new();

    match cli.command {
        Some(Commands::Plan(args)) => handle_plan(args, &config, cli.verbose, &formatter).await,
        Some(Commands::Config { cmd }) => handle_config(cmd, &config, source, &formatter),
        None => handle_plan(PlanArgs::default(), &config, cli.verbose, &formatter).await,
    }
}

/// Run one planning session to completion
async fn handle_plan(
    args: PlanArgs,
    config: &Config,
    verbose: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let mut config = config.clone();
    if let Some(url) = args.server {
        config.server.url = url;
        config.validate()?;
    }

    let destination = match args.destination {
        Some(destination) => destination,
        None => inquire::Text::new("Destination:").prompt()?,
    };
    let date = match args.date {
        Some(date) => date,
        None => inquire::Text::new("Travel date:")
            .with_placeholder("YYYY-MM-DD")
            .prompt()?,
    };
    let output_format = args.format.unwrap_or(config.session.output_format);
    let classifier = if args.envelope {
        ClassifierMode::Envelope
    } else {
        config.session.classifier
    };

    let connector = Arc::new(WebSocketConnector::new(config.server.url.clone()));
    let mut controller = SessionController::new(connector, classifier.build());
    let mut events = controller.subscribe();

    if let Err(e) = controller.start(&destination, &date, output_format).await {
        render_pending(&mut events, formatter);
        log::error!("Session start failed: {}", e);
        let message = e.user_message();
        return Err(anyhow::Error::new(e).context(message));
    }

    loop {
        let state = controller.run_until_input().await;
        render_pending(&mut events, formatter);
        match state {
            SessionState::AwaitingSelection => {
                let answer = inquire::Text::new("Your choice:")
                    .with_help_message("Enter the option number, or 0 if none of them match")
                    .prompt()?;
                controller.submit_selection(&answer);
                render_pending(&mut events, formatter);
            }
            SessionState::Completed => break,
            SessionState::Idle | SessionState::Planning | SessionState::Closed => {
                if verbose {
                    formatter.print_recent_logs(&logger::get_recent_logs(RECENT_LOG_LINES));
                }
                bail!("Session ended before the itinerary was ready");
            }
        }
    }

    let content = controller
        .final_content()
        .context("Session completed without an itinerary")?
        .to_string();
    export(&content, args.output, args.copy, formatter)?;
    Ok(())
}

/// Render every event queued so far, in order
fn render_pending(events: &mut mpsc::UnboundedReceiver<SessionEvent>, formatter: &OutputFormatter) {
    while let Ok(event) = events.try_recv() {
        match &event {
            SessionEvent::Completed(content) => formatter.print_itinerary(content),
            _ => formatter.print_event(&event),
        }
    }
}

fn export(content: &str, output: Option<PathBuf>, copy: bool, formatter: &OutputFormatter) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write itinerary to {}", path.display()))?;
        formatter.print_status(&format!("Saved itinerary source to {}", path.display()));
    }
    if copy {
        formatter.print_status(&clipboard::copy_text_to_clipboard(content));
    }
    Ok(())
}

fn handle_config(
    cmd: Option<ConfigCommand>,
    config: &Config,
    source: Option<PathBuf>,
    formatter: &OutputFormatter,
) -> Result<()> {
    match cmd {
        Some(ConfigCommand::Show) | None => {
            formatter.print_config(config, source.as_deref());
        }
        Some(ConfigCommand::Path) => {
            match source.or_else(Config::default_path) {
                Some(path) => println!("{}", path.display()),
                None => bail!("Could not determine a configuration directory"),
            }
        }
        Some(ConfigCommand::Init { force }) => {
            let path = Config::default_path().context("Could not determine a configuration directory")?;
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            let path = Config::default().save_default()?;
            formatter.print_status(&format!("Wrote default configuration to {}", path.display()));
        }
    }
    Ok(())
}
