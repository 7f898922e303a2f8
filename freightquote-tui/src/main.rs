//! Terminal UI for freightquote that compares freight quotes across Indian carriers.

mod app;
mod carriers;
mod input;
mod ui;

use std::{
    fs::File,
    io,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use freightquote_core::{
    CarrierId, CarrierRegistry, QuoteService, Settings, registry::LocationRegistry,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::input::Action;

#[derive(Debug, Parser)]
#[command(version, about = "Compare freight quotes across carriers")]
struct Args {
    /// Location snapshot CSV (`code,city,state` plus per-carrier columns).
    #[arg(short, long)]
    locations: Option<PathBuf>,

    /// Non-ODA allowlist for a carrier, as `<carrier>=<path>`. Repeatable.
    #[arg(long = "non-oda", value_parser = parse_allowlist)]
    non_oda: Vec<(CarrierId, PathBuf)>,

    /// File receiving log output.
    #[arg(long, default_value = "freightquote.log")]
    log_file: PathBuf,
}

fn parse_allowlist(raw: &str) -> Result<(CarrierId, PathBuf), String> {
    let (slug, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <carrier>=<path>, got {raw:?}"))?;
    let carrier = CarrierId::from_slug(slug.trim())
        .ok_or_else(|| format!("unknown carrier {:?}", slug.trim()))?;
    Ok((carrier, PathBuf::from(path.trim())))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::from_env()?;

    // Logging goes to a file; stdout belongs to the terminal UI
    let log_file = File::create(&args.log_file)
        .with_context(|| format!("cannot create log file {}", args.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_err| EnvFilter::new(&settings.log_level)),
        )
        .try_init()
        .map_err(|err| anyhow!("cannot install tracing subscriber: {err}"))?;

    // Locations + service setup
    let mut locations = match &args.locations {
        Some(path) => LocationRegistry::from_csv_path(path)?,
        None => {
            warn!("no location snapshot given, every code resolves to fallback zones");
            LocationRegistry::default()
        }
    };
    for (carrier, path) in &args.non_oda {
        locations.apply_non_oda_allowlist_path(*carrier, path)?;
    }

    let registry = Arc::new(CarrierRegistry::new(carriers::plugins(&settings)?));
    let service = Arc::new(QuoteService::new(registry, Arc::new(locations)));
    info!(carriers = service.carriers().len(), "quote service ready");

    // App state
    let app = App::new(service);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::Quote => {
                    let request = match app.form.build_request() {
                        Ok(request) => request,
                        Err(message) => {
                            app.error_message = Some(message);
                            continue;
                        }
                    };

                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let service = Arc::clone(&app.service);
                    let res =
                        tokio::task::spawn_blocking(move || service.quote_all(&request)).await;

                    app.is_loading = false;
                    match res {
                        Ok(results) => {
                            let deliverable =
                                results.iter().filter(|quote| quote.deliverable).count();
                            info!(quotes = results.len(), deliverable, "quoted request");
                            app.show_results(results);
                        }
                        Err(err) => {
                            app.error_message = Some(format!("Quoting failed: {err}"));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_allowlist_flags() {
        let (carrier, path) = parse_allowlist("bigship = lists/bigship.txt").expect("valid flag");
        assert_eq!(carrier, CarrierId::Bigship);
        assert_eq!(path, PathBuf::from("lists/bigship.txt"));

        assert!(parse_allowlist("bigship").is_err());
        assert!(parse_allowlist("dhl=list.txt").is_err());
    }
}
