mod clipboard;
mod config;
mod state;
mod theme;
mod ui;

use anyhow::Result;
use clipboard::{ClipboardError, ClipboardSink, SystemClipboard};
use config::Config;
use crossterm::{
    event::{Event as TermEvent, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use lazyhap_core::AdminClient;
use ratatui::{backend::CrosstermBackend, Terminal};
use state::{action_for_key, Effect, Event, UiSession};
use std::io::{self, IsTerminal};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const EVENT_QUEUE_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config();
    init_logging();
    info!(
        event = "lazyhap_start",
        socket = %config.socket_path.display()
    );

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, config).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Spawns background work for effects. Every task reports back through
/// `tx`; none of them touch the session.
struct Runtime {
    client: AdminClient,
    clipboard: Arc<dyn ClipboardSink>,
    tx: mpsc::Sender<Event>,
}

impl Runtime {
    fn spawn(&self, effect: Effect) {
        match effect {
            Effect::Fetch { panel, origin } => {
                let client = self.client.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = client.send(panel.panel().fetch_command).await;
                    let _ = tx
                        .send(Event::FetchCompleted {
                            panel,
                            origin,
                            result,
                        })
                        .await;
                });
            }
            Effect::ScheduleFetch { panel, after } => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(Event::TimerFired { panel }).await;
                });
            }
            Effect::Dispatch(command) => {
                let client = self.client.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = client.send(&command.to_string()).await;
                    let _ = tx.send(Event::CommandCompleted { command, result }).await;
                });
            }
            Effect::ExpireMessage { generation, after } => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(Event::MessageExpired { generation }).await;
                });
            }
            Effect::CopyToClipboard(text) => {
                let clipboard = Arc::clone(&self.clipboard);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = tokio::task::spawn_blocking(move || clipboard.copy(&text))
                        .await
                        .unwrap_or_else(|err| Err(ClipboardError::from(err)));
                    let _ = tx.send(Event::ClipboardCompleted { result }).await;
                });
            }
            Effect::Quit => {}
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let runtime = Runtime {
        client: AdminClient::new(&config.socket_path),
        clipboard: Arc::new(SystemClipboard),
        tx,
    };
    let mut app = UiSession::new(&config);
    let mut events = EventStream::new();

    let size = terminal.size()?;
    app.handle(Event::WindowResized {
        width: size.width,
        height: size.height,
    });
    let mut effects = app.start();

    loop {
        for effect in effects.drain(..) {
            runtime.spawn(effect);
        }
        if app.should_quit() {
            break;
        }

        terminal.draw(|frame| ui::render(frame, &app))?;

        let event = tokio::select! {
            Some(event) = rx.recv() => event,
            maybe_event = events.next() => match maybe_event {
                Some(Ok(input)) => match input_event(input) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(err)) => {
                    warn!(event = "terminal_input_error", error = %err);
                    return Err(err.into());
                }
                None => break,
            },
        };
        effects = app.handle(event);
    }

    Ok(())
}

fn input_event(event: TermEvent) -> Option<Event> {
    match event {
        TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
            action_for_key(key).map(|action| Event::KeyPressed { action })
        }
        TermEvent::Resize(width, height) => Some(Event::WindowResized { width, height }),
        _ => None,
    }
}

/// The TUI owns stdout, so logs only go to stderr when it has been
/// redirected away from the terminal.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if io::stderr().is_terminal() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(io::stderr)
            .try_init();
    }
}
