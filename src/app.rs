//! Application runtime: terminal lifecycle, input thread, and the main
//! `select!` loop driving the controller.

use std::time::Duration;

use crossterm::{
    event::{self, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::{select, sync::mpsc};

use crate::config::Settings;
use crate::controller::{Controller, Outcome};
use crate::lifecycle::InstanceGuard;
use crate::net::ApiClient;
use crate::state::ControlMsg;
use crate::ui::ui;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Whether terminal setup/restore should be bypassed (headless test runs).
fn headless() -> bool {
    std::env::var("DOCKMAN_TEST_HEADLESS").map(|v| v == "1").unwrap_or(false)
}

fn setup_terminal() -> Result<()> {
    if headless() {
        return Ok(());
    }
    enable_raw_mode()?;
    execute!(std::io::stdout(), EnterAlternateScreen)?;
    Ok(())
}

fn restore_terminal() -> Result<()> {
    if headless() {
        return Ok(());
    }
    disable_raw_mode()?;
    execute!(std::io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Start the control panel and run the main event loop until quit.
///
/// - Acquires the single-instance guard (errors out if one is already live)
/// - Builds the controller, binds events, performs the initial refresh, and
///   starts the auto-refresh timer when the preference says so
/// - Renders via `ratatui` each iteration, delegating input to `events`
pub async fn run(settings: Settings) -> Result<()> {
    let Some(guard) = InstanceGuard::acquire() else {
        return Err("another dockman controller is already live in this process".into());
    };

    setup_terminal()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;

    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<ControlMsg>();
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<Outcome>();

    let api = ApiClient::new(&settings.server_url);
    let mut controller = Controller::new(
        guard,
        api,
        Duration::from_millis(settings.refresh_interval_ms),
        settings.auto_refresh_default,
        msg_tx.clone(),
        outcome_tx.clone(),
    );

    controller.bind_events();
    controller.refresh();
    if controller.state.auto_refresh_enabled {
        controller.start_auto_refresh();
    }

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<CEvent>();
    std::thread::spawn(move || {
        loop {
            match event::poll(Duration::from_millis(50)) {
                Ok(true) => {
                    if let Ok(ev) = event::read()
                        && event_tx.send(ev).is_err()
                    {
                        break;
                    }
                }
                Ok(false) => {}
                // No terminal attached (headless tests): back off instead
                // of spinning.
                Err(_) => std::thread::sleep(Duration::from_millis(50)),
            }
        }
    });

    loop {
        let _ = terminal.draw(|f| ui(f, &controller.state));

        select! {
            Some(ev) = event_rx.recv() => {
                if crate::events::handle_event(ev, &mut controller) {
                    break;
                }
            }
            Some(msg) = msg_rx.recv() => controller.handle_msg(msg),
            Some(outcome) = outcome_rx.recv() => controller.handle_outcome(outcome),
            else => break,
        }
    }

    controller.stop_auto_refresh();
    controller.unbind_events();

    restore_terminal()?;
    Ok(())
}
