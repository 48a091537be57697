//! Input handling: raw terminal events to controller messages.
//!
//! Modal-first: while a confirmation dialog is open only its confirm and
//! decline keys are live. Otherwise keys are resolved through the
//! controller's [`BindingSet`](crate::lifecycle::BindingSet) routes, so an
//! unbound control key is simply ignored.

use crossterm::event::{Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::controller::Controller;
use crate::state::Modal;

/// Dispatch a single input event against the controller.
///
/// Returns `true` when the application should exit.
pub fn handle_event(ev: CEvent, controller: &mut Controller) -> bool {
    let CEvent::Key(key) = ev else {
        return false;
    };
    if key.kind != KeyEventKind::Press {
        return false;
    }
    if matches!(controller.state.modal, Modal::Confirm { .. }) {
        handle_confirm_key(key, controller);
        return false;
    }
    if is_quit(key) {
        return true;
    }
    if let Some(msg) = controller.bindings.route(key.code) {
        controller.handle_msg(msg);
    }
    false
}

fn handle_confirm_key(key: KeyEvent, controller: &mut Controller) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => controller.confirm_action(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => controller.decline_action(),
        _ => {}
    }
}

fn is_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
