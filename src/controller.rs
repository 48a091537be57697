//! The controller: status poller, action dispatcher, connectivity monitor,
//! and alert scheduling.
//!
//! All work runs on the runtime's cooperative scheduler; the only mutual
//! exclusion between the poller and the dispatcher is the shared
//! [`Phase`](crate::state::Phase) machine in [`ControllerState`]. In-flight
//! requests run in spawned tasks and report back through the outcome
//! channel, so the phase is held for the full lifetime of a request and
//! cleared exactly once when its outcome is consumed, on failure paths as
//! much as on success.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::lifecycle::{BindingKey, BindingSet, InstanceGuard, Subscription};
use crate::net::{ApiClient, ApiError};
use crate::state::{
    ActionKind, ActionResult, ControlMsg, ControllerState, Modal, Severity, StatusSnapshot,
    ALERT_TTL,
};

/// Completion of background work, consumed by the runtime loop.
#[derive(Debug)]
pub enum Outcome {
    /// A status fetch finished.
    Status(Result<StatusSnapshot, ApiError>),
    /// A mutating action finished.
    Action(ActionKind, Result<ActionResult, ApiError>),
    /// A scheduled alert dismissal fired; no-op when the alert was replaced.
    AlertExpired(u64),
}

/// The single live controller instance.
pub struct Controller {
    /// Controller-owned state record; read by the renderer.
    pub state: ControllerState,
    /// Tracked event subscriptions.
    pub bindings: BindingSet,
    api: ApiClient,
    interval: Duration,
    msg_tx: UnboundedSender<ControlMsg>,
    outcome_tx: UnboundedSender<Outcome>,
    auto_refresh: Option<JoinHandle<()>>,
    _guard: InstanceGuard,
}

impl Controller {
    /// Build the controller. Requires the process-wide [`InstanceGuard`],
    /// which is the only way to construct one.
    pub fn new(
        guard: InstanceGuard,
        api: ApiClient,
        interval: Duration,
        auto_refresh_enabled: bool,
        msg_tx: UnboundedSender<ControlMsg>,
        outcome_tx: UnboundedSender<Outcome>,
    ) -> Self {
        Self {
            state: ControllerState::new(auto_refresh_enabled),
            bindings: BindingSet::default(),
            api,
            interval,
            msg_tx,
            outcome_tx,
            auto_refresh: None,
            _guard: guard,
        }
    }

    /// Attach the five control keys and, on Unix, the two network-presence
    /// signal listeners (SIGUSR1 = online, SIGUSR2 = offline). A second call
    /// without an intervening [`Self::unbind_events`] warns and attaches
    /// nothing.
    pub fn bind_events(&mut self) {
        let mut subs = vec![
            (
                BindingKey::Install,
                key_route('i', ControlMsg::Action(ActionKind::Install)),
            ),
            (
                BindingKey::Update,
                key_route('u', ControlMsg::Action(ActionKind::Update)),
            ),
            (
                BindingKey::Uninstall,
                key_route('x', ControlMsg::Action(ActionKind::Uninstall)),
            ),
            (BindingKey::Refresh, key_route('r', ControlMsg::Refresh)),
            (
                BindingKey::AutoRefresh,
                key_route('a', ControlMsg::ToggleAutoRefresh),
            ),
        ];
        #[cfg(unix)]
        {
            use tokio::signal::unix::SignalKind;
            subs.push((
                BindingKey::NetOnline,
                Subscription::Task(spawn_presence_listener(
                    SignalKind::user_defined1(),
                    true,
                    self.msg_tx.clone(),
                )),
            ));
            subs.push((
                BindingKey::NetOffline,
                Subscription::Task(spawn_presence_listener(
                    SignalKind::user_defined2(),
                    false,
                    self.msg_tx.clone(),
                )),
            ));
        }
        self.bindings.bind(subs);
    }

    /// Detach every tracked subscription. Idempotent.
    pub fn unbind_events(&mut self) {
        self.bindings.unbind();
    }

    /// Apply a message from a bound control or network subscription.
    pub fn handle_msg(&mut self, msg: ControlMsg) {
        match msg {
            ControlMsg::Refresh => self.refresh(),
            ControlMsg::Action(action) => self.request_action(action),
            ControlMsg::ToggleAutoRefresh => self.toggle_auto_refresh(),
            ControlMsg::Connectivity(online) => self.set_connectivity(online),
        }
    }

    /// Consume the outcome of finished background work.
    pub fn handle_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Status(res) => self.on_status(res),
            Outcome::Action(action, res) => self.on_action(action, res),
            Outcome::AlertExpired(seq) => self.state.dismiss_alert(seq),
        }
    }

    /// Kick off one status fetch. No-op while offline or while any request
    /// is already in flight.
    pub fn refresh(&mut self) {
        if !self.state.online {
            return;
        }
        if !self.state.begin_polling() {
            tracing::debug!(phase = ?self.state.phase, "refresh rejected while busy");
            return;
        }
        let api = self.api.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let res = api.fetch_status().await;
            let _ = tx.send(Outcome::Status(res));
        });
    }

    fn on_status(&mut self, res: Result<StatusSnapshot, ApiError>) {
        self.state.finish();
        match res {
            Ok(snapshot) => {
                tracing::debug!(installed = snapshot.installed, "status updated");
                self.state.apply_snapshot(snapshot, crate::util::now_clock());
            }
            Err(err) if err.is_connectivity() => {
                // Connectivity failures bypass the generic error alert and
                // flip the monitor offline instead.
                self.set_connectivity(false);
            }
            Err(err) => {
                tracing::warn!(error = %err, "status fetch failed");
                self.show_alert(format!("Error fetching Docker status: {err}"), Severity::Danger);
            }
        }
    }

    /// Open the confirmation modal for `action`, if its control is enabled.
    pub fn request_action(&mut self, action: ActionKind) {
        if !self.state.action_enabled(action) {
            return;
        }
        self.state.modal = Modal::Confirm { action };
    }

    /// Confirm the pending modal action, dispatching it.
    pub fn confirm_action(&mut self) {
        if let Modal::Confirm { action } = self.state.modal {
            self.state.modal = Modal::None;
            self.dispatch(action);
        }
    }

    /// Decline the pending modal action. Not an error: the operation is
    /// abandoned silently, with no side effects.
    pub fn decline_action(&mut self) {
        self.state.modal = Modal::None;
    }

    fn dispatch(&mut self, action: ActionKind) {
        if !self.state.online {
            return;
        }
        if !self.state.begin_action() {
            tracing::debug!(?action, phase = ?self.state.phase, "action rejected while busy");
            return;
        }
        tracing::info!(?action, "dispatching action");
        let api = self.api.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let res = api.post_action(action).await;
            let _ = tx.send(Outcome::Action(action, res));
        });
    }

    fn on_action(&mut self, action: ActionKind, res: Result<ActionResult, ApiError>) {
        self.state.finish();
        match res {
            Ok(result) => {
                let verdict = if result.success { "succeeded" } else { "failed" };
                let severity = if result.success {
                    Severity::Success
                } else {
                    Severity::Danger
                };
                self.show_alert(
                    format!("{} {verdict}: {}", action.label(), result.message),
                    severity,
                );
                // Displayed state must match ground truth post-action.
                self.refresh();
            }
            Err(err) => {
                tracing::warn!(?action, error = %err, "action failed");
                self.show_alert(
                    format!("Error during {}: {err}", action.label().to_lowercase()),
                    Severity::Danger,
                );
            }
        }
    }

    /// React to a host-delivered (or fetch-inferred) connectivity change.
    ///
    /// Entering offline surfaces a warning and suspends the timer without
    /// clearing the preference; entering online refreshes once and restarts
    /// the timer iff the preference is enabled.
    pub fn set_connectivity(&mut self, online: bool) {
        if self.state.online == online {
            return;
        }
        self.state.online = online;
        if online {
            tracing::info!("connectivity restored");
            self.refresh();
            if self.state.auto_refresh_enabled {
                self.start_auto_refresh();
            }
        } else {
            tracing::warn!("connectivity lost");
            self.show_alert("Lost connection to server".to_string(), Severity::Warning);
            self.stop_auto_refresh();
        }
    }

    /// Flip the auto-refresh preference and start or stop the timer to
    /// match. The timer only actually runs while online.
    pub fn toggle_auto_refresh(&mut self) {
        self.state.auto_refresh_enabled = !self.state.auto_refresh_enabled;
        if self.state.auto_refresh_enabled {
            if self.state.online {
                self.start_auto_refresh();
            }
        } else {
            self.stop_auto_refresh();
        }
    }

    /// Start the repeating refresh timer, always cancelling any prior one
    /// first so no two timers ever run concurrently.
    pub fn start_auto_refresh(&mut self) {
        self.stop_auto_refresh();
        let tx = self.msg_tx.clone();
        let every = self.interval;
        self.auto_refresh = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first interval tick fires immediately; the schedule should
            // start one full period out, like the original setInterval.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.send(ControlMsg::Refresh).is_err() {
                    break;
                }
            }
        }));
    }

    /// Cancel the refresh timer and clear its handle. Idempotent.
    pub fn stop_auto_refresh(&mut self) {
        if let Some(handle) = self.auto_refresh.take() {
            handle.abort();
        }
    }

    /// Whether a refresh timer task is currently held.
    pub fn auto_refresh_running(&self) -> bool {
        self.auto_refresh
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn show_alert(&mut self, message: String, severity: Severity) {
        let seq = self.state.show_alert(message, severity);
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ALERT_TTL).await;
            let _ = tx.send(Outcome::AlertExpired(seq));
        });
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        // The timer and every subscription die with the controller.
        self.stop_auto_refresh();
        self.bindings.unbind();
    }
}

fn key_route(code: char, msg: ControlMsg) -> Subscription {
    Subscription::Key {
        code: crossterm::event::KeyCode::Char(code),
        msg,
    }
}

#[cfg(unix)]
fn spawn_presence_listener(
    kind: tokio::signal::unix::SignalKind,
    online: bool,
    tx: UnboundedSender<ControlMsg>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = match tokio::signal::unix::signal(kind) {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(error = %err, "cannot listen for presence signal");
                return;
            }
        };
        while stream.recv().await.is_some() {
            if tx.send(ControlMsg::Connectivity(online)).is_err() {
                break;
            }
        }
    })
}
