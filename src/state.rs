//! Core state types for the dockman control panel.
//!
//! This module defines the wire types exchanged with the HTTP control API
//! ([`StatusSnapshot`], [`ActionResult`]), the mutating operations
//! ([`ActionKind`]), and the central [`ControllerState`] mutated exclusively
//! by the controller layer: the Idle/Polling/Acting phase machine that backs
//! the shared busy flag, the connectivity flag, the auto-refresh preference,
//! and the single-slot alert surface.

use std::time::Duration;

/// Fixed lifetime of a displayed alert before its scheduled dismissal.
pub const ALERT_TTL: Duration = Duration::from_secs(5);

/// Default auto-refresh poll interval in milliseconds.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 5000;

/// Status snapshot returned by `GET /api/check`.
///
/// Immutable once received; a new snapshot replaces the previous one
/// wholesale, it is never merged field by field.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StatusSnapshot {
    /// Whether the Docker Engine package is present on the host.
    pub installed: bool,
    /// Version string as reported by `docker --version`, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Host operating system identifier (lowercase, e.g. "linux").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    /// Set when the server reports it is missing the privileges needed to
    /// perform mutating actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_privileges: Option<bool>,
}

/// Result body returned by the three mutating endpoints.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ActionResult {
    /// Whether the server-side operation succeeded.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
}

/// One of the three mutating operations exposed by the control API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Install the Docker Engine package.
    Install,
    /// Update an existing installation.
    Update,
    /// Remove the installation from the host.
    Uninstall,
}

impl ActionKind {
    /// API path for this action.
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Install => "/api/install",
            Self::Update => "/api/update",
            Self::Uninstall => "/api/uninstall",
        }
    }

    /// Human-readable label used in alerts ("Installation succeeded: ...").
    pub const fn label(self) -> &'static str {
        match self {
            Self::Install => "Installation",
            Self::Update => "Update",
            Self::Uninstall => "Uninstallation",
        }
    }

    /// Confirmation prompt shown before dispatching. The uninstall prompt is
    /// deliberately phrased as a stronger warning.
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::Install => "Are you sure you want to install Docker?",
            Self::Update => "Are you sure you want to update Docker?",
            Self::Uninstall => "WARNING: This will uninstall Docker. Are you sure?",
        }
    }
}

/// Severity class of a displayed alert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Positive outcome (action succeeded).
    Success,
    /// Degraded but recoverable condition (connectivity lost).
    Warning,
    /// Application error or failed action.
    Danger,
}

/// A single alert occupying the one-slot alert surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    /// Message text shown to the user.
    pub message: String,
    /// Severity class controlling the toast color.
    pub severity: Severity,
    /// Monotonic sequence number; scheduled dismissals carry it so a stale
    /// dismissal firing after a replacement is a harmless no-op.
    pub seq: u64,
}

/// Mutual-exclusion phase shared by the poller and the dispatcher.
///
/// Any non-`Idle` phase is "busy": all four mutating controls are disabled
/// and further transitions are rejected until [`ControllerState::finish`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// No request in flight.
    #[default]
    Idle,
    /// A status fetch is in flight.
    Polling,
    /// A mutating action is in flight.
    Acting,
}

/// Modal dialog state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Modal {
    /// No modal is shown.
    #[default]
    None,
    /// Confirmation dialog for a pending action.
    Confirm {
        /// The action awaiting explicit user confirmation.
        action: ActionKind,
    },
}

/// Message emitted by a bound control or network subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlMsg {
    /// Manual or scheduled status refresh.
    Refresh,
    /// User requested a mutating action (confirmation still pending).
    Action(ActionKind),
    /// User toggled the auto-refresh preference.
    ToggleAutoRefresh,
    /// Host-delivered network-presence transition.
    Connectivity(bool),
}

/// The single controller-owned state record for the process lifetime.
///
/// Exactly one instance exists (enforced by `lifecycle::InstanceGuard`); it
/// is mutated only through its own methods and the controller's.
#[derive(Clone, Debug)]
pub struct ControllerState {
    /// Current connectivity as last signalled or inferred from a fetch.
    pub online: bool,
    /// Shared busy phase gating the poller and the dispatcher.
    pub phase: Phase,
    /// User preference for the recurring poll. Survives offline periods;
    /// not persisted across runs.
    pub auto_refresh_enabled: bool,
    /// Most recent snapshot, replaced wholesale on every successful fetch.
    pub snapshot: Option<StatusSnapshot>,
    /// "HH:MM:SS" stamp of the last successful fetch.
    pub last_updated: Option<String>,
    /// Single-slot alert surface; a new alert replaces the old one.
    pub alert: Option<Alert>,
    /// Active modal dialog, if any.
    pub modal: Modal,
    alert_seq: u64,
}

impl ControllerState {
    /// Fresh state: online until told otherwise, no snapshot, no alert.
    pub fn new(auto_refresh_enabled: bool) -> Self {
        Self {
            online: true,
            phase: Phase::Idle,
            auto_refresh_enabled,
            snapshot: None,
            last_updated: None,
            alert: None,
            modal: Modal::None,
            alert_seq: 0,
        }
    }

    /// Whether any request is in flight.
    pub fn busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Try to enter `Polling`. Rejected (returns `false`) unless `Idle`.
    pub fn begin_polling(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.phase = Phase::Polling;
        true
    }

    /// Try to enter `Acting`. Rejected (returns `false`) unless `Idle`.
    pub fn begin_action(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.phase = Phase::Acting;
        true
    }

    /// Return to `Idle`. Every path that enters `Polling` or `Acting` must
    /// reach this, including failure paths.
    pub fn finish(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Replace the displayed snapshot wholesale and stamp the fetch time.
    pub fn apply_snapshot(&mut self, snapshot: StatusSnapshot, stamp: String) {
        self.snapshot = Some(snapshot);
        self.last_updated = Some(stamp);
    }

    /// Whether the manual refresh control is enabled.
    pub fn refresh_enabled(&self) -> bool {
        !self.busy()
    }

    /// Whether the given mutating action's control is enabled.
    ///
    /// Install is offered only when the snapshot says not installed; update
    /// and uninstall only when installed. With no snapshot yet, all three
    /// are disabled.
    pub fn action_enabled(&self, action: ActionKind) -> bool {
        if self.busy() {
            return false;
        }
        match (&self.snapshot, action) {
            (Some(s), ActionKind::Install) => !s.installed,
            (Some(s), ActionKind::Update | ActionKind::Uninstall) => s.installed,
            (None, _) => false,
        }
    }

    /// Put a new alert in the slot, replacing any current one, and return
    /// the sequence number its scheduled dismissal must carry.
    pub fn show_alert(&mut self, message: String, severity: Severity) -> u64 {
        self.alert_seq += 1;
        let seq = self.alert_seq;
        self.alert = Some(Alert {
            message,
            severity,
            seq,
        });
        seq
    }

    /// Clear the alert slot iff it still holds the alert `seq` refers to.
    /// A stale dismissal (the alert was already replaced) is a no-op.
    pub fn dismiss_alert(&mut self, seq: u64) {
        if self.alert.as_ref().is_some_and(|a| a.seq == seq) {
            self.alert = None;
        }
    }
}
