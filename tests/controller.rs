//! Controller integration tests: poller, dispatcher, and connectivity
//! monitor against a scripted local HTTP responder.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use dockman::controller::{Controller, Outcome};
use dockman::lifecycle::InstanceGuard;
use dockman::net::ApiClient;
use dockman::state::{ActionKind, ControlMsg, Severity, StatusSnapshot};

/// Wait for the process-wide instance guard; tests in this binary run in
/// parallel and each holds it only while its controller lives.
fn acquire_guard() -> InstanceGuard {
    loop {
        if let Some(guard) = InstanceGuard::acquire() {
            return guard;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Spin up a one-connection-per-response HTTP responder. Each `(status,
/// body)` pair answers exactly one request; request lines are recorded so
/// tests can assert exactly which calls were made.
async fn serve_script(responses: Vec<(u16, String)>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_bg = Arc::clone(&seen);
    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut sock, _)) = listener.accept().await else {
                return;
            };
            let mut req = Vec::new();
            let mut buf = [0u8; 1024];
            // Read until the header terminator; the panel sends no bodies.
            while !req.windows(4).any(|w| w == b"\r\n\r\n") {
                match sock.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => req.extend_from_slice(&buf[..n]),
                }
            }
            let text = String::from_utf8_lossy(&req);
            let line = text.lines().next().unwrap_or("").to_string();
            seen_bg.lock().unwrap().push(line);
            let reason = if status == 200 { "OK" } else { "ERR" };
            let resp = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = sock.write_all(resp.as_bytes()).await;
            let _ = sock.shutdown().await;
        }
    });
    (base, seen)
}

/// Controller wired to test-held message and outcome receivers.
fn new_controller(
    base: &str,
    interval_ms: u64,
    auto_refresh: bool,
) -> (
    Controller,
    UnboundedReceiver<ControlMsg>,
    UnboundedReceiver<Outcome>,
) {
    let (msg_tx, msg_rx) = mpsc::unbounded_channel();
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
    let controller = Controller::new(
        acquire_guard(),
        ApiClient::new(base),
        Duration::from_millis(interval_ms),
        auto_refresh,
        msg_tx,
        outcome_tx,
    );
    (controller, msg_rx, outcome_rx)
}

/// What: a successful refresh holds the busy phase for the in-flight fetch
/// and then applies the snapshot wholesale.
///
/// - Input: responder serving an installed snapshot
/// - Output: busy during flight; afterwards snapshot, stamp, and controls
///   re-derived (install disabled, update/uninstall enabled)
#[tokio::test]
async fn refresh_applies_snapshot_and_rederives_controls() {
    let (base, _seen) = serve_script(vec![(
        200,
        r#"{"installed": true, "version": "24.0.5", "os": "linux"}"#.to_string(),
    )])
    .await;
    let (mut controller, _msg_rx, mut outcome_rx) = new_controller(&base, 5000, false);

    controller.refresh();
    assert!(controller.state.busy(), "busy must hold while in flight");

    let outcome = outcome_rx.recv().await.expect("fetch outcome");
    controller.handle_outcome(outcome);

    assert!(!controller.state.busy());
    let snap = controller.state.snapshot.clone().expect("snapshot");
    assert!(snap.installed);
    assert_eq!(snap.version.as_deref(), Some("24.0.5"));
    assert_eq!(snap.os.as_deref(), Some("linux"));
    assert!(controller.state.last_updated.is_some());
    assert!(!controller.state.action_enabled(ActionKind::Install));
    assert!(controller.state.action_enabled(ActionKind::Update));
    assert!(controller.state.action_enabled(ActionKind::Uninstall));
}

/// What: a transport failure during `/api/check` flips the monitor offline,
/// warns, and suspends auto-refresh without clearing the preference.
///
/// - Input: API base pointing at a closed port, auto-refresh running
/// - Output: offline, warning alert, timer stopped, preference still on,
///   and a follow-up refresh is a no-op
#[tokio::test]
async fn transport_failure_goes_offline_and_suspends_auto_refresh() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let (mut controller, _msg_rx, mut outcome_rx) = new_controller(&base, 5000, true);
    controller.start_auto_refresh();
    assert!(controller.auto_refresh_running());

    controller.refresh();
    let outcome = outcome_rx.recv().await.expect("fetch outcome");
    controller.handle_outcome(outcome);

    assert!(!controller.state.online);
    let alert = controller.state.alert.clone().expect("warning alert");
    assert_eq!(alert.severity, Severity::Warning);
    assert_eq!(alert.message, "Lost connection to server");
    assert!(!controller.auto_refresh_running());
    assert!(
        controller.state.auto_refresh_enabled,
        "offline must not clear the preference"
    );

    // Refresh while offline is a no-op: no phase change, no request.
    controller.refresh();
    assert!(!controller.state.busy());
    tokio::task::yield_now().await;
    assert!(outcome_rx.try_recv().is_err(), "no fetch may be issued offline");
}

/// What: coming back online refreshes immediately and restarts the timer
/// because the preference is still enabled.
///
/// - Input: offline controller with the preference on, live responder
/// - Output: online again, snapshot applied, timer running
#[tokio::test]
async fn online_transition_refreshes_and_restarts_timer() {
    let (base, _seen) =
        serve_script(vec![(200, r#"{"installed": false}"#.to_string())]).await;
    let (mut controller, _msg_rx, mut outcome_rx) = new_controller(&base, 5000, true);

    controller.handle_msg(ControlMsg::Connectivity(false));
    assert!(!controller.state.online);
    assert!(!controller.auto_refresh_running());

    controller.handle_msg(ControlMsg::Connectivity(true));
    assert!(controller.state.online);
    assert!(controller.auto_refresh_running());
    assert!(controller.state.busy(), "online entry must refresh at once");

    let outcome = outcome_rx.recv().await.expect("fetch outcome");
    controller.handle_outcome(outcome);
    let snap = controller.state.snapshot.clone().expect("snapshot");
    assert!(!snap.installed);
    assert!(controller.state.action_enabled(ActionKind::Install));
}

/// What: a success-flagged-false action result raises a danger alert with
/// the server's message and is followed by exactly one status check.
///
/// - Input: install responding `{"success": false, "message": "disk full"}`,
///   then a check response
/// - Output: danger alert containing "disk full"; the responder saw exactly
///   one POST then one GET
#[tokio::test]
async fn failed_action_alerts_danger_and_refreshes_once() {
    let (base, seen) = serve_script(vec![
        (200, r#"{"success": false, "message": "disk full"}"#.to_string()),
        (200, r#"{"installed": false}"#.to_string()),
    ])
    .await;
    let (mut controller, _msg_rx, mut outcome_rx) = new_controller(&base, 5000, false);
    controller
        .state
        .apply_snapshot(StatusSnapshot::default(), "12:00:00".to_string());

    controller.request_action(ActionKind::Install);
    controller.confirm_action();
    assert!(controller.state.busy());

    let outcome = outcome_rx.recv().await.expect("action outcome");
    controller.handle_outcome(outcome);

    let alert = controller.state.alert.clone().expect("danger alert");
    assert_eq!(alert.severity, Severity::Danger);
    assert!(alert.message.contains("disk full"), "got: {}", alert.message);
    assert!(alert.message.starts_with("Installation failed"));

    // The post-action refresh is already in flight.
    let outcome = outcome_rx.recv().await.expect("refresh outcome");
    controller.handle_outcome(outcome);

    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].starts_with("POST /api/install"));
    assert!(requests[1].starts_with("GET /api/check"));
}

/// What: a non-2xx action response surfaces as a danger alert naming the
/// action, with no follow-up refresh.
///
/// - Input: update endpoint answering HTTP 500
/// - Output: danger alert starting with "Error during update"; only the one
///   POST was issued
#[tokio::test]
async fn http_error_action_alerts_danger_without_refresh() {
    let (base, seen) = serve_script(vec![(500, String::new())]).await;
    let (mut controller, _msg_rx, mut outcome_rx) = new_controller(&base, 5000, false);
    controller.state.apply_snapshot(
        StatusSnapshot {
            installed: true,
            ..Default::default()
        },
        "12:00:00".to_string(),
    );

    controller.request_action(ActionKind::Update);
    controller.confirm_action();
    let outcome = outcome_rx.recv().await.expect("action outcome");
    controller.handle_outcome(outcome);

    let alert = controller.state.alert.clone().expect("danger alert");
    assert_eq!(alert.severity, Severity::Danger);
    assert!(alert.message.starts_with("Error during update"), "got: {}", alert.message);
    assert!(!controller.state.busy());

    tokio::task::yield_now().await;
    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("POST /api/update"));
}

/// What: declining the confirmation abandons the action with no side
/// effects.
///
/// - Input: uninstall requested then declined
/// - Output: modal closed, busy false, zero HTTP calls
#[tokio::test]
async fn declined_confirmation_issues_no_calls() {
    let (base, seen) = serve_script(vec![(200, String::new())]).await;
    let (mut controller, _msg_rx, mut outcome_rx) = new_controller(&base, 5000, false);
    controller.state.apply_snapshot(
        StatusSnapshot {
            installed: true,
            ..Default::default()
        },
        "12:00:00".to_string(),
    );

    controller.request_action(ActionKind::Uninstall);
    assert!(matches!(
        controller.state.modal,
        dockman::state::Modal::Confirm {
            action: ActionKind::Uninstall
        }
    ));
    controller.decline_action();

    assert!(matches!(controller.state.modal, dockman::state::Modal::None));
    assert!(!controller.state.busy());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(outcome_rx.try_recv().is_err());
    assert!(seen.lock().unwrap().is_empty(), "no HTTP call may be issued");
}

/// What: starting the auto-refresh timer twice leaves exactly one timer.
///
/// - Input: two back-to-back starts with a 50 ms interval, then 500 ms of
///   wall time
/// - Output: roughly one tick per interval (never the doubled rate), and
///   stop is idempotent
#[tokio::test(flavor = "multi_thread")]
async fn double_start_keeps_single_timer() {
    let (mut controller, mut msg_rx, _outcome_rx) =
        new_controller("http://127.0.0.1:1", 50, false);

    controller.start_auto_refresh();
    controller.start_auto_refresh();
    assert!(controller.auto_refresh_running());

    tokio::time::sleep(Duration::from_millis(500)).await;
    controller.stop_auto_refresh();
    assert!(!controller.auto_refresh_running());
    controller.stop_auto_refresh(); // idempotent

    let mut ticks = 0;
    while msg_rx.try_recv().is_ok() {
        ticks += 1;
    }
    // One timer at 50 ms over 500 ms is ~10 ticks; two leaking timers would
    // be ~20. Wide bounds absorb scheduler jitter.
    assert!((5..=15).contains(&ticks), "tick count {ticks} suggests duplicate timers");

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(msg_rx.try_recv().is_err(), "stopped timer must not tick");
}
