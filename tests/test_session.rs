//! Unit tests for the job session state machine.

use std::time::Duration;

use price_monitor_sdk::models::JobId;
use price_monitor_sdk::monitor::{Closure, Effect, JobSession, Phase};
use price_monitor_sdk::ToastLevel;

const DELAY: Duration = Duration::from_millis(1500);

fn streaming(id: &str) -> JobSession {
    let mut s = JobSession::new(JobId::from(id), DELAY);
    s.connect();
    s.opened();
    s
}

fn count(effects: &[Effect], pred: impl Fn(&Effect) -> bool) -> usize {
    effects.iter().filter(|e| pred(e)).count()
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn connect_then_open_logs_both_steps() {
    let mut s = JobSession::new(JobId::from("5"), DELAY);
    assert_eq!(s.phase(), &Phase::Idle);
    assert_eq!(s.connect(), vec![Effect::Log("Connecting to job 5...".into())]);
    assert_eq!(s.phase(), &Phase::Connecting);
    assert_eq!(s.opened(), vec![Effect::Log("✓ Connected".into())]);
    assert_eq!(s.phase(), &Phase::Streaming);
}

#[test]
fn connect_is_only_honoured_once() {
    let mut s = streaming("5");
    assert!(s.connect().is_empty());
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[test]
fn progress_is_clamped() {
    let mut s = streaming("1");
    assert_eq!(
        s.receive(r#"{"type":"progress","percent":-10}"#),
        vec![Effect::Progress(0.0)]
    );
    assert_eq!(
        s.receive(r#"{"type":"progress","percent":150}"#),
        vec![Effect::Progress(100.0)]
    );
    assert_eq!(s.percent(), Some(100.0));
}

#[test]
fn progress_logs_line_and_step() {
    let mut s = streaming("1");
    let effects = s.receive(r#"{"type":"progress","log":"page 2","job":{"current_step":"parse"}}"#);
    assert_eq!(
        effects,
        vec![Effect::Log("page 2".into()), Effect::Log("⚙️ parse".into())]
    );
    assert_eq!(s.percent(), None);
}

#[test]
fn malformed_frame_is_dropped_without_effects() {
    let mut s = streaming("1");
    assert!(s.receive("<<garbage>>").is_empty());
    assert_eq!(s.phase(), &Phase::Streaming);
}

// ---------------------------------------------------------------------------
// Terminal outcomes
// ---------------------------------------------------------------------------

#[test]
fn typed_done_closes_once_and_schedules_one_refresh() {
    let mut s = streaming("9");
    let effects = s.receive(r#"{"type":"done"}"#);
    assert_eq!(
        effects,
        vec![
            Effect::Log("✅ Job completed successfully".into()),
            Effect::Toast(ToastLevel::Success, "Job 9 completed".into()),
            Effect::CloseSocket,
            Effect::Unregister,
            Effect::ScheduleRefresh(DELAY),
        ]
    );
    assert_eq!(s.closure(), Some(&Closure::Success));
}

#[test]
fn legacy_completed_behaves_like_done() {
    let mut s = streaming("9");
    let effects = s.receive(r#"{"status":"completed"}"#);
    assert_eq!(count(&effects, |e| *e == Effect::CloseSocket), 1);
    assert_eq!(count(&effects, |e| matches!(e, Effect::ScheduleRefresh(_))), 1);
    assert_eq!(effects[0], Effect::Log("✓ Job finished".into()));
}

#[test]
fn both_markers_in_one_message_yield_a_single_outcome() {
    let mut s = streaming("9");
    let effects = s.receive(r#"{"type":"done","status":"completed"}"#);
    assert_eq!(count(&effects, |e| *e == Effect::CloseSocket), 1);
    assert_eq!(count(&effects, |e| matches!(e, Effect::ScheduleRefresh(_))), 1);
}

#[test]
fn frames_after_terminal_are_ignored() {
    let mut s = streaming("9");
    s.receive(r#"{"type":"done"}"#);
    assert!(s.receive(r#"{"status":"done"}"#).is_empty());
    assert!(s.receive(r#"{"type":"error"}"#).is_empty());
    assert_eq!(s.closure(), Some(&Closure::Success));
}

#[test]
fn typed_error_fails_without_refresh() {
    let mut s = streaming("3");
    let effects = s.receive(r#"{"type":"error","job":{"error":"blocked"}}"#);
    assert_eq!(
        effects,
        vec![
            Effect::Log("❌ Error: blocked".into()),
            Effect::Toast(ToastLevel::Danger, "Job 3 failed".into()),
            Effect::CloseSocket,
            Effect::Unregister,
        ]
    );
    assert_eq!(s.closure(), Some(&Closure::Failure("blocked".into())));
}

#[test]
fn legacy_failure_logs_status() {
    let mut s = streaming("3");
    let effects = s.receive(r#"{"status":"error"}"#);
    assert_eq!(effects[0], Effect::Log("✗ Job failed: error".into()));
}

#[test]
fn progress_and_terminal_in_one_message_apply_in_order() {
    let mut s = streaming("4");
    let effects = s.receive(r#"{"type":"progress","percent":100,"status":"done"}"#);
    assert_eq!(effects[0], Effect::Progress(100.0));
    assert!(effects.contains(&Effect::CloseSocket));
}

// ---------------------------------------------------------------------------
// Connection loss
// ---------------------------------------------------------------------------

#[test]
fn disconnect_before_terminal_is_a_connection_error() {
    let mut s = streaming("6");
    let effects = s.disconnected();
    assert_eq!(
        effects,
        vec![Effect::Log("Disconnected".into()), Effect::Unregister]
    );
    assert!(matches!(s.closure(), Some(Closure::ConnectionError(_))));
}

#[test]
fn disconnect_after_terminal_only_logs() {
    let mut s = streaming("6");
    s.receive(r#"{"type":"done"}"#);
    assert_eq!(s.disconnected(), vec![Effect::Log("Disconnected".into())]);
    assert_eq!(s.closure(), Some(&Closure::Success));
}

#[test]
fn connection_failure_unregisters_and_never_refreshes() {
    let mut s = JobSession::new(JobId::from("8"), DELAY);
    s.connect();
    let effects = s.connection_failed("refused");
    assert_eq!(
        effects,
        vec![
            Effect::Log("⚠️ Connection error: refused".into()),
            Effect::Unregister
        ]
    );
    assert!(s.connection_failed("again").is_empty());
    assert!(s.receive(r#"{"type":"done"}"#).is_empty());
}
