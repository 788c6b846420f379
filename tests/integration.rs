//! Integration tests for Keyboard Latency
//!
//! These tests drive the public App and CaptureSession API: event
//! processing, latency records, visual state, reset and layout switching,
//! and the hook-to-UI pipeline with a fake hook installer.

use keyboard_latency::capture::{CaptureError, CaptureMode, CaptureSession, HookHandler};
use keyboard_latency::config::{CaptureConfig, Config};
use keyboard_latency::keyboard::{
    resolve, CanonicalKey, KeyEvent, KeyEventType, KeyVisualState, LayoutId, NamedKey,
};
use keyboard_latency::ui::App;
use rdev::Key;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn at(base: Instant, ms: u64) -> Instant {
    base + Duration::from_millis(ms)
}

fn char_key(c: char) -> CanonicalKey {
    CanonicalKey::from_char(c)
}

/// Press and release a key `hold_ms` apart
fn tap(app: &mut App, key: CanonicalKey, base: Instant, start_ms: u64, hold_ms: u64) {
    app.process_event(&KeyEvent::press(key, at(base, start_ms)));
    app.process_event(&KeyEvent::release(key, at(base, start_ms + hold_ms)));
}

fn capture_config() -> CaptureConfig {
    CaptureConfig {
        startup_probe_ms: 30,
        shutdown_timeout_ms: 1000,
        ..CaptureConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Latency scenarios
// ---------------------------------------------------------------------------

#[test]
fn press_then_release_logs_latency() {
    let mut app = App::default();
    let base = Instant::now();
    tap(&mut app, char_key('a'), base, 0, 120);

    let records: Vec<String> = app.latency_test.records().map(|r| r.to_string()).collect();
    assert_eq!(records, vec!["[       a       ]:  120.00 ms".to_string()]);
    assert_eq!(app.keyboard_state.state_of(&char_key('a')), KeyVisualState::Tested);
}

#[test]
fn shifted_press_matches_unshifted_release() {
    let mut app = App::default();
    let base = Instant::now();

    let pressed = resolve(Key::KeyA, Some("A"));
    let released = resolve(Key::KeyA, Some("a"));
    assert_eq!(pressed, released);

    app.process_event(&KeyEvent::press(pressed, base).with_text(Some("A".into())));
    app.process_event(&KeyEvent::release(released, at(base, 75)));

    assert_eq!(app.latency_test.sample_count(), 1);
    assert_eq!(app.latency_test.pending_count(), 0);
    let latest = app.latency_test.latest().unwrap();
    assert_eq!(latest.key, char_key('a'));
    assert!((latest.latency_ms() - 75.0).abs() < 1e-6);
}

#[test]
fn release_without_press_marks_tested_only() {
    let mut app = App::default();
    let f1 = CanonicalKey::Named(NamedKey::F1);
    app.process_event(&KeyEvent::release(f1, Instant::now()));

    assert_eq!(app.latency_test.sample_count(), 0);
    assert_eq!(app.keyboard_state.state_of(&f1), KeyVisualState::Tested);
    assert_eq!(app.latency_test.unmatched_releases(), 1);
}

#[test]
fn records_are_newest_first() {
    let mut app = App::default();
    let base = Instant::now();
    tap(&mut app, char_key('a'), base, 0, 10);
    tap(&mut app, char_key('b'), base, 20, 30);
    tap(&mut app, char_key('c'), base, 60, 50);

    let keys: Vec<CanonicalKey> = app.latency_test.records().map(|r| r.key).collect();
    assert_eq!(keys, vec![char_key('c'), char_key('b'), char_key('a')]);
    assert_eq!(app.latency_test.min(), Some(Duration::from_millis(10)));
    assert_eq!(app.latency_test.max(), Some(Duration::from_millis(50)));
}

#[test]
fn held_key_stays_pending() {
    let mut app = App::default();
    let base = Instant::now();
    app.process_event(&KeyEvent::press(char_key('s'), base));

    assert_eq!(app.keyboard_state.state_of(&char_key('s')), KeyVisualState::Active);
    assert_eq!(app.latency_test.pending_since(&char_key('s')), Some(base));
    assert_eq!(app.latency_test.sample_count(), 0);
}

// ---------------------------------------------------------------------------
// Reset and layout switching
// ---------------------------------------------------------------------------

#[test]
fn reset_is_idempotent() {
    let mut app = App::default();
    let base = Instant::now();
    tap(&mut app, char_key('a'), base, 0, 20);
    app.process_event(&KeyEvent::press(char_key('b'), at(base, 40)));

    app.reset();
    app.reset();

    assert_eq!(app.latency_test.sample_count(), 0);
    assert_eq!(app.latency_test.pending_count(), 0);
    assert_eq!(app.keyboard_state.tested_count(), 0);
    assert_eq!(app.keyboard_state.state_of(&char_key('a')), KeyVisualState::Default);
    assert_eq!(app.keyboard_state.state_of(&char_key('b')), KeyVisualState::Default);
}

#[test]
fn layout_switch_preserves_records_and_pending() {
    let mut app = App::default();
    let base = Instant::now();
    tap(&mut app, char_key('q'), base, 0, 33);
    tap(&mut app, char_key('w'), base, 40, 44);
    app.process_event(&KeyEvent::press(char_key('e'), at(base, 100)));

    let records_before: Vec<_> = app.latency_test.records().copied().collect();
    let pending_before = app.latency_test.pending_since(&char_key('e'));

    app.switch_layout(LayoutId::Azerty);
    app.switch_layout(LayoutId::Qwerty);
    app.switch_layout(LayoutId::Azerty);

    let records_after: Vec<_> = app.latency_test.records().copied().collect();
    assert_eq!(records_before, records_after);
    assert_eq!(app.latency_test.pending_since(&char_key('e')), pending_before);

    // The pending press still completes after the switch
    app.process_event(&KeyEvent::release(char_key('e'), at(base, 160)));
    assert_eq!(app.latency_test.latest().unwrap().latency, Duration::from_millis(60));
}

#[test]
fn tested_keys_stay_tested_across_layouts() {
    let mut app = App::default();
    let base = Instant::now();
    // 'a' exists in both tables, 'é' only in AZERTY
    tap(&mut app, char_key('a'), base, 0, 10);
    tap(&mut app, char_key('é'), base, 20, 10);

    let (qwerty_tested, _) = app.progress();
    app.switch_layout(LayoutId::Azerty);
    let (azerty_tested, _) = app.progress();

    assert_eq!(qwerty_tested, 1);
    assert_eq!(azerty_tested, 2);
    for _ in 0..5 {
        app.next_layout();
        assert_eq!(app.keyboard_state.state_of(&char_key('a')), KeyVisualState::Tested);
        assert_eq!(app.keyboard_state.state_of(&char_key('é')), KeyVisualState::Tested);
    }
}

#[test]
fn reset_requires_confirmation() {
    let mut app = App::default();
    tap(&mut app, char_key('x'), Instant::now(), 0, 5);

    app.request_reset();
    app.cancel_reset();
    assert_eq!(app.latency_test.sample_count(), 1);

    app.request_reset();
    app.confirm_reset();
    assert_eq!(app.latency_test.sample_count(), 0);
}

#[test]
fn config_selects_startup_layout() {
    let mut config = Config::default();
    config.ui.layout = LayoutId::Azerty;
    let app = App::new(config);
    assert_eq!(app.layout, LayoutId::Azerty);
    assert_eq!(app.policy().active(), LayoutId::Azerty);
}

// ---------------------------------------------------------------------------
// Hook to UI pipeline
// ---------------------------------------------------------------------------

#[test]
fn pump_applies_at_most_one_batch_per_wakeup() {
    let (done_tx, done_rx) = mpsc::channel();
    let mut app = App::default();
    let mut session = CaptureSession::start_with(
        &capture_config(),
        app.policy().clone(),
        move |mut handler: HookHandler| {
            let t0 = Instant::now();
            let keys = [Key::KeyA, Key::KeyS, Key::KeyD];
            for i in 0..300 {
                let key = keys[i % keys.len()];
                handler.handle(KeyEventType::Press, key, None, t0);
                handler.handle(KeyEventType::Release, key, None, t0);
            }
            let _ = done_tx.send(());
            while handler.is_running() {
                thread::sleep(Duration::from_millis(1));
            }
            Ok(())
        },
    );
    done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(session.mode(), CaptureMode::HookSuppress);

    assert_eq!(app.pump(&mut session), 256);
    assert_eq!(app.pump(&mut session), 256);
    assert_eq!(app.pump(&mut session), 88);
    assert_eq!(app.pump(&mut session), 0);

    assert_eq!(app.total_events, 600);
    assert_eq!(app.latency_test.sample_count(), 300);
    assert_eq!(app.latency_test.pending_count(), 0);
    assert_eq!(app.mode_label(), "HOOK+SUPPRESS");
    session.shutdown(Duration::from_secs(5));
}

#[test]
fn layout_switch_reaches_the_capture_thread() {
    let (decision_tx, decision_rx) = mpsc::channel();
    let (go_tx, go_rx) = mpsc::channel::<()>();
    let mut app = App::default();
    let session = CaptureSession::start_with(
        &capture_config(),
        app.policy().clone(),
        move |mut handler: HookHandler| {
            let t0 = Instant::now();
            for _ in 0..2 {
                if go_rx.recv().is_err() {
                    break;
                }
                let swallowed = handler.handle(
                    KeyEventType::Press,
                    Key::Unknown(0xEE),
                    Some("é"),
                    t0,
                );
                handler.handle(KeyEventType::Release, Key::Unknown(0xEE), None, t0);
                let _ = decision_tx.send(swallowed);
            }
            while handler.is_running() {
                thread::sleep(Duration::from_millis(1));
            }
            Ok(())
        },
    );

    // 'é' is not on the QWERTY table
    go_tx.send(()).unwrap();
    assert!(!decision_rx.recv_timeout(Duration::from_secs(5)).unwrap());

    app.switch_layout(LayoutId::Azerty);
    go_tx.send(()).unwrap();
    assert!(decision_rx.recv_timeout(Duration::from_secs(5)).unwrap());

    session.shutdown(Duration::from_secs(5));
}

#[test]
fn failed_hook_falls_back_and_tells_the_operator() {
    let mut app = App::default();
    let mut session = CaptureSession::start_with(&capture_config(), app.policy().clone(), |_| {
        Err(CaptureError::HookInstall("permission denied".to_string()))
    });

    app.pump(&mut session);
    assert!(matches!(
        app.capture_mode(),
        Some(CaptureMode::Fallback) | Some(CaptureMode::Terminal)
    ));
    assert!(app.get_status().unwrap().contains("permission denied"));

    // Told once
    app.set_status("other".to_string());
    app.pump(&mut session);
    assert_eq!(app.get_status(), Some("other"));
    session.shutdown(Duration::from_millis(10));
}
