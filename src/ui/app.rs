//! Main application state and logic

use super::screen::{self, Target};
use super::ThemeColors;
use crate::capture::{CaptureMode, CaptureSession};
use crate::config::Config;
use crate::keyboard::{CanonicalKey, KeyEvent, KeyEventType, KeyboardState, LayoutId, NamedKey, SuppressionPolicy};
use crate::tests::{LatencyTest, ResultStatus, TestResult};
use crate::utils::format_ms;
use crossterm::event::{
    self as ct, KeyCode, KeyEventKind, KeyModifiers, ModifierKeyCode, MouseButton, MouseEventKind,
};
use log::{debug, info, trace};
use ratatui::layout::Rect;
use std::time::Instant;

/// Application running state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,
    Quitting,
}

/// Modal dialog over the main screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    ConfirmReset,
}

/// Main application
pub struct App {
    /// Application state
    pub state: AppState,
    /// Configuration
    pub config: Config,
    pub colors: ThemeColors,
    /// Layout drawn and used for suppression
    pub layout: LayoutId,
    /// Per-key visual state
    pub keyboard_state: KeyboardState,
    /// Pending presses and latency records
    pub latency_test: LatencyTest,
    /// Application start time
    pub start_time: Instant,
    /// Total events processed
    pub total_events: u64,
    policy: SuppressionPolicy,
    dialog: Option<Dialog>,
    capture_mode: Option<CaptureMode>,
    dropped_events: u64,
    /// Text the source reported for the last press, with the bucket it landed in
    last_input: Option<(String, CanonicalKey)>,
    /// Terminal source reports key releases
    terminal_releases: bool,
    status_message: Option<String>,
    status_time: Option<Instant>,
    dirty: bool,
    batch: Vec<KeyEvent>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let layout = config.ui.layout;
        Self {
            state: AppState::Running,
            colors: ThemeColors::from_theme(config.ui.theme),
            layout,
            keyboard_state: KeyboardState::new(),
            latency_test: LatencyTest::new(),
            start_time: Instant::now(),
            total_events: 0,
            policy: SuppressionPolicy::new(layout, config.capture.suppress),
            dialog: None,
            capture_mode: None,
            dropped_events: 0,
            last_input: None,
            terminal_releases: false,
            status_message: None,
            status_time: None,
            dirty: true,
            batch: Vec::with_capacity(config.capture.batch_size),
            config,
        }
    }

    /// Suppression policy to hand to the capture session; follows layout
    /// switches made here
    pub fn policy(&self) -> &SuppressionPolicy {
        &self.policy
    }

    /// Apply one key event to visual state and latency timing
    pub fn process_event(&mut self, event: &KeyEvent) {
        self.total_events += 1;
        let visual = self.keyboard_state.process_event(event);
        trace!("{:?} {} -> {:?}", event.event_type, event.key, visual);

        if let Some(record) = self.latency_test.record_event(event) {
            debug!("{}", record);
        }
        if event.is_press() || event.text.is_some() {
            let text = event.text.clone().unwrap_or_else(|| event.key.to_string());
            self.last_input = Some((text, event.key));
        }
        self.dirty = true;
    }

    /// One wake-up of the update loop: apply at most `capture.batch_size`
    /// queued events in capture order. Returns the number applied.
    pub fn pump(&mut self, session: &mut CaptureSession) -> usize {
        let mut batch = std::mem::take(&mut self.batch);
        batch.clear();
        let count = session.poll(self.config.capture.batch_size.max(1), &mut batch);
        for event in &batch {
            self.process_event(event);
        }
        self.batch = batch;

        let mode = session.mode();
        if self.capture_mode != Some(mode) {
            self.capture_mode = Some(mode);
            self.dirty = true;
        }
        if let Some(notice) = session.take_notice() {
            self.set_status(notice);
        }
        let dropped = session.dropped();
        if dropped != self.dropped_events {
            self.dropped_events = dropped;
            self.dirty = true;
        }
        count
    }

    /// Make `layout` the active table. Key states, pending presses and
    /// records are untouched.
    pub fn switch_layout(&mut self, layout: LayoutId) {
        if layout == self.layout {
            return;
        }
        self.layout = layout;
        self.policy.set_active(layout);
        info!("Layout switched to {}", layout.name());
        self.set_status(format!("Layout: {}", layout.name()));
    }

    pub fn next_layout(&mut self) {
        self.switch_layout(self.layout.next());
    }

    /// Ask the operator to confirm a reset
    pub fn request_reset(&mut self) {
        self.dialog = Some(Dialog::ConfirmReset);
        self.dirty = true;
    }

    pub fn confirm_reset(&mut self) {
        if self.dialog.take() == Some(Dialog::ConfirmReset) {
            self.reset();
        }
    }

    pub fn cancel_reset(&mut self) {
        if self.dialog.take().is_some() {
            self.dirty = true;
        }
    }

    pub fn is_confirming_reset(&self) -> bool {
        self.dialog == Some(Dialog::ConfirmReset)
    }

    /// Clear pending presses, latency records and key states
    pub fn reset(&mut self) {
        self.keyboard_state.reset();
        self.latency_test.reset();
        self.last_input = None;
        info!("All key states and latency records cleared");
        self.set_status("Reset: all keys and records cleared".to_string());
    }

    /// Whether the terminal reports key releases (keyboard enhancement)
    pub fn set_terminal_releases(&mut self, enabled: bool) {
        self.terminal_releases = enabled;
    }

    /// Handle a key that reached the terminal.
    ///
    /// Ctrl+C always quits and the dialog answers to y/Enter and n/Esc.
    /// Other keys are measured only when the terminal is the key source.
    pub fn handle_key(&mut self, key: ct::KeyEvent) {
        let press = key.kind == KeyEventKind::Press;
        if press && key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        if self.dialog.is_some() {
            if press {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.confirm_reset(),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.cancel_reset(),
                    _ => {}
                }
            }
            return;
        }

        if self.capture_mode != Some(CaptureMode::Terminal) {
            return;
        }
        let Some(canonical) = terminal_key(key.code) else {
            return;
        };
        let text = match key.code {
            KeyCode::Char(c) => Some(c.to_string()),
            _ => None,
        };
        let event_type = match key.kind {
            KeyEventKind::Press if self.terminal_releases => KeyEventType::Press,
            // Without release reporting a press is the only notification
            KeyEventKind::Press | KeyEventKind::Release => KeyEventType::Release,
            KeyEventKind::Repeat => return,
        };
        self.process_event(&KeyEvent::new(canonical, event_type, Instant::now()).with_text(text));
    }

    /// Handle a mouse event on a screen of size `area`
    pub fn handle_mouse(&mut self, mouse: ct::MouseEvent, area: Rect) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        match screen::hit_test(area, self.dialog.is_some(), mouse.column, mouse.row) {
            Some(Target::Layout(layout)) => self.switch_layout(layout),
            Some(Target::Reset) => self.request_reset(),
            Some(Target::Quit) => self.quit(),
            Some(Target::ConfirmYes) => self.confirm_reset(),
            Some(Target::ConfirmNo) => self.cancel_reset(),
            None => {}
        }
    }

    pub fn quit(&mut self) {
        self.state = AppState::Quitting;
    }

    pub fn should_quit(&self) -> bool {
        self.state == AppState::Quitting
    }

    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }

    pub fn request_redraw(&mut self) {
        self.dirty = true;
    }

    pub fn mark_drawn(&mut self) {
        self.dirty = false;
    }

    /// Set a status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_time = Some(Instant::now());
        self.dirty = true;
    }

    /// Status message, while it is still within `ui.status_duration_secs`
    pub fn get_status(&self) -> Option<&str> {
        match (&self.status_message, self.status_time) {
            (Some(msg), Some(time)) if time.elapsed() < self.config.status_duration() => Some(msg),
            _ => None,
        }
    }

    pub fn capture_mode(&self) -> Option<CaptureMode> {
        self.capture_mode
    }

    pub fn mode_label(&self) -> &'static str {
        self.capture_mode.map_or("STARTING", |mode| mode.label())
    }

    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    /// Keys of the active layout tested so far, and the layout's key count
    pub fn progress(&self) -> (usize, usize) {
        let table = self.layout.table();
        (self.keyboard_state.tested_count_in(table), table.key_count())
    }

    pub fn progress_label(&self) -> String {
        let (tested, total) = self.progress();
        format!("{}/{} tested", tested, total)
    }

    /// Right side of the status bar
    pub fn status_detail(&self) -> String {
        let mut detail = format!("Events: {}", self.total_events);
        if self.dropped_events > 0 {
            detail.push_str(&format!(" | Dropped: {}", self.dropped_events));
        }
        if let Some((text, key)) = &self.last_input {
            detail.push_str(&format!(" | Last: {} [{}]", text, key));
        }
        detail
    }

    /// Summary panel contents
    pub fn results(&self) -> Vec<TestResult> {
        let mut results = self.latency_test.get_results();
        let (tested, total) = self.progress();
        results.push(TestResult::new(
            "Tested",
            format!("{}/{}", tested, total),
            if tested == total {
                ResultStatus::Ok
            } else {
                ResultStatus::Info
            },
        ));
        if self.dropped_events > 0 {
            results.push(TestResult::new(
                "Dropped",
                self.dropped_events.to_string(),
                ResultStatus::Error,
            ));
        }
        results
    }

    /// Get elapsed time formatted
    pub fn elapsed_formatted(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Lines printed after the terminal is restored
    pub fn session_summary(&self) -> Vec<String> {
        let average = self
            .latency_test
            .avg()
            .map_or_else(|| "n/a".to_string(), format_ms);
        vec![
            format!("Session duration: {}", self.elapsed_formatted()),
            format!("Total events processed: {}", self.total_events),
            format!("Keys tested: {}", self.keyboard_state.tested_count()),
            format!("Latency samples: {}", self.latency_test.sample_count()),
            format!("Average latency: {}", average),
            format!("Dropped events: {}", self.dropped_events),
        ]
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Canonical key for a key code reported by the terminal
pub fn terminal_key(code: KeyCode) -> Option<CanonicalKey> {
    let named = match code {
        KeyCode::Char(' ') => NamedKey::Space,
        KeyCode::Char(c) if c.is_control() || c.is_whitespace() => return None,
        KeyCode::Char(c) => return Some(CanonicalKey::from_char(c)),
        KeyCode::Esc => NamedKey::Escape,
        KeyCode::Enter => NamedKey::Enter,
        KeyCode::Tab | KeyCode::BackTab => NamedKey::Tab,
        KeyCode::Backspace => NamedKey::Backspace,
        KeyCode::Up => NamedKey::Up,
        KeyCode::Down => NamedKey::Down,
        KeyCode::Left => NamedKey::Left,
        KeyCode::Right => NamedKey::Right,
        KeyCode::Insert => NamedKey::Insert,
        KeyCode::Delete => NamedKey::Delete,
        KeyCode::Home => NamedKey::Home,
        KeyCode::End => NamedKey::End,
        KeyCode::PageUp => NamedKey::PageUp,
        KeyCode::PageDown => NamedKey::PageDown,
        KeyCode::F(n) => return function_key(n),
        KeyCode::CapsLock => NamedKey::CapsLock,
        KeyCode::NumLock => NamedKey::NumLock,
        KeyCode::ScrollLock => NamedKey::ScrollLock,
        KeyCode::PrintScreen => NamedKey::PrintScreen,
        KeyCode::Pause => NamedKey::Pause,
        KeyCode::Menu => NamedKey::Menu,
        KeyCode::Modifier(modifier) => match modifier {
            ModifierKeyCode::LeftShift => NamedKey::ShiftLeft,
            ModifierKeyCode::RightShift => NamedKey::ShiftRight,
            ModifierKeyCode::LeftControl => NamedKey::ControlLeft,
            ModifierKeyCode::RightControl => NamedKey::ControlRight,
            ModifierKeyCode::LeftAlt => NamedKey::AltLeft,
            ModifierKeyCode::RightAlt => NamedKey::AltRight,
            ModifierKeyCode::LeftSuper => NamedKey::SuperLeft,
            ModifierKeyCode::RightSuper => NamedKey::SuperRight,
            _ => return None,
        },
        _ => return None,
    };
    Some(CanonicalKey::Named(named))
}

fn function_key(n: u8) -> Option<CanonicalKey> {
    const KEYS: [NamedKey; 12] = [
        NamedKey::F1,
        NamedKey::F2,
        NamedKey::F3,
        NamedKey::F4,
        NamedKey::F5,
        NamedKey::F6,
        NamedKey::F7,
        NamedKey::F8,
        NamedKey::F9,
        NamedKey::F10,
        NamedKey::F11,
        NamedKey::F12,
    ];
    let index = usize::from(n).checked_sub(1)?;
    KEYS.get(index).copied().map(CanonicalKey::Named)
}
