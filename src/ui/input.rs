/// Keyboard state tracker.
///
/// Movement is level-triggered (held keys walk continuously), the debug
/// toggle and quit are edge-triggered. When the terminal accepts keyboard
/// enhancement, Release events end a hold; everywhere else a key counts as
/// released once no Press/Repeat has arrived within `HOLD_TIMEOUT`.
///
/// Bindings:
///   Arrows / WASD         →  Move (Up > Down > Left > Right)
///   Enter / Space         →  Toggle debug overlay
///   Esc / Ctrl+C          →  Quit

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use overworld::domain::direction::HeldKeys;

const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_TOGGLE_DEBUG: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];

pub struct InputState {
    /// Last Press/Repeat per key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,
    raw_events: Vec<KeyEvent>,
    /// Only set once keyboard enhancement is confirmed.
    honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Trust Release events instead of waiting out `HOLD_TIMEOUT`.
    pub fn honor_release(mut self, on: bool) -> Self {
        self.honor_release = on;
        self
    }

    /// Drain pending terminal events. Call once per frame before the tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        if !self.honor_release {
            let now = Instant::now();
            self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        }
    }

    fn record(&mut self, key: KeyEvent, at: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, at);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// With Release events honoured a key stays held until released.
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| self.honor_release || t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Movement signals for this frame. A fresh press counts as held so a
    /// tap shorter than one frame still registers.
    pub fn held_keys(&self) -> HeldKeys {
        let active = |codes: &[KeyCode]| self.any_held(codes) || self.any_pressed(codes);
        HeldKeys {
            up: active(KEYS_UP),
            down: active(KEYS_DOWN),
            left: active(KEYS_LEFT),
            right: active(KEYS_RIGHT),
        }
    }

    pub fn toggle_debug_pressed(&self) -> bool {
        self.any_pressed(KEYS_TOGGLE_DEBUG)
    }

    pub fn quit_pressed(&self) -> bool {
        self.any_pressed(KEYS_QUIT) || self.ctrl_c_pressed()
    }

    fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
