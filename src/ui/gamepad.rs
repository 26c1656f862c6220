/// Gamepad input tracker using gilrs.
///
/// Button mapping comes from `[gamepad]` in config.toml. Defaults:
///   D-pad / Left Stick    →  Move
///   A                     →  Toggle debug overlay
///   Select                →  Quit
///
/// Without the `gamepad` feature every query reports "not pressed".

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use tracing::{debug, info};

use overworld::config::GamepadConfig;
use overworld::domain::direction::HeldKeys;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

const BUTTON_COUNT: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER" => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2" => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Action-to-button mapping.
#[derive(Debug, PartialEq, Eq)]
struct ActionMap {
    toggle_debug: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            toggle_debug: vec![Btn::A],
            quit: vec![Btn::Select],
        }
    }
}

impl ActionMap {
    /// Unknown names are skipped; an action whose list parses empty keeps
    /// its default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let mut map = ActionMap::default();
        let toggle = parse_list(&cfg.toggle_debug);
        if !toggle.is_empty() { map.toggle_debug = toggle; }
        let quit = parse_list(&cfg.quit);
        if !quit.is_empty() { map.quit = quit; }
        map
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BUTTON_COUNT],

    // D-pad: up, down, left, right
    dpad: [BtnState; 4],

    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

const UP: usize = 0;
const DOWN: usize = 1;
const LEFT: usize = 2;
const RIGHT: usize = 3;

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                info!(connected = has_pad, "gamepad_backend_ready");
                (Some(g), has_pad)
            }
            Err(e) => {
                info!(error = %e, "gamepad_backend_unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BUTTON_COUNT],
            dpad: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map = ActionMap::from_config(cfg);
    }

    pub fn update(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        for d in &mut self.dpad { d.just_pressed = false; }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    debug!(id = ?event.id, "gamepad_connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    debug!(id = ?event.id, "gamepad_disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let slot = match gilrs_btn {
            Button::DPadUp => Some(UP),
            Button::DPadDown => Some(DOWN),
            Button::DPadLeft => Some(LEFT),
            Button::DPadRight => Some(RIGHT),
            _ => None,
        };
        if let Some(i) = slot {
            self.dpad[i].set(held);
            return;
        }
        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn as usize].set(held);
        }
    }

    // ── Queries ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    pub fn toggle_debug_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.toggle_debug)
    }

    pub fn quit_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.quit)
    }

    /// D-pad or stick past the deadzone. Stick Y is positive upward.
    pub fn held_keys(&self) -> HeldKeys {
        HeldKeys {
            up: self.dpad[UP].held || self.stick_y > STICK_DEADZONE,
            down: self.dpad[DOWN].held || self.stick_y < -STICK_DEADZONE,
            left: self.dpad[LEFT].held || self.stick_x < -STICK_DEADZONE,
            right: self.dpad[RIGHT].held || self.stick_x > STICK_DEADZONE,
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BUTTON_COUNT];
        self.dpad = [BtnState::default(); 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overworld::domain::direction::Direction;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn config_overrides_mapping() {
        let cfg = GamepadConfig { toggle_debug: names(&["y", "rb"]), quit: names(&["back"]) };
        let map = ActionMap::from_config(&cfg);
        assert_eq!(map.toggle_debug, vec![Btn::Y, Btn::R1]);
        assert_eq!(map.quit, vec![Btn::Select]);
    }

    #[test]
    fn unknown_names_keep_defaults() {
        let cfg = GamepadConfig { toggle_debug: names(&["turbo"]), quit: vec![] };
        assert_eq!(ActionMap::from_config(&cfg), ActionMap::default());
    }

    #[test]
    fn stick_respects_deadzone() {
        let mut pad = GamepadState::new();
        pad.stick_x = 0.1;
        assert_eq!(pad.held_keys().resolve(), Direction::Zero);
        pad.stick_x = -0.9;
        assert_eq!(pad.held_keys().resolve(), Direction::West);
        pad.stick_y = 0.9;
        assert_eq!(pad.held_keys().resolve(), Direction::North);
    }

    #[test]
    fn press_is_an_edge() {
        let mut pad = GamepadState::new();
        pad.buttons[Btn::A as usize].set(true);
        assert!(pad.toggle_debug_pressed());
        pad.buttons[Btn::A as usize].just_pressed = false;
        pad.buttons[Btn::A as usize].set(true);
        assert!(!pad.toggle_debug_pressed());
        pad.buttons[Btn::Select as usize].set(true);
        assert!(pad.quit_pressed());
    }

    #[test]
    fn remapped_toggle_follows_config() {
        let mut pad = GamepadState::new();
        pad.load_button_config(&GamepadConfig { toggle_debug: names(&["start"]), quit: vec![] });
        pad.buttons[Btn::A as usize].set(true);
        assert!(!pad.toggle_debug_pressed());
        pad.buttons[Btn::Start as usize].set(true);
        assert!(pad.toggle_debug_pressed());
    }
}
