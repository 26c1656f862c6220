/// Transient presentation state owned by the overworld: the swamp flash
/// backdrop and the optional debug overlay. Neither feeds back into play.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

pub const NEUTRAL_BACKDROP: Rgb = Rgb::new(0, 0, 0);
pub const SWAMP_BACKDROP: Rgb = Rgb::new(228, 0, 96);

#[derive(Clone, Debug)]
pub struct SwampFlash {
    timer: u32,
    backdrop: Rgb,
}

impl SwampFlash {
    pub fn new() -> Self {
        SwampFlash { timer: 0, backdrop: NEUTRAL_BACKDROP }
    }

    /// Set (not add to) the timer and tint the backdrop.
    pub fn trigger(&mut self, ticks: u32) {
        self.timer = ticks;
        self.backdrop = SWAMP_BACKDROP;
    }

    /// Count down; the backdrop goes neutral once the timer is spent.
    pub fn tick(&mut self) {
        if self.timer > 0 {
            self.timer -= 1;
        }
        if self.timer == 0 && self.backdrop != NEUTRAL_BACKDROP {
            self.backdrop = NEUTRAL_BACKDROP;
        }
    }

    pub fn remaining(&self) -> u32 {
        self.timer
    }

    pub fn backdrop(&self) -> Rgb {
        self.backdrop
    }
}

impl Default for SwampFlash {
    fn default() -> Self {
        SwampFlash::new()
    }
}

/// Debug text panel. Content is replaced only when it actually changes.
#[derive(Clone, Debug, Default)]
pub struct DebugOverlay {
    enabled: bool,
    text: String,
    revisions: u64,
}

impl DebugOverlay {
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn is_visible(&self) -> bool {
        self.enabled
    }

    /// Returns true when the stored text changed.
    pub fn refresh(&mut self, content: String) -> bool {
        if self.text == content {
            return false;
        }
        self.text = content;
        self.revisions += 1;
        true
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn revisions(&self) -> u64 {
        self.revisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_resets_backdrop_when_spent() {
        let mut flash = SwampFlash::new();
        flash.trigger(3);
        assert_eq!(flash.backdrop(), SWAMP_BACKDROP);
        flash.tick();
        flash.tick();
        assert_eq!(flash.remaining(), 1);
        assert_eq!(flash.backdrop(), SWAMP_BACKDROP);
        flash.tick();
        assert_eq!(flash.remaining(), 0);
        assert_eq!(flash.backdrop(), NEUTRAL_BACKDROP);
    }

    #[test]
    fn retrigger_overwrites() {
        let mut flash = SwampFlash::new();
        flash.trigger(10);
        flash.tick();
        flash.trigger(10);
        assert_eq!(flash.remaining(), 10);
    }

    #[test]
    fn overlay_only_updates_on_change() {
        let mut overlay = DebugOverlay::default();
        assert!(!overlay.is_visible());
        overlay.toggle();
        assert!(overlay.is_visible());
        assert!(overlay.refresh("a".into()));
        assert!(!overlay.refresh("a".into()));
        assert!(overlay.refresh("b".into()));
        assert_eq!(overlay.revisions(), 2);
        assert_eq!(overlay.text(), "b");
    }
}
