/// Audio cues and the one playback rule the overworld cares about:
/// a cue that is still playing is not started again, except `Swamp`,
/// which restarts on every hit.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Cue {
    Victory,
    Bump,
    Enter,
    Swamp,
    Enemy,
}

impl Cue {
    pub const ALL: [Cue; 5] = [Cue::Victory, Cue::Bump, Cue::Enter, Cue::Swamp, Cue::Enemy];

    pub fn name(self) -> &'static str {
        match self {
            Cue::Victory => "Victory",
            Cue::Bump => "Bump",
            Cue::Enter => "Enter",
            Cue::Swamp => "Swamp",
            Cue::Enemy => "Enemy",
        }
    }

    pub fn from_name(name: &str) -> Option<Cue> {
        Cue::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn may_restart(self) -> bool {
        matches!(self, Cue::Swamp)
    }
}

/// Anything that can play a named cue (the rodio engine, a test recorder).
pub trait CuePlayer {
    fn is_playing(&self, cue: Cue) -> bool;
    fn start(&mut self, cue: Cue);
}

/// Play `cue` unless it is already playing. Returns whether it started.
pub fn play_cue<P: CuePlayer + ?Sized>(player: &mut P, cue: Cue) -> bool {
    if player.is_playing(cue) && !cue.may_restart() {
        return false;
    }
    player.start(cue);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        playing: Vec<Cue>,
        started: Vec<Cue>,
    }

    impl CuePlayer for Recorder {
        fn is_playing(&self, cue: Cue) -> bool {
            self.playing.contains(&cue)
        }
        fn start(&mut self, cue: Cue) {
            self.started.push(cue);
            if !self.playing.contains(&cue) {
                self.playing.push(cue);
            }
        }
    }

    #[test]
    fn playing_cue_is_not_restarted() {
        let mut rec = Recorder::default();
        assert!(play_cue(&mut rec, Cue::Bump));
        assert!(!play_cue(&mut rec, Cue::Bump));
        assert_eq!(rec.started, [Cue::Bump]);
    }

    #[test]
    fn swamp_restarts_while_playing() {
        let mut rec = Recorder::default();
        assert!(play_cue(&mut rec, Cue::Swamp));
        assert!(play_cue(&mut rec, Cue::Swamp));
        assert_eq!(rec.started, [Cue::Swamp, Cue::Swamp]);
    }

    #[test]
    fn different_cues_overlap() {
        let mut rec = Recorder::default();
        assert!(play_cue(&mut rec, Cue::Enemy));
        assert!(play_cue(&mut rec, Cue::Enter));
    }

    #[test]
    fn names_roundtrip() {
        for cue in Cue::ALL {
            assert_eq!(Cue::from_name(cue.name()), Some(cue));
        }
        assert_eq!(Cue::from_name("Fanfare"), None);
    }
}
