/// Events emitted during an overworld tick.
/// The presentation layer consumes these for sound and the narrative log.

use super::cue::Cue;
use super::world::WorldState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldEvent {
    Sound(Cue),
    Narrate(String),
    StateChanged { from: WorldState, to: WorldState },
    EncounterStarted,
    EncounterEnded,
}

impl WorldEvent {
    pub fn narrate(text: &str) -> Self {
        WorldEvent::Narrate(text.to_string())
    }
}
