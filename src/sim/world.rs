/// Overworld: the party's movement / event state machine.
///
/// ## States
///
/// ```text
///   Null ──boot──▶ Init ──party present──▶ Idle ◀──────────────────────┐
///                                           │ input ≠ Zero, delay == 0  │
///                                           ▼                           │
///                                       CheckTile ──blocked (Bump)──────┤
///                                           │ batch started             │
///                                           ▼                           │
///                                         Move ──MotionFinished──▶ EventCheck
///                                                                   │   │
///                                              counter still > 0 ───┘   │ counter hits 0
///                                                                       ▼
///                                               Idle ◀──delay == 0── Battle
/// ```
///
/// `Move` is the explicit wait for the motion batch. The completion signal is
/// queued as a message and consumed once, on the tick the batch lands.
///
/// ## Tick order
///
///   1. Latch input (direction, debug toggle edge)
///   2. State logic: movement delay, swamp flash, debug overlay, motion
///   3. Deliver queued messages (motion completion → EventCheck)
///   4. Transition check for the current state
///
/// Entry actions may chain into a further state within the same tick
/// (CheckTile → Idle/Move, EventCheck → Idle/Battle).

use std::collections::VecDeque;
use std::fmt::Write as _;

use tracing::{debug, info, warn};

use crate::config::{GameConfig, TimingConfig};
use crate::domain::direction::Direction;
use crate::domain::grid::{GridCoord, GridMap};
use crate::domain::party::{ActorDecl, PartyChain};
use crate::domain::tile::TileClass;
use super::cue::Cue;
use super::effects::{DebugOverlay, Rgb, SwampFlash};
use super::encounter::EncounterClock;
use super::event::WorldEvent;
use super::motion::{MotionController, MotionError, MotionFinished};

pub const BLOCKED_TEXT: &str = "Thou canst not go that way!";
pub const SWAMP_TEXT: &str = "Ouch!";
pub const ENCOUNTER_TEXT: &str = "An enemy approaches!";
pub const VICTORY_TEXT: &str = "Thou hast vanquished the enemy!";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WorldState {
    Null,
    Init,
    Idle,
    CheckTile,
    Move,
    EventCheck,
    Battle,
}

/// What the machine reads from input each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub direction: Direction,
    /// Edge: true only on the tick the toggle was pressed.
    pub toggle_debug: bool,
}

impl FrameInput {
    pub fn moving(direction: Direction) -> Self {
        FrameInput { direction, toggle_debug: false }
    }
}

#[derive(Debug)]
enum Message {
    MotionFinished(MotionFinished),
}

pub struct Overworld {
    map: GridMap,
    roster: Vec<ActorDecl>,
    timing: TimingConfig,

    // ── State ──
    state: WorldState,
    previous: WorldState,
    inbox: VecDeque<Message>,
    pending_batch: Option<u64>,

    // ── Party + motion ──
    party: PartyChain,
    motion: MotionController,
    input_dir: Direction,

    // ── Counters ──
    movement_delay: u32,
    encounter: EncounterClock,
    flash: SwampFlash,

    // ── Presentation ──
    overlay: DebugOverlay,
    events: Vec<WorldEvent>,

    stall_warned: bool,
    tick: u64,
}

// ── Construction ──

impl Overworld {
    pub fn new(map: GridMap, roster: Vec<ActorDecl>, timing: TimingConfig, encounter: EncounterClock) -> Self {
        Overworld {
            map,
            roster,
            timing,
            state: WorldState::Null,
            previous: WorldState::Null,
            inbox: VecDeque::new(),
            pending_batch: None,
            party: PartyChain::new(),
            motion: MotionController::new(),
            input_dir: Direction::Zero,
            movement_delay: 0,
            encounter,
            flash: SwampFlash::new(),
            overlay: DebugOverlay::default(),
            events: Vec::new(),
            stall_warned: false,
            tick: 0,
        }
    }

    pub fn from_config(config: &GameConfig, map: GridMap) -> Self {
        let encounter = EncounterClock::from_seed(config.encounter.range(), config.encounter.seed);
        Overworld::new(map, config.party.clone(), config.timing.clone(), encounter)
    }

    /// Setup is complete: leave Null and run Init.
    pub fn boot(&mut self) -> Vec<WorldEvent> {
        if self.state == WorldState::Null {
            self.set_state(WorldState::Init);
        }
        std::mem::take(&mut self.events)
    }

    /// Declare another actor. While the machine is stalled in Init this
    /// re-runs party assembly so the machine can proceed.
    pub fn declare(&mut self, actor: ActorDecl) {
        self.roster.push(actor);
        if self.state == WorldState::Init {
            self.populate_party();
        }
    }
}

// ── Queries ──

impl Overworld {
    pub fn state(&self) -> WorldState { self.state }
    pub fn previous_state(&self) -> WorldState { self.previous }
    pub fn map(&self) -> &GridMap { &self.map }
    pub fn party(&self) -> &PartyChain { &self.party }
    pub fn movement_delay(&self) -> u32 { self.movement_delay }
    pub fn swamp_flash(&self) -> u32 { self.flash.remaining() }
    pub fn backdrop(&self) -> Rgb { self.flash.backdrop() }
    pub fn encounter(&self) -> &EncounterClock { &self.encounter }
    pub fn overlay(&self) -> &DebugOverlay { &self.overlay }
    pub fn is_moving(&self) -> bool { self.motion.is_busy() }
    pub fn ticks(&self) -> u64 { self.tick }

    pub fn leader_cell(&self) -> Option<GridCoord> {
        self.party.leader().map(|a| self.map.world_to_grid(a.position))
    }

    /// Per-member positions, cells and tile ids, then the global counters.
    pub fn debug_report(&self) -> String {
        let mut out = String::new();
        for actor in self.party.members() {
            let cell = self.map.world_to_grid(actor.position);
            let _ = writeln!(out, "{}", actor.name);
            let _ = writeln!(out, "  GPos:{}", actor.position);
            let _ = writeln!(out, "  TPos:{}", cell);
            let _ = writeln!(out, "  TID: {}", self.map.tile_at(cell));
        }
        let _ = writeln!(out, "\nNext Battle: {}", self.encounter.current());
        let _ = writeln!(out, "Move Delay:     {}", self.movement_delay);
        let _ = writeln!(out, "Swamp Flash:    {}", self.flash.remaining());
        out
    }
}

// ── Tick ──

impl Overworld {
    /// Advance one tick. Does nothing until `boot` has been called.
    pub fn tick(&mut self, input: FrameInput) -> Vec<WorldEvent> {
        if self.state == WorldState::Null {
            return vec![];
        }
        self.tick += 1;
        self.input_dir = input.direction;
        if input.toggle_debug {
            self.overlay.toggle();
        }

        self.state_logic();
        self.deliver_messages();
        if let Some(next) = self.transition() {
            self.set_state(next);
        }

        std::mem::take(&mut self.events)
    }

    fn state_logic(&mut self) {
        if self.movement_delay > 0 {
            self.movement_delay -= 1;
        }
        self.flash.tick();

        if self.overlay.is_visible() {
            let report = self.debug_report();
            self.overlay.refresh(report);
        }

        if let Some(done) = self.motion.advance(&mut self.party) {
            self.inbox.push_back(Message::MotionFinished(done));
        }
    }

    fn deliver_messages(&mut self) {
        while let Some(msg) = self.inbox.pop_front() {
            match msg {
                Message::MotionFinished(done) => {
                    if self.state == WorldState::Move && self.pending_batch == Some(done.batch) {
                        self.pending_batch = None;
                        self.set_state(WorldState::EventCheck);
                    } else {
                        warn!(batch = done.batch, state = ?self.state, "stale_motion_completion");
                    }
                }
            }
        }
    }

    fn transition(&mut self) -> Option<WorldState> {
        match self.state {
            WorldState::Init => {
                if !self.party.is_empty() {
                    return Some(WorldState::Idle);
                }
                if !self.stall_warned {
                    warn!("init_stalled_empty_party");
                    self.stall_warned = true;
                }
                None
            }
            WorldState::Idle => {
                if !self.input_dir.is_zero() && self.movement_delay == 0 {
                    return Some(WorldState::CheckTile);
                }
                None
            }
            WorldState::Battle => {
                if self.movement_delay == 0 {
                    self.sound(Cue::Victory);
                    self.narrate(VICTORY_TEXT);
                    self.events.push(WorldEvent::EncounterEnded);
                    info!(tick = self.tick, "encounter_ended");
                    return Some(WorldState::Idle);
                }
                None
            }
            _ => None,
        }
    }
}

// ── State plumbing ──

impl Overworld {
    fn set_state(&mut self, next: WorldState) {
        let old = self.state;
        self.previous = old;
        self.state = next;
        debug!(from = ?old, to = ?next, tick = self.tick, "state_changed");
        self.events.push(WorldEvent::StateChanged { from: old, to: next });

        self.enter_state(next, old);
        self.exit_state(old, next);
    }

    fn enter_state(&mut self, next: WorldState, _old: WorldState) {
        match next {
            WorldState::Init => self.populate_party(),
            WorldState::CheckTile => self.check_tile(),
            WorldState::EventCheck => self.event_check(),
            WorldState::Battle => {
                self.sound(Cue::Enemy);
                self.narrate(ENCOUNTER_TEXT);
                self.events.push(WorldEvent::EncounterStarted);
                self.encounter.reseed();
                self.movement_delay = self.timing.battle_delay;
                info!(tick = self.tick, next_countdown = self.encounter.current(), "encounter_started");
            }
            WorldState::Null | WorldState::Idle | WorldState::Move => {}
        }
    }

    /// Exit hook. No state needs teardown today.
    fn exit_state(&mut self, _old: WorldState, _next: WorldState) {}

    fn populate_party(&mut self) {
        self.party.initialize(&self.roster, self.map.spawn(), &self.map);
        self.encounter.reseed();
        if !self.party.is_empty() {
            info!(
                members = self.party.len(),
                leader = self.party.leader().map(|a| a.name.as_str()).unwrap_or(""),
                spawn = %self.map.spawn(),
                "party_initialized"
            );
        }
    }

    fn check_tile(&mut self) {
        let dir = self.input_dir;
        if let Some(label) = dir.label() {
            self.narrate(label);
        }
        let Some(from_cell) = self.leader_cell() else {
            self.set_state(WorldState::Idle);
            return;
        };
        if dir.is_zero() {
            self.set_state(WorldState::Idle);
            return;
        }

        let target = from_cell + dir.delta();
        if !self.map.is_passable(self.map.tile_at(target)) {
            self.sound(Cue::Bump);
            self.narrate(BLOCKED_TEXT);
            self.set_state(WorldState::Idle);
            return;
        }

        match self.launch_batch(dir, target) {
            Ok(batch) => {
                self.pending_batch = Some(batch);
                self.set_state(WorldState::Move);
            }
            Err(err) => {
                warn!(error = %err, "move_not_started");
                self.set_state(WorldState::Idle);
            }
        }
    }

    /// Queue leader + followers and start them as one batch.
    fn launch_batch(&mut self, dir: Direction, target: GridCoord) -> Result<u64, MotionError> {
        if self.motion.is_busy() {
            return Err(MotionError::InFlight);
        }
        let duration = self.timing.tile_move_ticks;
        let leader_to = self.map.grid_to_world(target);
        let leader_from = match self.party.leader_mut() {
            Some(leader) => {
                leader.facing = dir;
                leader.position
            }
            None => return Err(MotionError::InFlight),
        };

        let follows = self.party.apply_follow_step(&self.map);
        self.motion.begin_move(0, leader_from, leader_to, duration)?;
        for step in follows {
            self.motion.begin_move(step.member, step.from, step.to, duration)?;
        }
        self.motion.start().ok_or(MotionError::InFlight)
    }

    fn event_check(&mut self) {
        let classes: Vec<TileClass> = self
            .party
            .members()
            .iter()
            .map(|a| self.map.classify_at(self.map.world_to_grid(a.position)))
            .collect();

        for (i, class) in classes.into_iter().enumerate() {
            match class {
                TileClass::Landmark(name) if i == 0 => {
                    self.narrate(&format!("Thou hast discovered a {name}!"));
                    self.sound(Cue::Enter);
                }
                TileClass::Hill if i == 0 => {
                    self.movement_delay = self.timing.hill_delay;
                }
                TileClass::Swamp => {
                    self.flash.trigger(self.timing.swamp_flash);
                    self.movement_delay = self.timing.swamp_delay;
                    self.narrate(SWAMP_TEXT);
                    self.sound(Cue::Swamp);
                }
                _ => {}
            }
        }

        if self.encounter.tick() == 0 {
            self.set_state(WorldState::Battle);
        } else {
            self.set_state(WorldState::Idle);
        }
    }

    fn narrate(&mut self, text: &str) {
        self.events.push(WorldEvent::narrate(text));
    }

    fn sound(&mut self, cue: Cue) {
        self.events.push(WorldEvent::Sound(cue));
    }
}

#[cfg(test)]
impl Overworld {
    pub(crate) fn encounter_mut(&mut self) -> &mut EncounterClock {
        &mut self.encounter
    }
}
