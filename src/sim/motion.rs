/// MotionController: tick-driven position interpolation for a whole party.
///
/// Lifecycle of one batch:
///   1. `begin_move` queues a tween per actor (rejected while a batch runs).
///   2. `start` launches every queued tween together.
///   3. `advance` is called once per tick; it writes interpolated positions
///      and returns `MotionFinished` exactly once, on the tick the slowest
///      tween lands.
///
/// There is no cancellation: a started batch always runs to completion.

use thiserror::Error;
use tracing::trace;

use crate::domain::grid::WorldPos;
use crate::domain::party::PartyChain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MotionError {
    #[error("a movement batch is already in flight")]
    InFlight,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub member: usize,
    pub from: WorldPos,
    pub to: WorldPos,
    pub duration: u32,
    elapsed: u32,
}

impl Tween {
    fn progress(&self) -> f32 {
        if self.duration == 0 { return 1.0; }
        self.elapsed as f32 / self.duration as f32
    }

    fn done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Completion signal for one batch. `batch` matches the id `start` returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionFinished {
    pub batch: u64,
}

#[derive(Debug, Default)]
pub struct MotionController {
    queued: Vec<Tween>,
    running: Vec<Tween>,
    batch: u64,
}

impl MotionController {
    pub fn new() -> Self {
        MotionController::default()
    }

    pub fn begin_move(
        &mut self,
        member: usize,
        from: WorldPos,
        to: WorldPos,
        duration: u32,
    ) -> Result<(), MotionError> {
        if self.is_busy() {
            return Err(MotionError::InFlight);
        }
        self.queued.push(Tween { member, from, to, duration, elapsed: 0 });
        Ok(())
    }

    /// Launch everything queued. Returns the batch id, or `None` when there
    /// is nothing to start or a batch is already running.
    pub fn start(&mut self) -> Option<u64> {
        if self.is_busy() || self.queued.is_empty() {
            return None;
        }
        self.batch += 1;
        self.running = std::mem::take(&mut self.queued);
        trace!(batch = self.batch, tweens = self.running.len(), "motion_batch_started");
        Some(self.batch)
    }

    pub fn is_busy(&self) -> bool {
        !self.running.is_empty()
    }

    pub fn queued(&self) -> usize {
        self.queued.len()
    }

    /// Step every running tween by one tick and write positions into the
    /// party. Landed tweens snap exactly onto their target.
    pub fn advance(&mut self, party: &mut PartyChain) -> Option<MotionFinished> {
        if self.running.is_empty() {
            return None;
        }

        for tween in &mut self.running {
            tween.elapsed = (tween.elapsed + 1).min(tween.duration);
            let pos = if tween.done() { tween.to } else { tween.from.lerp(tween.to, tween.progress()) };
            party.place(tween.member, pos);
        }

        if self.running.iter().all(Tween::done) {
            self.running.clear();
            trace!(batch = self.batch, "motion_batch_finished");
            return Some(MotionFinished { batch: self.batch });
        }
        None
    }
}
