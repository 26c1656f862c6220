pub mod cue;
pub mod effects;
pub mod encounter;
pub mod event;
pub mod motion;
pub mod narrative;
pub mod world;
