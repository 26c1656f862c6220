/// Overworld exploration core: a party walking a tile grid, tile events,
/// random encounters. The terminal front end lives in the binary.

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;
