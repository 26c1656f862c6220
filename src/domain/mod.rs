pub mod direction;
pub mod grid;
pub mod party;
pub mod tile;
