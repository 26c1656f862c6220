use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("encounter range [{min}, {max}) must be non-empty and start above zero")]
    EncounterRange { min: u32, max: u32 },
    #[error("tile_size must be positive, got {0}")]
    TileSize(f32),
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("could not read map {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("map has no rows")]
    Empty,
    #[error("unknown glyph '{glyph}' at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
    #[error("malformed spawn line: {0}")]
    BadSpawn(String),
    #[error("spawn ({x}, {y}) lies outside the map")]
    SpawnOutside { x: i32, y: i32 },
}
