/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or the
/// per-user data directory. A missing file means defaults; missing keys fall
/// back one by one. Relative paths inside the file resolve against the
/// directory the file was found in.

use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::grid::GridCoord;
use crate::domain::party::{ActorClass, ActorDecl};
use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "config.toml";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub encounter: EncounterConfig,
    pub map: MapConfig,
    pub party: Vec<ActorDecl>,
    pub gamepad: GamepadConfig,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

/// All durations are in ticks unless suffixed otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub tile_move_ticks: u32, // one movement batch
    pub hill_delay: u32,
    pub swamp_delay: u32,
    pub swamp_flash: u32,
    pub battle_delay: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncounterConfig {
    pub min: u32, // inclusive
    pub max: u32, // exclusive
    pub seed: Option<u64>,
}

impl EncounterConfig {
    pub fn range(&self) -> Range<u32> {
        self.min..self.max
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapConfig {
    pub path: Option<PathBuf>,
    pub spawn: Option<GridCoord>,
    pub tile_size: f32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamepadConfig {
    pub toggle_debug: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    encounter: TomlEncounter,
    #[serde(default)]
    map: TomlMap,
    #[serde(default = "default_party")]
    party: Vec<TomlActor>,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_tile_move")]
    tile_move_ticks: u32,
    #[serde(default = "default_hill_delay")]
    hill_delay: u32,
    #[serde(default = "default_swamp_delay")]
    swamp_delay: u32,
    #[serde(default = "default_swamp_flash")]
    swamp_flash: u32,
    #[serde(default = "default_battle_delay")]
    battle_delay: u32,
}

#[derive(Deserialize, Debug)]
struct TomlEncounter {
    #[serde(default = "default_encounter_min")]
    min: u32,
    #[serde(default = "default_encounter_max")]
    max: u32,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlMap {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    spawn: Option<[i32; 2]>,
    #[serde(default = "default_tile_size")]
    tile_size: f32,
}

#[derive(Deserialize, Debug, Clone)]
struct TomlActor {
    name: String,
    #[serde(default)]
    class: ActorClass,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_toggle_debug")]
    toggle_debug: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    log_file: Option<String>,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }
fn default_tile_move() -> u32 { 30 }     // 0.5s at ~60 ticks/s
fn default_hill_delay() -> u32 { 10 }
fn default_swamp_delay() -> u32 { 10 }
fn default_swamp_flash() -> u32 { 10 }
fn default_battle_delay() -> u32 { 120 } // ~2s of stand-still after an encounter
fn default_encounter_min() -> u32 { 5 }
fn default_encounter_max() -> u32 { 64 }
fn default_tile_size() -> f32 { 16.0 }
fn default_log_level() -> String { "info".into() }

fn default_party() -> Vec<TomlActor> {
    vec![
        TomlActor { name: "Mira".into(), class: ActorClass::Sage },
        TomlActor { name: "Bram".into(), class: ActorClass::Soldier },
        TomlActor { name: "Aldo".into(), class: ActorClass::Hero },
    ]
}

fn default_toggle_debug() -> Vec<String> { vec!["A".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            tile_move_ticks: default_tile_move(),
            hill_delay: default_hill_delay(),
            swamp_delay: default_swamp_delay(),
            swamp_flash: default_swamp_flash(),
            battle_delay: default_battle_delay(),
        }
    }
}

impl Default for TomlEncounter {
    fn default() -> Self {
        TomlEncounter {
            min: default_encounter_min(),
            max: default_encounter_max(),
            seed: None,
        }
    }
}

impl Default for TomlMap {
    fn default() -> Self {
        TomlMap { path: None, spawn: None, tile_size: default_tile_size() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            toggle_debug: default_toggle_debug(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { log_file: None, log_level: default_log_level() }
    }
}

// ── Conversion + validation ──

impl TryFrom<TomlConfig> for GameConfig {
    type Error = ConfigError;

    fn try_from(toml_cfg: TomlConfig) -> Result<Self, ConfigError> {
        let enc = &toml_cfg.encounter;
        if enc.min == 0 || enc.max <= enc.min {
            return Err(ConfigError::EncounterRange { min: enc.min, max: enc.max });
        }
        let tile_size = toml_cfg.map.tile_size;
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(ConfigError::TileSize(tile_size));
        }
        Ok(convert(toml_cfg))
    }
}

fn convert(toml_cfg: TomlConfig) -> GameConfig {
    GameConfig {
        timing: TimingConfig {
            tick_rate_ms: toml_cfg.timing.tick_rate_ms,
            tile_move_ticks: toml_cfg.timing.tile_move_ticks,
            hill_delay: toml_cfg.timing.hill_delay,
            swamp_delay: toml_cfg.timing.swamp_delay,
            swamp_flash: toml_cfg.timing.swamp_flash,
            battle_delay: toml_cfg.timing.battle_delay,
        },
        encounter: EncounterConfig {
            min: toml_cfg.encounter.min,
            max: toml_cfg.encounter.max,
            seed: toml_cfg.encounter.seed,
        },
        map: MapConfig {
            path: toml_cfg.map.path.map(PathBuf::from),
            spawn: toml_cfg.map.spawn.map(|[x, y]| GridCoord::new(x, y)),
            tile_size: toml_cfg.map.tile_size,
        },
        party: toml_cfg
            .party
            .into_iter()
            .map(|a| ActorDecl { name: a.name, class: a.class })
            .collect(),
        gamepad: GamepadConfig {
            toggle_debug: toml_cfg.gamepad.toggle_debug,
            quit: toml_cfg.gamepad.quit,
        },
        log_file: toml_cfg.general.log_file.map(PathBuf::from),
        log_level: toml_cfg.general.log_level,
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        convert(TomlConfig { party: default_party(), ..TomlConfig::default() })
    }
}

// ── Loading ──

impl GameConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let toml_cfg: TomlConfig = toml::from_str(text)?;
        GameConfig::try_from(toml_cfg)
    }

    /// Search the candidate directories for `config.toml`.
    /// No file anywhere is not an error: defaults apply.
    pub fn load() -> Result<Self, ConfigError> {
        let found = candidate_dirs()
            .into_iter()
            .map(|d| d.join(CONFIG_FILE))
            .find(|p| p.is_file());
        match found {
            Some(path) => GameConfig::load_from(&path),
            None => Ok(GameConfig::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg = GameConfig::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            cfg.resolve_relative_to(base);
        }
        Ok(cfg)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        if let Some(p) = self.map.path.as_mut() {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
        if let Some(p) = self.log_file.as_mut() {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }
}

/// Candidate directories to search: exe dir + CWD + user data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/overworld)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/overworld");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.timing.tile_move_ticks, 30);
        assert_eq!(cfg.timing.hill_delay, 10);
        assert_eq!(cfg.timing.battle_delay, 120);
        assert_eq!(cfg.encounter.range(), 5..64);
        assert_eq!(cfg.map.tile_size, 16.0);
        assert_eq!(cfg.party.len(), 3);
        assert_eq!(cfg.party[2].name, "Aldo");
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn default_matches_empty_file() {
        let a = GameConfig::default();
        let b = GameConfig::from_toml_str("").unwrap();
        assert_eq!(a.timing, b.timing);
        assert_eq!(a.encounter, b.encounter);
        assert_eq!(a.party, b.party);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[timing]\ntile_move_ticks = 4\n\n[encounter]\nseed = 99\n",
        )
        .unwrap();
        assert_eq!(cfg.timing.tile_move_ticks, 4);
        assert_eq!(cfg.timing.swamp_flash, 10);
        assert_eq!(cfg.encounter.seed, Some(99));
        assert_eq!(cfg.encounter.min, 5);
    }

    #[test]
    fn party_declaration_order_is_kept() {
        let cfg = GameConfig::from_toml_str(
            r#"
            [[party]]
            name = "A"
            class = "wizard"

            [[party]]
            name = "B"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.party, vec![
            ActorDecl::new("A", ActorClass::Wizard),
            ActorDecl::new("B", ActorClass::Hero),
        ]);
    }

    #[test]
    fn explicit_empty_party_is_allowed() {
        let cfg = GameConfig::from_toml_str("party = []\n").unwrap();
        assert!(cfg.party.is_empty());
    }

    #[test]
    fn map_section() {
        let cfg = GameConfig::from_toml_str("[map]\npath = \"maps/isle.txt\"\nspawn = [3, 4]\ntile_size = 8.0\n").unwrap();
        assert_eq!(cfg.map.path, Some(PathBuf::from("maps/isle.txt")));
        assert_eq!(cfg.map.spawn, Some(GridCoord::new(3, 4)));
        assert_eq!(cfg.map.tile_size, 8.0);
    }

    #[test]
    fn rejects_zero_or_empty_encounter_range() {
        let err = GameConfig::from_toml_str("[encounter]\nmin = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::EncounterRange { min: 0, max: 64 }));
        let err = GameConfig::from_toml_str("[encounter]\nmin = 10\nmax = 10\n").unwrap_err();
        assert!(matches!(err, ConfigError::EncounterRange { .. }));
    }

    #[test]
    fn rejects_bad_tile_size() {
        let err = GameConfig::from_toml_str("[map]\ntile_size = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::TileSize(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = GameConfig::from_toml_str("[timing\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "[map]\npath = \"isle.txt\"\n\n[general]\nlog_file = \"overworld.log\"\n",
        )
        .unwrap();
        let cfg = GameConfig::load_from(&path).unwrap();
        assert_eq!(cfg.map.path, Some(dir.path().join("isle.txt")));
        assert_eq!(cfg.log_file, Some(dir.path().join("overworld.log")));
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
