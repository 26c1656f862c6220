/// Entry point and frame loop.

mod ui;

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use overworld::config::GameConfig;
use overworld::domain::direction::HeldKeys;
use overworld::domain::grid::GridMap;
use overworld::error::MapError;
use overworld::sim::cue::play_cue;
use overworld::sim::event::WorldEvent;
use overworld::sim::narrative::NarrativeLog;
use overworld::sim::world::{FrameInput, Overworld};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let (config, config_err) = match GameConfig::load() {
        Ok(c) => (c, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };
    init_logging(&config);
    if let Some(e) = config_err {
        eprintln!("config: {e} (using defaults)");
        warn!(error = %e, "config_invalid_using_defaults");
    }

    let map = match build_map(&config) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("map: {e}");
            std::process::exit(1);
        }
    };
    info!(map = map.name(), width = map.width(), height = map.height(), spawn = %map.spawn(), "map_loaded");

    let mut world = Overworld::from_config(&config, map);
    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut sound = SoundEngine::new();
    let result = game_loop(&mut world, &mut renderer, &mut sound, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    info!(ticks = world.ticks(), "overworld_exit");
}

/// The terminal owns stdout/stderr, so traces only go to a configured file.
fn init_logging(config: &GameConfig) {
    let Some(path) = &config.log_file else { return };
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("log file {}: {e}", path.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn build_map(config: &GameConfig) -> Result<GridMap, MapError> {
    let tile_size = config.map.tile_size;
    let map = match &config.map.path {
        Some(path) => GridMap::load(path, tile_size)?,
        None => GridMap::builtin(tile_size),
    };
    match config.map.spawn {
        Some(spawn) => map.with_spawn(spawn),
        None => Ok(map),
    }
}

fn game_loop(
    world: &mut Overworld,
    renderer: &mut Renderer,
    sound: &mut Option<SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new().honor_release(renderer.reports_key_release());
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut log = NarrativeLog::default();
    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms.max(1));
    let mut last_tick = Instant::now();
    // Edge presses arrive per frame; hold them until the next tick consumes them.
    let mut toggle_pending = false;

    dispatch(&world.boot(), sound, &mut log);

    loop {
        kb.drain_events();
        gp.update();

        if kb.quit_pressed() || gp.quit_pressed() {
            break;
        }
        if kb.toggle_debug_pressed() || gp.toggle_debug_pressed() {
            toggle_pending = true;
        }

        if last_tick.elapsed() >= tick_rate {
            let held = merge_held(kb.held_keys(), gp.held_keys());
            let input = FrameInput {
                direction: held.resolve(),
                toggle_debug: std::mem::take(&mut toggle_pending),
            };
            let events = world.tick(input);
            dispatch(&events, sound, &mut log);
            last_tick = Instant::now();
        }

        renderer.render(world, &log)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn merge_held(a: HeldKeys, b: HeldKeys) -> HeldKeys {
    HeldKeys {
        up: a.up || b.up,
        down: a.down || b.down,
        left: a.left || b.left,
        right: a.right || b.right,
    }
}

fn dispatch(events: &[WorldEvent], sound: &mut Option<SoundEngine>, log: &mut NarrativeLog) {
    for event in events {
        match event {
            WorldEvent::Sound(cue) => {
                if let Some(sfx) = sound.as_mut() {
                    play_cue(sfx, *cue);
                }
            }
            WorldEvent::Narrate(text) => log.push(text),
            WorldEvent::StateChanged { .. } | WorldEvent::EncounterStarted | WorldEvent::EncounterEnded => {}
        }
    }
}
