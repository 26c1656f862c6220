/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into the `front` buffer (grid of Cell)
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Emit terminal commands only for cells that changed, batched with `queue!`
///   4. Flush once, then swap front/back
///
/// Screen layout:
///
/// ```text
///   row 0   HUD: map name, leader cell, state
///   row 2+  map viewport (camera on the leader)   │ narrative log
///                                                 │ debug overlay (toggle)
///   last    key help
/// ```

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use overworld::domain::direction::Direction;
use overworld::domain::grid::GridCoord;
use overworld::domain::party::{Actor, ActorClass};
use overworld::domain::tile::TileId;
use overworld::sim::effects::Rgb;
use overworld::sim::narrative::NarrativeLog;
use overworld::sim::world::Overworld;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 0, g: 0, b: 0 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never produced by composition, so a back buffer full of these
    /// forces every position through the diff.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// One column per char; clipped at `max_x`.
    fn put_str(&mut self, x: usize, y: usize, s: &str, max_x: usize, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            let cx = x + i;
            if cx >= max_x.min(self.width) { break; }
            self.set(cx, y, Cell::new(ch, fg, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Camera ──

/// Top-left map cell of the viewport.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Camera {
    pub x: i32,
    pub y: i32,
    pub view_w: usize,
    pub view_h: usize,
}

impl Camera {
    /// Centre on `focus`, clamped so the view never scrolls past a map edge.
    /// A map smaller than the view is centred inside it instead.
    pub fn center_on(&mut self, focus: GridCoord, map_w: usize, map_h: usize) {
        self.x = axis_origin(focus.x, self.view_w, map_w);
        self.y = axis_origin(focus.y, self.view_h, map_h);
    }
}

fn axis_origin(focus: i32, view: usize, map: usize) -> i32 {
    let (view, map) = (view as i32, map as i32);
    if map <= view {
        return -(view - map) / 2;
    }
    (focus - view / 2).clamp(0, map - view)
}

// ── Glyphs ──

/// Two terminal columns per map cell.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const PANEL_W: usize = 32;
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

/// (left, right, fg, bg) for a map tile. `None` for the empty tile, which
/// shows the backdrop.
fn tile_style(id: TileId) -> Option<(char, char, Color, Color)> {
    let style = match id {
        TileId::CASTLE => ('▛', '▜', Color::Rgb { r: 240, g: 240, b: 240 }, Color::Rgb { r: 60, g: 110, b: 40 }),
        TileId::TOWN => ('⌂', '⌂', Color::Rgb { r: 250, g: 200, b: 120 }, Color::Rgb { r: 60, g: 110, b: 40 }),
        TileId::GRASS => ('·', ' ', Color::Rgb { r: 90, g: 160, b: 70 }, Color::Rgb { r: 60, g: 110, b: 40 }),
        TileId::FOREST => ('♣', '♣', Color::Rgb { r: 20, g: 90, b: 20 }, Color::Rgb { r: 50, g: 100, b: 35 }),
        TileId::HILL => ('∩', '∩', Color::Rgb { r: 150, g: 130, b: 70 }, Color::Rgb { r: 70, g: 110, b: 45 }),
        TileId::WATER => ('≈', '≈', Color::Rgb { r: 120, g: 170, b: 255 }, Color::Rgb { r: 20, g: 50, b: 150 }),
        TileId::DUNGEON => ('▼', '▼', Color::Rgb { r: 230, g: 60, b: 60 }, Color::Rgb { r: 40, g: 30, b: 30 }),
        TileId::DESERT => ('.', '.', Color::Rgb { r: 200, g: 170, b: 90 }, Color::Rgb { r: 210, g: 190, b: 120 }),
        TileId::SWAMP => ('~', ',', Color::Rgb { r: 120, g: 160, b: 60 }, Color::Rgb { r: 60, g: 70, b: 40 }),
        TileId::BRIDGE => ('═', '═', Color::Rgb { r: 160, g: 110, b: 60 }, Color::Rgb { r: 20, g: 50, b: 150 }),
        TileId::SHRINE => ('†', '†', Color::Rgb { r: 255, g: 240, b: 150 }, Color::Rgb { r: 60, g: 110, b: 40 }),
        TileId::ROAD => ('░', '░', Color::Rgb { r: 170, g: 150, b: 120 }, Color::Rgb { r: 110, g: 95, b: 70 }),
        TileId::MOUNTAIN => ('▲', '▲', Color::Rgb { r: 200, g: 200, b: 200 }, Color::Rgb { r: 90, g: 80, b: 70 }),
        TileId::WALL => ('█', '█', Color::Rgb { r: 120, g: 120, b: 120 }, Color::Rgb { r: 70, g: 70, b: 70 }),
        TileId::NONE => return None,
        _ => ('?', '?', Color::Magenta, Color::Black),
    };
    Some(style)
}

fn class_glyph(class: ActorClass) -> (char, Color) {
    match class {
        ActorClass::Hero => ('H', Color::Rgb { r: 255, g: 230, b: 80 }),
        ActorClass::Soldier => ('S', Color::Rgb { r: 220, g: 220, b: 230 }),
        ActorClass::Sage => ('G', Color::Rgb { r: 120, g: 220, b: 255 }),
        ActorClass::Jester => ('J', Color::Rgb { r: 255, g: 120, b: 200 }),
        ActorClass::Wizard => ('W', Color::Rgb { r: 180, g: 120, b: 255 }),
        ActorClass::Merchant => ('M', Color::Rgb { r: 240, g: 170, b: 60 }),
        ActorClass::Priest => ('P', Color::Rgb { r: 255, g: 255, b: 255 }),
        ActorClass::Fighter => ('F', Color::Rgb { r: 255, g: 90, b: 70 }),
    }
}

fn pose_glyph(facing: Direction) -> char {
    match facing.pose_key() {
        Some("n") => '^',
        Some("s") => 'v',
        Some("e") => '>',
        Some("w") => '<',
        _ => ' ',
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    camera: Camera,
    /// Terminal accepted the kitty keyboard protocol, so Release events arrive.
    key_release: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            camera: Camera::default(),
            key_release: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )?;
            self.key_release = true;
        }
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    /// Whether key Release events will be delivered.
    pub fn reports_key_release(&self) -> bool {
        self.key_release
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.key_release {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.key_release = false;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        self.back.fill(Cell::INVALID);
    }

    pub fn render(&mut self, world: &Overworld, log: &NarrativeLog) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.compose(world, log);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, w: &Overworld, log: &NarrativeLog) {
        let backdrop = rgb(w.backdrop());
        self.front.fill(Cell::new(' ', Color::White, backdrop));

        let panel_x = self.term_w.saturating_sub(PANEL_W);
        let map = w.map();
        self.camera.view_w = panel_x.saturating_sub(1) / CELL_W;
        self.camera.view_h = self.term_h.saturating_sub(MAP_ROW + 2);
        let focus = w.leader_cell().unwrap_or_else(|| map.spawn());
        self.camera.center_on(focus, map.width(), map.height());

        self.compose_hud(w, focus);
        self.compose_map(w, backdrop);
        self.compose_party(w);
        self.compose_panel(w, log, panel_x);

        let help = " Arrows/WASD:Move  Enter:Debug  Esc:Quit";
        let last = self.term_h.saturating_sub(1);
        self.front.put_str(0, last, help, self.term_w, Color::DarkGrey, backdrop);
    }

    fn compose_hud(&mut self, w: &Overworld, focus: GridCoord) {
        for x in 0..self.term_w {
            self.front.set(x, HUD_ROW, Cell::new(' ', Color::White, HUD_BG));
        }
        let hud = format!(" {}  {}  [{:?}]", w.map().name(), focus, w.state());
        self.front.put_str(0, HUD_ROW, &hud, self.term_w, Color::White, HUD_BG);
    }

    fn compose_map(&mut self, w: &Overworld, backdrop: Color) {
        let cam = self.camera;
        for vy in 0..cam.view_h {
            let row = MAP_ROW + vy;
            for vx in 0..cam.view_w {
                let col = vx * CELL_W;
                let cell = GridCoord::new(cam.x + vx as i32, cam.y + vy as i32);
                let (c0, c1, fg, bg) = match tile_style(w.map().tile_at(cell)) {
                    Some(style) => style,
                    None => (' ', ' ', Color::White, backdrop),
                };
                self.front.set(col, row, Cell::new(c0, fg, bg));
                self.front.set(col + 1, row, Cell::new(c1, fg, bg));
            }
        }
    }

    /// Back to front so the leader is drawn over anyone sharing its cell.
    fn compose_party(&mut self, w: &Overworld) {
        for actor in w.party().members().iter().rev() {
            let cell = w.map().world_to_grid(actor.position);
            if let Some((col, row)) = self.screen_pos(cell) {
                let bg = self.front.get(col, row).bg;
                let (left, right) = actor_cells(actor, bg);
                self.front.set(col, row, left);
                self.front.set(col + 1, row, right);
            }
        }
    }

    fn screen_pos(&self, cell: GridCoord) -> Option<(usize, usize)> {
        let vx = cell.x - self.camera.x;
        let vy = cell.y - self.camera.y;
        if vx < 0 || vy < 0 || vx as usize >= self.camera.view_w || vy as usize >= self.camera.view_h {
            return None;
        }
        Some((vx as usize * CELL_W, MAP_ROW + vy as usize))
    }

    fn compose_panel(&mut self, w: &Overworld, log: &NarrativeLog, x: usize) {
        let fg = Color::Rgb { r: 230, g: 230, b: 230 };
        let bg = Cell::BASE_BG;
        for y in MAP_ROW..self.term_h.saturating_sub(1) {
            for cx in x..self.term_w {
                self.front.set(cx, y, Cell::new(' ', fg, bg));
            }
            if x > 0 {
                self.front.set(x - 1, y, Cell::new('│', Color::DarkGrey, bg));
            }
        }

        let mut y = MAP_ROW;
        self.front.put_str(x + 1, y, "── Log ──", self.term_w, Color::Yellow, bg);
        y += 1;
        for line in log.visible_lines() {
            self.front.put_str(x + 1, y, line, self.term_w, fg, bg);
            y += 1;
        }

        if w.overlay().is_visible() {
            y += 1;
            self.front.put_str(x + 1, y, "── Debug ──", self.term_w, Color::Cyan, bg);
            y += 1;
            for line in w.overlay().text().lines() {
                if y + 1 >= self.term_h { break; }
                self.front.put_str(x + 1, y, line, self.term_w, Color::Grey, bg);
                y += 1;
            }
        }
    }
}

fn actor_cells(actor: &Actor, bg: Color) -> (Cell, Cell) {
    let (glyph, fg) = class_glyph(actor.class);
    (Cell::new(glyph, fg, bg), Cell::new(pose_glyph(actor.facing), fg, bg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use overworld::config::TimingConfig;
    use overworld::domain::grid::GridMap;
    use overworld::domain::party::ActorDecl;
    use overworld::sim::encounter::{EncounterClock, DEFAULT_RANGE};
    use overworld::sim::world::FrameInput;

    #[test]
    fn camera_clamps_to_map_edges() {
        let mut cam = Camera { view_w: 10, view_h: 6, ..Camera::default() };
        cam.center_on(GridCoord::new(1, 1), 40, 30);
        assert_eq!((cam.x, cam.y), (0, 0));
        cam.center_on(GridCoord::new(39, 29), 40, 30);
        assert_eq!((cam.x, cam.y), (30, 24));
        cam.center_on(GridCoord::new(20, 15), 40, 30);
        assert_eq!((cam.x, cam.y), (15, 12));
    }

    #[test]
    fn small_map_is_centred() {
        let mut cam = Camera { view_w: 10, view_h: 10, ..Camera::default() };
        cam.center_on(GridCoord::new(1, 1), 4, 10);
        assert_eq!((cam.x, cam.y), (-3, 0));
    }

    #[test]
    fn every_authored_tile_has_a_style() {
        for id in 0..=13 {
            let (_, _, fg, _) = tile_style(TileId(id)).expect("styled");
            assert_ne!(fg, Color::Magenta, "tile {id}");
        }
        assert!(tile_style(TileId::NONE).is_none());
    }

    #[test]
    fn compose_draws_party_log_and_debug() {
        let map = GridMap::parse("@ 1,1\n...\n...\n...", 16.0).unwrap();
        let roster = vec![
            ActorDecl::new("Mira", ActorClass::Sage),
            ActorDecl::new("Aldo", ActorClass::Hero),
        ];
        let timing = TimingConfig {
            tick_rate_ms: 16,
            tile_move_ticks: 2,
            hill_delay: 10,
            swamp_delay: 10,
            swamp_flash: 10,
            battle_delay: 120,
        };
        let mut world = Overworld::new(map, roster, timing, EncounterClock::from_seed(DEFAULT_RANGE, Some(9)));
        world.boot();
        world.tick(FrameInput { direction: Direction::Zero, toggle_debug: true });

        let mut log = NarrativeLog::default();
        log.push("Thou hast discovered a Town!");

        let mut r = Renderer::new();
        r.front.resize(80, 24);
        r.term_w = 80;
        r.term_h = 24;
        r.compose(&world, &log);

        // 3x3 map in a wide view: centred, leader drawn on top at (1,1).
        let (col, row) = r.screen_pos(GridCoord::new(1, 1)).unwrap();
        assert_eq!(r.front.get(col, row).ch, 'H');
        assert_eq!(r.front.get(col + 1, row).ch, 'v');

        let panel: Vec<String> = (MAP_ROW..24).map(|y| r.front.row_text(y)).collect();
        assert!(panel.iter().any(|l| l.contains("Thou hast discovered a Town!")));
        assert!(panel.iter().any(|l| l.contains("Next Battle:")));
        assert!(r.front.row_text(HUD_ROW).contains("(1, 1)"));
    }
}
