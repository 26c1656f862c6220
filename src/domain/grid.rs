/// GridMap: the read-only tile grid the party walks on.
///
/// ## Coordinates
///
/// Two spaces, converted only here:
///   - `GridCoord`: integer cell index, `(0, 0)` top-left, `+y` is south.
///   - `WorldPos`: continuous position in world units. A cell spans
///     `[c * tile_size, (c + 1) * tile_size)` on each axis.
///
/// `grid_to_world` yields the cell centre, so
/// `world_to_grid(grid_to_world(c)) == c` for every cell.
///
/// ## Map text format
///
///   ```text
///   ## Map Name
///   @ 2,2
///   <rows of glyphs>
///   ```
///
/// `##` lines are metadata (the first names the map), `@ x,y` sets the spawn
/// cell. Rows may be ragged; missing cells are empty.
///
/// ## Glyph legend:
///   'C' = Castle     'T' = Town       'D' = Dungeon    'S' = Shrine
///   '.' = Grass      'f' = Forest     ',' = Desert     '_' = Road
///   '=' = Bridge     '^' = Hill       '%' = Swamp
///   '~' = Water      'M' = Mountain   '#' = Wall
///   'P' = Grass + spawn marker        ' ' = empty (no tile)

use std::fmt;
use std::ops::{Add, Sub};
use std::path::Path;

use crate::error::MapError;
use super::tile::{TileClass, TileId, TileTable};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        GridCoord { x, y }
    }
}

impl Add for GridCoord {
    type Output = GridCoord;
    fn add(self, rhs: GridCoord) -> GridCoord {
        GridCoord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for GridCoord {
    type Output = GridCoord;
    fn sub(self, rhs: GridCoord) -> GridCoord {
        GridCoord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32) -> Self {
        WorldPos { x, y }
    }

    /// Linear interpolation; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, to: WorldPos, t: f32) -> WorldPos {
        let t = t.clamp(0.0, 1.0);
        WorldPos::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }

    /// Nearest integer, ties to even.
    pub fn rounded(self) -> (i64, i64) {
        (self.x.round_ties_even() as i64, self.y.round_ties_even() as i64)
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.rounded();
        write!(f, "({x}, {y})")
    }
}

#[derive(Clone, Debug)]
pub struct GridMap {
    name: String,
    width: usize,
    height: usize,
    /// Row-major, `width * height`.
    cells: Vec<TileId>,
    tile_size: f32,
    table: TileTable,
    spawn: GridCoord,
}

// ── Construction ──

impl GridMap {
    /// Build from explicit rows of tile ids. Short rows are padded with
    /// `TileId::NONE`. Spawn defaults to the map centre.
    pub fn from_rows(name: &str, rows: Vec<Vec<TileId>>, tile_size: f32) -> Result<Self, MapError> {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MapError::Empty);
        }
        let mut cells = vec![TileId::NONE; width * height];
        for (y, row) in rows.iter().enumerate() {
            cells[y * width..y * width + row.len()].copy_from_slice(row);
        }
        Ok(GridMap {
            name: name.to_string(),
            width,
            height,
            cells,
            tile_size,
            table: TileTable::overworld(),
            spawn: GridCoord::new((width / 2) as i32, (height / 2) as i32),
        })
    }

    /// Parse the glyph text format described at the top of this module.
    pub fn parse(text: &str, tile_size: f32) -> Result<Self, MapError> {
        let mut name: Option<String> = None;
        let mut spawn: Option<GridCoord> = None;
        let mut marker: Option<GridCoord> = None;
        let mut rows: Vec<Vec<TileId>> = Vec::new();

        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            if let Some(meta) = line.strip_prefix("##") {
                if name.is_none() {
                    name = Some(meta.trim().to_string());
                }
                continue;
            }
            if let Some(rest) = line.strip_prefix('@') {
                spawn = Some(parse_spawn(rest)?);
                continue;
            }

            let y = rows.len();
            let mut row = Vec::with_capacity(line.len());
            for (x, ch) in line.chars().enumerate() {
                let id = tile_for_glyph(ch)
                    .ok_or(MapError::UnknownGlyph { glyph: ch, x, y })?;
                if ch == 'P' && marker.is_none() {
                    marker = Some(GridCoord::new(x as i32, y as i32));
                }
                row.push(id);
            }
            rows.push(row);
        }

        let mut map = GridMap::from_rows(name.as_deref().unwrap_or("Untitled"), rows, tile_size)?;
        if let Some(at) = spawn.or(marker) {
            if !map.in_bounds(at) {
                return Err(MapError::SpawnOutside { x: at.x, y: at.y });
            }
            map.spawn = at;
        }
        Ok(map)
    }

    pub fn load(path: &Path, tile_size: f32) -> Result<Self, MapError> {
        let text = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        GridMap::parse(&text, tile_size)
    }

    /// Map compiled into the binary, used when no map file is configured.
    pub fn builtin(tile_size: f32) -> Self {
        match GridMap::parse(BUILTIN_MAP, tile_size) {
            Ok(map) => map,
            // The embedded text is covered by tests; this arm cannot be reached.
            Err(_) => GridMap {
                name: "Void".into(),
                width: 1,
                height: 1,
                cells: vec![TileId::GRASS],
                tile_size,
                table: TileTable::overworld(),
                spawn: GridCoord::new(0, 0),
            },
        }
    }

    pub fn with_spawn(mut self, spawn: GridCoord) -> Result<Self, MapError> {
        if !self.in_bounds(spawn) {
            return Err(MapError::SpawnOutside { x: spawn.x, y: spawn.y });
        }
        self.spawn = spawn;
        Ok(self)
    }
}

// ── Queries ──

impl GridMap {
    pub fn name(&self) -> &str { &self.name }
    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn tile_size(&self) -> f32 { self.tile_size }
    pub fn spawn(&self) -> GridCoord { self.spawn }
    pub fn table(&self) -> &TileTable { &self.table }

    #[inline]
    pub fn in_bounds(&self, c: GridCoord) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as usize) < self.width && (c.y as usize) < self.height
    }

    /// Tile id at a cell. Outside the map this is `TileId::NONE`.
    #[inline]
    pub fn tile_at(&self, c: GridCoord) -> TileId {
        if self.in_bounds(c) {
            self.cells[c.y as usize * self.width + c.x as usize]
        } else {
            TileId::NONE
        }
    }

    pub fn world_to_grid(&self, p: WorldPos) -> GridCoord {
        GridCoord::new(
            (p.x / self.tile_size).floor() as i32,
            (p.y / self.tile_size).floor() as i32,
        )
    }

    /// Centre of the cell in world units.
    pub fn grid_to_world(&self, c: GridCoord) -> WorldPos {
        WorldPos::new(
            (c.x as f32 + 0.5) * self.tile_size,
            (c.y as f32 + 0.5) * self.tile_size,
        )
    }

    pub fn classify(&self, id: TileId) -> TileClass {
        self.table.classify(id)
    }

    pub fn is_passable(&self, id: TileId) -> bool {
        self.table.is_passable(id)
    }

    #[inline]
    pub fn classify_at(&self, c: GridCoord) -> TileClass {
        self.classify(self.tile_at(c))
    }
}

fn parse_spawn(rest: &str) -> Result<GridCoord, MapError> {
    let bad = || MapError::BadSpawn(rest.trim().to_string());
    let (xs, ys) = rest.trim().split_once(',').ok_or_else(bad)?;
    let x = xs.trim().parse::<i32>().map_err(|_| bad())?;
    let y = ys.trim().parse::<i32>().map_err(|_| bad())?;
    Ok(GridCoord::new(x, y))
}

pub fn tile_for_glyph(ch: char) -> Option<TileId> {
    let id = match ch {
        'C' => TileId::CASTLE,
        'T' => TileId::TOWN,
        '.' | 'P' => TileId::GRASS,
        'f' => TileId::FOREST,
        '^' => TileId::HILL,
        '~' => TileId::WATER,
        'D' => TileId::DUNGEON,
        ',' => TileId::DESERT,
        '%' => TileId::SWAMP,
        '=' => TileId::BRIDGE,
        'S' => TileId::SHRINE,
        '_' => TileId::ROAD,
        'M' => TileId::MOUNTAIN,
        '#' => TileId::WALL,
        ' ' => TileId::NONE,
        _ => return None,
    };
    Some(id)
}

const BUILTIN_MAP: &str = "\
## Midland
~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
~~..ff^^MMMM....,,,,,,...~~~~~
~..C..f^^MM..T..,,,D,,....~~~~
~.._...ff...._..,,,,,,..%%%~~~
~..____________.....=.....%%~~
~..ff.......^..._...~....%%%.~
~.fff..P....^^..._~~~~.......~
~..f..........%%..=..........~
~.....MMMM....%%%.~....S.....~
~~....M##M..........^^......~~
~~~...M..M....fff.....^....~~~
~~~~..........ffff........~~~~
~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
";

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: build a map from a glyph diagram with 16-unit tiles.
    fn map_from(rows: &[&str]) -> GridMap {
        GridMap::parse(&rows.join("\n"), 16.0).expect("valid test map")
    }

    #[test]
    fn coordinate_roundtrip() {
        let m = map_from(&[
            "....",
            "....",
            "....",
        ]);
        for y in -2..6 {
            for x in -2..6 {
                let c = GridCoord::new(x, y);
                assert_eq!(m.world_to_grid(m.grid_to_world(c)), c);
            }
        }
    }

    #[test]
    fn display_rounds_half_to_even() {
        assert_eq!(WorldPos::new(2.5, 3.5).to_string(), "(2, 4)");
        assert_eq!(WorldPos::new(-0.5, 1.4).to_string(), "(0, 1)");
        assert_eq!(WorldPos::new(2.6, -1.5).rounded(), (3, -2));
    }

    #[test]
    fn grid_to_world_is_cell_centre() {
        let m = map_from(&["..."]);
        assert_eq!(m.grid_to_world(GridCoord::new(2, 0)), WorldPos::new(40.0, 8.0));
        assert_eq!(m.world_to_grid(WorldPos::new(47.9, 15.9)), GridCoord::new(2, 0));
        assert_eq!(m.world_to_grid(WorldPos::new(48.0, 0.0)), GridCoord::new(3, 0));
    }

    #[test]
    fn tile_lookup_and_out_of_bounds() {
        let m = map_from(&[
            ".~",
            "^%",
        ]);
        assert_eq!(m.tile_at(GridCoord::new(1, 0)), TileId::WATER);
        assert_eq!(m.tile_at(GridCoord::new(0, 1)), TileId::HILL);
        assert_eq!(m.tile_at(GridCoord::new(-1, 0)), TileId::NONE);
        assert_eq!(m.tile_at(GridCoord::new(0, 2)), TileId::NONE);
        assert_eq!(m.classify_at(GridCoord::new(5, 5)), TileClass::Impassable);
    }

    #[test]
    fn ragged_rows_pad_with_empty() {
        let m = map_from(&[
            "....",
            "..",
        ]);
        assert_eq!(m.width(), 4);
        assert_eq!(m.tile_at(GridCoord::new(3, 1)), TileId::NONE);
        assert!(!m.is_passable(m.tile_at(GridCoord::new(3, 1))));
    }

    #[test]
    fn metadata_and_spawn_line() {
        let m = GridMap::parse("## Test Vale\n@ 1,0\n...\n...\n", 16.0).unwrap();
        assert_eq!(m.name(), "Test Vale");
        assert_eq!(m.spawn(), GridCoord::new(1, 0));
    }

    #[test]
    fn spawn_marker_glyph() {
        let m = map_from(&[
            "...",
            "..P",
        ]);
        assert_eq!(m.spawn(), GridCoord::new(2, 1));
        assert_eq!(m.tile_at(m.spawn()), TileId::GRASS);
    }

    #[test]
    fn spawn_defaults_to_centre() {
        let m = map_from(&[
            ".....",
            ".....",
            ".....",
        ]);
        assert_eq!(m.spawn(), GridCoord::new(2, 1));
    }

    #[test]
    fn rejects_unknown_glyph() {
        let err = GridMap::parse("..\n.X\n", 16.0).unwrap_err();
        assert!(matches!(err, MapError::UnknownGlyph { glyph: 'X', x: 1, y: 1 }));
    }

    #[test]
    fn rejects_spawn_outside() {
        let err = GridMap::parse("@ 9,9\n..\n", 16.0).unwrap_err();
        assert!(matches!(err, MapError::SpawnOutside { x: 9, y: 9 }));
        let err = GridMap::parse("@ nine\n..\n", 16.0).unwrap_err();
        assert!(matches!(err, MapError::BadSpawn(_)));
    }

    #[test]
    fn rejects_empty_map() {
        assert!(matches!(GridMap::parse("## Nothing\n", 16.0), Err(MapError::Empty)));
    }

    #[test]
    fn builtin_map_parses_with_walkable_spawn() {
        let m = GridMap::parse(BUILTIN_MAP, 16.0).expect("builtin map");
        assert_eq!(m.name(), "Midland");
        assert!(m.is_passable(m.tile_at(m.spawn())));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vale.txt");
        std::fs::write(&path, "## Vale\n.C.\n").unwrap();
        let m = GridMap::load(&path, 8.0).unwrap();
        assert_eq!(m.classify_at(GridCoord::new(1, 0)), TileClass::Landmark("Castle"));
        assert_eq!(m.tile_size(), 8.0);

        let missing = GridMap::load(&dir.path().join("nope.txt"), 8.0);
        assert!(matches!(missing, Err(MapError::Io { .. })));
    }
}
