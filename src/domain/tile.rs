/// Tile ids and their classification.
/// Behaviour is queried through the classification table, never stored per
/// cell, so tile semantics are centralized here.

use std::fmt;

/// Raw tile id as authored in the map. `TileId::NONE` marks "no tile".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct TileId(pub i32);

impl TileId {
    /// What a lookup outside the authored map (or on an empty cell) yields.
    pub const NONE: TileId = TileId(-1);

    pub const CASTLE: TileId = TileId(0);
    pub const TOWN: TileId = TileId(1);
    pub const GRASS: TileId = TileId(2);
    pub const FOREST: TileId = TileId(3);
    pub const HILL: TileId = TileId(4);
    pub const WATER: TileId = TileId(5);
    pub const DUNGEON: TileId = TileId(6);
    pub const DESERT: TileId = TileId(7);
    pub const SWAMP: TileId = TileId(8);
    pub const BRIDGE: TileId = TileId(9);
    pub const SHRINE: TileId = TileId(10);
    pub const ROAD: TileId = TileId(11);
    pub const MOUNTAIN: TileId = TileId(12);
    pub const WALL: TileId = TileId(13);
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TileClass {
    Impassable,
    Plain,
    Hill,   // leader stalls briefly
    Swamp,  // hurts whoever stands in it
    Landmark(&'static str),
}

impl TileClass {
    pub fn is_passable(self) -> bool {
        !matches!(self, TileClass::Impassable)
    }
}

/// Static id → class table. Built once, never mutated during play.
#[derive(Clone, Debug)]
pub struct TileTable {
    impassable: Vec<TileId>,
    landmarks: Vec<(TileId, &'static str)>,
    hills: Vec<TileId>,
    swamps: Vec<TileId>,
}

impl TileTable {
    /// The overworld tile set: water, mountains and walls (5, 12..=26) block,
    /// castle/town/dungeon/shrine are landmarks, 4 is hill, 8 is swamp.
    pub fn overworld() -> Self {
        let mut impassable = vec![TileId::WATER];
        impassable.extend((12..=26).map(TileId));
        TileTable {
            impassable,
            landmarks: vec![
                (TileId::CASTLE, "Castle"),
                (TileId::TOWN, "Town"),
                (TileId::DUNGEON, "Dungeon"),
                (TileId::SHRINE, "Shrine"),
            ],
            hills: vec![TileId::HILL],
            swamps: vec![TileId::SWAMP],
        }
    }

    pub fn classify(&self, id: TileId) -> TileClass {
        if id == TileId::NONE || self.impassable.contains(&id) {
            return TileClass::Impassable;
        }
        if let Some(&(_, name)) = self.landmarks.iter().find(|(t, _)| *t == id) {
            return TileClass::Landmark(name);
        }
        if self.hills.contains(&id) { return TileClass::Hill; }
        if self.swamps.contains(&id) { return TileClass::Swamp; }
        TileClass::Plain
    }

    pub fn is_passable(&self, id: TileId) -> bool {
        self.classify(id).is_passable()
    }
}

impl Default for TileTable {
    fn default() -> Self {
        TileTable::overworld()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impassable_ids_match_tileset() {
        let table = TileTable::overworld();
        assert!(!table.is_passable(TileId::WATER));
        for id in 12..=26 {
            assert!(!table.is_passable(TileId(id)), "tile {id} should block");
        }
        assert!(table.is_passable(TileId(27)));
        assert!(table.is_passable(TileId::GRASS));
    }

    #[test]
    fn missing_tile_fails_closed() {
        let table = TileTable::overworld();
        assert_eq!(table.classify(TileId::NONE), TileClass::Impassable);
    }

    #[test]
    fn landmarks_carry_their_names() {
        let table = TileTable::overworld();
        assert_eq!(table.classify(TileId::CASTLE), TileClass::Landmark("Castle"));
        assert_eq!(table.classify(TileId::TOWN), TileClass::Landmark("Town"));
        assert_eq!(table.classify(TileId::DUNGEON), TileClass::Landmark("Dungeon"));
        assert_eq!(table.classify(TileId::SHRINE), TileClass::Landmark("Shrine"));
    }

    #[test]
    fn effect_tiles() {
        let table = TileTable::overworld();
        assert_eq!(table.classify(TileId::HILL), TileClass::Hill);
        assert_eq!(table.classify(TileId::SWAMP), TileClass::Swamp);
        assert_eq!(table.classify(TileId::ROAD), TileClass::Plain);
        assert!(TileClass::Hill.is_passable());
        assert!(TileClass::Swamp.is_passable());
    }
}
