/// Cardinal directions and the input priority that resolves them.

use super::grid::GridCoord;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Direction {
    #[default]
    Zero,
    North,
    South,
    East,
    West,
}

/// Raw "pressed" signals for one tick. Several may be held at once.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    /// Exactly one direction wins: Up > Down > Left > Right.
    pub fn resolve(self) -> Direction {
        if self.up {
            Direction::North
        } else if self.down {
            Direction::South
        } else if self.left {
            Direction::West
        } else if self.right {
            Direction::East
        } else {
            Direction::Zero
        }
    }
}

impl Direction {
    /// Grid step. North is -y (screen up).
    pub fn delta(self) -> GridCoord {
        match self {
            Direction::Zero => GridCoord::new(0, 0),
            Direction::North => GridCoord::new(0, -1),
            Direction::South => GridCoord::new(0, 1),
            Direction::East => GridCoord::new(1, 0),
            Direction::West => GridCoord::new(-1, 0),
        }
    }

    /// Inverse of `delta` for unit steps; anything else is `Zero`.
    pub fn from_delta(d: GridCoord) -> Direction {
        match (d.x, d.y) {
            (0, -1) => Direction::North,
            (0, 1) => Direction::South,
            (1, 0) => Direction::East,
            (-1, 0) => Direction::West,
            _ => Direction::Zero,
        }
    }

    /// Pose token handed to actor presentation.
    pub fn pose_key(self) -> Option<&'static str> {
        match self {
            Direction::North => Some("n"),
            Direction::South => Some("s"),
            Direction::East => Some("e"),
            Direction::West => Some("w"),
            Direction::Zero => None,
        }
    }

    /// Narration line for an accepted input.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Direction::North => Some("North"),
            Direction::South => Some("South"),
            Direction::East => Some("East"),
            Direction::West => Some("West"),
            Direction::Zero => None,
        }
    }

    pub fn is_zero(self) -> bool {
        self == Direction::Zero
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_up_down_left_right() {
        let all = HeldKeys { up: true, down: true, left: true, right: true };
        assert_eq!(all.resolve(), Direction::North);
        let no_up = HeldKeys { up: false, ..all };
        assert_eq!(no_up.resolve(), Direction::South);
        let lr = HeldKeys { left: true, right: true, ..HeldKeys::default() };
        assert_eq!(lr.resolve(), Direction::West);
        let r = HeldKeys { right: true, ..HeldKeys::default() };
        assert_eq!(r.resolve(), Direction::East);
        assert_eq!(HeldKeys::default().resolve(), Direction::Zero);
    }

    #[test]
    fn delta_roundtrip_for_cardinals() {
        for d in [Direction::North, Direction::South, Direction::East, Direction::West] {
            assert_eq!(Direction::from_delta(d.delta()), d);
        }
    }

    #[test]
    fn non_unit_delta_is_zero() {
        assert_eq!(Direction::from_delta(GridCoord::new(0, 0)), Direction::Zero);
        assert_eq!(Direction::from_delta(GridCoord::new(2, 0)), Direction::Zero);
        assert_eq!(Direction::from_delta(GridCoord::new(1, 1)), Direction::Zero);
    }

    #[test]
    fn pose_tokens() {
        assert_eq!(Direction::North.pose_key(), Some("n"));
        assert_eq!(Direction::West.pose_key(), Some("w"));
        assert_eq!(Direction::Zero.pose_key(), None);
    }
}
