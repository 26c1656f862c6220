/// Party members and the follow chain.
///
/// Index 0 is the leader and the only member steered by input. Every
/// follower trails its predecessor by exactly one step: when a move starts,
/// follower `i` heads for where member `i - 1` stood *before* that move.

use serde::Deserialize;

use super::direction::Direction;
use super::grid::{GridCoord, GridMap, WorldPos};

/// Which pose-set an actor shows.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorClass {
    #[default]
    Hero,
    Soldier,
    Sage,
    Jester,
    Wizard,
    Merchant,
    Priest,
    Fighter,
}

impl ActorClass {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// An actor as declared in the scene, before the party is assembled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorDecl {
    pub name: String,
    pub class: ActorClass,
}

impl ActorDecl {
    pub fn new(name: &str, class: ActorClass) -> Self {
        ActorDecl { name: name.to_string(), class }
    }
}

#[derive(Clone, Debug)]
pub struct Actor {
    /// Declaration index; stable for the life of the party.
    pub id: usize,
    pub name: String,
    pub class: ActorClass,
    pub position: WorldPos,
    pub facing: Direction,
}

/// A follower's share of a movement batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowStep {
    pub member: usize,
    pub from: WorldPos,
    pub to: WorldPos,
}

#[derive(Clone, Debug, Default)]
pub struct PartyChain {
    members: Vec<Actor>,
}

impl PartyChain {
    pub fn new() -> Self {
        PartyChain { members: Vec::new() }
    }

    /// Place every declared actor on the spawn cell, then reverse so the
    /// last-declared actor leads.
    pub fn initialize(&mut self, source: &[ActorDecl], spawn: GridCoord, map: &GridMap) {
        let at = map.grid_to_world(spawn);
        self.members = source
            .iter()
            .enumerate()
            .map(|(id, decl)| Actor {
                id,
                name: decl.name.clone(),
                class: decl.class,
                position: at,
                facing: Direction::South,
            })
            .collect();
        self.members.reverse();
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn leader(&self) -> Option<&Actor> {
        self.members.first()
    }

    pub fn leader_mut(&mut self) -> Option<&mut Actor> {
        self.members.first_mut()
    }

    pub fn members(&self) -> &[Actor] {
        &self.members
    }

    /// Move a member. Out-of-range indices are ignored.
    pub fn place(&mut self, member: usize, position: WorldPos) {
        if let Some(actor) = self.members.get_mut(member) {
            actor.position = position;
        }
    }

    pub fn grid_coords(&self, map: &GridMap) -> Vec<GridCoord> {
        self.members.iter().map(|a| map.world_to_grid(a.position)).collect()
    }

    /// Turn each follower toward its predecessor and plan its step onto the
    /// predecessor's current (pre-move) position. Must run before any
    /// member of the batch has moved. A follower sharing its predecessor's
    /// cell keeps its old facing.
    pub fn apply_follow_step(&mut self, map: &GridMap) -> Vec<FollowStep> {
        let before: Vec<WorldPos> = self.members.iter().map(|a| a.position).collect();
        let mut steps = Vec::with_capacity(before.len().saturating_sub(1));

        for i in 1..self.members.len() {
            let ahead = map.world_to_grid(before[i - 1]);
            let here = map.world_to_grid(before[i]);
            let dir = Direction::from_delta(ahead - here);
            if !dir.is_zero() {
                self.members[i].facing = dir;
            }
            steps.push(FollowStep { member: i, from: before[i], to: before[i - 1] });
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_map() -> GridMap {
        GridMap::parse(".....\n.....\n.....\n.....\n", 16.0).unwrap()
    }

    fn roster() -> Vec<ActorDecl> {
        vec![
            ActorDecl::new("A", ActorClass::Soldier),
            ActorDecl::new("B", ActorClass::Sage),
            ActorDecl::new("C", ActorClass::Hero),
        ]
    }

    #[test]
    fn last_declared_actor_leads() {
        let map = open_map();
        let mut party = PartyChain::new();
        party.initialize(&roster(), GridCoord::new(2, 2), &map);

        let names: Vec<&str> = party.members().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["C", "B", "A"]);
        assert_eq!(party.leader().unwrap().id, 2);
        for coord in party.grid_coords(&map) {
            assert_eq!(coord, GridCoord::new(2, 2));
        }
    }

    #[test]
    fn empty_roster_has_no_leader() {
        let mut party = PartyChain::new();
        party.initialize(&[], GridCoord::new(0, 0), &open_map());
        assert!(party.is_empty());
        assert!(party.leader().is_none());
    }

    #[test]
    fn followers_target_predecessor_previous_position() {
        let map = open_map();
        let mut party = PartyChain::new();
        party.initialize(&roster(), GridCoord::new(1, 1), &map);
        // Snake laid out west → east: leader at (3,1), then (2,1), then (1,1).
        party.place(0, map.grid_to_world(GridCoord::new(3, 1)));
        party.place(1, map.grid_to_world(GridCoord::new(2, 1)));

        let steps = party.apply_follow_step(&map);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].to, map.grid_to_world(GridCoord::new(3, 1)));
        assert_eq!(steps[1].to, map.grid_to_world(GridCoord::new(2, 1)));
        assert_eq!(steps[1].from, map.grid_to_world(GridCoord::new(1, 1)));
        assert_eq!(party.members()[1].facing, Direction::East);
        assert_eq!(party.members()[2].facing, Direction::East);
    }

    #[test]
    fn stacked_follower_keeps_facing() {
        let map = open_map();
        let mut party = PartyChain::new();
        party.initialize(&roster(), GridCoord::new(2, 2), &map);
        party.members[1].facing = Direction::West;

        let steps = party.apply_follow_step(&map);
        assert_eq!(party.members()[1].facing, Direction::West);
        assert_eq!(steps[0].from, steps[0].to);
    }

    #[test]
    fn follower_facing_from_vertical_offset() {
        let map = open_map();
        let mut party = PartyChain::new();
        party.initialize(&roster()[..2], GridCoord::new(2, 2), &map);
        party.place(0, map.grid_to_world(GridCoord::new(2, 1)));

        party.apply_follow_step(&map);
        assert_eq!(party.members()[1].facing, Direction::North);
    }
}
