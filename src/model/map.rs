use std::collections::{BTreeMap, BTreeSet};

use bevy_ecs::prelude::*;

use crate::model::fixture::TileFixture;
use crate::model::mobile::UnitMember;
use crate::model::player::PlayerCollection;
use crate::model::terrain::{Direction, Point, River, TileType};
use crate::model::towns::FortressMember;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapDimensions {
    pub rows: i32,
    pub columns: i32,
    pub version: i32,
}

impl MapDimensions {
    pub const fn new(rows: i32, columns: i32, version: i32) -> Self {
        Self {
            rows,
            columns,
            version,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.row >= 0 && point.column >= 0 && point.row < self.rows && point.column < self.columns
    }
}

/// The whole game world: terrain, players, and every fixture, by tile.
#[derive(Resource, Debug, Clone)]
pub struct GameMap {
    pub dimensions: MapDimensions,
    pub players: PlayerCollection,
    pub current_turn: i32,
    terrain: BTreeMap<Point, TileType>,
    mountains: BTreeSet<Point>,
    rivers: BTreeMap<Point, BTreeSet<River>>,
    roads: BTreeMap<Point, BTreeMap<Direction, i32>>,
    bookmarks: BTreeMap<Point, BTreeSet<i32>>,
    fixtures: BTreeMap<Point, BTreeMap<u32, TileFixture>>,
    modified: bool,
}

impl GameMap {
    pub fn new(dimensions: MapDimensions, current_turn: i32) -> Self {
        Self {
            dimensions,
            players: PlayerCollection::default(),
            current_turn,
            terrain: BTreeMap::new(),
            mountains: BTreeSet::new(),
            rivers: BTreeMap::new(),
            roads: BTreeMap::new(),
            bookmarks: BTreeMap::new(),
            fixtures: BTreeMap::new(),
            modified: true,
        }
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    pub fn terrain_at(&self, point: Point) -> Option<TileType> {
        self.terrain.get(&point).copied()
    }

    pub fn set_terrain(&mut self, point: Point, terrain: TileType) {
        self.terrain.insert(point, terrain);
        self.modified = true;
    }

    pub fn is_mountainous(&self, point: Point) -> bool {
        self.mountains.contains(&point)
    }

    pub fn set_mountainous(&mut self, point: Point, mountainous: bool) {
        if mountainous {
            self.mountains.insert(point);
        } else {
            self.mountains.remove(&point);
        }
        self.modified = true;
    }

    pub fn rivers_at(&self, point: Point) -> impl Iterator<Item = River> + '_ {
        self.rivers.get(&point).into_iter().flatten().copied()
    }

    pub fn add_river(&mut self, point: Point, river: River) {
        self.rivers.entry(point).or_default().insert(river);
        self.modified = true;
    }

    pub fn roads_at(&self, point: Point) -> impl Iterator<Item = (Direction, i32)> + '_ {
        self.roads
            .get(&point)
            .into_iter()
            .flatten()
            .map(|(direction, quality)| (*direction, *quality))
    }

    pub fn set_road(&mut self, point: Point, direction: Direction, quality: i32) {
        self.roads.entry(point).or_default().insert(direction, quality);
        self.modified = true;
    }

    pub fn bookmarks_at(&self, point: Point) -> impl Iterator<Item = i32> + '_ {
        self.bookmarks.get(&point).into_iter().flatten().copied()
    }

    pub fn add_bookmark(&mut self, point: Point, player: i32) {
        self.bookmarks.entry(point).or_default().insert(player);
        self.modified = true;
    }

    /// Places a fixture on a tile, replacing any fixture there with the same ID.
    pub fn add_fixture(&mut self, point: Point, fixture: TileFixture) {
        self.fixtures
            .entry(point)
            .or_default()
            .insert(fixture.id(), fixture);
        self.modified = true;
    }

    pub fn fixtures_at(&self, point: Point) -> impl Iterator<Item = &TileFixture> {
        self.fixtures.get(&point).into_iter().flat_map(|tile| tile.values())
    }

    pub fn fixture_at(&self, point: Point, id: u32) -> Option<&TileFixture> {
        self.fixtures.get(&point).and_then(|tile| tile.get(&id))
    }

    /// Every tile that carries any terrain, river, road, bookmark or fixture data.
    pub fn locations(&self) -> BTreeSet<Point> {
        self.terrain
            .keys()
            .chain(self.mountains.iter())
            .chain(self.rivers.keys())
            .chain(self.roads.keys())
            .chain(self.bookmarks.keys())
            .chain(self.fixtures.keys())
            .copied()
            .collect()
    }

    pub fn tile_fixtures(&self) -> impl Iterator<Item = (Point, &TileFixture)> {
        self.fixtures
            .iter()
            .flat_map(|(point, tile)| tile.values().map(move |fixture| (*point, fixture)))
    }

    /// Counts fixtures on the map, including members nested inside containers.
    pub fn fixture_count(&self) -> usize {
        self.tile_fixtures()
            .map(|(_, fixture)| 1 + nested_count(fixture))
            .sum()
    }
}

fn nested_count(fixture: &TileFixture) -> usize {
    match fixture {
        TileFixture::Fortress(fortress) => fortress
            .members
            .values()
            .map(|member| match member {
                FortressMember::Unit(unit) => 1 + unit_member_count(&unit.members),
                _ => 1,
            })
            .sum(),
        TileFixture::Unit(unit) => unit_member_count(&unit.members),
        _ => 0,
    }
}

fn unit_member_count(members: &BTreeMap<u32, UnitMember>) -> usize {
    members
        .values()
        .map(|member| match member {
            UnitMember::Worker(worker) => {
                1 + usize::from(worker.mount.is_some()) + worker.equipment.len()
            }
            _ => 1,
        })
        .sum()
}

impl PartialEq for GameMap {
    /// Structural equality; whether the map has unsaved changes is not part of it.
    fn eq(&self, other: &Self) -> bool {
        self.dimensions == other.dimensions
            && self.players == other.players
            && self.current_turn == other.current_turn
            && self.terrain == other.terrain
            && self.mountains == other.mountains
            && self.rivers == other.rivers
            && self.roads == other.roads
            && self.bookmarks == other.bookmarks
            && self.fixtures == other.fixtures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mobile::{Unit, Worker};
    use crate::model::resources::Mine;
    use crate::model::towns::TownStatus;

    #[test]
    fn equality_ignores_modified_flag() {
        let mut a = GameMap::new(MapDimensions::new(4, 4, 2), 3);
        let b = a.clone();
        a.set_modified(false);
        assert_eq!(a, b);
    }

    #[test]
    fn fixture_count_includes_nested_members() {
        let mut map = GameMap::new(MapDimensions::new(4, 4, 2), 0);
        let mut unit = Unit::new(2, 1, "explorers", "Scouts");
        unit.add_member(UnitMember::Worker(Worker::new(3, "Tam", "human")));
        map.add_fixture(Point::new(1, 1), TileFixture::Unit(unit));
        map.add_fixture(
            Point::new(1, 2),
            TileFixture::Mine(Mine {
                id: 4,
                kind: "silver".to_string(),
                status: TownStatus::Active,
                image: None,
            }),
        );
        assert_eq!(map.fixture_count(), 3);
        assert_eq!(map.locations().len(), 2);
    }
}
