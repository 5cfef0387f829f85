use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{Direction, GameMap, MapDimensions, Player, Point, River, TileFixture, TileType};
use crate::world::MapDbError;

/// Portable JSON image of a whole map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    #[serde(default = "default_snapshot_version")]
    pub version: u32,
    pub dimensions: SavedDimensions,
    pub current_turn: i32,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub tiles: Vec<SavedTile>,
}

fn default_snapshot_version() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDimensions {
    pub rows: i32,
    pub columns: i32,
    pub version: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRoad {
    pub direction: Direction,
    pub quality: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTile {
    pub row: i32,
    pub column: i32,
    #[serde(default)]
    pub terrain: Option<TileType>,
    #[serde(default)]
    pub mountainous: bool,
    #[serde(default)]
    pub rivers: Vec<River>,
    #[serde(default)]
    pub roads: Vec<SavedRoad>,
    #[serde(default)]
    pub bookmarks: Vec<i32>,
    #[serde(default)]
    pub fixtures: Vec<TileFixture>,
}

impl MapSnapshot {
    /// Captures every tile that carries any data.
    pub fn from_map(map: &GameMap) -> Self {
        let tiles = map
            .locations()
            .into_iter()
            .map(|point| SavedTile {
                row: point.row,
                column: point.column,
                terrain: map.terrain_at(point),
                mountainous: map.is_mountainous(point),
                rivers: map.rivers_at(point).collect(),
                roads: map
                    .roads_at(point)
                    .map(|(direction, quality)| SavedRoad { direction, quality })
                    .collect(),
                bookmarks: map.bookmarks_at(point).collect(),
                fixtures: map.fixtures_at(point).cloned().collect(),
            })
            .collect();
        Self {
            version: default_snapshot_version(),
            dimensions: SavedDimensions {
                rows: map.dimensions.rows,
                columns: map.dimensions.columns,
                version: map.dimensions.version,
            },
            current_turn: map.current_turn,
            players: map.players.iter().cloned().collect(),
            tiles,
        }
    }

    /// Rebuilds the map. The result counts as modified, since no store holds it yet.
    pub fn into_map(self) -> GameMap {
        let dimensions = MapDimensions::new(
            self.dimensions.rows,
            self.dimensions.columns,
            self.dimensions.version,
        );
        let mut map = GameMap::new(dimensions, self.current_turn);
        for player in self.players {
            map.players.add(player);
        }
        for tile in self.tiles {
            let point = Point::new(tile.row, tile.column);
            if let Some(terrain) = tile.terrain {
                map.set_terrain(point, terrain);
            }
            if tile.mountainous {
                map.set_mountainous(point, true);
            }
            for river in tile.rivers {
                map.add_river(point, river);
            }
            for road in tile.roads {
                map.set_road(point, road.direction, road.quality);
            }
            for player in tile.bookmarks {
                map.add_bookmark(point, player);
            }
            for fixture in tile.fixtures {
                map.add_fixture(point, fixture);
            }
        }
        map.set_modified(true);
        map
    }
}

/// Serialize a snapshot to pretty JSON.
pub fn snapshot_to_json(snapshot: &MapSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

/// Deserialize JSON back into a snapshot.
pub fn snapshot_from_json(data: &str) -> serde_json::Result<MapSnapshot> {
    serde_json::from_str(data)
}

/// Write a map to a JSON file.
pub fn export_map<P: AsRef<Path>>(map: &GameMap, path: P) -> Result<(), MapDbError> {
    let json = snapshot_to_json(&MapSnapshot::from_map(map))?;
    fs::write(path, json)?;
    Ok(())
}

/// Read a map from a JSON file.
pub fn import_map<P: AsRef<Path>>(path: P) -> Result<GameMap, MapDbError> {
    let data = fs::read_to_string(path)?;
    Ok(snapshot_from_json(&data)?.into_map())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Animal, Fortress, FortressMember, Unit, UnitMember, Worker};
    use rust_decimal::Decimal;

    fn small_map() -> GameMap {
        let mut map = GameMap::new(MapDimensions::new(4, 4, 2), 7);
        let mut player = Player::new(3, "Carol");
        player.current = true;
        map.players.add(player);
        let home = Point::new(1, 2);
        map.set_terrain(home, TileType::Steppe);
        map.add_river(home, River::West);
        map.set_road(home, Direction::Northwest, 2);
        map.set_mountainous(Point::new(0, 0), true);
        map.add_bookmark(Point::new(3, 3), 3);

        let mut worker = Worker::new(12, "Dana", "dwarf");
        worker.mount = Some(Animal::new(13, "pony"));
        let mut unit = Unit::new(11, 3, "explorers", "Scouts");
        unit.add_member(UnitMember::Worker(worker));
        let mut fortress = Fortress::new(10, "Holdfast", 3);
        fortress.add_member(FortressMember::Unit(unit));
        map.add_fixture(home, TileFixture::Fortress(fortress));
        map
    }

    #[test]
    fn snapshot_rebuilds_an_equal_map() {
        let map = small_map();
        let json = snapshot_to_json(&MapSnapshot::from_map(&map)).unwrap();
        let restored = snapshot_from_json(&json).unwrap().into_map();
        assert_eq!(restored, map);
        assert!(restored.is_modified());
        assert_eq!(restored.fixture_count(), 4);
    }

    #[test]
    fn decimals_survive_json() {
        let mut map = small_map();
        map.add_fixture(
            Point::new(2, 2),
            TileFixture::Forest(crate::model::Forest {
                id: 40,
                kind: "pine".to_string(),
                rows: true,
                acres: Decimal::new(1234567, 4),
                image: None,
            }),
        );
        let json = snapshot_to_json(&MapSnapshot::from_map(&map)).unwrap();
        assert_eq!(snapshot_from_json(&json).unwrap().into_map(), map);
    }

    #[test]
    fn sparse_snapshot_uses_defaults() {
        let json = r#"{
            "dimensions": { "rows": 2, "columns": 2, "version": 2 },
            "current_turn": 0,
            "tiles": [ { "row": 1, "column": 1, "terrain": "Ocean" } ]
        }"#;
        let snapshot = snapshot_from_json(json).unwrap();
        assert_eq!(snapshot.version, 1);
        let map = snapshot.into_map();
        assert!(map.players.is_empty());
        assert_eq!(map.terrain_at(Point::new(1, 1)), Some(TileType::Ocean));
    }

    #[test]
    fn file_export_and_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        let map = small_map();
        export_map(&map, &path).unwrap();
        assert_eq!(import_map(&path).unwrap(), map);
    }
}
