use crate::model::GameMap;
use crate::world::sqlite::MapDb;
use crate::world::warning::LogWarnings;

/// Whole-map persistence, as seen by an application hosting the map.
pub trait MapRepository {
    fn load_map(&mut self) -> Result<GameMap, Box<dyn std::error::Error>>;
    fn save_map(&mut self, map: &GameMap) -> Result<(), Box<dyn std::error::Error>>;
}

impl MapRepository for MapDb {
    fn load_map(&mut self) -> Result<GameMap, Box<dyn std::error::Error>> {
        Ok(MapDb::read_map(self, &mut LogWarnings)?)
    }

    fn save_map(&mut self, map: &GameMap) -> Result<(), Box<dyn std::error::Error>> {
        Ok(MapDb::write_map(self, map, &mut LogWarnings)?)
    }
}
