use bevy_ecs::prelude::*;

use crate::model::GameMap;
use crate::world::MapRepository;

/// How often the hosted map has been loaded from or saved to a store.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MapSync {
    pub loads: u32,
    pub saves: u32,
}

/// Build an ECS world with no map loaded yet.
pub fn create_world() -> World {
    let mut world = World::new();
    world.insert_resource(MapSync::default());
    world
}

/// Read the map from `repo` and install it as the world's `GameMap` resource,
/// replacing any map already there.
pub fn load_map_into_world(
    world: &mut World,
    repo: &mut dyn MapRepository,
) -> Result<(), Box<dyn std::error::Error>> {
    let map = repo.load_map()?;
    tracing::debug!(fixtures = map.fixture_count(), "map loaded into world");
    world.insert_resource(map);
    world.get_resource_or_insert_with(MapSync::default).loads += 1;
    Ok(())
}

/// Persist the world's `GameMap` resource. A world without a map is an error.
pub fn save_map_from_world(
    world: &mut World,
    repo: &mut dyn MapRepository,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(mut map) = world.get_resource_mut::<GameMap>() else {
        return Err("world has no map to save".into());
    };
    repo.save_map(&*map)?;
    map.set_modified(false);
    world.get_resource_or_insert_with(MapSync::default).saves += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Animal, MapDimensions, Point, TileFixture, TileType};
    use crate::world::{MapDb, MapDbConfig};

    #[test]
    fn map_moves_between_store_and_world() {
        let mut db = MapDb::open_in_memory(MapDbConfig::default()).unwrap();
        let mut map = GameMap::new(MapDimensions::new(3, 3, 2), 4);
        map.set_terrain(Point::new(1, 1), TileType::Jungle);
        map.add_fixture(Point::new(1, 1), TileFixture::Animal(Animal::new(5, "tiger")));
        db.save_map(&map).unwrap();

        let mut world = create_world();
        load_map_into_world(&mut world, &mut db).unwrap();
        assert_eq!(*world.resource::<GameMap>(), map);
        assert!(!world.resource::<GameMap>().is_modified());

        world
            .resource_mut::<GameMap>()
            .set_terrain(Point::new(0, 0), TileType::Desert);
        save_map_from_world(&mut world, &mut db).unwrap();
        assert!(!world.resource::<GameMap>().is_modified());
        assert_eq!(
            world.resource::<MapSync>(),
            &MapSync { loads: 1, saves: 1 }
        );

        let reloaded = db.load_map().unwrap();
        assert_eq!(reloaded.terrain_at(Point::new(0, 0)), Some(TileType::Desert));
    }

    #[test]
    fn saving_without_a_map_fails() {
        let mut db = MapDb::open_in_memory(MapDbConfig::default()).unwrap();
        let mut world = create_world();
        assert!(save_map_from_world(&mut world, &mut db).is_err());
    }
}
