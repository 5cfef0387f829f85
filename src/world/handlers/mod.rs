//! One handler per persisted fixture kind.

use crate::model::{FixtureRef, Point};
use crate::world::dispatch::{Context, FixtureHandler};
use crate::world::error::MapDbError;

pub mod adventures;
pub mod animals;
pub mod caches;
pub mod community_stats;
pub mod explorables;
pub mod fields;
pub mod forests;
pub mod fortresses;
pub mod ground;
pub mod groves;
pub mod immortals;
pub mod implements;
pub mod mines;
pub mod minerals;
pub mod portals;
pub mod resource_piles;
pub mod shrubs;
pub mod simple_terrains;
pub mod stone_deposits;
pub mod text_notes;
pub mod towns;
pub mod tracks;
pub mod units;
pub mod villages;
pub mod workers;

/// Every handler, in the order the dispatcher tries them.
pub fn all() -> Vec<Box<dyn FixtureHandler>> {
    vec![
        Box::new(adventures::AdventureHandler),
        Box::new(animals::AnimalHandler),
        Box::new(tracks::TracksHandler),
        Box::new(caches::CacheHandler),
        Box::new(community_stats::CommunityStatsHandler),
        Box::new(explorables::ExplorableHandler),
        Box::new(fields::FieldHandler),
        Box::new(fortresses::FortressHandler),
        Box::new(forests::ForestHandler),
        Box::new(ground::GroundHandler),
        Box::new(groves::GroveHandler),
        Box::new(implements::ImplementHandler),
        Box::new(immortals::SimpleImmortalHandler),
        Box::new(immortals::KindedImmortalHandler),
        Box::new(mines::MineHandler),
        Box::new(minerals::MineralHandler),
        Box::new(portals::PortalHandler),
        Box::new(resource_piles::ResourcePileHandler),
        Box::new(shrubs::ShrubHandler),
        Box::new(simple_terrains::SimpleTerrainHandler),
        Box::new(stone_deposits::StoneDepositHandler),
        Box::new(text_notes::TextHandler),
        Box::new(towns::TownHandler),
        Box::new(units::UnitHandler),
        Box::new(villages::VillageHandler),
        Box::new(workers::WorkerHandler),
    ]
}

/// The error for a fixture or context a handler was not built for.
pub(crate) fn unexpected(fixture: FixtureRef<'_>) -> MapDbError {
    MapDbError::NoHandler {
        kind: fixture.kind_name(),
        id: fixture.id(),
    }
}

pub(crate) fn point_of(fixture: FixtureRef<'_>, context: Context) -> Result<Point, MapDbError> {
    match context {
        Context::Point(point) => Ok(point),
        Context::Owner(_) => Err(unexpected(fixture)),
    }
}

pub(crate) fn owner_of(fixture: FixtureRef<'_>, context: Context) -> Result<u32, MapDbError> {
    match context {
        Context::Owner(owner) => Ok(owner.id),
        Context::Point(_) => Err(unexpected(fixture)),
    }
}
