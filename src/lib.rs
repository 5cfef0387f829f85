// Host integration, the entity model, and the relational map store.
pub mod core;
pub mod model;
pub mod world;

pub use crate::core::serialization::MapSnapshot;
pub use crate::model::GameMap;
pub use crate::world::{MapDb, MapDbConfig, MapDbError, MapRepository, MapWarning};
