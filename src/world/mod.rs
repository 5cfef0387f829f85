pub mod codes;
pub mod config;
pub mod dispatch;
pub mod drift;
pub mod error;
pub mod handlers;
pub mod notes;
pub mod players;
pub mod repository;
pub mod resolve;
pub mod rows;
pub mod schema;
pub mod sqlite;
pub mod terrain;
pub mod warning;

pub use config::MapDbConfig;
pub use dispatch::{Context, FixtureHandler, OwnerKind, Registry, UnitOfWork};
pub use drift::Recovery;
pub use error::{IntegrityError, MapDbError};
pub use repository::MapRepository;
pub use resolve::ResolutionContext;
pub use sqlite::{MapDb, SUPPORTED_MAP_VERSION};
pub use warning::{LogWarnings, MapWarning, WarningLog, WarningSink};
