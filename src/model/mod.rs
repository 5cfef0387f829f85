pub mod explorable;
pub mod fixture;
pub mod map;
pub mod mobile;
pub mod player;
pub mod resources;
pub mod terrain;
pub mod towns;

pub use explorable::{Adventure, Battlefield, Cave, Hill, Oasis, Portal, TextFixture};
pub use fixture::{FixtureRef, TileFixture};
pub use map::{GameMap, MapDimensions};
pub use mobile::{
    Animal, AnimalTracks, Immortal, Job, KindedImmortal, KindedImmortalKind, SimpleImmortal,
    SimpleImmortalKind, Skill, Unit, UnitMember, Worker, WorkerStats,
};
pub use player::{Player, PlayerCollection};
pub use resources::{
    CacheFixture, FieldStatus, Forest, Ground, Grove, Implement, Meadow, Mine, MineralVein,
    Quantity, ResourcePile, Shrub, StoneDeposit,
};
pub use terrain::{Direction, Point, River, TileType};
pub use towns::{CommunityStats, Fortress, FortressMember, Town, TownKind, TownSize, TownStatus, Village};
