pub mod ecs;
pub mod serialization;
