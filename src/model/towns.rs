use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::mobile::Unit;
use crate::model::resources::{Implement, ResourcePile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TownStatus {
    Active,
    Abandoned,
    Burned,
    Ruined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TownSize {
    Small,
    Medium,
    Large,
}

/// The sub-kinds sharing the `towns` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TownKind {
    Town,
    City,
    Fortification,
}

/// Population statistics attached to a town or village.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityStats {
    pub population: i32,
    #[serde(default)]
    pub skill_levels: BTreeMap<String, i32>,
    /// IDs of the resource fixtures the community works.
    #[serde(default)]
    pub worked_fields: BTreeSet<u32>,
    #[serde(default)]
    pub produced: BTreeMap<u32, ResourcePile>,
    #[serde(default)]
    pub consumed: BTreeMap<u32, ResourcePile>,
}

impl CommunityStats {
    pub fn new(population: i32) -> Self {
        Self {
            population,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Town {
    pub id: u32,
    pub kind: TownKind,
    pub status: TownStatus,
    pub size: TownSize,
    pub name: String,
    pub owner: i32,
    pub dc: i32,
    #[serde(default)]
    pub portrait: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub population: Option<CommunityStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Village {
    pub id: u32,
    pub status: TownStatus,
    pub name: String,
    pub owner: i32,
    pub race: String,
    #[serde(default)]
    pub portrait: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub population: Option<CommunityStats>,
}

/// Anything a fortress may directly contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FortressMember {
    Unit(Unit),
    ResourcePile(ResourcePile),
    Implement(Implement),
}

impl FortressMember {
    pub fn id(&self) -> u32 {
        match self {
            FortressMember::Unit(unit) => unit.id,
            FortressMember::ResourcePile(pile) => pile.id,
            FortressMember::Implement(implement) => implement.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fortress {
    pub id: u32,
    pub name: String,
    pub owner: i32,
    pub size: TownSize,
    #[serde(default)]
    pub portrait: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub members: BTreeMap<u32, FortressMember>,
}

impl Fortress {
    pub fn new(id: u32, name: impl Into<String>, owner: i32) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            size: TownSize::Small,
            portrait: None,
            image: None,
            members: BTreeMap::new(),
        }
    }

    pub fn add_member(&mut self, member: FortressMember) {
        self.members.insert(member.id(), member);
    }
}
