//! Units, the workers in them, and the creatures that wander the map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::resources::{Implement, ResourcePile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animal {
    pub id: u32,
    pub kind: String,
    pub talking: bool,
    pub status: String,
    /// Turn of birth; `None` when unknown.
    #[serde(default)]
    pub born: Option<i32>,
    pub population: i32,
    #[serde(default)]
    pub image: Option<String>,
}

impl Animal {
    pub fn new(id: u32, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            talking: false,
            status: "wild".to_string(),
            born: None,
            population: 1,
            image: None,
        }
    }
}

/// Evidence that an animal passed through a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalTracks {
    pub id: u32,
    pub kind: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimpleImmortalKind {
    Sphinx,
    Djinn,
    Griffin,
    Minotaur,
    Ogre,
    Phoenix,
    Simurgh,
    Troll,
    Snowbird,
    Thunderbird,
    Pegasus,
    Unicorn,
    Kraken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KindedImmortalKind {
    Centaur,
    Dragon,
    Fairy,
    Giant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleImmortal {
    pub id: u32,
    pub kind: SimpleImmortalKind,
    pub dc: i32,
    #[serde(default)]
    pub image: Option<String>,
}

/// An immortal that also carries a free-form race, e.g. a "hill" giant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindedImmortal {
    pub id: u32,
    pub kind: KindedImmortalKind,
    pub race: String,
    pub dc: i32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Immortal {
    Simple(SimpleImmortal),
    Kinded(KindedImmortal),
}

impl Immortal {
    pub fn id(&self) -> u32 {
        match self {
            Immortal::Simple(immortal) => immortal.id,
            Immortal::Kinded(immortal) => immortal.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub level: i32,
    pub hours: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub level: i32,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl Job {
    pub fn new(name: impl Into<String>, level: i32) -> Self {
        Self {
            name: name.into(),
            level,
            skills: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    pub hp: i32,
    pub max_hp: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: u32,
    pub name: String,
    pub race: String,
    #[serde(default)]
    pub portrait: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stats: Option<WorkerStats>,
    #[serde(default)]
    pub jobs: Vec<Job>,
    /// Per-player annotations, keyed by player ID.
    #[serde(default)]
    pub notes: BTreeMap<i32, String>,
    #[serde(default)]
    pub mount: Option<Animal>,
    #[serde(default)]
    pub equipment: BTreeMap<u32, Implement>,
}

impl Worker {
    pub fn new(id: u32, name: impl Into<String>, race: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            race: race.into(),
            portrait: None,
            image: None,
            stats: None,
            jobs: Vec::new(),
            notes: BTreeMap::new(),
            mount: None,
            equipment: BTreeMap::new(),
        }
    }

    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.name == name)
    }
}

/// Anything a unit may directly contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitMember {
    Worker(Worker),
    Animal(Animal),
    Implement(Implement),
    ResourcePile(ResourcePile),
    Immortal(Immortal),
}

impl UnitMember {
    pub fn id(&self) -> u32 {
        match self {
            UnitMember::Worker(worker) => worker.id,
            UnitMember::Animal(animal) => animal.id,
            UnitMember::Implement(implement) => implement.id,
            UnitMember::ResourcePile(pile) => pile.id,
            UnitMember::Immortal(immortal) => immortal.id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: u32,
    pub owner: i32,
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub portrait: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Orders given to the unit, keyed by turn.
    #[serde(default)]
    pub orders: BTreeMap<i32, String>,
    /// Results the unit reported, keyed by turn.
    #[serde(default)]
    pub results: BTreeMap<i32, String>,
    #[serde(default)]
    pub members: BTreeMap<u32, UnitMember>,
}

impl Unit {
    pub fn new(id: u32, owner: i32, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            owner,
            kind: kind.into(),
            name: name.into(),
            portrait: None,
            image: None,
            orders: BTreeMap::new(),
            results: BTreeMap::new(),
            members: BTreeMap::new(),
        }
    }

    pub fn add_member(&mut self, member: UnitMember) {
        self.members.insert(member.id(), member);
    }
}
