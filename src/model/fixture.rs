use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::explorable::{Adventure, Battlefield, Cave, Hill, Oasis, Portal, TextFixture};
use crate::model::mobile::{
    Animal, AnimalTracks, Immortal, KindedImmortal, SimpleImmortal, Unit, UnitMember, Worker,
};
use crate::model::resources::{
    CacheFixture, Forest, Ground, Grove, Implement, Meadow, Mine, MineralVein, ResourcePile, Shrub,
    StoneDeposit,
};
use crate::model::towns::{CommunityStats, Fortress, FortressMember, Town, Village};

/// A fixture that may sit directly on a map tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileFixture {
    Adventure(Adventure),
    Animal(Animal),
    AnimalTracks(AnimalTracks),
    Cache(CacheFixture),
    Cave(Cave),
    Battlefield(Battlefield),
    Meadow(Meadow),
    Fortress(Fortress),
    Forest(Forest),
    Ground(Ground),
    Grove(Grove),
    Immortal(Immortal),
    Mine(Mine),
    MineralVein(MineralVein),
    Portal(Portal),
    Shrub(Shrub),
    Hill(Hill),
    Oasis(Oasis),
    StoneDeposit(StoneDeposit),
    Text(TextFixture),
    Town(Town),
    Unit(Unit),
    Village(Village),
}

impl TileFixture {
    pub fn id(&self) -> u32 {
        match self {
            TileFixture::Adventure(fixture) => fixture.id,
            TileFixture::Animal(fixture) => fixture.id,
            TileFixture::AnimalTracks(fixture) => fixture.id,
            TileFixture::Cache(fixture) => fixture.id,
            TileFixture::Cave(fixture) => fixture.id,
            TileFixture::Battlefield(fixture) => fixture.id,
            TileFixture::Meadow(fixture) => fixture.id,
            TileFixture::Fortress(fixture) => fixture.id,
            TileFixture::Forest(fixture) => fixture.id,
            TileFixture::Ground(fixture) => fixture.id,
            TileFixture::Grove(fixture) => fixture.id,
            TileFixture::Immortal(fixture) => fixture.id(),
            TileFixture::Mine(fixture) => fixture.id,
            TileFixture::MineralVein(fixture) => fixture.id,
            TileFixture::Portal(fixture) => fixture.id,
            TileFixture::Shrub(fixture) => fixture.id,
            TileFixture::Hill(fixture) => fixture.id,
            TileFixture::Oasis(fixture) => fixture.id,
            TileFixture::StoneDeposit(fixture) => fixture.id,
            TileFixture::Text(fixture) => fixture.id,
            TileFixture::Town(fixture) => fixture.id,
            TileFixture::Unit(fixture) => fixture.id,
            TileFixture::Village(fixture) => fixture.id,
        }
    }

    pub fn as_fixture(&self) -> FixtureRef<'_> {
        match self {
            TileFixture::Adventure(fixture) => FixtureRef::Adventure(fixture),
            TileFixture::Animal(fixture) => FixtureRef::Animal(fixture),
            TileFixture::AnimalTracks(fixture) => FixtureRef::AnimalTracks(fixture),
            TileFixture::Cache(fixture) => FixtureRef::Cache(fixture),
            TileFixture::Cave(fixture) => FixtureRef::Cave(fixture),
            TileFixture::Battlefield(fixture) => FixtureRef::Battlefield(fixture),
            TileFixture::Meadow(fixture) => FixtureRef::Meadow(fixture),
            TileFixture::Fortress(fixture) => FixtureRef::Fortress(fixture),
            TileFixture::Forest(fixture) => FixtureRef::Forest(fixture),
            TileFixture::Ground(fixture) => FixtureRef::Ground(fixture),
            TileFixture::Grove(fixture) => FixtureRef::Grove(fixture),
            TileFixture::Immortal(fixture) => fixture.as_fixture(),
            TileFixture::Mine(fixture) => FixtureRef::Mine(fixture),
            TileFixture::MineralVein(fixture) => FixtureRef::MineralVein(fixture),
            TileFixture::Portal(fixture) => FixtureRef::Portal(fixture),
            TileFixture::Shrub(fixture) => FixtureRef::Shrub(fixture),
            TileFixture::Hill(fixture) => FixtureRef::Hill(fixture),
            TileFixture::Oasis(fixture) => FixtureRef::Oasis(fixture),
            TileFixture::StoneDeposit(fixture) => FixtureRef::StoneDeposit(fixture),
            TileFixture::Text(fixture) => FixtureRef::Text(fixture),
            TileFixture::Town(fixture) => FixtureRef::Town(fixture),
            TileFixture::Unit(fixture) => FixtureRef::Unit(fixture),
            TileFixture::Village(fixture) => FixtureRef::Village(fixture),
        }
    }
}

impl Immortal {
    pub fn as_fixture(&self) -> FixtureRef<'_> {
        match self {
            Immortal::Simple(immortal) => FixtureRef::SimpleImmortal(immortal),
            Immortal::Kinded(immortal) => FixtureRef::KindedImmortal(immortal),
        }
    }
}

impl UnitMember {
    pub fn as_fixture(&self) -> FixtureRef<'_> {
        match self {
            UnitMember::Worker(worker) => FixtureRef::Worker(worker),
            UnitMember::Animal(animal) => FixtureRef::Animal(animal),
            UnitMember::Implement(implement) => FixtureRef::Implement(implement),
            UnitMember::ResourcePile(pile) => FixtureRef::ResourcePile(pile),
            UnitMember::Immortal(immortal) => immortal.as_fixture(),
        }
    }
}

impl FortressMember {
    pub fn as_fixture(&self) -> FixtureRef<'_> {
        match self {
            FortressMember::Unit(unit) => FixtureRef::Unit(unit),
            FortressMember::ResourcePile(pile) => FixtureRef::ResourcePile(pile),
            FortressMember::Implement(implement) => FixtureRef::Implement(implement),
        }
    }
}

/// A borrowed view of any persistable object, wherever it lives in the map.
#[derive(Debug, Clone, Copy)]
pub enum FixtureRef<'a> {
    Adventure(&'a Adventure),
    Animal(&'a Animal),
    AnimalTracks(&'a AnimalTracks),
    Cache(&'a CacheFixture),
    CommunityStats(&'a CommunityStats),
    Cave(&'a Cave),
    Battlefield(&'a Battlefield),
    Meadow(&'a Meadow),
    Fortress(&'a Fortress),
    Forest(&'a Forest),
    Ground(&'a Ground),
    Grove(&'a Grove),
    Implement(&'a Implement),
    SimpleImmortal(&'a SimpleImmortal),
    KindedImmortal(&'a KindedImmortal),
    Mine(&'a Mine),
    MineralVein(&'a MineralVein),
    Portal(&'a Portal),
    ResourcePile(&'a ResourcePile),
    Shrub(&'a Shrub),
    Hill(&'a Hill),
    Oasis(&'a Oasis),
    StoneDeposit(&'a StoneDeposit),
    Text(&'a TextFixture),
    Town(&'a Town),
    Unit(&'a Unit),
    Village(&'a Village),
    Worker(&'a Worker),
}

impl<'a> FixtureRef<'a> {
    /// The global fixture ID. Population statistics have none of their own.
    pub fn id(&self) -> Option<u32> {
        match self {
            FixtureRef::Adventure(fixture) => Some(fixture.id),
            FixtureRef::Animal(fixture) => Some(fixture.id),
            FixtureRef::AnimalTracks(fixture) => Some(fixture.id),
            FixtureRef::Cache(fixture) => Some(fixture.id),
            FixtureRef::CommunityStats(_) => None,
            FixtureRef::Cave(fixture) => Some(fixture.id),
            FixtureRef::Battlefield(fixture) => Some(fixture.id),
            FixtureRef::Meadow(fixture) => Some(fixture.id),
            FixtureRef::Fortress(fixture) => Some(fixture.id),
            FixtureRef::Forest(fixture) => Some(fixture.id),
            FixtureRef::Ground(fixture) => Some(fixture.id),
            FixtureRef::Grove(fixture) => Some(fixture.id),
            FixtureRef::Implement(fixture) => Some(fixture.id),
            FixtureRef::SimpleImmortal(fixture) => Some(fixture.id),
            FixtureRef::KindedImmortal(fixture) => Some(fixture.id),
            FixtureRef::Mine(fixture) => Some(fixture.id),
            FixtureRef::MineralVein(fixture) => Some(fixture.id),
            FixtureRef::Portal(fixture) => Some(fixture.id),
            FixtureRef::ResourcePile(fixture) => Some(fixture.id),
            FixtureRef::Shrub(fixture) => Some(fixture.id),
            FixtureRef::Hill(fixture) => Some(fixture.id),
            FixtureRef::Oasis(fixture) => Some(fixture.id),
            FixtureRef::StoneDeposit(fixture) => Some(fixture.id),
            FixtureRef::Text(fixture) => Some(fixture.id),
            FixtureRef::Town(fixture) => Some(fixture.id),
            FixtureRef::Unit(fixture) => Some(fixture.id),
            FixtureRef::Village(fixture) => Some(fixture.id),
            FixtureRef::Worker(fixture) => Some(fixture.id),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FixtureRef::Adventure(_) => "adventure",
            FixtureRef::Animal(_) => "animal",
            FixtureRef::AnimalTracks(_) => "animal tracks",
            FixtureRef::Cache(_) => "cache",
            FixtureRef::CommunityStats(_) => "community stats",
            FixtureRef::Cave(_) => "cave",
            FixtureRef::Battlefield(_) => "battlefield",
            FixtureRef::Meadow(_) => "field",
            FixtureRef::Fortress(_) => "fortress",
            FixtureRef::Forest(_) => "forest",
            FixtureRef::Ground(_) => "ground",
            FixtureRef::Grove(_) => "grove",
            FixtureRef::Implement(_) => "implement",
            FixtureRef::SimpleImmortal(_) => "immortal",
            FixtureRef::KindedImmortal(_) => "immortal",
            FixtureRef::Mine(_) => "mine",
            FixtureRef::MineralVein(_) => "mineral",
            FixtureRef::Portal(_) => "portal",
            FixtureRef::ResourcePile(_) => "resource pile",
            FixtureRef::Shrub(_) => "shrub",
            FixtureRef::Hill(_) => "hill",
            FixtureRef::Oasis(_) => "oasis",
            FixtureRef::StoneDeposit(_) => "stone deposit",
            FixtureRef::Text(_) => "text",
            FixtureRef::Town(_) => "town",
            FixtureRef::Unit(_) => "unit",
            FixtureRef::Village(_) => "village",
            FixtureRef::Worker(_) => "worker",
        }
    }

    /// Per-player notes, for the kinds that carry them.
    pub fn notes(&self) -> Option<&'a BTreeMap<i32, String>> {
        match *self {
            FixtureRef::Worker(worker) => Some(&worker.notes),
            _ => None,
        }
    }
}
