//! Deferred attachment of owned fixtures to their owners.
//!
//! Rows are read table by table, so a member is usually decoded before the
//! fixture that owns it. Handlers park owned fixtures here under their owner's
//! ID and register every container-capable fixture by its own ID; once every
//! table has been read, [`ResolutionContext::resolve`] builds the containment
//! tree bottom-up and places the roots on the map.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::{
    Animal, CommunityStats, Fortress, FortressMember, GameMap, Immortal, Implement, Point,
    ResourcePile, TileFixture, Town, Unit, UnitMember, Village, Worker,
};
use crate::world::error::{IntegrityError, MapDbError};
use crate::world::warning::{MapWarning, WarningSink};

/// Where a row says its fixture lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Point(Point),
    Parent(u32),
}

/// A fixture that other fixtures can be attached to.
#[derive(Debug, Clone)]
pub enum Container {
    Fortress(Fortress),
    Unit(Unit),
    Worker(Worker),
    Town(Town),
    Village(Village),
}

impl Container {
    pub fn id(&self) -> u32 {
        match self {
            Container::Fortress(fortress) => fortress.id,
            Container::Unit(unit) => unit.id,
            Container::Worker(worker) => worker.id,
            Container::Town(town) => town.id,
            Container::Village(village) => village.id,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Container::Fortress(_) => "fortress",
            Container::Unit(_) => "unit",
            Container::Worker(_) => "worker",
            Container::Town(_) => "town",
            Container::Village(_) => "village",
        }
    }

    fn into_tile(self) -> Result<TileFixture, MapDbError> {
        match self {
            Container::Fortress(fortress) => Ok(TileFixture::Fortress(fortress)),
            Container::Unit(unit) => Ok(TileFixture::Unit(unit)),
            Container::Town(town) => Ok(TileFixture::Town(town)),
            Container::Village(village) => Ok(TileFixture::Village(village)),
            Container::Worker(worker) => Err(MapDbError::InvalidData(format!(
                "worker {} cannot sit directly on a tile",
                worker.id
            ))),
        }
    }

    fn into_member(self, owner: &Container) -> Result<Member, IntegrityError> {
        match self {
            Container::Unit(unit) => Ok(Member::Unit(unit)),
            Container::Worker(worker) => Ok(Member::Worker(worker)),
            other => Err(IntegrityError::UnsupportedMembership {
                owner_kind: owner.kind_name(),
                owner: owner.id(),
                member_kind: other.kind_name(),
                member: other.id(),
            }),
        }
    }
}

/// A fixture waiting to be attached to its owner.
#[derive(Debug, Clone)]
pub enum Member {
    Unit(Unit),
    Worker(Worker),
    Animal(Animal),
    Implement(Implement),
    ResourcePile(ResourcePile),
    Immortal(Immortal),
    CommunityStats(CommunityStats),
}

impl Member {
    fn id(&self) -> Option<u32> {
        match self {
            Member::Unit(unit) => Some(unit.id),
            Member::Worker(worker) => Some(worker.id),
            Member::Animal(animal) => Some(animal.id),
            Member::Implement(implement) => Some(implement.id),
            Member::ResourcePile(pile) => Some(pile.id),
            Member::Immortal(immortal) => Some(immortal.id()),
            Member::CommunityStats(_) => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Member::Unit(_) => "unit",
            Member::Worker(_) => "worker",
            Member::Animal(_) => "animal",
            Member::Implement(_) => "implement",
            Member::ResourcePile(_) => "resource pile",
            Member::Immortal(_) => "immortal",
            Member::CommunityStats(_) => "community stats",
        }
    }
}

#[derive(Debug, Clone)]
enum Containee {
    Member(Member),
    /// A container that is itself owned; attached once its own members are.
    Nested(u32),
}

impl Containee {
    fn id(&self) -> Option<u32> {
        match self {
            Containee::Member(member) => member.id(),
            Containee::Nested(id) => Some(*id),
        }
    }
}

/// Lookup tables that live for a single read of a store.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    containers: HashMap<u32, Container>,
    placements: Vec<(Point, u32)>,
    containees: HashMap<u32, Vec<Containee>>,
    notes: HashMap<u32, BTreeMap<i32, String>>,
    seen: HashSet<u32>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.containers.clear();
        self.placements.clear();
        self.containees.clear();
        self.notes.clear();
        self.seen.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
            && self.placements.is_empty()
            && self.containees.is_empty()
            && self.notes.is_empty()
            && self.seen.is_empty()
    }

    /// Records that a fixture ID has been read, warning if it already was.
    pub fn register_id(&mut self, id: u32, warnings: &mut dyn WarningSink) {
        if !self.seen.insert(id) {
            warnings.warn(MapWarning::DuplicateId { id });
        }
    }

    pub fn add_note(&mut self, fixture: u32, player: i32, note: String) {
        self.notes.entry(fixture).or_default().insert(player, note);
    }

    pub fn take_notes(&mut self, fixture: u32) -> BTreeMap<i32, String> {
        self.notes.remove(&fixture).unwrap_or_default()
    }

    pub fn add_containee(&mut self, owner: u32, member: Member) {
        self.containees
            .entry(owner)
            .or_default()
            .push(Containee::Member(member));
    }

    pub fn add_container(&mut self, location: Location, container: Container) {
        let id = container.id();
        match location {
            Location::Point(point) => self.placements.push((point, id)),
            Location::Parent(owner) => self
                .containees
                .entry(owner)
                .or_default()
                .push(Containee::Nested(id)),
        }
        self.containers.insert(id, container);
    }

    /// Attaches every parked member to its owner and places the finished
    /// containers on the map. Leaves the context empty apart from the ID
    /// and note bookkeeping.
    pub fn resolve(&mut self, map: &mut GameMap) -> Result<(), MapDbError> {
        for (owner, members) in &self.containees {
            if !self.containers.contains_key(owner) {
                let member = members.first().and_then(Containee::id).unwrap_or(*owner);
                return Err(IntegrityError::Orphan {
                    owner: *owner,
                    member,
                }
                .into());
            }
        }

        let mut parents: HashMap<u32, u32> = HashMap::new();
        for (owner, members) in &self.containees {
            for containee in members {
                if let Containee::Nested(child) = containee {
                    parents.insert(*child, *owner);
                }
            }
        }

        let mut order = Vec::with_capacity(self.containers.len());
        for id in self.containers.keys() {
            order.push((depth_of(*id, &parents)?, *id));
        }
        order.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut finished: HashMap<u32, Container> = HashMap::new();
        for (_, id) in order {
            let Some(mut container) = self.containers.remove(&id) else {
                continue;
            };
            for containee in self.containees.remove(&id).unwrap_or_default() {
                let member = match containee {
                    Containee::Member(member) => member,
                    Containee::Nested(child) => match finished.remove(&child) {
                        Some(nested) => nested.into_member(&container)?,
                        None => continue,
                    },
                };
                attach(&mut container, member)?;
            }
            finished.insert(id, container);
        }

        for (point, id) in std::mem::take(&mut self.placements) {
            if let Some(container) = finished.remove(&id) {
                map.add_fixture(point, container.into_tile()?);
            }
        }
        Ok(())
    }
}

fn depth_of(id: u32, parents: &HashMap<u32, u32>) -> Result<usize, IntegrityError> {
    let mut depth = 0;
    let mut current = id;
    while let Some(parent) = parents.get(&current) {
        depth += 1;
        if depth > parents.len() {
            return Err(IntegrityError::ContainmentCycle { id });
        }
        current = *parent;
    }
    Ok(depth)
}

fn attach(owner: &mut Container, member: Member) -> Result<(), IntegrityError> {
    match (owner, member) {
        (Container::Fortress(fortress), Member::Unit(unit)) => {
            fortress.add_member(FortressMember::Unit(unit));
        }
        (Container::Fortress(fortress), Member::ResourcePile(pile)) => {
            fortress.add_member(FortressMember::ResourcePile(pile));
        }
        (Container::Fortress(fortress), Member::Implement(implement)) => {
            fortress.add_member(FortressMember::Implement(implement));
        }
        (Container::Unit(unit), Member::Worker(worker)) => {
            unit.add_member(UnitMember::Worker(worker));
        }
        (Container::Unit(unit), Member::Animal(animal)) => {
            unit.add_member(UnitMember::Animal(animal));
        }
        (Container::Unit(unit), Member::Implement(implement)) => {
            unit.add_member(UnitMember::Implement(implement));
        }
        (Container::Unit(unit), Member::ResourcePile(pile)) => {
            unit.add_member(UnitMember::ResourcePile(pile));
        }
        (Container::Unit(unit), Member::Immortal(immortal)) => {
            unit.add_member(UnitMember::Immortal(immortal));
        }
        (Container::Town(town), Member::CommunityStats(stats)) => {
            if town.population.is_some() {
                return Err(IntegrityError::DuplicatePopulation { town: town.id });
            }
            town.population = Some(stats);
        }
        (Container::Village(village), Member::CommunityStats(stats)) => {
            if village.population.is_some() {
                return Err(IntegrityError::DuplicatePopulation { town: village.id });
            }
            village.population = Some(stats);
        }
        (Container::Worker(worker), Member::Animal(animal)) => {
            if worker.mount.is_some() {
                return Err(IntegrityError::DuplicateMount { worker: worker.id });
            }
            worker.mount = Some(animal);
        }
        (Container::Worker(worker), Member::Implement(implement)) => {
            worker.equipment.insert(implement.id, implement);
        }
        (owner, member) => {
            return Err(IntegrityError::UnsupportedMembership {
                owner_kind: owner.kind_name(),
                owner: owner.id(),
                member_kind: member.kind_name(),
                member: member.id().unwrap_or(owner.id()),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MapDimensions, TownKind, TownSize, TownStatus};
    use crate::world::warning::WarningLog;

    fn empty_map() -> GameMap {
        GameMap::new(MapDimensions::new(10, 10, 2), 0)
    }

    fn town(id: u32) -> Town {
        Town {
            id,
            kind: TownKind::Town,
            status: TownStatus::Active,
            size: TownSize::Small,
            name: "Riverside".to_string(),
            owner: 1,
            dc: 10,
            portrait: None,
            image: None,
            population: None,
        }
    }

    #[test]
    fn members_read_before_owners_are_attached() {
        let mut ctx = ResolutionContext::new();
        let mut map = empty_map();
        let point = Point::new(2, 3);

        ctx.add_containee(3, Member::Animal(Animal::new(4, "horse")));
        ctx.add_container(Location::Parent(2), Container::Worker(Worker::new(3, "Ana", "elf")));
        ctx.add_container(Location::Parent(1), Container::Unit(Unit::new(2, 1, "scouts", "Rangers")));
        ctx.add_container(Location::Point(point), Container::Fortress(Fortress::new(1, "Keep", 1)));

        ctx.resolve(&mut map).unwrap();

        let Some(TileFixture::Fortress(fortress)) = map.fixture_at(point, 1) else {
            panic!("fortress not placed");
        };
        let Some(FortressMember::Unit(unit)) = fortress.members.get(&2) else {
            panic!("unit not attached");
        };
        let Some(UnitMember::Worker(worker)) = unit.members.get(&3) else {
            panic!("worker not attached");
        };
        assert_eq!(worker.mount.as_ref().map(|a| a.id), Some(4));
    }

    #[test]
    fn orphaned_member_is_fatal() {
        let mut ctx = ResolutionContext::new();
        ctx.add_containee(99, Member::Animal(Animal::new(4, "horse")));
        let err = ctx.resolve(&mut empty_map()).unwrap_err();
        assert!(matches!(
            err,
            MapDbError::Integrity(IntegrityError::Orphan { owner: 99, member: 4 })
        ));
    }

    #[test]
    fn second_population_on_town_is_fatal() {
        let mut ctx = ResolutionContext::new();
        ctx.add_container(Location::Point(Point::new(0, 0)), Container::Town(town(7)));
        ctx.add_containee(7, Member::CommunityStats(CommunityStats::new(100)));
        ctx.add_containee(7, Member::CommunityStats(CommunityStats::new(200)));
        let err = ctx.resolve(&mut empty_map()).unwrap_err();
        assert!(matches!(
            err,
            MapDbError::Integrity(IntegrityError::DuplicatePopulation { town: 7 })
        ));
    }

    #[test]
    fn unknown_pairing_is_fatal() {
        let mut ctx = ResolutionContext::new();
        ctx.add_container(Location::Point(Point::new(0, 0)), Container::Town(town(7)));
        ctx.add_containee(7, Member::Animal(Animal::new(8, "goat")));
        let err = ctx.resolve(&mut empty_map()).unwrap_err();
        assert!(matches!(
            err,
            MapDbError::Integrity(IntegrityError::UnsupportedMembership {
                owner_kind: "town",
                member: 8,
                ..
            })
        ));
    }

    #[test]
    fn second_mount_is_fatal() {
        let mut ctx = ResolutionContext::new();
        ctx.add_container(Location::Parent(1), Container::Worker(Worker::new(3, "Ana", "elf")));
        ctx.add_container(Location::Point(Point::new(1, 1)), Container::Unit(Unit::new(1, 1, "a", "b")));
        ctx.add_containee(3, Member::Animal(Animal::new(4, "horse")));
        ctx.add_containee(3, Member::Animal(Animal::new(5, "pony")));
        let err = ctx.resolve(&mut empty_map()).unwrap_err();
        assert!(matches!(
            err,
            MapDbError::Integrity(IntegrityError::DuplicateMount { worker: 3 })
        ));
    }

    #[test]
    fn containment_cycle_is_detected() {
        let mut ctx = ResolutionContext::new();
        ctx.add_container(Location::Parent(2), Container::Unit(Unit::new(1, 1, "a", "b")));
        ctx.add_container(Location::Parent(1), Container::Unit(Unit::new(2, 1, "c", "d")));
        let err = ctx.resolve(&mut empty_map()).unwrap_err();
        assert!(matches!(
            err,
            MapDbError::Integrity(IntegrityError::ContainmentCycle { .. })
        ));
    }

    #[test]
    fn duplicate_ids_warn_and_clear_resets() {
        let mut ctx = ResolutionContext::new();
        let mut log = WarningLog::default();
        ctx.register_id(5, &mut log);
        ctx.register_id(5, &mut log);
        ctx.add_note(5, 1, "watch him".to_string());
        assert_eq!(log.warnings, vec![MapWarning::DuplicateId { id: 5 }]);

        ctx.clear();
        assert!(ctx.is_empty());
        ctx.register_id(5, &mut log);
        assert_eq!(log.warnings.len(), 1);
    }
}
