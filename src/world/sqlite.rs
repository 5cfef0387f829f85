use std::collections::HashSet;
use std::path::Path;

use rusqlite::Connection;

use crate::model::{FixtureRef, GameMap, Player};
use crate::world::config::MapDbConfig;
use crate::world::dispatch::{Context, Registry, UnitOfWork};
use crate::world::drift::Recovery;
use crate::world::error::MapDbError;
use crate::world::players::{read_players, write_player};
use crate::world::resolve::ResolutionContext;
use crate::world::schema::{migrate, table_exists};
use crate::world::terrain::{
    read_metadata, read_roads_and_bookmarks, read_terrain, write_metadata, write_terrain,
    MAP_TABLES,
};
use crate::world::warning::{MapWarning, WarningSink};

/// Newest map format version this engine reads without complaint.
pub const SUPPORTED_MAP_VERSION: i32 = 2;

/// One session against a map store.
pub struct MapDb {
    conn: Connection,
    config: MapDbConfig,
    registry: Registry,
    initialized: HashSet<&'static str>,
}

impl MapDb {
    pub fn open(path: impl AsRef<Path>, config: MapDbConfig) -> Result<Self, MapDbError> {
        let conn = Connection::open(path)?;
        if config.wal {
            let mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            tracing::debug!(mode = %mode, "journal mode set");
        }
        Self::with_connection(conn, config)
    }

    pub fn open_in_memory(config: MapDbConfig) -> Result<Self, MapDbError> {
        Self::with_connection(Connection::open_in_memory()?, config)
    }

    /// Wraps a connection the application already holds, migrating the
    /// store it points at first.
    pub fn with_connection(mut conn: Connection, config: MapDbConfig) -> Result<Self, MapDbError> {
        let version = migrate(&mut conn)?;
        tracing::debug!(schema_version = version, "map store ready");
        Ok(Self {
            conn,
            config,
            registry: Registry::default(),
            initialized: HashSet::new(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn config(&self) -> &MapDbConfig {
        &self.config
    }

    /// Forgets which tables this session has created, so the next write
    /// re-applies every `CREATE TABLE IF NOT EXISTS`.
    pub fn clear_cache(&mut self) {
        self.initialized.clear();
    }

    fn unit_of_work(&mut self, current_turn: i32) -> Result<UnitOfWork<'_>, MapDbError> {
        let tx = self.conn.transaction()?;
        Ok(UnitOfWork::new(
            tx,
            &self.registry,
            &self.config,
            &mut self.initialized,
            current_turn,
        ))
    }

    /// Replaces the store's contents with `map`, in one transaction.
    pub fn write_map(
        &mut self,
        map: &GameMap,
        warnings: &mut dyn WarningSink,
    ) -> Result<(), MapDbError> {
        let tables: Vec<&'static str> = MAP_TABLES
            .iter()
            .copied()
            .chain(self.registry.tables())
            .collect();
        let mut uow = self.unit_of_work(map.current_turn)?;
        for table in tables {
            if table_exists(uow.conn(), table)? {
                uow.conn().execute(&format!("DELETE FROM \"{}\"", table), [])?;
            }
        }

        write_metadata(&mut uow, map)?;
        for player in map.players.iter() {
            write_player(&mut uow, player)?;
        }
        write_terrain(&mut uow, map)?;
        for (point, fixture) in map.tile_fixtures() {
            uow.write(fixture.as_fixture(), Context::Point(point))?;
        }

        for table in uow.commit()? {
            warnings.warn(MapWarning::SchemaRecovered { table });
        }
        tracing::info!(
            players = map.players.len(),
            fixtures = map.fixture_count(),
            "map written"
        );
        Ok(())
    }

    /// Writes one fixture, and everything it contains, in its own transaction.
    pub fn write_fixture(
        &mut self,
        fixture: FixtureRef<'_>,
        context: Context,
        current_turn: i32,
    ) -> Result<Recovery, MapDbError> {
        let mut uow = self.unit_of_work(current_turn)?;
        uow.write(fixture, context)?;
        let recovered = uow.commit()?;
        Ok(if recovered.is_empty() {
            Recovery::Clean
        } else {
            Recovery::Retried
        })
    }

    pub fn write_player(&mut self, player: &Player) -> Result<Recovery, MapDbError> {
        let mut uow = self.unit_of_work(-1)?;
        let recovery = write_player(&mut uow, player)?;
        uow.commit()?;
        Ok(recovery)
    }

    pub fn read_map(&self, warnings: &mut dyn WarningSink) -> Result<GameMap, MapDbError> {
        let mut resolution = ResolutionContext::new();
        self.read_map_with(&mut resolution, warnings)
    }

    /// Reads the whole map using a caller-supplied resolution context. The
    /// context is cleared before and after, whether or not the read succeeds.
    pub fn read_map_with(
        &self,
        resolution: &mut ResolutionContext,
        warnings: &mut dyn WarningSink,
    ) -> Result<GameMap, MapDbError> {
        resolution.clear();
        let result = self.read_into(resolution, warnings);
        resolution.clear();
        result
    }

    fn read_into(
        &self,
        resolution: &mut ResolutionContext,
        warnings: &mut dyn WarningSink,
    ) -> Result<GameMap, MapDbError> {
        let Some((dimensions, current_turn)) = read_metadata(&self.conn)? else {
            return Err(MapDbError::InvalidData(
                "store holds no map metadata".to_string(),
            ));
        };
        if dimensions.version > SUPPORTED_MAP_VERSION {
            return Err(MapDbError::UnsupportedVersion {
                found: i64::from(dimensions.version),
                supported: i64::from(SUPPORTED_MAP_VERSION),
            });
        }
        if dimensions.version != SUPPORTED_MAP_VERSION {
            warnings.warn(MapWarning::VersionMismatch {
                found: dimensions.version,
                supported: SUPPORTED_MAP_VERSION,
            });
        }

        let mut map = GameMap::new(dimensions, current_turn);
        read_players(&self.conn, &mut map)?;
        read_terrain(&self.conn, &mut map)?;
        read_roads_and_bookmarks(&self.conn, &mut map)?;
        self.registry.notes().read(&self.conn, resolution)?;
        for handler in self.registry.handlers() {
            handler.read(&self.conn, &mut map, resolution, warnings)?;
        }
        resolution.resolve(&mut map)?;
        map.set_modified(false);
        tracing::info!(
            players = map.players.len(),
            fixtures = map.fixture_count(),
            "map read"
        );
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;

    use super::*;
    use crate::model::{
        Adventure, Animal, Cave, CommunityStats, Direction, FieldStatus, Forest, Fortress,
        FortressMember, Hill, Immortal, Implement, Job, KindedImmortal, KindedImmortalKind, MapDimensions,
        Meadow, Mine, Point, Portal, Quantity, ResourcePile, River, Shrub, SimpleImmortal,
        SimpleImmortalKind, Skill, TextFixture, TileFixture, TileType, Town, TownKind, TownSize,
        TownStatus, Unit, UnitMember, Village, Worker, WorkerStats,
    };
    use crate::model::{AnimalTracks, Battlefield, CacheFixture, Ground, Grove, MineralVein, Oasis, StoneDeposit};
    use crate::world::dispatch::OwnerKind;
    use crate::world::error::IntegrityError;
    use crate::world::players::LEGACY_PLAYERS_SCHEMA;
    use crate::world::schema::column_exists;
    use crate::world::warning::WarningLog;

    fn db() -> MapDb {
        MapDb::open_in_memory(MapDbConfig::default()).unwrap()
    }

    fn row_count(db: &MapDb, table: &str) -> i64 {
        if !table_exists(db.connection(), table).unwrap() {
            return 0;
        }
        db.connection()
            .query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table), [], |row| row.get(0))
            .unwrap()
    }

    fn pile(id: u32, contents: &str, number: Decimal) -> ResourcePile {
        ResourcePile {
            id,
            kind: "food".to_string(),
            contents: contents.to_string(),
            quantity: Quantity::new(number, "pounds"),
            created: Some(3),
            image: None,
        }
    }

    fn smith() -> Worker {
        let mut smith = Worker::new(3, "Brannoc", "dwarf");
        let mut job = Job::new("smith", 2);
        job.skills.push(Skill {
            name: "forging".to_string(),
            level: 1,
            hours: 10,
        });
        smith.jobs.push(job);
        smith.stats = Some(WorkerStats {
            hp: 8,
            max_hp: 10,
            strength: 14,
            dexterity: 11,
            constitution: 13,
            intelligence: 10,
            wisdom: 9,
            charisma: 8,
        });
        smith.notes.insert(1, "steady hands".to_string());
        smith.mount = Some(Animal {
            status: "domesticated".to_string(),
            ..Animal::new(4, "pony")
        });
        smith.equipment.insert(
            5,
            Implement {
                id: 5,
                kind: "hammer".to_string(),
                count: 1,
                image: None,
            },
        );
        smith
    }

    fn keep() -> Fortress {
        let mut unit = Unit::new(2, 1, "smiths", "Forge Crew");
        unit.orders.insert(5, "Work the forge".to_string());
        unit.results.insert(4, "Made 3 swords".to_string());
        unit.add_member(UnitMember::Worker(smith()));
        unit.add_member(UnitMember::ResourcePile(pile(6, "iron", Decimal::new(125, 1))));
        unit.add_member(UnitMember::Immortal(Immortal::Simple(SimpleImmortal {
            id: 7,
            kind: SimpleImmortalKind::Griffin,
            dc: 20,
            image: None,
        })));
        let mut fortress = Fortress::new(1, "Stonekeep", 1);
        fortress.size = TownSize::Medium;
        fortress.add_member(FortressMember::Unit(unit));
        fortress.add_member(FortressMember::Implement(Implement {
            id: 8,
            kind: "anvil".to_string(),
            count: 2,
            image: None,
        }));
        fortress
    }

    fn silver_mine() -> Mine {
        Mine {
            id: 20,
            kind: "silver".to_string(),
            status: TownStatus::Active,
            image: None,
        }
    }

    fn sample_map() -> GameMap {
        let mut map = GameMap::new(MapDimensions::new(10, 12, 2), 10);
        let mut alice = Player::new(1, "Alice");
        alice.current = true;
        alice.country = Some("Aldor".to_string());
        map.players.add(alice);
        map.players.add(Player::new(2, "Bob"));

        let origin = Point::new(2, 3);
        map.set_terrain(origin, TileType::Plains);
        map.set_mountainous(Point::new(0, 0), true);
        map.add_river(origin, River::North);
        map.add_river(origin, River::Lake);
        map.set_road(origin, Direction::East, 3);
        map.add_bookmark(Point::new(5, 5), 2);

        map.add_fixture(origin, TileFixture::Fortress(keep()));
        map.add_fixture(Point::new(3, 4), TileFixture::Mine(silver_mine()));

        let mut stats = CommunityStats::new(400);
        stats.skill_levels.insert("farming".to_string(), 3);
        stats.worked_fields = BTreeSet::from([30]);
        stats.produced.insert(60, pile(60, "wheat", Decimal::new(40, 0)));
        stats.consumed.insert(61, pile(61, "beer", Decimal::new(55, 1)));
        map.add_fixture(
            Point::new(4, 4),
            TileFixture::Town(Town {
                id: 21,
                kind: TownKind::City,
                status: TownStatus::Active,
                size: TownSize::Large,
                name: "Eastmarch".to_string(),
                owner: 2,
                dc: 15,
                portrait: None,
                image: Some("city.png".to_string()),
                population: Some(stats),
            }),
        );
        map.add_fixture(
            Point::new(4, 5),
            TileFixture::Village(Village {
                id: 22,
                status: TownStatus::Burned,
                name: "Ashby".to_string(),
                owner: -1,
                race: "human".to_string(),
                portrait: None,
                image: None,
                population: None,
            }),
        );
        map.add_fixture(
            Point::new(4, 4),
            TileFixture::Meadow(Meadow {
                id: 30,
                kind: "wheat".to_string(),
                field: true,
                cultivated: true,
                status: FieldStatus::Growing,
                acres: Decimal::new(35, 1),
                image: None,
            }),
        );
        map.add_fixture(
            Point::new(1, 1),
            TileFixture::Forest(Forest {
                id: 31,
                kind: "oak".to_string(),
                rows: false,
                acres: Decimal::new(120, 0),
                image: None,
            }),
        );
        map.add_fixture(
            Point::new(1, 1),
            TileFixture::Shrub(Shrub {
                id: 32,
                kind: "bramble".to_string(),
                population: 20,
                image: None,
            }),
        );
        map.add_fixture(
            Point::new(1, 2),
            TileFixture::Animal(Animal {
                population: 6,
                ..Animal::new(33, "wolf")
            }),
        );
        map.add_fixture(
            Point::new(1, 2),
            TileFixture::Immortal(Immortal::Kinded(KindedImmortal {
                id: 34,
                kind: KindedImmortalKind::Dragon,
                race: "red".to_string(),
                dc: 30,
                image: None,
            })),
        );
        map.add_fixture(Point::new(6, 6), TileFixture::Cave(Cave { id: 35, dc: 12, image: None }));
        map.add_fixture(Point::new(6, 6), TileFixture::Hill(Hill { id: 36, image: None }));
        map.add_fixture(
            Point::new(6, 7),
            TileFixture::Portal(Portal {
                id: 37,
                destination_world: "underdark".to_string(),
                destination: Some(Point::new(1, 1)),
                image: None,
            }),
        );
        map.add_fixture(
            Point::new(6, 7),
            TileFixture::Text(TextFixture {
                id: 38,
                text: "Here be dragons".to_string(),
                turn: Some(3),
                image: None,
            }),
        );
        map.add_fixture(
            Point::new(7, 7),
            TileFixture::Adventure(Adventure {
                id: 39,
                brief: "A lost heirloom".to_string(),
                full: "A merchant's ring went missing near the ford.".to_string(),
                owner: Some(1),
                image: None,
            }),
        );
        map
    }

    #[test]
    fn map_round_trips() {
        let mut db = db();
        let map = sample_map();
        let mut warnings = WarningLog::default();
        db.write_map(&map, &mut warnings).unwrap();
        let read = db.read_map(&mut warnings).unwrap();
        assert_eq!(read, map);
        assert!(!read.is_modified());
        assert!(warnings.warnings.is_empty(), "{:?}", warnings.warnings);
    }

    #[test]
    fn rewriting_a_map_replaces_it() {
        let mut db = db();
        let map = sample_map();
        let mut warnings = WarningLog::default();
        db.write_map(&map, &mut warnings).unwrap();
        db.write_map(&map, &mut warnings).unwrap();
        assert_eq!(row_count(&db, "mines"), 1);
        assert_eq!(db.read_map(&mut warnings).unwrap(), map);
    }

    #[test]
    fn schema_initialization_is_idempotent() {
        let mut db = db();
        let map = sample_map();
        db.write_map(&map, &mut WarningLog::default()).unwrap();
        db.clear_cache();
        db.write_map(&map, &mut WarningLog::default()).unwrap();
        let tables: i64 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'fortresses'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn resource_pile_on_a_tile_is_rejected() {
        let mut db = db();
        let pile = pile(9, "gold", Decimal::new(1, 0));
        let err = db
            .write_fixture(FixtureRef::ResourcePile(&pile), Context::Point(Point::new(0, 0)), 0)
            .unwrap_err();
        assert!(matches!(
            err,
            MapDbError::NoHandler {
                kind: "resource pile",
                id: Some(9)
            }
        ));
        assert_eq!(row_count(&db, "resource_piles"), 0);
        assert!(db
            .registry
            .find(FixtureRef::ResourcePile(&pile), Context::owner(2, OwnerKind::Unit))
            .is_some());
    }

    #[test]
    fn players_table_without_country_is_repaired_once() {
        let mut db = db();
        db.connection().execute_batch(LEGACY_PLAYERS_SCHEMA).unwrap();

        let mut carol = Player::new(3, "Carol");
        carol.country = Some("Brenn".to_string());
        assert_eq!(db.write_player(&carol).unwrap(), Recovery::Retried);
        assert!(column_exists(db.connection(), "players", "country").unwrap());

        let country: Option<String> = db
            .connection()
            .query_row("SELECT country FROM players WHERE id = 3", [], |row| row.get(0))
            .unwrap();
        assert_eq!(country.as_deref(), Some("Brenn"));
        assert_eq!(db.write_player(&Player::new(4, "Dana")).unwrap(), Recovery::Clean);
    }

    #[test]
    fn drift_during_map_write_is_reported() {
        let mut db = db();
        db.connection().execute_batch(LEGACY_PLAYERS_SCHEMA).unwrap();
        let mut warnings = WarningLog::default();
        db.write_map(&sample_map(), &mut warnings).unwrap();
        assert_eq!(
            warnings.warnings,
            vec![MapWarning::SchemaRecovered { table: "players" }]
        );
    }

    #[test]
    fn member_without_owner_is_fatal() {
        let mut db = db();
        db.write_map(&sample_map(), &mut WarningLog::default()).unwrap();
        db.connection()
            .execute(
                "INSERT INTO animals (parent, id, kind, talking, status, population) VALUES (999, 90, 'goat', 0, 'wild', 1)",
                [],
            )
            .unwrap();
        let err = db.read_map(&mut WarningLog::default()).unwrap_err();
        assert!(matches!(
            err,
            MapDbError::Integrity(IntegrityError::Orphan { owner: 999, member: 90 })
        ));
    }

    #[test]
    fn second_population_for_a_town_is_fatal() {
        let mut db = db();
        db.write_map(&sample_map(), &mut WarningLog::default()).unwrap();
        db.connection()
            .execute("INSERT INTO town_populations (town, population) VALUES (21, 5)", [])
            .unwrap();
        let err = db.read_map(&mut WarningLog::default()).unwrap_err();
        assert!(matches!(
            err,
            MapDbError::Integrity(IntegrityError::DuplicatePopulation { town: 21 })
        ));
    }

    #[test]
    fn nested_fortress_members_come_back_whole() {
        let mut db = db();
        db.write_map(&sample_map(), &mut WarningLog::default()).unwrap();
        let map = db.read_map(&mut WarningLog::default()).unwrap();

        let Some(TileFixture::Fortress(fortress)) = map.fixture_at(Point::new(2, 3), 1) else {
            panic!("fortress missing");
        };
        let Some(FortressMember::Unit(unit)) = fortress.members.get(&2) else {
            panic!("unit missing from fortress");
        };
        let Some(UnitMember::Worker(worker)) = unit.members.get(&3) else {
            panic!("worker missing from unit");
        };
        let job = worker.job("smith").unwrap();
        assert_eq!(job.level, 2);
        assert_eq!(
            job.skills,
            vec![Skill {
                name: "forging".to_string(),
                level: 1,
                hours: 10
            }]
        );
        assert_eq!(worker.notes.get(&1).map(String::as_str), Some("steady hands"));
        assert_eq!(worker.mount.as_ref().map(|mount| mount.id), Some(4));
        assert!(worker.equipment.contains_key(&5));
        assert_eq!(unit.orders.get(&5).map(String::as_str), Some("Work the forge"));
    }

    #[test]
    fn silver_mine_is_found_at_its_tile() {
        let mut db = db();
        let mut map = GameMap::new(MapDimensions::new(5, 5, 2), 0);
        map.add_fixture(Point::new(3, 4), TileFixture::Mine(silver_mine()));
        db.write_map(&map, &mut WarningLog::default()).unwrap();

        let read = db.read_map(&mut WarningLog::default()).unwrap();
        let fixtures: Vec<_> = read.fixtures_at(Point::new(3, 4)).collect();
        assert_eq!(fixtures, vec![&TileFixture::Mine(silver_mine())]);
        assert_eq!(read.fixture_count(), 1);
    }

    #[test]
    fn failed_composite_write_leaves_nothing_behind() {
        let mut db = db();
        let mut broken = keep();
        if let Some(FortressMember::Unit(unit)) = broken.members.get_mut(&2) {
            if let Some(UnitMember::Worker(worker)) = unit.members.get_mut(&3) {
                if let Some(mount) = worker.mount.as_mut() {
                    mount.population = -1;
                }
            }
        }
        let point = Context::Point(Point::new(2, 3));
        assert!(db.write_fixture(FixtureRef::Fortress(&broken), point, 0).is_err());
        for table in ["fortresses", "units", "workers", "worker_job_levels", "implements", "notes"] {
            assert_eq!(row_count(&db, table), 0, "{} kept rows", table);
        }

        // Tables created by the rolled-back write must be created again.
        db.write_fixture(FixtureRef::Fortress(&keep()), point, 0).unwrap();
        assert_eq!(row_count(&db, "fortresses"), 1);
        assert_eq!(row_count(&db, "workers"), 1);
    }

    #[test]
    fn repeated_ids_are_reported() {
        let mut db = db();
        let mut map = GameMap::new(MapDimensions::new(5, 5, 2), 0);
        map.add_fixture(Point::new(0, 0), TileFixture::Mine(silver_mine()));
        map.add_fixture(Point::new(1, 1), TileFixture::Cave(Cave { id: 20, dc: 5, image: None }));
        db.write_map(&map, &mut WarningLog::default()).unwrap();

        let mut warnings = WarningLog::default();
        db.read_map(&mut warnings).unwrap();
        assert_eq!(warnings.warnings, vec![MapWarning::DuplicateId { id: 20 }]);
    }

    #[test]
    fn older_map_version_warns_and_newer_fails() {
        let mut db = db();
        let mut warnings = WarningLog::default();
        db.write_map(&GameMap::new(MapDimensions::new(3, 3, 1), 0), &mut warnings)
            .unwrap();
        db.read_map(&mut warnings).unwrap();
        assert_eq!(
            warnings.warnings,
            vec![MapWarning::VersionMismatch {
                found: 1,
                supported: SUPPORTED_MAP_VERSION
            }]
        );

        db.write_map(&GameMap::new(MapDimensions::new(3, 3, 3), 0), &mut warnings)
            .unwrap();
        assert!(matches!(
            db.read_map(&mut warnings),
            Err(MapDbError::UnsupportedVersion { found: 3, .. })
        ));
    }

    #[test]
    fn store_with_only_metadata_reads_as_empty_map() {
        let mut db = db();
        let map = GameMap::new(MapDimensions::new(3, 3, 2), 7);
        db.write_map(&map, &mut WarningLog::default()).unwrap();
        let read = db.read_map(&mut WarningLog::default()).unwrap();
        assert_eq!(read, map);
        assert_eq!(read.fixture_count(), 0);
    }

    #[test]
    fn store_without_metadata_is_invalid() {
        let db = db();
        assert!(matches!(
            db.read_map(&mut WarningLog::default()),
            Err(MapDbError::InvalidData(_))
        ));
    }

    #[test]
    fn resolution_context_is_left_empty() {
        let mut db = db();
        db.write_map(&sample_map(), &mut WarningLog::default()).unwrap();
        let mut resolution = ResolutionContext::new();
        let mut warnings = WarningLog::default();
        let first = db.read_map_with(&mut resolution, &mut warnings).unwrap();
        assert!(resolution.is_empty());
        let second = db.read_map_with(&mut resolution, &mut warnings).unwrap();
        assert_eq!(first, second);
        assert!(warnings.warnings.is_empty());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.db");
        let map = sample_map();
        {
            let mut db = MapDb::open(&path, MapDbConfig::default().with_wal(true)).unwrap();
            db.write_map(&map, &mut WarningLog::default()).unwrap();
        }
        let db = MapDb::open(&path, MapDbConfig::default()).unwrap();
        assert_eq!(db.read_map(&mut WarningLog::default()).unwrap(), map);
    }

    fn wilderness_map() -> GameMap {
        let mut map = GameMap::new(MapDimensions::new(8, 8, 2), 12);
        let camp = Point::new(2, 2);
        map.add_fixture(
            camp,
            TileFixture::AnimalTracks(AnimalTracks {
                id: 101,
                kind: "deer".to_string(),
                image: None,
            }),
        );
        map.add_fixture(
            camp,
            TileFixture::Cache(CacheFixture {
                id: 102,
                kind: "chest".to_string(),
                contents: "old coins".to_string(),
                image: Some("chest.png".to_string()),
            }),
        );
        map.add_fixture(camp, TileFixture::Battlefield(Battlefield { id: 103, dc: 8, image: None }));
        map.add_fixture(
            Point::new(3, 3),
            TileFixture::Ground(Ground {
                id: 104,
                kind: "granite".to_string(),
                exposed: true,
                image: None,
            }),
        );
        map.add_fixture(
            Point::new(3, 3),
            TileFixture::Grove(Grove {
                id: 105,
                kind: "apple".to_string(),
                orchard: true,
                cultivated: true,
                population: 40,
                image: None,
            }),
        );
        map.add_fixture(
            Point::new(3, 4),
            TileFixture::MineralVein(MineralVein {
                id: 106,
                kind: "iron".to_string(),
                exposed: false,
                dc: 18,
                image: None,
            }),
        );
        map.add_fixture(
            Point::new(3, 4),
            TileFixture::StoneDeposit(StoneDeposit {
                id: 107,
                kind: "marble".to_string(),
                dc: 14,
                image: None,
            }),
        );
        map.add_fixture(Point::new(5, 5), TileFixture::Oasis(Oasis { id: 108, image: None }));
        map.add_fixture(
            Point::new(5, 5),
            TileFixture::Shrub(Shrub {
                id: 109,
                kind: "saltbush".to_string(),
                population: -1,
                image: None,
            }),
        );

        let mut caravan = Unit::new(110, 2, "traders", "Salt Caravan");
        caravan.orders.insert(-1, "Keep moving".to_string());
        caravan.results.insert(11, "Crossed the dunes".to_string());
        caravan.add_member(UnitMember::Animal(Animal {
            population: 4,
            status: "domesticated".to_string(),
            ..Animal::new(111, "camel")
        }));
        caravan.add_member(UnitMember::Implement(Implement {
            id: 112,
            kind: "waterskin".to_string(),
            count: 6,
            image: None,
        }));
        caravan.add_member(UnitMember::ResourcePile(pile(113, "salt", Decimal::new(2505, 2))));
        caravan.add_member(UnitMember::Immortal(Immortal::Simple(SimpleImmortal {
            id: 114,
            kind: SimpleImmortalKind::Kraken,
            dc: 25,
            image: None,
        })));
        map.add_fixture(Point::new(5, 6), TileFixture::Unit(caravan));

        let mut stats = CommunityStats::new(120);
        stats.skill_levels.insert("herding".to_string(), 2);
        stats.worked_fields = BTreeSet::from([105]);
        stats.produced.insert(115, pile(115, "cider", Decimal::new(75, 1)));
        map.add_fixture(
            Point::new(6, 6),
            TileFixture::Village(Village {
                id: 116,
                status: TownStatus::Active,
                name: "Millbrook".to_string(),
                owner: 2,
                race: "halfling".to_string(),
                portrait: None,
                image: None,
                population: Some(stats),
            }),
        );
        map
    }

    #[test]
    fn every_fixture_kind_round_trips() {
        let mut db = db();
        let map = wilderness_map();
        let mut warnings = WarningLog::default();
        db.write_map(&map, &mut warnings).unwrap();
        let read = db.read_map(&mut warnings).unwrap();
        assert_eq!(read, map);
        assert!(warnings.warnings.is_empty());

        let Some(TileFixture::Unit(caravan)) = read.fixture_at(Point::new(5, 6), 110) else {
            panic!("unit missing from its tile");
        };
        assert_eq!(caravan.members.len(), 4);
        assert_eq!(caravan.orders.get(&-1).map(String::as_str), Some("Keep moving"));
        let Some(TileFixture::Shrub(shrub)) = read.fixture_at(Point::new(5, 5), 109) else {
            panic!("shrub missing");
        };
        assert_eq!(shrub.population, -1);
    }

    #[test]
    fn negative_acreage_is_rejected_with_its_fixture() {
        let mut db = db();
        let mut map = GameMap::new(MapDimensions::new(5, 5, 2), 0);
        map.add_fixture(Point::new(3, 4), TileFixture::Mine(silver_mine()));
        map.add_fixture(
            Point::new(1, 1),
            TileFixture::Forest(Forest {
                id: 41,
                kind: "birch".to_string(),
                rows: false,
                acres: Decimal::new(-1, 0),
                image: None,
            }),
        );
        let err = db.write_map(&map, &mut WarningLog::default()).unwrap_err();
        let MapDbError::InvalidData(message) = err else {
            panic!("expected invalid data, got {:?}", err);
        };
        assert!(message.contains("forest 41"));
        assert_eq!(row_count(&db, "metadata"), 0);
        assert_eq!(row_count(&db, "mines"), 0);
    }

    #[test]
    fn negative_pile_quantity_is_rejected() {
        let mut db = db();
        let mut unit = Unit::new(2, 1, "porters", "Bearers");
        unit.add_member(UnitMember::ResourcePile(pile(6, "grain", Decimal::new(-25, 1))));
        let result = db.write_fixture(FixtureRef::Unit(&unit), Context::Point(Point::new(0, 0)), 0);
        assert!(matches!(result, Err(MapDbError::InvalidData(message)) if message.contains("resource pile 6")));
        assert_eq!(row_count(&db, "units"), 0);
    }

    #[test]
    fn only_minus_one_means_unknown() {
        let mut db = db();
        let tile = Context::Point(Point::new(1, 1));
        let shrub = Shrub {
            id: 50,
            kind: "heather".to_string(),
            population: -5,
            image: None,
        };
        assert!(matches!(
            db.write_fixture(FixtureRef::Shrub(&shrub), tile, 0),
            Err(MapDbError::InvalidData(_))
        ));

        let mut unit = Unit::new(51, 1, "scouts", "Outriders");
        unit.results.insert(-5, "Lost".to_string());
        assert!(matches!(
            db.write_fixture(FixtureRef::Unit(&unit), tile, 0),
            Err(MapDbError::InvalidData(_))
        ));
        assert_eq!(row_count(&db, "shrubs"), 0);
        assert_eq!(row_count(&db, "unit_results"), 0);
    }
}
