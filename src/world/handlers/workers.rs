use std::collections::HashMap;

use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, Job, Skill, Worker, WorkerStats};
use crate::world::dispatch::{Context, FixtureHandler, OwnerKind, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{owner_of, unexpected};
use crate::world::resolve::{Container, Location, ResolutionContext};
use crate::world::rows::read_rows;
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS workers (
  parent INTEGER NOT NULL,
  id INTEGER NOT NULL,
  name VARCHAR(64) NOT NULL,
  race VARCHAR(32) NOT NULL,
  image VARCHAR(255),
  portrait VARCHAR(255),
  hp INTEGER,
  max_hp INTEGER CHECK ((hp IS NULL) = (max_hp IS NULL)),
  strength INTEGER CHECK ((hp IS NULL) = (strength IS NULL)),
  dexterity INTEGER CHECK ((hp IS NULL) = (dexterity IS NULL)),
  constitution INTEGER CHECK ((hp IS NULL) = (constitution IS NULL)),
  intelligence INTEGER CHECK ((hp IS NULL) = (intelligence IS NULL)),
  wisdom INTEGER CHECK ((hp IS NULL) = (wisdom IS NULL)),
  charisma INTEGER CHECK ((hp IS NULL) = (charisma IS NULL))
);
"#,
    r#"
CREATE TABLE IF NOT EXISTS worker_job_levels (
  worker INTEGER NOT NULL,
  job VARCHAR(32) NOT NULL,
  level INTEGER NOT NULL CHECK (level >= 0)
);
"#,
    r#"
CREATE TABLE IF NOT EXISTS worker_skill_levels (
  worker INTEGER NOT NULL,
  associated_job VARCHAR(32) NOT NULL,
  skill VARCHAR(32) NOT NULL,
  level INTEGER NOT NULL CHECK (level >= 0),
  hours INTEGER NOT NULL CHECK (hours >= 0)
);
"#,
];

/// Workers belong to a unit. Their mount and equipment are written through
/// the same unit of work, so a worker is stored whole or not at all.
pub struct WorkerHandler;

impl WorkerHandler {
    fn read_jobs(conn: &Connection) -> Result<HashMap<u32, Vec<Job>>, MapDbError> {
        let mut jobs: HashMap<u32, Vec<Job>> = HashMap::new();
        read_rows(conn, "worker_job_levels", |row| {
            jobs.entry(row.get("worker")?)
                .or_default()
                .push(Job::new(row.get::<_, String>("job")?, row.get("level")?));
            Ok(())
        })?;
        read_rows(conn, "worker_skill_levels", |row| {
            let worker: u32 = row.get("worker")?;
            let job_name: String = row.get("associated_job")?;
            let skill = Skill {
                name: row.get("skill")?,
                level: row.get("level")?,
                hours: row.get("hours")?,
            };
            let worker_jobs = jobs.entry(worker).or_default();
            match worker_jobs.iter_mut().find(|job| job.name == job_name) {
                Some(job) => job.skills.push(skill),
                None => {
                    let mut job = Job::new(job_name, 0);
                    job.skills.push(skill);
                    worker_jobs.push(job);
                }
            }
            Ok(())
        })?;
        Ok(jobs)
    }
}

impl FixtureHandler for WorkerHandler {
    fn name(&self) -> &'static str {
        "workers"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["workers", "worker_job_levels", "worker_skill_levels"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Worker(_)) && context.is_owned_by(&[OwnerKind::Unit])
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Worker(worker) = fixture else {
            return Err(unexpected(fixture));
        };
        let parent = owner_of(fixture, context)?;
        let stats = worker.stats;
        let conn = uow.conn();
        conn.execute(
            "INSERT INTO workers (parent, id, name, race, image, portrait, hp, max_hp, strength, dexterity, constitution, intelligence, wisdom, charisma) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                parent,
                worker.id,
                worker.name,
                worker.race,
                worker.image,
                worker.portrait,
                stats.map(|s| s.hp),
                stats.map(|s| s.max_hp),
                stats.map(|s| s.strength),
                stats.map(|s| s.dexterity),
                stats.map(|s| s.constitution),
                stats.map(|s| s.intelligence),
                stats.map(|s| s.wisdom),
                stats.map(|s| s.charisma)
            ],
        )?;
        for job in &worker.jobs {
            conn.execute(
                "INSERT INTO worker_job_levels (worker, job, level) VALUES (?1, ?2, ?3)",
                params![worker.id, job.name, job.level],
            )?;
            for skill in &job.skills {
                conn.execute(
                    "INSERT INTO worker_skill_levels (worker, associated_job, skill, level, hours) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![worker.id, job.name, skill.name, skill.level, skill.hours],
                )?;
            }
        }
        let held = Context::owner(worker.id, OwnerKind::Worker);
        if let Some(mount) = &worker.mount {
            uow.write(FixtureRef::Animal(mount), held)?;
        }
        for implement in worker.equipment.values() {
            uow.write(FixtureRef::Implement(implement), held)?;
        }
        Ok(())
    }

    fn read(
        &self,
        conn: &Connection,
        _map: &mut GameMap,
        resolution: &mut ResolutionContext,
        warnings: &mut dyn WarningSink,
    ) -> Result<(), MapDbError> {
        let mut jobs = Self::read_jobs(conn)?;
        read_rows(conn, "workers", |row| {
            let id: u32 = row.get("id")?;
            let stats = match row.get::<_, Option<i32>>("hp")? {
                Some(hp) => Some(WorkerStats {
                    hp,
                    max_hp: row.get("max_hp")?,
                    strength: row.get("strength")?,
                    dexterity: row.get("dexterity")?,
                    constitution: row.get("constitution")?,
                    intelligence: row.get("intelligence")?,
                    wisdom: row.get("wisdom")?,
                    charisma: row.get("charisma")?,
                }),
                None => None,
            };
            let worker = Worker {
                image: row.get("image")?,
                portrait: row.get("portrait")?,
                stats,
                jobs: jobs.remove(&id).unwrap_or_default(),
                notes: resolution.take_notes(id),
                ..Worker::new(id, row.get::<_, String>("name")?, row.get::<_, String>("race")?)
            };
            resolution.register_id(id, warnings);
            resolution.add_container(Location::Parent(row.get("parent")?), Container::Worker(worker));
            Ok(())
        })
    }
}
