use std::collections::HashSet;

use rusqlite::{Connection, Transaction};

use crate::model::{FixtureRef, GameMap, Point};
use crate::world::config::MapDbConfig;
use crate::world::error::MapDbError;
use crate::world::handlers;
use crate::world::notes::NotesHandler;
use crate::world::resolve::ResolutionContext;
use crate::world::warning::WarningSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerKind {
    Fortress,
    Unit,
    Worker,
    Town,
    Village,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub id: u32,
    pub kind: OwnerKind,
}

/// What a fixture is written under: a tile, or the fixture that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Point(Point),
    Owner(Owner),
}

impl Context {
    pub fn owner(id: u32, kind: OwnerKind) -> Self {
        Context::Owner(Owner { id, kind })
    }

    pub fn is_point(&self) -> bool {
        matches!(self, Context::Point(_))
    }

    pub fn is_owned_by(&self, kinds: &[OwnerKind]) -> bool {
        match self {
            Context::Owner(owner) => kinds.contains(&owner.kind),
            Context::Point(_) => false,
        }
    }

    /// `(row, column, parent)` column values for this context.
    pub fn columns(&self) -> (Option<i32>, Option<i32>, Option<u32>) {
        match self {
            Context::Point(point) => (Some(point.row), Some(point.column), None),
            Context::Owner(owner) => (None, None, Some(owner.id)),
        }
    }
}

/// Schema, write and read logic for one kind of fixture.
pub trait FixtureHandler: Send + Sync {
    /// Key used to track lazy schema initialization.
    fn name(&self) -> &'static str;

    /// Every table this handler owns.
    fn tables(&self) -> &'static [&'static str];

    /// `CREATE TABLE IF NOT EXISTS` statements, in creation order.
    fn schema(&self) -> &'static [&'static str];

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool;

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError>;

    /// Reads every row into `map` (tile-rooted fixtures) or `resolution`
    /// (owned fixtures and containers). A missing table means no rows.
    fn read(
        &self,
        conn: &Connection,
        map: &mut GameMap,
        resolution: &mut ResolutionContext,
        warnings: &mut dyn WarningSink,
    ) -> Result<(), MapDbError>;
}

/// All fixture handlers, in dispatch order.
pub struct Registry {
    handlers: Vec<Box<dyn FixtureHandler>>,
    notes: NotesHandler,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            handlers: handlers::all(),
            notes: NotesHandler,
        }
    }
}

impl Registry {
    pub fn handlers(&self) -> &[Box<dyn FixtureHandler>] {
        &self.handlers
    }

    pub fn notes(&self) -> &NotesHandler {
        &self.notes
    }

    pub fn find(&self, fixture: FixtureRef<'_>, context: Context) -> Option<&dyn FixtureHandler> {
        self.handlers
            .iter()
            .find(|handler| handler.can_write(fixture, context))
            .map(|handler| handler.as_ref())
    }

    pub fn tables(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers
            .iter()
            .flat_map(|handler| handler.tables().iter().copied())
            .chain(self.notes.tables().iter().copied())
    }
}

/// One transaction that every write in a composite operation joins.
pub struct UnitOfWork<'a> {
    tx: Transaction<'a>,
    registry: &'a Registry,
    config: &'a MapDbConfig,
    initialized: &'a mut HashSet<&'static str>,
    pending: HashSet<&'static str>,
    recoveries: Vec<&'static str>,
    current_turn: i32,
}

impl<'a> UnitOfWork<'a> {
    pub fn new(
        tx: Transaction<'a>,
        registry: &'a Registry,
        config: &'a MapDbConfig,
        initialized: &'a mut HashSet<&'static str>,
        current_turn: i32,
    ) -> Self {
        Self {
            tx,
            registry,
            config,
            initialized,
            pending: HashSet::new(),
            recoveries: Vec::new(),
            current_turn,
        }
    }

    pub fn conn(&self) -> &Connection {
        &self.tx
    }

    pub fn config(&self) -> &MapDbConfig {
        self.config
    }

    pub fn current_turn(&self) -> i32 {
        self.current_turn
    }

    /// Runs a schema's statements unless this session already has.
    pub fn ensure_schema(
        &mut self,
        name: &'static str,
        schema: &[&str],
    ) -> Result<(), MapDbError> {
        if self.initialized.contains(name) || self.pending.contains(name) {
            return Ok(());
        }
        for statement in schema {
            self.tx.execute_batch(statement)?;
        }
        tracing::debug!(handler = name, "schema initialized");
        self.pending.insert(name);
        Ok(())
    }

    /// Writes one fixture (and, for composites, its members) with the first
    /// handler that accepts it. Notes go through the notes handler first.
    pub fn write(&mut self, fixture: FixtureRef<'_>, context: Context) -> Result<(), MapDbError> {
        let registry = self.registry;
        let Some(handler) = registry.find(fixture, context) else {
            return Err(MapDbError::NoHandler {
                kind: fixture.kind_name(),
                id: fixture.id(),
            });
        };
        if let (Some(notes), Some(id)) = (fixture.notes(), fixture.id()) {
            registry.notes().write(self, id, notes)?;
        }
        self.ensure_schema(handler.name(), handler.schema())?;
        handler.write(self, fixture, context)
    }

    /// Notes that a table had to be repaired mid-write.
    pub fn record_recovery(&mut self, table: &'static str) {
        self.recoveries.push(table);
    }

    /// Commits the transaction and returns the tables repaired along the way.
    pub fn commit(self) -> Result<Vec<&'static str>, MapDbError> {
        self.tx.commit()?;
        self.initialized.extend(self.pending);
        Ok(self.recoveries)
    }
}
