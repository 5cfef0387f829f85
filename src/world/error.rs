use thiserror::Error;

/// Violations of the containment structure found while assembling a map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("fixture {member} references missing owner {owner}")]
    Orphan { owner: u32, member: u32 },

    #[error("town {town} has more than one set of population statistics")]
    DuplicatePopulation { town: u32 },

    #[error("worker {worker} has more than one mount")]
    DuplicateMount { worker: u32 },

    #[error("a {member_kind} ({member}) cannot be a member of a {owner_kind} ({owner})")]
    UnsupportedMembership {
        owner_kind: &'static str,
        owner: u32,
        member_kind: &'static str,
        member: u32,
    },

    #[error("fixture {id} is nested inside itself")]
    ContainmentCycle { id: u32 },
}

#[derive(Debug, Error)]
pub enum MapDbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("map integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("no handler accepts {kind} {id:?} in this context")]
    NoHandler { kind: &'static str, id: Option<u32> },

    #[error("{0}")]
    InvalidData(String),

    #[error("store version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: i64, supported: i64 },

    #[error("schema of {table} still mismatched after recovery: {source}")]
    SchemaDrift {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
