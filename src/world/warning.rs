/// Recoverable problems noticed while reading or writing a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapWarning {
    /// More than one fixture claims this ID; the last one read wins.
    DuplicateId { id: u32 },
    VersionMismatch { found: i32, supported: i32 },
    SchemaRecovered { table: &'static str },
}

impl std::fmt::Display for MapWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapWarning::DuplicateId { id } => write!(f, "duplicate fixture ID {}", id),
            MapWarning::VersionMismatch { found, supported } => write!(
                f,
                "map format version {} differs from supported version {}",
                found, supported
            ),
            MapWarning::SchemaRecovered { table } => {
                write!(f, "recovered from schema drift in {}", table)
            }
        }
    }
}

/// Where the engine reports warnings; the application decides what to show.
pub trait WarningSink {
    fn warn(&mut self, warning: MapWarning);
}

/// Collects warnings for later inspection.
#[derive(Debug, Default)]
pub struct WarningLog {
    pub warnings: Vec<MapWarning>,
}

impl WarningSink for WarningLog {
    fn warn(&mut self, warning: MapWarning) {
        tracing::debug!(%warning, "map warning recorded");
        self.warnings.push(warning);
    }
}

/// Forwards warnings to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWarnings;

impl WarningSink for LogWarnings {
    fn warn(&mut self, warning: MapWarning) {
        tracing::warn!(%warning, "map warning");
    }
}
