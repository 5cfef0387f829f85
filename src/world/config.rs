use std::collections::HashMap;

/// Session options for a map store.
#[derive(Debug, Clone)]
pub struct MapDbConfig {
    /// Turns after birth at which an animal of a kind counts as adult. Birth
    /// turns of adult animals are not persisted.
    pub maturity_ages: HashMap<String, i32>,
    /// Use write-ahead journaling for file-backed stores.
    pub wal: bool,
}

impl Default for MapDbConfig {
    fn default() -> Self {
        let maturity_ages = [
            ("horse", 12),
            ("cattle", 8),
            ("sheep", 6),
            ("goat", 6),
            ("pig", 4),
            ("chicken", 2),
            ("dog", 4),
        ]
        .into_iter()
        .map(|(kind, age)| (kind.to_string(), age))
        .collect();
        Self {
            maturity_ages,
            wal: false,
        }
    }
}

impl MapDbConfig {
    pub fn with_maturity_age(mut self, kind: impl Into<String>, turns: i32) -> Self {
        self.maturity_ages.insert(kind.into(), turns);
        self
    }

    pub fn with_wal(mut self, wal: bool) -> Self {
        self.wal = wal;
        self
    }

    pub fn maturity_age(&self, kind: &str) -> Option<i32> {
        self.maturity_ages.get(kind).copied()
    }

    /// Whether an animal's birth turn is still worth storing: it is unless
    /// the kind has a known maturity age and the animal has reached it.
    pub fn should_store_birth(&self, kind: &str, born: i32, current_turn: i32) -> bool {
        if current_turn < 0 {
            return true;
        }
        match self.maturity_age(kind) {
            Some(age) => current_turn - born < age,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn birth_is_dropped_once_mature() {
        let config = MapDbConfig::default().with_maturity_age("wolf", 5);
        assert!(config.should_store_birth("wolf", 8, 10));
        assert!(!config.should_store_birth("wolf", 5, 10));
        assert!(config.should_store_birth("unknown beast", 0, 100));
        assert!(config.should_store_birth("wolf", 0, -1));
    }
}
