use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: i32,
    pub name: String,
    pub current: bool,
    #[serde(default)]
    pub portrait: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl Player {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            current: false,
            portrait: None,
            country: None,
        }
    }
}

/// The roster of players known to a map, keyed by player ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCollection {
    players: BTreeMap<i32, Player>,
}

impl PlayerCollection {
    /// Adds or replaces a player. Marking a player current clears the flag on
    /// every other player.
    pub fn add(&mut self, player: Player) {
        if player.current {
            for other in self.players.values_mut() {
                other.current = false;
            }
        }
        self.players.insert(player.id, player);
    }

    pub fn get(&self, id: i32) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn current(&self) -> Option<&Player> {
        self.players.values().find(|player| player.current)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_player_is_current() {
        let mut players = PlayerCollection::default();
        let mut first = Player::new(1, "Alpha");
        first.current = true;
        players.add(first);
        let mut second = Player::new(2, "Beta");
        second.current = true;
        players.add(second);

        assert_eq!(players.current().map(|p| p.id), Some(2));
        assert!(!players.get(1).unwrap().current);
    }
}
