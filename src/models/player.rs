//! Player ledger entry.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in ledger operations and lookups).
pub type PlayerId = Uuid;

/// Normalized name used wherever players are matched by name: duplicate checks,
/// saved results and combined rankings.
pub fn player_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A registered player and everything they bought.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Buy-in plus rebuys. Always `1 + rebuys`.
    pub actions: u32,
    pub rebuys: u32,
    pub addons: u32,
    pub chips: u64,
    pub active: bool,
    /// Elimination order (first out = 1). None while the player is still in.
    pub position: Option<u32>,
    pub has_time_chip: bool,
    pub has_extra_chip: bool,
}

impl Player {
    /// Create a player holding a single buy-in worth `chips`.
    pub fn new(name: impl Into<String>, chips: u64, has_time_chip: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            actions: 1,
            rebuys: 0,
            addons: 0,
            chips,
            active: true,
            position: None,
            has_time_chip,
            has_extra_chip: false,
        }
    }

    pub fn rebuy(&mut self, chips: u64) {
        self.rebuys += 1;
        self.actions += 1;
        self.chips = self.chips.saturating_add(chips);
    }

    pub fn addon(&mut self, chips: u64) {
        self.addons += 1;
        self.chips = self.chips.saturating_add(chips);
    }

    /// Grant the one-time extra chip. Returns false if it was already granted.
    pub fn grant_extra_chip(&mut self, chips: u64) -> bool {
        if self.has_extra_chip {
            return false;
        }
        self.has_extra_chip = true;
        self.chips = self.chips.saturating_add(chips);
        true
    }

    /// Mark the player as out at the given elimination position.
    pub fn eliminate(&mut self, position: u32) {
        self.active = false;
        self.position = Some(position);
    }
}
