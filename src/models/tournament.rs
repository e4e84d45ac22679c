//! Tournament record, its grouped configuration, and the tagged update type.

use crate::models::blind::{BlindLevel, BlindSchedule, MAX_LEVEL_MINUTES};
use crate::models::player::{player_key, Player, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, PartialEq)]
pub enum TournamentError {
    /// Names must contain something other than whitespace.
    InvalidName,
    /// A player with this name already exists (names are unique, case-insensitive).
    DuplicatePlayerName,
    /// Player not found in the ledger.
    PlayerNotFound(PlayerId),
    /// The player was already eliminated.
    AlreadyEliminated(PlayerId),
    /// Extra chips are disabled in the financial configuration.
    ExtraChipDisabled,
    /// The player already received the extra chip.
    ExtraChipAlreadyGranted(PlayerId),
    /// No schedule entry at this index.
    LevelOutOfRange { index: usize, len: usize },
    /// A tagged update failed validation; nothing was applied.
    InvalidUpdate(String),
    /// A ranking group needs a name and at least one tournament.
    InvalidRankingGroup,
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidName => write!(f, "Name must not be empty"),
            TournamentError::DuplicatePlayerName => write!(f, "A player with this name already exists"),
            TournamentError::PlayerNotFound(_) => write!(f, "Player not found"),
            TournamentError::AlreadyEliminated(_) => write!(f, "Player is already eliminated"),
            TournamentError::ExtraChipDisabled => write!(f, "Extra chip is not enabled for this tournament"),
            TournamentError::ExtraChipAlreadyGranted(_) => {
                write!(f, "Player already received the extra chip")
            }
            TournamentError::LevelOutOfRange { index, len } => {
                write!(f, "No schedule entry at index {} (schedule has {})", index, len)
            }
            TournamentError::InvalidUpdate(reason) => write!(f, "Invalid update: {}", reason),
            TournamentError::InvalidRankingGroup => {
                write!(f, "A ranking group needs a name and at least one tournament")
            }
        }
    }
}

impl std::error::Error for TournamentError {}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Session-scoped identity of whoever created a record.
pub type OwnerId = String;

/// Buy-in, rebuy, addon and bonus chip settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinanceConfig {
    pub buy_in_value: f64,
    pub buy_in_chips: u64,
    pub rebuy_value: f64,
    pub rebuy_chips: u64,
    pub addon_value: f64,
    pub addon_chips: u64,
    /// Share of every investment kept by the house, 0..=100.
    pub admin_fee_percent: f64,
    /// Bonus chips for players registered during the first two levels.
    pub time_chip_enabled: bool,
    pub time_chip_value: u64,
    /// Paid one-time bonus: costs `extra_chip_value`, grants `extra_chip_amount` chips.
    pub extra_chip_enabled: bool,
    pub extra_chip_value: f64,
    pub extra_chip_amount: u64,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            buy_in_value: 100.0,
            buy_in_chips: 10_000,
            rebuy_value: 100.0,
            rebuy_chips: 10_000,
            addon_value: 50.0,
            addon_chips: 5_000,
            admin_fee_percent: 10.0,
            time_chip_enabled: false,
            time_chip_value: 2_000,
            extra_chip_enabled: false,
            extra_chip_value: 20.0,
            extra_chip_amount: 2_000,
        }
    }
}

impl FinanceConfig {
    fn validate(&self) -> Result<(), TournamentError> {
        let money = [
            self.buy_in_value,
            self.rebuy_value,
            self.addon_value,
            self.extra_chip_value,
        ];
        if money.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(TournamentError::InvalidUpdate(
                "amounts must be non-negative numbers".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.admin_fee_percent) {
            return Err(TournamentError::InvalidUpdate(
                "admin fee must be between 0 and 100 percent".into(),
            ));
        }
        Ok(())
    }
}

/// Countdown state of the blind clock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    /// Default level length in minutes, used when an entry has none.
    pub level_duration: u32,
    pub current_level_index: usize,
    /// Seconds remaining in the current level.
    pub time_left: u32,
    pub is_running: bool,
}

impl ClockState {
    pub fn new(level_duration: u32) -> Self {
        Self {
            level_duration,
            current_level_index: 0,
            time_left: level_duration.saturating_mul(60),
            is_running: false,
        }
    }
}

/// Full tournament record: configuration, ledger, schedule and clock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub owner_id: OwnerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by the store on every successful write.
    pub version: u64,
    pub players: Vec<Player>,
    pub blinds: BlindSchedule,
    pub clock: ClockState,
    pub finance: FinanceConfig,
    /// Multiplier applied to this tournament's scores in combined rankings.
    pub stage_weight: f64,
}

/// Default level length for new tournaments, in minutes.
pub const DEFAULT_LEVEL_MINUTES: u32 = 10;

impl Tournament {
    /// Create a stopped tournament with the standard schedule and default finances.
    pub fn new(owner_id: impl Into<OwnerId>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            version: 0,
            players: Vec::new(),
            blinds: BlindSchedule::standard(),
            clock: ClockState::new(DEFAULT_LEVEL_MINUTES),
            finance: FinanceConfig::default(),
            stage_weight: 1.0,
        }
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.active).count()
    }

    pub fn eliminated_count(&self) -> usize {
        self.players.iter().filter(|p| !p.active).count()
    }

    /// Level the clock currently points at.
    pub fn current_level(&self) -> Option<&BlindLevel> {
        self.blinds.get(self.clock.current_level_index)
    }

    /// Level that follows the current one, if any.
    pub fn next_level(&self) -> Option<&BlindLevel> {
        self.blinds.get(self.clock.current_level_index + 1)
    }

    /// Validate and apply a single field-group update. On error nothing changes.
    pub fn apply(&mut self, update: TournamentUpdate) -> Result<(), TournamentError> {
        match update {
            TournamentUpdate::Rename(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(TournamentError::InvalidName);
                }
                self.name = name.to_string();
            }
            TournamentUpdate::Finance(finance) => {
                finance.validate()?;
                self.finance = finance;
            }
            TournamentUpdate::Schedule {
                blinds,
                level_duration,
            } => {
                check_level_duration(level_duration)?;
                let blinds = BlindSchedule::from_levels(blinds);
                for level in blinds.levels() {
                    level.validate()?;
                }
                self.blinds = blinds;
                self.clock.level_duration = level_duration;
                let last = self.blinds.last_index().unwrap_or(0);
                if self.clock.current_level_index > last {
                    self.clock.current_level_index = last;
                }
            }
            TournamentUpdate::Players(players) => {
                validate_players(&players)?;
                self.players = players;
            }
            TournamentUpdate::Clock(clock) => {
                check_level_duration(clock.level_duration)?;
                let len = self.blinds.len();
                if len > 0 && clock.current_level_index >= len {
                    return Err(TournamentError::LevelOutOfRange {
                        index: clock.current_level_index,
                        len,
                    });
                }
                self.clock = clock;
            }
            TournamentUpdate::StageWeight(weight) => {
                if !weight.is_finite() || weight < 0.0 {
                    return Err(TournamentError::InvalidUpdate(
                        "stage weight must be a non-negative number".into(),
                    ));
                }
                self.stage_weight = weight;
            }
        }
        Ok(())
    }
}

fn check_level_duration(minutes: u32) -> Result<(), TournamentError> {
    if (1..=MAX_LEVEL_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(TournamentError::InvalidUpdate(format!(
            "level duration must be between 1 and {} minutes",
            MAX_LEVEL_MINUTES
        )))
    }
}

fn validate_players(players: &[Player]) -> Result<(), TournamentError> {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for p in players {
        if p.name.trim().is_empty() {
            return Err(TournamentError::InvalidName);
        }
        if p.actions != p.rebuys + 1 {
            return Err(TournamentError::InvalidUpdate(format!(
                "{} has {} actions but {} rebuys",
                p.name, p.actions, p.rebuys
            )));
        }
        if p.active == p.position.is_some() {
            return Err(TournamentError::InvalidUpdate(format!(
                "{} must have a position exactly when eliminated",
                p.name
            )));
        }
        if !ids.insert(p.id) {
            return Err(TournamentError::InvalidUpdate("duplicate player id".into()));
        }
        if !names.insert(player_key(&p.name)) {
            return Err(TournamentError::DuplicatePlayerName);
        }
    }
    Ok(())
}

/// Replacement of one field group of a tournament.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TournamentUpdate {
    Rename(String),
    Finance(FinanceConfig),
    Schedule {
        blinds: Vec<BlindLevel>,
        level_duration: u32,
    },
    Players(Vec<Player>),
    Clock(ClockState),
    StageWeight(f64),
}
