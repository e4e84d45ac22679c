//! Data structures for the poker tournament: players, blind schedule, clock, rankings.

mod blind;
mod player;
mod ranking;
mod tournament;

pub use blind::{
    BlindLevel, BlindLevelPatch, BlindSchedule, DEFAULT_BREAK_MINUTES, MAX_BLIND, MAX_LEVEL_MINUTES,
};
pub use player::{player_key, Player, PlayerId};
pub use ranking::{RankingGroup, RankingGroupId, TournamentResult};
pub use tournament::{
    ClockState, FinanceConfig, OwnerId, Tournament, TournamentError, TournamentId,
    TournamentUpdate, DEFAULT_LEVEL_MINUTES,
};
