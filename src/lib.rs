//! Poker tournament web app: library with models, business logic, store and spectator feed.

pub mod config;
pub mod logic;
pub mod models;
pub mod spectator;
pub mod store;

pub use config::AppConfig;
pub use logic::{
    add_player, addon, advance_level, combined_ranking, eliminate_player, financial_summary,
    grant_extra_chip, ledger_csv, previous_level, prize_pool, rank_tournament, ranking_csv,
    rebuy, remove_player, reset_clock, score, tick, toggle_running, ClockEvent, CombinedEntry,
    PlayerFilter, RankedPlayer,
};
pub use models::{
    BlindLevel, BlindLevelPatch, BlindSchedule, ClockState, FinanceConfig, OwnerId, Player,
    PlayerId, RankingGroup, RankingGroupId, Tournament, TournamentError, TournamentId,
    TournamentResult, TournamentUpdate,
};
pub use spectator::{SpectatorFeed, SpectatorReader, SpectatorSnapshot, SpectatorView, TvBoard};
pub use store::{InMemoryStore, RetryPolicy, StoreError, TournamentStore};
