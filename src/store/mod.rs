//! Persistence seam: tournaments, ranking groups and saved results behind one trait.

mod memory;
mod retry;

pub use memory::InMemoryStore;
pub use retry::RetryPolicy;

use crate::logic::{tick, ClockEvent};
use crate::models::{
    OwnerId, RankingGroup, RankingGroupId, Tournament, TournamentId, TournamentResult,
};

/// Errors returned by a store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// No record with this id.
    NotFound { kind: &'static str, id: String },
    /// The record changed since it was read (`expected` is the version the caller held).
    Conflict { expected: u64, actual: u64 },
    /// The backend could not be reached or refused the call. Safe to retry.
    Unavailable(String),
}

impl StoreError {
    pub fn tournament_not_found(id: TournamentId) -> Self {
        StoreError::NotFound {
            kind: "tournament",
            id: id.to_string(),
        }
    }

    pub fn group_not_found(id: RankingGroupId) -> Self {
        StoreError::NotFound {
            kind: "ranking group",
            id: id.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound { kind, id } => write!(f, "No {} with id {}", kind, id),
            StoreError::Conflict { expected, actual } => write!(
                f,
                "Record was modified concurrently (held version {}, stored version {})",
                expected, actual
            ),
            StoreError::Unavailable(reason) => write!(f, "Store unavailable: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

/// CRUD over tournaments, ranking groups and tournament results.
///
/// Every call reports success or failure; callers decide whether to retry
/// (see [`RetryPolicy`]).
pub trait TournamentStore: Send + Sync {
    /// Tournaments owned by `owner`, newest first.
    fn list_tournaments(&self, owner: &str) -> Result<Vec<Tournament>, StoreError>;
    fn get_tournament(&self, id: TournamentId) -> Result<Tournament, StoreError>;
    /// Every tournament whose clock is running, regardless of owner.
    fn running_tournaments(&self) -> Result<Vec<TournamentId>, StoreError>;
    fn create_tournament(&self, tournament: Tournament) -> Result<Tournament, StoreError>;
    /// Write back a modified tournament. Fails with [`StoreError::Conflict`] if
    /// `tournament.version` is not the stored version; on success the returned copy
    /// carries the bumped version and a fresh `updated_at`.
    fn update_tournament(&self, tournament: Tournament) -> Result<Tournament, StoreError>;
    fn delete_tournament(&self, id: TournamentId) -> Result<(), StoreError>;

    fn list_ranking_groups(&self, owner: &str) -> Result<Vec<RankingGroup>, StoreError>;
    fn get_ranking_group(&self, id: RankingGroupId) -> Result<RankingGroup, StoreError>;
    fn create_ranking_group(&self, group: RankingGroup) -> Result<RankingGroup, StoreError>;
    fn update_ranking_group(&self, group: RankingGroup) -> Result<RankingGroup, StoreError>;
    fn delete_ranking_group(&self, id: RankingGroupId) -> Result<(), StoreError>;

    /// Insert or replace rows keyed by tournament id and [`player_key`](crate::models::player_key) of the name.
    fn upsert_results(&self, results: Vec<TournamentResult>) -> Result<usize, StoreError>;
    fn results_for(&self, tournament_ids: &[TournamentId]) -> Result<Vec<TournamentResult>, StoreError>;
}

/// Rename is a plain update of the name field.
pub fn rename_tournament(
    store: &dyn TournamentStore,
    id: TournamentId,
    name: &str,
) -> Result<Tournament, StoreError> {
    let mut tournament = store.get_tournament(id)?;
    tournament.name = name.trim().to_string();
    store.update_tournament(tournament)
}

/// Load the tournaments a group refers to, skipping ones that no longer exist.
pub fn tournaments_for_group(
    store: &dyn TournamentStore,
    owner: &OwnerId,
    group: &RankingGroup,
) -> Result<Vec<Tournament>, StoreError> {
    let mut out = Vec::with_capacity(group.tournament_ids.len());
    for &id in &group.tournament_ids {
        match store.get_tournament(id) {
            Ok(t) if &t.owner_id == owner => out.push(t),
            Ok(_) => {}
            Err(StoreError::NotFound { .. }) => {
                log::warn!("Ranking group {} refers to missing tournament {}", group.id, id);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Advance one stored clock by a second and write it back. A write that loses a version
/// race is redone once on the fresh copy; a second conflict is returned to the caller.
pub fn tick_clock(
    store: &dyn TournamentStore,
    id: TournamentId,
) -> Result<(Tournament, ClockEvent), StoreError> {
    let mut retried = false;
    loop {
        let mut tournament = store.get_tournament(id)?;
        let event = tick(&mut tournament);
        if event == ClockEvent::Idle {
            return Ok((tournament, event));
        }
        match store.update_tournament(tournament) {
            Ok(saved) => return Ok((saved, event)),
            Err(StoreError::Conflict { .. }) if !retried => {
                log::debug!("Clock tick for {} raced an edit, ticking the fresh copy", id);
                retried = true;
            }
            Err(e) => return Err(e),
        }
    }
}
