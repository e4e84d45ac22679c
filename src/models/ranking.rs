//! Saved ranking selections and persisted per-tournament results.

use crate::models::tournament::{OwnerId, TournamentError, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a ranking group.
pub type RankingGroupId = Uuid;

/// A named selection of tournaments whose scores are combined.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankingGroup {
    pub id: RankingGroupId,
    pub owner_id: OwnerId,
    pub name: String,
    pub tournament_ids: Vec<TournamentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RankingGroup {
    /// New group; requires a non-blank name and at least one tournament.
    pub fn new(
        owner_id: impl Into<OwnerId>,
        name: &str,
        tournament_ids: Vec<TournamentId>,
    ) -> Result<Self, TournamentError> {
        let name = name.trim();
        if name.is_empty() || tournament_ids.is_empty() {
            return Err(TournamentError::InvalidRankingGroup);
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            name: name.to_string(),
            tournament_ids: dedup(tournament_ids),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace name and selection, with the same rules as [`RankingGroup::new`].
    pub fn edit(
        &mut self,
        name: &str,
        tournament_ids: Vec<TournamentId>,
    ) -> Result<(), TournamentError> {
        let name = name.trim();
        if name.is_empty() || tournament_ids.is_empty() {
            return Err(TournamentError::InvalidRankingGroup);
        }
        self.name = name.to_string();
        self.tournament_ids = dedup(tournament_ids);
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn dedup(ids: Vec<TournamentId>) -> Vec<TournamentId> {
    let mut out: Vec<TournamentId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// One player's outcome in one tournament. Keyed by `(tournament_id, player_name)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentResult {
    pub tournament_id: TournamentId,
    pub player_name: String,
    pub position: u32,
    pub points: f64,
    pub actions: u32,
}
