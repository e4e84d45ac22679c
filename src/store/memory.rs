//! In-process store: records live in maps behind a `RwLock`.

use super::{StoreError, TournamentStore};
use crate::models::{
    player_key, RankingGroup, RankingGroupId, Tournament, TournamentId, TournamentResult,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    tournaments: HashMap<TournamentId, Tournament>,
    groups: HashMap<RankingGroupId, RankingGroup>,
    /// Keyed by tournament id and [`player_key`].
    results: HashMap<(TournamentId, String), TournamentResult>,
}

/// Store used by the web binary and the tests.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock error".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock error".into()))
    }
}

impl TournamentStore for InMemoryStore {
    fn list_tournaments(&self, owner: &str) -> Result<Vec<Tournament>, StoreError> {
        let g = self.read()?;
        let mut out: Vec<Tournament> = g
            .tournaments
            .values()
            .filter(|t| t.owner_id == owner)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    fn get_tournament(&self, id: TournamentId) -> Result<Tournament, StoreError> {
        self.read()?
            .tournaments
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::tournament_not_found(id))
    }

    fn running_tournaments(&self) -> Result<Vec<TournamentId>, StoreError> {
        Ok(self
            .read()?
            .tournaments
            .values()
            .filter(|t| t.clock.is_running)
            .map(|t| t.id)
            .collect())
    }

    fn create_tournament(&self, mut tournament: Tournament) -> Result<Tournament, StoreError> {
        let now = Utc::now();
        tournament.created_at = now;
        tournament.updated_at = now;
        tournament.version = 1;
        self.write()?
            .tournaments
            .insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    fn update_tournament(&self, mut tournament: Tournament) -> Result<Tournament, StoreError> {
        let mut g = self.write()?;
        let stored = g
            .tournaments
            .get_mut(&tournament.id)
            .ok_or_else(|| StoreError::tournament_not_found(tournament.id))?;
        if stored.version != tournament.version {
            return Err(StoreError::Conflict {
                expected: tournament.version,
                actual: stored.version,
            });
        }
        tournament.version += 1;
        tournament.updated_at = Utc::now();
        tournament.created_at = stored.created_at;
        tournament.owner_id = stored.owner_id.clone();
        *stored = tournament.clone();
        Ok(tournament)
    }

    fn delete_tournament(&self, id: TournamentId) -> Result<(), StoreError> {
        let mut g = self.write()?;
        g.tournaments
            .remove(&id)
            .ok_or_else(|| StoreError::tournament_not_found(id))?;
        g.results.retain(|(tid, _), _| *tid != id);
        Ok(())
    }

    fn list_ranking_groups(&self, owner: &str) -> Result<Vec<RankingGroup>, StoreError> {
        let g = self.read()?;
        let mut out: Vec<RankingGroup> = g
            .groups
            .values()
            .filter(|grp| grp.owner_id == owner)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    fn get_ranking_group(&self, id: RankingGroupId) -> Result<RankingGroup, StoreError> {
        self.read()?
            .groups
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::group_not_found(id))
    }

    fn create_ranking_group(&self, group: RankingGroup) -> Result<RankingGroup, StoreError> {
        self.write()?.groups.insert(group.id, group.clone());
        Ok(group)
    }

    fn update_ranking_group(&self, group: RankingGroup) -> Result<RankingGroup, StoreError> {
        let mut g = self.write()?;
        let stored = g
            .groups
            .get_mut(&group.id)
            .ok_or_else(|| StoreError::group_not_found(group.id))?;
        *stored = group.clone();
        Ok(group)
    }

    fn delete_ranking_group(&self, id: RankingGroupId) -> Result<(), StoreError> {
        self.write()?
            .groups
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::group_not_found(id))
    }

    fn upsert_results(&self, results: Vec<TournamentResult>) -> Result<usize, StoreError> {
        let mut g = self.write()?;
        let count = results.len();
        for r in results {
            let key = (r.tournament_id, player_key(&r.player_name));
            g.results.insert(key, r);
        }
        Ok(count)
    }

    fn results_for(
        &self,
        tournament_ids: &[TournamentId],
    ) -> Result<Vec<TournamentResult>, StoreError> {
        let g = self.read()?;
        let mut out: Vec<TournamentResult> = g
            .results
            .values()
            .filter(|r| tournament_ids.contains(&r.tournament_id))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            a.tournament_id
                .cmp(&b.tournament_id)
                .then(a.position.cmp(&b.position))
                .then(a.player_name.cmp(&b.player_name))
        });
        Ok(out)
    }
}
