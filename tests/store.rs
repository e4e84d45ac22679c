//! Integration tests for the in-memory store and the retry policy.

use poker_tournament_web::models::{RankingGroupId, TournamentId};
use poker_tournament_web::store::{rename_tournament, tick_clock, tournaments_for_group};
use poker_tournament_web::{
    add_player, toggle_running, ClockEvent, InMemoryStore, RankingGroup, RetryPolicy, StoreError,
    Tournament, TournamentResult, TournamentStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

fn result(tournament: &Tournament, name: &str, position: u32, points: f64) -> TournamentResult {
    TournamentResult {
        tournament_id: tournament.id,
        player_name: name.to_string(),
        position,
        points,
        actions: 1,
    }
}

#[test]
fn create_and_get_tournament() {
    let store = InMemoryStore::new();
    let created = store
        .create_tournament(Tournament::new("owner-1", "Friday"))
        .unwrap();
    assert_eq!(created.version, 1);
    let loaded = store.get_tournament(created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn missing_records_are_not_found() {
    let store = InMemoryStore::new();
    let id = Uuid::new_v4();
    assert_eq!(
        store.get_tournament(id),
        Err(StoreError::tournament_not_found(id))
    );
    assert!(matches!(
        store.delete_tournament(id),
        Err(StoreError::NotFound { kind: "tournament", .. })
    ));
    assert_eq!(
        store.get_ranking_group(id),
        Err(StoreError::group_not_found(id))
    );
}

#[test]
fn listing_is_scoped_to_the_owner() {
    let store = InMemoryStore::new();
    store.create_tournament(Tournament::new("me", "A")).unwrap();
    store.create_tournament(Tournament::new("me", "B")).unwrap();
    store.create_tournament(Tournament::new("you", "C")).unwrap();
    let mine = store.list_tournaments("me").unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|t| t.owner_id == "me"));
    assert!(store.list_tournaments("nobody").unwrap().is_empty());
}

#[test]
fn updates_bump_the_version() {
    let store = InMemoryStore::new();
    let mut t = store
        .create_tournament(Tournament::new("owner", "Friday"))
        .unwrap();
    add_player(&mut t, "Alice").unwrap();
    let saved = store.update_tournament(t).unwrap();
    assert_eq!(saved.version, 2);
    assert!(saved.updated_at >= saved.created_at);
    assert_eq!(store.get_tournament(saved.id).unwrap().players.len(), 1);
}

#[test]
fn stale_writes_are_rejected() {
    let store = InMemoryStore::new();
    let t = store
        .create_tournament(Tournament::new("owner", "Friday"))
        .unwrap();
    let id = t.id;
    let mut first = t.clone();
    let mut second = t;

    add_player(&mut first, "Alice").unwrap();
    store.update_tournament(first).unwrap();

    add_player(&mut second, "Bob").unwrap();
    assert_eq!(
        store.update_tournament(second),
        Err(StoreError::Conflict {
            expected: 1,
            actual: 2
        })
    );
    let stored = store.get_tournament(id).unwrap();
    assert_eq!(stored.players.len(), 1);
    assert_eq!(stored.players[0].name, "Alice");
}

#[test]
fn update_keeps_owner_and_creation_time() {
    let store = InMemoryStore::new();
    let t = store
        .create_tournament(Tournament::new("owner", "Friday"))
        .unwrap();
    let created_at = t.created_at;
    let mut hijack = t.clone();
    hijack.owner_id = "someone else".into();
    let saved = store.update_tournament(hijack).unwrap();
    assert_eq!(saved.owner_id, "owner");
    assert_eq!(saved.created_at, created_at);
}

#[test]
fn rename_goes_through_update() {
    let store = InMemoryStore::new();
    let t = store
        .create_tournament(Tournament::new("owner", "Friday"))
        .unwrap();
    let renamed = rename_tournament(&store, t.id, "  Saturday ").unwrap();
    assert_eq!(renamed.name, "Saturday");
    assert_eq!(renamed.version, 2);
}

#[test]
fn running_tournaments_span_owners() {
    let store = InMemoryStore::new();
    let mut a = Tournament::new("me", "A");
    toggle_running(&mut a);
    let a = store.create_tournament(a).unwrap();
    store.create_tournament(Tournament::new("me", "B")).unwrap();
    let mut c = Tournament::new("you", "C");
    toggle_running(&mut c);
    let c = store.create_tournament(c).unwrap();

    let mut running = store.running_tournaments().unwrap();
    running.sort();
    let mut expected = vec![a.id, c.id];
    expected.sort();
    assert_eq!(running, expected);
}

#[test]
fn results_are_upserted_by_tournament_and_name() {
    let store = InMemoryStore::new();
    let t = Tournament::new("owner", "Friday");
    let other = Tournament::new("owner", "Saturday");
    let written = store
        .upsert_results(vec![
            result(&t, "Alice", 1, 10.0),
            result(&t, "Bob", 2, 7.07),
            result(&other, "Alice", 1, 10.0),
        ])
        .unwrap();
    assert_eq!(written, 3);

    store
        .upsert_results(vec![result(&t, "Alice ", 2, 4.5)])
        .unwrap();
    let rows = store.results_for(&[t.id]).unwrap();
    assert_eq!(rows.len(), 2);
    let alice = rows.iter().find(|r| r.player_name.trim() == "Alice").unwrap();
    assert_eq!(alice.points, 4.5);

    assert_eq!(store.results_for(&[t.id, other.id]).unwrap().len(), 3);
    assert!(store.results_for(&[]).unwrap().is_empty());
}

#[test]
fn result_names_match_without_case() {
    let store = InMemoryStore::new();
    let t = Tournament::new("owner", "Friday");
    store
        .upsert_results(vec![result(&t, "Émile", 1, 10.0)])
        .unwrap();
    store
        .upsert_results(vec![result(&t, "émile", 2, 4.5)])
        .unwrap();
    let rows = store.results_for(&[t.id]).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].points, 4.5);
}

#[test]
fn deleting_a_tournament_drops_its_results() {
    let store = InMemoryStore::new();
    let t = store
        .create_tournament(Tournament::new("owner", "Friday"))
        .unwrap();
    store.upsert_results(vec![result(&t, "Alice", 1, 10.0)]).unwrap();
    store.delete_tournament(t.id).unwrap();
    assert!(store.results_for(&[t.id]).unwrap().is_empty());
    assert!(store.get_tournament(t.id).is_err());
}

#[test]
fn ranking_group_crud() {
    let store = InMemoryStore::new();
    let t1 = store.create_tournament(Tournament::new("me", "A")).unwrap();
    let t2 = store.create_tournament(Tournament::new("me", "B")).unwrap();

    let group = RankingGroup::new("me", " Season ", vec![t1.id, t1.id, t2.id]).unwrap();
    assert_eq!(group.name, "Season");
    assert_eq!(group.tournament_ids, vec![t1.id, t2.id]);
    let group = store.create_ranking_group(group).unwrap();
    assert_eq!(store.list_ranking_groups("me").unwrap().len(), 1);
    assert!(store.list_ranking_groups("you").unwrap().is_empty());

    let mut edited = group.clone();
    edited.edit("Season 2", vec![t2.id]).unwrap();
    store.update_ranking_group(edited).unwrap();
    let loaded = store.get_ranking_group(group.id).unwrap();
    assert_eq!(loaded.name, "Season 2");
    assert_eq!(loaded.tournament_ids, vec![t2.id]);

    store.delete_ranking_group(group.id).unwrap();
    assert!(store.get_ranking_group(group.id).is_err());
}

#[test]
fn invalid_groups_are_rejected() {
    assert!(RankingGroup::new("me", "   ", vec![Uuid::new_v4()]).is_err());
    assert!(RankingGroup::new("me", "Season", Vec::new()).is_err());
    let mut group = RankingGroup::new("me", "Season", vec![Uuid::new_v4()]).unwrap();
    assert!(group.edit("Season", Vec::new()).is_err());
    assert_eq!(group.name, "Season");
}

#[test]
fn group_members_skip_missing_and_foreign_tournaments() {
    let store = InMemoryStore::new();
    let mine = store.create_tournament(Tournament::new("me", "A")).unwrap();
    let theirs = store.create_tournament(Tournament::new("you", "B")).unwrap();
    let gone = store.create_tournament(Tournament::new("me", "C")).unwrap();
    store.delete_tournament(gone.id).unwrap();

    let group = RankingGroup::new("me", "Season", vec![mine.id, theirs.id, gone.id]).unwrap();
    let members = tournaments_for_group(&store, &"me".to_string(), &group).unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, mine.id);
}

#[tokio::test]
async fn retry_recovers_from_transient_failures() {
    let policy = RetryPolicy::new(3, 1);
    let mut calls = 0;
    let out = policy
        .run(|| {
            calls += 1;
            if calls < 3 {
                Err(StoreError::Unavailable("flaky".into()))
            } else {
                Ok(calls)
            }
        })
        .await;
    assert_eq!(out, Ok(3));
}

#[tokio::test]
async fn retry_gives_up_after_max_attempts() {
    let policy = RetryPolicy::new(2, 1);
    let mut calls = 0;
    let out: Result<(), StoreError> = policy
        .run(|| {
            calls += 1;
            Err(StoreError::Unavailable("down".into()))
        })
        .await;
    assert_eq!(out, Err(StoreError::Unavailable("down".into())));
    assert_eq!(calls, 2);
}

#[tokio::test]
async fn conflicts_are_not_retried() {
    let policy = RetryPolicy::new(5, 1);
    let mut calls = 0;
    let out: Result<(), StoreError> = policy
        .run(|| {
            calls += 1;
            Err(StoreError::Conflict {
                expected: 1,
                actual: 2,
            })
        })
        .await;
    assert!(matches!(out, Err(StoreError::Conflict { .. })));
    assert_eq!(calls, 1);
}

/// Lets an admin edit land between the clock's read and its write, `races` times.
struct RacingStore {
    inner: InMemoryStore,
    races: AtomicUsize,
}

impl RacingStore {
    fn new(races: usize) -> Self {
        RacingStore {
            inner: InMemoryStore::new(),
            races: AtomicUsize::new(races),
        }
    }
}

impl TournamentStore for RacingStore {
    fn list_tournaments(&self, owner: &str) -> Result<Vec<Tournament>, StoreError> {
        self.inner.list_tournaments(owner)
    }
    fn get_tournament(&self, id: TournamentId) -> Result<Tournament, StoreError> {
        self.inner.get_tournament(id)
    }
    fn running_tournaments(&self) -> Result<Vec<TournamentId>, StoreError> {
        self.inner.running_tournaments()
    }
    fn create_tournament(&self, tournament: Tournament) -> Result<Tournament, StoreError> {
        self.inner.create_tournament(tournament)
    }
    fn update_tournament(&self, tournament: Tournament) -> Result<Tournament, StoreError> {
        let left = self.races.load(Ordering::SeqCst);
        if left > 0 {
            self.races.store(left - 1, Ordering::SeqCst);
            let mut edited = self.inner.get_tournament(tournament.id)?;
            add_player(&mut edited, &format!("Late {}", left)).unwrap();
            self.inner.update_tournament(edited)?;
        }
        self.inner.update_tournament(tournament)
    }
    fn delete_tournament(&self, id: TournamentId) -> Result<(), StoreError> {
        self.inner.delete_tournament(id)
    }
    fn list_ranking_groups(&self, owner: &str) -> Result<Vec<RankingGroup>, StoreError> {
        self.inner.list_ranking_groups(owner)
    }
    fn get_ranking_group(&self, id: RankingGroupId) -> Result<RankingGroup, StoreError> {
        self.inner.get_ranking_group(id)
    }
    fn create_ranking_group(&self, group: RankingGroup) -> Result<RankingGroup, StoreError> {
        self.inner.create_ranking_group(group)
    }
    fn update_ranking_group(&self, group: RankingGroup) -> Result<RankingGroup, StoreError> {
        self.inner.update_ranking_group(group)
    }
    fn delete_ranking_group(&self, id: RankingGroupId) -> Result<(), StoreError> {
        self.inner.delete_ranking_group(id)
    }
    fn upsert_results(&self, results: Vec<TournamentResult>) -> Result<usize, StoreError> {
        self.inner.upsert_results(results)
    }
    fn results_for(&self, tournament_ids: &[TournamentId]) -> Result<Vec<TournamentResult>, StoreError> {
        self.inner.results_for(tournament_ids)
    }
}

fn running_in(store: &dyn TournamentStore) -> Tournament {
    let mut t = Tournament::new("owner", "Clock");
    toggle_running(&mut t);
    store.create_tournament(t).unwrap()
}

#[test]
fn tick_that_races_an_edit_is_applied_to_the_fresh_copy() {
    let store = RacingStore::new(1);
    let t = running_in(&store);

    let (saved, event) = tick_clock(&store, t.id).unwrap();
    assert_eq!(event, ClockEvent::Ticked { time_left: 599 });
    assert_eq!(saved.clock.time_left, 599);
    assert_eq!(saved.players.len(), 1);

    let stored = store.get_tournament(t.id).unwrap();
    assert_eq!(stored, saved);
    assert_eq!(stored.version, 3);
}

#[test]
fn tick_gives_up_after_losing_twice() {
    let store = RacingStore::new(2);
    let t = running_in(&store);

    assert!(matches!(
        tick_clock(&store, t.id),
        Err(StoreError::Conflict { .. })
    ));
    let stored = store.get_tournament(t.id).unwrap();
    assert_eq!(stored.clock.time_left, 600);
    assert_eq!(stored.players.len(), 2);
}

#[test]
fn stopped_clock_is_not_written() {
    let store = InMemoryStore::new();
    let t = store
        .create_tournament(Tournament::new("owner", "Clock"))
        .unwrap();
    let (_, event) = tick_clock(&store, t.id).unwrap();
    assert_eq!(event, ClockEvent::Idle);
    assert_eq!(store.get_tournament(t.id).unwrap().version, t.version);
}
