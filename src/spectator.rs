//! Read-only spectator ("TV") feed.
//!
//! The admin side publishes snapshots of one tournament into a `watch` channel; viewers
//! only ever see the latest snapshot. A snapshot older than the staleness bound is still
//! shown but flagged, and an absent or unreadable snapshot yields an explicit
//! "no active tournament" view.

use crate::logic::{chip_leaders, format_clock, prize_pool};
use crate::models::{BlindLevel, Tournament, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;

/// Shown when there is nothing to display.
pub const NO_ACTIVE_TOURNAMENT: &str =
    "No active tournament. Open the TV display from the admin panel.";

const CHIP_LEADERS_SHOWN: usize = 5;

/// Full tournament state at the moment it was published.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpectatorSnapshot {
    pub tournament: Tournament,
    pub last_updated: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoardPlayer {
    pub name: String,
    pub chips: u64,
    pub position: Option<u32>,
}

/// Everything the TV screen renders, derived from a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TvBoard {
    pub tournament_id: TournamentId,
    pub name: String,
    pub level: Option<BlindLevel>,
    pub next_level: Option<BlindLevel>,
    pub time_left: u32,
    pub clock: String,
    pub is_running: bool,
    pub players: usize,
    pub active_players: usize,
    pub eliminated_players: usize,
    pub prize_pool: f64,
    pub chip_leaders: Vec<BoardPlayer>,
    /// Eliminated players holding positions 1 to 3, in position order.
    pub podium: Vec<BoardPlayer>,
    pub last_updated: DateTime<Utc>,
}

impl TvBoard {
    pub fn from_snapshot(snapshot: &SpectatorSnapshot) -> Self {
        let t = &snapshot.tournament;
        let to_board = |p: &crate::models::Player| BoardPlayer {
            name: p.name.clone(),
            chips: p.chips,
            position: p.position,
        };
        let mut podium: Vec<BoardPlayer> = t
            .players
            .iter()
            .filter(|p| matches!(p.position, Some(1..=3)))
            .map(to_board)
            .collect();
        podium.sort_by_key(|p| p.position);
        Self {
            tournament_id: t.id,
            name: t.name.clone(),
            level: t.current_level().cloned(),
            next_level: t.next_level().cloned(),
            time_left: t.clock.time_left,
            clock: format_clock(t.clock.time_left),
            is_running: t.clock.is_running,
            players: t.players.len(),
            active_players: t.active_count(),
            eliminated_players: t.eliminated_count(),
            prize_pool: prize_pool(t),
            chip_leaders: chip_leaders(t, CHIP_LEADERS_SHOWN)
                .into_iter()
                .map(to_board)
                .collect(),
            podium,
            last_updated: snapshot.last_updated,
        }
    }
}

/// What a viewer gets when it looks at the feed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SpectatorView {
    Live { board: TvBoard },
    /// Data older than the staleness bound; shown with its age.
    Stale { board: TvBoard, age_secs: i64 },
    NoActiveTournament { message: &'static str },
}

impl SpectatorView {
    fn classify(snapshot: Option<&SpectatorSnapshot>, now: DateTime<Utc>, staleness: Duration) -> Self {
        let Some(snapshot) = snapshot else {
            return SpectatorView::NoActiveTournament {
                message: NO_ACTIVE_TOURNAMENT,
            };
        };
        let board = TvBoard::from_snapshot(snapshot);
        let age_ms = (now - snapshot.last_updated).num_milliseconds();
        if age_ms > staleness.as_millis() as i64 {
            SpectatorView::Stale {
                board,
                age_secs: age_ms / 1000,
            }
        } else {
            SpectatorView::Live { board }
        }
    }
}

/// Interpret a serialized snapshot; missing or unparsable data means no active tournament.
pub fn parse_snapshot(blob: Option<&str>, now: DateTime<Utc>, staleness: Duration) -> SpectatorView {
    let snapshot = blob.and_then(|b| match serde_json::from_str::<SpectatorSnapshot>(b) {
        Ok(s) => Some(s),
        Err(e) => {
            log::warn!("Ignoring unreadable spectator snapshot: {}", e);
            None
        }
    });
    SpectatorView::classify(snapshot.as_ref(), now, staleness)
}

/// Publishing side of the feed. Owned by the admin side of the app.
pub struct SpectatorFeed {
    tx: watch::Sender<Option<SpectatorSnapshot>>,
    staleness: Duration,
}

impl SpectatorFeed {
    pub fn new(staleness: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx, staleness }
    }

    /// Replace the current snapshot with this tournament's state, stamped now.
    pub fn publish(&self, tournament: &Tournament) {
        self.publish_at(tournament, Utc::now());
    }

    pub fn publish_at(&self, tournament: &Tournament, at: DateTime<Utc>) {
        self.tx.send_replace(Some(SpectatorSnapshot {
            tournament: tournament.clone(),
            last_updated: at,
        }));
    }

    /// Stop showing anything (e.g. the tournament was deleted).
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Id of the tournament currently on display.
    pub fn current_id(&self) -> Option<TournamentId> {
        self.tx.borrow().as_ref().map(|s| s.tournament.id)
    }

    pub fn subscribe(&self) -> SpectatorReader {
        SpectatorReader {
            rx: self.tx.subscribe(),
            staleness: self.staleness,
        }
    }
}

/// Read-only handle on the feed.
#[derive(Clone)]
pub struct SpectatorReader {
    rx: watch::Receiver<Option<SpectatorSnapshot>>,
    staleness: Duration,
}

impl SpectatorReader {
    pub fn view(&self) -> SpectatorView {
        self.view_at(Utc::now())
    }

    pub fn view_at(&self, now: DateTime<Utc>) -> SpectatorView {
        SpectatorView::classify(self.rx.borrow().as_ref(), now, self.staleness)
    }

    /// Wait until a new snapshot is published. Errors once the feed is gone.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }
}
