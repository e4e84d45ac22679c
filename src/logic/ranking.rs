//! Scoring players within a tournament and combining scores across tournaments.

use crate::models::{player_key, PlayerId, Tournament, TournamentId, TournamentResult};
use serde::Serialize;
use std::collections::HashMap;

/// Score for one player: `sqrt(actions / position * 100) * stage_weight`, or 0 when
/// either input is not positive.
pub fn score(actions: u32, position: u32, stage_weight: f64) -> f64 {
    if position == 0 || actions == 0 {
        return 0.0;
    }
    (actions as f64 / position as f64 * 100.0).sqrt() * stage_weight
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// A player's line in a single tournament ranking.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedPlayer {
    pub player_id: PlayerId,
    pub name: String,
    pub actions: u32,
    /// Elimination position, or the field size for players still in.
    pub position: u32,
    /// Rounded to two decimals.
    pub score: f64,
}

/// Rank a tournament's players by score, highest first. Ties keep ledger order.
pub fn rank_tournament(tournament: &Tournament) -> Vec<RankedPlayer> {
    let field = tournament.players.len() as u32;
    let mut ranked: Vec<RankedPlayer> = tournament
        .players
        .iter()
        .map(|p| {
            // TODO: active players all share the field-size position regardless of stack;
            // ranking still-active leaders by chips would need a defined tiebreak.
            let position = p.position.unwrap_or(field);
            RankedPlayer {
                player_id: p.id,
                name: p.name.clone(),
                actions: p.actions,
                position,
                score: round_to(score(p.actions, position, tournament.stage_weight), 2),
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Rows to persist for a tournament, keyed by `(tournament_id, player_name)`.
pub fn tournament_results(tournament: &Tournament) -> Vec<TournamentResult> {
    rank_tournament(tournament)
        .into_iter()
        .map(|r| TournamentResult {
            tournament_id: tournament.id,
            player_name: r.name,
            position: r.position,
            points: r.score,
            actions: r.actions,
        })
        .collect()
}

/// One player's aggregate over a set of tournaments.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CombinedEntry {
    /// Name as first seen.
    pub name: String,
    pub total_points: f64,
    pub tournaments: u32,
    pub best_position: u32,
    pub worst_position: u32,
    /// Per-tournament rank (1-based place in that tournament's score order).
    pub positions: Vec<u32>,
    pub points: Vec<f64>,
    pub total_actions: u32,
    pub avg_position: f64,
    pub avg_points: f64,
    /// `max(0, 100 - variance(positions) * 10)`.
    pub consistency: f64,
    pub tournament_ids: Vec<TournamentId>,
}

/// Combine the rankings of several tournaments, highest total first.
pub fn combined_ranking<'a, I>(tournaments: I) -> Vec<CombinedEntry>
where
    I: IntoIterator<Item = &'a Tournament>,
{
    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, CombinedEntry> = HashMap::new();

    for tournament in tournaments {
        for (idx, ranked) in rank_tournament(tournament).into_iter().enumerate() {
            let rank = idx as u32 + 1;
            let key = player_key(&ranked.name);
            let entry = by_key.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                CombinedEntry {
                    name: ranked.name.clone(),
                    total_points: 0.0,
                    tournaments: 0,
                    best_position: u32::MAX,
                    worst_position: 0,
                    positions: Vec::new(),
                    points: Vec::new(),
                    total_actions: 0,
                    avg_position: 0.0,
                    avg_points: 0.0,
                    consistency: 100.0,
                    tournament_ids: Vec::new(),
                }
            });
            entry.total_points += ranked.score;
            entry.tournaments += 1;
            entry.best_position = entry.best_position.min(rank);
            entry.worst_position = entry.worst_position.max(rank);
            entry.positions.push(rank);
            entry.points.push(ranked.score);
            entry.total_actions += ranked.actions;
            if !entry.tournament_ids.contains(&tournament.id) {
                entry.tournament_ids.push(tournament.id);
            }
        }
    }

    let mut combined: Vec<CombinedEntry> = order
        .into_iter()
        .filter_map(|key| by_key.remove(&key))
        .map(finish_entry)
        .collect();
    combined.sort_by(|a, b| b.total_points.total_cmp(&a.total_points));
    combined
}

fn finish_entry(mut entry: CombinedEntry) -> CombinedEntry {
    let n = entry.positions.len() as f64;
    let mean = entry.positions.iter().map(|&p| p as f64).sum::<f64>() / n;
    let variance = entry
        .positions
        .iter()
        .map(|&p| (p as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    entry.avg_position = round_to(mean, 1);
    entry.avg_points = round_to(entry.total_points / entry.tournaments as f64, 2);
    entry.consistency = round_to((100.0 - variance * 10.0).max(0.0), 1);
    entry
}

/// Plain-text podium of a combined ranking, for sharing.
pub fn share_text(group_name: &str, ranking: &[CombinedEntry]) -> String {
    let mut lines = vec![format!("Poker ranking - {}", group_name)];
    for (idx, entry) in ranking.iter().take(3).enumerate() {
        lines.push(format!(
            "{}. {}: {:.2} points (avg {:.2}, {} tournaments)",
            idx + 1,
            entry.name,
            entry.total_points,
            entry.avg_points,
            entry.tournaments
        ));
    }
    lines.join("\n")
}
