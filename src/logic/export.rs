//! CSV export of the player ledger and of combined rankings. One-way: there is no import.

use crate::logic::ledger::{player_investment, prize_for_player, prize_pool};
use crate::logic::ranking::CombinedEntry;
use crate::models::Tournament;
use chrono::NaiveDate;

const LEDGER_HEADERS: [&str; 11] = [
    "name",
    "status",
    "actions",
    "rebuys",
    "addons",
    "chips",
    "time_chip",
    "extra_chip",
    "investment",
    "position",
    "prize",
];

const RANKING_HEADERS: [&str; 10] = [
    "rank",
    "player",
    "total_points",
    "avg_points",
    "tournaments",
    "best_position",
    "worst_position",
    "avg_position",
    "consistency",
    "total_actions",
];

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn into_string(writer: csv::Writer<Vec<u8>>) -> Result<String, csv::Error> {
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Ledger as CSV, one row per player in ledger order.
pub fn ledger_csv(tournament: &Tournament) -> Result<String, csv::Error> {
    let pool = prize_pool(tournament);
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(LEDGER_HEADERS)?;
    for p in &tournament.players {
        let status = match (p.active, p.position) {
            (true, _) => "Active".to_string(),
            (false, Some(pos)) => format!("Eliminated ({})", pos),
            (false, None) => "Eliminated".to_string(),
        };
        let position = p
            .position
            .map(|pos| pos.to_string())
            .unwrap_or_else(|| "-".to_string());
        wtr.write_record([
            p.name.clone(),
            status,
            p.actions.to_string(),
            p.rebuys.to_string(),
            p.addons.to_string(),
            p.chips.to_string(),
            yes_no(p.has_time_chip).to_string(),
            yes_no(p.has_extra_chip).to_string(),
            format!("{:.2}", player_investment(p, &tournament.finance)),
            position,
            format!("{:.2}", prize_for_player(p, pool)),
        ])?;
    }
    into_string(wtr)
}

/// Combined ranking as CSV, rank = place in the given order.
pub fn ranking_csv(ranking: &[CombinedEntry]) -> Result<String, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(RANKING_HEADERS)?;
    for (idx, e) in ranking.iter().enumerate() {
        wtr.write_record([
            (idx + 1).to_string(),
            e.name.clone(),
            format!("{:.2}", e.total_points),
            format!("{:.2}", e.avg_points),
            e.tournaments.to_string(),
            e.best_position.to_string(),
            e.worst_position.to_string(),
            format!("{:.1}", e.avg_position),
            format!("{:.1}", e.consistency),
            e.total_actions.to_string(),
        ])?;
    }
    into_string(wtr)
}

/// Download name: `<prefix>_<name with non-alphanumerics as _>_<YYYY-MM-DD>.csv`.
pub fn export_file_name(prefix: &str, name: &str, date: NaiveDate) -> String {
    let safe: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}_{}.csv", prefix, safe, date.format("%Y-%m-%d"))
}
