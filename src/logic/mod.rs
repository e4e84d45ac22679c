//! Tournament business logic: clock, ledger, schedule, ranking, export.

mod clock;
mod export;
mod ledger;
mod ranking;
mod schedule;

pub use clock::{
    advance_level, format_clock, level_seconds, previous_level, reset_clock, tick,
    toggle_running, ClockEvent,
};
pub use export::{export_file_name, ledger_csv, ranking_csv};
pub use ledger::{
    add_player, addon, chip_leaders, eliminate_player, financial_summary, grant_extra_chip,
    list_players, player_investment, prize_for_player, prize_pool, rebuy, remove_player,
    total_investment, FinancialSummary, PlayerFilter,
};
pub use crate::models::player_key;
pub use ranking::{
    combined_ranking, rank_tournament, score, share_text, tournament_results, CombinedEntry,
    RankedPlayer,
};
pub use schedule::{
    add_break, add_level, average_increase_percent, level_counts, minutes_to_first_break,
    move_level, remove_level, reset_to_standard, set_all_durations, structure_text,
    total_minutes, update_level,
};
