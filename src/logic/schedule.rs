//! Schedule operations that touch more than the blind list, and schedule statistics.

use crate::logic::clock::reset_clock;
use crate::models::{
    BlindLevel, BlindLevelPatch, BlindSchedule, Tournament, TournamentError, DEFAULT_LEVEL_MINUTES,
    MAX_LEVEL_MINUTES,
};

fn out_of_range(tournament: &Tournament, index: usize) -> TournamentError {
    TournamentError::LevelOutOfRange {
        index,
        len: tournament.blinds.len(),
    }
}

fn check_minutes(minutes: u32) -> Result<u32, TournamentError> {
    if (1..=MAX_LEVEL_MINUTES).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(TournamentError::InvalidUpdate(format!(
            "duration must be between 1 and {} minutes",
            MAX_LEVEL_MINUTES
        )))
    }
}

/// Append a blind level; `minutes` defaults to the tournament's level duration.
pub fn add_level(tournament: &mut Tournament, minutes: Option<u32>) -> Result<(), TournamentError> {
    let minutes = minutes
        .filter(|m| *m > 0)
        .unwrap_or(tournament.clock.level_duration);
    tournament.blinds.add_level(check_minutes(minutes)?);
    Ok(())
}

pub fn add_break(tournament: &mut Tournament) {
    tournament.blinds.add_break();
}

pub fn update_level(
    tournament: &mut Tournament,
    index: usize,
    patch: &BlindLevelPatch,
) -> Result<(), TournamentError> {
    tournament.blinds.update(index, patch)
}

/// Remove an entry. The clock is pulled back if it pointed past the new end.
pub fn remove_level(tournament: &mut Tournament, index: usize) -> Result<BlindLevel, TournamentError> {
    let err = out_of_range(tournament, index);
    let removed = tournament.blinds.remove(index).ok_or(err)?;
    let last = tournament.blinds.last_index().unwrap_or(0);
    if tournament.clock.current_level_index > last {
        tournament.clock.current_level_index = last;
    }
    Ok(removed)
}

/// Swap an entry with its neighbour. Moving the first entry up or the last one down is a no-op.
pub fn move_level(tournament: &mut Tournament, index: usize, up: bool) -> Result<(), TournamentError> {
    if index >= tournament.blinds.len() {
        return Err(out_of_range(tournament, index));
    }
    if up {
        tournament.blinds.move_up(index);
    } else {
        tournament.blinds.move_down(index);
    }
    Ok(())
}

/// Set every blind level to `minutes` and make it the tournament default.
pub fn set_all_durations(tournament: &mut Tournament, minutes: u32) -> Result<(), TournamentError> {
    let minutes = check_minutes(minutes)?;
    tournament.blinds.set_all_durations(minutes);
    tournament.clock.level_duration = minutes;
    Ok(())
}

/// Replace the schedule with the standard structure and rewind the clock.
pub fn reset_to_standard(tournament: &mut Tournament) {
    tournament.blinds = BlindSchedule::standard();
    tournament.clock.level_duration = DEFAULT_LEVEL_MINUTES;
    reset_clock(tournament);
}

/// Length of the whole schedule in minutes.
pub fn total_minutes(tournament: &Tournament) -> u32 {
    let default_minutes = tournament.clock.level_duration;
    tournament
        .blinds
        .levels()
        .iter()
        .map(|l| l.minutes(default_minutes))
        .sum()
}

/// Minutes of play before the first break (the whole schedule if there is none).
pub fn minutes_to_first_break(tournament: &Tournament) -> u32 {
    let default_minutes = tournament.clock.level_duration;
    tournament
        .blinds
        .levels()
        .iter()
        .take_while(|l| !l.is_break)
        .map(|l| l.minutes(default_minutes))
        .sum()
}

/// Mean big-blind growth between consecutive non-break levels, in percent.
pub fn average_increase_percent(schedule: &BlindSchedule) -> f64 {
    let big_blinds: Vec<u64> = schedule
        .levels()
        .iter()
        .filter(|l| !l.is_break)
        .map(|l| l.big_blind)
        .collect();
    let increases: Vec<f64> = big_blinds
        .windows(2)
        .filter(|w| w[0] > 0)
        .map(|w| w[1] as f64 / w[0] as f64 * 100.0 - 100.0)
        .collect();
    if increases.is_empty() {
        return 0.0;
    }
    increases.iter().sum::<f64>() / increases.len() as f64
}

/// Counts of blind levels and breaks.
pub fn level_counts(schedule: &BlindSchedule) -> (usize, usize) {
    let breaks = schedule.levels().iter().filter(|l| l.is_break).count();
    (schedule.len() - breaks, breaks)
}

/// One line per entry, e.g. `Level 3: 75/150 + 25 (10 min)` or `Level 4: BREAK - 10 min`.
pub fn structure_text(tournament: &Tournament) -> String {
    let default_minutes = tournament.clock.level_duration;
    tournament
        .blinds
        .levels()
        .iter()
        .map(|l| {
            let minutes = l.minutes(default_minutes);
            if l.is_break {
                format!("Level {}: BREAK - {} min", l.level, minutes)
            } else if l.ante > 0 {
                format!(
                    "Level {}: {}/{} + {} ({} min)",
                    l.level, l.small_blind, l.big_blind, l.ante, minutes
                )
            } else {
                format!(
                    "Level {}: {}/{} ({} min)",
                    l.level, l.small_blind, l.big_blind, minutes
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
