//! Blind clock: one-second ticks, level completion and manual level changes.

use crate::models::Tournament;
use serde::Serialize;

/// What a single call to [`tick`] did.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClockEvent {
    /// Clock is stopped; nothing changed.
    Idle,
    /// One second elapsed within the current level.
    Ticked { time_left: u32 },
    /// The level ran out and the clock moved to `level_index`.
    LevelCompleted { level_index: usize },
    /// The clock reached the last level (or has no schedule) and stopped itself.
    Finished { level_index: usize },
}

/// Seconds allotted to the schedule entry at `index` (default duration if there is none).
pub fn level_seconds(tournament: &Tournament, index: usize) -> u32 {
    let default_minutes = tournament.clock.level_duration;
    let minutes = tournament
        .blinds
        .get(index)
        .map(|l| l.minutes(default_minutes))
        .unwrap_or(default_minutes);
    minutes.saturating_mul(60)
}

/// Advance the clock by one second.
///
/// While running, `time_left` drops by one. Once it is at zero the level completes in the
/// same tick: the index moves forward (clamped to the last entry), the time reloads from
/// the new level, and reaching the last entry stops the clock.
pub fn tick(tournament: &mut Tournament) -> ClockEvent {
    if !tournament.clock.is_running {
        return ClockEvent::Idle;
    }
    if tournament.clock.time_left > 0 {
        tournament.clock.time_left -= 1;
        if tournament.clock.time_left > 0 {
            return ClockEvent::Ticked {
                time_left: tournament.clock.time_left,
            };
        }
    }
    complete_level(tournament)
}

fn complete_level(tournament: &mut Tournament) -> ClockEvent {
    let Some(last) = tournament.blinds.last_index() else {
        tournament.clock.is_running = false;
        tournament.clock.time_left = level_seconds(tournament, 0);
        return ClockEvent::Finished { level_index: 0 };
    };
    let next = (tournament.clock.current_level_index + 1).min(last);
    tournament.clock.current_level_index = next;
    tournament.clock.time_left = level_seconds(tournament, next);
    if next == last {
        tournament.clock.is_running = false;
        ClockEvent::Finished { level_index: next }
    } else {
        ClockEvent::LevelCompleted { level_index: next }
    }
}

/// Jump to the next level (clamped) and reload its time. Running state is kept.
pub fn advance_level(tournament: &mut Tournament) {
    let last = tournament.blinds.last_index().unwrap_or(0);
    let next = (tournament.clock.current_level_index + 1).min(last);
    jump_to(tournament, next);
}

/// Jump back one level (clamped at the first) and reload its time.
pub fn previous_level(tournament: &mut Tournament) {
    let prev = tournament.clock.current_level_index.saturating_sub(1);
    jump_to(tournament, prev);
}

fn jump_to(tournament: &mut Tournament, index: usize) {
    tournament.clock.current_level_index = index;
    tournament.clock.time_left = level_seconds(tournament, index);
}

/// Start or pause the clock. Returns the new running state.
pub fn toggle_running(tournament: &mut Tournament) -> bool {
    tournament.clock.is_running = !tournament.clock.is_running;
    tournament.clock.is_running
}

/// Back to the first level with the default duration, stopped.
pub fn reset_clock(tournament: &mut Tournament) {
    tournament.clock.current_level_index = 0;
    tournament.clock.time_left = tournament.clock.level_duration.saturating_mul(60);
    tournament.clock.is_running = false;
}

/// Render seconds as `MM:SS` (minutes are not wrapped into hours).
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
