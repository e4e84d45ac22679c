//! Blind levels and the ordered schedule that owns them.

use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};

/// Minutes used for a break that has no explicit length.
pub const DEFAULT_BREAK_MINUTES: u32 = 10;

/// Longest accepted level or break, in minutes (one day).
pub const MAX_LEVEL_MINUTES: u32 = 24 * 60;

/// Largest accepted blind or ante.
pub const MAX_BLIND: u64 = 1_000_000_000_000;

/// One entry of the schedule: a blind level or a break.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlindLevel {
    /// 1-based position in the schedule. Recomputed by [`BlindSchedule`] after every mutation.
    pub level: u32,
    pub small_blind: u64,
    pub big_blind: u64,
    #[serde(default)]
    pub ante: u64,
    #[serde(default)]
    pub is_break: bool,
    /// Minutes. Zero or None means "use the fallback".
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub break_duration: Option<u32>,
}

impl BlindLevel {
    pub fn blinds(small_blind: u64, big_blind: u64, ante: u64, duration: u32) -> Self {
        Self {
            level: 0,
            small_blind,
            big_blind,
            ante,
            is_break: false,
            duration: Some(duration),
            break_duration: None,
        }
    }

    pub fn pause(minutes: u32) -> Self {
        Self {
            level: 0,
            small_blind: 0,
            big_blind: 0,
            ante: 0,
            is_break: true,
            duration: Some(minutes),
            break_duration: Some(minutes),
        }
    }

    /// Effective length in minutes: own duration, else break duration (breaks only),
    /// else the tournament default.
    pub fn minutes(&self, default_minutes: u32) -> u32 {
        if let Some(d) = self.duration.filter(|d| *d > 0) {
            return d;
        }
        if self.is_break {
            if let Some(d) = self.break_duration.filter(|d| *d > 0) {
                return d;
            }
        }
        default_minutes
    }

    /// Blinds, ante and durations must stay within [`MAX_BLIND`] and [`MAX_LEVEL_MINUTES`].
    pub fn validate(&self) -> Result<(), TournamentError> {
        if [self.small_blind, self.big_blind, self.ante]
            .iter()
            .any(|v| *v > MAX_BLIND)
        {
            return Err(TournamentError::InvalidUpdate(format!(
                "level {}: blinds and ante must not exceed {}",
                self.level, MAX_BLIND
            )));
        }
        if [self.duration, self.break_duration]
            .iter()
            .flatten()
            .any(|m| *m > MAX_LEVEL_MINUTES)
        {
            return Err(TournamentError::InvalidUpdate(format!(
                "level {}: durations must not exceed {} minutes",
                self.level, MAX_LEVEL_MINUTES
            )));
        }
        Ok(())
    }
}

/// Partial edit of a single schedule entry. `None` fields are left as they are.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlindLevelPatch {
    pub small_blind: Option<u64>,
    pub big_blind: Option<u64>,
    pub ante: Option<u64>,
    pub is_break: Option<bool>,
    pub duration: Option<u32>,
    pub break_duration: Option<u32>,
}

/// Ordered list of levels and breaks. `level` numbers always read `1..=n` in order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlindSchedule {
    levels: Vec<BlindLevel>,
}

impl BlindSchedule {
    /// Build a schedule from arbitrary entries; level numbers are reassigned.
    pub fn from_levels(levels: Vec<BlindLevel>) -> Self {
        let mut schedule = Self { levels };
        schedule.renumber();
        schedule
    }

    /// The structure every new tournament starts with.
    pub fn standard() -> Self {
        let mut break_level = BlindLevel::blinds(100, 200, 25, 10);
        break_level.is_break = true;
        break_level.break_duration = Some(DEFAULT_BREAK_MINUTES);
        Self::from_levels(vec![
            BlindLevel::blinds(25, 50, 0, 10),
            BlindLevel::blinds(50, 100, 0, 10),
            BlindLevel::blinds(75, 150, 25, 10),
            break_level,
            BlindLevel::blinds(150, 300, 50, 10),
        ])
    }

    pub fn levels(&self) -> &[BlindLevel] {
        &self.levels
    }

    pub fn get(&self, index: usize) -> Option<&BlindLevel> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Index of the last entry, or None for an empty schedule.
    pub fn last_index(&self) -> Option<usize> {
        self.levels.len().checked_sub(1)
    }

    /// Append a blind level doubling the previous blinds (capped at [`MAX_BLIND`]) and
    /// keeping its ante.
    pub fn add_level(&mut self, duration: u32) {
        let double = |v: u64| v.saturating_mul(2).min(MAX_BLIND);
        let (small_blind, big_blind, ante) = match self.levels.last() {
            Some(last) => (double(last.small_blind), double(last.big_blind), last.ante),
            None => (50, 100, 0),
        };
        self.levels
            .push(BlindLevel::blinds(small_blind, big_blind, ante, duration));
        self.renumber();
    }

    /// Append a break of the default length.
    pub fn add_break(&mut self) {
        self.levels.push(BlindLevel::pause(DEFAULT_BREAK_MINUTES));
        self.renumber();
    }

    /// Apply a patch to the entry at `index`. The entry is left untouched if the index is
    /// out of range or the patched entry fails [`BlindLevel::validate`].
    pub fn update(&mut self, index: usize, patch: &BlindLevelPatch) -> Result<(), TournamentError> {
        let len = self.levels.len();
        let entry = self
            .levels
            .get_mut(index)
            .ok_or(TournamentError::LevelOutOfRange { index, len })?;
        let mut patched = entry.clone();
        if let Some(v) = patch.small_blind {
            patched.small_blind = v;
        }
        if let Some(v) = patch.big_blind {
            patched.big_blind = v;
        }
        if let Some(v) = patch.ante {
            patched.ante = v;
        }
        if let Some(v) = patch.is_break {
            patched.is_break = v;
        }
        if let Some(v) = patch.duration {
            patched.duration = Some(v);
        }
        if let Some(v) = patch.break_duration {
            patched.break_duration = Some(v);
        }
        patched.validate()?;
        *entry = patched;
        Ok(())
    }

    /// Remove the entry at `index`. Returns the removed entry.
    pub fn remove(&mut self, index: usize) -> Option<BlindLevel> {
        if index >= self.levels.len() {
            return None;
        }
        let removed = self.levels.remove(index);
        self.renumber();
        Some(removed)
    }

    /// Swap the entry with its predecessor. No-op on the first entry.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.levels.len() {
            return false;
        }
        self.levels.swap(index, index - 1);
        self.renumber();
        true
    }

    /// Swap the entry with its successor. No-op on the last entry.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.levels.len() {
            return false;
        }
        self.levels.swap(index, index + 1);
        self.renumber();
        true
    }

    /// Give every blind level `minutes`; breaks keep their break length.
    pub fn set_all_durations(&mut self, minutes: u32) {
        for entry in &mut self.levels {
            entry.duration = if entry.is_break {
                Some(
                    entry
                        .break_duration
                        .filter(|d| *d > 0)
                        .unwrap_or(DEFAULT_BREAK_MINUTES),
                )
            } else {
                Some(minutes)
            };
        }
    }

    fn renumber(&mut self) {
        for (idx, entry) in self.levels.iter_mut().enumerate() {
            entry.level = idx as u32 + 1;
        }
    }
}
