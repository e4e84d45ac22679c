//! Player ledger: registration, purchases, eliminations and the money they add up to.

use crate::models::{player_key, FinanceConfig, Player, PlayerId, Tournament, TournamentError};
use serde::{Deserialize, Serialize};

/// Levels (by index) during which new players still receive the time chip.
const TIME_CHIP_LEVELS: usize = 2;

/// Prize pool share paid to positions 1, 2 and 3.
const PAYOUT_SHARES: [f64; 3] = [0.50, 0.30, 0.20];

/// Register a player with one buy-in, plus the time chip when it applies.
pub fn add_player(tournament: &mut Tournament, name: &str) -> Result<PlayerId, TournamentError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::InvalidName);
    }
    let key = player_key(name);
    let is_duplicate = tournament.players.iter().any(|p| player_key(&p.name) == key);
    if is_duplicate {
        return Err(TournamentError::DuplicatePlayerName);
    }
    let finance = &tournament.finance;
    let time_chip = finance.time_chip_enabled
        && tournament.clock.current_level_index < TIME_CHIP_LEVELS;
    let bonus = if time_chip { finance.time_chip_value } else { 0 };
    let player = Player::new(name, finance.buy_in_chips.saturating_add(bonus), time_chip);
    let id = player.id;
    tournament.players.push(player);
    Ok(id)
}

/// One more buy-in for an existing player.
pub fn rebuy(tournament: &mut Tournament, player_id: PlayerId) -> Result<(), TournamentError> {
    let chips = tournament.finance.rebuy_chips;
    tournament
        .get_player_mut(player_id)
        .ok_or(TournamentError::PlayerNotFound(player_id))?
        .rebuy(chips);
    Ok(())
}

pub fn addon(tournament: &mut Tournament, player_id: PlayerId) -> Result<(), TournamentError> {
    let chips = tournament.finance.addon_chips;
    tournament
        .get_player_mut(player_id)
        .ok_or(TournamentError::PlayerNotFound(player_id))?
        .addon(chips);
    Ok(())
}

/// Sell the one-time extra chip (only when enabled for the tournament).
pub fn grant_extra_chip(
    tournament: &mut Tournament,
    player_id: PlayerId,
) -> Result<(), TournamentError> {
    if !tournament.finance.extra_chip_enabled {
        return Err(TournamentError::ExtraChipDisabled);
    }
    let chips = tournament.finance.extra_chip_amount;
    let p = tournament
        .get_player_mut(player_id)
        .ok_or(TournamentError::PlayerNotFound(player_id))?;
    if !p.grant_extra_chip(chips) {
        return Err(TournamentError::ExtraChipAlreadyGranted(player_id));
    }
    Ok(())
}

/// Knock a player out. Position is the elimination order: the first player out gets 1.
pub fn eliminate_player(
    tournament: &mut Tournament,
    player_id: PlayerId,
) -> Result<u32, TournamentError> {
    let position = tournament.eliminated_count() as u32 + 1;
    let p = tournament
        .get_player_mut(player_id)
        .ok_or(TournamentError::PlayerNotFound(player_id))?;
    if !p.active {
        return Err(TournamentError::AlreadyEliminated(player_id));
    }
    p.eliminate(position);
    Ok(position)
}

/// Delete a player. Positions already handed out are not renumbered.
pub fn remove_player(tournament: &mut Tournament, player_id: PlayerId) -> Result<Player, TournamentError> {
    let idx = tournament
        .players
        .iter()
        .position(|p| p.id == player_id)
        .ok_or(TournamentError::PlayerNotFound(player_id))?;
    Ok(tournament.players.remove(idx))
}

/// Money a player has put in: buy-ins, addons and the extra chip.
pub fn player_investment(player: &Player, finance: &FinanceConfig) -> f64 {
    let buy_ins = player.actions as f64 * finance.buy_in_value;
    let addons = player.addons as f64 * finance.addon_value;
    let extra = if player.has_extra_chip {
        finance.extra_chip_value
    } else {
        0.0
    };
    buy_ins + addons + extra
}

pub fn total_investment(tournament: &Tournament) -> f64 {
    tournament
        .players
        .iter()
        .map(|p| player_investment(p, &tournament.finance))
        .sum()
}

/// Sum of all investments after the admin fee.
pub fn prize_pool(tournament: &Tournament) -> f64 {
    let keep = 1.0 - tournament.finance.admin_fee_percent / 100.0;
    tournament
        .players
        .iter()
        .map(|p| player_investment(p, &tournament.finance) * keep)
        .sum()
}

/// Prize owed to a player: eliminated positions 1 to 3 share the pool 50/30/20.
pub fn prize_for_player(player: &Player, prize_pool: f64) -> f64 {
    if player.active {
        return 0.0;
    }
    match player.position {
        Some(pos) if (1..=PAYOUT_SHARES.len() as u32).contains(&pos) => {
            prize_pool * PAYOUT_SHARES[pos as usize - 1]
        }
        _ => 0.0,
    }
}

/// Totals shown on the admin dashboard.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub total_collected: f64,
    pub prize_pool: f64,
    pub admin_fee: f64,
    pub active_players: usize,
    pub eliminated_players: usize,
}

pub fn financial_summary(tournament: &Tournament) -> FinancialSummary {
    let total_collected = total_investment(tournament);
    FinancialSummary {
        total_collected,
        prize_pool: prize_pool(tournament),
        admin_fee: total_collected * tournament.finance.admin_fee_percent / 100.0,
        active_players: tournament.active_count(),
        eliminated_players: tournament.eliminated_count(),
    }
}

/// Which players a listing should include.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerFilter {
    #[default]
    All,
    Active,
    Eliminated,
}

/// Filter by status and name (case-insensitive substring); active players first, then by chips.
pub fn list_players<'a>(
    tournament: &'a Tournament,
    filter: PlayerFilter,
    search: Option<&str>,
) -> Vec<&'a Player> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let mut players: Vec<&Player> = tournament
        .players
        .iter()
        .filter(|p| match filter {
            PlayerFilter::All => true,
            PlayerFilter::Active => p.active,
            PlayerFilter::Eliminated => !p.active,
        })
        .filter(|p| match &needle {
            Some(n) => p.name.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .collect();
    players.sort_by(|a, b| b.active.cmp(&a.active).then(b.chips.cmp(&a.chips)));
    players
}

/// Biggest stacks, largest first.
pub fn chip_leaders(tournament: &Tournament, limit: usize) -> Vec<&Player> {
    let mut players: Vec<&Player> = tournament.players.iter().collect();
    players.sort_by(|a, b| b.chips.cmp(&a.chips));
    players.truncate(limit);
    players
}
