//! Integration tests for the player ledger and tournament money.

use poker_tournament_web::logic::{
    chip_leaders, list_players, player_investment, prize_for_player, total_investment,
};
use poker_tournament_web::{
    add_player, addon, combined_ranking, eliminate_player, financial_summary, grant_extra_chip, prize_pool, rebuy,
    remove_player, PlayerFilter, Tournament, TournamentError,
};
use uuid::Uuid;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn buy_in_rebuy_and_elimination() {
    let mut t = Tournament::new("owner", "Friday");
    let alice = add_player(&mut t, "Alice").unwrap();
    assert_eq!(t.get_player(alice).unwrap().chips, 10_000);

    rebuy(&mut t, alice).unwrap();
    let p = t.get_player(alice).unwrap();
    assert_eq!(p.chips, 20_000);
    assert_eq!(p.actions, 2);
    assert_eq!(p.rebuys, 1);

    assert_eq!(eliminate_player(&mut t, alice), Ok(1));
    let p = t.get_player(alice).unwrap();
    assert!(!p.active);
    assert_eq!(p.position, Some(1));
}

#[test]
fn names_are_trimmed_and_unique() {
    let mut t = Tournament::new("owner", "Friday");
    let id = add_player(&mut t, "  Bob ").unwrap();
    assert_eq!(t.get_player(id).unwrap().name, "Bob");
    assert_eq!(add_player(&mut t, "bob"), Err(TournamentError::DuplicatePlayerName));
    assert_eq!(add_player(&mut t, "   "), Err(TournamentError::InvalidName));
    assert_eq!(t.players.len(), 1);
}

#[test]
fn time_chip_only_during_first_two_levels() {
    let mut t = Tournament::new("owner", "Friday");
    t.finance.time_chip_enabled = true;
    let early = add_player(&mut t, "Early").unwrap();
    t.clock.current_level_index = 1;
    let second = add_player(&mut t, "Second").unwrap();
    t.clock.current_level_index = 2;
    let late = add_player(&mut t, "Late").unwrap();

    assert_eq!(t.get_player(early).unwrap().chips, 12_000);
    assert!(t.get_player(early).unwrap().has_time_chip);
    assert!(t.get_player(second).unwrap().has_time_chip);
    assert_eq!(t.get_player(late).unwrap().chips, 10_000);
    assert!(!t.get_player(late).unwrap().has_time_chip);
}

#[test]
fn time_chip_disabled_gives_plain_stack() {
    let mut t = Tournament::new("owner", "Friday");
    let id = add_player(&mut t, "Carol").unwrap();
    assert_eq!(t.get_player(id).unwrap().chips, 10_000);
    assert!(!t.get_player(id).unwrap().has_time_chip);
}

#[test]
fn addon_adds_chips_without_an_action() {
    let mut t = Tournament::new("owner", "Friday");
    let id = add_player(&mut t, "Dave").unwrap();
    addon(&mut t, id).unwrap();
    let p = t.get_player(id).unwrap();
    assert_eq!(p.chips, 15_000);
    assert_eq!(p.addons, 1);
    assert_eq!(p.actions, 1);
}

#[test]
fn extra_chip_rules() {
    let mut t = Tournament::new("owner", "Friday");
    let id = add_player(&mut t, "Erin").unwrap();
    assert_eq!(grant_extra_chip(&mut t, id), Err(TournamentError::ExtraChipDisabled));

    t.finance.extra_chip_enabled = true;
    grant_extra_chip(&mut t, id).unwrap();
    assert_eq!(t.get_player(id).unwrap().chips, 12_000);
    assert_eq!(
        grant_extra_chip(&mut t, id),
        Err(TournamentError::ExtraChipAlreadyGranted(id))
    );
    assert_eq!(t.get_player(id).unwrap().chips, 12_000);
}

#[test]
fn unknown_player_is_reported() {
    let mut t = Tournament::new("owner", "Friday");
    let ghost = Uuid::new_v4();
    assert_eq!(rebuy(&mut t, ghost), Err(TournamentError::PlayerNotFound(ghost)));
    assert_eq!(addon(&mut t, ghost), Err(TournamentError::PlayerNotFound(ghost)));
    assert!(eliminate_player(&mut t, ghost).is_err());
    assert!(remove_player(&mut t, ghost).is_err());
}

#[test]
fn eliminations_are_numbered_in_order() {
    let mut t = Tournament::new("owner", "Friday");
    let a = add_player(&mut t, "A").unwrap();
    let b = add_player(&mut t, "B").unwrap();
    let c = add_player(&mut t, "C").unwrap();
    assert_eq!(eliminate_player(&mut t, b), Ok(1));
    assert_eq!(eliminate_player(&mut t, a), Ok(2));
    assert_eq!(
        eliminate_player(&mut t, a),
        Err(TournamentError::AlreadyEliminated(a))
    );
    assert_eq!(t.active_count(), 1);
    assert!(t.get_player(c).unwrap().active);
}

#[test]
fn removing_a_player_keeps_other_positions() {
    let mut t = Tournament::new("owner", "Friday");
    let a = add_player(&mut t, "A").unwrap();
    let b = add_player(&mut t, "B").unwrap();
    add_player(&mut t, "C").unwrap();
    eliminate_player(&mut t, a).unwrap();
    eliminate_player(&mut t, b).unwrap();

    let removed = remove_player(&mut t, a).unwrap();
    assert_eq!(removed.name, "A");
    assert_eq!(t.get_player(b).unwrap().position, Some(2));
    assert_eq!(t.players.len(), 2);
}

#[test]
fn investment_and_prize_pool() {
    let mut t = Tournament::new("owner", "Friday");
    t.finance.extra_chip_enabled = true;
    let a = add_player(&mut t, "A").unwrap();
    let b = add_player(&mut t, "B").unwrap();
    rebuy(&mut t, a).unwrap();
    addon(&mut t, a).unwrap();
    grant_extra_chip(&mut t, a).unwrap();

    let pa = t.get_player(a).unwrap();
    assert!(close(player_investment(pa, &t.finance), 270.0));
    let pb = t.get_player(b).unwrap();
    assert!(close(player_investment(pb, &t.finance), 100.0));

    assert!(close(total_investment(&t), 370.0));
    assert!(close(prize_pool(&t), 333.0));

    let summary = financial_summary(&t);
    assert!(close(summary.total_collected, 370.0));
    assert!(close(summary.admin_fee, 37.0));
    assert!(close(summary.prize_pool + summary.admin_fee, summary.total_collected));
    assert_eq!(summary.active_players, 2);
    assert_eq!(summary.eliminated_players, 0);
}

#[test]
fn empty_tournament_has_empty_pool() {
    let t = Tournament::new("owner", "Friday");
    assert_eq!(prize_pool(&t), 0.0);
    assert_eq!(financial_summary(&t).total_collected, 0.0);
}

#[test]
fn prizes_follow_elimination_positions() {
    let mut t = Tournament::new("owner", "Friday");
    let ids: Vec<_> = ["A", "B", "C", "D"]
        .iter()
        .map(|n| add_player(&mut t, n).unwrap())
        .collect();
    for id in &ids {
        eliminate_player(&mut t, *id).unwrap();
    }
    let pool = 1000.0;
    let prizes: Vec<f64> = ids
        .iter()
        .map(|id| prize_for_player(t.get_player(*id).unwrap(), pool))
        .collect();
    assert!(close(prizes[0], 500.0));
    assert!(close(prizes[1], 300.0));
    assert!(close(prizes[2], 200.0));
    assert_eq!(prizes[3], 0.0);
}

#[test]
fn active_players_win_nothing_yet() {
    let mut t = Tournament::new("owner", "Friday");
    let id = add_player(&mut t, "A").unwrap();
    assert_eq!(prize_for_player(t.get_player(id).unwrap(), 500.0), 0.0);
}

#[test]
fn listing_filters_and_sorts() {
    let mut t = Tournament::new("owner", "Friday");
    let small = add_player(&mut t, "Small Stack").unwrap();
    let big = add_player(&mut t, "Big Stack").unwrap();
    let out = add_player(&mut t, "Gone").unwrap();
    rebuy(&mut t, big).unwrap();
    rebuy(&mut t, out).unwrap();
    rebuy(&mut t, out).unwrap();
    eliminate_player(&mut t, out).unwrap();

    let all: Vec<_> = list_players(&t, PlayerFilter::All, None)
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(all, vec![big, small, out]);

    let active = list_players(&t, PlayerFilter::Active, None);
    assert_eq!(active.len(), 2);
    let eliminated = list_players(&t, PlayerFilter::Eliminated, None);
    assert_eq!(eliminated.len(), 1);
    assert_eq!(eliminated[0].id, out);

    let found = list_players(&t, PlayerFilter::All, Some(" stack "));
    assert_eq!(found.len(), 2);
    let found = list_players(&t, PlayerFilter::Active, Some("GONE"));
    assert!(found.is_empty());
}

#[test]
fn chip_leaders_are_limited() {
    let mut t = Tournament::new("owner", "Friday");
    for name in ["A", "B", "C"] {
        add_player(&mut t, name).unwrap();
    }
    let b = t.players[1].id;
    rebuy(&mut t, b).unwrap();
    let leaders = chip_leaders(&t, 2);
    assert_eq!(leaders.len(), 2);
    assert_eq!(leaders[0].id, b);
}

#[test]
fn duplicate_names_are_caught_beyond_ascii() {
    let mut t = Tournament::new("owner", "Friday");
    add_player(&mut t, "émile").unwrap();
    assert_eq!(
        add_player(&mut t, "ÉMILE"),
        Err(TournamentError::DuplicatePlayerName)
    );
    assert_eq!(
        add_player(&mut t, " Émile "),
        Err(TournamentError::DuplicatePlayerName)
    );
    assert_eq!(t.players.len(), 1);

    let combined = combined_ranking([&t]);
    assert_eq!(combined.len(), 1);
    assert_eq!(combined[0].tournaments, 1);
}
