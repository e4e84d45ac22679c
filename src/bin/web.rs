//! Single binary web server: admin page and TV page from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. See `AppConfig::from_env` for the environment overrides.

use actix_files::Files;
use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get, http::header, post, put,
    web::{self, Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use poker_tournament_web::{
    logic::{
        self, add_break, add_level, average_increase_percent, export_file_name, level_counts,
        list_players, minutes_to_first_break, move_level, remove_level, reset_to_standard,
        set_all_durations, share_text, structure_text, total_minutes, tournament_results,
        update_level,
    },
    spectator::SpectatorFeed,
    store::{tick_clock, tournaments_for_group, TournamentStore},
    AppConfig, BlindLevel, BlindLevelPatch, ClockEvent, InMemoryStore, OwnerId, PlayerFilter,
    PlayerId, RankingGroup, RankingGroupId, RetryPolicy, StoreError, Tournament,
    TournamentError, TournamentId, TournamentUpdate,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Session key holding the anonymous owner id.
const OWNER_KEY: &str = "owner_id";

/// Shared server state: the store, the retry policy for store calls and the spectator feed.
struct AppState {
    store: Arc<dyn TournamentStore>,
    retry: RetryPolicy,
    spectator: SpectatorFeed,
    /// Tournament currently shown on the TV page.
    tv_selection: RwLock<Option<TournamentId>>,
}

type SharedState = Data<AppState>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    #[serde(default = "default_tournament_name")]
    name: String,
}

fn default_tournament_name() -> String {
    "New tournament".to_string()
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
}

#[derive(Deserialize)]
struct PlayerListQuery {
    #[serde(default)]
    filter: PlayerFilter,
    search: Option<String>,
}

#[derive(Deserialize)]
struct AddLevelBody {
    duration: Option<u32>,
}

#[derive(Deserialize)]
struct DurationsBody {
    minutes: u32,
}

#[derive(Deserialize)]
struct RankingGroupBody {
    name: String,
    tournament_ids: Vec<TournamentId>,
}

#[derive(Deserialize)]
struct CombinedRankingBody {
    tournament_ids: Vec<TournamentId>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and player id (e.g. /api/tournaments/{id}/players/{player_id})
#[derive(Deserialize)]
struct TournamentPlayerPath {
    id: TournamentId,
    player_id: PlayerId,
}

/// Path segments: tournament id and schedule index (e.g. /api/tournaments/{id}/blinds/{index})
#[derive(Deserialize)]
struct TournamentLevelPath {
    id: TournamentId,
    index: usize,
}

#[derive(Deserialize)]
struct GroupPath {
    id: RankingGroupId,
}

#[derive(Serialize)]
struct ScheduleResponse<'a> {
    levels: &'a [BlindLevel],
    level_duration: u32,
    total_minutes: u32,
    minutes_to_first_break: u32,
    average_increase_percent: f64,
    blind_levels: usize,
    breaks: usize,
    structure_text: String,
}

/// Owner id for this browser session, created on first use.
fn owner_id(session: &Session) -> OwnerId {
    if let Ok(Some(id)) = session.get::<String>(OWNER_KEY) {
        return id;
    }
    let id = Uuid::new_v4().to_string();
    if let Err(e) = session.insert(OWNER_KEY, &id) {
        log::warn!("Could not store owner id in session: {}", e);
    }
    id
}

fn error_json(message: impl ToString) -> serde_json::Value {
    serde_json::json!({ "error": message.to_string() })
}

fn bad_request(e: TournamentError) -> HttpResponse {
    HttpResponse::BadRequest().json(error_json(e))
}

fn store_error(e: StoreError) -> HttpResponse {
    match e {
        StoreError::NotFound { .. } => HttpResponse::NotFound().json(error_json(e)),
        StoreError::Conflict { .. } => HttpResponse::Conflict().json(error_json(e)),
        StoreError::Unavailable(_) => {
            log::error!("Store call failed: {}", e);
            HttpResponse::ServiceUnavailable().json(error_json(e))
        }
    }
}

fn no_tournament() -> HttpResponse {
    HttpResponse::NotFound().json(error_json("No tournament"))
}

fn csv_download(body: Result<String, csv::Error>, file_name: String) -> HttpResponse {
    match body {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ))
            .body(body),
        Err(e) => {
            log::error!("CSV export failed: {}", e);
            HttpResponse::InternalServerError().json(error_json(e))
        }
    }
}

/// Fetch a tournament owned by `owner` (another owner's tournament reads as missing).
async fn load_owned(
    state: &AppState,
    owner: &str,
    id: TournamentId,
) -> Result<Tournament, HttpResponse> {
    let t = state
        .retry
        .run(|| state.store.get_tournament(id))
        .await
        .map_err(store_error)?;
    if t.owner_id != owner {
        return Err(no_tournament());
    }
    Ok(t)
}

/// Load, change and write back one tournament. If the write fails the change is dropped
/// and the failure is returned to the caller.
async fn mutate<T, F>(
    state: &AppState,
    owner: &str,
    id: TournamentId,
    change: F,
) -> Result<(Tournament, T), HttpResponse>
where
    F: FnOnce(&mut Tournament) -> Result<T, TournamentError>,
{
    let mut t = load_owned(state, owner, id).await?;
    let out = change(&mut t).map_err(bad_request)?;
    let saved = state
        .retry
        .run(|| state.store.update_tournament(t.clone()))
        .await
        .map_err(store_error)?;
    Ok((saved, out))
}

/// Mutate and answer with the updated tournament.
async fn mutate_and_respond<T, F>(
    state: &AppState,
    session: &Session,
    id: TournamentId,
    change: F,
) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> Result<T, TournamentError>,
{
    let owner = owner_id(session);
    match mutate(state, &owner, id, change).await {
        Ok((t, _)) => HttpResponse::Ok().json(t),
        Err(resp) => resp,
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "poker-tournament-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Tournaments of the current session, newest first.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: SharedState, session: Session) -> HttpResponse {
    let owner = owner_id(&session);
    match state.retry.run(|| state.store.list_tournaments(&owner)).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => store_error(e),
    }
}

/// Create a tournament with the standard schedule and default finances.
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: SharedState,
    session: Session,
    body: Option<Json<CreateTournamentBody>>,
) -> HttpResponse {
    let owner = owner_id(&session);
    let name = body
        .map(|b| b.into_inner().name)
        .unwrap_or_else(default_tournament_name);
    let name = name.trim();
    if name.is_empty() {
        return bad_request(TournamentError::InvalidName);
    }
    let tournament = Tournament::new(owner, name);
    match state
        .retry
        .run(|| state.store.create_tournament(tournament.clone()))
        .await
    {
        Ok(t) => {
            log::info!("Created tournament {} ({})", t.id, t.name);
            HttpResponse::Ok().json(t)
        }
        Err(e) => store_error(e),
    }
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    let owner = owner_id(&session);
    match load_owned(&state, &owner, path.id).await {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(resp) => resp,
    }
}

/// Replace one field group (rename, finance, schedule, players, clock, stage weight).
#[put("/api/tournaments/{id}")]
async fn api_update_tournament(
    state: SharedState,
    session: Session,
    path: Path<TournamentPath>,
    body: Json<TournamentUpdate>,
) -> HttpResponse {
    let update = body.into_inner();
    mutate_and_respond(&state, &session, path.id, |t| t.apply(update)).await
}

#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    let owner = owner_id(&session);
    if let Err(resp) = load_owned(&state, &owner, path.id).await {
        return resp;
    }
    if let Err(e) = state.retry.run(|| state.store.delete_tournament(path.id)).await {
        return store_error(e);
    }
    if let Ok(mut selection) = state.tv_selection.write() {
        if *selection == Some(path.id) {
            *selection = None;
            state.spectator.clear();
        }
    }
    log::info!("Deleted tournament {}", path.id);
    HttpResponse::NoContent().finish()
}

/// Totals: collected, prize pool, admin fee, active/eliminated counts.
#[get("/api/tournaments/{id}/summary")]
async fn api_summary(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    let owner = owner_id(&session);
    match load_owned(&state, &owner, path.id).await {
        Ok(t) => HttpResponse::Ok().json(logic::financial_summary(&t)),
        Err(resp) => resp,
    }
}

#[get("/api/tournaments/{id}/players")]
async fn api_list_players(
    state: SharedState,
    session: Session,
    path: Path<TournamentPath>,
    query: Query<PlayerListQuery>,
) -> HttpResponse {
    let owner = owner_id(&session);
    match load_owned(&state, &owner, path.id).await {
        Ok(t) => HttpResponse::Ok().json(list_players(&t, query.filter, query.search.as_deref())),
        Err(resp) => resp,
    }
}

#[post("/api/tournaments/{id}/players")]
async fn api_add_player(
    state: SharedState,
    session: Session,
    path: Path<TournamentPath>,
    body: Json<AddPlayerBody>,
) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| logic::add_player(t, &body.name)).await
}

#[delete("/api/tournaments/{id}/players/{player_id}")]
async fn api_remove_player(state: SharedState, session: Session, path: Path<TournamentPlayerPath>) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| logic::remove_player(t, path.player_id)).await
}

#[post("/api/tournaments/{id}/players/{player_id}/rebuy")]
async fn api_rebuy(state: SharedState, session: Session, path: Path<TournamentPlayerPath>) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| logic::rebuy(t, path.player_id)).await
}

#[post("/api/tournaments/{id}/players/{player_id}/addon")]
async fn api_addon(state: SharedState, session: Session, path: Path<TournamentPlayerPath>) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| logic::addon(t, path.player_id)).await
}

#[post("/api/tournaments/{id}/players/{player_id}/extra-chip")]
async fn api_extra_chip(state: SharedState, session: Session, path: Path<TournamentPlayerPath>) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| logic::grant_extra_chip(t, path.player_id)).await
}

#[post("/api/tournaments/{id}/players/{player_id}/eliminate")]
async fn api_eliminate(state: SharedState, session: Session, path: Path<TournamentPlayerPath>) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| logic::eliminate_player(t, path.player_id)).await
}

/// Start or pause the clock.
#[post("/api/tournaments/{id}/clock/toggle")]
async fn api_clock_toggle(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| {
        let running = logic::toggle_running(t);
        log::info!("Tournament {} clock {}", t.id, if running { "started" } else { "paused" });
        Ok(())
    })
    .await
}

#[post("/api/tournaments/{id}/clock/next")]
async fn api_clock_next(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| {
        logic::advance_level(t);
        Ok(())
    })
    .await
}

#[post("/api/tournaments/{id}/clock/previous")]
async fn api_clock_previous(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| {
        logic::previous_level(t);
        Ok(())
    })
    .await
}

#[post("/api/tournaments/{id}/clock/reset")]
async fn api_clock_reset(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| {
        logic::reset_clock(t);
        Ok(())
    })
    .await
}

/// Schedule with statistics and a plain-text listing.
#[get("/api/tournaments/{id}/blinds")]
async fn api_schedule(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    let owner = owner_id(&session);
    let t = match load_owned(&state, &owner, path.id).await {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let (blind_levels, breaks) = level_counts(&t.blinds);
    HttpResponse::Ok().json(ScheduleResponse {
        levels: t.blinds.levels(),
        level_duration: t.clock.level_duration,
        total_minutes: total_minutes(&t),
        minutes_to_first_break: minutes_to_first_break(&t),
        average_increase_percent: average_increase_percent(&t.blinds),
        blind_levels,
        breaks,
        structure_text: structure_text(&t),
    })
}

#[post("/api/tournaments/{id}/blinds/levels")]
async fn api_add_level(
    state: SharedState,
    session: Session,
    path: Path<TournamentPath>,
    body: Option<Json<AddLevelBody>>,
) -> HttpResponse {
    let duration = body.and_then(|b| b.duration);
    mutate_and_respond(&state, &session, path.id, |t| add_level(t, duration)).await
}

#[post("/api/tournaments/{id}/blinds/breaks")]
async fn api_add_break(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| {
        add_break(t);
        Ok(())
    })
    .await
}

#[put("/api/tournaments/{id}/blinds/{index}")]
async fn api_update_level(
    state: SharedState,
    session: Session,
    path: Path<TournamentLevelPath>,
    body: Json<BlindLevelPatch>,
) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| update_level(t, path.index, &body)).await
}

#[delete("/api/tournaments/{id}/blinds/{index}")]
async fn api_remove_level(state: SharedState, session: Session, path: Path<TournamentLevelPath>) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| remove_level(t, path.index)).await
}

#[post("/api/tournaments/{id}/blinds/{index}/up")]
async fn api_move_level_up(state: SharedState, session: Session, path: Path<TournamentLevelPath>) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| move_level(t, path.index, true)).await
}

#[post("/api/tournaments/{id}/blinds/{index}/down")]
async fn api_move_level_down(state: SharedState, session: Session, path: Path<TournamentLevelPath>) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| move_level(t, path.index, false)).await
}

#[put("/api/tournaments/{id}/blinds-durations")]
async fn api_set_durations(
    state: SharedState,
    session: Session,
    path: Path<TournamentPath>,
    body: Json<DurationsBody>,
) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| set_all_durations(t, body.minutes)).await
}

/// Standard structure, clock back to the first level.
#[post("/api/tournaments/{id}/blinds-reset")]
async fn api_reset_schedule(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    mutate_and_respond(&state, &session, path.id, |t| {
        reset_to_standard(t);
        Ok(())
    })
    .await
}

#[get("/api/tournaments/{id}/ranking")]
async fn api_tournament_ranking(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    let owner = owner_id(&session);
    match load_owned(&state, &owner, path.id).await {
        Ok(t) => HttpResponse::Ok().json(logic::rank_tournament(&t)),
        Err(resp) => resp,
    }
}

/// Score the tournament and upsert one result row per player.
#[post("/api/tournaments/{id}/results")]
async fn api_save_results(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    let owner = owner_id(&session);
    let t = match load_owned(&state, &owner, path.id).await {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let rows = tournament_results(&t);
    match state.retry.run(|| state.store.upsert_results(rows.clone())).await {
        Ok(count) => {
            log::info!("Saved {} result(s) for tournament {}", count, t.id);
            HttpResponse::Ok().json(rows)
        }
        Err(e) => store_error(e),
    }
}

#[get("/api/tournaments/{id}/results")]
async fn api_results(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    let owner = owner_id(&session);
    if let Err(resp) = load_owned(&state, &owner, path.id).await {
        return resp;
    }
    match state.retry.run(|| state.store.results_for(&[path.id])).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => store_error(e),
    }
}

#[get("/api/tournaments/{id}/export.csv")]
async fn api_export_ledger(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    let owner = owner_id(&session);
    match load_owned(&state, &owner, path.id).await {
        Ok(t) => {
            let file_name = export_file_name("tournament", &t.name, chrono::Utc::now().date_naive());
            csv_download(logic::ledger_csv(&t), file_name)
        }
        Err(resp) => resp,
    }
}

/// Put this tournament on the TV display.
#[post("/api/tournaments/{id}/tv")]
async fn api_select_tv(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    let owner = owner_id(&session);
    let t = match load_owned(&state, &owner, path.id).await {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match state.tv_selection.write() {
        Ok(mut selection) => *selection = Some(t.id),
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    }
    state.spectator.publish(&t);
    log::info!("Tournament {} is now on the TV display", t.id);
    HttpResponse::Ok().json(state.spectator.subscribe().view())
}

/// Read-only view for the TV page. No session needed.
#[get("/api/spectator")]
async fn api_spectator(state: SharedState) -> HttpResponse {
    HttpResponse::Ok().json(state.spectator.subscribe().view())
}

/// Combine an ad-hoc selection of the session's tournaments.
#[post("/api/ranking/combined")]
async fn api_combined_ranking(
    state: SharedState,
    session: Session,
    body: Json<CombinedRankingBody>,
) -> HttpResponse {
    let owner = owner_id(&session);
    let mut tournaments = Vec::with_capacity(body.tournament_ids.len());
    for &id in &body.tournament_ids {
        match load_owned(&state, &owner, id).await {
            Ok(t) => tournaments.push(t),
            Err(resp) => return resp,
        }
    }
    HttpResponse::Ok().json(logic::combined_ranking(&tournaments))
}

#[get("/api/ranking-groups")]
async fn api_list_groups(state: SharedState, session: Session) -> HttpResponse {
    let owner = owner_id(&session);
    match state.retry.run(|| state.store.list_ranking_groups(&owner)).await {
        Ok(groups) => HttpResponse::Ok().json(groups),
        Err(e) => store_error(e),
    }
}

#[post("/api/ranking-groups")]
async fn api_create_group(state: SharedState, session: Session, body: Json<RankingGroupBody>) -> HttpResponse {
    let owner = owner_id(&session);
    let body = body.into_inner();
    let group = match RankingGroup::new(owner, &body.name, body.tournament_ids) {
        Ok(g) => g,
        Err(e) => return bad_request(e),
    };
    match state
        .retry
        .run(|| state.store.create_ranking_group(group.clone()))
        .await
    {
        Ok(g) => HttpResponse::Ok().json(g),
        Err(e) => store_error(e),
    }
}

async fn load_group(state: &AppState, owner: &str, id: RankingGroupId) -> Result<RankingGroup, HttpResponse> {
    let group = state
        .retry
        .run(|| state.store.get_ranking_group(id))
        .await
        .map_err(store_error)?;
    if group.owner_id != owner {
        return Err(HttpResponse::NotFound().json(error_json("No ranking group")));
    }
    Ok(group)
}

#[put("/api/ranking-groups/{id}")]
async fn api_update_group(
    state: SharedState,
    session: Session,
    path: Path<GroupPath>,
    body: Json<RankingGroupBody>,
) -> HttpResponse {
    let owner = owner_id(&session);
    let mut group = match load_group(&state, &owner, path.id).await {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    let body = body.into_inner();
    if let Err(e) = group.edit(&body.name, body.tournament_ids) {
        return bad_request(e);
    }
    match state
        .retry
        .run(|| state.store.update_ranking_group(group.clone()))
        .await
    {
        Ok(g) => HttpResponse::Ok().json(g),
        Err(e) => store_error(e),
    }
}

#[delete("/api/ranking-groups/{id}")]
async fn api_delete_group(state: SharedState, session: Session, path: Path<GroupPath>) -> HttpResponse {
    let owner = owner_id(&session);
    if let Err(resp) = load_group(&state, &owner, path.id).await {
        return resp;
    }
    match state.retry.run(|| state.store.delete_ranking_group(path.id)).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => store_error(e),
    }
}

/// Group plus its tournaments, loaded for ranking endpoints.
async fn group_tournaments(
    state: &AppState,
    session: &Session,
    id: RankingGroupId,
) -> Result<(RankingGroup, Vec<Tournament>), HttpResponse> {
    let owner = owner_id(session);
    let group = load_group(state, &owner, id).await?;
    let tournaments = state
        .retry
        .run(|| tournaments_for_group(state.store.as_ref(), &owner, &group))
        .await
        .map_err(store_error)?;
    Ok((group, tournaments))
}

#[get("/api/ranking-groups/{id}/ranking")]
async fn api_group_ranking(state: SharedState, session: Session, path: Path<GroupPath>) -> HttpResponse {
    match group_tournaments(&state, &session, path.id).await {
        Ok((_, tournaments)) => HttpResponse::Ok().json(logic::combined_ranking(&tournaments)),
        Err(resp) => resp,
    }
}

#[get("/api/ranking-groups/{id}/export.csv")]
async fn api_group_export(state: SharedState, session: Session, path: Path<GroupPath>) -> HttpResponse {
    match group_tournaments(&state, &session, path.id).await {
        Ok((group, tournaments)) => {
            let ranking = logic::combined_ranking(&tournaments);
            let file_name = export_file_name("ranking", &group.name, chrono::Utc::now().date_naive());
            csv_download(logic::ranking_csv(&ranking), file_name)
        }
        Err(resp) => resp,
    }
}

#[get("/api/ranking-groups/{id}/share")]
async fn api_group_share(state: SharedState, session: Session, path: Path<GroupPath>) -> HttpResponse {
    match group_tournaments(&state, &session, path.id).await {
        Ok((group, tournaments)) => {
            let ranking = logic::combined_ranking(&tournaments);
            HttpResponse::Ok()
                .content_type("text/plain; charset=utf-8")
                .body(share_text(&group.name, &ranking))
        }
        Err(resp) => resp,
    }
}

/// One clock second for every running tournament.
fn tick_running_clocks(state: &AppState) {
    let ids = match state.store.running_tournaments() {
        Ok(ids) => ids,
        Err(e) => {
            log::error!("Could not list running clocks: {}", e);
            return;
        }
    };
    for id in ids {
        match tick_clock(state.store.as_ref(), id) {
            Ok((saved, ClockEvent::LevelCompleted { level_index })) => {
                log::info!("Tournament {} moved to level {}", saved.id, level_index + 1)
            }
            Ok((saved, ClockEvent::Finished { level_index })) => log::info!(
                "Tournament {} reached its last level ({}), clock stopped",
                saved.id,
                level_index + 1
            ),
            Ok(_) => {}
            Err(StoreError::Conflict { .. }) => {
                log::warn!("Clock tick for {} lost two races with concurrent edits", id)
            }
            Err(e) => log::error!("Clock tick for {} not saved: {}", id, e),
        }
    }
}

/// Push the selected tournament to the spectator feed.
fn publish_spectator(state: &AppState) {
    let selected = match state.tv_selection.read() {
        Ok(guard) => *guard,
        Err(_) => return,
    };
    let Some(id) = selected else {
        return;
    };
    match state.store.get_tournament(id) {
        Ok(t) => state.spectator.publish(&t),
        Err(e) => log::warn!("Spectator snapshot for {} not published: {}", id, e),
    }
}

/// Cookie signing key: SESSION_KEY (at least 64 bytes) or a fresh random key.
fn session_key() -> Key {
    match std::env::var("SESSION_KEY") {
        Ok(raw) => match Key::try_from(raw.as_bytes()) {
            Ok(key) => key,
            Err(_) => {
                log::warn!("SESSION_KEY is shorter than 64 bytes; using a generated key");
                Key::generate()
            }
        },
        Err(_) => Key::generate(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let store: Arc<dyn TournamentStore> = Arc::new(InMemoryStore::new());
    let state = Data::new(AppState {
        store,
        retry: RetryPolicy::new(config.store_retry_attempts, config.store_retry_delay_ms),
        spectator: SpectatorFeed::new(config.spectator_staleness),
        tv_selection: RwLock::new(None),
    });

    // Background task: advance every running clock once per tick
    let state_clock = state.clone();
    let clock_tick = config.clock_tick;
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(clock_tick);
        loop {
            interval.tick().await;
            tick_running_clocks(&state_clock);
        }
    });

    // Background task: refresh the spectator snapshot
    let state_tv = state.clone();
    let publish_every = config.spectator_publish_interval;
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(publish_every);
        loop {
            interval.tick().await;
            publish_spectator(&state_tv);
        }
    });

    let key = session_key();
    HttpServer::new(move || {
        App::new()
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .app_data(state.clone())
            .route("/", web::get().to(serve_index_async))
            .route("/tv", web::get().to(serve_tv_async))
            .service(api_health)
            .service(favicon)
            .service(api_list_tournaments)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_update_tournament)
            .service(api_delete_tournament)
            .service(api_summary)
            .service(api_list_players)
            .service(api_add_player)
            .service(api_remove_player)
            .service(api_rebuy)
            .service(api_addon)
            .service(api_extra_chip)
            .service(api_eliminate)
            .service(api_clock_toggle)
            .service(api_clock_next)
            .service(api_clock_previous)
            .service(api_clock_reset)
            .service(api_schedule)
            .service(api_add_level)
            .service(api_add_break)
            .service(api_update_level)
            .service(api_remove_level)
            .service(api_move_level_up)
            .service(api_move_level_down)
            .service(api_set_durations)
            .service(api_reset_schedule)
            .service(api_tournament_ranking)
            .service(api_save_results)
            .service(api_results)
            .service(api_export_ledger)
            .service(api_select_tv)
            .service(api_spectator)
            .service(api_combined_ranking)
            .service(api_list_groups)
            .service(api_create_group)
            .service(api_update_group)
            .service(api_delete_group)
            .service(api_group_ranking)
            .service(api_group_export)
            .service(api_group_share)
            .service(Files::new("/static", "static"))
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}

async fn serve_tv_async() -> HttpResponse {
    let html = include_str!("../../templates/tv.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
