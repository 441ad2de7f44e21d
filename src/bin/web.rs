//! Single binary web server: REST API plus static SPA files from /static.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).
//!
//! The real deployment puts an auth proxy in front of this service; the
//! caller's role arrives in the `x-role` header (anything but "admin" is a
//! plain member). Mutating endpoints are proxied admin-only upstream.

use actix_files::Files;
use actix_web::{
    delete, get, post, put, route,
    web::{Data, Json, Path},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tournament_bracket_web::{
    bracket_visible, generate_bracket, match_stats, record_match_stats, set_match_result, Role,
    Side, StatLine, Tournament, TournamentId,
};
use uuid::Uuid;

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// In-memory state: many tournaments by ID. Entries are removed after long inactivity.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(serde::Serialize)]
struct TournamentSummary {
    id: TournamentId,
    title: String,
    game: String,
    phase: tournament_bracket_web::TournamentPhase,
    participant_count: usize,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    title: String,
    #[serde(default)]
    game: String,
}

#[derive(Deserialize)]
struct UpdateTournamentBody {
    title: Option<String>,
    game: Option<String>,
}

#[derive(Deserialize)]
struct RegisterSoloBody {
    user_id: Uuid,
    label: String,
}

#[derive(Deserialize)]
struct RegisterTeamBody {
    label: String,
    members: Vec<Uuid>,
}

#[derive(Deserialize)]
struct UnregisterSoloBody {
    user_id: Uuid,
}

#[derive(Deserialize)]
struct UnregisterTeamBody {
    team_id: Uuid,
}

/// Winner side arrives as a string from the SPA ("p1" / "p2"); anything else
/// is rejected with a specific error.
#[derive(Deserialize)]
struct MatchResultBody {
    round_index: usize,
    match_index: usize,
    winner_side: String,
}

#[derive(Deserialize)]
struct MatchStatsBody {
    lines: Vec<StatLine>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and participant id.
#[derive(Deserialize)]
struct TournamentParticipantPath {
    id: TournamentId,
    participant_id: Uuid,
}

/// Path segments: tournament id and user id (e.g. /api/tournaments/{id}/my-status/{user_id})
#[derive(Deserialize)]
struct TournamentUserPath {
    id: TournamentId,
    user_id: Uuid,
}

/// Path segments: tournament id plus round/match position.
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    round_index: usize,
    match_index: usize,
}

/// Role asserted by the auth proxy in front of this service.
fn caller_role(req: &HttpRequest) -> Role {
    match req.headers().get("x-role").and_then(|v| v.to_str().ok()) {
        Some("admin") => Role::Admin,
        _ => Role::Member,
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-bracket-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Public list of tournaments (summaries only; brackets stay behind the gate).
#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let mut list: Vec<TournamentSummary> = g
        .values()
        .map(|e| TournamentSummary {
            id: e.tournament.id,
            title: e.tournament.title.clone(),
            game: e.tournament.game.clone(),
            phase: e.tournament.phase,
            participant_count: e.tournament.participants.len(),
            created_at: e.tournament.created_at,
        })
        .collect();
    list.sort_by_key(|s| s.created_at);
    HttpResponse::Ok().json(list)
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let tournament = Tournament::new(body.title.trim(), body.game.trim());
    let id = tournament.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        },
    );
    HttpResponse::Ok().json(&g.get(&id).unwrap().tournament)
}

/// Get a tournament by id (404 if not found). The bracket field is blanked
/// for callers the visibility gate turns away.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(
    state: AppState,
    path: Path<TournamentPath>,
    req: HttpRequest,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            let t = &entry.tournament;
            if bracket_visible(t.phase, caller_role(&req)) {
                HttpResponse::Ok().json(t)
            } else {
                let mut redacted = t.clone();
                redacted.bracket = None;
                HttpResponse::Ok().json(&redacted)
            }
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Update tournament metadata (admin).
#[put("/api/tournaments/{id}")]
async fn api_update_tournament(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<UpdateTournamentBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    if let Some(title) = &body.title {
        t.title = title.trim().to_string();
    }
    if let Some(game) = &body.game {
        t.game = game.trim().to_string();
    }
    HttpResponse::Ok().json(t)
}

/// Delete a tournament (admin).
#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.remove(&path.id) {
        Some(_) => HttpResponse::Ok().json(serde_json::json!({ "deleted": true })),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// List registered participants (admin).
#[get("/api/tournaments/{id}/participants")]
async fn api_get_participants(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.tournament.participants)
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Open/close registration (admin).
#[post("/api/tournaments/{id}/toggle-registration")]
async fn api_toggle_registration(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match t.toggle_registration() {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Whether a user is registered, solo or via a team.
#[get("/api/tournaments/{id}/my-status/{user_id}")]
async fn api_my_status(state: AppState, path: Path<TournamentUserPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            let registered = entry.tournament.is_registered(path.user_id);
            HttpResponse::Ok().json(serde_json::json!({ "registered": registered }))
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Register a solo entrant (registration must be open).
#[post("/api/tournaments/{id}/register-solo")]
async fn api_register_solo(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<RegisterSoloBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match t.register_solo(body.user_id, body.label.trim()) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Register a team (registration must be open; every member unregistered).
#[post("/api/tournaments/{id}/register-team")]
async fn api_register_team(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<RegisterTeamBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match t.register_team(body.label.trim(), body.members.clone()) {
        Ok(_) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Withdraw a solo entrant. Both verbs: older clients DELETE, the SPA POSTs.
#[route(
    "/api/tournaments/{id}/unregister-solo",
    method = "POST",
    method = "DELETE"
)]
async fn api_unregister_solo(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<UnregisterSoloBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match t.unregister_solo(body.user_id) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Withdraw a team. Both verbs, as for unregister-solo.
#[route(
    "/api/tournaments/{id}/unregister-team",
    method = "POST",
    method = "DELETE"
)]
async fn api_unregister_team(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<UnregisterTeamBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match t.unregister_team(body.team_id) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Admin removal of any participant before the draw.
#[delete("/api/tournaments/{id}/participants/{participant_id}")]
async fn api_remove_participant(
    state: AppState,
    path: Path<TournamentParticipantPath>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match t.remove_participant(path.participant_id) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Generate (or regenerate) the bracket from current participants (admin).
#[post("/api/tournaments/{id}/generate-bracket")]
async fn api_generate_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match generate_bracket(t) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// The bracket tree, gated: non-admins get 403 while registration is open.
#[get("/api/tournaments/{id}/bracket")]
async fn api_get_bracket(
    state: AppState,
    path: Path<TournamentPath>,
    req: HttpRequest,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &entry.tournament;
    if !bracket_visible(t.phase, caller_role(&req)) {
        return HttpResponse::Forbidden()
            .json(serde_json::json!({ "error": "Bracket is not visible yet" }));
    }
    HttpResponse::Ok().json(serde_json::json!({
        "title": t.title,
        "bracket": t.bracket,
    }))
}

/// Whether the caller may view the bracket right now.
#[get("/api/tournaments/{id}/bracket/visibility")]
async fn api_bracket_visibility(
    state: AppState,
    path: Path<TournamentPath>,
    req: HttpRequest,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            let visible = bracket_visible(entry.tournament.phase, caller_role(&req));
            HttpResponse::Ok().json(serde_json::json!({ "visible": visible }))
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Record a match winner and propagate (admin). Writes are serialized by the
/// store's write lock, so two racing submissions cannot drop each other.
#[post("/api/tournaments/{id}/bracket/match-result")]
async fn api_set_match_result(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<MatchResultBody>,
) -> HttpResponse {
    let side = match Side::from_str(&body.winner_side) {
        Ok(s) => s,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
        }
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match set_match_result(t, body.round_index, body.match_index, side) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Stat lines recorded for one match (admin).
#[get("/api/tournaments/{id}/matches/{round_index}/{match_index}/player-stats")]
async fn api_get_match_stats(state: AppState, path: Path<TournamentMatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    match match_stats(&entry.tournament, path.round_index, path.match_index) {
        Ok(lines) => HttpResponse::Ok().json(lines),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Replace the stat lines for one match (admin).
#[post("/api/tournaments/{id}/matches/{round_index}/{match_index}/player-stats")]
async fn api_record_match_stats(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<MatchStatsBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match record_match_stats(t, path.round_index, path.match_index, body.lines.clone()) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}


fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(favicon)
            .service(api_list_tournaments)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_update_tournament)
            .service(api_delete_tournament)
            .service(api_get_participants)
            .service(api_toggle_registration)
            .service(api_my_status)
            .service(api_register_solo)
            .service(api_register_team)
            .service(api_unregister_solo)
            .service(api_unregister_team)
            .service(api_remove_participant)
            .service(api_generate_bracket)
            .service(api_get_bracket)
            .service(api_bracket_visibility)
            .service(api_set_match_result)
            .service(api_get_match_stats)
            .service(api_record_match_stats)
            .service(Files::new("/", "static").index_file("index.html"))
    })
    .bind(bind)?
    .run()
    .await
}
