//! Team-formation web server: index page, static assets, and the JSON session API.
//! Start it with `cargo run --bin web`.
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Formation timings come from NAEJEON_* env vars (see FormationConfig::from_env).

use actix_files::Files;
use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use naejeon_web::broadcast::{Broadcaster, ChannelBroadcaster};
use naejeon_web::{
    apply_action, tick, Action, DraftMethod, FormationConfig, FormationError, FormationSession,
    FormationState, GameInfo, MatchId, Participant, RpsHand, SessionId, Side, Strategy, UserId,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-session entry: formation data + last activity time (for auto-cleanup).
struct SessionEntry {
    session: FormationSession,
    last_activity: Instant,
}

struct AppContext {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
    broadcaster: ChannelBroadcaster,
    config: FormationConfig,
}

/// In-memory state: formation sessions by ID. All mutations go through this one lock.
type AppState = Data<AppContext>;

/// Inactivity threshold: sessions not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// Cookie-session key holding the acting user's id.
const ACTOR_KEY: &str = "user_id";

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateSessionBody {
    game: GameInfo,
    #[serde(default)]
    participants: Vec<Participant>,
}

#[derive(Deserialize)]
struct MeBody {
    user_id: UserId,
}

#[derive(Deserialize)]
struct StrategyBody {
    strategy: Strategy,
}

#[derive(Deserialize)]
struct CandidateBody {
    candidate: UserId,
}

#[derive(Deserialize)]
struct DraftMethodBody {
    method: DraftMethod,
}

#[derive(Deserialize)]
struct BidBody {
    amount: u32,
}

#[derive(Deserialize)]
struct ChoiceBody {
    hand: RpsHand,
}

#[derive(Deserialize)]
struct MatchWinnerBody {
    match_id: MatchId,
    side: Side,
}

/// Path segment: session id (e.g. /api/sessions/{id})
#[derive(Deserialize)]
struct SessionPath {
    id: SessionId,
}

/// Path segments: session id and user id (e.g. /api/sessions/{id}/participants/{user_id})
#[derive(Deserialize)]
struct SessionUserPath {
    id: SessionId,
    user_id: UserId,
}

/// Path segments: session id and match id.
#[derive(Deserialize)]
struct SessionMatchPath {
    id: SessionId,
    match_id: MatchId,
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No session" }))
}

fn error_response(e: &FormationError) -> HttpResponse {
    let kind = if e.is_state_error() { "state" } else { "validation" };
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string(), "kind": kind }))
}

fn actor(session: &Session) -> Option<UserId> {
    session.get::<UserId>(ACTOR_KEY).ok().flatten()
}

/// Run `f` against one session under the write lock, publish whatever it emitted, and
/// answer with the updated session.
fn with_session<F>(state: &AppState, id: SessionId, f: F) -> HttpResponse
where
    F: FnOnce(&mut FormationSession) -> Result<(), FormationError>,
{
    let mut g = match state.sessions.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let s = &mut entry.session;
    let result = f(s);
    state.broadcaster.publish(s.id, s.drain_events());
    match result {
        Ok(()) => HttpResponse::Ok().json(&*s),
        Err(e) => error_response(&e),
    }
}

/// Apply an action on behalf of the cookie-session user.
fn act(state: &AppState, id: SessionId, who: &Session, action: Action) -> HttpResponse {
    let actor = actor(who);
    with_session(state, id, |s| {
        apply_action(s, actor, action, &mut rand::thread_rng())
    })
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "naejeon-web",
    })
}

/// Empty favicon so browsers stop asking.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Remember who is acting from this browser (identity is supplied by the surrounding app).
#[put("/api/me")]
async fn api_set_me(who: Session, body: Json<MeBody>) -> HttpResponse {
    match who.insert(ACTOR_KEY, body.user_id) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "user_id": body.user_id })),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Create a session for a game (returns it with id; client stores id for subsequent requests).
#[post("/api/sessions")]
async fn api_create_session(state: AppState, body: Json<CreateSessionBody>) -> HttpResponse {
    let body = body.into_inner();
    let mut session = FormationSession::with_config(body.game, Vec::new(), state.config);
    for p in body.participants {
        if let Err(e) = session.add_participant(p) {
            return error_response(&e);
        }
    }
    let id = session.id;
    log::info!("Created session {} for game {}", id, session.game.id);
    let mut g = match state.sessions.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let response = HttpResponse::Ok().json(&session);
    g.insert(
        id,
        SessionEntry {
            session,
            last_activity: Instant::now(),
        },
    );
    response
}

/// Get a session by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/sessions/{id}")]
async fn api_get_session(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.id, |_| Ok(()))
}

/// Final outcome, once the session has completed.
#[get("/api/sessions/{id}/result")]
async fn api_get_result(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    let g = match state.sessions.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get(&path.id).map(|e| &e.session) {
        Some(s) if s.state == FormationState::Completed => HttpResponse::Ok().json(&s.outcome),
        Some(_) => HttpResponse::NotFound().json(serde_json::json!({ "error": "Not completed" })),
        None => not_found(),
    }
}

/// Add a participant (StrategySelection only).
#[post("/api/sessions/{id}/participants")]
async fn api_add_participant(state: AppState, path: Path<SessionPath>, body: Json<Participant>) -> HttpResponse {
    let participant = body.into_inner();
    with_session(&state, path.id, |s| s.add_participant(participant))
}

/// Remove a participant by user id (StrategySelection only).
#[delete("/api/sessions/{id}/participants/{user_id}")]
async fn api_remove_participant(state: AppState, path: Path<SessionUserPath>) -> HttpResponse {
    with_session(&state, path.id, |s| s.remove_participant(path.user_id))
}

/// Import a roster CSV (StrategySelection only). All rows or none are added.
#[post("/api/sessions/{id}/participants/csv")]
async fn api_import_csv(state: AppState, path: Path<SessionPath>, body: String) -> HttpResponse {
    with_session(&state, path.id, |s| {
        let added = s.import_participants_csv(body.as_bytes())?;
        log::info!("Imported {} participant(s) into session {}", added, s.id);
        Ok(())
    })
}

#[post("/api/sessions/{id}/strategy")]
async fn api_select_strategy(
    state: AppState,
    who: Session,
    path: Path<SessionPath>,
    body: Json<StrategyBody>,
) -> HttpResponse {
    act(&state, path.id, &who, Action::SelectStrategy { strategy: body.strategy })
}

#[post("/api/sessions/{id}/election/self-nominate")]
async fn api_self_nominate(state: AppState, who: Session, path: Path<SessionPath>) -> HttpResponse {
    act(&state, path.id, &who, Action::SelfNominate)
}

#[post("/api/sessions/{id}/election/nominate")]
async fn api_nominate(
    state: AppState,
    who: Session,
    path: Path<SessionPath>,
    body: Json<CandidateBody>,
) -> HttpResponse {
    act(&state, path.id, &who, Action::Nominate { candidate: body.candidate })
}

/// Host only: skip the election and pick captains at random.
#[post("/api/sessions/{id}/election/random")]
async fn api_random_captains(state: AppState, who: Session, path: Path<SessionPath>) -> HttpResponse {
    act(&state, path.id, &who, Action::PickRandomCaptains)
}

#[post("/api/sessions/{id}/election/end-nomination")]
async fn api_end_nomination(state: AppState, who: Session, path: Path<SessionPath>) -> HttpResponse {
    act(&state, path.id, &who, Action::EndNomination)
}

#[post("/api/sessions/{id}/election/vote")]
async fn api_vote(
    state: AppState,
    who: Session,
    path: Path<SessionPath>,
    body: Json<CandidateBody>,
) -> HttpResponse {
    act(&state, path.id, &who, Action::Vote { candidate: body.candidate })
}

#[post("/api/sessions/{id}/election/end-voting")]
async fn api_end_voting(state: AppState, who: Session, path: Path<SessionPath>) -> HttpResponse {
    act(&state, path.id, &who, Action::EndVoting)
}

#[post("/api/sessions/{id}/draft-method")]
async fn api_select_draft_method(
    state: AppState,
    who: Session,
    path: Path<SessionPath>,
    body: Json<DraftMethodBody>,
) -> HttpResponse {
    act(&state, path.id, &who, Action::SelectDraftMethod { method: body.method })
}

#[post("/api/sessions/{id}/auction/bids")]
async fn api_place_bid(
    state: AppState,
    who: Session,
    path: Path<SessionPath>,
    body: Json<BidBody>,
) -> HttpResponse {
    act(&state, path.id, &who, Action::PlaceBid { amount: body.amount })
}

#[post("/api/sessions/{id}/rps/choice")]
async fn api_rps_choice(
    state: AppState,
    who: Session,
    path: Path<SessionPath>,
    body: Json<ChoiceBody>,
) -> HttpResponse {
    act(&state, path.id, &who, Action::ChooseHand { hand: body.hand })
}

#[post("/api/sessions/{id}/bracket/matches/{match_id}/start")]
async fn api_start_match(state: AppState, who: Session, path: Path<SessionMatchPath>) -> HttpResponse {
    act(&state, path.id, &who, Action::StartMatch { match_id: path.match_id })
}

/// Set winner for one bracket match.
#[put("/api/sessions/{id}/bracket/winner")]
async fn api_pick_winner(
    state: AppState,
    who: Session,
    path: Path<SessionPath>,
    body: Json<MatchWinnerBody>,
) -> HttpResponse {
    act(
        &state,
        path.id,
        &who,
        Action::PickMatchWinner {
            match_id: body.match_id,
            side: body.side,
        },
    )
}

/// Restart formation: back to strategy selection with the same roster.
#[post("/api/sessions/{id}/restart")]
async fn api_restart(state: AppState, who: Session, path: Path<SessionPath>) -> HttpResponse {
    act(&state, path.id, &who, Action::Restart)
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
    let config = FormationConfig::from_env();
    log::info!("Starting server at http://{}:{} with {:?}", bind.0, bind.1, config);

    let state = Data::new(AppContext {
        sessions: RwLock::new(HashMap::new()),
        broadcaster: ChannelBroadcaster::new(256),
        config,
    });

    // Event log: stands in for a live transport until clients subscribe.
    let mut events = state.broadcaster.subscribe();
    actix_web::rt::spawn(async move {
        use tokio::sync::broadcast::error::RecvError;
        loop {
            match events.recv().await {
                Ok(ev) => log::debug!(
                    "event {}",
                    serde_json::to_string(&ev).unwrap_or_else(|_| format!("{:?}", ev))
                ),
                Err(RecvError::Lagged(n)) => log::warn!("Event log skipped {} event(s)", n),
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Clock: every second, advance timers of every session with a running countdown.
    let state_clock = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            let mut g = match state_clock.sessions.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let mut rng = rand::thread_rng();
            for entry in g.values_mut() {
                let s = &mut entry.session;
                if !matches!(
                    s.state,
                    FormationState::ElectionResults
                        | FormationState::Auction
                        | FormationState::RockPaperScissors
                ) {
                    continue;
                }
                if let Err(e) = tick(s, 1, &mut rng) {
                    log::warn!("Session {}: clock error: {}", s.id, e);
                }
                state_clock.broadcaster.publish(s.id, s.drain_events());
            }
        }
    });

    // Background task: every 30 minutes, remove sessions inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.sessions.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive session(s) (no activity for 12h)", removed);
            }
        }
    });

    let key = Key::generate();
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_set_me)
            .service(api_create_session)
            .service(api_get_session)
            .service(api_get_result)
            .service(api_import_csv)
            .service(api_add_participant)
            .service(api_remove_participant)
            .service(api_select_strategy)
            .service(api_self_nominate)
            .service(api_nominate)
            .service(api_random_captains)
            .service(api_end_nomination)
            .service(api_vote)
            .service(api_end_voting)
            .service(api_select_draft_method)
            .service(api_place_bid)
            .service(api_rps_choice)
            .service(api_start_match)
            .service(api_pick_winner)
            .service(api_restart)
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
