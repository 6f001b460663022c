//! `GET /web/osu-osz2-getscores.php`, the in-game leaderboard endpoint.

use actix_web::http::header::ContentType;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::{GameMode, LeaderboardScope};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos::Requester;
use crate::services::LeaderboardRequest;
use crate::state::app_state::AppState;

/// Scoreboard protocol version the client is expected to speak.
const SUPPORTED_VERSION: i32 = 4;

#[derive(Debug, Default, Deserialize)]
struct GetScoresArgs {
    c: Option<String>,
    f: Option<String>,
    i: Option<String>,
    m: Option<String>,
    us: Option<String>,
    ha: Option<String>,
    v: Option<String>,
    vv: Option<String>,
    mods: Option<String>,
}

/// Parsed client arguments, before authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreArgs {
    pub map_hash: String,
    pub file_name: String,
    pub set_id: i64,
    pub mode: GameMode,
    pub username: String,
    pub password_md5: String,
    pub scope: LeaderboardScope,
    pub version: i32,
    pub mods: u32,
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .ok_or_else(|| AppError::invalid_arguments(format!("missing argument {name}")))
}

fn parsed<T: std::str::FromStr>(value: &Option<String>, name: &str) -> Result<T, AppError> {
    required(value, name)?
        .trim()
        .parse()
        .map_err(|_| AppError::invalid_arguments(format!("unparsable argument {name}")))
}

/// Parse the raw query string into [`ScoreArgs`].
pub fn parse_args(query: &str) -> Result<ScoreArgs, AppError> {
    let args = web::Query::<GetScoresArgs>::from_query(query)
        .map_err(|err| AppError::invalid_arguments(format!("bad query: {err}")))?
        .into_inner();

    let mode_id: i32 = parsed(&args.m, "m")?;
    let mode = GameMode::from_id(mode_id).ok_or_else(|| {
        AppError::bad_request(ErrorCode::InvalidMode, format!("unknown mode {mode_id}"))
    })?;
    let scope_id: i32 = parsed(&args.v, "v")?;
    let scope = LeaderboardScope::from_client_id(scope_id).ok_or_else(|| {
        AppError::bad_request(ErrorCode::InvalidScope, format!("unknown scope {scope_id}"))
    })?;

    Ok(ScoreArgs {
        map_hash: required(&args.c, "c")?.to_string(),
        file_name: required(&args.f, "f")?.to_string(),
        set_id: parsed(&args.i, "i")?,
        mode,
        username: required(&args.us, "us")?.to_string(),
        password_md5: required(&args.ha, "ha")?.to_string(),
        scope,
        version: parsed(&args.vv, "vv")?,
        mods: parsed(&args.mods, "mods")?,
    })
}

async fn authenticate(app_state: &AppState, args: &ScoreArgs) -> Result<Requester, AppError> {
    let Some(requester) = app_state.users.find_by_username(&args.username).await? else {
        return Err(AppError::unauthorized(format!("unknown user {}", args.username)));
    };
    if !app_state
        .users
        .verify_password(requester.user_id, &args.password_md5)
        .await?
    {
        return Err(AppError::unauthorized(format!(
            "wrong password for user {}",
            requester.user_id
        )));
    }
    if requester.is_banned() {
        return Err(AppError::banned(format!("user {} is restricted", requester.user_id)));
    }
    Ok(requester)
}

async fn get_scores(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let args = parse_args(req.query_string())?;
    let requester = authenticate(&app_state, &args).await?;

    if args.version != SUPPORTED_VERSION {
        warn!(
            user_id = requester.user_id,
            version = args.version,
            "client scoreboard version mismatch"
        );
    }

    let request = LeaderboardRequest {
        map_hash: args.map_hash,
        set_id: args.set_id,
        file_name: args.file_name,
        mode: args.mode,
        mods: args.mods,
        scope: args.scope,
        requester,
    };
    let rendered = app_state.engine.leaderboard(&request).await?;
    info!(
        user_id = request.requester.user_id,
        page_source = ?rendered.page_source,
        "scores served"
    );

    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(rendered.body))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/web/osu-osz2-getscores.php").route(web::get().to(get_scores)));
}
