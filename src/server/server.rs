use anyhow::Result;
use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use tracing::error;

use crate::store::UserStore;
use crate::user::{Library, LibraryError, NewUser, Profile, SessionToken, VideoDetails};

use axum_extra::extract::cookie::{Cookie, SameSite};
use tower_http::services::ServeDir;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, response, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::session::{Session, COOKIE_SESSION_TOKEN_KEY};
use super::upload::{upload_audio, UPLOADS_ROUTE_PREFIX};
use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct OkResponse {
    ok: bool,
}

impl OkResponse {
    fn ok() -> OkResponse {
        OkResponse { ok: true }
    }
}

impl IntoResponse for LibraryError {
    fn into_response(self) -> Response {
        let status = match &self {
            LibraryError::Validation(_) => StatusCode::BAD_REQUEST,
            LibraryError::Conflict(_) => StatusCode::CONFLICT,
            LibraryError::Auth => StatusCode::UNAUTHORIZED,
            LibraryError::NotFound(_) => StatusCode::NOT_FOUND,
            LibraryError::Io(err) => {
                // The only class worth operator attention; the caller just
                // gets a terse 500.
                error!("Store failure: {:#}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

// Absent fields deserialize to empty strings and fail validation with 400,
// matching how the original service treated partial bodies.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase", default)]
struct RegisterBody {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
}

impl Default for RegisterBody {
    fn default() -> Self {
        RegisterBody {
            username: String::new(),
            password: String::new(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            image_url: String::new(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct LoginBody {
    pub username: String,
    pub password: String,
}

impl Default for LoginBody {
    fn default() -> Self {
        LoginBody {
            username: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    ok: bool,
    user: Profile,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct CreatePlaylistBody {
    pub name: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct AddVideoBody {
    pub video_id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub channel_title: Option<String>,
    pub views: Option<String>,
    pub duration: Option<String>,
}

#[derive(Serialize)]
struct AddVideoResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    already: Option<bool>,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

async fn register(
    State(library): State<GuardedLibrary>,
    Json(body): Json<RegisterBody>,
) -> Response {
    let new_user = NewUser {
        username: body.username,
        password: body.password,
        email: body.email,
        first_name: body.first_name,
        last_name: body.last_name,
        image_url: body.image_url,
    };
    match library.lock().unwrap().register(new_user) {
        Ok(()) => Json(OkResponse::ok()).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn login(State(library): State<GuardedLibrary>, Json(body): Json<LoginBody>) -> Response {
    let login_result = library.lock().unwrap().login(&body.username, &body.password);
    match login_result {
        Ok((token, profile)) => {
            let response_body = LoginSuccessResponse {
                ok: true,
                user: profile,
            };
            let response_body = serde_json::to_string(&response_body).unwrap();

            let cookie_value = HeaderValue::from_str(&format!(
                "{}={}; Path=/; HttpOnly",
                COOKIE_SESSION_TOKEN_KEY, token.0
            ))
            .unwrap();
            response::Builder::new()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::SET_COOKIE, cookie_value)
                .body(Body::from(response_body))
                .unwrap()
        }
        Err(err) => err.into_response(),
    }
}

async fn logout(State(library): State<GuardedLibrary>, session: Option<Session>) -> Response {
    if let Some(session) = session {
        library
            .lock()
            .unwrap()
            .logout(&SessionToken(session.token));
    }

    let cookie_value = Cookie::build(Cookie::new(COOKIE_SESSION_TOKEN_KEY, ""))
        .path("/")
        .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1)) // Expire it in the past
        .same_site(SameSite::Lax)
        .build();

    response::Builder::new()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::SET_COOKIE, cookie_value.to_string())
        .body(Body::from(serde_json::to_string(&OkResponse::ok()).unwrap()))
        .unwrap()
}

async fn me(session: Session, State(library): State<GuardedLibrary>) -> Response {
    match library.lock().unwrap().profile(&session.username) {
        Ok(profile) => Json(profile).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_playlists(session: Session, State(library): State<GuardedLibrary>) -> Response {
    match library.lock().unwrap().playlists(&session.username) {
        Ok(playlists) => Json(playlists).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn post_playlist(
    session: Session,
    State(library): State<GuardedLibrary>,
    Json(body): Json<CreatePlaylistBody>,
) -> Response {
    match library
        .lock()
        .unwrap()
        .create_playlist(&session.username, &body.name)
    {
        Ok(playlist) => Json(playlist).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn delete_playlist(
    session: Session,
    State(library): State<GuardedLibrary>,
    Path(id): Path<String>,
) -> Response {
    match library
        .lock()
        .unwrap()
        .delete_playlist(&session.username, &id)
    {
        Ok(()) => Json(OkResponse::ok()).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn post_playlist_video(
    session: Session,
    State(library): State<GuardedLibrary>,
    Path(id): Path<String>,
    Json(body): Json<AddVideoBody>,
) -> Response {
    let video = VideoDetails {
        video_id: body.video_id,
        title: body.title,
        thumbnail: body.thumbnail,
        channel_title: body.channel_title,
        views: body.views,
        duration: body.duration,
    };
    match library
        .lock()
        .unwrap()
        .add_video(&session.username, &id, video)
    {
        Ok(outcome) => Json(AddVideoResponse {
            ok: true,
            already: outcome.already.then_some(true),
        })
        .into_response(),
        Err(err) => err.into_response(),
    }
}

async fn delete_playlist_video(
    session: Session,
    State(library): State<GuardedLibrary>,
    Path((id, video_id)): Path<(String, String)>,
) -> Response {
    match library
        .lock()
        .unwrap()
        .remove_video(&session.username, &id, &video_id)
    {
        Ok(()) => Json(OkResponse::ok()).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn make_app(config: ServerConfig, store: Arc<dyn UserStore>) -> Result<Router> {
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        library: Arc::new(Mutex::new(Library::new(store))),
        hash: env!("GIT_HASH").to_string(),
    };

    let account_routes: Router = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(state.clone());

    let playlist_routes: Router = Router::new()
        .route("/playlists", get(get_playlists).post(post_playlist))
        .route("/playlists/{id}", delete(delete_playlist))
        .route("/playlists/{id}/videos", post(post_playlist_video))
        .route(
            "/playlists/{id}/videos/{video_id}",
            delete(delete_playlist_video),
        )
        .with_state(state.clone());

    let upload_routes: Router = Router::new()
        .route("/playlists/{id}/mp3", post(upload_audio))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state.clone());

    let home_router: Router = match &config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let mut app: Router = home_router
        .nest(
            "/api",
            account_routes.merge(playlist_routes).merge(upload_routes),
        )
        .nest_service(UPLOADS_ROUTE_PREFIX, ServeDir::new(&config.uploads_dir));

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(config: ServerConfig, store: Arc<dyn UserStore>) -> Result<()> {
    let port = config.port;
    let app = make_app(config, store)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
