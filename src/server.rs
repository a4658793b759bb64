use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Request, State},
    http::{HeaderName, StatusCode, header},
    middleware::Next,
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post, put},
};
use axum_extra::extract::cookie::CookieJar;
use futures::{Stream, StreamExt, stream};
use serde::{Deserialize, Serialize};
use tokio::signal::unix::{SignalKind, signal};
use tokio_stream::wrappers::WatchStream;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::auth::Viewer;
use crate::chat::{ChatPhase, Message, Submission};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::session::{PageSession, viewer_offset_from_minutes};
use crate::ui::{self, Fragment, PageView};
use crate::upload::{CandidateFile, FileDescriptor, UploadOutcome, UploadState};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let state = AppState::from_config(Arc::clone(&config))?;

    let sweeper = state.sessions.spawn_sweeper(
        config.session.sweep_interval(),
        config.session.idle_timeout(),
    );

    let sessions = state.sessions.clone();
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        sink_enabled = config.upload.sink_enabled,
        sink_url = %config.upload.sink_url,
        reply_overlap = config.chat.reply_overlap.as_str(),
        "Server started"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            sweeper.abort();
            let disposed = sessions.dispose_all().await;
            info!(disposed, "Shutting down, page sessions disposed");
        })
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let (Ok(mut sigterm), Ok(mut sigint)) = (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) else {
        tracing::warn!("Failed to install signal handlers, falling back to Ctrl+C");
        let _ = tokio::signal::ctrl_c().await;
        return;
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
        _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
    }
}

/// Room for multipart boundaries and part headers above the file size limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the application router.
///
/// Every route except the event stream runs under the request timeout.
pub fn build_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    let timeout_duration = config.server.request_timeout();

    let api = Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/sessions", post(api_create_session))
        .route(
            "/api/sessions/{id}",
            get(api_get_session).delete(api_delete_session),
        )
        .route("/api/sessions/{id}/draft", put(api_set_draft))
        .route("/api/sessions/{id}/messages", post(api_submit_message))
        .route("/api/sessions/{id}/upload", post(api_pick_file))
        .route("/api/sessions/{id}/drop", post(api_drop_files))
        .route("/api/sessions/{id}/drag", post(api_drag))
        .route("/api/sessions/{id}/viewer", put(api_set_viewer))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(timeout_duration, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => AppError::Timeout.into_response(),
                }
            },
        ));

    Router::new()
        .merge(api)
        .route("/api/sessions/{id}/events", get(api_session_events))
        .nest_service("/static", ServeDir::new(&config.server.static_dir))
        .layer(DefaultBodyLimit::max(
            config.upload.max_file_size + MULTIPART_OVERHEAD,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn find_session(state: &AppState, id: &str) -> AppResult<PageSession> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Render the page with a fresh page session.
async fn index_handler(State(state): State<AppState>, cookies: CookieJar) -> impl IntoResponse {
    let session = state.sessions.create(None).await;
    let viewer = Viewer::from_cookies(&cookies, &state.config.auth);

    let conversation = session.conversation().snapshot();
    let upload = session.upload().snapshot();
    let offset = session.viewer_offset();
    let html = ui::render_page(&PageView {
        session_id: session.id(),
        conversation: &conversation,
        upload: &upload,
        max_file_size: state.config.upload.max_file_size,
        offset: &offset,
        viewer,
        auth: &state.config.auth,
    });

    ([(header::CACHE_CONTROL, "no-store")], Html(html))
}

/// GET /health - Liveness plus live session count.
async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": state.sessions.len().await,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Session API
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for session creation.
#[derive(Debug, Default, Deserialize)]
struct CreateSessionRequest {
    /// Viewer's UTC offset in minutes east of UTC.
    #[serde(default)]
    tz_offset_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
struct SessionCreated {
    id: String,
    events_url: String,
}

/// POST /api/sessions - Create a page session.
async fn api_create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<SessionCreated>)> {
    let offset = req
        .tz_offset_minutes
        .map(|minutes| {
            viewer_offset_from_minutes(minutes)
                .ok_or_else(|| AppError::BadRequest(format!("invalid tz offset: {minutes}")))
        })
        .transpose()?;

    let session = state.sessions.create(offset).await;
    let id = session.id().to_string();
    Ok((
        StatusCode::CREATED,
        Json(SessionCreated {
            events_url: format!("/api/sessions/{id}/events"),
            id,
        }),
    ))
}

/// Conversation snapshot as JSON.
#[derive(Debug, Serialize)]
struct ConversationDto {
    messages: Vec<Message>,
    draft_input: String,
    can_send: bool,
    phase: ChatPhase,
    is_typing: bool,
    pending_replies: usize,
    loaded_document: Option<FileDescriptor>,
    questions_asked: usize,
    pdfs_loaded: usize,
    revision: u64,
}

#[derive(Debug, Serialize)]
struct SessionSnapshot {
    id: String,
    viewer_offset_minutes: i32,
    conversation: ConversationDto,
    upload: UploadState,
}

impl SessionSnapshot {
    fn capture(session: &PageSession) -> Self {
        let conversation = session.conversation().snapshot();
        Self {
            id: session.id().to_string(),
            viewer_offset_minutes: session.viewer_offset().local_minus_utc() / 60,
            conversation: ConversationDto {
                messages: conversation.messages().to_vec(),
                draft_input: conversation.draft_input().to_string(),
                can_send: conversation.can_send(),
                phase: conversation.phase(),
                is_typing: conversation.is_typing(),
                pending_replies: conversation.pending_replies(),
                loaded_document: conversation.loaded_document().cloned(),
                questions_asked: conversation.questions_asked(),
                pdfs_loaded: conversation.pdfs_loaded(),
                revision: conversation.revision(),
            },
            upload: (*session.upload().snapshot()).clone(),
        }
    }
}

/// GET /api/sessions/{id} - Current snapshots.
async fn api_get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<SessionSnapshot>> {
    let session = find_session(&state, &id).await?;
    Ok(Json(SessionSnapshot::capture(&session)))
}

/// DELETE /api/sessions/{id} - Dispose a page session.
async fn api_delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    match state.sessions.remove(&id).await {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AppError::SessionNotFound(id)),
    }
}

#[derive(Debug, Deserialize)]
struct ViewerRequest {
    tz_offset_minutes: i32,
}

/// PUT /api/sessions/{id}/viewer - Report the viewer's UTC offset.
async fn api_set_viewer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ViewerRequest>,
) -> AppResult<StatusCode> {
    let session = find_session(&state, &id).await?;
    let offset = viewer_offset_from_minutes(req.tz_offset_minutes).ok_or_else(|| {
        AppError::BadRequest(format!("invalid tz offset: {}", req.tz_offset_minutes))
    })?;
    session.set_viewer_offset(offset);
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DraftRequest {
    draft: String,
}

#[derive(Debug, Serialize)]
struct DraftResponse {
    can_send: bool,
}

/// PUT /api/sessions/{id}/draft - Replace the draft input.
async fn api_set_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DraftRequest>,
) -> AppResult<Json<DraftResponse>> {
    let session = find_session(&state, &id).await?;
    let conversation = session.conversation().set_draft(req.draft);
    Ok(Json(DraftResponse {
        can_send: conversation.can_send(),
    }))
}

/// Submission body. Without `message` the stored draft is submitted.
#[derive(Debug, Default, Deserialize)]
struct SubmitRequest {
    #[serde(default)]
    message: Option<String>,
}

/// Accepts the submission as JSON or as an urlencoded form.
struct SubmitBody(SubmitRequest);

impl<S> FromRequest<S> for SubmitBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let axum::Form(body) = axum::Form::<SubmitRequest>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(Self(body))
        } else {
            let Json(body) = Json::<SubmitRequest>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(Self(body))
        }
    }
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejected: Option<&'static str>,
}

/// POST /api/sessions/{id}/messages - Submit a chat message.
///
/// Blank submissions are not errors: the response reports `accepted: false`.
async fn api_submit_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    SubmitBody(req): SubmitBody,
) -> AppResult<Json<SubmitResponse>> {
    let session = find_session(&state, &id).await?;
    let chat = session.conversation();
    let outcome = match req.message {
        Some(text) => chat.submit_input(text),
        None => chat.submit(),
    };

    Ok(Json(match outcome {
        Submission::Accepted(message) => SubmitResponse {
            accepted: true,
            message: Some(message),
            rejected: None,
        },
        Submission::Rejected(reason) => SubmitResponse {
            accepted: false,
            message: None,
            rejected: Some(reason.as_str()),
        },
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Upload
// ─────────────────────────────────────────────────────────────────────────────

/// Collect every file part of a multipart body, in order.
async fn read_files(mut multipart: Multipart, limit: usize) -> AppResult<Vec<CandidateFile>> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(ToString::to_string);
        let bytes = field.bytes().await?;
        if bytes.len() > limit {
            return Err(AppError::FileTooLarge { name, limit });
        }
        files.push(CandidateFile::new(name, content_type.as_deref(), bytes));
    }
    Ok(files)
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<FileDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignored: Option<&'static str>,
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        match outcome {
            UploadOutcome::Accepted(file) => Self {
                accepted: true,
                file: Some(file),
                ignored: None,
            },
            UploadOutcome::Ignored(reason) => Self {
                accepted: false,
                file: None,
                ignored: Some(reason.as_str()),
            },
        }
    }
}

/// POST /api/sessions/{id}/upload - File picker selection.
async fn api_pick_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let session = find_session(&state, &id).await?;
    let files = read_files(multipart, state.config.upload.max_file_size).await?;
    let outcome = match files.into_iter().next() {
        Some(file) => session.upload().pick(file),
        None => UploadOutcome::Ignored(crate::upload::IgnoreReason::NoFile),
    };
    Ok(Json(outcome.into()))
}

/// POST /api/sessions/{id}/drop - Drag-and-drop. Only the first file counts.
async fn api_drop_files(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let session = find_session(&state, &id).await?;
    let files = match read_files(multipart, state.config.upload.max_file_size).await {
        Ok(files) => files,
        Err(e) => {
            // A failed drop still ends the drag.
            session.upload().drag_leave();
            return Err(e);
        }
    };
    Ok(Json(session.upload().drop_files(files).into()))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DragState {
    Over,
    Leave,
}

#[derive(Debug, Deserialize)]
struct DragRequest {
    state: DragState,
}

/// POST /api/sessions/{id}/drag - `dragover` / `dragleave`.
async fn api_drag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DragRequest>,
) -> AppResult<StatusCode> {
    let session = find_session(&state, &id).await?;
    match req.state {
        DragState::Over => session.upload().drag_over(),
        DragState::Leave => session.upload().drag_leave(),
    }
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Event Stream
// ─────────────────────────────────────────────────────────────────────────────

fn fragment_event(fragment: Fragment, html: &str) -> Result<Event, Infallible> {
    Ok(Event::default().event(fragment.event_name()).data(html))
}

/// Rendered fragments for every snapshot change, starting with the current
/// snapshots. Ends when the session is disposed.
fn session_event_stream(
    session: PageSession,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    let disposed = session.disposed();

    let conversation_events = {
        let session = session.clone();
        WatchStream::new(session.conversation().subscribe()).flat_map(move |snapshot| {
            let offset = session.viewer_offset();
            let events = ui::conversation_fragments(&snapshot, &offset)
                .map(|(fragment, html)| fragment_event(fragment, &html));
            stream::iter(events)
        })
    };

    let max_file_size = session.upload().max_file_size();
    let upload_events = WatchStream::new(session.upload().subscribe()).map(move |snapshot| {
        let (fragment, html) = ui::upload_fragment(&snapshot, max_file_size);
        fragment_event(fragment, &html)
    });

    // Held by the stream so the session stays alive while the tab listens.
    let guard = session.open_stream();
    stream::select(conversation_events, upload_events)
        .take_until(disposed)
        .map(move |event| {
            guard.touch();
            event
        })
}

/// GET /api/sessions/{id}/events - SSE stream of rendered fragments.
async fn api_session_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let session = find_session(&state, &id).await?;
    tracing::debug!(session_id = %session.id(), "Event stream opened");

    let sse = Sse::new(session_event_stream(session))
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)));

    Ok((
        [(HeaderName::from_static("x-accel-buffering"), "no")],
        sse,
    )
        .into_response())
}
