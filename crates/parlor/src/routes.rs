//! HTTP + SSE route handlers: the transport adapter over the session core.
//!
//! Each handler is deliberately thin: resolve the session by code, forward
//! one operation to its actor, translate the result. The host secret
//! travels in request bodies for the mutating calls and as a query
//! parameter only for the host stream (`EventSource` cannot send headers
//! or a body).
//!
//! The two stream handlers bridge a fan-out channel into an SSE response.
//! Dropping the response stream (client closed the tab, network died) is
//! the disconnect signal: a guard in the stream fires the unsubscribe so
//! the session's channel sets shrink promptly instead of waiting for the
//! next failed send.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use parlor_protocol::{
    AssignRolesRequest, AssignRolesResponse, CreateSessionResponse,
    HostStreamQuery, JoinRequest, JoinResponse, OkResponse, PlayerId,
    PlayerStreamQuery, SetAliveRequest, SetRoleRequest, StreamEvent,
};
use parlor_session::{ChannelId, SessionHandle};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ServerError;
use crate::server::AppState;

/// Request bodies above this size are rejected outright. Nothing on this
/// API legitimately sends more than a name and a list of role labels.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Builds the API router over a shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{code}/join", post(join_session))
        .route("/api/sessions/{code}/roles", post(assign_roles))
        .route("/api/sessions/{code}/players/{player_id}/role", post(set_role))
        .route("/api/sessions/{code}/players/{player_id}/alive", post(set_alive))
        .route("/api/sessions/{code}/stream", get(player_stream))
        .route("/api/sessions/{code}/host-stream", get(host_stream))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Resolves a raw code to a live session handle. The registry lock is
/// released before the caller awaits anything on the actor.
async fn resolve(
    state: &Arc<AppState>,
    code: &str,
) -> Result<SessionHandle, ServerError> {
    Ok(state.registry.lock().await.lookup(code)?)
}

// ---------------------------------------------------------------------------
// Request/response handlers
// ---------------------------------------------------------------------------

/// `POST /api/sessions`
async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let created = state.registry.lock().await.create();
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            code: created.code,
            host_secret: created.host_secret,
        }),
    )
}

/// `POST /api/sessions/{code}/join`
async fn join_session(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(req): Json<JoinRequest>,
) -> Result<(StatusCode, Json<JoinResponse>), ServerError> {
    let session = resolve(&state, &code).await?;
    let player = session.join(&req.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(JoinResponse {
            code: session.code().clone(),
            player_id: player.id,
            name: player.name,
        }),
    ))
}

/// `POST /api/sessions/{code}/roles`, the bulk random assignment.
async fn assign_roles(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(req): Json<AssignRolesRequest>,
) -> Result<Json<AssignRolesResponse>, ServerError> {
    let session = resolve(&state, &code).await?;
    let assigned = session.assign_roles(&req.host_secret, req.roles).await?;
    Ok(Json(AssignRolesResponse { assigned }))
}

/// `POST /api/sessions/{code}/players/{player_id}/role`
async fn set_role(
    State(state): State<Arc<AppState>>,
    Path((code, player_id)): Path<(String, PlayerId)>,
    Json(req): Json<SetRoleRequest>,
) -> Result<Json<OkResponse>, ServerError> {
    let session = resolve(&state, &code).await?;
    session.set_role(&req.host_secret, player_id, req.role).await?;
    Ok(Json(OkResponse::ok()))
}

/// `POST /api/sessions/{code}/players/{player_id}/alive`
async fn set_alive(
    State(state): State<Arc<AppState>>,
    Path((code, player_id)): Path<(String, PlayerId)>,
    Json(req): Json<SetAliveRequest>,
) -> Result<Json<OkResponse>, ServerError> {
    let session = resolve(&state, &code).await?;
    session.set_alive(&req.host_secret, player_id, req.alive).await?;
    Ok(Json(OkResponse::ok()))
}

// ---------------------------------------------------------------------------
// Stream handlers
// ---------------------------------------------------------------------------

type EventStream = axum::response::sse::KeepAliveStream<BoxStream<'static, Result<Event, axum::Error>>>;

/// `GET /api/sessions/{code}/stream?playerId=...`
///
/// Opens even for an id the roster does not know; the initial snapshot
/// is then the missing marker, which the client renders as a terminal
/// "rejoin" state.
async fn player_stream(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(query): Query<PlayerStreamQuery>,
) -> Result<Sse<EventStream>, ServerError> {
    let session = resolve(&state, &code).await?;
    let (tx, rx) = mpsc::unbounded_channel();
    let channel = session.subscribe_player(query.player_id.clone(), tx).await?;
    let guard = StreamGuard::player(session, query.player_id, channel);
    Ok(sse_response(rx, guard))
}

/// `GET /api/sessions/{code}/host-stream?hostSecret=...`
async fn host_stream(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(query): Query<HostStreamQuery>,
) -> Result<Sse<EventStream>, ServerError> {
    let session = resolve(&state, &code).await?;
    let (tx, rx) = mpsc::unbounded_channel();
    let channel = session.subscribe_host(&query.host_secret, tx).await?;
    let guard = StreamGuard::host(session, channel);
    Ok(sse_response(rx, guard))
}

/// Turns a fan-out receiver into an SSE response. The guard rides along
/// inside the stream state so it drops, and unsubscribes, exactly when
/// the client disconnects.
fn sse_response(rx: UnboundedReceiver<StreamEvent>, guard: StreamGuard) -> Sse<EventStream> {
    let stream = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        rx.recv()
            .await
            .map(|event| (encode_event(&event), (rx, guard)))
    })
    .boxed();

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Encodes one fan-out event as an SSE frame: the event name plus a JSON
/// data payload.
fn encode_event(event: &StreamEvent) -> Result<Event, axum::Error> {
    Event::default().event(event.name()).json_data(event.payload())
}

/// Scope of one live stream, for disconnect cleanup.
#[derive(Clone)]
enum StreamScope {
    Host,
    Player(PlayerId),
}

/// Drop guard that unsubscribes a stream's channel when the response
/// stream is dropped. `Drop` is synchronous, so the actual unsubscribe is
/// a fire-and-forget task.
struct StreamGuard {
    session: SessionHandle,
    scope: StreamScope,
    channel: ChannelId,
}

impl StreamGuard {
    fn host(session: SessionHandle, channel: ChannelId) -> Self {
        Self {
            session,
            scope: StreamScope::Host,
            channel,
        }
    }

    fn player(session: SessionHandle, player_id: PlayerId, channel: ChannelId) -> Self {
        Self {
            session,
            scope: StreamScope::Player(player_id),
            channel,
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        let session = self.session.clone();
        let scope = self.scope.clone();
        let channel = self.channel;
        tracing::debug!(code = %session.code(), %channel, "stream closed");
        tokio::spawn(async move {
            match scope {
                StreamScope::Host => session.unsubscribe_host(channel).await,
                StreamScope::Player(player_id) => {
                    session.unsubscribe_player(player_id, channel).await
                }
            }
        });
    }
}
