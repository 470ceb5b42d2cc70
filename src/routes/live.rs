// src/routes/live.rs
//
// WebSocket live queries. Each push is the full current snapshot of the
// caller's scope. The socket is closed as soon as that scope no longer
// holds (signed out, role changed); clients resubscribe with a fresh token.

use std::borrow::Cow;

use axum::{
    async_trait,
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        FromRequestParts, State,
    },
    http::{request::Parts, StatusCode},
    response::Response,
};

use crate::auth::{bearer_token, session_for_token};
use crate::core::access::LogScope;
use crate::errors::ApiError;
use crate::models::Session;
use crate::AppState;

pub const CLOSE_SIGNED_OUT: u16 = 4401;
pub const CLOSE_SCOPE_CHANGED: u16 = 4403;
const CLOSE_INTERNAL: u16 = 1011;

/// Session for a socket upgrade. Browsers cannot set headers on a WebSocket
/// handshake, so `?token=` is accepted here and nowhere else.
pub struct SocketSession(pub Session);

fn query_token(parts: &Parts) -> Option<String> {
    parts.uri.query()?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == "token" && !v.is_empty()).then(|| v.to_string())
    })
}

#[async_trait]
impl FromRequestParts<AppState> for SocketSession {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| query_token(parts))
            .ok_or(ApiError::Unauthenticated)?;
        Ok(SocketSession(session_for_token(state.store.as_ref(), &token).await?))
    }
}

#[derive(Debug, Clone, Copy)]
enum Collection {
    ShiftLogs,
    Sops,
}

// GET /api/v1/live/shift-logs?token=
pub async fn shift_logs_live(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    SocketSession(session): SocketSession,
) -> Response {
    ws.on_upgrade(move |socket| run(socket, state, session, Collection::ShiftLogs))
}

// GET /api/v1/live/sops?token=
pub async fn sops_live(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    SocketSession(session): SocketSession,
) -> Response {
    ws.on_upgrade(move |socket| run(socket, state, session, Collection::Sops))
}

async fn snapshot(state: &AppState, session: &Session, collection: Collection) -> Result<String, ApiError> {
    let json = match collection {
        Collection::ShiftLogs => {
            let logs = state.store.list_logs(LogScope::for_session(session)).await?;
            serde_json::to_string(&logs)
        }
        Collection::Sops => serde_json::to_string(&state.store.list_sops().await?),
    };
    json.map_err(|e| ApiError::Store(e.to_string()))
}

async fn close(socket: &mut WebSocket, code: u16, reason: &'static str) {
    let frame = CloseFrame { code, reason: Cow::Borrowed(reason) };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        tracing::debug!(error = %e, "close frame not delivered");
    }
}

async fn run(mut socket: WebSocket, state: AppState, session: Session, collection: Collection) {
    let mut changes = state.feed.subscribe();
    let scope = LogScope::for_session(&session);
    tracing::debug!(uid = %session.identity.uid, ?collection, "live subscription opened");

    loop {
        changes.borrow_and_update();
        match snapshot(&state, &session, collection).await {
            Ok(body) => {
                if socket.send(Message::Text(body)).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, ?collection, "live snapshot failed");
                let code = match e {
                    ApiError::PermissionDenied => CLOSE_SCOPE_CHANGED,
                    _ => CLOSE_INTERNAL,
                };
                close(&mut socket, code, "snapshot failed").await;
                break;
            }
        }

        let changed = 'wait: loop {
            tokio::select! {
                res = changes.changed() => break 'wait res.is_ok(),
                msg = socket.recv() => match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break 'wait false,
                    Some(Ok(_)) => {}
                },
            }
        };
        if !changed {
            break;
        }

        match state.store.find_session(&session.token).await {
            Ok(Some(current)) if LogScope::for_session(&current) == scope => {}
            Ok(Some(_)) => {
                close(&mut socket, CLOSE_SCOPE_CHANGED, "permission scope changed").await;
                break;
            }
            Ok(None) => {
                close(&mut socket, CLOSE_SIGNED_OUT, "signed out").await;
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "session re-check failed");
                close(&mut socket, CLOSE_INTERNAL, "session check failed").await;
                break;
            }
        }
    }

    tracing::debug!(uid = %session.identity.uid, ?collection, "live subscription closed");
}
