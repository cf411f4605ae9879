use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::admin::AdminState;
use crate::session::{LoginAttemptRecord, Session};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub target: String,
    pub active_sessions: usize,
    pub locked_accounts: usize,
}

#[derive(Serialize)]
pub struct LockoutSummary {
    pub max_login_attempts: u32,
    pub records: Vec<LoginAttemptRecord>,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let locked = state
        .dispatcher
        .attempts()
        .snapshot()
        .iter()
        .filter(|r| r.is_locked())
        .count();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        target: state.dispatcher.site().host.clone(),
        active_sessions: state.dispatcher.sessions().len(),
        locked_accounts: locked,
    })
}

pub async fn get_sessions(State(state): State<AdminState>) -> Json<Vec<Session>> {
    let mut sessions = state.dispatcher.sessions().snapshot();
    sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Json(sessions)
}

pub async fn delete_session(State(state): State<AdminState>, Path(id): Path<String>) -> StatusCode {
    match state.dispatcher.sessions().delete(&id) {
        Some(session) => {
            tracing::info!(user = %session.user, "Session revoked via admin API");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

pub async fn get_lockouts(State(state): State<AdminState>) -> Json<LockoutSummary> {
    let attempts = state.dispatcher.attempts();
    let mut records = attempts.snapshot();
    records.sort_by(|a, b| a.identity.cmp(&b.identity));
    Json(LockoutSummary {
        max_login_attempts: attempts.max_attempts(),
        records,
    })
}

pub async fn reset_lockout(State(state): State<AdminState>, Path(user): Path<String>) -> StatusCode {
    state.dispatcher.attempts().record_success(&user);
    tracing::info!(user = %user, "Login attempts reset via admin API");
    StatusCode::NO_CONTENT
}
