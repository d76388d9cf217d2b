//! Log-out route handler that announces the sign out and hands over to the identity proxy.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    auth::{AuthConfig, AuthEvent, AuthEvents, AuthState, Session},
};

/// The state needed for [get_log_out].
#[derive(Debug, Clone)]
pub struct LogOutState {
    pub auth_config: AuthConfig,
    pub auth_events: AuthEvents,
}

impl FromRef<AppState> for LogOutState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            auth_config: state.auth_config.clone(),
            auth_events: state.auth_events.clone(),
        }
    }
}

/// Publish a signed out event for the current user and redirect to the
/// identity proxy's sign out URL, which ends the proxy session.
pub async fn get_log_out(State(state): State<LogOutState>, session: Session) -> Response {
    if let Some(user) = session.user() {
        tracing::info!("User {} signed out", user.id);
        state.auth_events.publish(AuthEvent {
            user_id: user.id,
            state: AuthState::SignedOut,
        });
    }

    Redirect::to(&state.auth_config.sign_out_url).into_response()
}
