//! Streams the signed in user's auth state changes to the browser.

use std::{convert::Infallible, time::Duration};

use axum::{
    extract::{FromRef, State},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use tokio_stream::StreamExt;

use crate::{
    AppState, Error,
    auth::{AuthEvents, AuthState, Session},
};

/// The name of the server-sent event that carries an [AuthState].
pub const AUTH_STATE_EVENT: &str = "auth-state";

/// The state needed for [get_auth_events].
#[derive(Debug, Clone)]
pub struct AuthStreamState {
    pub auth_events: AuthEvents,
}

impl FromRef<AppState> for AuthStreamState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            auth_events: state.auth_events.clone(),
        }
    }
}

/// Stream the current user's auth states as server-sent events with JSON data.
///
/// Signed out requests get a 401 alert instead of a stream.
pub async fn get_auth_events(
    State(state): State<AuthStreamState>,
    session: Session,
) -> Response {
    let user_id = match session.require() {
        Ok(user) => user.id,
        Err(error) => return error.into_alert_response(),
    };

    let stream = state
        .auth_events
        .subscribe_user(user_id)
        .into_stream()
        .filter_map(move |event| match to_sse_event(&event.state) {
            Ok(sse_event) => Some(Ok::<_, Infallible>(sse_event)),
            Err(error) => {
                tracing::error!("could not serialize auth state for user {user_id}: {error}");
                None
            }
        });

    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("keep-alive"),
        )
        .into_response()
}

fn to_sse_event(state: &AuthState) -> Result<Event, Error> {
    Event::default()
        .event(AUTH_STATE_EVENT)
        .json_data(state)
        .map_err(|error| Error::SerializationError(error.to_string()))
}
