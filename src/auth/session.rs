//! Resolves the signed in user from the header set by the identity proxy.

use std::{
    convert::Infallible,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_htmx::HX_REQUEST;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{AuthConfig, AuthEvent, AuthEvents, AuthState},
    profile::get_profile,
    user::{User, UserId, find_or_create_user},
};

/// The user, if any, that a request was made on behalf of.
///
/// Handlers take a `Session` as an argument. Requests that did not pass
/// through [session_middleware] are treated as signed out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session(Option<User>);

impl Session {
    pub fn signed_in(user: User) -> Self {
        Self(Some(user))
    }

    pub fn signed_out() -> Self {
        Self(None)
    }

    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// Get the signed in user.
    ///
    /// # Errors
    /// Returns [Error::Unauthenticated] when signed out.
    pub fn require(&self) -> Result<&User, Error> {
        self.0.as_ref().ok_or(Error::Unauthenticated)
    }

    /// Run `fetch` for the signed in user, or return the empty value when signed out.
    pub fn scoped<T: Default>(
        &self,
        fetch: impl FnOnce(UserId) -> Result<T, Error>,
    ) -> Result<T, Error> {
        match &self.0 {
            Some(user) => fetch(user.id),
            None => Ok(T::default()),
        }
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Session>()
            .cloned()
            .unwrap_or_default())
    }
}

/// The state needed for [session_middleware].
#[derive(Debug, Clone)]
pub struct SessionState {
    pub auth_config: AuthConfig,
    pub auth_events: AuthEvents,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SessionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            auth_config: state.auth_config.clone(),
            auth_events: state.auth_events.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Middleware that puts a [Session] into the request extensions.
///
/// The user row is created the first time an identity is seen, which also
/// publishes a signed in event. A missing, empty or non-UTF-8 header means
/// signed out. Failing to resolve the user ends the request with an error page,
/// or an alert for htmx requests.
pub async fn session_middleware(
    State(state): State<SessionState>,
    mut request: Request,
    next: Next,
) -> Response {
    let external_id = request
        .headers()
        .get(&state.auth_config.header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned);

    let session = match external_id {
        Some(external_id) => match resolve_user(&external_id, &state) {
            Ok(user) => Session::signed_in(user),
            Err(error) => {
                tracing::error!("could not resolve user for {external_id}: {error}");

                return if request.headers().contains_key(HX_REQUEST) {
                    error.into_alert_response()
                } else {
                    error.into_response()
                };
            }
        },
        None => Session::signed_out(),
    };

    request.extensions_mut().insert(session);
    next.run(request).await
}

fn resolve_user(external_id: &str, state: &SessionState) -> Result<User, Error> {
    let (user, profile, is_new) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let (user, is_new) = find_or_create_user(external_id, &connection)?;
        let profile = if is_new {
            get_profile(user.id, &connection)?
        } else {
            None
        };

        (user, profile, is_new)
    };

    if is_new {
        state.auth_events.publish(AuthEvent {
            user_id: user.id,
            state: AuthState::SignedIn {
                user: user.clone(),
                profile,
            },
        });
    }

    Ok(user)
}
