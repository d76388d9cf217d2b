//! The profile setup page shown to users who have not set up a profile yet.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{AuthEvent, AuthEvents, AuthState, Session},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, form_error,
    },
    profile::{Profile, ProfileFormData, ProfileKind, get_profile, save_profile},
};

/// The state needed for the profile setup page and endpoint.
#[derive(Debug, Clone)]
pub struct ProfileState {
    pub auth_events: AuthEvents,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            auth_events: state.auth_events.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the profile setup page, filled in with the current profile if there is one.
pub async fn get_profile_setup_page(
    State(state): State<ProfileState>,
    session: Session,
) -> Result<Response, Error> {
    let profile = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        session.scoped(|user_id| get_profile(user_id, &connection))?
    };

    let form = ProfileFormData {
        kind: profile.as_ref().map_or(ProfileKind::Personal, |p| p.kind),
        full_name: profile
            .as_ref()
            .map(|p| p.full_name.clone())
            .unwrap_or_default(),
        company_name: profile
            .and_then(|p| p.company_name)
            .unwrap_or_default(),
    };

    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-lg space-y-2"
            {
                h1 class="text-2xl font-bold text-center" { "Set up your profile" }
                p class="text-center text-gray-500 dark:text-gray-400"
                {
                    "Tell us whose finances you are tracking."
                }
                (profile_form_view(&form, ""))
            }
        }
    };

    Ok(base("Profile", &[], &content).into_response())
}

/// Save the profile, then send the user to the dashboard.
///
/// The first save also creates the default categories and account.
pub async fn save_profile_endpoint(
    State(state): State<ProfileState>,
    session: Session,
    Form(form): Form<ProfileFormData>,
) -> Response {
    let user = match session.require() {
        Ok(user) => user.clone(),
        Err(error) => return error.into_alert_response(),
    };

    let profile = match Profile::new(form.kind, &form.full_name, &form.company_name) {
        Ok(profile) => profile,
        Err(error) => {
            return profile_form_view(&form, &format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = save_profile(user.id, &profile, &connection) {
        tracing::error!("could not save profile for user {}: {error}", user.id);
        return error.into_alert_response();
    }
    drop(connection);

    state.auth_events.publish(AuthEvent {
        user_id: user.id,
        state: AuthState::SignedIn {
            user,
            profile: Some(profile),
        },
    });

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn profile_form_view(form: &ProfileFormData, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::PROFILE_API)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            fieldset class=(FORM_RADIO_GROUP_STYLE)
            {
                legend class=(FORM_LABEL_STYLE) { "Profile type" }

                @for kind in ProfileKind::ALL {
                    label class=(FORM_RADIO_LABEL_STYLE)
                    {
                        input
                            type="radio"
                            name="kind"
                            value=(kind.as_str())
                            checked[*kind == form.kind]
                            required
                            class=(FORM_RADIO_INPUT_STYLE);

                        span class="ml-2"
                        {
                            @match kind {
                                ProfileKind::Personal => "Personal: your own finances",
                                ProfileKind::Business => "Business: your company's finances",
                            }
                        }
                    }
                }
            }

            div
            {
                label for="full_name" class=(FORM_LABEL_STYLE) { "Full name" }
                input
                    id="full_name"
                    type="text"
                    name="full_name"
                    value=(form.full_name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="company_name" class=(FORM_LABEL_STYLE) { "Company name (business only)" }
                input
                    id="company_name"
                    type="text"
                    name="company_name"
                    value=(form.company_name)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (form_error(error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save profile" }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        auth::{AuthEvents, AuthState, Session},
        db::initialize,
        endpoints,
        profile::{ProfileFormData, ProfileKind, get_profile},
        test_utils::{
            assert_form_error_message, assert_form_input, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, must_get_form, parse_html_document, parse_html_fragment,
        },
        user::{User, find_or_create_user},
    };

    use super::{ProfileState, get_profile_setup_page, save_profile_endpoint};

    fn get_state() -> (ProfileState, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, _) = find_or_create_user("ana@example.com", &connection).unwrap();

        (
            ProfileState {
                auth_events: AuthEvents::new(4),
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user,
        )
    }

    #[tokio::test]
    async fn render_page() {
        let (state, user) = get_state();

        let response = get_profile_setup_page(State(state), Session::signed_in(user))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::PROFILE_API, "hx-post");
        assert_form_input(&form, "full_name", "text");
        assert_form_input(&form, "kind", "radio");
    }

    #[tokio::test]
    async fn save_profile_redirects_and_publishes_event() {
        let (state, user) = get_state();
        let mut subscription = state.auth_events.subscribe_user(user.id);
        let form = ProfileFormData {
            kind: ProfileKind::Personal,
            full_name: "Ana Souza".to_owned(),
            company_name: String::new(),
        };

        let response =
            save_profile_endpoint(State(state.clone()), Session::signed_in(user.clone()), Form(form))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let saved = get_profile(user.id, &state.db_connection.lock().unwrap())
            .unwrap()
            .expect("profile not saved");
        assert_eq!(saved.full_name, "Ana Souza");
        let event = subscription.next().await.unwrap();
        assert_eq!(
            event.state,
            AuthState::SignedIn {
                user,
                profile: Some(saved)
            }
        );
    }

    #[tokio::test]
    async fn business_profile_without_company_shows_error() {
        let (state, user) = get_state();
        let form = ProfileFormData {
            kind: ProfileKind::Business,
            full_name: "Ana Souza".to_owned(),
            company_name: String::new(),
        };

        let response = save_profile_endpoint(State(state), Session::signed_in(user), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Please enter your company name");
    }

    #[tokio::test]
    async fn signed_out_save_is_rejected() {
        let (state, _) = get_state();
        let form = ProfileFormData {
            kind: ProfileKind::Personal,
            full_name: "Ana Souza".to_owned(),
            company_name: String::new(),
        };

        let response = save_profile_endpoint(State(state), Session::signed_out(), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
