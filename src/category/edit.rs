//! Category editing page and endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error,
    auth::Session,
    category::{
        CategoryFormData, CategoryId, CategoryState, form::category_fields, get_category,
        update_category,
    },
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, form_error},
    navigation::NavBar,
};

/// Render the edit page for one of the user's categories.
pub async fn get_edit_category_page(
    State(state): State<CategoryState>,
    session: Session,
    Path(category_id): Path<CategoryId>,
) -> Result<Response, Error> {
    let user = session.require()?;
    let category = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_category(user.id, category_id, &connection)?
    };

    let nav_bar = NavBar::new(endpoints::EDIT_CATEGORY_VIEW).into_html();
    let form = CategoryFormData {
        name: category.name.to_string(),
        kind: category.kind,
        color: category.color.to_string(),
    };

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Category" }
            (edit_category_form_view(category_id, &form, ""))
        }
    };

    Ok(base("Edit Category", &[], &content).into_response())
}

/// Handle the category edit form.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    session: Session,
    Path(category_id): Path<CategoryId>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let user_id = match session.require() {
        Ok(user) => user.id,
        Err(error) => return error.into_alert_response(),
    };

    let category = match form.validate() {
        Ok(category) => category,
        Err(error) => {
            return edit_category_form_view(category_id, &form, &format!("Error: {error}"))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_category(user_id, category_id, category, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update category {category_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_category_form_view(
    category_id: CategoryId,
    form: &CategoryFormData,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(format_endpoint(endpoints::CATEGORY, category_id))
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (category_fields(form))

            (form_error(error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Category" }
        }
    }
}
