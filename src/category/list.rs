//! Categories listing page, split into income and expense categories.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Session,
    category::{Category, CategoryKind, count_transactions_per_category, get_categories},
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, category_badge, edit_delete_action_links,
    },
    navigation::NavBar,
};

/// The state needed for the category pages and endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug)]
struct CategoryRow {
    category: Category,
    transaction_count: u32,
}

/// Render the categories page with transaction counts.
pub async fn get_categories_page(
    State(state): State<CategoryState>,
    session: Session,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = session
        .scoped(|user_id| get_categories(user_id, &connection))
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;
    let counts = session
        .scoped(|user_id| count_transactions_per_category(user_id, &connection))
        .inspect_err(|error| {
            tracing::error!("Could not count transactions per category: {error}")
        })?;

    let (income, expense): (Vec<_>, Vec<_>) = categories
        .into_iter()
        .map(|category| CategoryRow {
            transaction_count: counts.get(&category.id).copied().unwrap_or(0),
            category,
        })
        .partition(|row| row.category.kind == CategoryKind::Income);

    Ok(categories_view(&income, &expense).into_response())
}

fn categories_table(title: &str, kind: CategoryKind, rows: &[CategoryRow]) -> Markup {
    let table_row = |row: &CategoryRow| {
        let category = &row.category;
        let edit_url = format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id);

        html!(
            tr class=(TABLE_ROW_STYLE) data-category-id=(category.id)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (category_badge(category.name.as_ref(), category.color.as_ref()))
                    @if category.is_default {
                        span class="ml-2 text-xs text-gray-500" { "Default" }
                    }
                }

                td class=(TABLE_CELL_STYLE) { (row.transaction_count) }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        @if category.is_default {
                            a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                        } @else {
                            (edit_delete_action_links(
                                &edit_url,
                                &format_endpoint(endpoints::CATEGORY, category.id),
                                &format!(
                                    "Are you sure you want to delete '{}'? This cannot be undone.",
                                    category.name
                                ),
                                "closest tr",
                                "delete",
                            ))
                        }
                    }
                }
            }
        )
    };

    html!(
        section class="space-y-2" id={ (kind.as_str()) "-categories" }
        {
            h2 class="text-lg font-semibold" { (title) }

            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Transactions" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for row in rows {
                        (table_row(row))
                    }

                    @if rows.is_empty() {
                        tr
                        {
                            td colspan="3" class="px-6 py-4 text-center"
                            {
                                "No " (kind.label().to_lowercase()) " categories yet."
                            }
                        }
                    }
                }
            }
        }
    )
}

fn categories_view(income: &[CategoryRow], expense: &[CategoryRow]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Categories" }

                    a href=(endpoints::NEW_CATEGORY_VIEW) class=(LINK_STYLE)
                    {
                        "Create Category"
                    }
                }

                (categories_table("Income", CategoryKind::Income, income))
                (categories_table("Expenses", CategoryKind::Expense, expense))
            }
        }
    );

    base("Categories", &[], &content)
}
