//! Database operations for categories.

use std::collections::HashMap;

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryColor, CategoryId, CategoryName, NewCategory},
    user::UserId,
};

/// Create a category for `user_id` and return it with its generated ID.
pub fn create_category(
    user_id: UserId,
    category: NewCategory,
    is_default: bool,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (user_id, name, kind, color, is_default) VALUES (?1, ?2, ?3, ?4, ?5);",
        (
            user_id,
            category.name.as_ref(),
            category.kind,
            category.color.as_ref(),
            is_default,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name: category.name,
        kind: category.kind,
        color: category.color,
        is_default,
    })
}

/// Retrieve one of the user's categories by ID.
///
/// # Errors
/// Returns [Error::NotFound] if the category does not exist or belongs to another user.
pub fn get_category(
    user_id: UserId,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, color, is_default FROM category
             WHERE id = :id AND user_id = :user_id;",
        )?
        .query_row(&[(":id", &category_id), (":user_id", &user_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of the user's categories ordered alphabetically by name.
pub fn get_categories(user_id: UserId, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, color, is_default FROM category
             WHERE user_id = ?1 ORDER BY name ASC, id ASC;",
        )?
        .query_map([user_id], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Update a category's name, kind and colour.
///
/// # Errors
/// Returns [Error::UpdateMissingCategory] if the user has no category with `category_id`.
pub fn update_category(
    user_id: UserId,
    category_id: CategoryId,
    category: NewCategory,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1, kind = ?2, color = ?3 WHERE id = ?4 AND user_id = ?5",
        (
            category.name.as_ref(),
            category.kind,
            category.color.as_ref(),
            category_id,
            user_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category that has no transactions.
///
/// # Errors
/// Returns [Error::CategoryInUse] if a transaction still uses the category,
/// or [Error::DeleteMissingCategory] if the user has no category with `category_id`.
pub fn delete_category(
    user_id: UserId,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction_count: u32 = connection.query_row(
        "SELECT COUNT(1) FROM \"transaction\" WHERE category_id = ?1 AND user_id = ?2",
        (category_id, user_id),
        |row| row.get(0),
    )?;

    if transaction_count > 0 {
        return Err(Error::CategoryInUse);
    }

    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Count the user's transactions for each category that has at least one.
pub fn count_transactions_per_category(
    user_id: UserId,
    connection: &Connection,
) -> Result<HashMap<CategoryId, u32>, Error> {
    let result: Result<HashMap<CategoryId, u32>, rusqlite::Error> = connection
        .prepare(
            "SELECT category_id, COUNT(1) FROM \"transaction\"
             WHERE user_id = ?1 AND category_id IS NOT NULL
             GROUP BY category_id",
        )?
        .query_map([user_id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect();

    result.map_err(Error::from)
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            color TEXT NOT NULL,
            is_default INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_name ON category(user_id, name);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(1)?;
    let raw_color: String = row.get(3)?;

    Ok(Category {
        id: row.get(0)?,
        name: CategoryName::new_unchecked(&raw_name),
        kind: row.get(2)?,
        color: CategoryColor::new_unchecked(&raw_color),
        is_default: row.get(4)?,
    })
}
