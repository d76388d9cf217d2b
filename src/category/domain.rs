//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId, db::text_enum};

/// Colours offered when creating a category.
pub const CATEGORY_COLORS: [&str; 10] = [
    "#10B981", "#EF4444", "#3B82F6", "#F59E0B", "#8B5CF6", "#06B6D4", "#EC4899", "#84CC16",
    "#F97316", "#6B7280",
];

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is empty or whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A colour in the form `#RRGGBB`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryColor(String);

impl CategoryColor {
    /// Create a colour from a `#RRGGBB` hex code. Either letter case is accepted.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidColor] if `color` is not a six digit hex code starting with '#'.
    pub fn new(color: &str) -> Result<Self, Error> {
        let color = color.trim();
        let is_valid = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());

        if is_valid {
            Ok(Self(color.to_owned()))
        } else {
            Err(Error::InvalidColor(color.to_owned()))
        }
    }

    /// Create a colour without validation.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_owned())
    }
}

impl AsRef<str> for CategoryColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

text_enum! {
    /// Whether a category groups money coming in or going out.
    pub enum CategoryKind {
        /// Money earned, e.g. salary.
        Income("income", "Income"),
        /// Money spent, e.g. groceries.
        Expense("expense", "Expense"),
    }
}

/// Database identifier for a category.
pub type CategoryId = DatabaseId;

/// A user defined grouping for transactions (e.g., 'Food', 'Salary').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Hash)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub kind: CategoryKind,
    pub color: CategoryColor,
    /// Whether the category was created by the profile setup.
    pub is_default: bool,
}

/// The validated fields for creating or updating a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub kind: CategoryKind,
    pub color: CategoryColor,
}

/// Form data for category creation and editing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
    pub kind: CategoryKind,
    pub color: String,
}

impl CategoryFormData {
    /// Validate the form fields.
    ///
    /// # Errors
    ///
    /// Returns an [Error::EmptyCategoryName] or [Error::InvalidColor] for invalid fields.
    pub fn validate(&self) -> Result<NewCategory, Error> {
        Ok(NewCategory {
            name: CategoryName::new(&self.name)?,
            kind: self.kind,
            color: CategoryColor::new(&self.color)?,
        })
    }
}
