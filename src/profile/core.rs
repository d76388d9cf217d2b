//! User profiles and the defaults created when a profile is first saved.

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    account::{AccountKind, AccountName, NewAccount, create_account},
    category::{
        CATEGORY_COLORS, CategoryColor, CategoryKind, CategoryName, NewCategory, create_category,
    },
    db::text_enum,
    user::UserId,
};

text_enum! {
    /// Whose finances the user is tracking.
    pub enum ProfileKind {
        /// The user's own finances.
        Personal("personal", "Personal"),
        /// A company's finances.
        Business("business", "Business"),
    }
}

/// The details entered during profile setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub kind: ProfileKind,
    pub full_name: String,
    /// Only set for business profiles.
    pub company_name: Option<String>,
}

impl Profile {
    /// Create a profile, trimming the names.
    ///
    /// # Errors
    /// Returns [Error::MissingFullName] if `full_name` is blank, or
    /// [Error::MissingCompanyName] if a business profile has a blank `company_name`.
    pub fn new(kind: ProfileKind, full_name: &str, company_name: &str) -> Result<Self, Error> {
        let full_name = full_name.trim();
        let company_name = company_name.trim();

        if full_name.is_empty() {
            return Err(Error::MissingFullName);
        }

        let company_name = match kind {
            ProfileKind::Personal => None,
            ProfileKind::Business if company_name.is_empty() => {
                return Err(Error::MissingCompanyName);
            }
            ProfileKind::Business => Some(company_name.to_owned()),
        };

        Ok(Self {
            kind,
            full_name: full_name.to_owned(),
            company_name,
        })
    }
}

/// Form data for the profile setup page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileFormData {
    pub kind: ProfileKind,
    pub full_name: String,
    #[serde(default)]
    pub company_name: String,
}

const PERSONAL_INCOME_CATEGORIES: [&str; 3] = ["Salário", "Freelance", "Investimentos"];
const PERSONAL_EXPENSE_CATEGORIES: [&str; 6] = [
    "Alimentação",
    "Moradia",
    "Transporte",
    "Saúde",
    "Lazer",
    "Educação",
];
const BUSINESS_INCOME_CATEGORIES: [&str; 2] = ["Vendas", "Serviços"];
const BUSINESS_EXPENSE_CATEGORIES: [&str; 5] = [
    "Fornecedores",
    "Folha de pagamento",
    "Impostos",
    "Aluguel",
    "Marketing",
];

/// The names of the categories created for a new profile of `kind`.
pub fn default_categories(kind: ProfileKind) -> Vec<(CategoryKind, &'static str)> {
    let (income, expense): (&[&str], &[&str]) = match kind {
        ProfileKind::Personal => (&PERSONAL_INCOME_CATEGORIES, &PERSONAL_EXPENSE_CATEGORIES),
        ProfileKind::Business => (&BUSINESS_INCOME_CATEGORIES, &BUSINESS_EXPENSE_CATEGORIES),
    };

    income
        .iter()
        .map(|name| (CategoryKind::Income, *name))
        .chain(expense.iter().map(|name| (CategoryKind::Expense, *name)))
        .collect()
}

/// The account created for a new profile of `kind`.
pub fn default_account(kind: ProfileKind) -> NewAccount {
    let name = match kind {
        ProfileKind::Personal => "Conta corrente",
        ProfileKind::Business => "Conta empresarial",
    };

    NewAccount {
        name: AccountName::new_unchecked(name),
        kind: AccountKind::Checking,
        initial_balance: 0.0,
    }
}

/// Get the user's profile, `None` if the profile setup has not been done.
pub fn get_profile(user_id: UserId, connection: &Connection) -> Result<Option<Profile>, Error> {
    let profile = connection
        .query_row(
            "SELECT profile_kind, full_name, company_name FROM user
             WHERE id = ?1 AND profile_kind IS NOT NULL",
            [user_id],
            |row| {
                Ok(Profile {
                    kind: row.get(0)?,
                    full_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    company_name: row.get(2)?,
                })
            },
        )
        .optional()?;

    Ok(profile)
}

/// Save the user's profile.
///
/// The first time a profile is saved the default categories and account for
/// the profile kind are created as well. Everything is saved in one database
/// transaction.
///
/// # Errors
/// Returns [Error::NotFound] if the user does not exist, or [Error::SqlError]
/// for other SQL errors.
pub fn save_profile(
    user_id: UserId,
    profile: &Profile,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;
    let is_first_save = get_profile(user_id, &transaction)?.is_none();

    let rows_affected = transaction.execute(
        "UPDATE user SET profile_kind = ?1, full_name = ?2, company_name = ?3 WHERE id = ?4",
        (
            profile.kind,
            &profile.full_name,
            &profile.company_name,
            user_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    if is_first_save {
        for (index, (kind, name)) in default_categories(profile.kind).into_iter().enumerate() {
            let category = NewCategory {
                name: CategoryName::new_unchecked(name),
                kind,
                color: CategoryColor::new_unchecked(
                    CATEGORY_COLORS[index % CATEGORY_COLORS.len()],
                ),
            };
            create_category(user_id, category, true, &transaction)?;
        }

        create_account(user_id, default_account(profile.kind), &transaction)?;

        tracing::info!("Created default categories and account for user {user_id}");
    }

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        account::get_accounts,
        category::get_categories,
        db::initialize,
        profile::{Profile, ProfileKind, get_profile, save_profile},
        user::{UserId, find_or_create_user},
    };

    use super::default_categories;

    fn get_test_connection() -> (Connection, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, _) = find_or_create_user("test@example.com", &connection).unwrap();
        (connection, user.id)
    }

    #[test]
    fn personal_profile_requires_full_name() {
        assert_eq!(
            Profile::new(ProfileKind::Personal, " ", ""),
            Err(Error::MissingFullName)
        );
    }

    #[test]
    fn business_profile_requires_company_name() {
        assert_eq!(
            Profile::new(ProfileKind::Business, "Ana Souza", "  "),
            Err(Error::MissingCompanyName)
        );
    }

    #[test]
    fn personal_profile_drops_company_name() {
        let profile = Profile::new(ProfileKind::Personal, " Ana Souza ", "Acme").unwrap();

        assert_eq!(profile.full_name, "Ana Souza");
        assert_eq!(profile.company_name, None);
    }

    #[test]
    fn new_user_has_no_profile() {
        let (connection, user_id) = get_test_connection();

        assert_eq!(get_profile(user_id, &connection), Ok(None));
    }

    #[test]
    fn first_save_creates_defaults() {
        let (connection, user_id) = get_test_connection();
        let profile = Profile::new(ProfileKind::Business, "Ana Souza", "Acme").unwrap();

        save_profile(user_id, &profile, &connection).unwrap();

        assert_eq!(get_profile(user_id, &connection), Ok(Some(profile)));
        let categories = get_categories(user_id, &connection).unwrap();
        assert_eq!(
            categories.len(),
            default_categories(ProfileKind::Business).len()
        );
        assert!(categories.iter().all(|category| category.is_default));
        assert_eq!(get_accounts(user_id, &connection).unwrap().len(), 1);
    }

    #[test]
    fn saving_again_does_not_duplicate_defaults() {
        let (connection, user_id) = get_test_connection();
        let profile = Profile::new(ProfileKind::Personal, "Ana Souza", "").unwrap();
        save_profile(user_id, &profile, &connection).unwrap();
        let renamed = Profile::new(ProfileKind::Personal, "Ana S.", "").unwrap();

        save_profile(user_id, &renamed, &connection).unwrap();

        assert_eq!(get_profile(user_id, &connection), Ok(Some(renamed)));
        assert_eq!(
            get_categories(user_id, &connection).unwrap().len(),
            default_categories(ProfileKind::Personal).len()
        );
        assert_eq!(get_accounts(user_id, &connection).unwrap().len(), 1);
    }

    #[test]
    fn save_profile_for_missing_user_fails() {
        let (connection, _) = get_test_connection();
        let profile = Profile::new(ProfileKind::Personal, "Ana Souza", "").unwrap();

        assert_eq!(save_profile(999, &profile, &connection), Err(Error::NotFound));
    }
}
