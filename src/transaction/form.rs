//! The fields and validation shared by the transaction create and edit forms.

use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    account::{Account, AccountId, get_account, get_active_accounts},
    category::{Category, CategoryId, CategoryKind, get_categories},
    endpoints::{self, format_endpoint},
    format::{format_amount_for_input, format_date_for_input, parse_amount, parse_date},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, form_error,
    },
    transaction::{
        Frequency, NewTransaction, Transaction, TransactionId, TransactionKind, TransactionStatus,
    },
    user::UserId,
};

/// Form data for creating or editing a transaction.
///
/// Must be used with axum_extra's `Form`, which reads empty selects as `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionFormData {
    pub description: String,
    /// The amount as typed, e.g. "1.234,56" or "1234.56".
    pub amount: String,
    pub kind: TransactionKind,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub account_id: Option<AccountId>,
    pub due_date: String,
    /// Empty when the transaction has not been paid.
    #[serde(default)]
    pub paid_date: String,
    pub status: TransactionStatus,
    #[serde(default)]
    pub note: String,
    /// Unchecked checkboxes are not submitted.
    #[serde(default)]
    pub recurring: Option<String>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
}

/// Validation errors keyed by the name of the input they belong to.
#[derive(Debug, Default, PartialEq)]
pub struct FieldErrors(Vec<(&'static str, Error)>);

impl FieldErrors {
    fn push(&mut self, field: &'static str, error: Error) {
        self.0.push((field, error));
    }

    /// The error for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&Error> {
        self.0
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, error)| error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TransactionFormData {
    /// An empty form for a pending expense due on `today`.
    pub fn new(today: Date) -> Self {
        Self {
            description: String::new(),
            amount: String::new(),
            kind: TransactionKind::Expense,
            category_id: None,
            account_id: None,
            due_date: format_date_for_input(today),
            paid_date: String::new(),
            status: TransactionStatus::Pending,
            note: String::new(),
            recurring: None,
            frequency: None,
        }
    }

    /// A form filled in with the fields of `transaction`.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            description: transaction.description.clone(),
            amount: format_amount_for_input(transaction.amount),
            kind: transaction.kind,
            category_id: transaction.category_id,
            account_id: transaction.account_id,
            due_date: format_date_for_input(transaction.due_date),
            paid_date: transaction
                .paid_date
                .map(format_date_for_input)
                .unwrap_or_default(),
            status: transaction.status,
            note: transaction.note.clone().unwrap_or_default(),
            recurring: transaction.is_recurring().then(|| "on".to_owned()),
            frequency: transaction.recurrence,
        }
    }

    /// Check every field, collecting one error per invalid field.
    ///
    /// # Errors
    /// Returns the [FieldErrors] when at least one field is invalid.
    pub fn validate(&self) -> Result<NewTransaction, FieldErrors> {
        let mut errors = FieldErrors::default();

        let description = self.description.trim();
        if description.is_empty() {
            errors.push("description", Error::EmptyDescription);
        }

        let amount = parse_amount(&self.amount)
            .map_err(|error| errors.push("amount", error))
            .ok();

        let due_date = parse_date(&self.due_date)
            .map_err(|error| errors.push("due_date", error))
            .ok();

        let paid_date = match self.paid_date.trim() {
            "" => None,
            text => parse_date(text)
                .map_err(|error| errors.push("paid_date", error))
                .ok(),
        };

        let recurrence = match (self.recurring.is_some(), self.frequency) {
            (false, _) => None,
            (true, Some(frequency)) => Some(frequency),
            (true, None) => {
                errors.push("frequency", Error::MissingFrequency);
                None
            }
        };

        let note = Some(self.note.trim())
            .filter(|note| !note.is_empty())
            .map(str::to_owned);

        match (amount, due_date) {
            (Some(amount), Some(due_date)) if errors.is_empty() => Ok(NewTransaction::build(
                self.kind,
                amount,
                due_date,
                description,
            )
            .category_id(self.category_id)
            .account_id(self.account_id)
            .status(self.status)
            .paid_date(paid_date)
            .note(note)
            .recurrence(recurrence)),
            _ => Err(errors),
        }
    }
}

/// Whether a form creates a new transaction or updates an existing one.
#[derive(Debug, Clone, Copy)]
pub(super) enum FormAction {
    Create,
    Update(TransactionId),
}

/// The categories and accounts to choose from.
///
/// Inactive accounts are offered only when `current_account` refers to one, so that
/// editing a transaction does not silently drop its account.
pub(super) fn load_form_options(
    user_id: UserId,
    current_account: Option<AccountId>,
    connection: &Connection,
) -> Result<(Vec<Category>, Vec<Account>), Error> {
    let categories = get_categories(user_id, connection)?;
    let mut accounts = get_active_accounts(user_id, connection)?;

    // An inactive account stays selectable on the transactions that already use it.
    let missing_account =
        current_account.filter(|id| !accounts.iter().any(|account| account.id == *id));

    if let Some(account_id) = missing_account {
        match get_account(user_id, account_id, connection) {
            Ok(account) => accounts.push(account),
            Err(Error::NotFound) => {}
            Err(error) => return Err(error),
        }
    }

    Ok((categories, accounts))
}

/// The complete transaction form, posting to the API for `action`.
pub(super) fn transaction_form(
    action: FormAction,
    form: &TransactionFormData,
    errors: &FieldErrors,
    error_message: &str,
    categories: &[Category],
    accounts: &[Account],
) -> Markup {
    let fields = transaction_form_fields(form, errors, categories, accounts);

    match action {
        FormAction::Create => html! {
            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                hx-swap="outerHTML"
                class="w-full max-w-xl space-y-4 md:space-y-6"
            {
                (fields)
                (form_error(error_message))
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Transaction" }
            }
        },
        FormAction::Update(transaction_id) => html! {
            form
                hx-put=(format_endpoint(endpoints::TRANSACTION, transaction_id))
                hx-target-error="#alert-container"
                hx-swap="outerHTML"
                class="w-full max-w-xl space-y-4 md:space-y-6"
            {
                (fields)
                (form_error(error_message))
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Transaction" }
            }
        },
    }
}

fn field_error(errors: &FieldErrors, field: &str) -> Markup {
    html! {
        @if let Some(error) = errors.get(field) {
            p class={ "mt-1 text-sm " (FORM_ERROR_STYLE) } data-error-for=(field) { (error) }
        }
    }
}

/// The inputs shared by the transaction create and edit forms.
///
/// Categories are grouped by kind. The server checks that the chosen category
/// matches the transaction kind.
fn transaction_form_fields(
    form: &TransactionFormData,
    errors: &FieldErrors,
    categories: &[Category],
    accounts: &[Account],
) -> Markup {
    let category_groups = [
        ("Income", CategoryKind::Income),
        ("Expense", CategoryKind::Expense),
    ];

    html! {
        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }
            input
                id="description"
                type="text"
                name="description"
                value=(form.description)
                placeholder="e.g. Salary, rent, groceries"
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
            (field_error(errors, "description"))
        }

        fieldset class=(FORM_RADIO_GROUP_STYLE)
        {
            legend class=(FORM_LABEL_STYLE) { "Type" }

            @for kind in TransactionKind::ALL {
                label class=(FORM_RADIO_LABEL_STYLE)
                {
                    input
                        type="radio"
                        name="kind"
                        value=(kind.as_str())
                        checked[*kind == form.kind]
                        required
                        class=(FORM_RADIO_INPUT_STYLE);
                    span class="ml-2" { (kind.label()) }
                }
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
            div class="input-wrapper w-full"
            {
                input
                    id="amount"
                    type="text"
                    inputmode="decimal"
                    name="amount"
                    value=(form.amount)
                    placeholder="0,00"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
            (field_error(errors, "amount"))
        }

        div class="grid grid-cols-1 md:grid-cols-2 gap-4"
        {
            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }
                select id="category_id" name="category_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "No category" }

                    @for (label, kind) in category_groups {
                        optgroup label=(label)
                        {
                            @for category in categories.iter().filter(|category| category.kind == kind) {
                                option
                                    value=(category.id)
                                    selected[form.category_id == Some(category.id)]
                                {
                                    (category.name)
                                }
                            }
                        }
                    }
                }
            }

            div
            {
                label for="account_id" class=(FORM_LABEL_STYLE) { "Account" }
                select id="account_id" name="account_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "No account" }

                    @for account in accounts {
                        option
                            value=(account.id)
                            selected[form.account_id == Some(account.id)]
                        {
                            (account.name)
                        }
                    }
                }
            }
        }

        div class="grid grid-cols-1 md:grid-cols-2 gap-4"
        {
            div
            {
                label for="due_date" class=(FORM_LABEL_STYLE) { "Due date" }
                input
                    id="due_date"
                    type="date"
                    name="due_date"
                    value=(form.due_date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
                (field_error(errors, "due_date"))
            }

            div
            {
                label for="paid_date" class=(FORM_LABEL_STYLE) { "Paid date" }
                input
                    id="paid_date"
                    type="date"
                    name="paid_date"
                    value=(form.paid_date)
                    class=(FORM_TEXT_INPUT_STYLE);
                (field_error(errors, "paid_date"))
            }
        }

        div
        {
            label for="status" class=(FORM_LABEL_STYLE) { "Status" }
            select id="status" name="status" required class=(FORM_TEXT_INPUT_STYLE)
            {
                @for status in TransactionStatus::ALL {
                    option value=(status.as_str()) selected[*status == form.status]
                    {
                        (status.label())
                    }
                }
            }
        }

        div class="grid grid-cols-1 md:grid-cols-2 gap-4 items-end"
        {
            div class="flex items-center gap-2"
            {
                input
                    id="recurring"
                    type="checkbox"
                    name="recurring"
                    checked[form.recurring.is_some()];
                label for="recurring" class=(FORM_LABEL_STYLE) { "Repeats" }
            }

            div
            {
                label for="frequency" class=(FORM_LABEL_STYLE) { "Frequency" }
                select id="frequency" name="frequency" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "Does not repeat" }

                    @for frequency in Frequency::ALL {
                        option
                            value=(frequency.as_str())
                            selected[form.frequency == Some(*frequency)]
                        {
                            (frequency.label())
                        }
                    }
                }
                (field_error(errors, "frequency"))
            }
        }

        div
        {
            label for="note" class=(FORM_LABEL_STYLE) { "Note" }
            textarea id="note" name="note" rows="3" class=(FORM_TEXT_INPUT_STYLE)
            {
                (form.note)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        transaction::{Frequency, TransactionKind, TransactionStatus},
    };

    use super::TransactionFormData;

    fn valid_form() -> TransactionFormData {
        TransactionFormData {
            description: " Rent ".to_owned(),
            amount: "1.500,00".to_owned(),
            kind: TransactionKind::Expense,
            category_id: None,
            account_id: None,
            due_date: "2026-10-05".to_owned(),
            paid_date: "2026-10-04".to_owned(),
            status: TransactionStatus::Paid,
            note: "  ".to_owned(),
            recurring: Some("on".to_owned()),
            frequency: Some(Frequency::Monthly),
        }
    }

    #[test]
    fn valid_form_builds_transaction() {
        let transaction = valid_form().validate().unwrap();

        assert_eq!(transaction.description, "Rent");
        assert_eq!(transaction.amount, 1500.0);
        assert_eq!(transaction.due_date, date!(2026 - 10 - 05));
        assert_eq!(transaction.paid_date, Some(date!(2026 - 10 - 04)));
        assert_eq!(transaction.status, TransactionStatus::Paid);
        assert_eq!(transaction.note, None);
        assert_eq!(transaction.recurrence, Some(Frequency::Monthly));
    }

    #[test]
    fn frequency_is_dropped_when_not_recurring() {
        let form = TransactionFormData {
            recurring: None,
            ..valid_form()
        };

        let transaction = form.validate().unwrap();

        assert_eq!(transaction.recurrence, None);
    }

    #[test]
    fn collects_an_error_per_field() {
        let form = TransactionFormData {
            description: "".to_owned(),
            amount: "-5".to_owned(),
            due_date: "05/10/2026".to_owned(),
            paid_date: "".to_owned(),
            frequency: None,
            ..valid_form()
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(errors.get("description"), Some(&Error::EmptyDescription));
        assert_eq!(errors.get("amount"), Some(&Error::NegativeAmount));
        assert_eq!(
            errors.get("due_date"),
            Some(&Error::InvalidDate("05/10/2026".to_owned()))
        );
        assert_eq!(errors.get("paid_date"), None);
        assert_eq!(errors.get("frequency"), Some(&Error::MissingFrequency));
    }

    #[test]
    fn new_form_defaults_to_pending_expense() {
        let form = TransactionFormData::new(date!(2026 - 10 - 17));

        assert_eq!(form.kind, TransactionKind::Expense);
        assert_eq!(form.status, TransactionStatus::Pending);
        assert_eq!(form.due_date, "2026-10-17");
    }
}
