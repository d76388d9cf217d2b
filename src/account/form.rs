use maud::{Markup, html};

use crate::{
    account::AccountKind,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The name, kind and balance inputs shared by the create and edit forms.
pub(super) fn account_fields(
    name: &str,
    kind: AccountKind,
    balance_name: &str,
    balance_label: &str,
    balance: &str,
) -> Markup {
    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Name" }
            input
                id="name"
                type="text"
                name="name"
                value=(name)
                placeholder="e.g. Nubank"
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="kind" class=(FORM_LABEL_STYLE) { "Type" }
            select id="kind" name="kind" required class=(FORM_TEXT_INPUT_STYLE)
            {
                @for option in AccountKind::ALL {
                    option value=(option.as_str()) selected[*option == kind] { (option.label()) }
                }
            }
        }

        div
        {
            label for=(balance_name) class=(FORM_LABEL_STYLE) { (balance_label) }
            div class="input-wrapper"
            {
                input
                    id=(balance_name)
                    type="text"
                    inputmode="decimal"
                    name=(balance_name)
                    value=(balance)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    }
}
