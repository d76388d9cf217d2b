use maud::{Markup, html};

use crate::{
    category::{CATEGORY_COLORS, CategoryFormData, CategoryKind},
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
};

/// The name, kind and colour inputs shared by the create and edit forms.
///
/// The colour is picked from a palette. A colour outside the palette, e.g. one
/// saved before the palette changed, is offered as an extra choice.
pub(super) fn category_fields(form: &CategoryFormData) -> Markup {
    let mut colors: Vec<&str> = CATEGORY_COLORS.to_vec();
    let current_color = form.color.trim();
    if !current_color.is_empty()
        && !colors
            .iter()
            .any(|color| color.eq_ignore_ascii_case(current_color))
    {
        colors.push(current_color);
    }

    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Name" }
            input
                id="name"
                type="text"
                name="name"
                value=(form.name)
                placeholder="e.g. Groceries"
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        fieldset class=(FORM_RADIO_GROUP_STYLE)
        {
            legend class=(FORM_LABEL_STYLE) { "Type" }

            @for kind in CategoryKind::ALL {
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

        fieldset
        {
            legend class=(FORM_LABEL_STYLE) { "Colour" }

            div class="flex flex-wrap gap-2"
            {
                @for color in colors {
                    label class="cursor-pointer" title=(color)
                    {
                        input
                            type="radio"
                            name="color"
                            value=(color)
                            checked[color.eq_ignore_ascii_case(current_color)]
                            required
                            class="sr-only peer";
                        span
                            class="block w-8 h-8 rounded-full border-2 border-transparent
                            peer-checked:border-gray-900 dark:peer-checked:border-white"
                            style={ "background-color: " (color) ";" }
                        {}
                    }
                }
            }
        }
    }
}
