//! Parsing and rendering of the expense form shared by the create and edit flows.

use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner},
};

use super::{Amount, Category, NewExpense};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// The raw expense fields submitted by a client, either as an HTML form or as JSON.
///
/// The fields are kept loosely typed so that bad input is reported as a
/// validation error naming the offending value rather than a generic parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseForm {
    pub category: String,
    /// A JSON number or a decimal string.
    pub amount: serde_json::Value,
    /// A date in the format `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl TryFrom<ExpenseForm> for NewExpense {
    type Error = Error;

    /// Validate the form fields.
    ///
    /// # Errors
    ///
    /// Returns a [Error::InvalidCategory], [Error::InvalidAmount] or
    /// [Error::InvalidDate] for the first field that fails validation.
    fn try_from(form: ExpenseForm) -> Result<Self, Self::Error> {
        let category: Category = form.category.parse()?;
        let amount = parse_amount(&form.amount)?;
        let date = parse_date(&form.date)?;

        Ok(NewExpense::new(category, amount, date, form.description))
    }
}

fn parse_amount(value: &serde_json::Value) -> Result<Amount, Error> {
    match value {
        serde_json::Value::Number(number) => number.to_string().parse(),
        serde_json::Value::String(text) => text.parse(),
        other => Err(Error::InvalidAmount(other.to_string())),
    }
}

/// Parse a `YYYY-MM-DD` date with a year from 1 to 9999.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), DATE_FORMAT)
        .ok()
        .filter(|date| (1..=9999).contains(&date.year()))
        .ok_or_else(|| Error::InvalidDate(text.to_owned()))
}

/// The values to prefill the expense form with.
pub struct ExpenseFormDefaults<'a> {
    pub category: Option<Category>,
    pub amount: Option<Amount>,
    pub date: Date,
    pub description: Option<&'a str>,
}

/// How the expense form is submitted.
pub enum ExpenseFormAction<'a> {
    /// POST a new expense to the URL.
    Create(&'a str),
    /// PUT the changes to an existing expense to the URL.
    Update(&'a str),
}

pub fn expense_form(action: ExpenseFormAction<'_>, defaults: &ExpenseFormDefaults<'_>) -> Markup {
    let (hx_post, hx_put, submit_text) = match action {
        ExpenseFormAction::Create(url) => (Some(url), None, "Add Expense"),
        ExpenseFormAction::Update(url) => (None, Some(url), "Save Changes"),
    };

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            (expense_form_fields(defaults))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                (submit_text)
            }
        }
    }
}

pub fn expense_form_fields(defaults: &ExpenseFormDefaults<'_>) -> Markup {
    let amount_str = defaults.amount.map(|amount| amount.to_string());

    html! {
        div
        {
            label
                for="category"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            select
                name="category"
                id="category"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @for category in Category::ALL {
                    option
                        value=(category.name())
                        selected[Some(category) == defaults.category]
                    {
                        (category.name())
                    }
                }
            }
        }

        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            // w-full needed to ensure input takes the full width when prefilled with a value
            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    required
                    value=[amount_str.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="date"
                id="date"
                type="date"
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}
