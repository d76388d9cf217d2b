//! Brazilian Portuguese (pt-BR) formatting for money, dates and percentages,
//! plus lenient and strict number parsing.
//!
//! All functions here are pure.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};
use time::{Date, Month, OffsetDateTime, macros::format_description};

use crate::Error;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Format `amount` as Brazilian reais, e.g. "R$ 1.234,56" or "-R$ 10,00".
pub fn format_currency(amount: f64) -> String {
    static INTEGER_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let total_cents = (amount.abs() * 100.0).round() as u64;
    let integer_part = total_cents / 100;
    let cents = total_cents % 100;
    let sign = if amount < 0.0 && total_cents > 0 {
        "-"
    } else {
        ""
    };

    let integer_fmt = INTEGER_FMT.get_or_init(|| {
        Formatter::currency("R$ ")
            .inspect_err(|error| tracing::error!("could not create currency formatter: {error:?}"))
            .ok()
            .map(|formatter| formatter.precision(Precision::Decimals(0)))
    });

    // numfmt renders zero as a bare "0" without the prefix.
    let integer_text = match integer_fmt {
        Some(formatter) if integer_part > 0 => formatter.fmt_string(integer_part as f64),
        _ => format!("R$ {integer_part}"),
    };

    // numfmt groups with commas, pt-BR groups with dots.
    let integer_text = integer_text.replace(',', ".");

    format!("{sign}{integer_text},{cents:02}")
}

/// Format a date as "dd/mm/yyyy".
pub fn format_date(date: Date) -> String {
    format!(
        "{:02}/{:02}/{}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

/// Format a timestamp as "dd/mm/yyyy, HH:MM:SS".
pub fn format_date_time(date_time: OffsetDateTime) -> String {
    format!(
        "{}, {:02}:{:02}:{:02}",
        format_date(date_time.date()),
        date_time.hour(),
        date_time.minute(),
        date_time.second()
    )
}

/// Format a date as "yyyy-mm-dd" for the value of an `<input type="date">`.
pub fn format_date_for_input(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Format an amount with two decimals and a decimal comma for a form input, e.g. "1234,50".
pub fn format_amount_for_input(amount: f64) -> String {
    format!("{amount:.2}").replace('.', ",")
}

/// The short pt-BR month and year of `date`, e.g. "out. de 2026".
pub fn format_month_label(date: Date) -> String {
    format!("{}. de {}", month_abbreviation(date.month()), date.year())
}

fn month_abbreviation(month: Month) -> &'static str {
    MONTH_ABBREVIATIONS[u8::from(month) as usize - 1]
}

/// Format a percentage with a fixed number of decimal places, e.g. "33.3%".
///
/// Values that round to zero are shown without a minus sign.
pub fn format_percentage(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");

    match formatted.strip_prefix('-') {
        Some(unsigned) if unsigned.chars().all(|c| c == '0' || c == '.') => {
            format!("{unsigned}%")
        }
        _ => format!("{formatted}%"),
    }
}

/// Leniently parse a pt-BR number such as "R$ 1.234,56".
///
/// Everything except digits, commas and minus signs is dropped, and the first
/// comma becomes the decimal point. Text that still is not a number yields 0.
pub fn parse_number(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '-')
        .collect();

    cleaned.replacen(',', ".", 1).parse().unwrap_or(0.0)
}

/// Parse an amount typed into a form.
///
/// Accepts "1234.56" as well as pt-BR "1.234,56".
///
/// # Errors
/// Returns [Error::InvalidAmount] for empty or non-numeric text and
/// [Error::NegativeAmount] for amounts below zero.
pub fn parse_amount(text: &str) -> Result<f64, Error> {
    let trimmed = text.trim();

    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replacen(',', ".", 1)
    } else {
        trimmed.to_owned()
    };

    let amount: f64 = normalized
        .parse()
        .map_err(|_| Error::InvalidAmount(text.to_owned()))?;

    if !amount.is_finite() {
        return Err(Error::InvalidAmount(text.to_owned()));
    }

    if amount < 0.0 {
        return Err(Error::NegativeAmount);
    }

    Ok(amount)
}

/// Parse a "yyyy-mm-dd" date from a form or query string.
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` is not a valid date.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}
