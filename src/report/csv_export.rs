//! CSV export of a list of transactions.

use time::Date;

use crate::{Error, format::format_date};

use super::ReportEntry;

/// The header row of an export.
pub const CSV_HEADER: [&str; 6] = ["Date", "Description", "Category", "Kind", "Amount", "Status"];

/// Write `entries` as CSV with a header row.
///
/// Dates are written as "dd/mm/yyyy" and amounts in their shortest form with a
/// decimal comma, e.g. "100" or "100,5". Fields are quoted only when they contain
/// a comma, a quote or a line break. Rows end with "\n".
///
/// # Errors
/// Returns [Error::CsvError] if the CSV writer fails, which does not happen when
/// writing to memory.
pub fn export_csv<T: ReportEntry>(entries: &[T]) -> Result<String, Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for entry in entries {
        writer
            .write_record([
                format_date(entry.due_date()).as_str(),
                entry.description(),
                entry.category_name().unwrap_or_default(),
                entry.kind().as_str(),
                entry.amount().to_string().replace('.', ",").as_str(),
                entry.status().as_str(),
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvError(error.to_string()))
}

/// The download name for the export of the month `date` is in, e.g. "report-2026-10.csv".
pub fn csv_filename(date: Date) -> String {
    format!("report-{:04}-{:02}.csv", date.year(), u8::from(date.month()))
}
