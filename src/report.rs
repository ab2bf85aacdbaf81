use crate::data::{Frequency, TickerRecord};

#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub change: f64,
    pub cutoff: f64,
    pub record: TickerRecord,
}

pub fn stock_label(record: &TickerRecord) -> String {
    format!("{} {}", record.comment, record.ticker)
}

/// Digest line for one stock, or an empty string when it stayed within the cutoff.
pub fn entry_line(entry: &ReportEntry) -> String {
    if entry.change.abs() > entry.cutoff {
        format!("{} changed price by {:.2} %, \n", stock_label(&entry.record), entry.change)
    } else {
        String::new()
    }
}

/// Digest of every entry past its cutoff. Lines are concatenated without a
/// separator since each one already ends in `", \n"`.
pub fn change_report(entries: &[ReportEntry]) -> String {
    entries.iter().map(entry_line).collect()
}

pub fn all_stocks_report(records: &[TickerRecord]) -> String {
    records.iter().map(stock_label).collect::<Vec<_>>().join("\n")
}

pub fn change_subject(frequency: Frequency) -> String {
    format!("{} report for stocks", frequency)
}

pub const REMINDER_SUBJECT: &str = "Reminder for stocks";

pub fn mail_body(text: &str, token: &str) -> String {
    format!("{}\n use token {} to modify", text, token)
}
