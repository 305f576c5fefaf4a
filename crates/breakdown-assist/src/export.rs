//! Export rendering: filtered CSV and printable text cards.
//!
//! Both renderings share the record's fixed column schema. Cards are laid
//! onto fixed-height pages with a simple line cursor; a page breaks whenever
//! vertical space runs out, mid-card if necessary, the way the original
//! printout flowed.

use crate::record::{format_timestamp, BreakdownRecord, COLUMNS};

/// Default number of text lines per card page.
pub const DEFAULT_PAGE_LINES: usize = 48;

/// Render records as CSV with the fixed column header.
///
/// Fields containing commas, quotes, or line breaks are quoted; quotes are
/// doubled. Output is UTF-8 with `\n` line endings.
#[must_use]
pub fn to_csv(records: &[BreakdownRecord]) -> String {
    let mut out = String::new();
    out.push_str(&COLUMNS.join(","));
    out.push('\n');
    for record in records {
        let cells: Vec<String> = record.to_row().iter().map(|cell| escape_csv(cell)).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

/// Escape one CSV field.
fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render one record as a printable card, one field per line.
#[must_use]
pub fn card_lines(record: &BreakdownRecord) -> Vec<String> {
    vec![
        format!("Booking ID: {}", record.booking_id),
        format!("Customer: {}", record.customer_name),
        format!("Mobile: {}", record.customer_mobile),
        format!(
            "Vehicle: {} ({})",
            record.vehicle_model, record.vehicle_number
        ),
        format!("Pickup: {}", record.pickup_location),
        format!("Issue: {}", record.issue),
        format!("Priority: {}", record.priority),
        format!("Status: {}", record.status),
        format!("Added By: {}", record.added_by),
        format!("Resolved By: {}", record.resolved_by),
        format!(
            "Created: {}",
            record.created_at.map(format_timestamp).unwrap_or_default()
        ),
        format!(
            "Resolved: {}",
            record.resolved_at.map(format_timestamp).unwrap_or_default()
        ),
    ]
}

/// Lay cards onto fixed-height pages.
///
/// Cards are separated by one blank line and flow line by line; when a page
/// runs out of space the current card continues on the next page. Each
/// returned string is one full page. `lines_per_page` is clamped to at
/// least 1.
#[must_use]
pub fn paginate_cards(records: &[BreakdownRecord], lines_per_page: usize) -> Vec<String> {
    let lines_per_page = lines_per_page.max(1);
    let mut pages: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for (i, record) in records.iter().enumerate() {
        // Blank separator between cards, skipped at the top of a page.
        if i > 0 && !current.is_empty() && current.len() < lines_per_page {
            current.push(String::new());
        }
        for line in card_lines(record) {
            if current.len() == lines_per_page {
                pages.push(current.join("\n"));
                current.clear();
            }
            current.push(line);
        }
    }
    if !current.is_empty() {
        pages.push(current.join("\n"));
    }
    pages
}
