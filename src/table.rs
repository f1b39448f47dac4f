//! table.rs — Queue-code resolution and the per-slot HTML schedule grid.

use crate::error::{ScheduleError, ScheduleResult};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

const GPV_PREFIX: &str = "GPV";

/// Cell classes the provider uses for a planned outage (full slot, first or second half).
pub const DEFAULT_OFF_MARKERS: [&str; 3] = ["cell-scheduled", "cell-first-half", "cell-second-half"];

/// Body of the provider's address lookup, which answers with JSON or with a bare HTML/text blob.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueReply {
    Json(Value),
    Text(String),
}

/// Extracts the GPV queue code from an address lookup reply.
///
/// JSON replies carry it in the first entry of `data` under `sub_type_reason[0]`;
/// text replies are searched for the first `GPV<n>[.<m>]` token.
pub fn parse_queue_code(reply: &QueueReply) -> Option<String> {
    match reply {
        QueueReply::Json(payload) => {
            let first = payload.get("data")?.as_object()?.values().next()?;
            let code = first.get("sub_type_reason")?.as_array()?.first()?;
            Some(match code {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        }
        QueueReply::Text(text) => find_gpv_token(text),
    }
}

fn leading_digits(s: &str) -> &str {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    &s[..end]
}

fn find_gpv_token(text: &str) -> Option<String> {
    text.match_indices(GPV_PREFIX).find_map(|(at, _)| {
        let rest = &text[at + GPV_PREFIX.len()..];
        let main = leading_digits(rest);
        if main.is_empty() {
            return None;
        }
        let mut code = format!("{GPV_PREFIX}{main}");
        if let Some(tail) = rest[main.len()..].strip_prefix('.') {
            let sub = leading_digits(tail);
            if !sub.is_empty() {
                code.push('.');
                code.push_str(sub);
            }
        }
        Some(code)
    })
}

/// Value of the `gpv` query parameter for a queue code (`GPV4.1` → `4.1`).
pub fn gpv_query_value(queue_code: &str) -> String {
    queue_code.replace(GPV_PREFIX, "")
}

/// First `<digits>[.<digits>]` token of a row label or queue code:
/// `GPV4.1`, `Черга 4.1 (з 10:00)` → `4.1`. Empty when the label has no digits.
fn normalize_queue(label: &str) -> String {
    let Some(at) = label.find(|c: char| c.is_ascii_digit()) else {
        return String::new();
    };
    let rest = &label[at..];
    let main = leading_digits(rest);
    let mut token = main.to_owned();
    if let Some(tail) = rest[main.len()..].strip_prefix('.') {
        let sub = leading_digits(tail);
        if !sub.is_empty() {
            token.push('.');
            token.push_str(sub);
        }
    }
    token
}

fn selector(css: &str) -> ScheduleResult<Selector> {
    Selector::parse(css).map_err(|e| ScheduleError::SourceFormat(format!("selector '{css}': {e}")))
}

fn cell_is_off(cell: &ElementRef<'_>, markers: &[String]) -> bool {
    cell.value().classes().any(|class| markers.iter().any(|m| m == class))
}

/// Reads the outage flags of `queue_code`'s row.
///
/// The row is the one whose first cell names the queue; every following cell is one
/// slot of the day, off when it carries any of `markers`.
pub fn parse_slot_flags(html: &str, queue_code: &str, markers: &[String]) -> ScheduleResult<Vec<bool>> {
    let document = Html::parse_document(html);
    let tables = selector("table")?;
    let rows = selector("tr")?;
    let cells = selector("td, th")?;

    if document.select(&tables).next().is_none() {
        return Err(ScheduleError::SourceFormat("schedule table".into()));
    }

    let wanted = normalize_queue(queue_code);
    for row in document.select(&rows) {
        let mut row_cells = row.select(&cells);
        let Some(label) = row_cells.next() else {
            continue;
        };
        if normalize_queue(&label.text().collect::<String>()) != wanted {
            continue;
        }
        let flags: Vec<bool> = row_cells.map(|cell| cell_is_off(&cell, markers)).collect();
        if flags.is_empty() {
            return Err(ScheduleError::SourceFormat(format!("slot cells for queue {queue_code}")));
        }
        return Ok(flags);
    }

    Err(ScheduleError::Resolution(format!("queue {queue_code} in schedule table")))
}
