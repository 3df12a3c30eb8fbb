//! Text rendering for the results table and the detail view.
//!
//! Table cells are truncated to fixed character budgets; the detail view
//! always shows the full record.

use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::record::ExtractionRecord;
use crate::store::StatusCounts;
use crate::{Result, UrlsumError};

pub const TITLE_BUDGET: usize = 50;
pub const SUMMARY_BUDGET: usize = 70;
pub const KEY_POINT_BUDGET: usize = 40;
pub const URL_BUDGET: usize = 25;

/// Key points shown per row before collapsing into "+N more".
pub const VISIBLE_KEY_POINTS: usize = 3;

const ELLIPSIS: &str = "...";

/// Cuts `text` to `max` characters, marking the cut with "...".
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Long-form timestamp, e.g. "Mar 4, 2025, 5:06 AM".
pub fn format_date(timestamp: OffsetDateTime) -> String {
    let format = format_description!(
        "[month repr:short] [day padding:none], [year], [hour repr:12 padding:none]:[minute] [period]"
    );
    timestamp.format(&format).unwrap_or_else(|_| timestamp.to_string())
}

/// Age of `timestamp` relative to `now`, falling back to the date after a week.
pub fn relative_time(timestamp: OffsetDateTime, now: OffsetDateTime) -> String {
    let secs = (now - timestamp).whole_seconds();

    if secs < 60 {
        return "just now".to_string();
    }

    let (count, unit) = if secs < 3_600 {
        (secs / 60, "minute")
    } else if secs < 86_400 {
        (secs / 3_600, "hour")
    } else if secs < 7 * 86_400 {
        (secs / 86_400, "day")
    } else {
        return format_date(timestamp);
    };

    if count == 1 { format!("1 {} ago", unit) } else { format!("{} {}s ago", count, unit) }
}

/// One table row with every cell already truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub title: String,
    pub summary: String,
    /// Up to [`VISIBLE_KEY_POINTS`] truncated key points.
    pub key_points: Vec<String>,
    /// "+N more" when key points were collapsed.
    pub more: Option<String>,
    pub url: String,
    pub status: &'static str,
    pub when: String,
}

impl TableRow {
    pub fn from_record(record: &ExtractionRecord, now: OffsetDateTime) -> Self {
        let key_points = record
            .key_points
            .iter()
            .take(VISIBLE_KEY_POINTS)
            .map(|p| truncate_text(p, KEY_POINT_BUDGET))
            .collect();

        let hidden = record.key_points.len().saturating_sub(VISIBLE_KEY_POINTS);
        let more = (hidden > 0).then(|| format!("+{} more", hidden));

        Self {
            title: truncate_text(&record.title, TITLE_BUDGET),
            summary: truncate_text(&record.summary, SUMMARY_BUDGET),
            key_points,
            more,
            url: truncate_text(&record.url, URL_BUDGET),
            status: record.status.as_str(),
            when: relative_time(record.timestamp, now),
        }
    }
}

/// Plain-text table, one numbered block per row.
pub fn render_table(rows: &[TableRow]) -> String {
    let mut out = String::new();

    for (index, row) in rows.iter().enumerate() {
        out.push_str(&format!("{:>3}. {}  [{}]  {}\n", index + 1, row.title, row.status, row.when));
        out.push_str(&format!("     {}\n", row.summary));

        if row.key_points.is_empty() {
            out.push_str("     No key points\n");
        } else {
            for point in &row.key_points {
                out.push_str(&format!("     - {}\n", point));
            }
        }
        if let Some(more) = &row.more {
            out.push_str(&format!("     {}\n", more));
        }

        out.push_str(&format!("     {}\n", row.url));
    }

    out
}

/// Untruncated view of a single record.
pub fn render_details(record: &ExtractionRecord) -> String {
    let mut out = String::new();

    out.push_str(&record.title);
    out.push('\n');
    out.push_str(&"=".repeat(record.title.chars().count().max(1)));
    out.push('\n');
    out.push_str(&format!("Date: {} | Status: {}\n\n", format_date(record.timestamp), record.status));

    out.push_str("URL\n");
    out.push_str(&record.url);
    out.push_str("\n\n");

    out.push_str("Summary\n");
    out.push_str(&record.summary);
    out.push_str("\n\n");

    out.push_str("Key Points\n");
    if record.key_points.is_empty() {
        out.push_str("No key points available\n");
    } else {
        for point in &record.key_points {
            out.push_str(&format!("- {}\n", point));
        }
    }

    out
}

/// "N successful, M failed" over the whole history.
pub fn render_summary_line(counts: StatusCounts) -> String {
    format!("{} successful, {} failed", counts.success, counts.error)
}

/// "Showing X of Y results".
pub fn render_count_line(visible: usize, total: usize) -> String {
    format!("Showing {} of {} results", visible, total)
}

#[derive(Serialize)]
struct JsonListing<'a> {
    total: usize,
    counts: StatusCounts,
    records: &'a [&'a ExtractionRecord],
}

/// JSON document of the visible records plus history totals.
pub fn render_json(records: &[&ExtractionRecord], total: usize, counts: StatusCounts, pretty: bool) -> Result<String> {
    let listing = JsonListing { total, counts, records };

    let json = if pretty { serde_json::to_string_pretty(&listing) } else { serde_json::to_string(&listing) };
    json.map_err(UrlsumError::from)
}
