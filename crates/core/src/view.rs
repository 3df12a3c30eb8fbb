//! Results table state: search, status filter, sort order and the detail view.
//!
//! [`TableState`] never owns records. [`TableState::apply`] derives the
//! visible rows from whatever history it is given.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::record::{ExtractionRecord, Status};

/// Status filter applied on top of the search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Success,
    Error,
}

impl StatusFilter {
    fn matches(&self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Success => status == Status::Success,
            StatusFilter::Error => status == Status::Error,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "success" | "ok" => Ok(Self::Success),
            "error" | "failed" => Ok(Self::Error),
            _ => Err(format!("Invalid status: {}. Valid options: all, success, error", s)),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusFilter::All => "all",
            StatusFilter::Success => "success",
            StatusFilter::Error => "error",
        })
    }
}

/// Sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Title,
    #[default]
    Timestamp,
    Status,
}

impl SortField {
    fn compare(&self, a: &ExtractionRecord, b: &ExtractionRecord) -> Ordering {
        match self {
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "timestamp" | "time" | "date" => Ok(Self::Timestamp),
            "status" => Ok(Self::Status),
            _ => Err(format!("Invalid sort field: {}. Valid options: title, timestamp, status", s)),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortField::Title => "title",
            SortField::Timestamp => "timestamp",
            SortField::Status => "status",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            _ => Err(format!("Invalid direction: {}. Valid options: asc, desc", s)),
        }
    }
}

/// Why the table has no rows to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// Nothing has been extracted yet.
    NoContent,
    /// History exists but the search and filter exclude all of it.
    NoMatches,
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::NoContent => "No content extracted yet",
            EmptyState::NoMatches => "No results match your search criteria",
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            EmptyState::NoContent => Some("Start by entering a URL above to extract content"),
            EmptyState::NoMatches => None,
        }
    }
}

/// Search, filter, sort and selection state of the results table.
#[derive(Debug, Clone, Default)]
pub struct TableState {
    pub search: String,
    pub status_filter: StatusFilter,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    selected: Option<ExtractionRecord>,
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters and sorts `records` into the visible rows.
    ///
    /// Search is a case-insensitive substring match on title, summary and
    /// URL. Rows with equal sort keys keep their history order.
    pub fn apply<'a>(&self, records: &'a [ExtractionRecord]) -> Vec<&'a ExtractionRecord> {
        let needle = self.search.to_lowercase();

        let mut visible: Vec<&ExtractionRecord> = records
            .iter()
            .filter(|r| self.status_filter.matches(r.status))
            .filter(|r| needle.is_empty() || matches_search(r, &needle))
            .collect();

        visible.sort_by(|a, b| {
            let ord = self.sort_field.compare(a, b);
            match self.sort_direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });

        visible
    }

    /// Sorts by `field`: the same field flips direction, a new one starts descending.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Descending;
        }
    }

    pub fn open_details(&mut self, record: &ExtractionRecord) {
        self.selected = Some(record.clone());
    }

    pub fn close_details(&mut self) {
        self.selected = None;
    }

    /// The record shown in the detail view, if open.
    pub fn selected(&self) -> Option<&ExtractionRecord> {
        self.selected.as_ref()
    }

    /// Empty-state to show, given the full history and the visible row count.
    pub fn empty_state(&self, records: &[ExtractionRecord], visible: usize) -> Option<EmptyState> {
        if records.is_empty() {
            Some(EmptyState::NoContent)
        } else if visible == 0 {
            Some(EmptyState::NoMatches)
        } else {
            None
        }
    }
}

fn matches_search(record: &ExtractionRecord, needle: &str) -> bool {
    record.title.to_lowercase().contains(needle)
        || record.summary.to_lowercase().contains(needle)
        || record.url.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::Duration;
    use time::macros::datetime;

    fn record(title: &str, summary: &str, url: &str, minutes: i64) -> ExtractionRecord {
        ExtractionRecord::success(
            title,
            summary,
            vec![],
            url,
            datetime!(2025-01-01 12:00 UTC) + Duration::minutes(minutes),
        )
    }

    fn history() -> Vec<ExtractionRecord> {
        vec![
            record("beta", "Rust release notes", "https://b.example", 2),
            ExtractionRecord::failure("https://err.example", "fetch failed", datetime!(2025-01-01 12:01 UTC)),
            record("Alpha", "A simple page", "https://a.example", 0),
        ]
    }

    fn titles(rows: &[&ExtractionRecord]) -> Vec<String> {
        rows.iter().map(|r| r.title.clone()).collect()
    }

    #[test]
    fn test_default_sort_newest_first() {
        let records = vec![record("old", "", "u", 0), record("new", "", "u", 5)];
        let state = TableState::new();
        assert_eq!(titles(&state.apply(&records)), vec!["new", "old"]);
    }

    #[test]
    fn test_toggle_same_field_reverses() {
        let records = vec![record("old", "", "u", 0), record("new", "", "u", 5)];
        let mut state = TableState::new();
        state.toggle_sort(SortField::Timestamp);
        assert_eq!(state.sort_direction, SortDirection::Ascending);
        assert_eq!(titles(&state.apply(&records)), vec!["old", "new"]);
    }

    #[test]
    fn test_new_field_resets_to_descending() {
        let mut state = TableState::new();
        state.toggle_sort(SortField::Timestamp);
        state.toggle_sort(SortField::Title);
        assert_eq!(state.sort_field, SortField::Title);
        assert_eq!(state.sort_direction, SortDirection::Descending);
    }

    #[test]
    fn test_title_sort_is_case_insensitive() {
        let records = history();
        let mut state = TableState::new();
        state.sort_field = SortField::Title;
        state.sort_direction = SortDirection::Ascending;
        assert_eq!(titles(&state.apply(&records)), vec!["Alpha", "beta", "Error"]);
    }

    #[test]
    fn test_status_sort() {
        let records = history();
        let mut state = TableState::new();
        state.sort_field = SortField::Status;
        state.sort_direction = SortDirection::Ascending;
        let rows = state.apply(&records);
        assert_eq!(rows[0].status, Status::Error);
        assert_eq!(titles(&rows[1..]), vec!["beta", "Alpha"]);
    }

    #[rstest]
    #[case("simple", vec!["Alpha"])]
    #[case("SIMPLE", vec!["Alpha"])]
    #[case("b.example", vec!["beta"])]
    #[case("fetch", vec!["Error"])]
    #[case("example", vec!["beta", "Error", "Alpha"])]
    #[case("nothing here", vec![])]
    fn test_search(#[case] term: &str, #[case] expected: Vec<&str>) {
        let records = history();
        let state = TableState { search: term.to_string(), ..Default::default() };
        assert_eq!(titles(&state.apply(&records)), expected);
    }

    #[test]
    fn test_status_filter() {
        let records = history();
        let state = TableState { status_filter: StatusFilter::Error, ..Default::default() };
        let rows = state.apply(&records);
        assert_eq!(rows.len(), 1);
        assert!(rows.iter().all(|r| r.status == Status::Error));
    }

    #[test]
    fn test_empty_states_are_distinct() {
        let state = TableState { search: "zzz".to_string(), ..Default::default() };
        assert_eq!(state.empty_state(&[], 0), Some(EmptyState::NoContent));

        let records = history();
        let visible = state.apply(&records).len();
        assert_eq!(state.empty_state(&records, visible), Some(EmptyState::NoMatches));
        assert_eq!(TableState::new().empty_state(&records, 3), None);
    }

    #[test]
    fn test_detail_view_open_and_close() {
        let records = history();
        let mut state = TableState::new();
        assert!(state.selected().is_none());

        state.open_details(&records[0]);
        assert_eq!(state.selected().unwrap().title, "beta");

        state.search = "other".to_string();
        assert!(state.selected().is_some());

        state.close_details();
        assert!(state.selected().is_none());
    }

    #[test]
    fn test_equal_keys_keep_history_order() {
        let records = vec![record("first", "", "u", 0), record("second", "", "u", 0)];
        let state = TableState::new();
        assert_eq!(titles(&state.apply(&records)), vec!["first", "second"]);
    }

    #[rstest]
    #[case("ALL", StatusFilter::All)]
    #[case("success", StatusFilter::Success)]
    #[case("error", StatusFilter::Error)]
    fn test_status_filter_from_str(#[case] input: &str, #[case] expected: StatusFilter) {
        assert_eq!(input.parse::<StatusFilter>().unwrap(), expected);
    }

    #[test]
    fn test_parse_errors() {
        assert!("pending".parse::<StatusFilter>().is_err());
        assert!("url".parse::<SortField>().is_err());
        assert!("up".parse::<SortDirection>().is_err());
    }
}
