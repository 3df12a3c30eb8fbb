pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod record;
pub mod render;
pub mod session;
pub mod store;
pub mod validate;
pub mod view;

pub use client::{ClientConfig, DEFAULT_BASE_URL, ExtractClient, Extractor, endpoint_for};
pub use config::{Settings, default_data_dir};
pub use error::{Result, UrlsumError, ValidationError};
pub use form::{FormOutcome, LoadingFlag, RETRY_MESSAGE, Submit, SubmissionForm};
pub use record::{ERROR_TITLE, ExtractionRecord, Status};
pub use render::{
    TableRow, format_date, relative_time, render_count_line, render_details, render_json, render_summary_line,
    render_table, truncate_text,
};
pub use session::Session;
pub use store::{LocalStorage, PersistMode, RecordStore, STORAGE_KEY, StatusCounts};
pub use validate::validate_url;
pub use view::{EmptyState, SortDirection, SortField, StatusFilter, TableState};
