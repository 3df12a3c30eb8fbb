use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use time::OffsetDateTime;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use urlsum_core::{
    ExtractClient, ExtractionRecord, FormOutcome, LocalStorage, PersistMode, RecordStore, Session, Settings,
    SortDirection, SortField, StatusFilter, SubmissionForm, TableRow, TableState, render_count_line,
    render_details, render_json, render_summary_line, render_table,
};

mod echo;
mod repl;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListFormat {
    Table,
    Json,
}

impl FromStr for ListFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: table, json", s)),
        }
    }
}

/// Submit URLs to an AI extraction service and browse the summaries
#[derive(Parser, Debug)]
#[command(name = "urlsum")]
#[command(author = "urlsum Contributors")]
#[command(version = VERSION)]
#[command(about = "Extract and summarize content from any public URL", long_about = None)]
struct Cli {
    /// Extraction service base URL (default: $URLSUM_BASE_URL or http://localhost:8000)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Directory holding the saved history (default: $URLSUM_DATA_DIR or the platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// HTTP timeout in seconds (default: wait indefinitely)
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Keep new records for this run only instead of saving them
    #[arg(long, global = true)]
    no_persist: bool,

    /// Disable colors and decorations
    #[arg(long, global = true)]
    plain: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a summary for URL and add it to the history
    Extract {
        #[arg(value_name = "URL")]
        url: String,
    },
    /// List the history as a table
    List {
        #[command(flatten)]
        view: ViewArgs,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table", value_name = "FORMAT")]
        format: ListFormat,
    },
    /// Show the full record at row N of the listing
    Show {
        /// 1-based row number, as printed by `list`
        #[arg(value_name = "N")]
        index: usize,

        #[command(flatten)]
        view: ViewArgs,
    },
    /// Delete the saved history
    Clear,
    /// Interactive session: submit URLs and browse results
    Interactive,
    /// Generate shell completion script
    Completions {
        #[arg(value_name = "SHELL")]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct ViewArgs {
    /// Case-insensitive search over title, summary and URL
    #[arg(short, long, value_name = "TERM")]
    search: Option<String>,

    /// Status filter (all, success, error)
    #[arg(long, default_value = "all", value_name = "STATUS")]
    status: StatusFilter,

    /// Sort field (title, timestamp, status)
    #[arg(long, default_value = "timestamp", value_name = "FIELD")]
    sort: SortField,

    /// Sort direction (asc, desc)
    #[arg(long, default_value = "desc", value_name = "DIR")]
    direction: SortDirection,
}

impl ViewArgs {
    fn table_state(&self) -> TableState {
        let mut state = TableState::default();
        state.search = self.search.clone().unwrap_or_default();
        state.status_filter = self.status;
        state.sort_field = self.sort;
        state.sort_direction = self.direction;
        state
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "urlsum=debug,urlsum_core=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Environment settings with command-line overrides applied
fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::from_env().context("Failed to load configuration")?;

    if let Some(base_url) = &cli.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    if cli.timeout.is_some() {
        settings.timeout = cli.timeout;
    }
    if cli.no_persist {
        settings.persist = PersistMode::ReadOnly;
    }

    tracing::debug!(?settings, "settings loaded");
    Ok(settings)
}

fn open_store(settings: &Settings) -> RecordStore {
    RecordStore::restore(LocalStorage::new(&settings.data_dir))
}

fn open_session(settings: &Settings) -> anyhow::Result<Session<ExtractClient>> {
    let client = ExtractClient::new(&settings.client_config()).context("Failed to create HTTP client")?;
    Ok(Session::new(client, open_store(settings), settings.persist))
}

fn print_record(record: &ExtractionRecord, plain: bool) {
    if plain {
        print!("{}", render_details(record));
    } else {
        echo::print_details(record);
    }
}

async fn run_extract(cli: &Cli, settings: &Settings, url: &str) -> anyhow::Result<ExitCode> {
    let mut session = open_session(settings)?;
    let mut form = SubmissionForm::new();
    form.set_input(url);

    if cli.verbose {
        echo::print_banner();
    }

    let busy = echo::watch_busy(form.loading_flag(), format!("Extracting {}", url.trim()));
    let outcome = form.submit(&mut session).await;
    busy.abort();

    match outcome {
        FormOutcome::Rejected(e) => {
            echo::print_error(&e.to_string());
            Ok(ExitCode::FAILURE)
        }
        FormOutcome::Failed => {
            echo::print_error(form.error().unwrap_or(urlsum_core::RETRY_MESSAGE));
            Ok(ExitCode::FAILURE)
        }
        FormOutcome::Submitted(record) => {
            print_record(&record, cli.plain);
            if record.is_success() {
                if session.persist_mode() == PersistMode::OnWrite {
                    echo::print_success(&format!("Saved to {}", settings.data_dir.display()));
                }
                Ok(ExitCode::SUCCESS)
            } else {
                echo::print_error(record.error.as_deref().unwrap_or(&record.summary));
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn run_list(cli: &Cli, settings: &Settings, view: &ViewArgs, format: ListFormat) -> anyhow::Result<ExitCode> {
    let store = open_store(settings);
    let state = view.table_state();
    let visible = state.apply(store.records());

    if format == ListFormat::Json {
        let json = render_json(&visible, store.len(), store.counts(), !cli.plain).context("Failed to render JSON")?;
        println!("{}", json);
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(empty) = state.empty_state(store.records(), visible.len()) {
        if !store.is_empty() {
            print_header(cli.plain, &store, visible.len());
        }
        if cli.plain {
            println!("{}", empty.message());
        } else {
            echo::print_empty_state(empty);
        }
        return Ok(ExitCode::SUCCESS);
    }

    print_header(cli.plain, &store, visible.len());

    let now = OffsetDateTime::now_utc();
    let rows: Vec<TableRow> = visible.iter().map(|r| TableRow::from_record(r, now)).collect();
    if cli.plain {
        print!("{}", render_table(&rows));
    } else {
        echo::print_table(&rows);
    }

    Ok(ExitCode::SUCCESS)
}

fn print_header(plain: bool, store: &RecordStore, visible: usize) {
    if plain {
        println!("{}", render_summary_line(store.counts()));
        println!("{}\n", render_count_line(visible, store.len()));
    } else {
        echo::print_counts(store.counts(), visible, store.len());
    }
}

fn run_show(cli: &Cli, settings: &Settings, index: usize, view: &ViewArgs) -> anyhow::Result<ExitCode> {
    let store = open_store(settings);
    let mut state = view.table_state();
    let visible = state.apply(store.records());

    let Some(record) = index.checked_sub(1).and_then(|i| visible.get(i).copied()) else {
        anyhow::bail!("No row {} (the listing has {} rows)", index, visible.len());
    };

    state.open_details(record);
    if let Some(selected) = state.selected() {
        print_record(selected, cli.plain);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_clear(settings: &Settings) -> anyhow::Result<ExitCode> {
    let mut store = open_store(settings);
    let count = store.len();
    store.clear().context("Failed to clear history")?;
    echo::print_success(&format!("Removed {} records", count));
    Ok(ExitCode::SUCCESS)
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if let Command::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "urlsum", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let settings = load_settings(&cli)?;

    if cli.verbose {
        echo::print_info(&format!("Service: {}", settings.base_url));
        echo::print_info(&format!("History: {}", settings.data_dir.display()));
    }

    match &cli.command {
        Command::Extract { url } => run_extract(&cli, &settings, url).await,
        Command::List { view, format } => run_list(&cli, &settings, view, *format),
        Command::Show { index, view } => run_show(&cli, &settings, *index, view),
        Command::Clear => run_clear(&settings),
        Command::Interactive => {
            let session = open_session(&settings)?;
            repl::run(session, cli.plain).await.context("Interactive session failed")?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Completions { .. } => Ok(ExitCode::SUCCESS),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            echo::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_format_from_str() {
        assert_eq!("JSON".parse::<ListFormat>().unwrap(), ListFormat::Json);
        assert!("xml".parse::<ListFormat>().is_err());
    }

    #[test]
    fn test_view_args_defaults() {
        let cli = Cli::try_parse_from(["urlsum", "list"]).unwrap();
        let Command::List { view, format } = cli.command else {
            panic!("expected list");
        };
        let state = view.table_state();
        assert_eq!(format, ListFormat::Table);
        assert_eq!(state.sort_field, SortField::Timestamp);
        assert_eq!(state.sort_direction, SortDirection::Descending);
        assert_eq!(state.status_filter, StatusFilter::All);
    }
}
