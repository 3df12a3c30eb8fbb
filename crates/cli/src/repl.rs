//! Line-oriented interactive session.
//!
//! A bare line is submitted as a URL; lines starting with `/` drive the
//! results table. While a detail view is open the table is not redrawn.

use std::io::Write;

use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt, BufReader};
use urlsum_core::{
    ExtractClient, FormOutcome, Session, SortField, StatusFilter, SubmissionForm, TableRow, TableState,
    render_count_line, render_details, render_summary_line, render_table,
};

use crate::echo;

const HELP: &str = "\
Enter a URL to extract it, or one of:
  /search [TERM]     filter by title, summary or URL (no term clears)
  /filter STATUS     all, success or error
  /sort FIELD        title, timestamp or status (again to flip direction)
  /view N            open row N in the detail view
  /close             close the detail view
  /list              redraw the table
  /help              show this help
  /quit              leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Submit(String),
    Search(String),
    Filter(StatusFilter),
    Sort(SortField),
    View(usize),
    Close,
    List,
    Help,
    Quit,
    Nothing,
}

/// Parses one input line; errors are user-facing messages.
pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ReplCommand::Nothing);
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Ok(ReplCommand::Submit(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "search" => Ok(ReplCommand::Search(arg.to_string())),
        "filter" => arg.parse().map(ReplCommand::Filter),
        "sort" => arg.parse().map(ReplCommand::Sort),
        "view" => arg
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(ReplCommand::View)
            .ok_or_else(|| format!("Invalid row: {}", arg)),
        "close" => Ok(ReplCommand::Close),
        "list" => Ok(ReplCommand::List),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
        _ => Err(format!("Unknown command: /{}", name)),
    }
}

struct Repl {
    session: Session<ExtractClient>,
    form: SubmissionForm,
    table: TableState,
    plain: bool,
}

impl Repl {
    fn draw_table(&self) {
        let records = self.session.store().records();
        let visible = self.table.apply(records);

        if let Some(empty) = self.table.empty_state(records, visible.len()) {
            if self.plain {
                println!("{}", empty.message());
            } else {
                echo::print_empty_state(empty);
            }
            return;
        }

        let counts = self.session.store().counts();
        let now = OffsetDateTime::now_utc();
        let rows: Vec<TableRow> = visible.iter().map(|r| TableRow::from_record(r, now)).collect();

        if self.plain {
            println!("{}", render_summary_line(counts));
            println!("{}\n", render_count_line(visible.len(), records.len()));
            print!("{}", render_table(&rows));
        } else {
            echo::print_counts(counts, visible.len(), records.len());
            echo::print_table(&rows);
        }
    }

    fn redraw_unless_open(&self) {
        if self.table.selected().is_none() {
            self.draw_table();
        }
    }

    async fn submit(&mut self, input: String) {
        self.form.set_input(input);

        let busy = echo::watch_busy(self.form.loading_flag(), format!("Extracting {}", self.form.input().trim()));
        let outcome = self.form.submit(&mut self.session).await;
        busy.abort();

        match outcome {
            FormOutcome::Submitted(record) if record.is_success() => {
                echo::print_success(&format!("Extracted \"{}\"", record.title));
            }
            FormOutcome::Submitted(record) => {
                echo::print_error(&record.summary);
            }
            FormOutcome::Rejected(_) | FormOutcome::Failed => {
                if let Some(message) = self.form.error() {
                    echo::print_error(message);
                }
                return;
            }
        }

        self.redraw_unless_open();
    }

    fn view(&mut self, row: usize) {
        let records = self.session.store().records();
        let visible = self.table.apply(records);
        let Some(record) = visible.get(row - 1).copied() else {
            echo::print_warning(&format!("No row {} (showing {} rows)", row, visible.len()));
            return;
        };

        self.table.open_details(record);
        if let Some(selected) = self.table.selected() {
            if self.plain {
                print!("{}", render_details(selected));
            } else {
                echo::print_details(selected);
            }
        }
    }

    /// Handles one command; returns false when the session should end.
    async fn handle(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Submit(url) => self.submit(url).await,
            ReplCommand::Search(term) => {
                self.table.search = term;
                self.redraw_unless_open();
            }
            ReplCommand::Filter(filter) => {
                self.table.status_filter = filter;
                self.redraw_unless_open();
            }
            ReplCommand::Sort(field) => {
                self.table.toggle_sort(field);
                self.redraw_unless_open();
            }
            ReplCommand::View(row) => self.view(row),
            ReplCommand::Close => {
                self.table.close_details();
                self.draw_table();
            }
            ReplCommand::List => self.redraw_unless_open(),
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Quit => return false,
            ReplCommand::Nothing => {}
        }
        true
    }

    fn prompt(&self) {
        let marker = if self.table.selected().is_some() { "view" } else { "url" };
        print!("{}> ", marker);
        let _ = std::io::stdout().flush();
    }
}

/// Runs the session until `/quit` or end of input.
pub async fn run(session: Session<ExtractClient>, plain: bool) -> std::io::Result<()> {
    let mut repl = Repl { session, form: SubmissionForm::new(), table: TableState::new(), plain };

    if !plain {
        echo::print_banner();
    }
    println!("{}\n", HELP);
    repl.draw_table();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        repl.prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Ok(command) => {
                if !repl.handle(command).await {
                    break;
                }
            }
            Err(message) => echo::print_warning(&message),
        }
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_line_is_submission() {
        assert_eq!(
            parse_command("  https://example.com ").unwrap(),
            ReplCommand::Submit("https://example.com".to_string())
        );
        assert_eq!(parse_command("not a url").unwrap(), ReplCommand::Submit("not a url".to_string()));
    }

    #[test]
    fn test_blank_line_does_nothing() {
        assert_eq!(parse_command("   ").unwrap(), ReplCommand::Nothing);
    }

    #[test]
    fn test_table_commands() {
        assert_eq!(parse_command("/search rust lang").unwrap(), ReplCommand::Search("rust lang".to_string()));
        assert_eq!(parse_command("/search").unwrap(), ReplCommand::Search(String::new()));
        assert_eq!(parse_command("/filter error").unwrap(), ReplCommand::Filter(StatusFilter::Error));
        assert_eq!(parse_command("/sort title").unwrap(), ReplCommand::Sort(SortField::Title));
        assert_eq!(parse_command("/view 2").unwrap(), ReplCommand::View(2));
        assert_eq!(parse_command("/close").unwrap(), ReplCommand::Close);
        assert_eq!(parse_command("/q").unwrap(), ReplCommand::Quit);
    }

    #[test]
    fn test_bad_commands() {
        assert!(parse_command("/view 0").is_err());
        assert!(parse_command("/view two").is_err());
        assert!(parse_command("/filter pending").is_err());
        assert!(parse_command("/frobnicate").is_err());
    }
}
