use std::time::Duration;

use owo_colors::OwoColorize;
use tokio::task::JoinHandle;
use urlsum_core::{EmptyState, ExtractionRecord, LoadingFlag, Status, StatusCounts, TableRow, format_date};

use crate::VERSION;

/// Print a styled banner for verbose and interactive mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "urlsum".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Extract and summarize content from any public URL\n".dimmed());
}

/// Print a styled step message
pub fn print_step(message: &str) {
    eprintln!("{} {}", "…".dimmed(), message.bright_cyan());
}

/// Print `message` as a step once `flag` reports a request in flight.
///
/// Abort the returned task when the request is done.
pub fn watch_busy(flag: LoadingFlag, message: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        while !flag.is_set() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        print_step(&message);
    })
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

fn status_badge(status: &str) -> String {
    if status == Status::Success.as_str() {
        format!("[{}]", status.green())
    } else {
        format!("[{}]", status.red())
    }
}

/// Print the "N successful, M failed" and "Showing X of Y" header lines
pub fn print_counts(counts: StatusCounts, visible: usize, total: usize) {
    println!(
        "{} {}, {} {}",
        counts.success.to_string().bright_green(),
        "successful".dimmed(),
        counts.error.to_string().bright_red(),
        "failed".dimmed()
    );
    println!("{}", urlsum_core::render_count_line(visible, total).dimmed());
    println!();
}

/// Print table rows with colored status badges
pub fn print_table(rows: &[TableRow]) {
    for (index, row) in rows.iter().enumerate() {
        println!(
            "{} {}  {}  {}",
            format!("{:>3}.", index + 1).dimmed(),
            row.title.bold(),
            status_badge(row.status),
            row.when.dimmed()
        );
        println!("     {}", row.summary);

        if row.key_points.is_empty() {
            println!("     {}", "No key points".dimmed());
        } else {
            for point in &row.key_points {
                println!("     {} {}", "•".dimmed(), point);
            }
        }
        if let Some(more) = &row.more {
            println!("     {}", more.dimmed());
        }

        println!("     {}", row.url.bright_blue().underline());
    }
}

/// Print the empty-state message
pub fn print_empty_state(state: EmptyState) {
    println!("{}", state.message().bold());
    if let Some(hint) = state.hint() {
        println!("{}", hint.dimmed());
    }
}

/// Print the full detail view for a record
pub fn print_details(record: &ExtractionRecord) {
    println!("\n{}", "═".repeat(60).dimmed());
    println!("{}", "Content Details".bold().cyan());
    println!("{}", "═".repeat(60).dimmed());

    println!("{}", record.title.bold());
    println!(
        "  {} {}  {}",
        "Date:".dimmed(),
        format_date(record.timestamp).bright_white(),
        status_badge(record.status.as_str())
    );

    println!("\n{}", "URL".bold());
    println!("  {}", record.url.bright_blue().underline());

    println!("\n{}", "Summary".bold());
    println!("  {}", record.summary);

    println!("\n{}", "Key Points".bold());
    if record.key_points.is_empty() {
        println!("  {}", "No key points available".dimmed());
    } else {
        for point in &record.key_points {
            println!("  {} {}", "•".dimmed(), point);
        }
    }
    println!();
}
