use std::{env, fs, path::PathBuf};

fn view_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(clap::arg!(-s --search <TERM> "Case-insensitive search over title, summary and URL"))
        .arg(
            clap::arg!(--status <STATUS> "Status filter")
                .default_value("all")
                .value_parser(["all", "success", "error"]),
        )
        .arg(
            clap::arg!(--sort <FIELD> "Sort field")
                .default_value("timestamp")
                .value_parser(["title", "timestamp", "status"]),
        )
        .arg(
            clap::arg!(--direction <DIR> "Sort direction")
                .default_value("desc")
                .value_parser(["asc", "desc"]),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("urlsum")
        .version(env!("CARGO_PKG_VERSION"))
        .author("urlsum Contributors")
        .about("Extract and summarize content from any public URL")
        .arg(clap::arg!(--"base-url" <URL> "Extraction service base URL").global(true))
        .arg(
            clap::arg!(--"data-dir" <DIR> "Directory holding the saved history")
                .global(true)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").global(true))
        .arg(clap::arg!(--"no-persist" "Keep new records for this run only").global(true))
        .arg(clap::arg!(--plain "Disable colors and decorations").global(true))
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .subcommand(clap::Command::new("extract").about("Extract a summary for URL").arg(clap::arg!(<URL> "URL to extract")))
        .subcommand(
            view_args(clap::Command::new("list").about("List the history as a table")).arg(
                clap::arg!(-f --format <FORMAT> "Output format")
                    .default_value("table")
                    .value_parser(["table", "json"]),
            ),
        )
        .subcommand(
            view_args(clap::Command::new("show").about("Show the full record at row N"))
                .arg(clap::arg!(<N> "1-based row number")),
        )
        .subcommand(clap::Command::new("clear").about("Delete the saved history"))
        .subcommand(clap::Command::new("interactive").about("Interactive session"))
        .subcommand(
            clap::Command::new("completions")
                .about("Generate shell completion script")
                .arg(clap::arg!(<SHELL> "Shell").value_parser(["bash", "zsh", "fish", "powershell", "elvish"])),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "urlsum", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "urlsum", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "urlsum", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "urlsum", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
