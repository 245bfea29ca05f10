//! Command-line parsing for the receipt analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the upload and aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "receipts", version, about = "Receipt Analyzer: upload receipts, chart spending by date")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload receipt files to the parsing service and print the itemization and chart.
    Upload(UploadArgs),
    /// Replay a saved records JSON file without contacting the service.
    Show(ShowArgs),
    /// Launch the interactive TUI.
    Tui(TuiArgs),
}

/// Endpoint selection shared by commands that talk to the service.
#[derive(Debug, Args, Clone)]
pub struct EndpointArgs {
    /// Upload endpoint URL (overrides RECEIPTS_ENDPOINT; default http://127.0.0.1:5000/upload).
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,
}

/// Terminal output options.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Disable the ASCII bar chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Bar chart width (columns).
    #[arg(long, default_value_t = 50)]
    pub width: usize,

    /// Export the date/total series to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct UploadArgs {
    /// Receipt images/documents to upload. When omitted, pick interactively.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub endpoint: EndpointArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Save the parsed records as JSON (replay later with `receipts show`).
    #[arg(long = "save-json", value_name = "JSON")]
    pub save_json: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// Records JSON written by `--save-json` (or a raw upload response).
    #[arg(long, value_name = "JSON")]
    pub json: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    /// Files to preselect. When omitted, receipt files under the current
    /// directory are preselected.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub endpoint: EndpointArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_accepts_multiple_files_and_flags() {
        let cli = Cli::parse_from([
            "receipts",
            "upload",
            "a.jpg",
            "b.png",
            "--endpoint",
            "http://localhost:9000/upload",
            "--no-plot",
            "--save-json",
            "out.json",
        ]);
        let Command::Upload(args) = cli.command else {
            panic!("expected upload");
        };
        assert_eq!(args.files, vec![PathBuf::from("a.jpg"), PathBuf::from("b.png")]);
        assert_eq!(args.endpoint.endpoint.as_deref(), Some("http://localhost:9000/upload"));
        assert!(args.output.no_plot);
        assert_eq!(args.output.width, 50);
        assert_eq!(args.save_json, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn show_requires_json() {
        assert!(Cli::try_parse_from(["receipts", "show"]).is_err());
        let cli = Cli::parse_from(["receipts", "show", "--json", "r.json", "--export-csv", "s.csv"]);
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.json, PathBuf::from("r.json"));
        assert_eq!(args.output.export_csv, Some(PathBuf::from("s.csv")));
    }
}
