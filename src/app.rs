//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - parses CLI arguments
//! - uploads receipts (or replays a saved file)
//! - prints the itemization and spending chart
//! - writes optional exports

use clap::Parser;
use log::info;

use crate::cli::{Command, OutputArgs, ShowArgs, TuiArgs, UploadArgs};
use crate::error::AppError;
use crate::upload::UploadClient;

pub mod pipeline;

use pipeline::RunOutput;

/// Entry point for the `receipts` binary.
pub fn run() -> Result<(), AppError> {
    // We want `receipts` and `receipts a.jpg b.jpg` to work without a
    // subcommand; rewrite argv before clap sees it.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal, so stderr logging stays off there unless
    // RUST_LOG asks for it.
    let default_filter = match cli.command {
        Command::Tui(_) => "off",
        _ => "warn",
    };
    init_logging(default_filter);

    match cli.command {
        Command::Upload(args) => handle_upload(args),
        Command::Show(args) => handle_show(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn init_logging(default_filter: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).try_init();
}

fn handle_upload(args: UploadArgs) -> Result<(), AppError> {
    let client = UploadClient::from_env(args.endpoint.endpoint.as_deref())?;

    let files = if args.files.is_empty() {
        crate::cli::picker::prompt_for_receipts()?
    } else {
        args.files
    };

    // Failures are logged by the view state and propagated; nothing is printed
    // from a partial result.
    let mut state = crate::state::ViewState::new();
    state.select_files(files);
    let result = client.upload(state.selected_files());
    state.apply_upload(result)?;

    let run = RunOutput {
        records: state.records().to_vec(),
        aggregation: state.aggregation().cloned().unwrap_or_default(),
    };

    if let Some(path) = &args.save_json {
        crate::io::write_records_json(path, &run.records)?;
        info!("saved {} record(s) to {}", run.records.len(), path.display());
    }

    print_run(&run, &args.output)
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let run = pipeline::run_saved(&args.json)?;
    print_run(&run, &args.output)
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

fn print_run(run: &RunOutput, output: &OutputArgs) -> Result<(), AppError> {
    println!("{}", crate::report::format_receipts(&run.records));

    let series = &run.aggregation.series;
    if !series.is_empty() {
        println!("{}", crate::report::format_series(series));
        if !output.no_plot {
            println!("{}", crate::plot::render_ascii_bars(series, output.width));
        }
    }

    if let Some(path) = &output.export_csv {
        crate::io::write_series_csv(path, series)?;
        info!("wrote series CSV to {}", path.display());
    }

    Ok(())
}

/// Rewrite argv so `receipts` defaults sensibly.
///
/// Rules:
/// - `receipts`                     -> `receipts tui`
/// - `receipts a.jpg b.jpg ...`     -> `receipts upload a.jpg b.jpg ...`
/// - `receipts --endpoint URL ...`  -> `receipts upload --endpoint URL ...`
/// - `receipts --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "upload" | "show" | "tui");
    if is_subcommand {
        return argv;
    }

    // Anything else (a file path or an upload flag) means "upload".
    argv.insert(1, "upload".to_string());
    argv
}
