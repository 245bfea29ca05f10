//! Interactive receipt file picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `receipts upload` and choose files" UX
//!
//! The picker searches for likely receipt files (images and PDFs) under the
//! current working directory. It only narrows the listing; explicit paths are
//! uploaded whatever their type.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding receipt files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

const RECEIPT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "webp", "tif", "tiff", "bmp", "pdf"];

/// Prompt the user to select one or more receipt files.
///
/// Behavior:
/// - list discovered receipt files
/// - accept `a` (all), numbers/ranges (`1 3-5`), or explicit paths
/// - `q` cancels
pub fn prompt_for_receipts() -> Result<Vec<PathBuf>, AppError> {
    let files = discover_receipt_files();
    if files.is_empty() {
        return Err(AppError::usage(
            "No receipt files found. Provide them with `receipts upload <FILE>...`.",
        ));
    }

    println!("Found {} receipt file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    loop {
        print!("Select files (e.g. 1 3-4, a for all) or type paths (q to quit): ");
        io::stdout()
            .flush()
            .map_err(|e| AppError::io(format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::io(format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::usage(
                "No input received. Provide files with `receipts upload <FILE>...`.",
            ));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::usage("Canceled."));
        }

        match parse_selection(input, &files) {
            Ok(selected) if !selected.is_empty() => return Ok(selected),
            Ok(_) => println!("Nothing selected."),
            Err(err) => println!("{err}"),
        }
    }
}

/// Resolve a selection line against the discovered list.
fn parse_selection(input: &str, files: &[PathBuf]) -> Result<Vec<PathBuf>, AppError> {
    if input.eq_ignore_ascii_case("a") {
        return Ok(files.to_vec());
    }

    let mut out = Vec::new();
    for token in input.split([' ', ',']).filter(|t| !t.is_empty()) {
        if let Some((lo, hi)) = token.split_once('-') {
            if let (Ok(lo), Ok(hi)) = (lo.parse::<usize>(), hi.parse::<usize>()) {
                for choice in lo..=hi {
                    out.push(pick(choice, files)?);
                }
                continue;
            }
        }

        if let Ok(choice) = token.parse::<usize>() {
            out.push(pick(choice, files)?);
            continue;
        }

        out.push(validate_receipt_path(Path::new(token))?);
    }

    Ok(out)
}

fn pick(choice: usize, files: &[PathBuf]) -> Result<PathBuf, AppError> {
    if (1..=files.len()).contains(&choice) {
        Ok(files[choice - 1].clone())
    } else {
        Err(AppError::usage(format!(
            "Invalid choice: {choice}. Enter numbers between 1 and {}.",
            files.len()
        )))
    }
}

/// Validate the provided path points to an existing file.
pub fn validate_receipt_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::usage(format!(
            "Receipt file not found: {}",
            path.display()
        )));
    }
    if path.is_dir() {
        return Err(AppError::usage(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

/// Discover receipt files under the current directory (deterministic order).
///
/// This is used by both the text prompt and the Ratatui TUI.
pub fn discover_receipt_files() -> Vec<PathBuf> {
    find_receipt_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_receipt_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_receipt_files_inner(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_receipt_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            if should_skip_dir(&path) {
                continue;
            }
            find_receipt_files_inner(&path, depth + 1, max_depth, out);
            continue;
        }

        if file_type.is_file() && is_receipt_file(&path) {
            out.push(path);
        }
    }
}

fn is_receipt_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| RECEIPT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        == Some(true)
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules" | "uploads")
}

pub fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}
