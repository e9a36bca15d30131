//! Terminal output: file tables, sizes and progress lines.

use std::fmt::Write;

use chanvault_catalog::{CatalogEntry, Listing};
use chanvault_transfer::{TransferKind, TransferProgress};

pub const MAX_TERMINAL_WIDTH: usize = 120;
const PADDING: usize = 22;
const SIZE_COLUMN_WIDTH: usize = 10;
const ID_COLUMN_WIDTH: usize = 5;
const COLUMN_GAP: &str = "   ";
const MIN_NAME_WIDTH: usize = 8;

/// Current terminal width, from the tty or `COLUMNS`, capped at
/// [`MAX_TERMINAL_WIDTH`].
pub fn terminal_width() -> usize {
    let columns = crossterm::terminal::size()
        .ok()
        .map(|(cols, _)| cols as usize)
        .filter(|&cols| cols > 0)
        .or_else(|| std::env::var("COLUMNS").ok()?.trim().parse().ok())
        .unwrap_or(MAX_TERMINAL_WIDTH);
    columns.min(MAX_TERMINAL_WIDTH)
}

/// Formats a byte count with two decimals, base 1024.
pub fn format_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = size as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.2} PB")
}

fn name_width(columns: usize) -> usize {
    columns
        .min(MAX_TERMINAL_WIDTH)
        .saturating_sub(PADDING + SIZE_COLUMN_WIDTH + ID_COLUMN_WIDTH + 2 * COLUMN_GAP.len())
        .max(MIN_NAME_WIDTH)
}

fn truncate(name: &str, width: usize) -> String {
    name.chars().take(width).collect()
}

/// Renders entries as a `Filename | Size | ID` table.
pub fn render_table(entries: &[CatalogEntry], columns: usize) -> String {
    let width = name_width(columns);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}{COLUMN_GAP}{:<SIZE_COLUMN_WIDTH$}{COLUMN_GAP}{:<ID_COLUMN_WIDTH$}",
        "Filename", "Size", "ID"
    );
    let _ = writeln!(
        out,
        "{}{COLUMN_GAP}{}{COLUMN_GAP}{}",
        "-".repeat(width),
        "-".repeat(SIZE_COLUMN_WIDTH),
        "-".repeat(ID_COLUMN_WIDTH)
    );
    for entry in entries {
        let _ = writeln!(
            out,
            "{:<width$}{COLUMN_GAP}{:<SIZE_COLUMN_WIDTH$}{COLUMN_GAP}{:<ID_COLUMN_WIDTH$}",
            truncate(&entry.name, width),
            format_size(entry.size),
            format!("#{}", entry.id)
        );
    }
    out
}

/// Renders the full listing with its storage total.
pub fn render_listing(listing: &Listing, columns: usize) -> String {
    let mut out = render_table(&listing.entries, columns);
    let _ = writeln!(out, "{}", "-".repeat(columns.min(MAX_TERMINAL_WIDTH)));
    let _ = writeln!(out, "Total storage used: {}", format_size(listing.total_size));
    out
}

/// Renders a single-line progress bar, prefixed with `\r` so it redraws
/// in place.
pub fn progress_line(progress: &TransferProgress, columns: usize) -> String {
    let verb = match progress.kind {
        TransferKind::Upload => "Uploading",
        TransferKind::Download => "Downloading",
        TransferKind::Delete => "Deleting",
    };
    let percent = progress.percent();
    let bar_width = columns.min(MAX_TERMINAL_WIDTH).saturating_sub(60).max(10);
    let filled = ((percent / 100.0) * bar_width as f64) as usize;
    let filled = filled.min(bar_width);

    format!(
        "\r{verb} {}: [{}{}] {}/{} ({percent:.2}%)",
        truncate(&progress.name, 24),
        "#".repeat(filled),
        "-".repeat(bar_width - filled),
        progress.chunk,
        progress.total_chunks,
    )
}
