//! chanvault command-line entry point.

mod cli;
mod config;
mod render;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chanvault_catalog::{DeleteResult, DownloadStatus, FileCatalog, UploadResult, Verification};
use chanvault_channel::HttpChannel;
use chanvault_transfer::{ChunkOutcome, ProgressReporter, TransferConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::Config;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;

    if let Command::Init { token, channel_id } = &cli.command {
        config.set_credentials(token, channel_id);
        config.save_to(&config_path)?;
        println!("Configuration saved to {}", config_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    config.apply_env(|key| std::env::var(key).ok());
    tracing::debug!(path = %config_path.display(), "configuration loaded");

    let channel = HttpChannel::new(&config.channel_config()).with_context(|| {
        format!(
            "set credentials with `chanvault init --token <TOKEN> --channel-id <ID>` \
             or the {} and {} variables",
            config::TOKEN_ENV,
            config::CHANNEL_ID_ENV
        )
    })?;
    let store = config.store_config();
    let transfer = TransferConfig::default();

    let columns = render::terminal_width();
    let progress = ProgressReporter::new();
    progress.on_progress(Box::new(move |p| {
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "{}", render::progress_line(p, columns));
        if p.chunk >= p.total_chunks && p.bytes >= p.total_bytes {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }));
    let catalog = FileCatalog::new(&channel, &store, &transfer).with_progress(&progress);

    match cli.command {
        Command::List => {
            let listing = catalog.list().await?;
            if listing.entries.is_empty() {
                println!("No files stored.");
            } else {
                print!("{}", render::render_listing(&listing, columns));
            }
        }
        Command::Find { terms } => {
            let listing = catalog.find(&terms.join(" ")).await?;
            if listing.entries.is_empty() {
                println!("No matching files found.");
            } else {
                print!("{}", render::render_table(&listing.entries, columns));
            }
        }
        Command::Upload { path } => match catalog.upload(&path).await? {
            UploadResult::Uploaded { name, size, chunks } => {
                println!(
                    "Uploaded {name} ({}, {chunks} chunk{}).",
                    render::format_size(size),
                    if chunks == 1 { "" } else { "s" }
                );
            }
            UploadResult::AlreadyPresent { name } => {
                println!("{name} is already stored; nothing uploaded.");
            }
        },
        Command::Download { ids, output } => {
            let dest = output.unwrap_or_else(|| config.download_dir.clone());
            return download(&catalog, &ids, dest).await;
        }
        Command::Delete { id } => match catalog.delete(&id).await? {
            DeleteResult::Deleted { name, .. } => println!("Deleted {name}."),
            DeleteResult::PartiallyDeleted { name, report } => {
                eprintln!(
                    "Could not delete {} of {} chunks of {name}; it stays listed. Run delete again to retry.",
                    report.failed_count(),
                    report.outcomes.len()
                );
                return Ok(ExitCode::FAILURE);
            }
        },
        // Handled before connecting.
        Command::Init { .. } => {}
    }
    Ok(ExitCode::SUCCESS)
}

async fn download(
    catalog: &FileCatalog<'_>,
    ids: &[String],
    dest: PathBuf,
) -> anyhow::Result<ExitCode> {
    let results = catalog.download(ids, &dest).await?;

    let mut code = ExitCode::SUCCESS;
    for result in &results {
        match result.status() {
            DownloadStatus::Complete => {
                println!("Downloaded {} to {}", result.name, result.path.display());
            }
            DownloadStatus::Incomplete => {
                code = ExitCode::FAILURE;
                eprintln!(
                    "Download of {} is incomplete ({} written to {}):",
                    result.name,
                    render::format_size(result.report.bytes_written),
                    result.path.display()
                );
                for skipped in result.report.skipped() {
                    if let ChunkOutcome::Skipped {
                        index,
                        message_id,
                        reason,
                    } = skipped
                    {
                        eprintln!("  chunk {} (message {message_id}): {reason}", index + 1);
                    }
                }
                match &result.verification {
                    Verification::SizeMismatch { expected, actual } => {
                        eprintln!("  expected {expected} bytes, got {actual}");
                    }
                    Verification::ChecksumMismatch { .. } => {
                        eprintln!("  checksum does not match the uploaded file");
                    }
                    Verification::Verified | Verification::Unverified => {}
                }
            }
        }
    }
    Ok(code)
}
