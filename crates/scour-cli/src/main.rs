use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use scour_core::{ExtractOptions, Extractors, ProgressEvent, ScanOptions};
use scour_pdf_mupdf::MupdfBackend;

mod output;

use output::ColorMode;

/// Corpus content scanner — search folders of documents or bulk-extract their text
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search every .txt and .pdf document under a folder for a substring
    Search {
        /// Folder containing the documents
        root: PathBuf,

        /// Text to search for (case-insensitive)
        term: String,

        /// Recurse into subfolders
        #[arg(short, long)]
        recursive: bool,

        /// Number of concurrent workers (default: available parallelism)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Write matched names to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract the text of every PDF under a folder into .txt files
    Extract {
        /// Folder containing the PDFs
        root: PathBuf,

        /// Folder to write the .txt files into (created if missing)
        destination: PathBuf,

        /// Recurse into subfolders
        #[arg(short, long)]
        recursive: bool,

        /// Skip PDFs whose output file already exists
        #[arg(long)]
        skip_existing: bool,

        /// Number of concurrent workers (default: available parallelism)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Search {
            root,
            term,
            recursive,
            jobs,
            no_color,
            output,
        } => search(root, term, recursive, jobs, no_color, output).await,
        Command::Extract {
            root,
            destination,
            recursive,
            skip_existing,
            jobs,
            no_color,
        } => extract(root, destination, recursive, skip_existing, jobs, no_color).await,
    }
}

async fn search(
    root: PathBuf,
    term: String,
    recursive: bool,
    jobs: Option<usize>,
    no_color: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let use_color = !no_color && output.is_none();
    let color = ColorMode(use_color);

    let mut options = ScanOptions::new(root, term);
    options.recursive = recursive;
    options.workers = resolve_workers(jobs);

    let extractors = Extractors::with_pdf(Arc::new(MupdfBackend::new()));

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(&cancel);

    let bar = progress_bar();
    let match_count = Arc::new(AtomicUsize::new(0));
    let progress_cb = {
        let bar = bar.clone();
        let match_count = Arc::clone(&match_count);
        move |event: ProgressEvent| match event {
            ProgressEvent::Started { total } => {
                bar.set_length(total as u64);
                bar.set_message("0 matches");
            }
            ProgressEvent::Progress { completed, .. } => {
                bar.set_position(completed as u64);
            }
            ProgressEvent::Match { .. } => {
                let count = match_count.fetch_add(1, Ordering::AcqRel) + 1;
                bar.set_message(format!("{count} matches"));
            }
            ProgressEvent::Failure { name, cause } => {
                bar.println(output::warning_line(&name, &cause, color));
            }
            _ => {}
        }
    };

    let outcome = scour_core::scan(options, extractors, progress_cb, cancel).await?;
    bar.finish_and_clear();

    let mut writer: Box<dyn Write> = if let Some(ref output_path) = output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    };

    output::print_matches(&mut writer, &outcome.matches)?;
    output::print_failures(&mut writer, &outcome.failures, color)?;
    output::print_scan_summary(&mut writer, &outcome, color)?;

    Ok(())
}

async fn extract(
    root: PathBuf,
    destination: PathBuf,
    recursive: bool,
    skip_existing: bool,
    jobs: Option<usize>,
    no_color: bool,
) -> anyhow::Result<()> {
    let color = ColorMode(!no_color);

    let mut options = ExtractOptions::new(root, destination);
    options.recursive = recursive;
    options.skip_duplicates = skip_existing;
    options.workers = resolve_workers(jobs);

    let extractors = Extractors::with_pdf(Arc::new(MupdfBackend::new()));

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(&cancel);

    let bar = progress_bar();
    let progress_cb = {
        let bar = bar.clone();
        move |event: ProgressEvent| match event {
            ProgressEvent::Started { total } => {
                bar.set_length(total as u64);
            }
            ProgressEvent::Progress { completed, .. } => {
                bar.set_position(completed as u64);
            }
            ProgressEvent::Written { name } | ProgressEvent::Skipped { name } => {
                bar.set_message(name);
            }
            ProgressEvent::Failure { name, cause } => {
                bar.println(output::warning_line(&name, &cause, color));
            }
            _ => {}
        }
    };

    let outcome = scour_core::extract(options, extractors, progress_cb, cancel).await?;
    bar.finish_and_clear();

    let mut writer: Box<dyn Write> = Box::new(std::io::stdout());
    output::print_failures(&mut writer, &outcome.failures, color)?;
    output::print_extract_summary(&mut writer, &outcome, color)?;

    Ok(())
}

/// Worker count: CLI flag > SCOUR_JOBS env var > available parallelism.
fn resolve_workers(jobs: Option<usize>) -> usize {
    jobs.or_else(|| std::env::var("SCOUR_JOBS").ok().and_then(|v| v.parse().ok()))
        .unwrap_or_else(scour_core::default_workers)
}

/// Translate Ctrl+C into a cancellation request for the running batch.
fn spawn_ctrl_c_handler(cancel: &CancellationToken) {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {msg} [{bar:40.cyan/dim}] {pos}/{len} ({percent}%, eta {eta})",
        )
        .unwrap()
        .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}
