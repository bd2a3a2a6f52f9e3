use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use reqmatch_core::{
    CompareOptions, Comparator, Config, DirectoryStore, FailurePolicy, HistoryStore,
    ProgressEvent, config_file,
};
use reqmatch_pdf_mupdf::MupdfBackend;
use tracing_subscriber::EnvFilter;

mod output;

use output::ColorMode;

/// Requirement coverage checker - score how many lines of a reference PDF
/// appear verbatim in other PDFs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare a reference PDF against every PDF in the corpus folder
    Compare {
        /// Path to the reference PDF
        reference: PathBuf,

        /// Folder of candidate PDFs (default: configured upload folder)
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Append the run to the result history
        #[arg(long)]
        save: bool,

        /// Abort on the first candidate whose text cannot be extracted
        #[arg(long)]
        fail_fast: bool,

        /// Do not score the reference against itself
        #[arg(long)]
        exclude_reference: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Show saved comparison runs
    History {
        /// Print the raw history as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// List PDFs in the corpus folder
    Documents {
        /// Folder to list (default: configured upload folder)
        #[arg(long)]
        corpus: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::resolve(&config_file::load_config());

    match cli.command {
        Command::Compare {
            reference,
            corpus,
            save,
            fail_fast,
            exclude_reference,
            no_color,
        } => compare(
            &config,
            reference,
            corpus,
            save,
            fail_fast,
            exclude_reference,
            ColorMode(!no_color),
        ),
        Command::History { json, no_color } => history(&config, json, ColorMode(!no_color)),
        Command::Documents { corpus } => documents(&config, corpus),
    }
}

fn compare(
    config: &Config,
    reference: PathBuf,
    corpus: Option<PathBuf>,
    save: bool,
    fail_fast: bool,
    exclude_reference: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    let corpus = corpus.unwrap_or_else(|| config.upload_dir.clone());
    if !corpus.is_dir() {
        anyhow::bail!("Corpus folder not found: {}", corpus.display());
    }
    let store = DirectoryStore::new(&corpus);
    let backend = MupdfBackend::new();

    let mut options = CompareOptions::from(config);
    if fail_fast {
        options.failure_policy = FailurePolicy::Abort;
    }
    if exclude_reference {
        options.include_reference = false;
    }

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} [{bar:40.green/dim}] {pos}/{len}")
            .unwrap()
            .progress_chars("=> "),
    );

    let run = Comparator::new(&backend, &store)
        .with_options(options)
        .compare_file(&reference, |event| match event {
            ProgressEvent::Started { candidates, .. } => bar.set_length(candidates as u64),
            ProgressEvent::Checking { name, .. } => bar.set_message(name),
            ProgressEvent::Result { .. } => bar.inc(1),
            ProgressEvent::Skipped { name, error, .. } => {
                bar.println(format!("warning: skipped {name}: {error}"));
                bar.inc(1);
            }
        });
    bar.finish_and_clear();
    let run = run?;

    let mut out = std::io::stdout().lock();
    output::print_run(&mut out, &run, color)?;
    output::print_summary(&mut out, &run, color)?;

    if save {
        let history = HistoryStore::new(&config.history_path);
        history.save(&run)?;
        writeln!(out, "Saved to {}", history.path().display())?;
    }
    Ok(())
}

fn history(config: &Config, json: bool, color: ColorMode) -> anyhow::Result<()> {
    let runs = HistoryStore::new(&config.history_path).load()?;
    let mut out = std::io::stdout().lock();

    if json {
        serde_json::to_writer_pretty(&mut out, &runs)?;
        writeln!(out)?;
        return Ok(());
    }

    if runs.is_empty() {
        writeln!(out, "No saved comparisons in {}", config.history_path.display())?;
        return Ok(());
    }
    for (i, run) in runs.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        output::print_run(&mut out, run, color)?;
    }
    Ok(())
}

fn documents(config: &Config, corpus: Option<PathBuf>) -> anyhow::Result<()> {
    let corpus = corpus.unwrap_or_else(|| config.upload_dir.clone());
    let store = DirectoryStore::new(&corpus);
    let mut out = std::io::stdout().lock();
    for name in store.documents(&config.extension)? {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}
