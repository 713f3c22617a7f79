mod convert;
mod models;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use shared::{records_from_rows, AttemptRow, EventLog};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "milyoner-dataload")]
#[command(about = "Convert raw per-video quiz dumps into the attempt log CSV")]
struct Args {
    /// Directory holding debug_raw_output_<video_id>.txt dumps
    #[arg(long, env = "RAW_OUTPUT_DIR", default_value = "raw_output")]
    input_dir: PathBuf,
    /// Attempt log to write
    #[arg(long, env = "ATTEMPT_LOG_PATH", default_value = "csv/milyoner_data_final.csv")]
    output: PathBuf,
    /// Previously converted attempt log to merge in; its rows win on duplicates
    #[arg(long)]
    existing: Option<PathBuf>,
    /// Per-contestant totals CSV to write alongside the log
    #[arg(long)]
    stats_output: Option<PathBuf>,
    /// Replace contestant names with Contestant_NNN ids
    #[arg(long, default_value_t = false)]
    anonymize: bool,
    /// Dry-run: validate and summarise without writing files
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn dump_files(dir: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut files: Vec<(PathBuf, String)> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter_map(|path| convert::video_id_from_path(&path).map(|id| (path, id)))
        .collect();
    files.sort();
    Ok(files)
}

fn read_existing(path: &Path) -> Result<Vec<AttemptRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open existing log {}", path.display()))?;
    let mut rows = Vec::new();
    for row in reader.deserialize::<AttemptRow>() {
        let mut row = row.with_context(|| format!("Failed to parse existing log {}", path.display()))?;
        row.sequence_index = None;
        rows.push(row);
    }
    Ok(rows)
}

fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("Reading raw dumps from {}", args.input_dir.display());

    let mut rows = Vec::new();
    for (path, video_id) in dump_files(&args.input_dir)? {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match convert::parse_dump(&content, &video_id) {
            Ok(parsed) => {
                info!("{}: {} questions", video_id, parsed.len());
                rows.extend(parsed);
            }
            Err(e) => warn!("Skipping {}: {:#}", path.display(), e),
        }
    }
    convert::qualify_contestants(&mut rows);

    if let Some(existing) = &args.existing {
        let mut merged = read_existing(existing)?;
        info!("Merging {} rows from {}", merged.len(), existing.display());
        merged.extend(rows);
        rows = merged;
    }

    let mut rows = convert::clean(rows);
    convert::assign_sequence(&mut rows);
    if args.anonymize {
        let renamed = convert::anonymize(&mut rows);
        info!("Anonymized {} contestants", renamed);
    }

    let records = records_from_rows(rows.clone()).context("Converted rows failed validation")?;
    let log = EventLog::from_records(records).context("Converted log failed validation")?;
    let summaries = convert::contestant_summaries(&log);

    let videos = summaries
        .iter()
        .map(|s| s.video_id.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len();
    info!(
        "Total questions: {}, contestants: {}, videos: {}",
        log.len(),
        log.runs().len(),
        videos
    );
    if !log.runs().is_empty() {
        info!(
            "Average questions per contestant: {:.1}",
            log.len() as f64 / log.runs().len() as f64
        );
    }
    for summary in convert::top_by_amount(&summaries, 5) {
        info!(
            "Top: {} reached {} ({}/{} correct)",
            summary.contestant_id, summary.max_amount, summary.correct_answers, summary.total_questions
        );
    }

    if args.dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }

    write_csv(&args.output, &rows)?;
    info!("Attempt log saved: {} ({} rows)", args.output.display(), rows.len());
    if let Some(stats_path) = &args.stats_output {
        write_csv(stats_path, &summaries)?;
        info!("Contestant stats saved: {}", stats_path.display());
    }
    Ok(())
}
