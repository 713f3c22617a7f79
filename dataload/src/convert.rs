use crate::models::{RawEntry, RawQuestion};
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Serialize;
use shared::{AttemptRow, Choice, EventLog, Joker};
use std::collections::{HashMap, HashSet};
use std::path::Path;

const HOST_MARKER: &str = "oktay";
const DEFAULT_CATEGORY: &str = "Genel Kültür";
const FILE_PREFIX: &str = "debug_raw_output_";

/// Video id encoded in a dump file name, `debug_raw_output_<id>.txt`.
pub fn video_id_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix(FILE_PREFIX)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// The JSON payload of a dump: code fences removed, trimmed to the
/// outermost array brackets when present.
pub fn extract_json(content: &str) -> &str {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    match (trimmed.find('['), trimmed.rfind(']')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

pub fn is_host(name: &str) -> bool {
    name.to_lowercase().contains(HOST_MARKER)
}

/// Upper-cases the first letter of every word and lower-cases the rest.
pub fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn to_row(video_id: &str, contestant: &str, q: &RawQuestion) -> AttemptRow {
    let text = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    AttemptRow {
        contestant_id: title_case(contestant),
        video_id: Some(video_id.to_string()),
        question: text(&q.question),
        category: text(&q.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        level: q.level(),
        amount: Some(q.amount()),
        correct_choice: text(&q.correct_answer).unwrap_or_default().to_uppercase(),
        selected_choice: text(&q.contestant_answer).map(|answer| answer.to_uppercase()),
        joker_used: text(&q.joker_used).or_else(|| Some("yok".to_string())),
        eliminated: q.eliminated(),
        sequence_index: None,
    }
}

/// Parses one dump into rows, skipping the host and entries with no
/// question text.
pub fn parse_dump(content: &str, video_id: &str) -> Result<Vec<AttemptRow>> {
    let payload = extract_json(content);
    if payload.is_empty() {
        return Ok(Vec::new());
    }

    let value: serde_json::Value =
        serde_json::from_str(payload).with_context(|| format!("Invalid JSON in dump {}", video_id))?;
    let entries: Vec<RawEntry> = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };

    let mut rows = Vec::new();
    for entry in entries {
        let contestant = entry.contestant.trim();
        if contestant.is_empty() || is_host(contestant) {
            debug!("Skipping entry for '{}' in {}", contestant, video_id);
            continue;
        }
        match &entry.questions_answered {
            Some(questions) => {
                rows.extend(questions.iter().map(|q| to_row(video_id, contestant, q)));
            }
            None if entry.flat.question.is_some() => {
                rows.push(to_row(video_id, contestant, &entry.flat));
            }
            None => {}
        }
    }
    Ok(rows)
}

fn has_valid_choices(row: &AttemptRow) -> bool {
    Choice::parse_correct(&row.correct_choice).is_ok()
        && Choice::parse_selected(row.selected_choice.as_deref().unwrap_or("")).is_ok()
}

/// Drops duplicate `(video_id, contestant, question)` rows keeping the
/// first, rows without a question, and rows whose level or answer key
/// cannot be read. Unrecognised joker labels are logged and cleared.
pub fn clean(rows: Vec<AttemptRow>) -> Vec<AttemptRow> {
    let mut seen = HashSet::new();
    let total = rows.len();

    let cleaned: Vec<AttemptRow> = rows
        .into_iter()
        .filter(|row| {
            let Some(question) = row.question.as_deref() else {
                return false;
            };
            seen.insert((
                row.video_id.clone().unwrap_or_default(),
                row.contestant_id.clone(),
                question.to_string(),
            ))
        })
        .filter(|row| {
            if row.level < 1 || u32::try_from(row.level).is_err() || !has_valid_choices(row) {
                warn!(
                    "Dropping unreadable '{}' question in {}: level {}, answer '{}', chosen {:?}",
                    row.contestant_id,
                    row.video_id.as_deref().unwrap_or("?"),
                    row.level,
                    row.correct_choice,
                    row.selected_choice
                );
                return false;
            }
            true
        })
        .map(|mut row| {
            let joker = row.joker_used.as_deref().unwrap_or("");
            if joker.parse::<Joker>().is_err() {
                warn!("Unknown joker '{}' for '{}', treating as none", joker, row.contestant_id);
                row.joker_used = Some(Joker::None.to_string());
            }
            row
        })
        .collect();

    debug!("Cleaned {} rows down to {}", total, cleaned.len());
    cleaned
}

/// Gives every run a distinct id. A name that appears in more than one
/// video is suffixed with the video id.
pub fn qualify_contestants(rows: &mut [AttemptRow]) {
    let mut videos: HashMap<String, HashSet<String>> = HashMap::new();
    for row in rows.iter() {
        videos
            .entry(row.contestant_id.clone())
            .or_default()
            .insert(row.video_id.clone().unwrap_or_default());
    }
    for row in rows.iter_mut() {
        if videos.get(&row.contestant_id).map_or(false, |v| v.len() > 1) {
            row.contestant_id = format!(
                "{} ({})",
                row.contestant_id,
                row.video_id.as_deref().unwrap_or_default()
            );
        }
    }
}

/// Numbers each contestant's attempts in row order.
pub fn assign_sequence(rows: &mut [AttemptRow]) {
    let mut next: HashMap<String, usize> = HashMap::new();
    for row in rows.iter_mut() {
        let counter = next.entry(row.contestant_id.clone()).or_insert(0);
        row.sequence_index = Some(*counter);
        *counter += 1;
    }
}

/// Replaces names with `Contestant_001`, `Contestant_002`, ... in order of
/// first appearance. Returns the number of contestants renamed.
pub fn anonymize(rows: &mut [AttemptRow]) -> usize {
    let mut mapping: HashMap<String, String> = HashMap::new();
    for row in rows.iter_mut() {
        let next_id = mapping.len() + 1;
        let alias = mapping
            .entry(row.contestant_id.clone())
            .or_insert_with(|| format!("Contestant_{:03}", next_id));
        row.contestant_id = alias.clone();
    }
    mapping.len()
}

/// Per-contestant totals written next to the attempt log.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContestantSummary {
    pub video_id: String,
    pub contestant_id: String,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub max_amount: f64,
    pub max_level: u32,
    pub eliminated: bool,
}

pub fn contestant_summaries(log: &EventLog) -> Vec<ContestantSummary> {
    log.runs()
        .iter()
        .map(|run| ContestantSummary {
            video_id: run
                .attempts
                .iter()
                .find_map(|a| a.video_id.clone())
                .unwrap_or_default(),
            contestant_id: run.contestant_id.clone(),
            total_questions: run.attempts.len(),
            correct_answers: run.attempts.iter().filter(|a| a.is_correct()).count(),
            max_amount: run.attempts.iter().map(|a| a.amount).fold(0.0, f64::max),
            max_level: run.max_level_reached,
            eliminated: run.eliminated,
        })
        .collect()
}

/// The `n` contestants with the highest amount, ties in log order.
pub fn top_by_amount(summaries: &[ContestantSummary], n: usize) -> Vec<&ContestantSummary> {
    let mut ranked: Vec<&ContestantSummary> = summaries.iter().collect();
    ranked.sort_by(|a, b| b.max_amount.total_cmp(&a.max_amount));
    ranked.truncate(n);
    ranked
}
