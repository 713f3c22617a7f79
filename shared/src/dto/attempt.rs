use crate::models::attempt::{AttemptRecord, Choice, Joker};
use crate::{Result, SharedError};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// One row of the attempt log as it is stored on disk (CSV or JSON).
///
/// Column names of the original dataset are accepted as aliases. A stored
/// `is_correct` column is ignored; correctness is always derived.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct AttemptRow {
    #[serde(alias = "contestant")]
    #[validate(length(min = 1, message = "contestant_id is required"))]
    pub contestant_id: String,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[validate(range(min = 1, message = "level must be a positive integer"))]
    pub level: i64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "amount must be non-negative"))]
    pub amount: Option<f64>,
    #[serde(alias = "correct_answer")]
    pub correct_choice: String,
    #[serde(alias = "contestant_answer", default)]
    pub selected_choice: Option<String>,
    #[serde(default)]
    pub joker_used: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub eliminated: bool,
    #[serde(default)]
    pub sequence_index: Option<usize>,
}

impl AttemptRow {
    /// Converts the row into a domain record. `row` is the 1-based data
    /// row number used in error messages.
    pub fn into_record(self, row: usize, sequence_index: usize) -> Result<AttemptRecord> {
        self.validate()
            .map_err(|e| SharedError::malformed(row, e.to_string()))?;

        let correct_choice =
            Choice::parse_correct(&self.correct_choice).map_err(|e| SharedError::malformed(row, e))?;
        let selected_choice = Choice::parse_selected(self.selected_choice.as_deref().unwrap_or(""))
            .map_err(|e| SharedError::malformed(row, e))?;
        let level = u32::try_from(self.level)
            .map_err(|_| SharedError::malformed(row, format!("level {} is out of range", self.level)))?;
        let joker_used = self
            .joker_used
            .as_deref()
            .unwrap_or("")
            .parse::<Joker>()
            .map_err(|e| SharedError::malformed(row, e))?;

        Ok(AttemptRecord {
            contestant_id: self.contestant_id.trim().to_string(),
            video_id: self.video_id.filter(|v| !v.trim().is_empty()),
            question: self.question.filter(|q| !q.trim().is_empty()),
            category: self.category.trim().to_string(),
            level,
            amount: self.amount.unwrap_or(0.0),
            correct_choice,
            selected_choice,
            joker_used,
            eliminated: self.eliminated,
            sequence_index,
        })
    }
}

impl From<&AttemptRecord> for AttemptRow {
    fn from(record: &AttemptRecord) -> Self {
        Self {
            contestant_id: record.contestant_id.clone(),
            video_id: record.video_id.clone(),
            question: record.question.clone(),
            category: record.category.clone(),
            level: i64::from(record.level),
            amount: Some(record.amount),
            correct_choice: record.correct_choice.to_string(),
            selected_choice: match record.selected_choice {
                Choice::None => None,
                choice => Some(choice.to_string()),
            },
            joker_used: Some(record.joker_used.to_string()),
            eliminated: record.eliminated,
            sequence_index: Some(record.sequence_index),
        }
    }
}

/// Converts parsed rows into records.
///
/// When no row carries a `sequence_index`, indices are derived from row
/// order per contestant. Mixing rows with and without an index is malformed.
pub fn records_from_rows(rows: Vec<AttemptRow>) -> Result<Vec<AttemptRecord>> {
    let derive_sequence = rows.iter().all(|row| row.sequence_index.is_none());
    let mut next_index: HashMap<String, usize> = HashMap::new();
    let mut records = Vec::with_capacity(rows.len());

    for (idx, row) in rows.into_iter().enumerate() {
        let row_number = idx + 1;
        let sequence_index = if derive_sequence {
            let counter = next_index
                .entry(row.contestant_id.trim().to_string())
                .or_insert(0);
            let current = *counter;
            *counter += 1;
            current
        } else {
            row.sequence_index
                .ok_or_else(|| SharedError::malformed(row_number, "missing sequence_index"))?
        };
        records.push(row.into_record(row_number, sequence_index)?);
    }

    Ok(records)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Accepts `true`/`false`, `1`/`0`, `yes`/`no` in any case, and blank as false.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Flag::Bool(value)) => Ok(value),
        Some(Flag::Int(value)) => Ok(value != 0),
        Some(Flag::Text(text)) => match text.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!("invalid boolean '{}'", other))),
        },
    }
}
