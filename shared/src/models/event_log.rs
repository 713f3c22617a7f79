use crate::models::attempt::{AttemptRecord, ContestantRun};
use crate::{Result, SharedError};
use std::collections::HashMap;

/// Validated, immutable snapshot of the attempt log.
///
/// Every analyzer borrows from this; nothing mutates it after
/// construction. Records keep their input order and runs are listed in
/// the order contestants first appear.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<AttemptRecord>,
    runs: Vec<ContestantRun>,
}

impl EventLog {
    /// Validates the records and derives one run per contestant.
    ///
    /// Row numbers in errors are 1-based positions in `records`.
    pub fn from_records(records: Vec<AttemptRecord>) -> Result<Self> {
        let mut order: Vec<&str> = Vec::new();
        let mut by_contestant: HashMap<&str, Vec<usize>> = HashMap::new();

        for (idx, record) in records.iter().enumerate() {
            let row = idx + 1;
            if record.contestant_id.trim().is_empty() {
                return Err(SharedError::malformed(row, "missing contestant_id"));
            }
            if record.category.trim().is_empty() {
                return Err(SharedError::malformed(row, "missing category"));
            }
            if record.level == 0 {
                return Err(SharedError::malformed(row, "level must be a positive integer"));
            }
            if !record.correct_choice.is_answer() {
                return Err(SharedError::malformed(row, "correct_choice must be one of A, B, C, D"));
            }
            if !(record.amount >= 0.0) {
                return Err(SharedError::malformed(row, "amount must be non-negative"));
            }

            let entry = by_contestant.entry(record.contestant_id.as_str()).or_insert_with(|| {
                order.push(record.contestant_id.as_str());
                Vec::new()
            });
            entry.push(idx);
        }

        let mut runs = Vec::with_capacity(order.len());
        for contestant in &order {
            let mut indices = by_contestant.remove(contestant).unwrap_or_default();
            indices.sort_by_key(|&i| records[i].sequence_index);
            Self::validate_run(&records, &indices)?;

            let attempts = indices.iter().map(|&i| records[i].clone()).collect();
            runs.push(ContestantRun::from_attempts(contestant.to_string(), attempts));
        }

        log::debug!(
            "Validated attempt log: {} records, {} contestants",
            records.len(),
            runs.len()
        );

        Ok(Self { records, runs })
    }

    /// Checks the per-contestant invariants on indices sorted by sequence.
    fn validate_run(records: &[AttemptRecord], indices: &[usize]) -> Result<()> {
        let last = indices.len().saturating_sub(1);
        for (position, &idx) in indices.iter().enumerate() {
            let record = &records[idx];
            let row = idx + 1;

            if record.sequence_index != position {
                return Err(SharedError::malformed(
                    row,
                    format!(
                        "sequence_index {} for '{}' breaks the contiguous run (expected {})",
                        record.sequence_index, record.contestant_id, position
                    ),
                ));
            }

            if position > 0 {
                let previous = &records[indices[position - 1]];
                if record.level < previous.level {
                    return Err(SharedError::malformed(
                        row,
                        format!(
                            "level {} for '{}' is lower than the previous level {}",
                            record.level, record.contestant_id, previous.level
                        ),
                    ));
                }
            }

            if record.eliminated && position != last {
                return Err(SharedError::malformed(
                    row,
                    format!(
                        "'{}' is eliminated before their final attempt",
                        record.contestant_id
                    ),
                ));
            }
        }
        Ok(())
    }

    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }

    pub fn runs(&self) -> &[ContestantRun] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
