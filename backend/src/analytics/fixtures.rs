//! Attempt-log builders shared by the analytics tests.

use shared::{AttemptRecord, Choice, EventLog, Joker};

/// Builds one contestant's run; each `step` climbs one level.
pub struct RunBuilder {
    contestant_id: String,
    records: Vec<AttemptRecord>,
}

impl RunBuilder {
    pub fn new(contestant_id: &str) -> Self {
        Self {
            contestant_id: contestant_id.to_string(),
            records: Vec::new(),
        }
    }

    pub fn step(self, category: &str, correct: Choice, selected: Choice) -> Self {
        let level = self.records.last().map(|r| r.level + 1).unwrap_or(1);
        self.step_at(level, category, correct, selected)
    }

    pub fn step_at(mut self, level: u32, category: &str, correct: Choice, selected: Choice) -> Self {
        self.records.push(AttemptRecord {
            contestant_id: self.contestant_id.clone(),
            video_id: Some(format!("video_{}", self.contestant_id)),
            question: None,
            category: category.to_string(),
            level,
            amount: f64::from(level) * 1000.0,
            correct_choice: correct,
            selected_choice: selected,
            joker_used: Joker::None,
            eliminated: false,
            sequence_index: self.records.len(),
        });
        self
    }

    /// Correct answers with the given choices, one level each.
    pub fn correct_run(self, category: &str, choices: &[Choice]) -> Self {
        choices
            .iter()
            .fold(self, |run, &choice| run.step(category, choice, choice))
    }

    /// Marks the latest attempt as using `joker`.
    pub fn joker(mut self, joker: Joker) -> Self {
        if let Some(last) = self.records.last_mut() {
            last.joker_used = joker;
        }
        self
    }

    /// Marks the latest attempt as the one that ended the run.
    pub fn eliminated(mut self) -> Self {
        if let Some(last) = self.records.last_mut() {
            last.eliminated = true;
        }
        self
    }

    pub fn build(self) -> Vec<AttemptRecord> {
        self.records
    }
}

pub fn log_of(runs: Vec<RunBuilder>) -> EventLog {
    let records = runs.into_iter().flat_map(RunBuilder::build).collect();
    EventLog::from_records(records).expect("fixture log is valid")
}

/// One contestant choosing A, B, A against correct A, A, B in a single
/// category, eliminated on the third question.
pub fn scenario_log() -> EventLog {
    log_of(vec![RunBuilder::new("Contestant_001")
        .step("Tarih", Choice::A, Choice::A)
        .step("Tarih", Choice::A, Choice::B)
        .step("Tarih", Choice::B, Choice::A)
        .eliminated()])
}

/// A mixed log: a high performer, a mid performer using two jokers, an
/// early elimination, an early withdrawal and a blank answer.
pub fn sample_log() -> EventLog {
    use Choice::*;

    let high = RunBuilder::new("Contestant_001")
        .correct_run("Tarih", &[A, B, C, D, A])
        .correct_run("Bilim", &[B, C, D, A, B])
        .step("Spor", C, D)
        .eliminated();

    let mid = RunBuilder::new("Contestant_002")
        .correct_run("Spor", &[A, B])
        .joker(Joker::FiftyFifty)
        .correct_run("Bilim", &[C, D])
        .joker(Joker::AskAudience)
        .step("Tarih", A, A)
        .step("Sanat", B, C)
        .eliminated();

    let early = RunBuilder::new("Contestant_003")
        .step("Tarih", A, A)
        .step("Spor", D, B)
        .eliminated();

    let withdrawn = RunBuilder::new("Contestant_004")
        .step("Bilim", C, C)
        .step("Bilim", B, None);

    log_of(vec![high, mid, early, withdrawn])
}

const CATEGORIES: [&str; 4] = ["Tarih", "Bilim", "Spor", "Sanat"];
const JOKERS: [Joker; 5] = [
    Joker::None,
    Joker::FiftyFifty,
    Joker::PhoneAFriend,
    Joker::AskAudience,
    Joker::SwitchQuestion,
];

/// Arbitrary valid logs: up to eight contestants, up to twelve attempts
/// each, levels climbing by one or repeating.
pub fn arb_log() -> impl proptest::strategy::Strategy<Value = EventLog> {
    use proptest::prelude::*;

    let attempt = (0..4usize, 0..4usize, 0..5usize, 0..5usize, any::<bool>());
    let run = (proptest::collection::vec(attempt, 1..12), any::<bool>());

    proptest::collection::vec(run, 0..8).prop_map(|runs| {
        let builders = runs
            .into_iter()
            .enumerate()
            .map(|(i, (attempts, eliminated))| {
                let mut builder = RunBuilder::new(&format!("Contestant_{:03}", i + 1));
                let mut level = 0;
                for (category, correct, selected, joker, climb) in attempts {
                    if climb || level == 0 {
                        level += 1;
                    }
                    builder = builder
                        .step_at(
                            level,
                            CATEGORIES[category],
                            Choice::LETTERS[correct],
                            Choice::ALL[selected],
                        )
                        .joker(JOKERS[joker]);
                }
                if eliminated {
                    builder.eliminated()
                } else {
                    builder
                }
            })
            .collect();
        log_of(builders)
    })
}
