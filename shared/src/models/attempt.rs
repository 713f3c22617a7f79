use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Answer option of a question. `None` marks a skipped or unanswered
/// question (for example when a joker replaced the answer).
///
/// The declaration order is the tie-break order used by every analyzer:
/// A < B < C < D < none.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Choice {
    A,
    B,
    C,
    D,
    #[serde(rename = "none")]
    None,
}

impl Choice {
    /// The four real answer letters, in tie-break order.
    pub const LETTERS: [Choice; 4] = [Choice::A, Choice::B, Choice::C, Choice::D];

    /// Every state of a choice sequence, `none` included.
    pub const ALL: [Choice; 5] = [Choice::A, Choice::B, Choice::C, Choice::D, Choice::None];

    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::A => "A",
            Choice::B => "B",
            Choice::C => "C",
            Choice::D => "D",
            Choice::None => "none",
        }
    }

    pub fn is_answer(&self) -> bool {
        !matches!(self, Choice::None)
    }

    /// Parses a selected choice, treating blank cells as `none`.
    pub fn parse_selected(value: &str) -> Result<Self, String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Choice::None);
        }
        trimmed.parse()
    }

    /// Parses a correct choice; `none` is not a valid answer key.
    pub fn parse_correct(value: &str) -> Result<Self, String> {
        match value.trim().parse::<Choice>()? {
            Choice::None => Err(format!("correct choice must be one of A, B, C, D, got '{}'", value.trim())),
            choice => Ok(choice),
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a" => Ok(Choice::A),
            "b" => Ok(Choice::B),
            "c" => Ok(Choice::C),
            "d" => Ok(Choice::D),
            "none" | "nan" => Ok(Choice::None),
            other => Err(format!("invalid choice '{}'", other)),
        }
    }
}

/// Lifeline active at an attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Joker {
    None,
    FiftyFifty,
    PhoneAFriend,
    AskAudience,
    SwitchQuestion,
}

impl Joker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Joker::None => "none",
            Joker::FiftyFifty => "fifty_fifty",
            Joker::PhoneAFriend => "phone_a_friend",
            Joker::AskAudience => "ask_audience",
            Joker::SwitchQuestion => "switch_question",
        }
    }

    pub fn is_used(&self) -> bool {
        !matches!(self, Joker::None)
    }
}

impl fmt::Display for Joker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Joker {
    type Err = String;

    /// Accepts the English names as well as the labels used by the
    /// Turkish transcripts the dataset was extracted from.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "" | "none" | "yok" => Ok(Joker::None),
            "fifty_fifty" | "50_50" | "50:50" | "yarı_yarıya" | "yari_yariya" => Ok(Joker::FiftyFifty),
            "phone_a_friend" | "phone" | "telefon" => Ok(Joker::PhoneAFriend),
            "ask_audience" | "ask_the_audience" | "audience" | "seyirci" => Ok(Joker::AskAudience),
            "switch_question" | "switch" | "değiştir" | "degistir" => Ok(Joker::SwitchQuestion),
            _ => Err(format!("unknown joker '{}'", s.trim())),
        }
    }
}

/// One question answered by one contestant. Immutable once ingested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptRecord {
    pub contestant_id: String,
    pub video_id: Option<String>,
    pub question: Option<String>,
    pub category: String,
    pub level: u32,
    pub amount: f64,
    pub correct_choice: Choice,
    pub selected_choice: Choice,
    pub joker_used: Joker,
    pub eliminated: bool,
    pub sequence_index: usize,
}

impl AttemptRecord {
    pub fn is_correct(&self) -> bool {
        self.selected_choice == self.correct_choice
    }

    pub fn is_answered(&self) -> bool {
        self.selected_choice.is_answer()
    }
}

/// A contestant's full run, derived from their attempts in sequence order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContestantRun {
    pub contestant_id: String,
    pub attempts: Vec<AttemptRecord>,
    pub max_level_reached: u32,
    pub eliminated: bool,
    /// Amount of the highest level answered correctly, 0 if none.
    pub total_winnings: f64,
    pub jokers_used: BTreeSet<Joker>,
}

impl ContestantRun {
    /// Builds the run from attempts already sorted by `sequence_index`.
    pub fn from_attempts(contestant_id: String, attempts: Vec<AttemptRecord>) -> Self {
        let max_level_reached = attempts.iter().map(|a| a.level).max().unwrap_or(0);
        let eliminated = attempts.iter().any(|a| a.eliminated);
        let total_winnings = attempts
            .iter()
            .filter(|a| a.is_correct())
            .max_by_key(|a| a.level)
            .map(|a| a.amount)
            .unwrap_or(0.0);
        let jokers_used = attempts
            .iter()
            .map(|a| a.joker_used)
            .filter(Joker::is_used)
            .collect();

        Self {
            contestant_id,
            attempts,
            max_level_reached,
            eliminated,
            total_winnings,
            jokers_used,
        }
    }

    pub fn choices(&self) -> impl Iterator<Item = Choice> + '_ {
        self.attempts.iter().map(|a| a.selected_choice)
    }

    pub fn correct_answers(&self) -> usize {
        self.attempts.iter().filter(|a| a.is_correct()).count()
    }

    /// Share of this run's attempts answered correctly, as a fraction.
    pub fn correct_rate(&self) -> f64 {
        if self.attempts.is_empty() {
            0.0
        } else {
            self.correct_answers() as f64 / self.attempts.len() as f64
        }
    }

    /// The run's choices joined the same way pattern keys are, e.g. `A->B->none`.
    pub fn choice_key(&self) -> String {
        pattern_key(&self.choices().collect::<Vec<_>>())
    }
}

/// Joins a choice window into its pattern key, e.g. `A->B->C`.
pub fn pattern_key(choices: &[Choice]) -> String {
    choices
        .iter()
        .map(Choice::as_str)
        .collect::<Vec<_>>()
        .join("->")
}
