pub mod models {
    pub mod attempt;
    pub mod event_log;
}

pub mod dto {
    pub mod attempt;
    pub mod analytics;
}

pub mod error;

// Re-export commonly used items
pub use error::{SharedError, Result};

// Re-export models
pub use models::{
    attempt::{pattern_key, AttemptRecord, Choice, ContestantRun, Joker},
    event_log::EventLog,
};

// Re-export DTOs
pub use dto::{
    attempt::{records_from_rows, AttemptRow},
    analytics::*,
};
