use serde::Deserialize;
use serde_json::Value;

/// One contestant entry of a raw per-video dump.
///
/// Dumps come in two shapes: a contestant with a nested
/// `questions_answered` list, or one flat object per question.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub contestant: String,
    #[serde(default)]
    pub questions_answered: Option<Vec<RawQuestion>>,
    #[serde(flatten)]
    pub flat: RawQuestion,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub contestant_answer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Number or numeric string; anything else counts as 0.
    #[serde(default)]
    pub level: Value,
    #[serde(default)]
    pub amount: Value,
    #[serde(default)]
    pub joker_used: Option<String>,
    #[serde(default)]
    pub eliminated: Value,
}

impl RawQuestion {
    pub fn level(&self) -> i64 {
        match &self.level {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
            Value::String(s) => s.trim().parse::<f64>().map(|f| f as i64).unwrap_or(0),
            _ => 0,
        }
    }

    /// Prize amount; thousands separators (`1.000`, `1,000`) are stripped.
    pub fn amount(&self) -> f64 {
        match &self.amount {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect::<String>()
                .parse()
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn eliminated(&self) -> bool {
        match &self.eliminated {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_i64().map(|v| v != 0).unwrap_or(false),
            Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
            _ => false,
        }
    }
}
