use crate::models::attempt::{Choice, Joker};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-choice table, always keyed by A, B, C, D.
pub type ChoiceTable<T> = BTreeMap<Choice, T>;

/// Headline numbers for the whole log.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OverviewStatsDto {
    pub total_questions: usize,
    pub total_contestants: usize,
    pub total_videos: usize,
    pub overall_accuracy: f64,
    pub total_eliminated: usize,
    /// Mean of every contestant's final level.
    pub average_level: f64,
}

/// Accuracy of one category, split at the configured level threshold.
///
/// The `before_level_7` family of names is kept for dashboard
/// compatibility; `level_threshold` says where the split actually is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryStatsDto {
    pub category: String,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub accuracy: f64,
    pub eliminated_count: usize,
    pub average_level: f64,
    pub level_threshold: u32,
    pub before_level_7: usize,
    pub level_7_and_after: usize,
    pub before_level_7_accuracy: f64,
    pub level_7_and_after_accuracy: f64,
    pub level_distribution: BTreeMap<String, usize>,
}

impl CategoryStatsDto {
    /// Zero entry for a category that does not occur in the log.
    pub fn empty(category: impl Into<String>, level_threshold: u32) -> Self {
        Self {
            category: category.into(),
            level_threshold,
            level_distribution: (1..=15).map(|level| (format!("level_{}", level), 0)).collect(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LevelStatsDto {
    pub level: u32,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub accuracy: f64,
    /// Prize amount of the first question seen at this level.
    pub amount: f64,
    pub eliminated_count: usize,
    pub elimination_rate: f64,
    pub category_distribution: BTreeMap<String, usize>,
    pub most_common_category: Option<String>,
}

impl LevelStatsDto {
    pub fn empty(level: u32) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JokerStatsDto {
    pub joker: Joker,
    pub count: usize,
    pub correct_answers: usize,
    pub accuracy: f64,
    pub eliminated_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContestantPerformanceDto {
    pub contestant: String,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub accuracy: f64,
    pub max_level: u32,
    pub total_winnings: f64,
    pub eliminated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChoiceAccuracyDto {
    pub total_questions: usize,
    pub accuracy: f64,
    pub times_correct: usize,
    pub times_chosen: usize,
}

/// Share of all questions where each letter was selected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SelectionShareDto {
    pub a_bias: f64,
    pub b_bias: f64,
    pub c_bias: f64,
    pub d_bias: f64,
}

/// `choice` is empty and `count` zero when nothing was counted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChoiceCountDto {
    pub choice: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnswerChoiceStatsDto {
    pub correct_answer_distribution: ChoiceTable<usize>,
    pub contestant_answer_distribution: ChoiceTable<usize>,
    pub choice_accuracy: ChoiceTable<ChoiceAccuracyDto>,
    pub bias_analysis: SelectionShareDto,
    pub most_selected_choice: ChoiceCountDto,
    pub most_correct_choice: ChoiceCountDto,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LevelCountDto {
    pub level: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryCountDto {
    pub category: String,
    pub count: usize,
}

/// Percentage of attempts in a level band that did not end the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SafePassageRateDto {
    pub before_level_5: f64,
    pub level_5_to_10: f64,
    pub level_10_and_above: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EliminationAnalysisDto {
    pub total_eliminations: usize,
    pub elimination_by_level: BTreeMap<String, usize>,
    pub elimination_by_category: BTreeMap<String, usize>,
    pub most_dangerous_levels: Vec<LevelCountDto>,
    pub most_dangerous_category: CategoryCountDto,
    pub safe_passage_rate: SafePassageRateDto,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PreparationPriority {
    #[serde(rename = "High Priority")]
    High,
    #[serde(rename = "Medium Priority")]
    Medium,
    #[serde(rename = "Low Priority")]
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicPreparationDto {
    pub total_questions: usize,
    pub difficulty_assessment: Difficulty,
    pub accuracy_rate: f64,
    pub early_levels_count: usize,
    pub mid_levels_count: usize,
    pub late_levels_count: usize,
    pub priority_score: f64,
    pub elimination_risk: usize,
    pub common_levels: Vec<u32>,
    pub preparation_recommendation: PreparationPriority,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StudyRecommendationsDto {
    pub focus_categories: Vec<String>,
    pub review_categories: Vec<String>,
    pub maintenance_categories: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TopicPreparationGuideDto {
    pub categories: BTreeMap<String, TopicPreparationDto>,
    pub priority_order: Vec<String>,
    pub study_recommendations: StudyRecommendationsDto,
}

/// Selection-vs-correctness figures for one letter within a subset.
///
/// `chosen_percentage` is relative to answered questions while
/// `correct_percentage` is relative to every question of the subset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChoiceBiasDto {
    pub correct_percentage: f64,
    pub chosen_percentage: f64,
    pub bias_score: f64,
    pub correct_count: usize,
    pub chosen_count: usize,
    pub total_questions: usize,
    pub answered_questions: usize,
    /// Percentage of `chosen_count` that was also correct.
    pub accuracy: f64,
}

/// Same comparison with both shares taken over the whole subset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShareBiasDto {
    pub correct_percentage: f64,
    pub chosen_percentage: f64,
    pub bias_score: f64,
    pub correct_count: usize,
    pub chosen_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChoicePerformanceDto {
    pub recognition_rate: f64,
    pub accuracy_when_chosen: f64,
    /// Times chosen per hundred times correct.
    pub overconfidence: f64,
    pub total_correct: usize,
    pub total_chosen: usize,
    pub correctly_identified: usize,
    pub wrongly_chosen: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiasedChoiceDto {
    pub choice: Choice,
    pub bias_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccurateChoiceDto {
    pub choice: Choice,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverconfidentChoiceDto {
    pub choice: Choice,
    pub overconfidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategicRecommendationsDto {
    pub avoid_bias_toward: Option<Choice>,
    pub trust_when_seeing: Choice,
    pub be_cautious_with: Option<Choice>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiasInsightsDto {
    pub most_biased_choice: BiasedChoiceDto,
    pub most_accurate_choice: AccurateChoiceDto,
    pub most_overconfident_choice: OverconfidentChoiceDto,
    pub strategic_recommendations: StrategicRecommendationsDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailedAnswerAnalysisDto {
    pub level_threshold: u32,
    pub overall_bias: ChoiceTable<ChoiceBiasDto>,
    /// Keyed `before_level_7` and `level_7_and_after`.
    pub before_after_level_7: BTreeMap<String, ChoiceTable<ChoiceBiasDto>>,
    pub level_bias: BTreeMap<String, ChoiceTable<ChoiceBiasDto>>,
    pub category_bias: BTreeMap<String, ChoiceTable<ChoiceBiasDto>>,
    /// Keyed `easy` (answered correctly) and `hard` (answered wrongly).
    pub difficulty_bias: BTreeMap<String, ChoiceTable<ShareBiasDto>>,
    /// Keyed `eliminated` and `safe`.
    pub elimination_pattern_bias: BTreeMap<String, ChoiceTable<ShareBiasDto>>,
    pub correct_vs_chosen_analysis: ChoiceTable<ChoicePerformanceDto>,
    pub insights: BiasInsightsDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DestinationCountDto {
    pub to: Choice,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransitionMatricesDto {
    pub choice_to_choice: ChoiceTable<ChoiceTable<usize>>,
    /// `correct` / `wrong` state of attempt i to the state of attempt i+1.
    pub correct_wrong_transitions: BTreeMap<String, BTreeMap<String, usize>>,
    /// Choice counts per level.
    pub level_transitions: BTreeMap<u32, ChoiceTable<usize>>,
    /// Category of attempt i to the choice made at attempt i+1.
    pub category_transitions: BTreeMap<String, ChoiceTable<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_transitions: Option<ChoiceTable<Vec<DestinationCountDto>>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatternStatsDto {
    pub occurrences: usize,
    /// Share of occurrences where the run continued past the window.
    pub success_rate: f64,
    pub elimination_rate: f64,
    /// Mean correctness of the attempts inside the window.
    pub window_accuracy: f64,
    pub next_choices: ChoiceTable<usize>,
    pub level_distribution: BTreeMap<u32, usize>,
    pub category_distribution: BTreeMap<String, usize>,
    pub contestants: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RankedPatternDto {
    pub pattern: String,
    pub occurrences: usize,
    pub success_rate: f64,
    pub elimination_rate: f64,
    pub window_accuracy: f64,
}

/// Every window of one length, plus the ranked patterns that cleared the
/// minimum occurrence threshold.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SequentialPatternsDto {
    pub length: usize,
    pub min_occurrences: usize,
    pub patterns: BTreeMap<String, PatternStatsDto>,
    pub top_patterns: Vec<RankedPatternDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FirstChoiceImpactDto {
    pub total_contestants: usize,
    pub average_final_level: f64,
    pub elimination_rate: f64,
    pub average_correct_rate: f64,
    pub second_choices: ChoiceTable<usize>,
    pub third_choices: ChoiceTable<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CorrectWrongPatternDto {
    pub occurrences: usize,
    pub next_choice_distribution: ChoiceTable<usize>,
    pub next_is_correct_rate: f64,
    pub elimination_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LevelChoicePatternDto {
    pub count: usize,
    pub next_level_choice: ChoiceTable<usize>,
    pub success_rate: f64,
    pub elimination_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WinningPatternDto {
    pub pattern: String,
    pub occurrences: usize,
    /// Occurrences per hundred high performers.
    pub success_rate: f64,
}

/// Named, non-exclusive contestant groups. Every cluster is always
/// serialized, empty or not.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformanceClustersDto {
    pub high_performers: Vec<String>,
    pub mid_performers: Vec<String>,
    pub early_eliminators: Vec<String>,
    pub early_withdrawals: Vec<String>,
    pub joker_dependent: Vec<String>,
    pub pattern_followers: Vec<String>,
}

impl PerformanceClustersDto {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Vec<String>)> {
        [
            ("high_performers", &self.high_performers),
            ("mid_performers", &self.mid_performers),
            ("early_eliminators", &self.early_eliminators),
            ("early_withdrawals", &self.early_withdrawals),
            ("joker_dependent", &self.joker_dependent),
            ("pattern_followers", &self.pattern_followers),
        ]
        .into_iter()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatternSummaryDto {
    pub total_contestants: usize,
    pub total_questions: usize,
    pub average_questions_per_contestant: f64,
    pub elimination_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatternAnalysisDto {
    pub summary_statistics: PatternSummaryDto,
    pub transition_matrices: TransitionMatricesDto,
    pub sequential_patterns: SequentialPatternsDto,
    pub deep_sequential_patterns: BTreeMap<String, SequentialPatternsDto>,
    pub first_choice_patterns: ChoiceTable<FirstChoiceImpactDto>,
    pub correct_wrong_patterns: BTreeMap<String, CorrectWrongPatternDto>,
    pub level_based_patterns: BTreeMap<u32, ChoiceTable<LevelChoicePatternDto>>,
    pub winning_patterns: Vec<WinningPatternDto>,
    pub performance_clusters: PerformanceClustersDto,
}

/// One section of the combined report. A failed section carries its
/// error message instead of data and never hides the other sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ReportSection<T> {
    Ready(T),
    Failed { error: String },
}

impl<T> ReportSection<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, ReportSection::Ready(_))
    }
}

impl<T, E: std::fmt::Display> From<std::result::Result<T, E>> for ReportSection<T> {
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(value) => ReportSection::Ready(value),
            Err(error) => ReportSection::Failed {
                error: error.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportDto {
    pub stats: ReportSection<OverviewStatsDto>,
    pub category_stats: ReportSection<Vec<CategoryStatsDto>>,
    pub level_stats: ReportSection<Vec<LevelStatsDto>>,
    pub joker_stats: ReportSection<Vec<JokerStatsDto>>,
    pub contestant_performance: ReportSection<Vec<ContestantPerformanceDto>>,
    pub answer_choice_stats: ReportSection<AnswerChoiceStatsDto>,
    pub elimination_analysis: ReportSection<EliminationAnalysisDto>,
    pub topic_preparation_guide: ReportSection<TopicPreparationGuideDto>,
    pub detailed_answer_analysis: ReportSection<DetailedAnswerAnalysisDto>,
    pub pattern_analysis: ReportSection<PatternAnalysisDto>,
}
