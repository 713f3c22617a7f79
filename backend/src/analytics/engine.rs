use super::{bias, clusters, reducers, sequence};
use super::reducers::StatSort;
use crate::config::AnalyticsConfig;
use shared::{dto::analytics::*, EventLog};

/// Core analytics calculation engine.
///
/// Every method is a pure pass over an immutable [`EventLog`]; the engine
/// only carries the tunable thresholds.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn overview_stats(&self, log: &EventLog) -> OverviewStatsDto {
        reducers::overview_stats(log)
    }

    pub fn category_stats(&self, log: &EventLog, sort: StatSort) -> Vec<CategoryStatsDto> {
        reducers::category_stats(log, self.config.level_threshold, sort)
    }

    /// Stats of one category, a zero entry when it never occurs.
    pub fn category_stat(&self, log: &EventLog, category: &str) -> CategoryStatsDto {
        reducers::category_stat(log, category, self.config.level_threshold)
    }

    pub fn level_stats(&self, log: &EventLog) -> Vec<LevelStatsDto> {
        reducers::level_stats(log)
    }

    pub fn level_stat(&self, log: &EventLog, level: u32) -> LevelStatsDto {
        reducers::level_stat(log, level)
    }

    pub fn joker_stats(&self, log: &EventLog, sort: StatSort) -> Vec<JokerStatsDto> {
        reducers::joker_stats(log, sort)
    }

    pub fn contestant_performance(&self, log: &EventLog) -> Vec<ContestantPerformanceDto> {
        reducers::contestant_performance(log)
    }

    pub fn answer_choice_stats(&self, log: &EventLog) -> AnswerChoiceStatsDto {
        reducers::answer_choice_stats(log)
    }

    pub fn elimination_analysis(&self, log: &EventLog) -> EliminationAnalysisDto {
        reducers::elimination_analysis(log)
    }

    pub fn topic_preparation_guide(&self, log: &EventLog) -> TopicPreparationGuideDto {
        reducers::topic_preparation_guide(log)
    }

    pub fn detailed_answer_analysis(&self, log: &EventLog) -> DetailedAnswerAnalysisDto {
        bias::detailed_answer_analysis(log, self.config.level_threshold)
    }

    pub fn transition_matrices(&self, log: &EventLog, top_k: Option<usize>) -> TransitionMatricesDto {
        sequence::transition_matrices(log, top_k.or(self.config.transition_top_k))
    }

    /// The headline n-gram table (window `pattern_window`).
    pub fn sequential_patterns(&self, log: &EventLog) -> SequentialPatternsDto {
        sequence::sequential_patterns(
            log,
            self.config.pattern_window,
            self.config.min_pattern_occurrences,
            self.config.top_patterns,
        )
    }

    pub fn deep_sequential_patterns(
        &self,
        log: &EventLog,
    ) -> std::collections::BTreeMap<String, SequentialPatternsDto> {
        sequence::deep_sequential_patterns(
            log,
            self.config.max_pattern_length,
            self.config.min_pattern_occurrences,
            self.config.top_patterns,
        )
    }

    pub fn winning_patterns(&self, log: &EventLog) -> Vec<WinningPatternDto> {
        sequence::winning_patterns(log, self.config.min_pattern_occurrences)
    }

    pub fn performance_clusters(
        &self,
        log: &EventLog,
        headline: &SequentialPatternsDto,
        deep: &std::collections::BTreeMap<String, SequentialPatternsDto>,
    ) -> PerformanceClustersDto {
        let keys = clusters::reported_pattern_keys(headline, deep);
        clusters::performance_clusters(log, &keys)
    }

    /// Every sequence pass in one sequential call. The use case runs the
    /// same passes concurrently; results are identical.
    pub fn pattern_analysis(&self, log: &EventLog, top_k: Option<usize>) -> PatternAnalysisDto {
        let sequential_patterns = self.sequential_patterns(log);
        let deep_sequential_patterns = self.deep_sequential_patterns(log);
        let performance_clusters =
            self.performance_clusters(log, &sequential_patterns, &deep_sequential_patterns);

        PatternAnalysisDto {
            summary_statistics: sequence::pattern_summary(log),
            transition_matrices: self.transition_matrices(log, top_k),
            sequential_patterns,
            deep_sequential_patterns,
            first_choice_patterns: sequence::first_choice_impact(log),
            correct_wrong_patterns: sequence::correct_wrong_patterns(log),
            level_based_patterns: sequence::level_based_patterns(log),
            winning_patterns: self.winning_patterns(log),
            performance_clusters,
        }
    }
}
