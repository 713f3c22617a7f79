use super::engine::AnalyticsEngine;
use super::reducers::StatSort;
use super::repository::AttemptRepository;
use crate::metrics::{record_computation, Metrics};
use shared::{dto::analytics::*, AttemptRow, EventLog, Result, SharedError};
use std::sync::Arc;
use std::time::Instant;

/// Facade composing the analytics passes into endpoint responses.
///
/// Every query loads a fresh snapshot from the repository; nothing is
/// cached between calls.
#[derive(Clone)]
pub struct AnalyticsUseCase {
    repo: Arc<dyn AttemptRepository>,
    engine: AnalyticsEngine,
}

impl AnalyticsUseCase {
    pub fn new(repo: Arc<dyn AttemptRepository>, engine: AnalyticsEngine) -> Self {
        Self { repo, engine }
    }

    pub fn engine(&self) -> &AnalyticsEngine {
        &self.engine
    }

    pub fn repository(&self) -> &Arc<dyn AttemptRepository> {
        &self.repo
    }

    async fn snapshot(&self) -> Result<Arc<EventLog>> {
        self.repo.load_log().await.map(Arc::new)
    }

    /// Runs one pass on the blocking pool and records its duration.
    async fn run_pass<T, F>(&self, operation: &'static str, log: Arc<EventLog>, pass: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&AnalyticsEngine, &EventLog) -> T + Send + 'static,
    {
        let engine = self.engine.clone();
        let start = Instant::now();
        let result = tokio::task::spawn_blocking(move || pass(&engine, &log))
            .await
            .map_err(|e| SharedError::Internal(format!("{} pass failed: {}", operation, e)));

        if let Some(metrics) = Metrics::global() {
            record_computation(metrics, operation, result.is_ok(), start.elapsed());
        }
        result
    }

    async fn compute<T, F>(&self, operation: &'static str, pass: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&AnalyticsEngine, &EventLog) -> T + Send + 'static,
    {
        let log = self.snapshot().await?;
        self.run_pass(operation, log, pass).await
    }

    /// The validated records in wire form.
    pub async fn data(&self) -> Result<Vec<AttemptRow>> {
        self.compute("data", |_, log| log.records().iter().map(AttemptRow::from).collect())
            .await
    }

    pub async fn overview_stats(&self) -> Result<OverviewStatsDto> {
        self.compute("overview_stats", |engine, log| engine.overview_stats(log))
            .await
    }

    pub async fn category_stats(&self, sort: StatSort) -> Result<Vec<CategoryStatsDto>> {
        self.compute("category_stats", move |engine, log| engine.category_stats(log, sort))
            .await
    }

    pub async fn category_stat(&self, category: String) -> Result<CategoryStatsDto> {
        self.compute("category_stats", move |engine, log| {
            engine.category_stat(log, &category)
        })
        .await
    }

    pub async fn level_stats(&self) -> Result<Vec<LevelStatsDto>> {
        self.compute("level_stats", |engine, log| engine.level_stats(log))
            .await
    }

    pub async fn level_stat(&self, level: u32) -> Result<LevelStatsDto> {
        self.compute("level_stats", move |engine, log| engine.level_stat(log, level))
            .await
    }

    pub async fn joker_stats(&self, sort: StatSort) -> Result<Vec<JokerStatsDto>> {
        self.compute("joker_stats", move |engine, log| engine.joker_stats(log, sort))
            .await
    }

    pub async fn contestant_performance(&self) -> Result<Vec<ContestantPerformanceDto>> {
        self.compute("contestant_performance", |engine, log| {
            engine.contestant_performance(log)
        })
        .await
    }

    pub async fn answer_choice_stats(&self) -> Result<AnswerChoiceStatsDto> {
        self.compute("answer_choice_stats", |engine, log| engine.answer_choice_stats(log))
            .await
    }

    pub async fn elimination_analysis(&self) -> Result<EliminationAnalysisDto> {
        self.compute("elimination_analysis", |engine, log| engine.elimination_analysis(log))
            .await
    }

    pub async fn topic_preparation_guide(&self) -> Result<TopicPreparationGuideDto> {
        self.compute("topic_preparation_guide", |engine, log| {
            engine.topic_preparation_guide(log)
        })
        .await
    }

    pub async fn detailed_answer_analysis(&self) -> Result<DetailedAnswerAnalysisDto> {
        self.compute("detailed_answer_analysis", |engine, log| {
            engine.detailed_answer_analysis(log)
        })
        .await
    }

    pub async fn pattern_analysis(&self, top_k: Option<usize>) -> Result<PatternAnalysisDto> {
        let log = self.snapshot().await?;
        self.patterns_for(log, top_k).await
    }

    /// Independent sequence passes run concurrently; clusters wait for the
    /// reported top patterns.
    async fn patterns_for(&self, log: Arc<EventLog>, top_k: Option<usize>) -> Result<PatternAnalysisDto> {
        let (
            summary_statistics,
            transition_matrices,
            sequential_patterns,
            deep_sequential_patterns,
            first_choice_patterns,
            correct_wrong_patterns,
            level_based_patterns,
            winning_patterns,
        ) = tokio::try_join!(
            self.run_pass("pattern_summary", log.clone(), |_, log| {
                super::sequence::pattern_summary(log)
            }),
            self.run_pass("transition_matrices", log.clone(), move |engine, log| {
                engine.transition_matrices(log, top_k)
            }),
            self.run_pass("sequential_patterns", log.clone(), |engine, log| {
                engine.sequential_patterns(log)
            }),
            self.run_pass("deep_sequential_patterns", log.clone(), |engine, log| {
                engine.deep_sequential_patterns(log)
            }),
            self.run_pass("first_choice_impact", log.clone(), |_, log| {
                super::sequence::first_choice_impact(log)
            }),
            self.run_pass("correct_wrong_patterns", log.clone(), |_, log| {
                super::sequence::correct_wrong_patterns(log)
            }),
            self.run_pass("level_based_patterns", log.clone(), |_, log| {
                super::sequence::level_based_patterns(log)
            }),
            self.run_pass("winning_patterns", log.clone(), |engine, log| {
                engine.winning_patterns(log)
            }),
        )?;

        let headline = sequential_patterns.clone();
        let deep = deep_sequential_patterns.clone();
        let performance_clusters = self
            .run_pass("performance_clusters", log, move |engine, log| {
                engine.performance_clusters(log, &headline, &deep)
            })
            .await?;

        Ok(PatternAnalysisDto {
            summary_statistics,
            transition_matrices,
            sequential_patterns,
            deep_sequential_patterns,
            first_choice_patterns,
            correct_wrong_patterns,
            level_based_patterns,
            winning_patterns,
            performance_clusters,
        })
    }

    /// Every section computed concurrently over one snapshot. A failed
    /// section is reported in place; a log that fails to load fails the
    /// whole report.
    pub async fn report(&self) -> Result<ReportDto> {
        let log = self.snapshot().await?;

        let (
            stats,
            category_stats,
            level_stats,
            joker_stats,
            contestant_performance,
            answer_choice_stats,
            elimination_analysis,
            topic_preparation_guide,
            detailed_answer_analysis,
            pattern_analysis,
        ) = tokio::join!(
            self.run_pass("overview_stats", log.clone(), |engine, log| engine.overview_stats(log)),
            self.run_pass("category_stats", log.clone(), |engine, log| {
                engine.category_stats(log, StatSort::default())
            }),
            self.run_pass("level_stats", log.clone(), |engine, log| engine.level_stats(log)),
            self.run_pass("joker_stats", log.clone(), |engine, log| {
                engine.joker_stats(log, StatSort::default())
            }),
            self.run_pass("contestant_performance", log.clone(), |engine, log| {
                engine.contestant_performance(log)
            }),
            self.run_pass("answer_choice_stats", log.clone(), |engine, log| {
                engine.answer_choice_stats(log)
            }),
            self.run_pass("elimination_analysis", log.clone(), |engine, log| {
                engine.elimination_analysis(log)
            }),
            self.run_pass("topic_preparation_guide", log.clone(), |engine, log| {
                engine.topic_preparation_guide(log)
            }),
            self.run_pass("detailed_answer_analysis", log.clone(), |engine, log| {
                engine.detailed_answer_analysis(log)
            }),
            self.patterns_for(log.clone(), None),
        );

        let report = ReportDto {
            stats: stats.into(),
            category_stats: category_stats.into(),
            level_stats: level_stats.into(),
            joker_stats: joker_stats.into(),
            contestant_performance: contestant_performance.into(),
            answer_choice_stats: answer_choice_stats.into(),
            elimination_analysis: elimination_analysis.into(),
            topic_preparation_guide: topic_preparation_guide.into(),
            detailed_answer_analysis: detailed_answer_analysis.into(),
            pattern_analysis: pattern_analysis.into(),
        };
        log::debug!("Built report over {} attempts", log.len());
        Ok(report)
    }
}
