use super::reducers::percentage;
use shared::{
    dto::analytics::*,
    models::attempt::{pattern_key, Choice, ContestantRun},
    EventLog,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;

fn state(correct: bool) -> &'static str {
    if correct {
        "correct"
    } else {
        "wrong"
    }
}

fn bump<K: Ord>(map: &mut BTreeMap<K, usize>, key: K) {
    *map.entry(key).or_insert(0) += 1;
}

/// Counts of consecutive moves over every run. Each run of `n` attempts
/// contributes `n - 1` transitions.
pub fn transition_matrices(log: &EventLog, top_k: Option<usize>) -> TransitionMatricesDto {
    let mut matrices = TransitionMatricesDto::default();

    for run in log.runs() {
        for pair in run.attempts.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            bump(
                matrices
                    .choice_to_choice
                    .entry(current.selected_choice)
                    .or_default(),
                next.selected_choice,
            );
            bump(
                matrices
                    .correct_wrong_transitions
                    .entry(state(current.is_correct()).to_string())
                    .or_default(),
                state(next.is_correct()).to_string(),
            );
            bump(
                matrices
                    .category_transitions
                    .entry(current.category.clone())
                    .or_default(),
                next.selected_choice,
            );
        }
        for attempt in &run.attempts {
            bump(
                matrices.level_transitions.entry(attempt.level).or_default(),
                attempt.selected_choice,
            );
        }
    }

    matrices.top_transitions = top_k.map(|k| top_destinations(&matrices.choice_to_choice, k));
    matrices
}

/// The `k` most frequent destinations of every source, count descending,
/// ties in A < B < C < D < none order.
pub fn top_destinations(
    matrix: &ChoiceTable<ChoiceTable<usize>>,
    k: usize,
) -> ChoiceTable<Vec<DestinationCountDto>> {
    matrix
        .iter()
        .map(|(&from, row)| {
            let mut destinations: Vec<DestinationCountDto> = row
                .iter()
                .map(|(&to, &count)| DestinationCountDto { to, count })
                .collect();
            destinations.sort_by(|a, b| b.count.cmp(&a.count).then(a.to.cmp(&b.to)));
            destinations.truncate(k);
            (from, destinations)
        })
        .collect()
}

#[derive(Default)]
struct PatternAccumulator {
    occurrences: usize,
    survived: usize,
    eliminated: usize,
    correct_in_window: usize,
    next_choices: ChoiceTable<usize>,
    level_distribution: BTreeMap<u32, usize>,
    category_distribution: BTreeMap<String, usize>,
    contestants: Vec<String>,
}

impl PatternAccumulator {
    fn finish(self, length: usize) -> PatternStatsDto {
        PatternStatsDto {
            occurrences: self.occurrences,
            success_rate: percentage(self.survived, self.occurrences),
            elimination_rate: percentage(self.eliminated, self.occurrences),
            window_accuracy: percentage(self.correct_in_window, self.occurrences * length),
            next_choices: self.next_choices,
            level_distribution: self.level_distribution,
            category_distribution: self.category_distribution,
            contestants: self.contestants,
        }
    }
}

fn rank_patterns(a: &RankedPatternDto, b: &RankedPatternDto) -> Ordering {
    b.success_rate
        .total_cmp(&a.success_rate)
        .then(b.occurrences.cmp(&a.occurrences))
        .then_with(|| a.pattern.cmp(&b.pattern))
}

/// Every contiguous window of `length` choices across all runs.
///
/// All windows are kept in `patterns`; only those seen at least
/// `min_occurrences` times are ranked into `top_patterns`.
pub fn sequential_patterns(
    log: &EventLog,
    length: usize,
    min_occurrences: usize,
    top_n: usize,
) -> SequentialPatternsDto {
    let mut accumulators: BTreeMap<String, PatternAccumulator> = BTreeMap::new();

    if length > 0 {
        for run in log.runs() {
            let attempts = &run.attempts;
            for (start, window) in attempts.windows(length).enumerate() {
                let end = start + length;
                let choices: Vec<Choice> = window.iter().map(|a| a.selected_choice).collect();
                let acc = accumulators.entry(pattern_key(&choices)).or_default();

                acc.occurrences += 1;
                if run.eliminated && end == attempts.len() {
                    acc.eliminated += 1;
                } else {
                    acc.survived += 1;
                }
                acc.correct_in_window += window.iter().filter(|a| a.is_correct()).count();
                if let Some(next) = attempts.get(end) {
                    bump(&mut acc.next_choices, next.selected_choice);
                }
                for attempt in window {
                    bump(&mut acc.level_distribution, attempt.level);
                    bump(&mut acc.category_distribution, attempt.category.clone());
                }
                if acc.contestants.last() != Some(&run.contestant_id) {
                    acc.contestants.push(run.contestant_id.clone());
                }
            }
        }
    }

    let patterns: BTreeMap<String, PatternStatsDto> = accumulators
        .into_iter()
        .map(|(key, acc)| (key, acc.finish(length)))
        .collect();

    let mut top_patterns: Vec<RankedPatternDto> = patterns
        .iter()
        .filter(|(_, stats)| stats.occurrences >= min_occurrences)
        .map(|(key, stats)| RankedPatternDto {
            pattern: key.clone(),
            occurrences: stats.occurrences,
            success_rate: stats.success_rate,
            elimination_rate: stats.elimination_rate,
            window_accuracy: stats.window_accuracy,
        })
        .collect();
    top_patterns.sort_by(rank_patterns);
    top_patterns.truncate(top_n);

    SequentialPatternsDto {
        length,
        min_occurrences,
        patterns,
        top_patterns,
    }
}

/// Pattern tables for every length from 2 to `max_length`, keyed `length_N`.
pub fn deep_sequential_patterns(
    log: &EventLog,
    max_length: usize,
    min_occurrences: usize,
    top_n: usize,
) -> BTreeMap<String, SequentialPatternsDto> {
    (2..=max_length)
        .map(|length| {
            (
                format!("length_{}", length),
                sequential_patterns(log, length, min_occurrences, top_n),
            )
        })
        .collect()
}

#[derive(Default)]
struct FirstChoiceAccumulator {
    contestants: usize,
    final_level_sum: u64,
    eliminated: usize,
    correct_rate_sum: f64,
    second_choices: ChoiceTable<usize>,
    third_choices: ChoiceTable<usize>,
}

/// Runs grouped by their first choice.
pub fn first_choice_impact(log: &EventLog) -> ChoiceTable<FirstChoiceImpactDto> {
    let mut groups: BTreeMap<Choice, FirstChoiceAccumulator> = BTreeMap::new();

    for run in log.runs() {
        let mut choices = run.choices();
        let Some(first) = choices.next() else {
            continue;
        };
        let acc = groups.entry(first).or_default();
        acc.contestants += 1;
        acc.final_level_sum += u64::from(run.max_level_reached);
        acc.correct_rate_sum += run.correct_rate();
        if run.eliminated {
            acc.eliminated += 1;
        }
        if let Some(second) = choices.next() {
            bump(&mut acc.second_choices, second);
        }
        if let Some(third) = choices.next() {
            bump(&mut acc.third_choices, third);
        }
    }

    groups
        .into_iter()
        .map(|(first, acc)| {
            let n = acc.contestants as f64;
            (
                first,
                FirstChoiceImpactDto {
                    total_contestants: acc.contestants,
                    average_final_level: acc.final_level_sum as f64 / n,
                    elimination_rate: percentage(acc.eliminated, acc.contestants),
                    average_correct_rate: acc.correct_rate_sum / n * 100.0,
                    second_choices: acc.second_choices,
                    third_choices: acc.third_choices,
                },
            )
        })
        .collect()
}

/// What follows a correct or a wrong answer.
pub fn correct_wrong_patterns(log: &EventLog) -> BTreeMap<String, CorrectWrongPatternDto> {
    let mut counts: BTreeMap<String, (CorrectWrongPatternDto, usize, usize)> = BTreeMap::new();

    for run in log.runs() {
        let last = run.attempts.len().saturating_sub(1);
        for (i, pair) in run.attempts.windows(2).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);
            let (entry, next_correct, eliminated) = counts
                .entry(state(current.is_correct()).to_string())
                .or_default();
            entry.occurrences += 1;
            bump(&mut entry.next_choice_distribution, next.selected_choice);
            if next.is_correct() {
                *next_correct += 1;
            }
            if run.eliminated && i + 1 == last {
                *eliminated += 1;
            }
        }
    }

    counts
        .into_iter()
        .map(|(key, (mut entry, next_correct, eliminated))| {
            entry.next_is_correct_rate = percentage(next_correct, entry.occurrences);
            entry.elimination_rate = percentage(eliminated, entry.occurrences);
            (key, entry)
        })
        .collect()
}

/// Choice behaviour per level.
pub fn level_based_patterns(log: &EventLog) -> BTreeMap<u32, ChoiceTable<LevelChoicePatternDto>> {
    let mut levels: BTreeMap<u32, ChoiceTable<(LevelChoicePatternDto, usize, usize)>> =
        BTreeMap::new();

    for run in log.runs() {
        let last = run.attempts.len().saturating_sub(1);
        for (i, attempt) in run.attempts.iter().enumerate() {
            let (entry, correct, eliminated) = levels
                .entry(attempt.level)
                .or_default()
                .entry(attempt.selected_choice)
                .or_default();
            entry.count += 1;
            if attempt.is_correct() {
                *correct += 1;
            }
            if let Some(next) = run.attempts.get(i + 1) {
                bump(&mut entry.next_level_choice, next.selected_choice);
            }
            if run.eliminated && i == last {
                *eliminated += 1;
            }
        }
    }

    levels
        .into_iter()
        .map(|(level, table)| {
            let table = table
                .into_iter()
                .map(|(choice, (mut entry, correct, eliminated))| {
                    entry.success_rate = percentage(correct, entry.count);
                    entry.elimination_rate = percentage(eliminated, entry.count);
                    (choice, entry)
                })
                .collect();
            (level, table)
        })
        .collect()
}

/// Level a run must reach to count as a high performer.
pub const HIGH_PERFORMER_LEVEL: u32 = 10;

/// Patterns of length 2 to 4 shared by high performers. Empty unless at
/// least three high performers exist.
pub fn winning_patterns(log: &EventLog, min_occurrences: usize) -> Vec<WinningPatternDto> {
    let high: Vec<&ContestantRun> = log
        .runs()
        .iter()
        .filter(|run| run.max_level_reached >= HIGH_PERFORMER_LEVEL)
        .collect();
    if high.len() < 3 {
        return Vec::new();
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for run in &high {
        let choices: Vec<Choice> = run.choices().collect();
        for length in 2..=4 {
            for window in choices.windows(length) {
                bump(&mut counts, pattern_key(window));
            }
        }
    }

    let mut patterns: Vec<WinningPatternDto> = counts
        .into_iter()
        .filter(|&(_, occurrences)| occurrences >= min_occurrences)
        .map(|(pattern, occurrences)| WinningPatternDto {
            pattern,
            occurrences,
            success_rate: percentage(occurrences, high.len()),
        })
        .collect();
    patterns.sort_by(|a, b| b.success_rate.total_cmp(&a.success_rate));
    patterns
}

pub fn pattern_summary(log: &EventLog) -> PatternSummaryDto {
    let runs = log.runs();
    let eliminated = runs.iter().filter(|run| run.eliminated).count();
    PatternSummaryDto {
        total_contestants: runs.len(),
        total_questions: log.len(),
        average_questions_per_contestant: if runs.is_empty() {
            0.0
        } else {
            log.len() as f64 / runs.len() as f64
        },
        elimination_rate: percentage(eliminated, runs.len()),
    }
}
