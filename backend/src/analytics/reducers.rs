use shared::{
    dto::analytics::*,
    models::attempt::{AttemptRecord, Choice, Joker},
    EventLog,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

/// Highest level reported in a category's `level_distribution`.
const DISTRIBUTION_MAX_LEVEL: u32 = 15;

/// `part / whole * 100`, or `0.0` when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Output order of grouped reducers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatSort {
    /// Groups appear in the order their key first occurs in the log.
    #[default]
    FirstOccurrence,
    TotalQuestionsDesc,
}

/// Running counts for one grouping key.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub total: usize,
    pub correct: usize,
    pub eliminated: usize,
}

impl Tally {
    pub fn add(&mut self, record: &AttemptRecord) {
        self.total += 1;
        if record.is_correct() {
            self.correct += 1;
        }
        if record.eliminated {
            self.eliminated += 1;
        }
    }

    pub fn accuracy(&self) -> f64 {
        percentage(self.correct, self.total)
    }

    pub fn elimination_rate(&self) -> f64 {
        percentage(self.eliminated, self.total)
    }

    pub fn of<'a>(records: impl IntoIterator<Item = &'a AttemptRecord>) -> Self {
        let mut tally = Self::default();
        for record in records {
            tally.add(record);
        }
        tally
    }
}

/// Groups kept in first-occurrence order of their key.
pub(crate) struct OrderedGroups<K, V> {
    index: HashMap<K, usize>,
    groups: Vec<(K, V)>,
}

impl<K: Eq + Hash + Clone, V: Default> OrderedGroups<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    pub(crate) fn entry(&mut self, key: &K) -> &mut V {
        let position = match self.index.get(key) {
            Some(&position) => position,
            None => {
                self.groups.push((key.clone(), V::default()));
                self.index.insert(key.clone(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        &mut self.groups[position].1
    }

    pub(crate) fn into_vec(self) -> Vec<(K, V)> {
        self.groups
    }
}

/// Categories in first-occurrence order.
pub(crate) fn ordered_categories(log: &EventLog) -> Vec<&str> {
    let mut seen = HashSet::new();
    log.records()
        .iter()
        .map(|r| r.category.as_str())
        .filter(|category| seen.insert(*category))
        .collect()
}

#[derive(Default)]
struct CategoryAccumulator {
    all: Tally,
    level_sum: u64,
    before: Tally,
    after: Tally,
    levels: BTreeMap<u32, usize>,
}

fn category_entry(category: String, acc: CategoryAccumulator, level_threshold: u32) -> CategoryStatsDto {
    let level_distribution = (1..=DISTRIBUTION_MAX_LEVEL)
        .map(|level| {
            (
                format!("level_{}", level),
                acc.levels.get(&level).copied().unwrap_or(0),
            )
        })
        .collect();

    CategoryStatsDto {
        category,
        total_questions: acc.all.total,
        correct_answers: acc.all.correct,
        accuracy: acc.all.accuracy(),
        eliminated_count: acc.all.eliminated,
        average_level: if acc.all.total == 0 {
            0.0
        } else {
            acc.level_sum as f64 / acc.all.total as f64
        },
        level_threshold,
        before_level_7: acc.before.total,
        level_7_and_after: acc.after.total,
        before_level_7_accuracy: acc.before.accuracy(),
        level_7_and_after_accuracy: acc.after.accuracy(),
        level_distribution,
    }
}

pub fn category_stats(log: &EventLog, level_threshold: u32, sort: StatSort) -> Vec<CategoryStatsDto> {
    let mut groups: OrderedGroups<String, CategoryAccumulator> = OrderedGroups::new();

    for record in log.records() {
        let acc = groups.entry(&record.category);
        acc.all.add(record);
        acc.level_sum += u64::from(record.level);
        if record.level < level_threshold {
            acc.before.add(record);
        } else {
            acc.after.add(record);
        }
        *acc.levels.entry(record.level).or_insert(0) += 1;
    }

    let mut stats: Vec<CategoryStatsDto> = groups
        .into_vec()
        .into_iter()
        .map(|(category, acc)| category_entry(category, acc, level_threshold))
        .collect();

    if sort == StatSort::TotalQuestionsDesc {
        stats.sort_by(|a, b| b.total_questions.cmp(&a.total_questions));
    }
    stats
}

/// Stats of one category; a category absent from the log yields a zero entry.
pub fn category_stat(log: &EventLog, category: &str, level_threshold: u32) -> CategoryStatsDto {
    category_stats(log, level_threshold, StatSort::FirstOccurrence)
        .into_iter()
        .find(|stats| stats.category == category)
        .unwrap_or_else(|| CategoryStatsDto::empty(category, level_threshold))
}

#[derive(Default)]
struct LevelAccumulator<'a> {
    tally: Tally,
    amount: Option<f64>,
    categories: HashMap<&'a str, usize>,
}

/// Per-level stats, ascending by level.
pub fn level_stats(log: &EventLog) -> Vec<LevelStatsDto> {
    let categories = ordered_categories(log);
    let mut levels: BTreeMap<u32, LevelAccumulator> = BTreeMap::new();

    for record in log.records() {
        let acc = levels.entry(record.level).or_default();
        acc.tally.add(record);
        acc.amount.get_or_insert(record.amount);
        *acc.categories.entry(record.category.as_str()).or_insert(0) += 1;
    }

    levels
        .into_iter()
        .map(|(level, acc)| {
            let counts: Vec<(&str, usize)> = categories
                .iter()
                .map(|&category| (category, acc.categories.get(category).copied().unwrap_or(0)))
                .collect();
            let most_common_category = counts
                .iter()
                .fold(None, |best: Option<(&str, usize)>, &(category, count)| match best {
                    Some((_, best_count)) if best_count >= count => best,
                    _ => Some((category, count)),
                })
                .map(|(category, _)| category.to_string());

            LevelStatsDto {
                level,
                total_questions: acc.tally.total,
                correct_answers: acc.tally.correct,
                accuracy: acc.tally.accuracy(),
                amount: acc.amount.unwrap_or(0.0),
                eliminated_count: acc.tally.eliminated,
                elimination_rate: acc.tally.elimination_rate(),
                category_distribution: counts
                    .into_iter()
                    .map(|(category, count)| (category.to_string(), count))
                    .collect(),
                most_common_category,
            }
        })
        .collect()
}

/// Stats of one level; a level absent from the log yields a zero entry.
pub fn level_stat(log: &EventLog, level: u32) -> LevelStatsDto {
    level_stats(log)
        .into_iter()
        .find(|stats| stats.level == level)
        .unwrap_or_else(|| LevelStatsDto::empty(level))
}

pub fn joker_stats(log: &EventLog, sort: StatSort) -> Vec<JokerStatsDto> {
    let mut groups: OrderedGroups<Joker, Tally> = OrderedGroups::new();
    for record in log.records() {
        groups.entry(&record.joker_used).add(record);
    }

    let mut stats: Vec<JokerStatsDto> = groups
        .into_vec()
        .into_iter()
        .map(|(joker, tally)| JokerStatsDto {
            joker,
            count: tally.total,
            correct_answers: tally.correct,
            accuracy: tally.accuracy(),
            eliminated_count: tally.eliminated,
        })
        .collect();

    if sort == StatSort::TotalQuestionsDesc {
        stats.sort_by(|a, b| b.count.cmp(&a.count));
    }
    stats
}

/// First letter with the highest non-zero count, in A..D order.
fn leading_letter(table: &ChoiceTable<usize>) -> ChoiceCountDto {
    let mut best = ChoiceCountDto::default();
    for letter in Choice::LETTERS {
        let count = table.get(&letter).copied().unwrap_or(0);
        if count > best.count {
            best = ChoiceCountDto {
                choice: letter.to_string(),
                count,
            };
        }
    }
    best
}

pub fn answer_choice_stats(log: &EventLog) -> AnswerChoiceStatsDto {
    let records = log.records();
    let letters_at_zero = || -> ChoiceTable<usize> {
        Choice::LETTERS.into_iter().map(|letter| (letter, 0)).collect()
    };
    // A-D are always present; `none` only once it occurs.
    let mut correct_answer_distribution = letters_at_zero();
    let mut contestant_answer_distribution = letters_at_zero();

    for record in records {
        *correct_answer_distribution.entry(record.correct_choice).or_insert(0) += 1;
        *contestant_answer_distribution.entry(record.selected_choice).or_insert(0) += 1;
    }

    let chosen = |letter: Choice| contestant_answer_distribution.get(&letter).copied().unwrap_or(0);

    let mut by_answer: ChoiceTable<Tally> = ChoiceTable::new();
    for record in records {
        by_answer.entry(record.correct_choice).or_default().add(record);
    }
    let choice_accuracy = by_answer
        .into_iter()
        .map(|(letter, tally)| {
            (
                letter,
                ChoiceAccuracyDto {
                    total_questions: tally.total,
                    accuracy: tally.accuracy(),
                    times_correct: tally.correct,
                    times_chosen: chosen(letter),
                },
            )
        })
        .collect();

    let bias_analysis = SelectionShareDto {
        a_bias: percentage(chosen(Choice::A), records.len()),
        b_bias: percentage(chosen(Choice::B), records.len()),
        c_bias: percentage(chosen(Choice::C), records.len()),
        d_bias: percentage(chosen(Choice::D), records.len()),
    };

    AnswerChoiceStatsDto {
        most_selected_choice: leading_letter(&contestant_answer_distribution),
        most_correct_choice: leading_letter(&correct_answer_distribution),
        correct_answer_distribution,
        contestant_answer_distribution,
        choice_accuracy,
        bias_analysis,
    }
}

pub fn elimination_analysis(log: &EventLog) -> EliminationAnalysisDto {
    let mut by_level: BTreeMap<u32, usize> = BTreeMap::new();
    let mut by_category: OrderedGroups<&str, usize> = OrderedGroups::new();
    let (mut early, mut middle, mut late) = (Tally::default(), Tally::default(), Tally::default());

    for record in log.records() {
        let eliminated = usize::from(record.eliminated);
        *by_level.entry(record.level).or_insert(0) += eliminated;
        *by_category.entry(&record.category.as_str()) += eliminated;
        match record.level {
            level if level < 5 => early.add(record),
            level if level < 10 => middle.add(record),
            _ => late.add(record),
        }
    }
    let by_category = by_category.into_vec();
    let safe_passage = |tally: &Tally| percentage(tally.total - tally.eliminated, tally.total);

    let mut most_dangerous_levels: Vec<LevelCountDto> = by_level
        .iter()
        .map(|(&level, &count)| LevelCountDto {
            level: format!("level_{}", level),
            count,
        })
        .collect();
    most_dangerous_levels.sort_by(|a, b| b.count.cmp(&a.count));
    most_dangerous_levels.truncate(5);

    let most_dangerous_category = by_category
        .iter()
        .fold(None, |best: Option<(&str, usize)>, &(category, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((category, count)),
        })
        .map(|(category, count)| CategoryCountDto {
            category: category.to_string(),
            count,
        })
        .unwrap_or_default();

    EliminationAnalysisDto {
        total_eliminations: early.eliminated + middle.eliminated + late.eliminated,
        elimination_by_level: by_level
            .iter()
            .map(|(&level, &count)| (format!("level_{}", level), count))
            .collect(),
        elimination_by_category: by_category
            .iter()
            .map(|&(category, count)| (category.to_string(), count))
            .collect(),
        most_dangerous_levels,
        most_dangerous_category,
        safe_passage_rate: SafePassageRateDto {
            before_level_5: safe_passage(&early),
            level_5_to_10: safe_passage(&middle),
            level_10_and_above: safe_passage(&late),
        },
    }
}

pub fn overview_stats(log: &EventLog) -> OverviewStatsDto {
    let records = log.records();
    let tally = Tally::of(records);
    let runs = log.runs();
    let videos: HashSet<&str> = records.iter().filter_map(|r| r.video_id.as_deref()).collect();

    OverviewStatsDto {
        total_questions: tally.total,
        total_contestants: runs.len(),
        total_videos: videos.len(),
        overall_accuracy: tally.accuracy(),
        total_eliminated: tally.eliminated,
        average_level: if runs.is_empty() {
            0.0
        } else {
            runs.iter().map(|run| f64::from(run.max_level_reached)).sum::<f64>() / runs.len() as f64
        },
    }
}

/// One row per contestant, highest winnings first. Ties keep log order.
pub fn contestant_performance(log: &EventLog) -> Vec<ContestantPerformanceDto> {
    let mut rows: Vec<ContestantPerformanceDto> = log
        .runs()
        .iter()
        .map(|run| {
            let tally = Tally::of(&run.attempts);
            ContestantPerformanceDto {
                contestant: run.contestant_id.clone(),
                total_questions: tally.total,
                correct_answers: tally.correct,
                accuracy: tally.accuracy(),
                max_level: run.max_level_reached,
                total_winnings: run.total_winnings,
                eliminated: run.eliminated,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total_winnings.total_cmp(&a.total_winnings));
    rows
}

/// Most frequent levels, ascending, at most three.
fn common_levels(counts: &BTreeMap<u32, usize>) -> Vec<u32> {
    let top = counts.values().copied().max().unwrap_or(0);
    counts
        .iter()
        .filter(|&(_, &count)| count == top)
        .map(|(&level, _)| level)
        .take(3)
        .collect()
}

#[derive(Default)]
struct TopicAccumulator {
    tally: Tally,
    early: usize,
    mid: usize,
    late: usize,
    levels: BTreeMap<u32, usize>,
}

pub fn topic_preparation_guide(log: &EventLog) -> TopicPreparationGuideDto {
    let mut groups: OrderedGroups<&str, TopicAccumulator> = OrderedGroups::new();
    for record in log.records() {
        let acc = groups.entry(&record.category.as_str());
        acc.tally.add(record);
        match record.level {
            level if level <= 5 => acc.early += 1,
            level if level <= 10 => acc.mid += 1,
            _ => acc.late += 1,
        }
        *acc.levels.entry(record.level).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, TopicPreparationDto)> = groups
        .into_vec()
        .into_iter()
        .map(|(category, acc)| {
            let tally = acc.tally;
            let rate = if tally.total == 0 {
                0.0
            } else {
                tally.correct as f64 / tally.total as f64
            };

            let difficulty_assessment = if rate > 0.7 {
                Difficulty::Easy
            } else if rate > 0.5 {
                Difficulty::Medium
            } else {
                Difficulty::Hard
            };
            let preparation_recommendation = if tally.total > 20 && rate < 0.6 {
                PreparationPriority::High
            } else if tally.total > 10 {
                PreparationPriority::Medium
            } else {
                PreparationPriority::Low
            };

            let entry = TopicPreparationDto {
                total_questions: tally.total,
                difficulty_assessment,
                accuracy_rate: rate * 100.0,
                early_levels_count: acc.early,
                mid_levels_count: acc.mid,
                late_levels_count: acc.late,
                priority_score: tally.total as f64 * (1.0 - rate),
                elimination_risk: tally.eliminated,
                common_levels: common_levels(&acc.levels),
                preparation_recommendation,
            };
            (category.to_string(), entry)
        })
        .collect();

    ranked.sort_by(|a, b| b.1.priority_score.total_cmp(&a.1.priority_score));
    let priority_order: Vec<String> = ranked.iter().map(|(category, _)| category.clone()).collect();
    let slice = |range: std::ops::Range<usize>| -> Vec<String> {
        priority_order
            .iter()
            .skip(range.start)
            .take(range.end - range.start)
            .cloned()
            .collect()
    };

    TopicPreparationGuideDto {
        study_recommendations: StudyRecommendationsDto {
            focus_categories: slice(0..3),
            review_categories: slice(3..6),
            maintenance_categories: priority_order.iter().skip(6).cloned().collect(),
        },
        categories: ranked.into_iter().collect(),
        priority_order,
    }
}
