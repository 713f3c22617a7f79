use super::reducers::{percentage, OrderedGroups};
use shared::{
    dto::analytics::*,
    models::attempt::{AttemptRecord, Choice},
    EventLog,
};
use std::collections::BTreeMap;

/// Selection-vs-correctness table for a subset of attempts.
///
/// `chosen_percentage` is taken over answered attempts and
/// `correct_percentage` over every attempt of the subset. When nothing in
/// the subset was answered, every derived figure is `0.0`.
pub fn bias_table(records: &[&AttemptRecord]) -> ChoiceTable<ChoiceBiasDto> {
    let total = records.len();
    let answered = records.iter().filter(|r| r.is_answered()).count();

    Choice::LETTERS
        .into_iter()
        .map(|letter| {
            let correct_count = records.iter().filter(|r| r.correct_choice == letter).count();
            let chosen: Vec<&&AttemptRecord> =
                records.iter().filter(|r| r.selected_choice == letter).collect();
            let chosen_correct = chosen.iter().filter(|r| r.is_correct()).count();

            let mut entry = ChoiceBiasDto {
                correct_count,
                chosen_count: chosen.len(),
                total_questions: total,
                answered_questions: answered,
                ..Default::default()
            };
            if answered > 0 {
                entry.chosen_percentage = percentage(chosen.len(), answered);
                entry.correct_percentage = percentage(correct_count, total);
                entry.bias_score = entry.chosen_percentage - entry.correct_percentage;
                entry.accuracy = percentage(chosen_correct, chosen.len());
            }
            (letter, entry)
        })
        .collect()
}

/// Same comparison with both shares taken over the whole subset.
pub fn share_table(records: &[&AttemptRecord]) -> ChoiceTable<ShareBiasDto> {
    let total = records.len();
    Choice::LETTERS
        .into_iter()
        .map(|letter| {
            let correct_count = records.iter().filter(|r| r.correct_choice == letter).count();
            let chosen_count = records.iter().filter(|r| r.selected_choice == letter).count();
            let entry = ShareBiasDto {
                correct_percentage: percentage(correct_count, total),
                chosen_percentage: percentage(chosen_count, total),
                bias_score: if total == 0 {
                    0.0
                } else {
                    (chosen_count as f64 - correct_count as f64) / total as f64 * 100.0
                },
                correct_count,
                chosen_count,
            };
            (letter, entry)
        })
        .collect()
}

pub fn correct_vs_chosen(records: &[AttemptRecord]) -> ChoiceTable<ChoicePerformanceDto> {
    Choice::LETTERS
        .into_iter()
        .map(|letter| {
            let total_correct = records.iter().filter(|r| r.correct_choice == letter).count();
            let total_chosen = records.iter().filter(|r| r.selected_choice == letter).count();
            let correctly_identified = records
                .iter()
                .filter(|r| r.correct_choice == letter && r.selected_choice == letter)
                .count();

            let entry = ChoicePerformanceDto {
                recognition_rate: percentage(correctly_identified, total_correct),
                accuracy_when_chosen: percentage(correctly_identified, total_chosen),
                overconfidence: percentage(total_chosen, total_correct),
                total_correct,
                total_chosen,
                correctly_identified,
                wrongly_chosen: total_chosen - correctly_identified,
            };
            (letter, entry)
        })
        .collect()
}

/// First letter maximising `key`; later letters must be strictly greater.
fn argmax<T>(table: &ChoiceTable<T>, key: impl Fn(&T) -> f64) -> (Choice, f64) {
    let mut best = (Choice::A, f64::NEG_INFINITY);
    for letter in Choice::LETTERS {
        if let Some(value) = table.get(&letter).map(&key) {
            if value > best.1 {
                best = (letter, value);
            }
        }
    }
    if best.1.is_finite() {
        best
    } else {
        (Choice::A, 0.0)
    }
}

pub fn insights(
    overall_bias: &ChoiceTable<ChoiceBiasDto>,
    performance: &ChoiceTable<ChoicePerformanceDto>,
) -> BiasInsightsDto {
    let (biased, _) = argmax(overall_bias, |entry| entry.bias_score.abs());
    let bias_score = overall_bias.get(&biased).map(|e| e.bias_score).unwrap_or(0.0);
    let (accurate, accuracy) = argmax(performance, |entry| entry.accuracy_when_chosen);
    let (overconfident, overconfidence) = argmax(performance, |entry| entry.overconfidence);

    BiasInsightsDto {
        most_biased_choice: BiasedChoiceDto {
            choice: biased,
            bias_score,
        },
        most_accurate_choice: AccurateChoiceDto {
            choice: accurate,
            accuracy,
        },
        most_overconfident_choice: OverconfidentChoiceDto {
            choice: overconfident,
            overconfidence,
        },
        strategic_recommendations: StrategicRecommendationsDto {
            avoid_bias_toward: (bias_score > 0.0).then_some(biased),
            trust_when_seeing: accurate,
            be_cautious_with: (overconfidence > 100.0).then_some(overconfident),
        },
    }
}

pub fn detailed_answer_analysis(log: &EventLog, level_threshold: u32) -> DetailedAnswerAnalysisDto {
    let records = log.records();
    let all: Vec<&AttemptRecord> = records.iter().collect();
    let subset = |keep: &dyn Fn(&AttemptRecord) -> bool| {
        records.iter().filter(|r| keep(r)).collect::<Vec<&AttemptRecord>>()
    };

    let overall_bias = bias_table(&all);

    let before_after_level_7 = BTreeMap::from([
        (
            "before_level_7".to_string(),
            bias_table(&subset(&|r| r.level < level_threshold)),
        ),
        (
            "level_7_and_after".to_string(),
            bias_table(&subset(&|r| r.level >= level_threshold)),
        ),
    ]);

    let mut by_level: BTreeMap<u32, Vec<&AttemptRecord>> = BTreeMap::new();
    let mut by_category: OrderedGroups<&str, Vec<&AttemptRecord>> = OrderedGroups::new();
    for record in records {
        by_level.entry(record.level).or_default().push(record);
        by_category.entry(&record.category.as_str()).push(record);
    }

    let level_bias = by_level
        .into_iter()
        .map(|(level, subset)| (format!("level_{}", level), bias_table(&subset)))
        .collect();

    let category_bias = by_category
        .into_vec()
        .into_iter()
        .map(|(category, subset)| (category.to_string(), bias_table(&subset)))
        .collect();

    let difficulty_bias = BTreeMap::from([
        ("easy".to_string(), share_table(&subset(&|r| r.is_correct()))),
        ("hard".to_string(), share_table(&subset(&|r| !r.is_correct()))),
    ]);

    let elimination_pattern_bias = BTreeMap::from([
        ("eliminated".to_string(), share_table(&subset(&|r| r.eliminated))),
        ("safe".to_string(), share_table(&subset(&|r| !r.eliminated))),
    ]);

    let correct_vs_chosen_analysis = correct_vs_chosen(records);
    let insights = insights(&overall_bias, &correct_vs_chosen_analysis);

    log::debug!(
        "Bias analysis over {} attempts, threshold level {}",
        records.len(),
        level_threshold
    );

    DetailedAnswerAnalysisDto {
        level_threshold,
        overall_bias,
        before_after_level_7,
        level_bias,
        category_bias,
        difficulty_bias,
        elimination_pattern_bias,
        correct_vs_chosen_analysis,
        insights,
    }
}
