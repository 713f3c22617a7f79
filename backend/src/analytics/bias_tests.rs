#[cfg(test)]
mod bias_tests {
    use crate::analytics::bias::*;
    use crate::analytics::fixtures::{arb_log, log_of, scenario_log, RunBuilder};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use shared::{AttemptRecord, Choice, EventLog};

    /// Always answers A while the answers cycle A, B, C, D; the last
    /// question is left blank.
    fn a_lover() -> EventLog {
        log_of(vec![RunBuilder::new("Contestant_001")
            .step("Bilim", Choice::A, Choice::A)
            .step("Bilim", Choice::B, Choice::A)
            .step("Bilim", Choice::C, Choice::A)
            .step("Bilim", Choice::D, Choice::None)])
    }

    fn all(log: &EventLog) -> Vec<&AttemptRecord> {
        log.records().iter().collect()
    }

    #[test]
    fn test_bias_table_uses_answered_and_total_denominators() {
        let log = a_lover();
        let table = bias_table(&all(&log));

        let a = &table[&Choice::A];
        assert_eq!(a.total_questions, 4);
        assert_eq!(a.answered_questions, 3);
        assert_eq!(a.chosen_count, 3);
        assert_eq!(a.correct_count, 1);
        assert_relative_eq!(a.chosen_percentage, 100.0);
        assert_relative_eq!(a.correct_percentage, 25.0);
        assert_relative_eq!(a.bias_score, 75.0);
        assert_relative_eq!(a.accuracy, 100.0 / 3.0, epsilon = 1e-9);

        let d = &table[&Choice::D];
        assert_relative_eq!(d.chosen_percentage, 0.0);
        assert_relative_eq!(d.bias_score, -25.0);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_unanswered_subset_is_all_zero() {
        let log = log_of(vec![RunBuilder::new("x")
            .step("Spor", Choice::A, Choice::None)
            .step("Spor", Choice::B, Choice::None)]);
        let table = bias_table(&all(&log));

        for entry in table.values() {
            assert_eq!(entry.answered_questions, 0);
            assert_eq!(entry.total_questions, 2);
            assert_eq!(entry.chosen_percentage, 0.0);
            assert_eq!(entry.correct_percentage, 0.0);
            assert_eq!(entry.bias_score, 0.0);
            assert_eq!(entry.accuracy, 0.0);
        }
        assert_eq!(table[&Choice::A].correct_count, 1);
    }

    #[test]
    fn test_correct_vs_chosen() {
        let log = a_lover();
        let table = correct_vs_chosen(log.records());

        let a = &table[&Choice::A];
        assert_eq!(a.total_correct, 1);
        assert_eq!(a.total_chosen, 3);
        assert_eq!(a.correctly_identified, 1);
        assert_eq!(a.wrongly_chosen, 2);
        assert_relative_eq!(a.recognition_rate, 100.0);
        assert_relative_eq!(a.overconfidence, 300.0);

        let c = &table[&Choice::C];
        assert_eq!(c.total_chosen, 0);
        assert_eq!(c.overconfidence, 0.0);
        assert_eq!(c.accuracy_when_chosen, 0.0);
    }

    #[test]
    fn test_insights_and_recommendations() {
        let analysis = detailed_answer_analysis(&a_lover(), 7);
        let insights = &analysis.insights;

        assert_eq!(insights.most_biased_choice.choice, Choice::A);
        assert_relative_eq!(insights.most_biased_choice.bias_score, 75.0);
        assert_eq!(insights.most_accurate_choice.choice, Choice::A);
        assert_eq!(insights.most_overconfident_choice.choice, Choice::A);
        assert_eq!(insights.strategic_recommendations.avoid_bias_toward, Some(Choice::A));
        assert_eq!(insights.strategic_recommendations.trust_when_seeing, Choice::A);
        assert_eq!(insights.strategic_recommendations.be_cautious_with, Some(Choice::A));
    }

    #[test]
    fn test_scenario_has_no_bias_to_avoid() {
        let analysis = detailed_answer_analysis(&scenario_log(), 7);
        let recommendations = &analysis.insights.strategic_recommendations;

        // Every |bias| is zero, so the first letter wins the tie.
        assert_eq!(analysis.insights.most_biased_choice.choice, Choice::A);
        assert_eq!(recommendations.avoid_bias_toward, None);
        assert_eq!(recommendations.be_cautious_with, None);
        assert_relative_eq!(analysis.correct_vs_chosen_analysis[&Choice::A].overconfidence, 100.0);
    }

    #[test]
    fn test_subsets_follow_threshold_levels_and_categories() {
        let analysis = detailed_answer_analysis(&scenario_log(), 2);

        assert_eq!(analysis.level_threshold, 2);
        let before = &analysis.before_after_level_7["before_level_7"];
        let after = &analysis.before_after_level_7["level_7_and_after"];
        assert_eq!(before[&Choice::A].total_questions, 1);
        assert_eq!(after[&Choice::A].total_questions, 2);

        let levels: Vec<&str> = analysis.level_bias.keys().map(String::as_str).collect();
        assert_eq!(levels, vec!["level_1", "level_2", "level_3"]);
        assert!(analysis.category_bias.contains_key("Tarih"));
    }

    #[test]
    fn test_difficulty_and_elimination_slices() {
        let analysis = detailed_answer_analysis(&scenario_log(), 7);

        let easy = &analysis.difficulty_bias["easy"][&Choice::A];
        assert_eq!((easy.correct_count, easy.chosen_count), (1, 1));
        assert_relative_eq!(easy.bias_score, 0.0);

        let eliminated = &analysis.elimination_pattern_bias["eliminated"][&Choice::A];
        assert_relative_eq!(eliminated.chosen_percentage, 100.0);
        assert_relative_eq!(eliminated.correct_percentage, 0.0);
        assert_relative_eq!(eliminated.bias_score, 100.0);

        let safe = &analysis.elimination_pattern_bias["safe"][&Choice::B];
        assert_relative_eq!(safe.chosen_percentage, 50.0);
    }

    #[test]
    fn test_empty_log_analysis() {
        let analysis = detailed_answer_analysis(&EventLog::default(), 7);
        assert_eq!(analysis.overall_bias.len(), 4);
        assert!(analysis.level_bias.is_empty());
        assert!(analysis.category_bias.is_empty());
        assert_eq!(analysis.insights.most_accurate_choice.accuracy, 0.0);
        assert_eq!(analysis.insights.strategic_recommendations.avoid_bias_toward, None);
    }

    proptest! {
        #[test]
        fn prop_level_and_category_slices_cover_their_records(log in arb_log()) {
            let analysis = detailed_answer_analysis(&log, 7);
            let records = log.records();

            for (key, table) in &analysis.level_bias {
                let expected = records.iter().filter(|r| format!("level_{}", r.level) == *key).count();
                prop_assert_eq!(table[&Choice::A].total_questions, expected);
            }
            for (category, table) in &analysis.category_bias {
                let expected = records.iter().filter(|r| &r.category == category).count();
                prop_assert_eq!(table[&Choice::A].total_questions, expected);
            }
            let sliced: usize = analysis.level_bias.values().map(|t| t[&Choice::A].total_questions).sum();
            prop_assert_eq!(sliced, records.len());
        }

        #[test]
        fn prop_chosen_counts_sum_to_answered(log in arb_log()) {
            let analysis = detailed_answer_analysis(&log, 7);
            let tables = std::iter::once(&analysis.overall_bias)
                .chain(analysis.before_after_level_7.values())
                .chain(analysis.level_bias.values())
                .chain(analysis.category_bias.values());

            for table in tables {
                let answered = table[&Choice::A].answered_questions;
                let chosen: usize = table.values().map(|e| e.chosen_count).sum();
                prop_assert_eq!(chosen, answered);
                for entry in table.values() {
                    prop_assert!((0.0..=100.0).contains(&entry.chosen_percentage));
                    prop_assert!((0.0..=100.0).contains(&entry.correct_percentage));
                    prop_assert!((0.0..=100.0).contains(&entry.accuracy));
                }
            }
        }
    }
}
