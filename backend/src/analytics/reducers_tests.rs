#[cfg(test)]
mod reducers_tests {
    use crate::analytics::fixtures::{arb_log, log_of, sample_log, scenario_log, RunBuilder};
    use crate::analytics::reducers::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;
    use shared::{dto::analytics::*, Choice, EventLog, Joker};

    #[test]
    fn test_percentage_guards_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
        assert_relative_eq!(percentage(1, 3), 33.333333, epsilon = 1e-4);
    }

    #[test]
    fn test_scenario_category_accuracy_is_one_in_three() {
        let stats = category_stats(&scenario_log(), 7, StatSort::FirstOccurrence);

        assert_eq!(stats.len(), 1);
        let tarih = &stats[0];
        assert_eq!(tarih.category, "Tarih");
        assert_eq!(tarih.total_questions, 3);
        assert_eq!(tarih.correct_answers, 1);
        assert_relative_eq!(tarih.accuracy, 100.0 / 3.0, epsilon = 1e-9);
        assert_eq!(tarih.eliminated_count, 1);
        assert_relative_eq!(tarih.average_level, 2.0);
    }

    #[test]
    fn test_category_stats_first_occurrence_order() {
        let names: Vec<String> = category_stats(&sample_log(), 7, StatSort::FirstOccurrence)
            .into_iter()
            .map(|s| s.category)
            .collect();
        assert_eq!(names, vec!["Tarih", "Bilim", "Spor", "Sanat"]);
    }

    #[test]
    fn test_category_stats_sorted_by_volume() {
        let stats = category_stats(&sample_log(), 7, StatSort::TotalQuestionsDesc);
        let summary: Vec<(&str, usize)> = stats
            .iter()
            .map(|s| (s.category.as_str(), s.total_questions))
            .collect();
        assert_eq!(summary, vec![("Bilim", 9), ("Tarih", 7), ("Spor", 4), ("Sanat", 1)]);
    }

    #[test]
    fn test_category_threshold_split_and_distribution() {
        let spor = category_stat(&sample_log(), "Spor", 7);

        assert_eq!(spor.total_questions, 4);
        assert_eq!(spor.correct_answers, 2);
        assert_relative_eq!(spor.accuracy, 50.0);
        assert_eq!(spor.eliminated_count, 2);
        assert_relative_eq!(spor.average_level, 4.0);
        assert_eq!(spor.before_level_7, 3);
        assert_eq!(spor.level_7_and_after, 1);
        assert_relative_eq!(spor.before_level_7_accuracy, 200.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(spor.level_7_and_after_accuracy, 0.0);
        assert_eq!(spor.level_distribution.len(), 15);
        assert_eq!(spor.level_distribution["level_1"], 1);
        assert_eq!(spor.level_distribution["level_2"], 2);
        assert_eq!(spor.level_distribution["level_11"], 1);
        assert_eq!(spor.level_distribution["level_15"], 0);
    }

    #[test]
    fn test_unknown_category_is_zero_entry() {
        let stats = category_stat(&sample_log(), "Coğrafya", 7);
        assert_eq!(stats, CategoryStatsDto::empty("Coğrafya", 7));
        assert_eq!(stats.accuracy, 0.0);
    }

    #[test]
    fn test_level_stats_ascending_with_distribution() {
        let stats = level_stats(&sample_log());
        let levels: Vec<u32> = stats.iter().map(|s| s.level).collect();
        assert_eq!(levels, (1..=11).collect::<Vec<_>>());

        let first = &stats[0];
        assert_eq!(first.total_questions, 4);
        assert_eq!(first.correct_answers, 4);
        assert_relative_eq!(first.amount, 1000.0);
        assert_eq!(first.category_distribution["Tarih"], 2);
        assert_eq!(first.category_distribution["Sanat"], 0);
        assert_eq!(first.most_common_category.as_deref(), Some("Tarih"));

        let second = &stats[1];
        assert_eq!(second.total_questions, 4);
        assert_eq!(second.correct_answers, 2);
        assert_eq!(second.eliminated_count, 1);
        assert_relative_eq!(second.elimination_rate, 25.0);
        assert_eq!(second.most_common_category.as_deref(), Some("Spor"));
    }

    #[test]
    fn test_unknown_level_is_zero_entry() {
        assert_eq!(level_stat(&sample_log(), 99), LevelStatsDto::empty(99));
    }

    #[test]
    fn test_joker_stats_groups() {
        let stats = joker_stats(&sample_log(), StatSort::FirstOccurrence);
        let summary: Vec<(Joker, usize, usize)> = stats
            .iter()
            .map(|s| (s.joker, s.count, s.correct_answers))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Joker::None, 19, 15),
                (Joker::FiftyFifty, 1, 1),
                (Joker::AskAudience, 1, 1),
            ]
        );
    }

    #[test]
    fn test_answer_choice_stats() {
        let stats = answer_choice_stats(&sample_log());

        assert_eq!(stats.contestant_answer_distribution[&Choice::A], 6);
        assert_eq!(stats.contestant_answer_distribution[&Choice::None], 1);
        assert_eq!(stats.correct_answer_distribution[&Choice::B], 6);
        assert!(!stats.correct_answer_distribution.contains_key(&Choice::None));

        assert_eq!(stats.most_selected_choice, ChoiceCountDto { choice: "A".into(), count: 6 });
        // A and B are both correct six times; A wins the tie.
        assert_eq!(stats.most_correct_choice, ChoiceCountDto { choice: "A".into(), count: 6 });

        let b = &stats.choice_accuracy[&Choice::B];
        assert_eq!(b.total_questions, 6);
        assert_eq!(b.times_correct, 4);
        assert_eq!(b.times_chosen, 5);
        assert_relative_eq!(b.accuracy, 400.0 / 6.0, epsilon = 1e-9);
        assert_relative_eq!(stats.bias_analysis.a_bias, 600.0 / 21.0, epsilon = 1e-9);
    }

    #[test]
    fn test_answer_distributions_keep_every_letter() {
        let log = log_of(vec![RunBuilder::new("solo")
            .step("Tarih", Choice::A, Choice::A)
            .step("Tarih", Choice::B, Choice::A)]);
        let stats = answer_choice_stats(&log);

        for letter in Choice::LETTERS {
            assert!(stats.correct_answer_distribution.contains_key(&letter));
            assert!(stats.contestant_answer_distribution.contains_key(&letter));
        }
        assert_eq!(stats.correct_answer_distribution[&Choice::D], 0);
        assert_eq!(stats.contestant_answer_distribution[&Choice::A], 2);
        assert_eq!(stats.contestant_answer_distribution[&Choice::B], 0);
        assert!(!stats.contestant_answer_distribution.contains_key(&Choice::None));
        assert!(!stats.choice_accuracy.contains_key(&Choice::C));
    }

    #[test]
    fn test_elimination_analysis() {
        let analysis = elimination_analysis(&sample_log());

        assert_eq!(analysis.total_eliminations, 3);
        assert_eq!(analysis.elimination_by_level.len(), 11);
        assert_eq!(analysis.elimination_by_level["level_6"], 1);
        assert_eq!(analysis.elimination_by_level["level_3"], 0);

        let dangerous: Vec<&str> = analysis
            .most_dangerous_levels
            .iter()
            .map(|l| l.level.as_str())
            .collect();
        assert_eq!(dangerous, vec!["level_2", "level_6", "level_11", "level_1", "level_3"]);

        assert_eq!(
            analysis.most_dangerous_category,
            CategoryCountDto { category: "Spor".into(), count: 2 }
        );
        assert_relative_eq!(analysis.safe_passage_rate.before_level_5, 1100.0 / 12.0, epsilon = 1e-9);
        assert_relative_eq!(analysis.safe_passage_rate.level_5_to_10, 600.0 / 7.0, epsilon = 1e-9);
        assert_relative_eq!(analysis.safe_passage_rate.level_10_and_above, 50.0);
    }

    #[test]
    fn test_overview_stats() {
        let stats = overview_stats(&sample_log());
        assert_eq!(stats.total_questions, 21);
        assert_eq!(stats.total_contestants, 4);
        assert_eq!(stats.total_videos, 4);
        assert_eq!(stats.total_eliminated, 3);
        assert_relative_eq!(stats.overall_accuracy, 1700.0 / 21.0, epsilon = 1e-9);
        assert_relative_eq!(stats.average_level, 5.25);
    }

    #[test]
    fn test_contestant_performance_by_winnings() {
        let rows = contestant_performance(&sample_log());
        let order: Vec<(&str, f64)> = rows
            .iter()
            .map(|r| (r.contestant.as_str(), r.total_winnings))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Contestant_001", 10000.0),
                ("Contestant_002", 5000.0),
                ("Contestant_003", 1000.0),
                ("Contestant_004", 1000.0),
            ]
        );
        assert_eq!(rows[0].max_level, 11);
        assert!(rows[0].eliminated);
        assert!(!rows[3].eliminated);
    }

    #[test]
    fn test_topic_preparation_guide() {
        let guide = topic_preparation_guide(&sample_log());

        assert_eq!(guide.priority_order, vec!["Spor", "Bilim", "Sanat", "Tarih"]);
        assert_eq!(guide.study_recommendations.focus_categories, vec!["Spor", "Bilim", "Sanat"]);
        assert_eq!(guide.study_recommendations.review_categories, vec!["Tarih"]);
        assert!(guide.study_recommendations.maintenance_categories.is_empty());

        let tarih = &guide.categories["Tarih"];
        assert_eq!(tarih.difficulty_assessment, Difficulty::Easy);
        assert_eq!(tarih.early_levels_count, 7);
        assert_eq!(tarih.common_levels, vec![1, 5]);
        assert_eq!(tarih.preparation_recommendation, PreparationPriority::Low);

        let spor = &guide.categories["Spor"];
        assert_eq!(spor.difficulty_assessment, Difficulty::Hard);
        assert_relative_eq!(spor.priority_score, 2.0);
        assert_eq!(spor.elimination_risk, 2);
        assert_eq!(spor.late_levels_count, 1);
    }

    #[rstest]
    #[case::categories(category_stats(&EventLog::default(), 7, StatSort::FirstOccurrence).len())]
    #[case::levels(level_stats(&EventLog::default()).len())]
    #[case::jokers(joker_stats(&EventLog::default(), StatSort::FirstOccurrence).len())]
    #[case::contestants(contestant_performance(&EventLog::default()).len())]
    fn test_empty_log_yields_no_groups(#[case] groups: usize) {
        assert_eq!(groups, 0);
    }

    #[test]
    fn test_empty_log_is_zero_filled() {
        let log = EventLog::default();

        assert_eq!(overview_stats(&log), OverviewStatsDto::default());

        let choices = answer_choice_stats(&log);
        let zeros: ChoiceTable<usize> = Choice::LETTERS.into_iter().map(|c| (c, 0)).collect();
        assert_eq!(choices.correct_answer_distribution, zeros);
        assert_eq!(choices.contestant_answer_distribution, zeros);
        assert!(choices.choice_accuracy.is_empty());
        assert_eq!(choices.most_selected_choice, ChoiceCountDto::default());
        assert_eq!(choices.bias_analysis, SelectionShareDto::default());

        let eliminations = elimination_analysis(&log);
        assert_eq!(eliminations.total_eliminations, 0);
        assert!(eliminations.most_dangerous_levels.is_empty());
        assert_eq!(eliminations.most_dangerous_category, CategoryCountDto::default());
        assert_eq!(eliminations.safe_passage_rate.before_level_5, 0.0);

        let guide = topic_preparation_guide(&log);
        assert!(guide.priority_order.is_empty());
    }

    proptest! {
        #[test]
        fn prop_grouped_accuracy_is_a_percentage(log in arb_log()) {
            for stats in category_stats(&log, 7, StatSort::FirstOccurrence) {
                prop_assert!((0.0..=100.0).contains(&stats.accuracy));
                prop_assert!(stats.correct_answers <= stats.total_questions);
            }
            for stats in level_stats(&log) {
                prop_assert!((0.0..=100.0).contains(&stats.accuracy));
                prop_assert!((0.0..=100.0).contains(&stats.elimination_rate));
            }
            for stats in joker_stats(&log, StatSort::FirstOccurrence) {
                prop_assert!((0.0..=100.0).contains(&stats.accuracy));
            }
        }

        #[test]
        fn prop_groups_partition_the_log(log in arb_log()) {
            let by_category: usize = category_stats(&log, 7, StatSort::TotalQuestionsDesc)
                .iter()
                .map(|s| s.total_questions)
                .sum();
            let by_level: usize = level_stats(&log).iter().map(|s| s.total_questions).sum();
            let by_joker: usize = joker_stats(&log, StatSort::FirstOccurrence).iter().map(|s| s.count).sum();

            prop_assert_eq!(by_category, log.len());
            prop_assert_eq!(by_level, log.len());
            prop_assert_eq!(by_joker, log.len());
        }

        #[test]
        fn prop_grouped_passes_match_per_key_filters(log in arb_log()) {
            let records = log.records();
            for stats in level_stats(&log) {
                let at_level: Vec<_> = records.iter().filter(|r| r.level == stats.level).collect();
                prop_assert_eq!(stats.total_questions, at_level.len());
                prop_assert_eq!(stats.correct_answers, at_level.iter().filter(|r| r.is_correct()).count());
                prop_assert_eq!(stats.amount, at_level[0].amount);
                for (category, count) in &stats.category_distribution {
                    prop_assert_eq!(*count, at_level.iter().filter(|r| &r.category == category).count());
                }
            }

            let eliminations = elimination_analysis(&log);
            for (key, count) in &eliminations.elimination_by_level {
                let expected = records
                    .iter()
                    .filter(|r| r.eliminated && format!("level_{}", r.level) == *key)
                    .count();
                prop_assert_eq!(*count, expected);
            }
            for (category, count) in &eliminations.elimination_by_category {
                let expected = records.iter().filter(|r| r.eliminated && &r.category == category).count();
                prop_assert_eq!(*count, expected);
            }
            prop_assert_eq!(eliminations.total_eliminations, records.iter().filter(|r| r.eliminated).count());

            for (category, topic) in &topic_preparation_guide(&log).categories {
                let in_category: Vec<_> = records.iter().filter(|r| &r.category == category).collect();
                prop_assert_eq!(topic.total_questions, in_category.len());
                prop_assert_eq!(
                    topic.early_levels_count + topic.mid_levels_count + topic.late_levels_count,
                    in_category.len()
                );
                prop_assert_eq!(topic.late_levels_count, in_category.iter().filter(|r| r.level > 10).count());
            }
        }

        #[test]
        fn prop_reducers_are_idempotent(log in arb_log()) {
            prop_assert_eq!(overview_stats(&log), overview_stats(&log));
            prop_assert_eq!(elimination_analysis(&log), elimination_analysis(&log));
            prop_assert_eq!(topic_preparation_guide(&log), topic_preparation_guide(&log));
        }
    }
}
