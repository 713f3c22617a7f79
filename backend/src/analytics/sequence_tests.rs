#[cfg(test)]
mod sequence_tests {
    use crate::analytics::fixtures::{arb_log, log_of, sample_log, scenario_log, RunBuilder};
    use crate::analytics::sequence::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use shared::{dto::analytics::*, Choice, EventLog};
    use std::collections::BTreeMap;

    const CYCLE: [Choice; 10] = [
        Choice::A,
        Choice::B,
        Choice::C,
        Choice::D,
        Choice::A,
        Choice::B,
        Choice::C,
        Choice::D,
        Choice::A,
        Choice::B,
    ];

    /// Three contestants answering the same ten questions correctly.
    fn high_performers() -> EventLog {
        log_of(
            ["Contestant_001", "Contestant_002", "Contestant_003"]
                .into_iter()
                .map(|id| RunBuilder::new(id).correct_run("Tarih", &CYCLE))
                .collect(),
        )
    }

    #[test]
    fn test_scenario_transitions() {
        let matrices = transition_matrices(&scenario_log(), None);

        assert_eq!(matrices.choice_to_choice[&Choice::A][&Choice::B], 1);
        assert_eq!(matrices.choice_to_choice[&Choice::B][&Choice::A], 1);
        assert_eq!(matrices.choice_to_choice.len(), 2);
        assert_eq!(matrices.correct_wrong_transitions["correct"]["wrong"], 1);
        assert_eq!(matrices.correct_wrong_transitions["wrong"]["wrong"], 1);
        assert_eq!(matrices.category_transitions["Tarih"][&Choice::A], 1);
        assert_eq!(matrices.level_transitions[&2][&Choice::B], 1);
        assert!(matrices.top_transitions.is_none());
    }

    #[test]
    fn test_top_destinations_break_ties_by_choice() {
        let log = log_of(vec![RunBuilder::new("x")
            .step("Spor", Choice::A, Choice::A)
            .step("Spor", Choice::B, Choice::B)
            .step("Spor", Choice::A, Choice::A)
            .step("Spor", Choice::C, Choice::None)]);
        let matrices = transition_matrices(&log, Some(1));
        let top = matrices.top_transitions.unwrap();

        assert_eq!(top[&Choice::A], vec![DestinationCountDto { to: Choice::B, count: 1 }]);
        assert_eq!(top[&Choice::B], vec![DestinationCountDto { to: Choice::A, count: 1 }]);
        assert_eq!(matrices.choice_to_choice[&Choice::A][&Choice::None], 1);
    }

    #[test]
    fn test_scenario_ngrams() {
        let log = scenario_log();

        let triples = sequential_patterns(&log, 3, 1, 5);
        let aba = &triples.patterns["A->B->A"];
        assert_eq!(aba.occurrences, 1);
        assert_relative_eq!(aba.success_rate, 0.0);
        assert_relative_eq!(aba.elimination_rate, 100.0);
        assert_relative_eq!(aba.window_accuracy, 100.0 / 3.0, epsilon = 1e-9);
        assert!(aba.next_choices.is_empty());
        assert_eq!(aba.contestants, vec!["Contestant_001"]);

        let pairs = sequential_patterns(&log, 2, 3, 5);
        assert_relative_eq!(pairs.patterns["A->B"].success_rate, 100.0);
        assert_eq!(pairs.patterns["A->B"].next_choices[&Choice::A], 1);
        assert_relative_eq!(pairs.patterns["B->A"].elimination_rate, 100.0);
        // Below the occurrence floor: counted, never ranked.
        assert!(pairs.top_patterns.is_empty());
    }

    #[test]
    fn test_top_patterns_ranking() {
        let pairs = sequential_patterns(&high_performers(), 2, 3, 3);

        assert_eq!(pairs.patterns["A->B"].occurrences, 9);
        assert_eq!(pairs.patterns["A->B"].contestants.len(), 3);
        let ranked: Vec<(&str, usize)> = pairs
            .top_patterns
            .iter()
            .map(|p| (p.pattern.as_str(), p.occurrences))
            .collect();
        assert_eq!(ranked, vec![("A->B", 9), ("B->C", 6), ("C->D", 6)]);
    }

    #[test]
    fn test_deep_patterns_cover_each_length() {
        let deep = deep_sequential_patterns(&scenario_log(), 4, 1, 5);
        let keys: Vec<&str> = deep.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["length_2", "length_3", "length_4"]);
        assert_eq!(deep["length_3"].length, 3);
        assert!(deep["length_4"].patterns.is_empty());
    }

    #[test]
    fn test_first_choice_impact() {
        let impact = first_choice_impact(&scenario_log());
        let a = &impact[&Choice::A];

        assert_eq!(a.total_contestants, 1);
        assert_relative_eq!(a.average_final_level, 3.0);
        assert_relative_eq!(a.elimination_rate, 100.0);
        assert_relative_eq!(a.average_correct_rate, 100.0 / 3.0, epsilon = 1e-9);
        assert_eq!(a.second_choices, BTreeMap::from([(Choice::B, 1)]));
        assert_eq!(a.third_choices, BTreeMap::from([(Choice::A, 1)]));
    }

    #[test]
    fn test_correct_wrong_patterns() {
        let patterns = correct_wrong_patterns(&scenario_log());

        let after_correct = &patterns["correct"];
        assert_eq!(after_correct.occurrences, 1);
        assert_eq!(after_correct.next_choice_distribution[&Choice::B], 1);
        assert_relative_eq!(after_correct.next_is_correct_rate, 0.0);
        assert_relative_eq!(after_correct.elimination_rate, 0.0);

        let after_wrong = &patterns["wrong"];
        assert_relative_eq!(after_wrong.elimination_rate, 100.0);
    }

    #[test]
    fn test_level_based_patterns() {
        let patterns = level_based_patterns(&scenario_log());

        let first = &patterns[&1][&Choice::A];
        assert_eq!(first.count, 1);
        assert_relative_eq!(first.success_rate, 100.0);
        assert_eq!(first.next_level_choice[&Choice::B], 1);

        let last = &patterns[&3][&Choice::A];
        assert_relative_eq!(last.success_rate, 0.0);
        assert_relative_eq!(last.elimination_rate, 100.0);
    }

    #[test]
    fn test_winning_patterns_need_three_high_performers() {
        assert!(winning_patterns(&sample_log(), 1).is_empty());

        let patterns = winning_patterns(&high_performers(), 3);
        assert_eq!(patterns[0].pattern, "A->B");
        assert_eq!(patterns[0].occurrences, 9);
        assert_relative_eq!(patterns[0].success_rate, 300.0);

        let dabc = patterns.iter().find(|p| p.pattern == "D->A->B->C").unwrap();
        assert_eq!(dabc.occurrences, 3);
        assert!(patterns.iter().all(|p| p.pattern.split("->").count() <= 4));
    }

    #[test]
    fn test_pattern_summary() {
        let summary = pattern_summary(&sample_log());
        assert_eq!(summary.total_contestants, 4);
        assert_eq!(summary.total_questions, 21);
        assert_relative_eq!(summary.average_questions_per_contestant, 5.25);
        assert_relative_eq!(summary.elimination_rate, 75.0);

        assert_eq!(pattern_summary(&EventLog::default()), PatternSummaryDto::default());
    }

    #[test]
    fn test_empty_log_sequences() {
        let log = EventLog::default();
        assert_eq!(transition_matrices(&log, Some(3)).choice_to_choice.len(), 0);
        assert!(sequential_patterns(&log, 3, 3, 5).patterns.is_empty());
        assert!(first_choice_impact(&log).is_empty());
        assert!(winning_patterns(&log, 3).is_empty());
    }

    proptest! {
        #[test]
        fn prop_transition_rows_sum_to_attempts_minus_runs(log in arb_log()) {
            let matrices = transition_matrices(&log, None);
            let expected = log.len() - log.runs().len();

            let choice_total: usize = matrices.choice_to_choice.values().flat_map(|row| row.values()).sum();
            let state_total: usize = matrices.correct_wrong_transitions.values().flat_map(|row| row.values()).sum();
            let category_total: usize = matrices.category_transitions.values().flat_map(|row| row.values()).sum();
            let level_total: usize = matrices.level_transitions.values().flat_map(|row| row.values()).sum();

            prop_assert_eq!(choice_total, expected);
            prop_assert_eq!(state_total, expected);
            prop_assert_eq!(category_total, expected);
            prop_assert_eq!(level_total, log.len());
        }

        #[test]
        fn prop_pattern_rates_are_percentages(log in arb_log(), length in 1usize..5) {
            let table = sequential_patterns(&log, length, 2, 5);
            for stats in table.patterns.values() {
                prop_assert!((0.0..=100.0).contains(&stats.success_rate));
                prop_assert!((0.0..=100.0).contains(&stats.window_accuracy));
                prop_assert!((stats.success_rate + stats.elimination_rate - 100.0).abs() < 1e-9);
            }
            prop_assert!(table.top_patterns.len() <= 5);
            prop_assert!(table.top_patterns.iter().all(|p| p.occurrences >= 2));
        }
    }
}
