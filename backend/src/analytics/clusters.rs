use super::sequence::HIGH_PERFORMER_LEVEL;
use shared::{dto::analytics::*, EventLog};
use std::collections::{BTreeMap, HashSet};

const MID_PERFORMER_LEVEL: u32 = 5;
const JOKER_DEPENDENT_MIN: usize = 2;

/// Every pattern key that made it into a reported top list.
pub fn reported_pattern_keys<'a>(
    headline: &'a SequentialPatternsDto,
    deep: &'a BTreeMap<String, SequentialPatternsDto>,
) -> HashSet<&'a str> {
    std::iter::once(headline)
        .chain(deep.values())
        .flat_map(|table| table.top_patterns.iter())
        .map(|ranked| ranked.pattern.as_str())
        .collect()
}

/// Assigns every contestant to one or more clusters.
///
/// The level and elimination predicates cover every
/// `(max_level_reached, eliminated)` pair, so no contestant is left out.
/// Members keep the order in which contestants appear in the log.
pub fn performance_clusters(log: &EventLog, top_patterns: &HashSet<&str>) -> PerformanceClustersDto {
    let mut clusters = PerformanceClustersDto::default();

    for run in log.runs() {
        let id = run.contestant_id.clone();
        let level = run.max_level_reached;

        if level >= HIGH_PERFORMER_LEVEL {
            clusters.high_performers.push(id.clone());
        } else if level >= MID_PERFORMER_LEVEL {
            clusters.mid_performers.push(id.clone());
        } else if run.eliminated {
            clusters.early_eliminators.push(id.clone());
        } else {
            clusters.early_withdrawals.push(id.clone());
        }

        if run.jokers_used.len() >= JOKER_DEPENDENT_MIN {
            clusters.joker_dependent.push(id.clone());
        }
        if top_patterns.contains(run.choice_key().as_str()) {
            clusters.pattern_followers.push(id);
        }
    }

    log::debug!(
        "Clustered {} contestants: {} high, {} mid, {} early eliminated, {} early withdrawn",
        log.runs().len(),
        clusters.high_performers.len(),
        clusters.mid_performers.len(),
        clusters.early_eliminators.len(),
        clusters.early_withdrawals.len()
    );

    clusters
}
