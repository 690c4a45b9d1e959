//! Threshold scoring.
//!
//! Rules are scanned in construction order and the first one containing the value
//! wins. A value no rule covers is left unscored; threshold tables are written by hand
//! and gaps are expected, so that is not an error.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{LabeledObservation, ScoredObservation, ThresholdRule, Verdict};

/// Score one value of `indicator`.
pub fn score(value: f64, indicator: &str, rules: &[ThresholdRule]) -> Option<Verdict> {
    rules
        .iter()
        .filter(|rule| rule.indicator == indicator)
        .find(|rule| rule.contains(value))
        .map(verdict_of)
}

/// Score every row of a merged dataset, preserving row order.
pub fn score_dataset(rows: Vec<LabeledObservation>, rules: &[ThresholdRule]) -> Vec<ScoredObservation> {
    let scorer = Scorer::new(rules);
    let scored: Vec<_> = rows
        .into_iter()
        .map(|row| {
            let verdict = scorer.score(row.value, &row.indicator);
            ScoredObservation::new(row, verdict)
        })
        .collect();

    let unmatched = scored.iter().filter(|row| row.score.is_none()).count();
    let without_rules = scored
        .iter()
        .filter(|row| !scorer.has_rules_for(&row.indicator))
        .count();
    debug!(rows = scored.len(), unmatched, without_rules, "scored dataset");
    scored
}

/// Rules grouped per indicator, each group kept in construction order.
#[derive(Debug, Clone)]
pub struct Scorer<'a> {
    by_indicator: HashMap<&'a str, Vec<&'a ThresholdRule>>,
}

impl<'a> Scorer<'a> {
    pub fn new(rules: &'a [ThresholdRule]) -> Self {
        let mut by_indicator: HashMap<&str, Vec<&ThresholdRule>> = HashMap::new();
        for rule in rules {
            by_indicator.entry(rule.indicator.as_str()).or_default().push(rule);
        }
        Self { by_indicator }
    }

    pub fn score(&self, value: f64, indicator: &str) -> Option<Verdict> {
        self.by_indicator
            .get(indicator)?
            .iter()
            .find(|rule| rule.contains(value))
            .map(|rule| verdict_of(rule))
    }

    pub fn has_rules_for(&self, indicator: &str) -> bool {
        self.by_indicator.contains_key(indicator)
    }
}

fn verdict_of(rule: &ThresholdRule) -> Verdict {
    Verdict {
        category: rule.category,
        score: rule.score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Interval};
    use crate::thresholds::{ThresholdRow, build_rules};
    use chrono::NaiveDate;

    fn rule(indicator: &str, category: Category, interval: Interval) -> ThresholdRule {
        ThresholdRule {
            indicator: indicator.to_string(),
            category,
            interval,
            score: category.score(),
        }
    }

    #[test]
    fn closed_rule_matches_both_boundaries() {
        let rules = vec![rule("u", Category::Good, Interval::closed(0.5, 6.0))];
        let good = Some(Verdict {
            category: Category::Good,
            score: 2,
        });
        assert_eq!(score(0.5, "u", &rules), good);
        assert_eq!(score(6.0, "u", &rules), good);
        assert_eq!(score(6.1, "u", &rules), None);
    }

    #[test]
    fn open_lower_bound_does_not_match_itself() {
        let rules = vec![rule("u", Category::Bad, Interval::above(6.0))];
        assert_eq!(score(6.0, "u", &rules), None);
        assert_eq!(score(6.0001, "u", &rules).map(|v| v.category), Some(Category::Bad));
    }

    #[test]
    fn earlier_rule_wins_on_overlap() {
        let rules = vec![
            rule("u", Category::Bad, Interval::closed(0.0, 5.0)),
            rule("u", Category::Good, Interval::closed(4.0, 8.0)),
        ];
        assert_eq!(score(4.5, "u", &rules).map(|v| v.category), Some(Category::Bad));
        assert_eq!(Scorer::new(&rules).score(4.5, "u").map(|v| v.score), Some(0));
        assert_eq!(score(6.0, "u", &rules).map(|v| v.category), Some(Category::Good));
    }

    #[test]
    fn rules_of_other_indicators_are_ignored() {
        let rules = vec![rule("a", Category::Good, Interval::closed(0.0, 1.0))];
        assert_eq!(score(0.5, "b", &rules), None);
        assert!(!Scorer::new(&rules).has_rules_for("b"));
    }

    #[test]
    fn nan_is_unmatched() {
        let rules = vec![rule("u", Category::Good, Interval::at_most(10.0))];
        assert_eq!(score(f64::NAN, "u", &rules), None);
    }

    #[test]
    fn every_boundary_of_a_built_table_scores_consistently() {
        let table = vec![ThresholdRow {
            indicator: "inflation_monthly_us".to_string(),
            good_range: "0.1% - 0.2%".to_string(),
            normal_range: "0.0% - 0.1% or 0.2% - 0.4%".to_string(),
            bad_range: "<-0.2% or >0.4%".to_string(),
        }];
        let set = build_rules(&table);
        let scorer = Scorer::new(&set.rules);

        for rule in &set.rules {
            let bounds = [
                (rule.interval.min, rule.interval.inclusive_min),
                (rule.interval.max, rule.interval.inclusive_max),
            ];
            for (bound, inclusive) in bounds {
                let Some(value) = bound else { continue };
                let verdict = scorer.score(value, &rule.indicator);
                assert_eq!(verdict, score(value, &rule.indicator, &set.rules));
                if inclusive {
                    // Either this rule, or an earlier rule that also includes the value.
                    let first = set
                        .for_indicator(&rule.indicator)
                        .find(|r| r.contains(value))
                        .expect("inclusive bound is covered");
                    assert_eq!(verdict.map(|v| v.score), Some(first.score));
                    assert!(rule.contains(value));
                } else {
                    assert!(!rule.contains(value));
                    let adjacent = set.for_indicator(&rule.indicator).find(|r| r.contains(value));
                    assert_eq!(verdict.map(|v| v.category), adjacent.map(|r| r.category));
                }
            }
        }

        // Bad rules come first in table order, so the shared 0.4 boundary of
        // ">0.4" (exclusive) falls to the normal "0.2 - 0.4" rule.
        assert_eq!(scorer.score(0.4, "inflation_monthly_us").map(|v| v.category), Some(Category::Normal));
        // 0.1 is in both normal "0.0 - 0.1" and good "0.1 - 0.2"; normal is built first.
        assert_eq!(scorer.score(0.1, "inflation_monthly_us").map(|v| v.category), Some(Category::Normal));
        // Gap between -0.2 and 0.0 is unmatched.
        assert_eq!(scorer.score(-0.1, "inflation_monthly_us"), None);
    }

    #[test]
    fn score_dataset_keeps_order_and_marks_unmatched_rows() {
        let rules = vec![rule("u", Category::Normal, Interval::closed(3.0, 5.0))];
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let make = |indicator: &str, value: f64| LabeledObservation {
            date,
            value,
            indicator: indicator.to_string(),
            source: "FRED".to_string(),
            unit: "Percent".to_string(),
        };

        let scored = score_dataset(vec![make("u", 4.0), make("v", 4.0), make("u", 9.0)], &rules);
        assert_eq!(scored.len(), 3);
        assert_eq!(scored[0].category, Some(Category::Normal));
        assert_eq!(scored[0].score, Some(1));
        assert_eq!(scored[1].indicator, "v");
        assert_eq!(scored[1].score, None);
        assert_eq!(scored[2].category, None);
    }
}
