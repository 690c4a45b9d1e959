//! Threshold table → flat, ordered rule set.
//!
//! The table is a CSV with one row per indicator and one range expression per
//! category:
//!
//! ```text
//! indicator,good_range,normal_range,bad_range
//! inflation_monthly_us,0.1% - 0.2%,0.0% - 0.1% or 0.2% - 0.4%,<0.0% or >0.4%
//! ```
//!
//! Rules come out in row order, then in `Category::TABLE_ORDER`, and that order is what
//! the scorer's first-match-wins policy sees.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use super::range::parse_range_reporting;
use crate::domain::{Category, MalformedRange, ThresholdRule};
use crate::error::AppError;

/// One row of the threshold definition file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdRow {
    pub indicator: String,
    pub good_range: String,
    pub normal_range: String,
    pub bad_range: String,
}

impl ThresholdRow {
    pub fn range(&self, category: Category) -> &str {
        match category {
            Category::Good => &self.good_range,
            Category::Normal => &self.normal_range,
            Category::Bad => &self.bad_range,
        }
    }
}

/// Built rules plus every range alternative that was skipped while building them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    pub rules: Vec<ThresholdRule>,
    pub malformed: Vec<MalformedRange>,
}

impl RuleSet {
    /// Rules of one indicator, in construction order.
    pub fn for_indicator<'a>(&'a self, indicator: &'a str) -> impl Iterator<Item = &'a ThresholdRule> + 'a {
        self.rules.iter().filter(move |rule| rule.indicator == indicator)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

/// Expand every row and category into rules.
pub fn build_rules(table: &[ThresholdRow]) -> RuleSet {
    let mut set = RuleSet::default();

    for row in table {
        for category in Category::TABLE_ORDER {
            let parsed = parse_range_reporting(&row.indicator, category, row.range(category));
            set.malformed.extend(parsed.malformed);

            for interval in parsed.intervals {
                let rule = ThresholdRule {
                    indicator: interval.indicator,
                    category: interval.category,
                    interval: interval.interval,
                    score: category.score(),
                };
                if !set.rules.contains(&rule) {
                    set.rules.push(rule);
                }
            }
        }
    }

    set
}

pub fn load_threshold_table(path: &Path) -> Result<Vec<ThresholdRow>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open threshold table '{}': {e}", path.display()),
        )
    })?;
    let rows = read_threshold_table(file)?;
    info!(path = %path.display(), rows = rows.len(), "loaded threshold table");
    Ok(rows)
}

pub fn read_threshold_table<R: Read>(reader: R) -> Result<Vec<ThresholdRow>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read threshold table headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for column in ["indicator", "good_range", "normal_range", "bad_range"] {
        if !header_map.contains_key(column) {
            return Err(AppError::new(
                2,
                format!("Threshold table is missing required column: `{column}`"),
            ));
        }
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::new(2, format!("Threshold table line {line}: {e}")))?;

        let indicator = cell(&record, &header_map, "indicator");
        if indicator.is_empty() {
            warn!(line, "threshold row without indicator skipped");
            continue;
        }

        rows.push(ThresholdRow {
            indicator: indicator.to_string(),
            good_range: cell(&record, &header_map, "good_range").to_string(),
            normal_range: cell(&record, &header_map, "normal_range").to_string(),
            bad_range: cell(&record, &header_map, "bad_range").to_string(),
        });
    }

    Ok(rows)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = name.trim().trim_start_matches('\u{feff}');
            (name.to_ascii_lowercase(), idx)
        })
        .collect()
}

fn cell<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> &'a str {
    header_map
        .get(name)
        .and_then(|idx| record.get(*idx))
        .map(str::trim)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Interval;
    use std::io::Cursor;

    fn row(indicator: &str, good: &str, normal: &str, bad: &str) -> ThresholdRow {
        ThresholdRow {
            indicator: indicator.to_string(),
            good_range: good.to_string(),
            normal_range: normal.to_string(),
            bad_range: bad.to_string(),
        }
    }

    #[test]
    fn rules_follow_row_then_bad_normal_good_order() {
        let table = vec![
            row("a", "0 - 1", "1 - 2", ">2"),
            row("b", "<0", "0 - 5", ">5"),
        ];
        let set = build_rules(&table);
        let order: Vec<_> = set
            .rules
            .iter()
            .map(|r| (r.indicator.as_str(), r.category))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a", Category::Bad),
                ("a", Category::Normal),
                ("a", Category::Good),
                ("b", Category::Bad),
                ("b", Category::Normal),
                ("b", Category::Good),
            ]
        );
    }

    #[test]
    fn scores_come_from_category() {
        let set = build_rules(&[row("a", "0 - 1", "1 - 2", ">2")]);
        let scores: Vec<_> = set.rules.iter().map(|r| (r.category, r.score)).collect();
        assert_eq!(
            scores,
            vec![(Category::Bad, 0), (Category::Normal, 1), (Category::Good, 2)]
        );
    }

    #[test]
    fn alternatives_flatten_into_separate_rules() {
        let set = build_rules(&[row("a", "", "0.0 - 0.2 or 0.4 - 0.8", "")]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.rules[0].interval, Interval::closed(0.0, 0.2));
        assert_eq!(set.rules[1].interval, Interval::closed(0.4, 0.8));
    }

    #[test]
    fn identical_rules_are_deduplicated_but_cross_category_duplicates_kept() {
        let set = build_rules(&[row("a", "1 - 2", "1 - 2 or 1 - 2", "")]);
        let categories: Vec<_> = set.rules.iter().map(|r| r.category).collect();
        assert_eq!(categories, vec![Category::Normal, Category::Good]);
    }

    #[test]
    fn malformed_alternatives_are_collected() {
        let set = build_rules(&[row("a", "good-ish", "1 - 2", "")]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.malformed.len(), 1);
        assert_eq!(set.malformed[0].category, Category::Good);
    }

    #[test]
    fn reads_csv_with_reordered_and_cased_headers() {
        let csv = "\u{feff}Indicator,Bad_Range,Normal_Range,Good_Range\n\
inflation_monthly_us,<0.0% or >0.4%,0.0% - 0.1%,0.1% - 0.2%\n\
,1,2,3\n";
        let rows = read_threshold_table(Cursor::new(csv)).expect("table parses");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].indicator, "inflation_monthly_us");
        assert_eq!(rows[0].good_range, "0.1% - 0.2%");
        assert_eq!(rows[0].bad_range, "<0.0% or >0.4%");
    }

    #[test]
    fn missing_column_is_an_input_error() {
        let err = read_threshold_table(Cursor::new("indicator,good_range,bad_range\na,1,2\n"))
            .expect_err("missing normal_range");
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("normal_range"));
    }

    #[test]
    fn for_indicator_keeps_construction_order() {
        let set = build_rules(&[row("a", ">2", "1 - 2", "<1"), row("b", ">0", "", "")]);
        let a: Vec<_> = set.for_indicator("a").map(|r| r.category).collect();
        assert_eq!(a, vec![Category::Bad, Category::Normal, Category::Good]);
        assert_eq!(set.for_indicator("b").count(), 1);
        assert_eq!(set.for_indicator("c").count(), 0);
    }
}
