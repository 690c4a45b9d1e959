//! Threshold definitions: range expressions and the rule table built from them.

pub mod range;
pub mod table;

pub use range::{ParsedRange, parse_range, parse_range_reporting};
pub use table::{RuleSet, ThresholdRow, build_rules, load_threshold_table, read_threshold_table};
