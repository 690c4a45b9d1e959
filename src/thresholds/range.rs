//! Textual range expressions → numeric intervals.
//!
//! Accepted alternatives (joined by the word `or`):
//!
//! - `<X` / `<=X`   → `(-inf, X]`
//! - `>X`           → `(X, +inf)`
//! - `>=X`          → `[X, +inf)`
//! - `A - B`        → `[A, B]`
//!
//! `%` signs are ignored and en dash, em dash and the minus sign are read as `-`, so
//! `"0.0% – 0.2% or 0.4% – 0.8%"` and `"0.0 - 0.2 or 0.4 - 0.8"` parse the same.
//! Anything else, including a reversed span such as `6 - 4.5`, is skipped with a warning
//! and reported back as a [`MalformedRange`].

use tracing::warn;

use crate::domain::{Category, Interval, MalformedRange, RangeInterval};

/// Intervals plus the alternatives that could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRange {
    pub intervals: Vec<RangeInterval>,
    pub malformed: Vec<MalformedRange>,
}

/// Parse `expression` into intervals tagged with `indicator` and `category`.
///
/// Unrecognized alternatives produce no interval.
pub fn parse_range(indicator: &str, category: Category, expression: &str) -> Vec<RangeInterval> {
    parse_range_reporting(indicator, category, expression).intervals
}

/// Like [`parse_range`], also returning the skipped alternatives.
pub fn parse_range_reporting(indicator: &str, category: Category, expression: &str) -> ParsedRange {
    let mut parsed = ParsedRange::default();
    let normalized = normalize_expression(expression);
    if normalized.trim().is_empty() {
        return parsed;
    }

    for alternative in split_alternatives(&normalized) {
        // A stray `or` leaves nothing behind it.
        if alternative.is_empty() {
            warn!(indicator, category = %category, expression, "ignoring empty threshold alternative");
            continue;
        }
        match parse_alternative(&alternative) {
            Some(interval) => parsed.intervals.push(RangeInterval {
                indicator: indicator.to_string(),
                category,
                interval,
            }),
            None => {
                warn!(
                    indicator,
                    category = %category,
                    alternative = alternative.as_str(),
                    "skipping unrecognized threshold range"
                );
                parsed.malformed.push(MalformedRange {
                    indicator: indicator.to_string(),
                    category,
                    alternative,
                });
            }
        }
    }

    parsed
}

fn normalize_expression(expression: &str) -> String {
    expression
        .chars()
        .filter(|c| *c != '%')
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            other => other,
        })
        .collect()
}

fn split_alternatives(expression: &str) -> Vec<String> {
    let mut alternatives = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for token in expression.split_whitespace() {
        if token.eq_ignore_ascii_case("or") {
            alternatives.push(current.join(" "));
            current.clear();
        } else {
            current.push(token);
        }
    }
    alternatives.push(current.join(" "));

    alternatives
}

fn parse_alternative(alternative: &str) -> Option<Interval> {
    let s = alternative.trim();

    if let Some(rest) = s.strip_prefix("<=") {
        return parse_number(rest).map(Interval::at_most);
    }
    if let Some(rest) = s.strip_prefix('<') {
        return parse_number(rest).map(Interval::at_most);
    }
    if let Some(rest) = s.strip_prefix(">=") {
        return parse_number(rest).map(|min| Interval {
            inclusive_min: true,
            ..Interval::above(min)
        });
    }
    if let Some(rest) = s.strip_prefix('>') {
        return parse_number(rest).map(Interval::above);
    }

    let (lower, upper) = split_span(s)?;
    let (lower, upper) = (parse_number(lower)?, parse_number(upper)?);
    // A reversed span could never match.
    (lower <= upper).then(|| Interval::closed(lower, upper))
}

/// Split `A - B` on the first hyphen that follows a digit, so that negative bounds
/// (`-1.5 - -0.5`) keep their signs.
fn split_span(s: &str) -> Option<(&str, &str)> {
    let mut prev_significant: Option<char> = None;
    for (idx, c) in s.char_indices() {
        if c == '-' && matches!(prev_significant, Some(p) if p.is_ascii_digit() || p == '.') {
            return Some((&s[..idx], &s[idx + 1..]));
        }
        if !c.is_whitespace() {
            prev_significant = Some(c);
        }
    }
    None
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value = trimmed.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intervals(expression: &str) -> Vec<Interval> {
        parse_range("x", Category::Normal, expression)
            .into_iter()
            .map(|r| r.interval)
            .collect()
    }

    #[test]
    fn less_than_is_inclusive_max_only() {
        assert_eq!(intervals("<0.1%"), vec![Interval::at_most(0.1)]);
    }

    #[test]
    fn greater_than_is_exclusive_both_ends() {
        let parsed = intervals(">5%");
        assert_eq!(parsed, vec![Interval::above(5.0)]);
        assert!(!parsed[0].inclusive_min);
        assert!(!parsed[0].inclusive_max);
    }

    #[test]
    fn span_is_inclusive_on_both_ends() {
        assert_eq!(intervals("0.5 - 6.0"), vec![Interval::closed(0.5, 6.0)]);
    }

    #[test]
    fn or_yields_one_interval_per_alternative() {
        assert_eq!(
            intervals("0.0 - 0.2 or 0.4 - 0.8"),
            vec![Interval::closed(0.0, 0.2), Interval::closed(0.4, 0.8)]
        );
    }

    #[test]
    fn dash_variants_and_percent_signs_are_normalized() {
        let expected = vec![Interval::closed(0.0, 0.2), Interval::closed(0.4, 0.8)];
        assert_eq!(intervals("0.0% – 0.2% or 0.4% – 0.8%"), expected);
        assert_eq!(intervals("0.0%\u{2212}0.2% or 0.4%\u{2014}0.8%"), expected);
    }

    #[test]
    fn negative_bounds_keep_their_sign() {
        assert_eq!(intervals("-1.5 - -0.5"), vec![Interval::closed(-1.5, -0.5)]);
        assert_eq!(intervals("-0.5 – 0.0"), vec![Interval::closed(-0.5, 0.0)]);
        assert_eq!(intervals("<-0.5"), vec![Interval::at_most(-0.5)]);
    }

    #[test]
    fn intervals_carry_indicator_and_category() {
        let parsed = parse_range("inflation_monthly_us", Category::Good, "0.1 - 0.3");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].indicator, "inflation_monthly_us");
        assert_eq!(parsed[0].category, Category::Good);
    }

    #[test]
    fn unrecognized_alternatives_are_skipped_and_reported() {
        let parsed = parse_range_reporting("x", Category::Bad, "around 3 or >5 or 7");
        assert_eq!(
            parsed.intervals.iter().map(|r| r.interval).collect::<Vec<_>>(),
            vec![Interval::above(5.0)]
        );
        let skipped: Vec<_> = parsed.malformed.iter().map(|m| m.alternative.as_str()).collect();
        assert_eq!(skipped, vec!["around 3", "7"]);
    }

    #[test]
    fn empty_expression_is_not_malformed() {
        let parsed = parse_range_reporting("x", Category::Bad, "   ");
        assert!(parsed.intervals.is_empty());
        assert!(parsed.malformed.is_empty());
    }

    #[test]
    fn or_keyword_is_a_whole_word() {
        // "or" inside a token is not a separator.
        let parsed = parse_range_reporting("x", Category::Bad, "1 - 2or3");
        assert!(parsed.intervals.is_empty());
        assert_eq!(parsed.malformed.len(), 1);
    }

    #[test]
    fn inclusive_comparison_operators_are_accepted() {
        assert_eq!(intervals("<=2"), vec![Interval::at_most(2.0)]);
        let at_least = intervals(">=2");
        assert_eq!(at_least.len(), 1);
        assert!(at_least[0].contains(2.0));
    }

    #[test]
    fn stray_or_adds_no_empty_alternative() {
        let parsed = parse_range_reporting("x", Category::Normal, "0.0 - 0.2 or");
        assert_eq!(parsed.intervals.len(), 1);
        assert!(parsed.malformed.is_empty());

        let parsed = parse_range_reporting("x", Category::Normal, "<1 or or >2");
        assert_eq!(parsed.intervals.len(), 2);
        assert!(parsed.malformed.is_empty());
    }

    #[test]
    fn reversed_span_is_reported() {
        let parsed = parse_range_reporting("unemployment_monthly_rate_us", Category::Normal, "6 - 4.5% or >8");
        assert_eq!(
            parsed.intervals.iter().map(|r| r.interval).collect::<Vec<_>>(),
            vec![Interval::above(8.0)]
        );
        assert_eq!(parsed.malformed.len(), 1);
        assert_eq!(parsed.malformed[0].alternative, "6 - 4.5");
        assert_eq!(intervals("2 - 2"), vec![Interval::closed(2.0, 2.0)]);
    }
}
