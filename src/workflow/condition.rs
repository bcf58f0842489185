//! Condition evaluation against earlier action results.

use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{BeaconflowError, Result, model::ConditionModel, runtime::ExecutionContext, workflow::template};

/// Comparison operator
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Operator {
    #[strum(to_string = "equals", serialize = "eq", serialize = "==")]
    Equals,
    #[strum(to_string = "not_equals", serialize = "ne", serialize = "!=")]
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    /// regular expression match
    Matches,
    // for number
    #[strum(to_string = "gt", serialize = ">")]
    Gt,
    #[strum(to_string = "lt", serialize = "<")]
    Lt,
    #[strum(to_string = "ge", serialize = ">=")]
    Ge,
    #[strum(to_string = "le", serialize = "<=")]
    Le,
}

impl Operator {
    pub fn parse(operator: &str) -> Result<Self> {
        Operator::from_str(operator.trim()).map_err(|_| BeaconflowError::InvalidCondition(format!("unknown operator '{}'", operator)))
    }

    fn is_numeric(self) -> bool {
        matches!(self, Operator::Gt | Operator::Lt | Operator::Ge | Operator::Le)
    }
}

/// Evaluate one condition.
///
/// A source that does not resolve (the referenced action has not produced a
/// result) evaluates to `false`. An unknown operator, an invalid pattern or a
/// non-numeric expected value for a numeric operator is `InvalidCondition`.
pub fn evaluate(
    condition: &ConditionModel,
    ctx: &ExecutionContext,
) -> Result<bool> {
    let matcher = Matcher::compile(condition)?;
    Ok(matcher.holds(&condition.source, ctx))
}

/// AND-combine a list of conditions; an empty list is eligible.
///
/// Every condition is checked for validity before any is evaluated, so an
/// invalid condition is reported even when an earlier one is false.
pub fn evaluate_all(
    conditions: &[ConditionModel],
    ctx: &ExecutionContext,
) -> Result<bool> {
    let matchers = conditions.iter().map(Matcher::compile).collect::<Result<Vec<_>>>()?;

    Ok(conditions.iter().zip(&matchers).all(|(condition, matcher)| matcher.holds(&condition.source, ctx)))
}

/// An operator bound to its validated expected value.
enum Matcher<'a> {
    Text(Operator, &'a str),
    Number(Operator, f64),
    Pattern(Regex),
}

impl<'a> Matcher<'a> {
    fn compile(condition: &'a ConditionModel) -> Result<Self> {
        Self::new(Operator::parse(&condition.operator)?, &condition.value)
    }

    /// Unresolved sources never hold.
    fn holds(
        &self,
        source: &str,
        ctx: &ExecutionContext,
    ) -> bool {
        match template::resolve_selector(ctx, source) {
            Some(actual) => self.test(&actual),
            None => false,
        }
    }

    fn new(
        operator: Operator,
        expected: &'a str,
    ) -> Result<Self> {
        if operator.is_numeric() {
            let value = expected
                .trim()
                .parse::<f64>()
                .map_err(|_| BeaconflowError::InvalidCondition(format!("'{}' needs a numeric value, got '{}'", operator, expected)))?;
            return Ok(Matcher::Number(operator, value));
        }
        if operator == Operator::Matches {
            let re = Regex::new(expected).map_err(|e| BeaconflowError::InvalidCondition(format!("invalid pattern '{}': {}", expected, e)))?;
            return Ok(Matcher::Pattern(re));
        }
        Ok(Matcher::Text(operator, expected))
    }

    fn test(
        &self,
        actual: &str,
    ) -> bool {
        match self {
            Matcher::Pattern(re) => re.is_match(actual),
            Matcher::Number(operator, expected) => {
                let Ok(actual) = actual.trim().parse::<f64>() else {
                    return false;
                };
                match operator {
                    Operator::Gt => actual > *expected,
                    Operator::Lt => actual < *expected,
                    Operator::Ge => actual >= *expected,
                    Operator::Le => actual <= *expected,
                    _ => false,
                }
            }
            Matcher::Text(operator, expected) => match operator {
                Operator::Equals => eval_equals(actual, expected),
                Operator::NotEquals => !eval_equals(actual, expected),
                Operator::Contains => actual.contains(expected),
                Operator::NotContains => !actual.contains(expected),
                Operator::StartsWith => actual.trim_start().starts_with(expected),
                Operator::EndsWith => actual.trim_end().ends_with(expected),
                _ => false,
            },
        }
    }
}

/// Outputs usually end with a newline, so equality ignores surrounding
/// whitespace; two numbers compare by value (`1.0 == 1`).
fn eval_equals(
    actual: &str,
    expected: &str,
) -> bool {
    let (actual, expected) = (actual.trim(), expected.trim());
    match (actual.parse::<f64>(), expected.parse::<f64>()) {
        (Ok(a), Ok(e)) => a == e,
        _ => actual == expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::{context, record};

    fn cond(
        source: &str,
        operator: &str,
        value: &str,
    ) -> ConditionModel {
        ConditionModel {
            source: source.to_string(),
            operator: operator.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_operator_aliases() {
        assert_eq!(Operator::parse("equals").unwrap(), Operator::Equals);
        assert_eq!(Operator::parse("==").unwrap(), Operator::Equals);
        assert_eq!(Operator::parse("EQUALS").unwrap(), Operator::Equals);
        assert_eq!(Operator::parse("!=").unwrap(), Operator::NotEquals);
        assert_eq!(Operator::parse("not_contains").unwrap(), Operator::NotContains);
        assert_eq!(Operator::parse(">=").unwrap(), Operator::Ge);
        assert!(matches!(Operator::parse("resembles"), Err(BeaconflowError::InvalidCondition(_))));
    }

    #[test]
    fn test_text_operators() {
        let ctx = context();
        record(&ctx, "whoami", true, "corp\\administrator\n");

        assert!(evaluate(&cond("whoami.output", "equals", "corp\\administrator"), &ctx).unwrap());
        assert!(evaluate(&cond("whoami", "contains", "admin"), &ctx).unwrap());
        assert!(!evaluate(&cond("whoami.output", "not_contains", "admin"), &ctx).unwrap());
        assert!(evaluate(&cond("whoami.output", "starts_with", "corp\\"), &ctx).unwrap());
        assert!(evaluate(&cond("whoami.output", "ends_with", "trator"), &ctx).unwrap());
        assert!(evaluate(&cond("whoami.output", "!=", "guest"), &ctx).unwrap());
        assert!(evaluate(&cond("whoami.output", "matches", r"^corp\\admin\w+"), &ctx).unwrap());
    }

    #[test]
    fn test_success_field() {
        let ctx = context();
        record(&ctx, "upload", false, "");

        assert!(evaluate(&cond("upload.success", "equals", "false"), &ctx).unwrap());
        assert!(!evaluate(&cond("{{#upload.success#}}", "==", "true"), &ctx).unwrap());
    }

    #[test]
    fn test_numeric_operators() {
        let ctx = context();
        record(&ctx, "count", true, " 42\n");

        assert!(evaluate(&cond("count.output", "gt", "41"), &ctx).unwrap());
        assert!(evaluate(&cond("count.output", "<=", "42"), &ctx).unwrap());
        assert!(!evaluate(&cond("count.output", "lt", "10.5"), &ctx).unwrap());
        assert!(evaluate(&cond("count.output", "equals", "42.0"), &ctx).unwrap());

        record(&ctx, "text", true, "n/a");
        assert!(!evaluate(&cond("text.output", "gt", "1"), &ctx).unwrap());
    }

    #[test]
    fn test_unresolved_source_is_false() {
        let ctx = context();
        assert!(!evaluate(&cond("never_ran.output", "equals", ""), &ctx).unwrap());
        assert!(!evaluate(&cond("never_ran.output", "not_equals", "x"), &ctx).unwrap());
    }

    #[test]
    fn test_invalid_conditions() {
        let ctx = context();
        record(&ctx, "a", true, "1");

        assert!(matches!(evaluate(&cond("a", "about", "1"), &ctx), Err(BeaconflowError::InvalidCondition(_))));
        assert!(matches!(evaluate(&cond("a", "gt", "many"), &ctx), Err(BeaconflowError::InvalidCondition(_))));
        assert!(matches!(evaluate(&cond("a", "matches", "("), &ctx), Err(BeaconflowError::InvalidCondition(_))));
    }

    #[test]
    fn test_evaluate_all() {
        let ctx = context();
        record(&ctx, "a", true, "yes");

        assert!(evaluate_all(&[], &ctx).unwrap());
        assert!(evaluate_all(&[cond("a", "equals", "yes"), cond("a.success", "equals", "true")], &ctx).unwrap());
        assert!(!evaluate_all(&[cond("a", "equals", "no"), cond("a.success", "equals", "true")], &ctx).unwrap());

        // the invalid second condition is reported although the first is false
        let err = evaluate_all(&[cond("a", "equals", "no"), cond("a", "bogus", "x")], &ctx).unwrap_err();
        assert!(matches!(err, BeaconflowError::InvalidCondition(_)));
    }

    #[test]
    fn test_evaluate_all_agrees_with_evaluate() {
        let ctx = context();
        record(&ctx, "ps", true, "lsass.exe\nexplorer.exe");

        let conditions = [
            cond("ps", "contains", "lsass"),
            cond("ps.output", "matches", r"explorer\.exe"),
            cond("ps.success", "==", "true"),
            cond("ps", "starts_with", "svchost"),
            cond("missing", "not_equals", "x"),
        ];
        for condition in &conditions {
            let single = evaluate(condition, &ctx).unwrap();
            assert_eq!(evaluate_all(std::slice::from_ref(condition), &ctx).unwrap(), single, "{:?}", condition);
        }
        assert!(evaluate_all(&conditions[..3], &ctx).unwrap());
        assert!(!evaluate_all(&conditions, &ctx).unwrap());
    }
}
