//! References to earlier action results.
//!
//! A reference names an action and one field of its latest result, written
//! either bare (`whoami.output`) or as a template (`{{#whoami.output#}}`).
//! Templates may be embedded in string parameters and are substituted right
//! before the action is dispatched.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    BeaconflowError, Result,
    bof::BofArgument,
    common::ParamValue,
    runtime::{ActionResult, ExecutionContext},
};

/// Regex pattern for output template variables
/// Format: `{{#actionName.field#}}`; the action name may itself contain dots.
const OUTPUT_TEMPLATE_PATTERN: &str = r"\{\{#([^#]+)\.([^.#]+)#\}\}";

static OUTPUT_TEMPLATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(OUTPUT_TEMPLATE_PATTERN).expect("output template pattern"));

/// Splits a reference into `(action name, field)`.
///
/// A trailing segment that is not a known result field is part of the
/// action name, and the field defaults to `output`.
pub fn parse_selector(source: &str) -> (&str, &str) {
    let source = source.trim();
    let source = source.strip_prefix("{{#").and_then(|s| s.strip_suffix("#}}")).unwrap_or(source);

    match source.rsplit_once('.') {
        Some((name, field)) if ActionResult::FIELDS.contains(&field) => (name, field),
        _ => (source, "output"),
    }
}

/// Resolves a reference against the results recorded so far.
pub fn resolve_selector(
    ctx: &ExecutionContext,
    source: &str,
) -> Option<String> {
    let (name, field) = parse_selector(source);
    ctx.result_of(name).and_then(|result| result.field(field))
}

/// Resolve every `{{#action.field#}}` in `template`.
/// Returns error if any reference cannot be resolved.
pub fn resolve_template(
    ctx: &ExecutionContext,
    template: &str,
) -> Result<String> {
    let mut errors: Vec<String> = Vec::new();

    let resolved = OUTPUT_TEMPLATE.replace_all(template, |caps: &regex::Captures| {
        let name = &caps[1];
        let field = &caps[2];
        match ctx.result_of(name).and_then(|result| result.field(field)) {
            Some(value) => value,
            None => {
                errors.push(format!("variable '{}' not found", &caps[0]));
                String::new()
            }
        }
    });

    if !errors.is_empty() {
        return Err(BeaconflowError::Template(errors.join(", ")));
    }

    Ok(resolved.into_owned())
}

/// Resolve templates inside a parameter value recursively, including the
/// string values of BOF arguments.
pub fn resolve_value(
    ctx: &ExecutionContext,
    value: &ParamValue,
) -> Result<ParamValue> {
    match value {
        ParamValue::Str(s) => Ok(ParamValue::Str(resolve_template(ctx, s)?)),
        ParamValue::List(items) => {
            let resolved: Result<Vec<ParamValue>> = items.iter().map(|v| resolve_value(ctx, v)).collect();
            Ok(ParamValue::List(resolved?))
        }
        ParamValue::Args(args) => {
            let resolved: Result<Vec<BofArgument>> = args
                .iter()
                .map(|arg| {
                    resolve_value(ctx, &arg.value).map(|value| BofArgument {
                        arg_type: arg.arg_type.clone(),
                        value,
                    })
                })
                .collect();
            Ok(ParamValue::Args(resolved?))
        }
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::{context, record};

    #[test]
    fn test_parse_selector() {
        assert_eq!(parse_selector("whoami.output"), ("whoami", "output"));
        assert_eq!(parse_selector("whoami.success"), ("whoami", "success"));
        assert_eq!(parse_selector("whoami"), ("whoami", "output"));
        assert_eq!(parse_selector("{{#whoami.error#}}"), ("whoami", "error"));
        assert_eq!(parse_selector("net.view.output"), ("net.view", "output"));
        assert_eq!(parse_selector("net.view"), ("net.view", "output"));
    }

    #[test]
    fn test_resolve_template_no_variables() {
        let ctx = context();
        assert_eq!(resolve_template(&ctx, "hello world").unwrap(), "hello world");
    }

    #[test]
    fn test_resolve_template_outputs() {
        let ctx = context();
        record(&ctx, "whoami", true, "corp\\alice");
        record(&ctx, "hostname", true, "WS01");

        let result = resolve_template(&ctx, "{{#whoami.output#}} on {{#hostname.output#}}: {{#whoami.success#}}").unwrap();
        assert_eq!(result, "corp\\alice on WS01: true");
    }

    #[test]
    fn test_resolve_template_missing() {
        let ctx = context();
        let err = resolve_template(&ctx, "{{#nothing.output#}}").unwrap_err();
        assert!(matches!(err, BeaconflowError::Template(ref m) if m.contains("nothing")));
    }

    #[test]
    fn test_resolve_value_inside_bof_args() {
        let ctx = context();
        record(&ctx, "pwd", true, "C:\\Users");

        let value = ParamValue::Args(vec![BofArgument::wstring("{{#pwd.output#}}"), BofArgument::int(1)]);
        let resolved = resolve_value(&ctx, &value).unwrap();
        assert_eq!(resolved, ParamValue::Args(vec![BofArgument::wstring("C:\\Users"), BofArgument::int(1)]));
    }

    #[test]
    fn test_resolve_selector() {
        let ctx = context();
        record(&ctx, "ps", false, "");
        assert_eq!(resolve_selector(&ctx, "ps.success"), Some("false".to_string()));
        assert_eq!(resolve_selector(&ctx, "missing.output"), None);
    }
}
