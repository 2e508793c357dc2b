//! `_key_` placeholder substitution
//!
//! Substitution is a sequence of passes, one per context entry in insertion
//! order, each replacing every occurrence of `_key_` in the text produced by
//! the previous pass. A value that itself contains a later key's token is
//! therefore expanded again, and overlapping tokens resolve by order.

use super::context::VariableContext;
use serde_yaml::{Mapping, Value};

/// Substitute placeholders in plain text
pub fn substitute_str(text: &str, context: &VariableContext) -> String {
    let mut result = text.to_string();
    for (token, value) in context.tokens() {
        if result.contains(&token) {
            result = result.replace(&token, value);
        }
    }
    result
}

/// Substitute placeholders in every string of a structured value
///
/// Keys and values are handled alike. Strings are processed one at a time, so
/// a substituted value can never change the shape of the tree. A string that
/// changed is re-read as a plain YAML scalar: `"_num_"` becomes the integer
/// `1`, while `"_num_-_name_"` stays a string.
pub fn substitute_value(value: &Value, context: &VariableContext) -> Value {
    match value {
        Value::String(s) => substitute_scalar(s, context),
        Value::Sequence(items) => Value::Sequence(
            items
                .iter()
                .map(|item| substitute_value(item, context))
                .collect(),
        ),
        Value::Mapping(mapping) => Value::Mapping(substitute_mapping(mapping, context)),
        Value::Tagged(tagged) => {
            let mut tagged = tagged.as_ref().clone();
            tagged.value = substitute_value(&tagged.value, context);
            Value::Tagged(Box::new(tagged))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    }
}

/// Substitute placeholders in a mapping's keys and values
pub fn substitute_mapping(mapping: &Mapping, context: &VariableContext) -> Mapping {
    let mut result = Mapping::with_capacity(mapping.len());
    for (key, value) in mapping {
        result.insert(
            substitute_value(key, context),
            substitute_value(value, context),
        );
    }
    result
}

fn substitute_scalar(text: &str, context: &VariableContext) -> Value {
    let substituted = substitute_str(text, context);
    if substituted == text {
        return Value::String(substituted);
    }
    resolve_plain(substituted)
}

/// Resolve text the way an unquoted YAML scalar would be read
fn resolve_plain(text: String) -> Value {
    match serde_yaml::from_str::<Value>(&text) {
        Ok(value @ (Value::Null | Value::Bool(_) | Value::Number(_))) => value,
        _ => Value::String(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(pairs: &[(&str, &str)]) -> VariableContext {
        let variables: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        VariableContext::new(&[], &variables)
    }

    #[test]
    fn test_substitute_str() {
        let ctx = context(&[("num", "2"), ("name", "web")]);
        assert_eq!(substitute_str("_name_-_num_ and _num_", &ctx), "web-2 and 2");
        assert_eq!(substitute_str("no tokens", &ctx), "no tokens");
    }

    #[test]
    fn test_reentrant_expansion_follows_order() {
        let ctx = context(&[("a", "_b_"), ("b", "X")]);
        assert_eq!(substitute_str("_a_", &ctx), "X");

        // reversed order: `_b_` is already gone when `a` produces it
        let ctx = context(&[("b", "X"), ("a", "_b_")]);
        assert_eq!(substitute_str("_a_", &ctx), "_b_");
    }

    #[test]
    fn test_overlapping_tokens_resolve_by_order() {
        // `_num_` is processed before `_num-l_`; neither is a substring of the other
        let ctx = VariableContext::for_instance(&[], "db", 4);
        assert_eq!(substitute_str("_num__num-l_", &ctx), "404");

        // a user key whose token spans two reserved tokens never matches
        // once the reserved passes have run
        let variables = vec![("x_num".to_string(), "Z".to_string())];
        let ctx = VariableContext::for_instance(&variables, "db", 4);
        assert_eq!(substitute_str("_x_num_", &ctx), "_x4");
    }

    #[test]
    fn test_substitute_value_keys_and_values() {
        let ctx = VariableContext::for_instance(
            &[("subnet".to_string(), "10.0".to_string())],
            "web",
            2,
        );
        let body: Value = serde_yaml::from_str(
            r#"
container_name: _name-n_
networks:
  net-_num_:
    ipv4_address: _subnet_._num_.10
environment:
  - ID=_num-l_
"#,
        )
        .unwrap();

        let expected: Value = serde_yaml::from_str(
            r#"
container_name: web-2
networks:
  net-2:
    ipv4_address: 10.0.2.10
environment:
  - ID=02
"#,
        )
        .unwrap();

        assert_eq!(substitute_value(&body, &ctx), expected);
    }

    #[test]
    fn test_substituted_scalars_are_retyped() {
        let ctx = VariableContext::for_instance(&[], "web", 7);
        let body: Value = serde_yaml::from_str("port: _num_\nlabel: _num_-_name_\nkeep: '8080'").unwrap();
        let result = substitute_value(&body, &ctx);

        assert_eq!(result["port"], Value::Number(7u64.into()));
        assert_eq!(result["label"], Value::String("7-web".to_string()));
        // untouched strings keep their type
        assert_eq!(result["keep"], Value::String("8080".to_string()));
    }

    #[test]
    fn test_substitution_never_changes_structure() {
        let ctx = context(&[("evil", "a: b")]);
        let body: Value = serde_yaml::from_str("x: _evil_").unwrap();
        let result = substitute_value(&body, &ctx);
        assert_eq!(result["x"], Value::String("a: b".to_string()));
    }
}
