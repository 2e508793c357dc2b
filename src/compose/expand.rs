//! Instance expansion for services, networks and scripts

use crate::template::context::{instance_name, VariableContext};
use crate::template::directive::{Code, Directive};
use crate::template::substitute::{substitute_str, substitute_value};
use serde_yaml::{Mapping, Value};

/// Expands single entries into their final instances
#[derive(Debug, Clone, Copy)]
pub struct Expander<'a> {
    /// User variables in substitution order
    variables: &'a [(String, String)],
    /// Prefix for build paths
    image_dir: &'a str,
    /// Instance count
    num: u32,
}

impl<'a> Expander<'a> {
    /// Create an expander for `num` instances
    pub fn new(variables: &'a [(String, String)], image_dir: &'a str, num: u32) -> Self {
        Self {
            variables,
            image_dir,
            num,
        }
    }

    /// Expand a service entry
    ///
    /// With `d`, one instance per number named `<name>-<i>`. With `b` as well,
    /// instance 1 builds the image and the rest reuse it and depend on
    /// instance 1. Without `d`, one instance under the literal name.
    pub fn expand_service(&self, directive: &Directive, body: &Value) -> Vec<(String, Value)> {
        let name = directive.name();
        let build = directive.has(Code::Build);

        if !directive.has(Code::Duplicate) {
            let body = if build {
                overlay(self.build_base(name), body)
            } else {
                body.clone()
            };
            return vec![(name.to_string(), self.substitute(name, 1, &body))];
        }

        let first = build.then(|| overlay(self.build_base(name), body));
        let others = build.then(|| overlay(dependent_base(name), body));

        (1..=self.num)
            .map(|i| {
                let instance_body = match (i, &first, &others) {
                    (1, Some(first), _) => first,
                    (_, _, Some(others)) => others,
                    _ => body,
                };
                (
                    instance_name(name, i),
                    self.substitute(name, i, instance_body),
                )
            })
            .collect()
    }

    /// Expand a network entry
    ///
    /// Codeless entries pass through once. Marked entries without `d` produce
    /// nothing.
    pub fn expand_network(&self, directive: &Directive, body: &Value) -> Vec<(String, Value)> {
        let name = directive.name();

        if directive.is_codeless() {
            return vec![(name.to_string(), self.substitute(name, 1, body))];
        }
        if !directive.has(Code::Duplicate) {
            tracing::debug!("Network entry '{}' has codes but no 'd', skipping", directive);
            return Vec::new();
        }

        (1..=self.num)
            .map(|i| (instance_name(name, i), self.substitute(name, i, body)))
            .collect()
    }

    fn substitute(&self, name: &str, num: u32, body: &Value) -> Value {
        let context = VariableContext::for_instance(self.variables, name, num);
        substitute_value(body, &context)
    }

    fn build_base(&self, name: &str) -> Mapping {
        let mut base = Mapping::new();
        base.insert(
            Value::String("build".to_string()),
            Value::String(format!("{}{}", self.image_dir, name)),
        );
        base.insert(
            Value::String("image".to_string()),
            Value::String(name.to_string()),
        );
        base
    }
}

fn dependent_base(name: &str) -> Mapping {
    let mut base = Mapping::new();
    base.insert(
        Value::String("image".to_string()),
        Value::String(name.to_string()),
    );
    base.insert(
        Value::String("depends_on".to_string()),
        Value::Sequence(vec![Value::String(instance_name(name, 1))]),
    );
    base
}

/// Expand a replayed script line into shell commands for `num` instances
///
/// Codeless scripts are returned verbatim. `d` scripts are repeated per
/// instance with only `_num_`, `_num-l_` and user variables filled in.
/// Marked scripts without `d` produce nothing.
pub fn expand_script(
    directive: &Directive,
    variables: &[(String, String)],
    num: u32,
) -> Vec<String> {
    if directive.is_codeless() {
        return vec![directive.payload.clone()];
    }
    if !directive.has(Code::Duplicate) {
        tracing::debug!("Script '{}' has codes but no 'd', skipping", directive);
        return Vec::new();
    }

    (1..=num)
        .map(|i| {
            let context = VariableContext::for_script(variables, i);
            substitute_str(&directive.payload, &context)
        })
        .collect()
}

/// Lay `body` over `base`, body fields winning
///
/// An empty body keeps the base; a body that is not a mapping replaces it.
fn overlay(mut base: Mapping, body: &Value) -> Value {
    match body {
        Value::Mapping(fields) => {
            for (key, value) in fields {
                base.insert(key.clone(), value.clone());
            }
            Value::Mapping(base)
        }
        Value::Null => Value::Mapping(base),
        other => other.clone(),
    }
}
