//! Per-instance placeholder values

/// 1-based instance index
pub const KEY_NUM: &str = "num";
/// Instance index zero-padded to two digits
pub const KEY_NUM_LONG: &str = "num-l";
/// Base name of the entry being expanded
pub const KEY_NAME: &str = "name";
/// `<name>-<num>`
pub const KEY_NAME_N: &str = "name-n";

/// Keys always present when expanding services and networks
pub const RESERVED_KEYS: &[&str] = &[KEY_NUM, KEY_NUM_LONG, KEY_NAME, KEY_NAME_N];

/// Keys present when expanding replayed scripts
pub const SCRIPT_KEYS: &[&str] = &[KEY_NUM, KEY_NUM_LONG];

/// Ordered placeholder table
///
/// Substitution walks the entries in insertion order. Setting an existing key
/// updates it in place, so user variables that shadow a reserved key keep the
/// reserved key's position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableContext {
    entries: Vec<(String, String)>,
}

impl VariableContext {
    /// Create a context holding `keys` with empty values, overlaid with `variables`
    pub fn new(keys: &[&str], variables: &[(String, String)]) -> Self {
        let mut context = Self {
            entries: keys.iter().map(|k| (k.to_string(), String::new())).collect(),
        };
        for (key, value) in variables {
            context.set(key, value);
        }
        context
    }

    /// Context for instance `num` of the entry `name`
    pub fn for_instance(variables: &[(String, String)], name: &str, num: u32) -> Self {
        let mut context = Self::new(RESERVED_KEYS, variables);
        context.set(KEY_NAME, name);
        context.set_num(num);
        context.set(KEY_NAME_N, &instance_name(name, num));
        context
    }

    /// Context for instance `num` of a replayed script
    pub fn for_script(variables: &[(String, String)], num: u32) -> Self {
        let mut context = Self::new(SCRIPT_KEYS, variables);
        context.set_num(num);
        context
    }

    /// Set a value, keeping the key's position if it already exists
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    fn set_num(&mut self, num: u32) {
        self.set(KEY_NUM, &num.to_string());
        self.set(KEY_NUM_LONG, &format!("{:02}", num));
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate `(key, value)` pairs in substitution order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `(token, value)` passes in substitution order
    pub fn tokens(&self) -> Vec<(String, &str)> {
        self.iter().map(|(k, v)| (token(k), v)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Placeholder token for a key
pub fn token(key: &str) -> String {
    format!("_{}_", key)
}

/// Name of a duplicated instance
pub fn instance_name(name: &str, num: u32) -> String {
    format!("{}-{}", name, num)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_reserved_keys_first() {
        let context = VariableContext::for_instance(&vars(&[("subnet", "10.0")]), "web", 3);
        let keys: Vec<&str> = context.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["num", "num-l", "name", "name-n", "subnet"]);
        assert_eq!(context.get("num"), Some("3"));
        assert_eq!(context.get("num-l"), Some("03"));
        assert_eq!(context.get("name"), Some("web"));
        assert_eq!(context.get("name-n"), Some("web-3"));
    }

    #[test]
    fn test_shadowed_reserved_key_is_overwritten_per_instance() {
        let context = VariableContext::for_instance(&vars(&[("num", "x")]), "web", 12);
        assert_eq!(context.len(), 4);
        assert_eq!(context.get("num"), Some("12"));
        assert_eq!(context.get("num-l"), Some("12"));
    }

    #[test]
    fn test_script_context_has_no_name() {
        let context = VariableContext::for_script(&[], 1);
        assert_eq!(context.get("name"), None);
        assert_eq!(context.get("name-n"), None);
        assert_eq!(context.get("num-l"), Some("01"));
    }
}
