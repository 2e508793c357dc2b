//! Document assembly from settings and override documents

use super::config::{
    CollisionPolicy, FinalDocument, OverrideConfig, OverrideMatch, Settings,
};
use super::expand::Expander;
use crate::error::{DupError, Result};
use crate::template::directive::Directive;
use serde_yaml::{Mapping, Value};

/// Smallest accepted instance count
pub const MIN_NUM: u32 = 1;

/// Largest accepted instance count
pub const MAX_NUM: u32 = 99;

/// Check an instance count against [`MIN_NUM`, `MAX_NUM`]
pub fn validate_num(num: i64) -> Result<u32> {
    if num < MIN_NUM as i64 || num > MAX_NUM as i64 {
        return Err(DupError::NumOutOfRange {
            value: num,
            min: MIN_NUM,
            max: MAX_NUM,
        });
    }
    Ok(num as u32)
}

/// A service or network entry with its parsed directive
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub directive: Directive,
    pub body: Value,
}

impl Entry {
    fn from_pair(key: &Value, body: &Value) -> Result<Self> {
        let raw = match key {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => return Err(DupError::InvalidEntry(format!("{:?}", other))),
        };
        Ok(Self {
            directive: Directive::parse(&raw),
            body: body.clone(),
        })
    }
}

/// Result of an assembly run
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    /// Expanded compose document
    pub document: FinalDocument,
    /// Raw script directives, settings first
    pub scripts: Vec<String>,
    /// Instance count used
    pub num: u32,
}

/// Merges settings and override documents and expands every entry
pub struct DocumentAssembler<'a> {
    settings: &'a Settings,
}

impl<'a> DocumentAssembler<'a> {
    /// Create an assembler using the settings' own policies
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Build the final document for `num` instances
    pub fn assemble(&self, overrides: &OverrideConfig, num: i64) -> Result<Assembly> {
        let num = validate_num(num)?;
        let variables = self.settings.variable_pairs();
        let expander = Expander::new(&variables, &self.settings.image_dir, num);

        let services = merge_entries(
            self.settings.services.as_ref(),
            overrides.services.as_ref(),
            self.settings.expansion.override_match,
        )?;
        let networks = merge_entries(
            self.settings.networks.as_ref(),
            None,
            self.settings.expansion.override_match,
        )?;
        let scripts = concat_scripts(
            self.settings.scripts.as_deref(),
            overrides.scripts.as_deref(),
        );

        tracing::info!(
            "Expanding {} services and {} networks for {} instances",
            services.len(),
            networks.len(),
            num
        );

        let mut document = FinalDocument::new(&self.settings.version);

        for entry in &services {
            for (name, body) in expander.expand_service(&entry.directive, &entry.body) {
                self.insert(&mut document.services, "service", name, body)?;
            }
        }

        for entry in &networks {
            for (name, body) in expander.expand_network(&entry.directive, &entry.body) {
                self.insert(&mut document.networks, "network", name, body)?;
            }
        }

        tracing::debug!(
            "Assembled {} services, {} networks, {} scripts",
            document.services.len(),
            document.networks.len(),
            scripts.len()
        );

        Ok(Assembly {
            document,
            scripts,
            num,
        })
    }

    fn insert(
        &self,
        target: &mut Mapping,
        kind: &'static str,
        name: String,
        body: Value,
    ) -> Result<()> {
        if target.contains_key(name.as_str()) {
            match self.settings.expansion.collisions {
                CollisionPolicy::Overwrite => {
                    tracing::warn!("The {} '{}' is produced twice, keeping the last", kind, name);
                }
                CollisionPolicy::Reject => {
                    return Err(DupError::NameCollision { kind, name });
                }
            }
        }
        target.insert(Value::String(name), body);
        Ok(())
    }
}

/// Merge base and override entries, override winning
///
/// Replaced entries keep the base entry's position; new override entries
/// are appended in their own order.
pub fn merge_entries(
    base: Option<&Mapping>,
    overlay: Option<&Mapping>,
    policy: OverrideMatch,
) -> Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = Vec::new();

    for mapping in [base, overlay].into_iter().flatten() {
        for (key, body) in mapping {
            let entry = Entry::from_pair(key, body)?;
            let existing = entries.iter_mut().find(|e| match policy {
                OverrideMatch::Exact => e.directive == entry.directive,
                OverrideMatch::Name => e.directive.name() == entry.directive.name(),
            });
            match existing {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }
    }

    Ok(entries)
}

/// Settings scripts followed by override scripts, duplicates kept
pub fn concat_scripts(base: Option<&[String]>, overlay: Option<&[String]>) -> Vec<String> {
    base.into_iter()
        .chain(overlay)
        .flat_map(|scripts| scripts.iter().cloned())
        .collect()
}
