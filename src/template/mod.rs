//! Template handling for entry names, bodies and scripts
//!
//! Entry names and script lines carry an optional `<codes>%` prefix that
//! controls how they are expanded. Bodies and scripts contain `_key_`
//! placeholders that are filled from a per-instance variable context.

pub mod context;
pub mod directive;
pub mod substitute;

pub use context::VariableContext;
pub use directive::{Code, Directive};
pub use substitute::{substitute_str, substitute_value};
