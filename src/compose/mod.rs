//! Compose document expansion
//!
//! Settings and override documents are merged, every service and network
//! entry is expanded into its numbered instances, and the result is written
//! as a docker-compose file headed by the directive log.

pub mod assembler;
pub mod config;
pub mod expand;
pub mod log;

pub use assembler::{Assembly, DocumentAssembler, MAX_NUM, MIN_NUM};
pub use config::{FinalDocument, OverrideConfig, Settings};
pub use expand::{expand_script, Expander};
pub use log::DirectiveLog;
