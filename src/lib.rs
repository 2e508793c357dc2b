//! compose-dup - numbered docker-compose instances from templated definitions
//!
//! A settings document and a per-run override document describe services and
//! networks whose names may carry expansion codes (`bd%app`, `d%net`). Each
//! run expands them into N numbered, interdependent instances:
//!
//! - `_num_`, `_num-l_`, `_name_`, `_name-n_` and user variables are
//!   substituted anywhere in an entry's body
//! - `d` duplicates an entry per instance, `b` builds its image once
//! - script directives are stored in the written compose file and replayed
//!   later against the running deployment

pub mod compose;
pub mod error;
pub mod runtime;
pub mod template;

pub use error::{DupError, Result};
