//! External collaborators: the shell and the container runtime
//!
//! Everything here shells out; the expansion engine never reaches this module.

pub mod docker;
pub mod replay;
pub mod shell;

pub use docker::{ContainerRuntime, DockerCli};
pub use replay::{ReplayPolicy, ReplayReport, Replayer};
pub use shell::{CommandStatus, Shell, SystemShell};
