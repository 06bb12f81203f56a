//! simple-roles - self-service named, colored roles
//!
//! Users of a shared multi-user environment create, join, leave and edit
//! their own roles on top of the host's group storage. A presence watcher
//! greets users arriving online with the other members of their role.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod presence;
pub mod roles;
pub mod version;

pub use error::{Error, ErrorCode, Result};
