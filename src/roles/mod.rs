//! Self-service roles
//!
//! Roles are groups in the host's group storage whose id lives in a reserved
//! namespace. Users create, join, leave and edit them without an
//! administrator; a role disappears as soon as its last member leaves.
//!
//! - `codec`: display name to namespaced group id
//! - `registry`: create, look up, list and edit roles
//! - `membership`: join and leave, empty-role reclamation
//! - `edit`: attribute edits on behalf of a member
//! - `engine`: command dispatch

pub mod codec;
pub mod color;
pub mod edit;
pub mod engine;
pub mod membership;
pub mod registry;
pub mod store;
pub mod types;

pub use codec::IdCodec;
pub use color::Formatting;
pub use edit::{EditService, RoleProperty};
pub use engine::{RoleCommand, RoleEngine};
pub use membership::MembershipManager;
pub use registry::RoleRegistry;
pub use store::{FileGroupStore, Group, GroupStore, GroupUpdate, MemoryGroupStore};
pub use types::{Notice, Role, MAX_NAME_LEN, MIN_NAME_LEN};
