//! Role entity, name rules and user-facing notices

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};

use super::color::Formatting;
use super::store::Group;
use crate::error::{Error, Result};

/// Shortest accepted display name, in characters
pub const MIN_NAME_LEN: usize = 3;

/// Longest accepted display name, in characters
pub const MAX_NAME_LEN: usize = 32;

/// Check a display name against the length bounds
pub fn validate_role_name(name: &str) -> Result<&str> {
    let len = name.chars().count();
    if len < MIN_NAME_LEN {
        return Err(Error::NameTooShort {
            name: name.to_string(),
            min: MIN_NAME_LEN,
        });
    }
    if len > MAX_NAME_LEN {
        return Err(Error::NameTooLong {
            name: name.to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(name)
}

/// Display decoration shown before member names
pub fn role_prefix(display_name: &str) -> String {
    format!("[{}] ", display_name)
}

/// A managed role as seen by the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// Derived storage id, fixed at creation
    pub id: String,
    pub display_name: String,
    pub prefix: String,
    pub color: Formatting,
    pub members: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl Role {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn has_member(&self, user: &str) -> bool {
        self.members.contains(user)
    }
}

impl From<Group> for Role {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            display_name: group.display_name,
            prefix: group.prefix,
            color: group.color,
            members: group.members,
            created_at: group.created_at,
        }
    }
}

/// A confirmation produced by a role operation, rendered for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Created { name: String },
    Joined { name: String },
    AlreadyMember { name: String },
    Left { name: String },
    /// The role lost its last member and was deleted
    Removed { name: String },
    Renamed { old: String, new: String },
    Recolored { name: String, color: Formatting },
    Listing(Vec<Role>),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Created { name } => write!(f, "Added role {}", name),
            Notice::Joined { name } => write!(f, "Joined role {}", name),
            Notice::AlreadyMember { name } => write!(f, "You are already in role {}", name),
            Notice::Left { name } => write!(f, "Left role {}", name),
            Notice::Removed { name } => write!(
                f,
                "Removed role {}, because it has no members anymore.",
                name
            ),
            Notice::Renamed { old, new } => write!(f, "Renamed role {} to {}", old, new),
            Notice::Recolored { name, color } => {
                write!(f, "Changed color of role {} to {}", name, color)
            }
            Notice::Listing(roles) if roles.is_empty() => write!(f, "There are no roles"),
            Notice::Listing(roles) => {
                write!(f, "Available roles are:")?;
                for role in roles {
                    let count = role.member_count();
                    write!(
                        f,
                        "\n- {} ({}, {} member{})",
                        role.display_name,
                        role.color,
                        count,
                        if count == 1 { "" } else { "s" }
                    )?;
                }
                Ok(())
            }
        }
    }
}
