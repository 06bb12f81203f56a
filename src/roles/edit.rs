//! Edit service - rename and recolor the caller's own role

use std::str::FromStr;

use tracing::info;

use super::color::Formatting;
use super::membership::MembershipManager;
use super::store::GroupStore;
use super::types::{validate_role_name, Notice};
use crate::error::{Error, Result};

/// Editable role attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleProperty {
    Name,
    Color,
}

impl FromStr for RoleProperty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(RoleProperty::Name),
            "color" => Ok(RoleProperty::Color),
            _ => Err(Error::UnknownProperty {
                property: s.to_string(),
            }),
        }
    }
}

/// Parse a palette entry that must be a color
pub fn parse_color(value: &str) -> Result<Formatting> {
    let entry = Formatting::from_name(value).ok_or_else(|| Error::UnknownColor {
        value: value.to_string(),
        options: Formatting::color_names(),
    })?;
    if !entry.is_color() {
        return Err(Error::NotAColor {
            value: value.to_string(),
        });
    }
    Ok(entry)
}

/// Applies attribute edits on behalf of a role member
pub struct EditService<'a, S> {
    membership: &'a mut MembershipManager<S>,
}

impl<'a, S: GroupStore> EditService<'a, S> {
    pub fn new(membership: &'a mut MembershipManager<S>) -> Self {
        Self { membership }
    }

    /// Edit `property` of the role `user` is currently in
    ///
    /// All validation happens before storage is touched.
    pub fn edit(&mut self, user: &str, property: &str, value: &str) -> Result<Notice> {
        let role = self.membership.current_role(user)?;

        match property.parse::<RoleProperty>()? {
            RoleProperty::Name => {
                let new_name = validate_role_name(value)?;
                let renamed = self.membership.registry_mut().rename(&role.id, new_name)?;
                info!(user = %user, role_id = %role.id, old = %role.display_name, new = %renamed.display_name, "Role renamed");
                Ok(Notice::Renamed {
                    old: role.display_name,
                    new: renamed.display_name,
                })
            }
            RoleProperty::Color => {
                let color = parse_color(value)?;
                let recolored = self.membership.registry_mut().recolor(&role.id, color)?;
                info!(user = %user, role_id = %role.id, color = %color, "Role recolored");
                Ok(Notice::Recolored {
                    name: recolored.display_name,
                    color,
                })
            }
        }
    }
}
