//! Membership manager - one role per user, empty roles reclaimed
//!
//! Who is in which role is tracked in an explicit user -> role id map,
//! rebuilt from storage when the manager is constructed and kept in step
//! with every join and leave. A user moves between roles by leaving first,
//! or in strict mode by joining first and vacating the old role only once
//! the new one accepted them. A role whose last member leaves is deleted in
//! the same step.

use std::collections::HashMap;

use tracing::{info, warn};

use super::registry::RoleRegistry;
use super::store::GroupStore;
use super::types::{Notice, Role};
use crate::error::{Error, Result};

pub struct MembershipManager<S> {
    registry: RoleRegistry<S>,
    /// user -> managed role id
    assignments: HashMap<String, String>,
    strict_join: bool,
}

impl<S: GroupStore> MembershipManager<S> {
    pub fn new(registry: RoleRegistry<S>) -> Self {
        let assignments = registry
            .list()
            .into_iter()
            .flat_map(|role| {
                let id = role.id;
                role.members
                    .into_iter()
                    .map(move |user| (user, id.clone()))
            })
            .collect();

        Self {
            registry,
            assignments,
            strict_join: false,
        }
    }

    /// Report a rejected add-member as an error instead of tolerating it
    pub fn with_strict_join(mut self, strict_join: bool) -> Self {
        self.strict_join = strict_join;
        self
    }

    pub fn registry(&self) -> &RoleRegistry<S> {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut RoleRegistry<S> {
        &mut self.registry
    }

    pub fn into_registry(self) -> RoleRegistry<S> {
        self.registry
    }

    /// The managed role `user` belongs to, if any
    pub fn role_of(&self, user: &str) -> Option<Role> {
        self.assignments
            .get(user)
            .and_then(|id| self.registry.get(id))
    }

    /// Resolve the user's current role for leave and edit
    ///
    /// Fails with `NotInRole` when the user has no group at all and with
    /// `NotAManagedRole` when their group is a foreign one.
    pub fn current_role(&self, user: &str) -> Result<Role> {
        if let Some(role) = self.role_of(user) {
            return Ok(role);
        }
        match self.registry.store().user_group(user) {
            Some(group) if self.registry.codec().is_managed(&group.id) => Ok(Role::from(group)),
            Some(group) => Err(Error::NotAManagedRole {
                user: user.to_string(),
                group_id: group.id,
            }),
            None => Err(Error::not_in_role(user)),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────

    /// Create a role and make `user` its first member
    pub fn create_and_join(&mut self, user: &str, display_name: &str) -> Result<Vec<Notice>> {
        // A user parked in a foreign group could never join the new role
        if let Err(e @ Error::NotAManagedRole { .. }) = self.current_role(user) {
            return Err(e);
        }

        let role = self.registry.create(display_name)?;
        let mut notices = vec![Notice::Created {
            name: role.display_name.clone(),
        }];

        match self.join(user, &role.id) {
            Ok(joined) => notices.extend(joined),
            Err(e) => {
                self.reclaim_if_empty(&role.id)?;
                return Err(e);
            }
        }
        Ok(notices)
    }

    /// Move `user` into the role with id `role_id`, leaving their current
    /// role first
    pub fn join(&mut self, user: &str, role_id: &str) -> Result<Vec<Notice>> {
        let target = self
            .registry
            .get(role_id)
            .ok_or_else(|| Error::role_not_found(role_id))?;

        let previous = match self.current_role(user) {
            Ok(current) if current.id == target.id => {
                return Ok(vec![Notice::AlreadyMember {
                    name: target.display_name,
                }]);
            }
            Ok(current) => Some(current),
            Err(Error::NotInRole { .. }) => None,
            Err(e) => return Err(e),
        };

        if self.strict_join {
            return self.join_then_vacate(user, target, previous);
        }

        let mut notices = Vec::new();
        if previous.is_some() {
            notices.extend(self.leave(user)?);
        }

        match self.registry.add_member(&target.id, user) {
            Ok(()) => {
                self.assignments.insert(user.to_string(), target.id.clone());
                info!(user = %user, role_id = %target.id, name = %target.display_name, "Joined role");
            }
            Err(e @ Error::StorageInconsistency { .. }) => {
                warn!(
                    user = %user,
                    role_id = %target.id,
                    error = %e.format_for_log(),
                    "Failed to add user to role"
                );
                self.reclaim_if_empty(&target.id)?;
            }
            Err(e) => return Err(e),
        }

        notices.push(Notice::Joined {
            name: target.display_name,
        });
        Ok(notices)
    }

    /// Strict join: the previous role is only vacated once the target has
    /// accepted the user, so a refused add leaves the user where they were
    fn join_then_vacate(
        &mut self,
        user: &str,
        target: Role,
        previous: Option<Role>,
    ) -> Result<Vec<Notice>> {
        if let Err(e) = self.registry.add_member(&target.id, user) {
            warn!(
                user = %user,
                role_id = %target.id,
                error = %e.format_for_log(),
                "Failed to add user to role"
            );
            self.reclaim_if_empty(&target.id)?;
            return Err(e);
        }
        self.assignments.insert(user.to_string(), target.id.clone());
        info!(user = %user, role_id = %target.id, name = %target.display_name, "Joined role");

        let mut notices = Vec::new();
        if let Some(previous) = previous {
            // add_member normally moves the user already
            let still_member = self
                .registry
                .get(&previous.id)
                .is_some_and(|role| role.has_member(user));
            if still_member {
                self.registry.remove_member(&previous.id, user)?;
            }
            info!(user = %user, role_id = %previous.id, name = %previous.display_name, "Left role");

            notices.push(Notice::Left {
                name: previous.display_name.clone(),
            });
            if self.reclaim_if_empty(&previous.id)? {
                notices.push(Notice::Removed {
                    name: previous.display_name,
                });
            }
        }

        notices.push(Notice::Joined {
            name: target.display_name,
        });
        Ok(notices)
    }

    /// Take `user` out of their role, deleting it if it becomes empty
    pub fn leave(&mut self, user: &str) -> Result<Vec<Notice>> {
        let role = self.current_role(user)?;

        self.registry.remove_member(&role.id, user)?;
        self.assignments.remove(user);
        info!(user = %user, role_id = %role.id, name = %role.display_name, "Left role");

        let mut notices = vec![Notice::Left {
            name: role.display_name.clone(),
        }];
        if self.reclaim_if_empty(&role.id)? {
            notices.push(Notice::Removed {
                name: role.display_name,
            });
        }
        Ok(notices)
    }

    /// Delete the role if it has no members; returns whether it was deleted
    fn reclaim_if_empty(&mut self, role_id: &str) -> Result<bool> {
        match self.registry.get(role_id) {
            Some(role) if role.members.is_empty() => {
                self.registry.delete(role_id)?;
                info!(role_id = %role_id, name = %role.display_name, "Removed empty role");
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
