//! Role registry - the managed-role view over group storage
//!
//! Only groups whose id carries the namespace prefix are roles; every other
//! group in the store is invisible here and never mutated.

use tracing::{debug, info, warn};

use super::codec::IdCodec;
use super::color::Formatting;
use super::store::{GroupStore, GroupUpdate};
use super::types::{role_prefix, validate_role_name, Role};
use crate::error::{Error, Result};

/// Registry of managed roles backed by a `GroupStore`
pub struct RoleRegistry<S> {
    store: S,
    codec: IdCodec,
}

impl<S: GroupStore> RoleRegistry<S> {
    pub fn new(store: S, codec: IdCodec) -> Self {
        Self { store, codec }
    }

    pub fn codec(&self) -> &IdCodec {
        &self.codec
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // ─────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────

    /// All managed roles, ordered by display name (case-insensitive)
    pub fn list(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = self
            .store
            .list_groups()
            .into_iter()
            .filter(|g| self.codec.is_managed(&g.id))
            .map(Role::from)
            .collect();
        roles.sort_by(|a, b| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        roles
    }

    /// Look up a role by the name it was created with
    pub fn find(&self, display_name: &str) -> Option<Role> {
        self.get(&self.codec.derive_id(display_name))
    }

    /// Look up a role by id; foreign groups are not returned
    pub fn get(&self, id: &str) -> Option<Role> {
        if !self.codec.is_managed(id) {
            return None;
        }
        self.store.get_group(id).map(Role::from)
    }

    // ─────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────

    /// Create an empty role with a random color
    ///
    /// Membership is left to the caller.
    pub fn create(&mut self, display_name: &str) -> Result<Role> {
        self.create_with_color(display_name, Formatting::random_color(&mut rand::thread_rng()))
    }

    pub fn create_with_color(&mut self, display_name: &str, color: Formatting) -> Result<Role> {
        if self.find(display_name).is_some() {
            return Err(Error::already_exists(display_name));
        }
        validate_role_name(display_name)?;
        if !color.is_color() {
            return Err(Error::NotAColor {
                value: color.name().to_string(),
            });
        }

        let id = self.codec.derive_id(display_name);
        self.store.create_group(&id)?;
        let updated = self.store.update_group(
            &id,
            GroupUpdate {
                display_name: Some(display_name.to_string()),
                prefix: Some(role_prefix(display_name)),
                color: Some(color),
            },
        );
        let group = match updated {
            Ok(group) => group,
            Err(e) => {
                warn!(role_id = %id, error = %e.format_for_log(), "Failed to set role attributes, discarding group");
                self.store.delete_group(&id)?;
                return Err(e);
            }
        };

        info!(role_id = %id, name = %display_name, color = %color, "Role created");
        Ok(Role::from(group))
    }

    /// Change the display name and prefix; the id stays bound to the
    /// creation-time name
    pub fn rename(&mut self, id: &str, display_name: &str) -> Result<Role> {
        validate_role_name(display_name)?;
        let group = self.store.update_group(
            id,
            GroupUpdate {
                display_name: Some(display_name.to_string()),
                prefix: Some(role_prefix(display_name)),
                color: None,
            },
        )?;
        Ok(Role::from(group))
    }

    pub fn recolor(&mut self, id: &str, color: Formatting) -> Result<Role> {
        if !color.is_color() {
            return Err(Error::NotAColor {
                value: color.name().to_string(),
            });
        }
        let group = self.store.update_group(
            id,
            GroupUpdate {
                color: Some(color),
                ..Default::default()
            },
        )?;
        Ok(Role::from(group))
    }

    pub(crate) fn add_member(&mut self, id: &str, user: &str) -> Result<()> {
        self.store.add_member(id, user)
    }

    pub(crate) fn remove_member(&mut self, id: &str, user: &str) -> Result<()> {
        self.store.remove_member(id, user)
    }

    pub(crate) fn delete(&mut self, id: &str) -> Result<()> {
        debug!(role_id = %id, "Deleting role");
        self.store.delete_group(id)
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::store::{Group, MemoryGroupStore};

    fn registry() -> RoleRegistry<MemoryGroupStore> {
        RoleRegistry::new(MemoryGroupStore::new(), IdCodec::default())
    }

    #[test]
    fn test_create_role() {
        let mut reg = registry();
        let role = reg.create("Archer").unwrap();

        assert_eq!(role.display_name, "Archer");
        assert_eq!(role.prefix, "[Archer] ");
        assert_eq!(role.id, reg.codec().derive_id("Archer"));
        assert!(role.color.is_color());
        assert_eq!(role.member_count(), 0);
        assert_eq!(reg.find("Archer"), Some(role));
    }

    #[test]
    fn test_create_twice_conflicts() {
        let mut reg = registry();
        let first = reg.create("Archer").unwrap();

        let err = reg.create("Archer").unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));
        assert_eq!(reg.find("Archer"), Some(first));
        assert_eq!(reg.list().len(), 1);
    }

    #[test]
    fn test_create_validates_name() {
        let mut reg = registry();
        assert!(matches!(reg.create("ab"), Err(Error::NameTooShort { .. })));
        assert!(matches!(reg.create(&"n".repeat(33)), Err(Error::NameTooLong { .. })));
        assert!(reg.list().is_empty());
    }

    #[test]
    fn test_create_rejects_formatting_code() {
        let mut reg = registry();
        assert!(reg.create_with_color("Archer", Formatting::Bold).is_err());
        assert!(reg.find("Archer").is_none());
    }

    /// Store whose attribute updates always fail
    #[derive(Default)]
    struct NoUpdateStore(MemoryGroupStore);

    impl GroupStore for NoUpdateStore {
        fn get_group(&self, id: &str) -> Option<Group> {
            self.0.get_group(id)
        }
        fn create_group(&mut self, id: &str) -> Result<Group> {
            self.0.create_group(id)
        }
        fn delete_group(&mut self, id: &str) -> Result<()> {
            self.0.delete_group(id)
        }
        fn list_groups(&self) -> Vec<Group> {
            self.0.list_groups()
        }
        fn add_member(&mut self, id: &str, user: &str) -> Result<()> {
            self.0.add_member(id, user)
        }
        fn remove_member(&mut self, id: &str, user: &str) -> Result<()> {
            self.0.remove_member(id, user)
        }
        fn update_group(&mut self, id: &str, _update: GroupUpdate) -> Result<Group> {
            Err(Error::Internal(format!("group {} is read-only", id)))
        }
        fn user_group(&self, user: &str) -> Option<Group> {
            self.0.user_group(user)
        }
    }

    #[test]
    fn test_failed_create_leaves_no_group() {
        let mut reg = RoleRegistry::new(NoUpdateStore::default(), IdCodec::default());

        assert!(matches!(reg.create("Archer"), Err(Error::Internal(_))));
        assert!(reg.store().list_groups().is_empty());
        assert!(reg.find("Archer").is_none());
    }

    #[test]
    fn test_list_filters_foreign_groups() {
        let mut store = MemoryGroupStore::new();
        store.insert_group(Group {
            id: "red_team".into(),
            display_name: "Red Team".into(),
            prefix: String::new(),
            color: Formatting::Red,
            members: ["zed".to_string()].into_iter().collect(),
            created_at: chrono::Utc::now(),
        });
        let mut reg = RoleRegistry::new(store, IdCodec::default());
        reg.create("mage").unwrap();
        reg.create("Archer").unwrap();

        let names: Vec<String> = reg.list().into_iter().map(|r| r.display_name).collect();
        assert_eq!(names, vec!["Archer", "mage"]);
        assert!(reg.get("red_team").is_none());
    }

    #[test]
    fn test_list_empty() {
        assert!(registry().list().is_empty());
    }

    #[test]
    fn test_rename_keeps_id() {
        let mut reg = registry();
        let role = reg.create("Archer").unwrap();

        let renamed = reg.rename(&role.id, "Bowmen").unwrap();
        assert_eq!(renamed.id, role.id);
        assert_eq!(renamed.display_name, "Bowmen");
        assert_eq!(renamed.prefix, "[Bowmen] ");
        assert!(reg.find("Archer").is_some());
        assert!(reg.find("Bowmen").is_none());
    }

    #[test]
    fn test_rename_validates_bounds() {
        let mut reg = registry();
        let role = reg.create("Archer").unwrap();

        assert!(reg.rename(&role.id, "ab").is_err());
        assert!(reg.rename(&role.id, &"n".repeat(33)).is_err());
        assert!(reg.rename(&role.id, "abc").is_ok());
        assert!(reg.rename(&role.id, &"n".repeat(32)).is_ok());
    }
}
