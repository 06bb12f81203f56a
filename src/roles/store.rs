//! Group storage - the host primitive roles are built on
//!
//! `GroupStore` is the interface the role engine consumes. Two
//! implementations live here:
//! - `MemoryGroupStore`: in-process table, used directly by tests
//! - `FileGroupStore`: the same table persisted as JSON after each mutation

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::color::Formatting;
use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────
// Group Types
// ─────────────────────────────────────────────────────────────────

/// A generic host group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub display_name: String,
    pub prefix: String,
    pub color: Formatting,
    #[serde(default)]
    pub members: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

/// Display attributes to change on a group; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct GroupUpdate {
    pub display_name: Option<String>,
    pub prefix: Option<String>,
    pub color: Option<Formatting>,
}

// ─────────────────────────────────────────────────────────────────
// Store Interface
// ─────────────────────────────────────────────────────────────────

/// Host group storage
///
/// Calls are synchronous and complete within the invoking command or tick.
pub trait GroupStore {
    fn get_group(&self, id: &str) -> Option<Group>;

    /// Allocate an empty group under `id`
    fn create_group(&mut self, id: &str) -> Result<Group>;

    fn delete_group(&mut self, id: &str) -> Result<()>;

    fn list_groups(&self) -> Vec<Group>;

    /// Add `user` to the group, moving them out of any group they were in.
    /// Fails with `StorageInconsistency` when the storage refuses.
    fn add_member(&mut self, id: &str, user: &str) -> Result<()>;

    /// Fails with `StorageInconsistency` when the user is not a member.
    fn remove_member(&mut self, id: &str, user: &str) -> Result<()>;

    fn update_group(&mut self, id: &str, update: GroupUpdate) -> Result<Group>;

    /// The group `user` currently belongs to, managed or not
    fn user_group(&self, user: &str) -> Option<Group>;
}

// ─────────────────────────────────────────────────────────────────
// In-Memory Store
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryGroupStore {
    #[serde(default)]
    groups: BTreeMap<String, Group>,
}

impl MemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a group as-is; used to seed foreign groups
    pub fn insert_group(&mut self, group: Group) {
        self.groups.insert(group.id.clone(), group);
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl GroupStore for MemoryGroupStore {
    fn get_group(&self, id: &str) -> Option<Group> {
        self.groups.get(id).cloned()
    }

    fn create_group(&mut self, id: &str) -> Result<Group> {
        if self.groups.contains_key(id) {
            return Err(Error::Internal(format!("group {} already allocated", id)));
        }
        let group = Group {
            id: id.to_string(),
            display_name: id.to_string(),
            prefix: String::new(),
            color: Formatting::White,
            members: BTreeSet::new(),
            created_at: Utc::now(),
        };
        self.groups.insert(id.to_string(), group.clone());
        Ok(group)
    }

    fn delete_group(&mut self, id: &str) -> Result<()> {
        self.groups.remove(id);
        Ok(())
    }

    fn list_groups(&self) -> Vec<Group> {
        self.groups.values().cloned().collect()
    }

    fn add_member(&mut self, id: &str, user: &str) -> Result<()> {
        if !self.groups.contains_key(id) {
            return Err(Error::storage_inconsistency("add", id, user));
        }
        for group in self.groups.values_mut() {
            if group.id != id {
                group.members.remove(user);
            }
        }
        if let Some(group) = self.groups.get_mut(id) {
            group.members.insert(user.to_string());
        }
        Ok(())
    }

    fn remove_member(&mut self, id: &str, user: &str) -> Result<()> {
        let removed = self
            .groups
            .get_mut(id)
            .is_some_and(|group| group.members.remove(user));
        if removed {
            Ok(())
        } else {
            Err(Error::storage_inconsistency("remove", id, user))
        }
    }

    fn update_group(&mut self, id: &str, update: GroupUpdate) -> Result<Group> {
        let group = self
            .groups
            .get_mut(id)
            .ok_or_else(|| Error::Internal(format!("group {} vanished during update", id)))?;

        if let Some(display_name) = update.display_name {
            group.display_name = display_name;
        }
        if let Some(prefix) = update.prefix {
            group.prefix = prefix;
        }
        if let Some(color) = update.color {
            group.color = color;
        }
        Ok(group.clone())
    }

    fn user_group(&self, user: &str) -> Option<Group> {
        self.groups
            .values()
            .find(|g| g.members.contains(user))
            .cloned()
    }
}

// ─────────────────────────────────────────────────────────────────
// File-Backed Store
// ─────────────────────────────────────────────────────────────────

/// Group table persisted as JSON, rewritten atomically after each mutation
#[derive(Debug)]
pub struct FileGroupStore {
    path: PathBuf,
    inner: MemoryGroupStore,
}

impl FileGroupStore {
    /// Open the table at `path`; a missing file is an empty table
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let inner = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            serde_json::from_str(&content).map_err(|e| Error::StoreCorrupt {
                path: path.clone(),
                source: e,
            })?
        } else {
            MemoryGroupStore::new()
        };
        debug!(path = %path.display(), groups = inner.len(), "Group store loaded");
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let content = serde_json::to_string_pretty(&self.inner)
            .map_err(|e| Error::Internal(format!("group table not serializable: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| Error::IoWrite {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| Error::IoWrite {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(())
    }
}

impl GroupStore for FileGroupStore {
    fn get_group(&self, id: &str) -> Option<Group> {
        self.inner.get_group(id)
    }

    fn create_group(&mut self, id: &str) -> Result<Group> {
        let group = self.inner.create_group(id)?;
        self.persist()?;
        Ok(group)
    }

    fn delete_group(&mut self, id: &str) -> Result<()> {
        self.inner.delete_group(id)?;
        self.persist()
    }

    fn list_groups(&self) -> Vec<Group> {
        self.inner.list_groups()
    }

    fn add_member(&mut self, id: &str, user: &str) -> Result<()> {
        self.inner.add_member(id, user)?;
        self.persist()
    }

    fn remove_member(&mut self, id: &str, user: &str) -> Result<()> {
        self.inner.remove_member(id, user)?;
        self.persist()
    }

    fn update_group(&mut self, id: &str, update: GroupUpdate) -> Result<Group> {
        let group = self.inner.update_group(id, update)?;
        self.persist()?;
        Ok(group)
    }

    fn user_group(&self, user: &str) -> Option<Group> {
        self.inner.user_group(user)
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
