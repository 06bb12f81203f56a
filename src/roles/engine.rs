//! Command dispatch - one `RoleCommand` maps to one role operation

use tracing::debug;

use super::codec::IdCodec;
use super::edit::EditService;
use super::membership::MembershipManager;
use super::registry::RoleRegistry;
use super::store::GroupStore;
use super::types::{validate_role_name, Notice};
use crate::config::RoleSettings;
use crate::error::{Error, Result};

/// A role command as issued by a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleCommand {
    List,
    Create { name: String },
    Join { name: String },
    Leave,
    Edit { property: String, value: String },
}

impl RoleCommand {
    /// Whether the command acts on behalf of a specific user
    pub fn needs_identity(&self) -> bool {
        !matches!(self, RoleCommand::List)
    }
}

/// Runs role commands against a group store
pub struct RoleEngine<S> {
    membership: MembershipManager<S>,
}

impl<S: GroupStore> RoleEngine<S> {
    pub fn new(store: S, settings: &RoleSettings) -> Self {
        let registry = RoleRegistry::new(store, IdCodec::new(settings.namespace_prefix.clone()));
        Self {
            membership: MembershipManager::new(registry).with_strict_join(settings.strict_join),
        }
    }

    pub fn membership(&self) -> &MembershipManager<S> {
        &self.membership
    }

    pub fn into_store(self) -> S {
        self.membership.into_registry().into_store()
    }

    /// Execute `command` for `user`, returning the confirmations to show
    pub fn execute(&mut self, user: Option<&str>, command: RoleCommand) -> Result<Vec<Notice>> {
        let user = match user.map(str::trim) {
            Some(u) if !u.is_empty() => u,
            _ if command.needs_identity() => return Err(Error::MissingIdentity),
            _ => "",
        };
        debug!(user = %user, command = ?command, "Executing role command");

        match command {
            RoleCommand::List => Ok(vec![Notice::Listing(self.membership.registry().list())]),
            RoleCommand::Create { name } => self.membership.create_and_join(user, &name),
            RoleCommand::Join { name } => {
                validate_role_name(&name)?;
                let role = self
                    .membership
                    .registry()
                    .find(&name)
                    .ok_or_else(|| Error::role_not_found(&name))?;
                self.membership.join(user, &role.id)
            }
            RoleCommand::Leave => self.membership.leave(user),
            RoleCommand::Edit { property, value } => {
                let notice = EditService::new(&mut self.membership).edit(user, &property, &value)?;
                Ok(vec![notice])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::store::MemoryGroupStore;

    fn engine() -> RoleEngine<MemoryGroupStore> {
        RoleEngine::new(MemoryGroupStore::new(), &RoleSettings::default())
    }

    fn create(name: &str) -> RoleCommand {
        RoleCommand::Create { name: name.into() }
    }

    fn join(name: &str) -> RoleCommand {
        RoleCommand::Join { name: name.into() }
    }

    fn rendered(notices: &[Notice]) -> Vec<String> {
        notices.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_list_without_identity() {
        let mut engine = engine();
        let notices = engine.execute(None, RoleCommand::List).unwrap();
        assert_eq!(rendered(&notices), vec!["There are no roles"]);
    }

    #[test]
    fn test_missing_identity_is_internal() {
        let mut engine = engine();
        let err = engine.execute(None, RoleCommand::Leave).unwrap_err();
        assert!(matches!(err, Error::MissingIdentity));
        assert!(err.is_bug());

        let err = engine.execute(Some("  "), create("Archer")).unwrap_err();
        assert!(matches!(err, Error::MissingIdentity));
    }

    #[test]
    fn test_scenario_create_then_list() {
        let mut engine = engine();
        let notices = engine.execute(Some("u1"), create("Archer")).unwrap();
        assert_eq!(rendered(&notices), vec!["Added role Archer", "Joined role Archer"]);

        let listing = engine.execute(None, RoleCommand::List).unwrap();
        let text = listing[0].to_string();
        assert!(text.starts_with("Available roles are:"));
        assert!(text.contains("- Archer ("));
        assert!(text.contains("1 member)"));
    }

    #[test]
    fn test_scenario_join_and_leave() {
        let mut engine = engine();
        engine.execute(Some("u1"), create("Archer")).unwrap();
        engine.execute(Some("u2"), join("Archer")).unwrap();

        let role = engine.membership().registry().find("Archer").unwrap();
        assert!(role.has_member("u1") && role.has_member("u2"));

        let notices = engine.execute(Some("u1"), RoleCommand::Leave).unwrap();
        assert_eq!(rendered(&notices), vec!["Left role Archer"]);

        let notices = engine.execute(Some("u2"), RoleCommand::Leave).unwrap();
        assert_eq!(
            rendered(&notices),
            vec![
                "Left role Archer",
                "Removed role Archer, because it has no members anymore."
            ]
        );
    }

    #[test]
    fn test_join_validates_and_finds() {
        let mut engine = engine();
        assert!(matches!(
            engine.execute(Some("u1"), join("ab")),
            Err(Error::NameTooShort { .. })
        ));
        assert!(matches!(
            engine.execute(Some("u1"), join("Archer")),
            Err(Error::RoleNotFound { .. })
        ));
    }

    #[test]
    fn test_create_twice() {
        let mut engine = engine();
        engine.execute(Some("u1"), create("Archer")).unwrap();
        let before = engine.membership().registry().find("Archer").unwrap();

        let err = engine.execute(Some("u2"), create("Archer")).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));
        assert_eq!(engine.membership().registry().find("Archer").unwrap(), before);
        assert!(engine.membership().role_of("u2").is_none());
    }

    #[test]
    fn test_edit_dispatch() {
        let mut engine = engine();
        engine.execute(Some("u1"), create("Archer")).unwrap();

        let notices = engine
            .execute(
                Some("u1"),
                RoleCommand::Edit {
                    property: "color".into(),
                    value: "gold".into(),
                },
            )
            .unwrap();
        assert_eq!(rendered(&notices), vec!["Changed color of role Archer to gold"]);
    }

    #[test]
    fn test_custom_namespace() {
        let settings = RoleSettings {
            namespace_prefix: "guild.".into(),
            strict_join: false,
        };
        let mut engine = RoleEngine::new(MemoryGroupStore::new(), &settings);
        engine.execute(Some("u1"), create("Archer")).unwrap();

        let store = engine.into_store();
        assert!(store.list_groups().iter().all(|g| g.id.starts_with("guild.")));
    }
}
