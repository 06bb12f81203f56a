//! Presence tracker - first-sight detection and the welcome notice
//!
//! The tracker remembers which users it has already seen connected. A user
//! absent from that record who shows up connected has just arrived; a
//! recorded user who no longer shows up is forgotten, so the next
//! connection counts as a new arrival again.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, info, warn};

use super::host::{PresenceEvent, PresenceHost};
use crate::error::{Error, Result};
use crate::roles::{Formatting, GroupStore, MembershipManager};

/// Roles with this many members or fewer are not announced
pub const WELCOME_MIN_EXCLUSIVE: usize = 2;

/// Result of one presence tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Completed {
        /// Users that were sent a welcome
        welcomed: Vec<String>,
        /// Users no longer connected
        departed: Vec<String>,
    },
    /// The connected set changed mid-scan; nothing was recorded
    Abandoned,
}

/// Welcome message listing a user's fellow role members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeNotice {
    pub role_name: String,
    /// Other members with their connection state
    pub members: Vec<(String, bool)>,
}

impl fmt::Display for WelcomeNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<String> = self
            .members
            .iter()
            .map(|(name, online)| {
                let color = if *online {
                    Formatting::Green
                } else {
                    Formatting::DarkRed
                };
                color.paint(name)
            })
            .collect();
        write!(
            f,
            "Welcome! Here are the members of your role: {}",
            members.join(",")
        )
    }
}

#[derive(Debug, Default)]
pub struct PresenceTracker {
    seen: BTreeSet<String>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Users currently recorded as connected
    pub fn seen(&self) -> &BTreeSet<String> {
        &self.seen
    }

    /// Diff the host's connected set against the record and welcome arrivals
    pub fn tick<H, S>(&mut self, host: &mut H, membership: &MembershipManager<S>) -> Result<TickOutcome>
    where
        H: PresenceHost,
        S: GroupStore,
    {
        let current = match host.connected_users() {
            Ok(current) => current,
            Err(Error::RosterChanged { path }) => {
                warn!(path = %path.display(), "Connected users changed during scan, retrying next tick");
                return Ok(TickOutcome::Abandoned);
            }
            Err(e) => return Err(e),
        };

        let departed: Vec<String> = self.seen.difference(&current).cloned().collect();
        for user in &departed {
            self.seen.remove(user);
        }

        let mut welcomed = Vec::new();
        for user in &current {
            if self.seen.insert(user.clone()) && self.welcome(host, membership, user, &current)? {
                welcomed.push(user.clone());
            }
        }

        debug!(
            connected = current.len(),
            welcomed = welcomed.len(),
            departed = departed.len(),
            "Presence tick"
        );
        Ok(TickOutcome::Completed { welcomed, departed })
    }

    /// Apply a native connect or disconnect; returns whether a welcome was sent
    pub fn handle_event<H, S>(
        &mut self,
        host: &mut H,
        membership: &MembershipManager<S>,
        event: PresenceEvent,
    ) -> Result<bool>
    where
        H: PresenceHost,
        S: GroupStore,
    {
        match event {
            PresenceEvent::Connected(user) => {
                if !self.seen.insert(user.clone()) {
                    return Ok(false);
                }
                let online = self.seen.clone();
                self.welcome(host, membership, &user, &online)
            }
            PresenceEvent::Disconnected(user) => {
                self.seen.remove(&user);
                Ok(false)
            }
        }
    }

    fn welcome<H, S>(
        &self,
        host: &mut H,
        membership: &MembershipManager<S>,
        user: &str,
        online: &BTreeSet<String>,
    ) -> Result<bool>
    where
        H: PresenceHost,
        S: GroupStore,
    {
        let Some(notice) = welcome_notice(membership, user, online) else {
            return Ok(false);
        };
        host.send_message(user, &notice.to_string())?;
        info!(user = %user, role = %notice.role_name, "Welcome sent");
        Ok(true)
    }
}

/// Build the welcome for `user`, if their role is large enough to announce
pub fn welcome_notice<S: GroupStore>(
    membership: &MembershipManager<S>,
    user: &str,
    online: &BTreeSet<String>,
) -> Option<WelcomeNotice> {
    let role = membership.role_of(user)?;
    if role.member_count() <= WELCOME_MIN_EXCLUSIVE {
        return None;
    }
    let members = role
        .members
        .iter()
        .filter(|m| m.as_str() != user)
        .map(|m| (m.clone(), online.contains(m)))
        .collect();
    Some(WelcomeNotice {
        role_name: role.display_name,
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{IdCodec, MemoryGroupStore, RoleRegistry};

    #[derive(Default)]
    struct TestHost {
        connected: BTreeSet<String>,
        sent: Vec<(String, String)>,
        churn: bool,
    }

    impl TestHost {
        fn connect(&mut self, users: &[&str]) {
            self.connected = users.iter().map(|u| u.to_string()).collect();
        }
    }

    impl PresenceHost for TestHost {
        fn connected_users(&mut self) -> Result<BTreeSet<String>> {
            if self.churn {
                return Err(Error::RosterChanged {
                    path: "test".into(),
                });
            }
            Ok(self.connected.clone())
        }

        fn send_message(&mut self, user: &str, text: &str) -> Result<()> {
            self.sent.push((user.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn role_with(members: &[&str]) -> MembershipManager<MemoryGroupStore> {
        let mut mgr =
            MembershipManager::new(RoleRegistry::new(MemoryGroupStore::new(), IdCodec::default()));
        mgr.create_and_join(members[0], "Archer").unwrap();
        let id = mgr.registry().find("Archer").unwrap().id;
        for user in &members[1..] {
            mgr.join(user, &id).unwrap();
        }
        mgr
    }

    #[test]
    fn test_two_members_never_welcomed() {
        let mgr = role_with(&["u1", "u2"]);
        let mut host = TestHost::default();
        let mut tracker = PresenceTracker::new();

        host.connect(&["u1", "u2"]);
        tracker.tick(&mut host, &mgr).unwrap();
        host.connect(&["u2"]);
        tracker.tick(&mut host, &mgr).unwrap();
        host.connect(&["u1", "u2"]);
        tracker.tick(&mut host, &mgr).unwrap();

        assert!(host.sent.is_empty());
    }

    #[test]
    fn test_three_members_welcomed() {
        let mgr = role_with(&["u1", "u2", "u3"]);
        let mut host = TestHost::default();
        let mut tracker = PresenceTracker::new();

        host.connect(&["u1", "u2"]);
        let outcome = tracker.tick(&mut host, &mgr).unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Completed {
                welcomed: vec!["u1".into(), "u2".into()],
                departed: vec![],
            }
        );

        let (to, text) = &host.sent[0];
        assert_eq!(to, "u1");
        assert!(text.starts_with("Welcome! Here are the members of your role: "));
        assert!(text.contains(&Formatting::Green.paint("u2")));
        assert!(text.contains(&Formatting::DarkRed.paint("u3")));
        assert!(!text.contains("u1"));
    }

    #[test]
    fn test_welcome_once_per_connection() {
        let mgr = role_with(&["u1", "u2", "u3"]);
        let mut host = TestHost::default();
        let mut tracker = PresenceTracker::new();

        host.connect(&["u1"]);
        tracker.tick(&mut host, &mgr).unwrap();
        tracker.tick(&mut host, &mgr).unwrap();
        tracker.tick(&mut host, &mgr).unwrap();
        assert_eq!(host.sent.len(), 1);
    }

    #[test]
    fn test_reconnect_welcomes_again() {
        let mgr = role_with(&["u1", "u2", "u3"]);
        let mut host = TestHost::default();
        let mut tracker = PresenceTracker::new();

        host.connect(&["u1"]);
        tracker.tick(&mut host, &mgr).unwrap();

        host.connect(&[]);
        let outcome = tracker.tick(&mut host, &mgr).unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Completed {
                welcomed: vec![],
                departed: vec!["u1".into()],
            }
        );
        assert!(tracker.seen().is_empty());

        host.connect(&["u1"]);
        tracker.tick(&mut host, &mgr).unwrap();
        assert_eq!(host.sent.len(), 2);
    }

    #[test]
    fn test_abandoned_tick_records_nothing() {
        let mgr = role_with(&["u1", "u2", "u3"]);
        let mut host = TestHost::default();
        let mut tracker = PresenceTracker::new();

        host.connect(&["u1"]);
        host.churn = true;
        assert_eq!(tracker.tick(&mut host, &mgr).unwrap(), TickOutcome::Abandoned);
        assert!(tracker.seen().is_empty());
        assert!(host.sent.is_empty());

        host.churn = false;
        tracker.tick(&mut host, &mgr).unwrap();
        assert_eq!(host.sent.len(), 1);
    }

    #[test]
    fn test_user_without_role() {
        let mgr = role_with(&["u1", "u2", "u3"]);
        let mut host = TestHost::default();
        let mut tracker = PresenceTracker::new();

        host.connect(&["stranger"]);
        let outcome = tracker.tick(&mut host, &mgr).unwrap();
        assert!(matches!(outcome, TickOutcome::Completed { ref welcomed, .. } if welcomed.is_empty()));
        assert!(tracker.seen().contains("stranger"));
    }

    #[test]
    fn test_native_events() {
        let mgr = role_with(&["u1", "u2", "u3"]);
        let mut host = TestHost::default();
        let mut tracker = PresenceTracker::new();

        assert!(tracker
            .handle_event(&mut host, &mgr, PresenceEvent::Connected("u2".into()))
            .unwrap());
        assert!(tracker
            .handle_event(&mut host, &mgr, PresenceEvent::Connected("u1".into()))
            .unwrap());
        assert!(!tracker
            .handle_event(&mut host, &mgr, PresenceEvent::Connected("u1".into()))
            .unwrap());

        let (_, text) = &host.sent[1];
        assert!(text.contains(&Formatting::Green.paint("u2")));
        assert!(text.contains(&Formatting::DarkRed.paint("u3")));

        tracker
            .handle_event(&mut host, &mgr, PresenceEvent::Disconnected("u1".into()))
            .unwrap();
        assert!(tracker
            .handle_event(&mut host, &mgr, PresenceEvent::Connected("u1".into()))
            .unwrap());
    }

    #[test]
    fn test_welcome_rendering() {
        let notice = WelcomeNotice {
            role_name: "Archer".into(),
            members: vec![("a".into(), true), ("b".into(), false)],
        };
        assert_eq!(
            notice.to_string(),
            format!(
                "Welcome! Here are the members of your role: {},{}",
                Formatting::Green.paint("a"),
                Formatting::DarkRed.paint("b")
            )
        );
    }
}
