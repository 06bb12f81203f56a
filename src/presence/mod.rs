//! Presence tracking
//!
//! Detects users arriving online and sends each one a welcome listing the
//! other members of their role. Connection state comes from a
//! `PresenceHost`; the tracker only reads role state.

pub mod host;
pub mod tracker;

pub use host::{parse_roster, FileRoster, PresenceEvent, PresenceHost};
pub use tracker::{welcome_notice, PresenceTracker, TickOutcome, WelcomeNotice};
