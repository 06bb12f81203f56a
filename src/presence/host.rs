//! Presence host interface and the roster-file host used by `watch`

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::error::{Error, Result};

/// Connection state and message delivery provided by the host
pub trait PresenceHost {
    /// The users connected right now
    ///
    /// Fails with `RosterChanged` when the set mutated mid-scan; callers
    /// abandon the tick and try again on the next one.
    fn connected_users(&mut self) -> Result<BTreeSet<String>>;

    /// Deliver `text` to `user` only
    fn send_message(&mut self, user: &str, text: &str) -> Result<()>;
}

/// A native connect/disconnect notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceEvent {
    Connected(String),
    Disconnected(String),
}

// ─────────────────────────────────────────────────────────────────
// Roster File Host
// ─────────────────────────────────────────────────────────────────

/// Reads the connected set from a roster file and writes messages to `out`
///
/// Roster format: one user per line; blank lines and `#` comments are
/// ignored. A missing file means nobody is connected.
pub struct FileRoster<W> {
    path: PathBuf,
    out: W,
}

impl FileRoster<io::Stdout> {
    pub fn stdout(path: impl Into<PathBuf>) -> Self {
        Self::new(path, io::stdout())
    }
}

impl<W: Write> FileRoster<W> {
    pub fn new(path: impl Into<PathBuf>, out: W) -> Self {
        Self {
            path: path.into(),
            out,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn modified(&self) -> Result<Option<SystemTime>> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.modified().ok()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::RosterUnavailable(format!(
                "{}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl<W: Write> PresenceHost for FileRoster<W> {
    fn connected_users(&mut self) -> Result<BTreeSet<String>> {
        let before = self.modified()?;
        if before.is_none() {
            return Ok(BTreeSet::new());
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::RosterChanged {
                    path: self.path.clone(),
                })
            }
            Err(e) => {
                return Err(Error::RosterUnavailable(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if self.modified()? != before {
            return Err(Error::RosterChanged {
                path: self.path.clone(),
            });
        }

        let users = parse_roster(&content);
        debug!(path = %self.path.display(), connected = users.len(), "Roster read");
        Ok(users)
    }

    fn send_message(&mut self, user: &str, text: &str) -> Result<()> {
        writeln!(self.out, "@{}: {}", user, text)
            .and_then(|_| self.out.flush())
            .map_err(|e| Error::IoWrite {
                path: PathBuf::from("-"),
                source: e,
            })
    }
}

/// Parse roster file content into a set of user ids
pub fn parse_roster(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
