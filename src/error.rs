//! Error types for simple-roles
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-facing messages for role commands
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for role operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,

    // Storage errors (3xx)
    StoreCorrupt = 300,
    StorageInconsistency = 301,

    // Validation errors (4xx)
    NameTooShort = 400,
    NameTooLong = 401,
    UnknownProperty = 402,
    UnknownColor = 403,
    NotAColor = 404,

    // Not found errors (5xx)
    RoleNotFound = 500,
    NotInRole = 501,
    NotAManagedRole = 502,

    // Conflict errors (6xx)
    AlreadyExists = 600,

    // Presence errors (7xx)
    RosterChanged = 700,
    RosterUnavailable = 701,

    // Internal errors (9xx)
    InternalError = 900,
    MissingIdentity = 901,
}

impl ErrorCode {
    /// Get the string code (e.g., "E400")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (one per error family)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10,
            200..=299 => 20,
            300..=399 => 30,
            400..=499 => 40,
            500..=599 => 50,
            600..=699 => 60,
            700..=799 => 70,
            900..=999 => 90,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Storage Errors
    // ─────────────────────────────────────────────────────────────

    /// The persisted group table could not be decoded
    #[error("Group store {path} is corrupt: {source}")]
    StoreCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The group storage refused a membership change
    #[error("group storage rejected {operation} of {user} on {group_id}")]
    StorageInconsistency {
        operation: &'static str,
        group_id: String,
        user: String,
    },

    // ─────────────────────────────────────────────────────────────
    // Role Errors (user-facing)
    // ─────────────────────────────────────────────────────────────

    #[error("role name is too short")]
    NameTooShort { name: String, min: usize },

    #[error("role name is too long")]
    NameTooLong { name: String, max: usize },

    #[error("unknown property \"{property}\", valid properties are: name, color")]
    UnknownProperty { property: String },

    #[error("unknown color \"{value}\", valid colors are: {}", .options.join(", "))]
    UnknownColor { value: String, options: Vec<&'static str> },

    #[error("\"{value}\" is a formatting code, not a color")]
    NotAColor { value: String },

    #[error("role does not exist, use \"list\" to look for them")]
    RoleNotFound { name: String },

    #[error("you are not in a role")]
    NotInRole { user: String },

    #[error("you are not in a role, you are in a normal team")]
    NotAManagedRole { user: String, group_id: String },

    #[error("role already exists")]
    AlreadyExists { name: String },

    // ─────────────────────────────────────────────────────────────
    // Presence Errors
    // ─────────────────────────────────────────────────────────────

    /// The connected-user set changed while it was being read
    #[error("connected users changed during scan of {path}")]
    RosterChanged { path: PathBuf },

    #[error("connected users unavailable: {0}")]
    RosterUnavailable(String),

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// A command ran without a resolved user identity
    #[error("internal error: no user identity for this session (this is a bug)")]
    MissingIdentity,

    #[error("internal error: {0} (this is a bug)")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::StoreCorrupt { .. } => ErrorCode::StoreCorrupt,
            Error::StorageInconsistency { .. } => ErrorCode::StorageInconsistency,

            Error::NameTooShort { .. } => ErrorCode::NameTooShort,
            Error::NameTooLong { .. } => ErrorCode::NameTooLong,
            Error::UnknownProperty { .. } => ErrorCode::UnknownProperty,
            Error::UnknownColor { .. } => ErrorCode::UnknownColor,
            Error::NotAColor { .. } => ErrorCode::NotAColor,

            Error::RoleNotFound { .. } => ErrorCode::RoleNotFound,
            Error::NotInRole { .. } => ErrorCode::NotInRole,
            Error::NotAManagedRole { .. } => ErrorCode::NotAManagedRole,

            Error::AlreadyExists { .. } => ErrorCode::AlreadyExists,

            Error::RosterChanged { .. } => ErrorCode::RosterChanged,
            Error::RosterUnavailable(_) => ErrorCode::RosterUnavailable,

            Error::MissingIdentity => ErrorCode::MissingIdentity,
            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Errors caused by user input rather than the environment
    ///
    /// These abort the operation before any mutation.
    pub fn is_user_error(&self) -> bool {
        matches!(self.code() as u16, 400..=699)
    }

    /// Check if the error signals a defect rather than bad input
    pub fn is_bug(&self) -> bool {
        matches!(self, Error::MissingIdentity | Error::Internal(_))
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'simple-roles config init' to create a default configuration file.",
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'simple-roles config validate' to see details.",
            ),
            Error::StoreCorrupt { .. } => Some(
                "The group store file is not valid JSON. Restore it from a backup or remove it to start empty.",
            ),
            Error::NameTooShort { .. } | Error::NameTooLong { .. } => {
                Some("Role names must be between 3 and 32 characters long.")
            }
            Error::RoleNotFound { .. } => Some("Run 'simple-roles roles list' to see existing roles."),
            Error::AlreadyExists { .. } => Some("Use 'roles join' to become a member of the existing role."),
            Error::NotInRole { .. } => Some("Use 'roles join' or 'roles create' first."),
            Error::MissingIdentity => Some("Pass --user or set SIMPLE_ROLES_USER."),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!("\x1b[31mError [{}]\x1b[0m: {}\n", self.code().as_str(), self);

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn role_not_found(name: impl Into<String>) -> Self {
        Error::RoleNotFound { name: name.into() }
    }

    pub fn not_in_role(user: impl Into<String>) -> Self {
        Error::NotInRole { user: user.into() }
    }

    pub fn already_exists(name: impl Into<String>) -> Self {
        Error::AlreadyExists { name: name.into() }
    }

    pub fn storage_inconsistency(
        operation: &'static str,
        group_id: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Error::StorageInconsistency {
            operation,
            group_id: group_id.into(),
            user: user.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
