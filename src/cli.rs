//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for simple-roles.

use clap::{Parser, Subcommand};

use crate::roles::RoleCommand;

/// simple-roles - self-service roles on top of a group store
///
/// Users create, join, leave and edit their own roles without an
/// administrator. `watch` greets users arriving online with the members of
/// their role.
#[derive(Parser, Debug)]
#[command(name = "simple-roles")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage roles (list, create, join, leave, edit)
    Roles {
        /// Path to configuration file
        #[arg(short, long, env = "SIMPLE_ROLES_CONFIG")]
        config: Option<String>,

        /// User issuing the command
        #[arg(short, long, env = "SIMPLE_ROLES_USER")]
        user: Option<String>,

        #[command(subcommand)]
        subcommand: RolesSubcommand,
    },

    /// Greet users arriving online with the members of their role
    Watch {
        /// Path to configuration file
        #[arg(short, long, env = "SIMPLE_ROLES_CONFIG")]
        config: Option<String>,

        /// Roster file listing connected users (overrides config)
        #[arg(short, long)]
        roster: Option<String>,

        /// Run a single tick and exit
        #[arg(long)]
        once: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version and build information
    Version,
}

/// Role subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RolesSubcommand {
    /// List all roles
    List,

    /// Create a role and join it
    Create {
        /// Role name (3-32 characters)
        name: String,
    },

    /// Join an existing role, leaving your current one
    Join {
        /// Role name
        name: String,
    },

    /// Leave your current role
    Leave,

    /// Edit your current role
    Edit {
        /// Property to change: name or color
        property: String,

        /// New value
        value: String,
    },
}

impl From<RolesSubcommand> for RoleCommand {
    fn from(subcommand: RolesSubcommand) -> Self {
        match subcommand {
            RolesSubcommand::List => RoleCommand::List,
            RolesSubcommand::Create { name } => RoleCommand::Create { name },
            RolesSubcommand::Join { name } => RoleCommand::Join { name },
            RolesSubcommand::Leave => RoleCommand::Leave,
            RolesSubcommand::Edit { property, value } => RoleCommand::Edit { property, value },
        }
    }
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}
