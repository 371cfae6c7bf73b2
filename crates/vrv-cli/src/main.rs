use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use crate::commands::CommandContext;
use anyhow::Result;
use vrv_access::AccessConfig;

/// CLI for the VRV access control gate
#[derive(Parser, Debug)]
#[command(name = "vrv", about = "VRV Role-Based Access Control")]
pub struct Cli {
    /// Path to configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Data directory location (overrides $VRV_DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for the user directory
#[derive(Subcommand, Debug)]
#[command(about = "Browse the user directory")]
pub enum UserCommands {
    /// List all users
    List,
    /// Show a single user by ID
    Show { id: String },
}

/// Subcommands for directory roles
#[derive(Subcommand, Debug)]
#[command(about = "Browse directory roles")]
pub enum RoleCommands {
    /// List all roles and their permissions
    List,
}

/// Subcommands for departments
#[derive(Subcommand, Debug)]
#[command(about = "Browse departments")]
pub enum DepartmentCommands {
    /// List departments, optionally filtered
    List {
        /// Match on name, head or location (case-insensitive)
        #[arg(long)]
        search: Option<String>,
        /// Active or Inactive
        #[arg(long)]
        status: Option<String>,
        /// Location substring
        #[arg(long)]
        location: Option<String>,
    },
}

/// Subcommands for configuration inspection
#[derive(Subcommand, Debug)]
#[command(about = "Inspect or write configuration")]
pub enum ConfigCommands {
    /// Show current effective configuration
    Show,
    /// Write the effective configuration to a TOML file
    Init { path: PathBuf },
}

/// Top-level commands for vrv
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and persist the session
    Login { email: String, password: String },

    /// Sign out; safe to run when not signed in
    Logout,

    /// Show the signed-in principal
    Whoami,

    /// Decide a navigation to a dashboard path, e.g. /roles
    Guard {
        path: String,
        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the sidebar for the signed-in role
    Nav,

    /// Show the route policy table
    Policy,

    /// User directory
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Directory roles
    Roles {
        #[command(subcommand)]
        command: RoleCommands,
    },

    /// Departments
    Departments {
        #[command(subcommand)]
        command: DepartmentCommands,
    },

    /// Inspect or write configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = AccessConfig::resolve_config(cli.config, cli.data_dir)?;

    // Create command context
    let ctx = CommandContext::new(config)?;

    // Dispatch commands
    match cli.command {
        Commands::Login { email, password } => {
            commands::session::login(&ctx, &email, &password).await?;
        }
        Commands::Logout => {
            commands::session::logout(&ctx)?;
        }
        Commands::Whoami => {
            commands::session::whoami(&ctx)?;
        }
        Commands::Guard { path, json } => {
            commands::session::guard(&ctx, &path, json)?;
        }
        Commands::Nav => {
            commands::session::show_navigation(&ctx)?;
        }
        Commands::Policy => {
            commands::session::show_policy(&ctx)?;
        }
        Commands::Users { command } => {
            commands::directory::handle_user_command(&ctx, command).await?;
        }
        Commands::Roles { command } => {
            commands::directory::handle_role_command(&ctx, command).await?;
        }
        Commands::Departments { command } => {
            commands::directory::handle_department_command(&ctx, command).await?;
        }
        Commands::Config { command } => {
            commands::config::handle_config_command(&ctx, command)?;
        }
    }

    Ok(())
}
