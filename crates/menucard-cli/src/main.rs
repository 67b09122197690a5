//! Menucard CLI - Command-line interface for the Menucard backend.

mod commands;
mod ui;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "menucard")]
#[command(about = "Menucard - cafe menu backend")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind address
        #[arg(long)]
        bind: Option<String>,
    },

    /// Cafe account management (admin commands)
    Admin {
        #[command(subcommand)]
        action: AdminCommands,

        /// Data directory override
        #[arg(long, global = true)]
        data_dir: Option<std::path::PathBuf>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Create a new cafe account
    Create {
        /// Login name for the account
        #[arg(long)]
        login: String,

        /// Password (or use --generate-password)
        #[arg(long)]
        password: Option<String>,

        /// Display name of the cafe
        #[arg(long)]
        name: Option<String>,

        /// Short public code of the cafe
        #[arg(long)]
        code: Option<String>,

        /// Generate a random password
        #[arg(long)]
        generate_password: bool,
    },

    /// List all cafe accounts
    List,

    /// Reset an account's password
    ResetPassword {
        /// Login name of the account
        #[arg(long)]
        login: String,

        /// New password (or use --generate-password)
        #[arg(long)]
        password: Option<String>,

        /// Generate a random password
        #[arg(long)]
        generate_password: bool,
    },

    /// Delete a cafe account
    Delete {
        /// Login name of the account to delete
        #[arg(long)]
        login: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    match cli.command {
        Commands::Serve { port, bind } => {
            commands::run_serve(commands::serve::ServeArgs { port, bind }).await?;
        }

        Commands::Admin { action, data_dir } => {
            let args = commands::admin::AdminArgs {
                action: match action {
                    AdminCommands::Create {
                        login,
                        password,
                        name,
                        code,
                        generate_password,
                    } => commands::admin::AdminAction::Create {
                        login,
                        password,
                        name,
                        code,
                        generate_password,
                    },
                    AdminCommands::List => commands::admin::AdminAction::List,
                    AdminCommands::ResetPassword {
                        login,
                        password,
                        generate_password,
                    } => commands::admin::AdminAction::ResetPassword {
                        login,
                        password,
                        generate_password,
                    },
                    AdminCommands::Delete { login } => {
                        commands::admin::AdminAction::Delete { login }
                    }
                },
                data_dir,
            };
            commands::run_admin(args)?;
        }
    }

    Ok(())
}
