use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use flatastic::cli::shopping::ShoppingCommand;
use flatastic::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Poll once and display flatmates, chores and household sensors
    Status {
        /// Print entity states as JSON
        #[arg(long)]
        json: bool,
    },
    /// Poll repeatedly and display the status after each refresh
    Watch,
    /// Manage the shared shopping list
    #[command(subcommand)]
    Shopping(ShoppingCommands),
}

#[derive(Subcommand)]
enum ShoppingCommands {
    /// Show the shopping list
    List,
    /// Add an item
    Add { name: String },
    /// Toggle the bought flag of an item
    Toggle { id: String },
    /// Delete one or more items
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

impl From<Commands> for flatastic::AppCommand {
    fn from(cmd: Commands) -> flatastic::AppCommand {
        match cmd {
            Commands::Status { json } => flatastic::AppCommand::Status { json },
            Commands::Watch => flatastic::AppCommand::Watch,
            Commands::Shopping(shopping) => flatastic::AppCommand::Shopping(shopping.into()),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

impl From<ShoppingCommands> for ShoppingCommand {
    fn from(cmd: ShoppingCommands) -> ShoppingCommand {
        match cmd {
            ShoppingCommands::List => ShoppingCommand::List,
            ShoppingCommands::Add { name } => ShoppingCommand::Add { name },
            ShoppingCommands::Toggle { id } => ShoppingCommand::Toggle { id },
            ShoppingCommands::Delete { ids } => ShoppingCommand::Delete { ids },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => flatastic::cli::setup::setup_at_path(path),
            None => flatastic::cli::setup::setup(),
        },
        Some(cmd) => flatastic::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
