//! recstorectl: Command-line interface for the recstore record store.
//!
//! Opens (and if needed creates or migrates) a SQLite database, then runs one
//! users or schema command against it.
//!
//! # Usage
//!
//! ```bash
//! recstorectl --db-path ./data/users.db users insert u1 Ann 30
//! recstorectl --output json users list
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use recstore::config::Config;
use recstore::observability::tracing::init_tracing;

/// Command-line interface for the recstore record store.
#[derive(Parser)]
#[command(name = "recstorectl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Manage cached user records
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Inspect or apply the schema version
    Schema {
        #[command(subcommand)]
        action: SchemaAction,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// Insert a user; fails if the id already exists
    Insert {
        /// User id (primary key)
        id: String,
        /// Display name
        name: String,
        /// Age, stored verbatim as text
        age: String,
    },
    /// Show the user with the given id
    Get {
        /// User id
        id: String,
    },
    /// List all users
    List,
    /// Delete users whose id matches a LIKE pattern (`%` and `_` are wildcards)
    Delete {
        /// Id or pattern
        key: String,
    },
    /// Delete by integer id (not supported by the users table)
    DeleteId {
        /// Integer id
        id: i64,
    },
}

#[derive(Subcommand)]
enum SchemaAction {
    /// Show the stored and target schema versions without migrating
    Version,
    /// Bring the users table to the target version
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.config.log_level);

    match cli.command {
        Commands::Users { action } => match action {
            UsersAction::Insert { id, name, age } => {
                commands::users::insert(&cli.config, id, name, age, cli.output).await?;
            }
            UsersAction::Get { id } => commands::users::get(&cli.config, id, cli.output).await?,
            UsersAction::List => commands::users::list(&cli.config, cli.output).await?,
            UsersAction::Delete { key } => {
                commands::users::delete(&cli.config, key, cli.output).await?;
            }
            UsersAction::DeleteId { id } => {
                commands::users::delete_id(&cli.config, id, cli.output).await?;
            }
        },
        Commands::Schema { action } => match action {
            SchemaAction::Version => commands::schema::version(&cli.config, cli.output)?,
            SchemaAction::Migrate => commands::schema::migrate(&cli.config, cli.output)?,
        },
    }

    Ok(())
}
