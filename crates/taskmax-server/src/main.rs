//! taskmax Server
//!
//! Runs the web dashboard over the task store, initializes the database,
//! and exposes MAX Bot API operations as CLI subcommands.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use taskmax_core::config::{self, BotConfig};
use taskmax_core::tracing_init::init_tracing;
use taskmax_server::max::{MaxClient, SendMessageOptions};
use taskmax_server::storage::Database;
use taskmax_server::web;

#[derive(Parser, Debug)]
#[command(name = "taskmax-server")]
#[command(version, about = "taskmax - task tracking with a MAX messenger bot")]
struct Args {
    /// Database file path
    #[arg(long, env = "TASKMAX_DB_PATH", global = true)]
    db_path: Option<PathBuf>,

    /// Log level filter (e.g. "info", "debug", "warn").
    #[arg(long, default_value = "info", env = "TASKMAX_LOG_LEVEL", global = true)]
    log_level: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "TASKMAX_LOG_JSON", global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web dashboard
    Serve {
        /// TCP bind address
        #[arg(long, default_value = "127.0.0.1:8080", env = "TASKMAX_ADDR")]
        addr: SocketAddr,
    },

    /// Create the schema and seed the timezone catalog
    InitDb {
        /// Also create the demo user
        #[arg(long)]
        demo: bool,
    },

    /// Call the MAX Bot API (requires MAX_BOT_TOKEN)
    #[command(subcommand)]
    Bot(BotCommand),
}

#[derive(Subcommand, Debug)]
enum BotCommand {
    /// Show the bot identity
    Me,

    /// Send a text message to a chat or user
    Send {
        #[arg(long)]
        chat_id: Option<i64>,
        #[arg(long)]
        user_id: Option<i64>,
        text: String,
    },

    /// Upload a photo and send it to a chat
    SendPhoto {
        #[arg(long)]
        chat_id: i64,
        #[arg(long, default_value = "")]
        caption: String,
        file: PathBuf,
    },

    /// Long-poll for pending updates
    Updates {
        #[arg(long, default_value_t = 100)]
        limit: u32,
        #[arg(long, default_value_t = 30)]
        timeout: u32,
        #[arg(long)]
        marker: Option<i64>,
    },

    /// List current webhook subscriptions
    Subscriptions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(&format!("taskmax_server={}", args.log_level), args.log_json);

    match args.command {
        Command::Serve { addr } => {
            let db = open_database(args.db_path).await?;
            web::serve(addr, db).await?;
        }
        Command::InitDb { demo } => {
            // Migrations run on open.
            let db = open_database(args.db_path).await?;

            let inserted = db.populate_timezones().await?;
            info!(inserted, "timezone catalog populated");

            if demo {
                let user = db.upsert_user(web::DEMO_MAX_ID, "demo_user", "UTC+3").await?;
                info!(max_id = user.max_id, "demo user ready");
            }

            #[allow(clippy::print_stdout)]
            {
                println!("database initialized");
            }
        }
        Command::Bot(cmd) => run_bot_command(cmd).await?,
    }

    Ok(())
}

async fn open_database(cli_path: Option<PathBuf>) -> anyhow::Result<Database> {
    let path = config::resolve_database_path(cli_path)?;
    Ok(Database::open(&path).await?)
}

#[allow(clippy::print_stdout)]
async fn run_bot_command(cmd: BotCommand) -> anyhow::Result<()> {
    // Fail fast before any network call when the token is absent.
    let bot_config = BotConfig::from_env()?;
    let client = MaxClient::new(&bot_config)?;

    match cmd {
        BotCommand::Me => {
            let me = client.get_me().await?;
            println!(
                "{} (@{}) user_id={}",
                me.first_name,
                me.username.as_deref().unwrap_or("-"),
                me.user_id
            );
        }
        BotCommand::Send {
            chat_id,
            user_id,
            text,
        } => {
            let options = SendMessageOptions {
                chat_id,
                user_id,
                ..SendMessageOptions::default()
            };
            let resp = client.send_message(&text, &options).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        BotCommand::SendPhoto {
            chat_id,
            caption,
            file,
        } => {
            let resp = client.send_photo(chat_id, &file, &caption).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        BotCommand::Updates {
            limit,
            timeout,
            marker,
        } => {
            let resp = client.get_updates(limit, timeout, marker, &[]).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        BotCommand::Subscriptions => {
            let resp = client.get_subscriptions().await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
    }

    Ok(())
}
