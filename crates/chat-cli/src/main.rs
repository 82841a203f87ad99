use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chat_cli::clipboard::SystemClipboard;
use chat_cli::{logging, views, App, ChatController};
use chat_core::AppConfig;
use chat_responder::SimulatedResponder;
use clap::{Parser, Subcommand};
use colored::Colorize;
use conversation_store::{ConversationStorage, ConversationStore, FileKeyValueStore};

#[derive(Parser)]
#[command(name = "chat-cli")]
#[command(about = "Terminal chat shell with locally persisted conversations")]
#[command(version)]
struct Cli {
    /// Directory conversations are stored in
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Delay before the simulated reply, in milliseconds
    #[arg(long)]
    reply_delay_ms: Option<u64>,

    /// Make every simulated reply fail
    #[arg(long)]
    simulate_failure: bool,

    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive chat (default)
    Chat,
    /// List conversations
    List,
    /// Print a conversation (default: the first)
    Show {
        /// Conversation number as shown by `list`
        index: Option<usize>,
    },
    /// Send a single message to the first conversation and print the reply
    Send {
        /// Message content
        message: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_tracing(cli.debug);

    let mut config = AppConfig::new();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(delay) = cli.reply_delay_ms {
        config.reply_delay_ms = delay;
    }
    if cli.simulate_failure {
        config.simulate_failure = true;
    }
    tracing::debug!("Using config {:?}", config);

    let storage = ConversationStorage::new(
        FileKeyValueStore::new(&config.data_dir),
        config.storage_key.clone(),
    );
    let mut controller = ChatController::new(ConversationStore::new(storage));
    let responder =
        SimulatedResponder::new(config.reply_delay()).failing(config.simulate_failure);
    let mut out = std::io::stdout();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let mut app = App::new(
                controller,
                Arc::new(responder),
                SystemClipboard::default(),
                config.thread_window,
            );
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            app.run(input, &mut out).await?;
        }
        Commands::List => {
            let store = controller.store();
            write!(
                out,
                "{}",
                views::render_conversation_list(store.conversations(), store.active_id())
            )?;
        }
        Commands::Show { index } => {
            let id = controller.id_at(index.unwrap_or(1));
            match id.and_then(|id| controller.store().get(&id)) {
                Some(conversation) => write!(
                    out,
                    "{}",
                    views::render_thread(conversation, config.thread_window)
                )?,
                None => println!("{}", "❌ No such conversation".red()),
            }
        }
        Commands::Send { message } => {
            controller.send(&responder, &message).await?;
            write!(
                out,
                "{}",
                views::render_thread(controller.active(), config.thread_window)
            )?;
        }
    }

    Ok(())
}
