use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use minichat::config::{parse_policy, Config};
use minichat::resolver::direct::DEFAULT_API_BASE;
use minichat::settings::DEFAULT_MODEL;
use minichat::typewriter::{DEFAULT_CHUNK, DEFAULT_DELAY};
use minichat::{
    logging, run_turn, ChatRole, ChatSession, DirectResolver, FallbackGenerator, FileStorage,
    HistoryStore, Language, Policy, ProxyResolver, ReplyResolver, Settings, TurnEvent, Typewriter,
};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "minichat", version)]
#[command(about = "Minimal terminal chat with proxy or direct AI replies and an offline fallback")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Reply policy: proxy or direct
    #[arg(long, global = true)]
    policy: Option<String>,

    /// UI language: en or zh
    #[arg(long, global = true)]
    lang: Option<String>,

    /// Base URL of the chat/search/weather proxy
    #[arg(long, global = true, env = "MINICHAT_PROXY_BASE")]
    proxy_base: Option<String>,

    /// Base URL of the chat-completions API (direct policy)
    #[arg(long, global = true, env = "MINICHAT_API_BASE")]
    api_base: Option<String>,

    /// Storage file for history and settings
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// Log file (filter with MINICHAT_LOG)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat screen (default)
    Chat,
    /// Send one message and print the reply
    Ask {
        /// Message text
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print the stored conversation
    History,
    /// Show or change the stored API key and model
    Settings {
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        model: Option<String>,
        /// Also write --lang, --policy, --proxy-base and --api-base to the config file
        #[arg(long)]
        save_config: bool,
    },
}

/// Everything resolved from flags, config file and storage
struct Runtime {
    language: Language,
    policy: Policy,
    storage: FileStorage,
    model: String,
    resolver: Arc<dyn ReplyResolver>,
    typewriter: Typewriter,
}

impl Runtime {
    fn build(cli: &Cli, config: &Config) -> Result<Self> {
        let language = match &cli.lang {
            Some(s) => Language::from_str(s).ok_or_else(|| anyhow!("unknown language '{}'", s))?,
            None => config.language()?,
        };
        let policy = match &cli.policy {
            Some(s) => parse_policy(s)?,
            None => config.policy()?,
        };

        let storage_path = cli
            .storage
            .clone()
            .or_else(|| config.storage_path.clone())
            .unwrap_or_else(FileStorage::default_path);
        let storage = FileStorage::new(storage_path);

        let default_model = config.default_model.as_deref().unwrap_or(DEFAULT_MODEL);
        let settings = Settings::load_or(&storage, default_model);

        let system_prompt = language.strings().system_prompt;
        let resolver: Arc<dyn ReplyResolver> = match policy {
            Policy::Direct => {
                // Environment first, then the stored key
                let api_key = std::env::var("OPENAI_API_KEY").ok().or(settings.api_key.clone());
                let api_base = cli
                    .api_base
                    .as_deref()
                    .or(config.api_base.as_deref())
                    .unwrap_or(DEFAULT_API_BASE);
                let resolver = DirectResolver::new(api_base, api_key, system_prompt);
                if !resolver.has_key() {
                    warn!("no API key set; replies will use the local fallback");
                }
                Arc::new(resolver)
            }
            Policy::Proxy => {
                let base = cli.proxy_base.as_deref().or(config.proxy_base.as_deref());
                let resolver = ProxyResolver::new(base, system_prompt);
                match resolver.base() {
                    Some(base) => info!(base, "using proxy"),
                    None => warn!("no proxy base set; replies will use the local fallback"),
                }
                Arc::new(resolver)
            }
        };

        let typewriter = Typewriter::new(
            config.typewriter_chunk.unwrap_or(DEFAULT_CHUNK),
            config
                .typewriter_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_DELAY),
        );

        Ok(Self {
            language,
            policy,
            storage,
            model: settings.model,
            resolver,
            typewriter,
        })
    }

    fn open_session(&self) -> ChatSession {
        ChatSession::open(HistoryStore::new(self.storage.clone()), self.language)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    if let Err(e) = logging::init(&log_path) {
        eprintln!("warning: logging disabled: {:#}", e);
    }

    let config = Config::load()?;
    let runtime = Runtime::build(&cli, &config)?;
    info!(
        policy = runtime.policy.as_str(),
        language = runtime.language.as_str(),
        storage = %runtime.storage.path().display(),
        "starting"
    );

    match cli.command.take() {
        None | Some(Commands::Chat) => run_chat(runtime).await?,
        Some(Commands::Ask { text }) => ask(runtime, &text.join(" ")).await?,
        Some(Commands::History) => print_history(&runtime),
        Some(Commands::Settings {
            api_key,
            model,
            save_config,
        }) => {
            if save_config {
                save_config_file(&cli, config)?;
            }
            update_settings(runtime, api_key, model)?
        }
    }

    Ok(())
}

async fn run_chat(runtime: Runtime) -> Result<()> {
    let session = runtime.open_session();
    let mut events = EventHandler::new();
    let mut app = App::new(
        session,
        runtime.policy,
        runtime.model,
        runtime.resolver,
        runtime.typewriter,
        events.sender(),
    );

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result: Result<()> = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event),
                None => break,
            }
        }
        Ok(())
    }
    .await;

    tui::restore()?;
    result
}

async fn ask(runtime: Runtime, text: &str) -> Result<()> {
    let mut session = runtime.open_session();
    let Some(pending) = session.submit(text, &runtime.model) else {
        return Err(anyhow!("nothing to send"));
    };

    let mut fallback = FallbackGenerator::new(runtime.language);
    let fallback_text = fallback.generate(&pending.request.text);
    let label = runtime.language.strings().ai_label;

    print!("{}: ", label);
    std::io::stdout().flush()?;

    run_turn(
        pending,
        runtime.resolver.as_ref(),
        fallback_text,
        runtime.typewriter,
        |event| {
            match &event {
                TurnEvent::Failed { reason, .. } => {
                    eprintln!("({}: {})", runtime.language.strings().error_label, reason);
                }
                TurnEvent::Chunk { text, .. } => {
                    print!("{}", text);
                    let _ = std::io::stdout().flush();
                }
                TurnEvent::Finished { .. } => println!(),
                TurnEvent::Settled { .. } => {}
            }
            session.apply(event);
        },
    )
    .await;

    Ok(())
}

fn print_history(runtime: &Runtime) {
    let strings = runtime.language.strings();
    let history = HistoryStore::new(runtime.storage.clone()).load();
    if history.is_empty() {
        println!("(no history)");
        return;
    }

    for message in history {
        let label = match message.role {
            ChatRole::User => strings.user_label,
            ChatRole::Assistant => strings.ai_label,
        };
        println!("{}: {}\n", label, message.content);
    }
}

/// Fold the connection flags into the config file
fn save_config_file(cli: &Cli, mut config: Config) -> Result<()> {
    if let Some(lang) = &cli.lang {
        config.language = Some(lang.clone());
    }
    if let Some(policy) = &cli.policy {
        config.policy = Some(policy.clone());
    }
    if let Some(base) = &cli.proxy_base {
        config.proxy_base = Some(base.clone());
    }
    if let Some(base) = &cli.api_base {
        config.api_base = Some(base.clone());
    }
    config.save()?;
    println!("Config saved to {}", Config::get_config_path()?.display());
    Ok(())
}

fn update_settings(runtime: Runtime, api_key: Option<String>, model: Option<String>) -> Result<()> {
    let mut storage = runtime.storage;
    let mut settings = Settings::load(&storage);

    if api_key.is_some() || model.is_some() {
        if let Some(key) = api_key {
            settings.api_key = Some(key);
        }
        if let Some(model) = model {
            settings.model = model;
        }
        settings
            .try_save(&mut storage)
            .with_context(|| format!("saving settings to {}", storage.path().display()))?;
        println!("Settings saved to {}", storage.path().display());
    }

    println!(
        "api key: {}",
        settings.masked_key().unwrap_or_else(|| "(not set)".to_string())
    );
    println!("model:   {}", settings.model);
    Ok(())
}
