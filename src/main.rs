use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dragon_bot::application::commands::register_all;
use dragon_bot::application::context::AppContext;
use dragon_bot::application::errors::BotError;
use dragon_bot::application::messaging::CommandDispatcher;
use dragon_bot::application::services::MessageService;
use dragon_bot::domain::entities::{ChannelId, ScopeId};
use dragon_bot::domain::traits::{Bot, Persistence};
use dragon_bot::infrastructure::adapters::ConsoleAdapter;
use dragon_bot::infrastructure::config::{Config, ConfigOverrides, StorageTarget};
use dragon_bot::infrastructure::database::Database;
use dragon_bot::infrastructure::storage::FileBackend;

#[derive(Parser)]
#[command(name = "dragon-bot")]
#[command(about = "A chat bot with emotes, keyword reactions and lookups", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    /// Log filter, e.g. `info` or `dragon_bot=debug`
    #[arg(long, env = "DRAGONBOT_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Guild id the console session speaks in
    #[arg(long, env = "DRAGONBOT_GUILD", default_value_t = 1, global = true)]
    guild: u64,

    /// Channel id the console session speaks in
    #[arg(long, env = "DRAGONBOT_CHANNEL", default_value_t = 1, global = true)]
    channel: u64,

    #[command(flatten)]
    overrides: OverrideArgs,
}

#[derive(Args)]
struct OverrideArgs {
    /// Bot token (overrides config)
    #[arg(short, long, env = "DRAGONBOT_TOKEN", global = true)]
    token: Option<String>,

    /// User id of the bot owner
    #[arg(long, env = "DRAGONBOT_OWNER_ID", global = true)]
    owner_id: Option<u64>,

    /// Refuse commands that change stored data
    #[arg(long, env = "DRAGONBOT_READ_ONLY", global = true)]
    read_only: bool,

    /// Directory for JSON stores
    #[arg(long, env = "DRAGONBOT_STORAGE_DIR", global = true)]
    storage_dir: Option<PathBuf>,

    /// SQLite database file, instead of a storage directory
    #[arg(long, env = "DRAGONBOT_DATABASE", global = true)]
    database: Option<PathBuf>,

    #[arg(long, env = "DRAGONBOT_COMMAND_PREFIX", global = true)]
    command_prefix: Option<String>,

    #[arg(long, env = "DRAGONBOT_EMOTE_PREFIX", global = true)]
    emote_prefix: Option<String>,

    /// Reply to unknown commands instead of ignoring them
    #[arg(long = "unknown-cmd-msg", env = "DRAGONBOT_UNKNOWN_CMD_MSG", global = true)]
    unknown_command_message: bool,

    /// JSON file of insults, optionally rot13-encoded
    #[arg(long, env = "DRAGONBOT_INSULTS_FILE", global = true)]
    insults_file: Option<PathBuf>,

    /// Seconds between insult server requests
    #[arg(long = "insult-rate-limit-secs", env = "DRAGONBOT_INSULT_RATE_LIMIT_SECS", global = true)]
    insult_rate_limit: Option<u64>,

    #[arg(long, env = "DRAGONBOT_RAPIDAPI_KEY", global = true)]
    rapidapi_key: Option<String>,

    #[arg(long, env = "DRAGONBOT_RAPIDAPI_HOST", global = true)]
    rapidapi_host: Option<String>,

    #[arg(long, env = "DRAGONBOT_WOLFRAM_APP_ID", global = true)]
    wolfram_app_id: Option<String>,
}

impl From<OverrideArgs> for ConfigOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            token: args.token,
            owner_id: args.owner_id,
            read_only: args.read_only,
            storage_dir: args.storage_dir,
            database: args.database,
            command_prefix: args.command_prefix,
            emote_prefix: args.emote_prefix,
            unknown_command_message: args.unknown_command_message,
            insults_file: args.insults_file,
            insult_rate_limit_seconds: args.insult_rate_limit,
            rapidapi_key: args.rapidapi_key,
            rapidapi_host: args.rapidapi_host,
            wolfram_app_id: args.wolfram_app_id,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot on the console transport
    Run,
    /// Show version
    Version,
    /// Print a default config
    InitConfig,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    let result = match cli.command {
        Commands::Run => run_bot(
            &cli.config,
            cli.overrides.into(),
            ScopeId(cli.guild),
            ChannelId(cli.channel),
        ),
        Commands::Version => {
            println!("dragon-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(path: &Path, overrides: ConfigOverrides) -> Result<Config, BotError> {
    let mut config = if path.exists() {
        Config::load(path)?
    } else {
        tracing::info!("No config at {}, using defaults", path.display());
        Config::default()
    };
    config.apply(overrides)?;
    config.validate()?;
    Ok(config)
}

async fn open_backend(config: &Config) -> Result<Arc<dyn Persistence>, BotError> {
    match config.storage_target()? {
        StorageTarget::Directory(dir) => {
            let backend = FileBackend::new(dir);
            backend.init().await?;
            Ok(Arc::new(backend))
        }
        StorageTarget::Database(path) => {
            tracing::info!("Opening database {}", path.display());
            Ok(Arc::new(Database::open(path)?))
        }
    }
}

fn run_bot(config_path: &Path, overrides: ConfigOverrides, guild: ScopeId, channel: ChannelId) -> Result<(), BotError> {
    let config = load_config(config_path, overrides)?;
    let owner = config.owner_id()?;
    tracing::info!("Starting {} (read only: {})", config.bot.name, config.bot.read_only);

    let rt = tokio::runtime::Runtime::new().map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;
    rt.block_on(async {
        let backend = open_backend(&config).await?;
        let adapter = Arc::new(ConsoleAdapter::new(config.bot.name.clone(), guild, channel));

        let mut dispatcher = CommandDispatcher::new(config.bot.read_only);
        register_all(&mut dispatcher, owner, &config.bot.command_prefix)?;

        let ctx = AppContext::new(config, adapter.clone(), backend)?;
        let service = MessageService::new(ctx, dispatcher);

        adapter.start().await?;
        service.add_scope(adapter.guild()).await?;

        let session = adapter.run(&service, owner).await;
        if let Err(e) = service.context().save_all().await {
            tracing::error!("Failed to save stores on exit: {}", e);
        }
        session
    })
}

fn init_config() -> Result<(), BotError> {
    let mut config = Config::default();
    config.storage.directory = Some(PathBuf::from("data"));
    println!("{}", config.to_yaml()?);
    println!("# Set owner-id, then save this to config.yaml and adjust as needed.");
    Ok(())
}
