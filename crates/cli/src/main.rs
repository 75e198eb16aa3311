use anyhow::Context;
use clap::{Parser, Subcommand};
use relay::llm::Generator;

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "LINE to Gemini webhook relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Write a default config file if none exists. Secrets are best kept in the environment or a .env file.
    Init {
        /// Config file path (default: RELAY_CONFIG_PATH or ~/.relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the webhook server (GET / health probe, POST /callback for LINE).
    Serve {
        /// Config file path (default: RELAY_CONFIG_PATH or ~/.relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from PORT, config, or 8080)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Send one prompt to the generation model and print the reply.
    Ask {
        /// Config file path (default: RELAY_CONFIG_PATH or ~/.relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Prompt text
        prompt: String,
    },

    /// Print the X-Line-Signature for a payload file, using the configured channel secret.
    Sign {
        /// Config file path (default: RELAY_CONFIG_PATH or ~/.relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// File containing the exact request body
        file: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Version) => {
            println!("relay {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Init { config }) => run_init(config),
        Some(Commands::Serve { config, port }) => run_serve(config, port).await,
        Some(Commands::Ask { config, prompt }) => run_ask(config, prompt).await,
        Some(Commands::Sign { config, file }) => run_sign(config, file),
        None => {
            println!("Run with --help for usage");
            Ok(())
        }
    };
    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(relay::config::default_config_path);
    if relay::config::init_config_file(&path)? {
        println!("wrote default configuration to {}", path.display());
    } else {
        println!("configuration already exists at {}", path.display());
    }
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, _path) = relay::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    log::info!("starting relay on {}:{}", config.server.bind, config.server.port);
    relay::gateway::run_gateway(config).await
}

async fn run_ask(config_path: Option<std::path::PathBuf>, prompt: String) -> anyhow::Result<()> {
    let (config, _path) = relay::config::load_config(config_path)?;
    let api_key = config
        .gemini
        .api_key
        .filter(|k| !k.trim().is_empty())
        .context("GEMINI_API_KEY is not set")?;
    let client = relay::llm::GeminiClient::new(
        api_key,
        Some(config.gemini.model),
        Some(config.gemini.api_base),
    );
    let reply = client.generate(&prompt).await?;
    println!("{}", reply.trim_end());
    Ok(())
}

fn run_sign(config_path: Option<std::path::PathBuf>, file: std::path::PathBuf) -> anyhow::Result<()> {
    let (config, _path) = relay::config::load_config(config_path)?;
    let secret = config
        .line
        .channel_secret
        .filter(|s| !s.trim().is_empty())
        .context("CHANNEL_SECRET is not set")?;
    let body = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
    println!("{}", relay::channels::signature::sign(&secret, &body));
    Ok(())
}
