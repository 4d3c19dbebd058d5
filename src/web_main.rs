//! Web 服务器主程序入口

use clap::Parser;
use tracing_subscriber::EnvFilter;

use catalog_i18n::env::{EnvConfig, EnvVar};
use catalog_i18n::translation::{self, ConfigManager, TranslationConfig};
use catalog_i18n::web::{WebConfig, WebServer};

/// Catalog I18n Web Server
#[derive(Parser, Debug)]
#[command(name = "catalog-i18n-web", version, about)]
struct Args {
    /// Bind address [default: CATALOG_WEB_BIND_ADDRESS or 127.0.0.1]
    #[arg(short, long)]
    bind: Option<String>,

    /// Port number [default: CATALOG_WEB_PORT or 7090]
    #[arg(short, long)]
    port: Option<u16>,

    /// Translation config file (toml or json)
    #[arg(short, long)]
    config: Option<String>,

    /// Use the in-memory record store instead of MongoDB
    #[arg(long)]
    memory_store: bool,
}

fn init_tracing() {
    let level = catalog_i18n::env::core::LogLevel::get().unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: Option<&str>) -> Result<TranslationConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => ConfigManager::from_file(path)?.into_config(),
        None => translation::load_translation_config(),
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    translation::init();

    let args = Args::parse();

    if let Ok(env_config) = EnvConfig::from_env() {
        env_config.print_summary();
    }

    let translation_config = load_config(args.config.as_deref())?;

    let mut web_config = WebConfig::default();
    if let Some(bind) = args.bind {
        web_config.bind_addr = bind;
    }
    if let Some(port) = args.port {
        web_config.port = port;
    }
    if args.memory_store {
        web_config.mongo_config = None;
    }

    let server = WebServer::new(web_config, translation_config);
    server.start().await?;

    Ok(())
}
