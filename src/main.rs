use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

use truss_chat::ApiVariant;
use truss_chat::core::config::{self, TrussConfig};
use truss_chat::core::identity::{FileIdentity, IdentityProvider, MemoryIdentity};
use truss_chat::tui;

#[derive(Parser)]
#[command(
    name = "truss-chat",
    about = "Describe trusses in plain language and see them in 3D"
)]
struct Args {
    /// Backend endpoint shape
    #[arg(short, long, value_enum)]
    variant: Option<ApiVariant>,

    /// Backend base URL (default http://localhost:5000)
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to truss-chat.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("truss-chat.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("Warning: {e}; using defaults");
        log::warn!("Ignoring config file: {}", e);
        TrussConfig::default()
    });
    let resolved = config::resolve(&file_config, args.variant, args.api_url.as_deref());

    log::info!(
        "truss-chat starting up: backend={} variant={}",
        resolved.base_url,
        resolved.variant.label()
    );

    let identity: Box<dyn IdentityProvider> = match FileIdentity::default_location() {
        Some(file) => Box::new(file),
        None => {
            log::warn!("No home directory; session id will not persist");
            Box::new(MemoryIdentity::generate())
        }
    };

    tui::run(resolved, identity)
}
