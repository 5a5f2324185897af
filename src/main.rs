use artisan_quote_backend::app::app::App;
use artisan_quote_backend::util::logger::Logger;
use dotenv::dotenv;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables before the logger reads LOG_DIR and RUST_LOG
    let env_loaded = dotenv();

    let logger = Logger::new()?;
    let _guards = logger.guards;

    info!("🚀 Starting artisan quote backend");
    match env_loaded {
        Ok(_) => info!("✅ Successfully loaded .env file"),
        Err(e) => warn!("⚠️ Failed to load .env file: {} (using system env vars)", e),
    }

    let app = App::new().await.map_err(|e| {
        error!("Failed to initialize application: {}", e);
        e
    })?;
    app.start().await
}
