//! Mints a bearer token for local testing against the API.
//!
//! Usage: `cargo run --example generate_token -- <user-id> [email]`

use artisan_quote_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use artisan_quote_backend::util::logger::Logger;
use dotenv::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger = Logger::new()?;
    let _guards = logger.guards;

    match dotenv() {
        Ok(_) => info!("Loaded .env file"),
        Err(e) => warn!("Failed to load .env file: {} (using system env vars)", e),
    }

    let jwt_util = JwtTokenUtilsImpl::from_env().map_err(|e| {
        error!("Failed to create JWT utils: {}", e);
        e
    })?;

    let mut args = std::env::args().skip(1);
    let user_id = args.next().unwrap_or_else(|| Uuid::new_v4().to_string());
    let email = args.next();

    let token = jwt_util.generate_access_token(&user_id, email.as_deref())?;
    let claims = jwt_util.validate_access_token(&token)?;
    info!(user_id = %claims.sub, expires_at = claims.exp, "Token generated");

    println!("{}", token);
    Ok(())
}
