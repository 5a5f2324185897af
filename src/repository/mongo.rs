use bson::{doc, Document};
use futures::stream::StreamExt;
use mongodb::options::{ClientOptions, Credential, IndexOptions, ResolverConfig};
use mongodb::{Client, Cursor, Database, IndexModel};
use serde::de::DeserializeOwned;
use tracing::{error, info, instrument};

use crate::config::mongo_conf::MongoConfig;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

pub const QUOTES: &str = "quotes";
pub const QUOTE_FILES: &str = "quote_files";
pub const QUOTE_SIGNATURES: &str = "quote_signatures";
pub const FINANCIAL_CONFIGS: &str = "quote_financial_configs";
pub const QUOTE_EVENTS: &str = "quote_events";
pub const QUOTE_SHARES: &str = "quote_shares";
pub const ACCESS_LOGS: &str = "quote_access_logs";
pub const COMPANY_PROFILES: &str = "company_profiles";
pub const CLIENTS: &str = "clients";
pub const FOLLOW_UPS: &str = "quote_follow_ups";
pub const QUOTE_COUNTERS: &str = "quote_counters";

/// Opens the shared client. Every repository borrows collections from the
/// returned handle, so the pool is shared.
#[instrument(skip(config), fields(database = %config.database))]
pub async fn connect_database(config: &MongoConfig) -> RepositoryResult<Database> {
    let mut client_options = ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare())
        .await
        .map_err(|e| {
            error!("Invalid MongoDB URI: {}", e);
            RepositoryError::connection(format!("Invalid MongoDB URI: {}", e))
        })?;
    client_options.app_name = Some("ArtisanQuoteBackend".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        client_options.credential = Some(Credential::builder()
            .username(username.clone())
            .password(password.clone())
            .build());
    }

    let client = Client::with_options(client_options)?;
    let db = client.database(&config.database);
    db.run_command(doc! { "ping": 1 }, None).await.map_err(|e| {
        error!("MongoDB ping failed: {}", e);
        RepositoryError::connection(format!("MongoDB ping failed: {}", e))
    })?;

    info!("Connected to MongoDB");
    Ok(db)
}

/// Unique indexes backing the one-per-owner invariants.
pub async fn ensure_indexes(db: &Database) -> RepositoryResult<()> {
    let unique = |keys: Document| {
        IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build()
    };
    let plain = |keys: Document| IndexModel::builder().keys(keys).build();

    let specs = [
        (COMPANY_PROFILES, unique(doc! { "user_id": 1 })),
        (FINANCIAL_CONFIGS, unique(doc! { "quote_id": 1 })),
        (QUOTE_SHARES, unique(doc! { "token": 1 })),
        (QUOTE_SIGNATURES, unique(doc! { "quote_id": 1, "signer_kind": 1 })),
        (QUOTES, plain(doc! { "user_id": 1, "status": 1 })),
        (FOLLOW_UPS, plain(doc! { "status": 1, "quote_id": 1 })),
        (QUOTE_EVENTS, plain(doc! { "quote_id": 1, "event_type": 1 })),
        (CLIENTS, plain(doc! { "user_id": 1 })),
    ];

    for (collection, model) in specs {
        db.collection::<Document>(collection)
            .create_index(model, None)
            .await
            .map_err(|e| {
                error!("Failed to create index on {}: {}", collection, e);
                RepositoryError::from(e)
            })?;
    }
    info!("MongoDB indexes ensured");
    Ok(())
}

pub async fn collect<T>(mut cursor: Cursor<T>) -> RepositoryResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut items = Vec::new();
    while let Some(item) = cursor.next().await {
        items.push(item.map_err(|e| {
            error!("Failed to deserialize document: {}", e);
            RepositoryError::serialization(format!("Failed to deserialize document: {}", e))
        })?);
    }
    Ok(items)
}
