use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::{
    AppConfig, DraftConfig, EmailConfig, FollowUpConfig, MinioConfig, MongoConfig, QuoteConfig,
    RedisConfig, ShareConfig,
};
use crate::handler::health_handler::health_handler;
use crate::middlewares::auth_middleware::AuthState;
use crate::repository::draft_repo::{DraftRepository, RedisDraftRepository};
use crate::repository::mongo::{connect_database, ensure_indexes};
use crate::repository::Repositories;
use crate::router::client_router::client_router;
use crate::router::company_router::company_router;
use crate::router::draft_router::draft_router;
use crate::router::follow_up_router::follow_up_router;
use crate::router::quote_router::quote_router;
use crate::router::share_router::share_router;
use crate::service::client_service::{ClientService, ClientServiceImpl};
use crate::service::company_service::{CompanyService, CompanyServiceImpl};
use crate::service::draft_service::{DraftService, DraftServiceImpl};
use crate::service::follow_up_service::{FollowUpCoordinator, FollowUpCoordinatorImpl};
use crate::service::notification_service::{EmailQuoteNotifier, QuoteNotifier};
use crate::service::quote_service::{QuoteService, QuoteServiceImpl};
use crate::service::scheduler::FollowUpScheduler;
use crate::service::share_service::{ShareService, ShareServiceImpl};
use crate::util::email::{EmailSender, SmtpEmailService};
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use crate::util::minio::{MinioService, ObjectStorage};
use crate::util::redis::{RedisService, RedisServiceTrait};

pub type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Settings consumed by the service layer
#[derive(Debug, Clone, Default)]
pub struct ServiceSettings {
    pub quote: QuoteConfig,
    pub minio: MinioConfig,
    pub share: ShareConfig,
    pub follow_up: FollowUpConfig,
    pub draft: DraftConfig,
}

impl ServiceSettings {
    pub fn from_env() -> AppResult<Self> {
        Ok(ServiceSettings {
            quote: QuoteConfig::from_env()?,
            minio: MinioConfig::from_env()?,
            share: ShareConfig::from_env()?,
            follow_up: FollowUpConfig::from_env()?,
            draft: DraftConfig::from_env()?,
        })
    }
}

/// Every service behind the HTTP API, wired once and shared by the routers
#[derive(Clone)]
pub struct AppServices {
    pub quotes: Arc<dyn QuoteService>,
    pub shares: Arc<dyn ShareService>,
    pub companies: Arc<dyn CompanyService>,
    pub clients: Arc<dyn ClientService>,
    pub drafts: Arc<dyn DraftService>,
    pub coordinator: Arc<dyn FollowUpCoordinator>,
}

impl AppServices {
    pub fn new(
        repos: Repositories,
        storage: Arc<dyn ObjectStorage>,
        email_sender: Arc<dyn EmailSender>,
        draft_repo: Arc<dyn DraftRepository>,
        settings: &ServiceSettings,
    ) -> Self {
        let notifier: Arc<dyn QuoteNotifier> = Arc::new(EmailQuoteNotifier::new(
            email_sender,
            repos.companies.clone(),
            repos.clients.clone(),
            repos.shares.clone(),
            settings.share.clone(),
        ));
        let coordinator: Arc<dyn FollowUpCoordinator> = Arc::new(FollowUpCoordinatorImpl::new(
            repos.quotes.clone(),
            repos.follow_ups.clone(),
            repos.events.clone(),
            notifier.clone(),
            settings.follow_up.clone(),
        ));
        let shares: Arc<dyn ShareService> = Arc::new(ShareServiceImpl::new(
            repos.clone(),
            storage.clone(),
            coordinator.clone(),
            settings.share.clone(),
            settings.quote.clone(),
            settings.minio.clone(),
        ));
        let quotes: Arc<dyn QuoteService> = Arc::new(QuoteServiceImpl::new(
            repos.clone(),
            storage.clone(),
            coordinator.clone(),
            notifier,
            shares.clone(),
            settings.quote.clone(),
            settings.minio.clone(),
        ));
        let companies: Arc<dyn CompanyService> = Arc::new(CompanyServiceImpl::new(
            repos.companies.clone(),
            storage,
            settings.minio.clone(),
            settings.quote.clone(),
        ));
        let clients: Arc<dyn ClientService> = Arc::new(ClientServiceImpl::new(repos.clients.clone()));
        let drafts: Arc<dyn DraftService> =
            Arc::new(DraftServiceImpl::new(draft_repo, settings.draft.clone()));

        AppServices {
            quotes,
            shares,
            companies,
            clients,
            drafts,
            coordinator,
        }
    }
}

pub fn create_router(services: &AppServices, auth_state: Arc<AuthState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .merge(quote_router(services.quotes.clone(), auth_state.clone()))
        .merge(share_router(services.shares.clone(), auth_state.clone()))
        .merge(company_router(services.companies.clone(), auth_state.clone()))
        .merge(client_router(services.clients.clone(), auth_state.clone()))
        .merge(draft_router(services.drafts.clone(), auth_state.clone()))
        .merge(follow_up_router(services.coordinator.clone(), auth_state))
        .route("/health", get(health_handler))
        // Multipart framing on top of the largest accepted file
        .layer(DefaultBodyLimit::max(max_upload_bytes + 64 * 1024))
}

pub struct App {
    pub config: AppConfig,
    pub router: Router,
    pub services: AppServices,
    pub settings: ServiceSettings,
}

impl App {
    pub async fn new() -> AppResult<Self> {
        let config = AppConfig::from_env();
        let settings = ServiceSettings::from_env()?;

        let db = connect_database(&MongoConfig::from_env()?).await?;
        ensure_indexes(&db).await?;
        let repos = Repositories::mongo(&db);

        let storage: Arc<dyn ObjectStorage> = Arc::new(MinioService::new(settings.minio.clone()).await?);
        let email_sender: Arc<dyn EmailSender> = Arc::new(SmtpEmailService::new(EmailConfig::from_env()?)?);
        let redis: Arc<dyn RedisServiceTrait> = Arc::new(RedisService::new(RedisConfig::from_env()?).await?);
        let draft_repo: Arc<dyn DraftRepository> =
            Arc::new(RedisDraftRepository::new(settings.draft.clone(), redis));

        let jwt_utils: Arc<dyn JwtTokenUtils> = Arc::new(JwtTokenUtilsImpl::from_env()?);
        let auth_state = Arc::new(AuthState::new(jwt_utils));

        let services = AppServices::new(repos, storage, email_sender, draft_repo, &settings);
        let router = create_router(&services, auth_state, settings.quote.max_upload_bytes);

        Ok(App {
            config,
            router,
            services,
            settings,
        })
    }

    /// Spawns the follow-up scheduler and serves until the listener fails
    pub async fn start(self) -> AppResult<()> {
        let scheduler: Option<JoinHandle<()>> =
            FollowUpScheduler::spawn(self.services.coordinator.clone(), &self.settings.follow_up);

        let addr = self.config.socket_addr()?;
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let served = axum::serve(listener, self.router).await;

        if let Some(handle) = scheduler {
            handle.abort();
        }
        served?;
        Ok(())
    }
}
