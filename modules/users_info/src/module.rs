use std::sync::Arc;

use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::UsersInfoConfig;
use crate::contract::client::UsersInfoApi;
use crate::domain::service::Service;
use crate::gateways::local::UsersInfoLocalClient;
use crate::infra::storage::InMemoryUsersRepository;

/// Module wiring: store → domain service → REST routes and local client.
#[derive(Clone)]
pub struct UsersInfo {
    service: Arc<Service>,
}

impl UsersInfo {
    pub async fn init(cfg: UsersInfoConfig) -> anyhow::Result<Self> {
        info!("Initializing users_info module");
        debug!("Loaded users_info config: {:?}", cfg);

        let repo = InMemoryUsersRepository::new();
        if cfg.seed_demo_users {
            let seeded = repo.seed_demo_users().await?;
            info!("Seeded {} demo users", seeded.len());
        }

        let service = Service::new(Arc::new(repo));
        Ok(Self {
            service: Arc::new(service),
        })
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client for other modules
    pub fn client(&self) -> Arc<dyn UsersInfoApi> {
        Arc::new(UsersInfoLocalClient::new(self.service.clone()))
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering users_info REST routes");
        routes::register_routes(router, self.service.clone())
    }

    pub fn openapi(&self) -> utoipa::openapi::OpenApi {
        routes::openapi()
    }
}
