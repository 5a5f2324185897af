use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use tracing::{info, instrument};

use crate::dto::client_dto::ClientRequest;
use crate::model::client::Client;
use crate::repository::client_repo::ClientRepository;
use crate::util::error::ServiceResult;

#[async_trait]
pub trait ClientService: Send + Sync {
    async fn create_client(&self, user_id: &str, req: ClientRequest) -> ServiceResult<Client>;
    async fn get_client(&self, user_id: &str, id: ObjectId) -> ServiceResult<Client>;
    async fn list_clients(&self, user_id: &str) -> ServiceResult<Vec<Client>>;
    async fn update_client(&self, user_id: &str, id: ObjectId, req: ClientRequest) -> ServiceResult<Client>;
    async fn delete_client(&self, user_id: &str, id: ObjectId) -> ServiceResult<()>;
}

pub struct ClientServiceImpl {
    pub repo: Arc<dyn ClientRepository>,
}

impl ClientServiceImpl {
    pub fn new(repo: Arc<dyn ClientRepository>) -> Self {
        ClientServiceImpl { repo }
    }
}

fn apply_request(client: &mut Client, req: ClientRequest) {
    client.name = req.name.trim().to_string();
    client.email = req.email;
    client.phone = req.phone;
    client.address = req.address;
    client.company_name = req.company_name;
    client.notes = req.notes;
}

#[async_trait]
impl ClientService for ClientServiceImpl {
    #[instrument(skip(self, req))]
    async fn create_client(&self, user_id: &str, req: ClientRequest) -> ServiceResult<Client> {
        let now = Utc::now();
        let mut client = Client {
            id: None,
            user_id: user_id.to_string(),
            name: String::new(),
            email: None,
            phone: None,
            address: None,
            company_name: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        apply_request(&mut client, req);
        let created = self.repo.create(client).await?;
        info!("Client created");
        Ok(created)
    }

    async fn get_client(&self, user_id: &str, id: ObjectId) -> ServiceResult<Client> {
        Ok(self.repo.get_for_user(id, user_id).await?)
    }

    async fn list_clients(&self, user_id: &str) -> ServiceResult<Vec<Client>> {
        Ok(self.repo.list_by_user(user_id).await?)
    }

    #[instrument(skip(self, req))]
    async fn update_client(&self, user_id: &str, id: ObjectId, req: ClientRequest) -> ServiceResult<Client> {
        let mut client = self.repo.get_for_user(id, user_id).await?;
        apply_request(&mut client, req);
        client.updated_at = Utc::now();
        self.repo.update(&client).await?;
        Ok(client)
    }

    #[instrument(skip(self))]
    async fn delete_client(&self, user_id: &str, id: ObjectId) -> ServiceResult<()> {
        // Quotes keep the dangling id; their detail view simply shows no client.
        self.repo.delete(id, user_id).await?;
        info!("Client deleted");
        Ok(())
    }
}
