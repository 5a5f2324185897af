use crate::model::client::Client;
use crate::repository::mongo::{collect, CLIENTS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create(&self, client: Client) -> RepositoryResult<Client>;
    async fn get_for_user(&self, id: ObjectId, user_id: &str) -> RepositoryResult<Client>;
    async fn list_by_user(&self, user_id: &str) -> RepositoryResult<Vec<Client>>;
    async fn update(&self, client: &Client) -> RepositoryResult<()>;
    async fn delete(&self, id: ObjectId, user_id: &str) -> RepositoryResult<()>;
}

pub struct MongoClientRepository {
    collection: Collection<Client>,
}

impl MongoClientRepository {
    pub fn new(db: &Database) -> Self {
        MongoClientRepository {
            collection: db.collection::<Client>(CLIENTS),
        }
    }
}

#[async_trait]
impl ClientRepository for MongoClientRepository {
    async fn create(&self, client: Client) -> RepositoryResult<Client> {
        let mut client = client;
        client.id = Some(ObjectId::new());
        self.collection.insert_one(&client, None).await?;
        Ok(client)
    }

    async fn get_for_user(&self, id: ObjectId, user_id: &str) -> RepositoryResult<Client> {
        self.collection
            .find_one(doc! { "_id": id, "user_id": user_id }, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Client not found for ID: {}", id)))
    }

    async fn list_by_user(&self, user_id: &str) -> RepositoryResult<Vec<Client>> {
        let cursor = self.collection.find(doc! { "user_id": user_id }, None).await?;
        let mut clients = collect(cursor).await?;
        clients.sort_by_key(|c| c.name.to_lowercase());
        Ok(clients)
    }

    async fn update(&self, client: &Client) -> RepositoryResult<()> {
        let id = client
            .id
            .ok_or_else(|| RepositoryError::validation("Client has no id"))?;
        let result = self
            .collection
            .replace_one(doc! { "_id": id, "user_id": &client.user_id }, client, None)
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Client not found for ID: {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: ObjectId, user_id: &str) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id, "user_id": user_id }, None)
            .await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("Client not found for ID: {}", id)));
        }
        Ok(())
    }
}
