use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::client::Client;

#[derive(Default)]
pub struct ClientDirectory {
    clients: DashMap<Uuid, Client>,
}

impl ClientDirectory {
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
        }
    }

    pub fn register(&self, name: String) -> Result<Client, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("name cannot be empty".to_string()));
        }

        let client = Client {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        };

        self.clients.insert(client.id, client.clone());
        Ok(client)
    }

    pub fn get(&self, id: Uuid) -> Result<Client, AppError> {
        self.clients
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("client {id} not found")))
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.clients.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::ClientDirectory;
    use uuid::Uuid;

    #[test]
    fn register_and_get_round_trip() {
        let directory = ClientDirectory::new();
        let client = directory.register("Ada".to_string()).unwrap();

        let fetched = directory.get(client.id).unwrap();
        assert_eq!(fetched.name, "Ada");
        assert!(directory.contains(client.id));
    }

    #[test]
    fn register_rejects_blank_name() {
        let directory = ClientDirectory::new();
        assert!(directory.register("   ".to_string()).is_err());
    }

    #[test]
    fn get_unknown_client_is_not_found() {
        let directory = ClientDirectory::new();
        assert!(directory.get(Uuid::new_v4()).is_err());
    }
}
