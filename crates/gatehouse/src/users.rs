//! In-memory user repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use gatehouse_core::users::{RepositoryError, User, UserRepository};

/// Users held in a `HashMap` behind `Arc<RwLock<_>>`. Nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository holding the demo user `1`.
    pub fn with_demo_data() -> Self {
        let users = [User::new("1", "John Doe")]
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();

        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }

    #[cfg(test)]
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_user(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(id).cloned())
    }
}
