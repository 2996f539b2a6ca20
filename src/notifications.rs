use crate::error::{KinoError, Result};
use crate::observability::metrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNotification {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
}

/// Bounded in-memory notification list, shared through application state.
#[derive(Debug, Clone)]
pub struct NotificationStore {
    items: Arc<RwLock<VecDeque<Notification>>>,
    capacity: usize,
}

impl NotificationStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Arc::new(RwLock::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    pub async fn create(&self, new: NewNotification) -> Result<Notification> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(KinoError::BadRequest("title is required".into()));
        }

        let notification = Notification {
            id: Uuid::new_v4(),
            title: title.to_string(),
            message: new.message.trim().to_string(),
            created_at: Utc::now(),
        };

        let mut items = self.items.write().await;
        items.push_front(notification.clone());
        while items.len() > self.capacity {
            if let Some(evicted) = items.pop_back() {
                debug!(id = %evicted.id, "Evicted oldest notification");
            }
        }
        metrics::notifications::created();
        Ok(notification)
    }

    /// Newest first.
    pub async fn list(&self) -> Vec<Notification> {
        self.items.read().await.iter().cloned().collect()
    }

    pub async fn remove(&self, id: Uuid) -> Result<()> {
        let mut items = self.items.write().await;
        let position = items
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| KinoError::NotFound(format!("Notification {id} not found")))?;
        items.remove(position);
        Ok(())
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_NOTIFICATION_CAPACITY)
    }
}
