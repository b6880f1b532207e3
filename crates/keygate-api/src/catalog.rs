//! In-memory event catalog

use std::collections::HashMap;

use async_trait::async_trait;
use event_page::{CheckoutConfig, Event, EventSource};
use keygate_core::EventError;
use tokio::sync::RwLock;

/// An event page and the checkout config it sells tickets through
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub event: Event,
    pub checkout_config: CheckoutConfig,
}

#[derive(Debug, Default)]
pub struct EventCatalog {
    entries: RwLock<HashMap<String, CatalogEntry>>,
}

impl EventCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for the event's slug
    pub async fn upsert(&self, event: Event, checkout_config: CheckoutConfig) {
        let mut entries = self.entries.write().await;
        tracing::debug!("Storing event {}", event.slug);
        entries.insert(
            event.slug.clone(),
            CatalogEntry {
                event,
                checkout_config,
            },
        );
    }

    pub async fn get(&self, slug: &str) -> Option<CatalogEntry> {
        self.entries.read().await.get(slug).cloned()
    }
}

#[async_trait]
impl EventSource for EventCatalog {
    async fn fetch_event(&self, slug: &str) -> Result<Event, EventError> {
        self.get(slug)
            .await
            .map(|entry| entry.event)
            .ok_or_else(|| EventError::NotFound {
                slug: slug.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(slug: &str, name: &str) -> Event {
        serde_json::from_value(serde_json::json!({ "slug": slug, "name": name })).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let catalog = EventCatalog::new();
        catalog.upsert(event("a", "First"), CheckoutConfig::default()).await;
        catalog.upsert(event("a", "Second"), CheckoutConfig::default()).await;
        assert_eq!(catalog.fetch_event("a").await.unwrap().name, "Second");
    }

    #[tokio::test]
    async fn test_missing_event() {
        let catalog = EventCatalog::new();
        let err = catalog.fetch_event("nope").await.unwrap_err();
        assert_eq!(err, EventError::NotFound { slug: "nope".into() });
    }
}
