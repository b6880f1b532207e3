//! Event detail page controller
//!
//! Holds the page's current event record, refreshes it on demand, and
//! composes the view: schedule, location, and organizer tools when the
//! viewer manages one of the event's locks.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use keygate_core::{AccountAddress, EventError, LockAddress};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::event::{get_event_url, CheckoutConfig, Event};
use crate::organizer::OrganizerTools;
use crate::schedule::EventSchedule;

/// Source of event records
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_event(&self, slug: &str) -> Result<Event, EventError>;
}

/// Decides whether a viewer may use the organizer tools
#[async_trait]
pub trait OrganizerCheck: Send + Sync {
    async fn is_organizer(&self, viewer: &AccountAddress, checkout_config: &CheckoutConfig) -> bool;
}

/// Lock managers known per lock. A viewer is an organizer when they manage
/// any lock of the event's checkout config.
#[derive(Debug, Clone, Default)]
pub struct LockManagers {
    managers: HashMap<LockAddress, HashSet<AccountAddress>>,
}

impl LockManagers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, lock: LockAddress, manager: AccountAddress) {
        self.managers.entry(lock).or_default().insert(manager);
    }

    pub fn is_manager(&self, lock: &LockAddress, account: &AccountAddress) -> bool {
        self.managers
            .get(lock)
            .is_some_and(|managers| managers.contains(account))
    }
}

#[async_trait]
impl OrganizerCheck for LockManagers {
    async fn is_organizer(&self, viewer: &AccountAddress, checkout_config: &CheckoutConfig) -> bool {
        checkout_config
            .config
            .locks
            .keys()
            .any(|lock| self.is_manager(lock, viewer))
    }
}

/// Everything the event page renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailsView {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub cover_image: Option<String>,
    pub background_color: Option<String>,
    pub event_url: String,
    pub schedule: EventSchedule,
    pub date_line: Option<String>,
    pub time_line: Option<String>,
    pub has_date: bool,
    pub location: Option<String>,
    pub organizer_tools: Option<OrganizerTools>,
}

pub struct EventDetailController {
    slug: String,
    event: RwLock<Event>,
    checkout_config: CheckoutConfig,
    source: Arc<dyn EventSource>,
    organizers: Arc<dyn OrganizerCheck>,
    site_url: String,
}

impl EventDetailController {
    /// Start from already-loaded event data
    pub fn new(
        initial: Event,
        checkout_config: CheckoutConfig,
        source: Arc<dyn EventSource>,
        organizers: Arc<dyn OrganizerCheck>,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            slug: initial.slug.clone(),
            event: RwLock::new(initial),
            checkout_config,
            source,
            organizers,
            site_url: site_url.into(),
        }
    }

    pub async fn event(&self) -> Event {
        self.event.read().await.clone()
    }

    pub fn checkout_config(&self) -> &CheckoutConfig {
        &self.checkout_config
    }

    /// Reload the event from its source. On failure the current record is kept.
    pub async fn refetch(&self) -> Result<Event, EventError> {
        tracing::debug!("Refetching event {}", self.slug);
        let fresh = self.source.fetch_event(&self.slug).await.map_err(|e| {
            tracing::warn!("Failed to refetch event {}: {}", self.slug, e);
            e
        })?;
        let mut event = self.event.write().await;
        *event = fresh.clone();
        Ok(fresh)
    }

    /// The cover image drawer closed; the image may have changed
    pub async fn on_cover_image_closed(&self) -> Result<Event, EventError> {
        self.refetch().await
    }

    pub async fn is_organizer(&self, viewer: Option<&AccountAddress>) -> bool {
        match viewer {
            Some(viewer) => self.organizers.is_organizer(viewer, &self.checkout_config).await,
            None => false,
        }
    }

    pub async fn details(
        &self,
        viewer: Option<&AccountAddress>,
        locale: &str,
    ) -> Result<EventDetailsView, EventError> {
        let event = self.event().await;
        let schedule = EventSchedule::for_event(&event, locale)?;
        let event_url = get_event_url(&self.site_url, &event.slug);

        let organizer_tools = if self.is_organizer(viewer).await {
            Some(OrganizerTools::build(&event_url, &self.checkout_config, true))
        } else {
            None
        };

        Ok(EventDetailsView {
            location: event
                .has_location()
                .then(|| event.ticket.event_address.clone())
                .flatten(),
            cover_image: event.cover_image().map(str::to_string),
            date_line: schedule.date_line(),
            time_line: schedule.time_line(),
            has_date: schedule.has_date(),
            schedule,
            event_url,
            organizer_tools,
            slug: event.slug,
            name: event.name,
            description: event.description,
            image: event.image,
            background_color: event.background_color,
        })
    }
}
