//! Event detail page
//!
//! View composition for an event: the event record and its checkout config,
//! the formatted schedule, and the tools shown to the event's organizers.

pub mod controller;
pub mod event;
pub mod organizer;
pub mod schedule;

pub use controller::{EventDetailController, EventDetailsView, EventSource, LockManagers, OrganizerCheck};
pub use event::{get_event_url, CheckoutConfig, Event, PaywallConfig, PaywallLockConfig, Ticket};
pub use organizer::{minify_address, ManageAttendeesLink, OrganizerTools, VerifierSection};
pub use schedule::{get_event_date, get_event_end_date, EventSchedule};
