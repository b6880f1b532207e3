//! Event page endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use event_page::{EventDetailController, EventDetailsView};
use keygate_core::EventError;

use super::{route_error, RouteError};
use crate::dto::{EventQuery, UpsertEventRequest};
use crate::AppState;

/// Create event routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", put(upsert_event))
        .route("/:slug", get(get_event_details))
}

fn event_error(err: EventError) -> RouteError {
    route_error(err.status_code(), err.error_code(), err)
}

/// PUT /events - Publish or update an event page
pub async fn upsert_event(
    State(state): State<AppState>,
    Json(request): Json<UpsertEventRequest>,
) -> StatusCode {
    let slug = request.event.slug.clone();
    state
        .add_lock_managers(
            request
                .lock_managers
                .into_iter()
                .map(|entry| (entry.lock, entry.manager)),
        )
        .await;
    state
        .events()
        .upsert(request.event, request.checkout_config)
        .await;
    tracing::info!("Published event {}", slug);
    StatusCode::NO_CONTENT
}

/// GET /events/:slug - Event page as seen by a viewer
pub async fn get_event_details(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<EventQuery>,
) -> Result<Json<EventDetailsView>, RouteError> {
    let entry = state
        .events()
        .get(&slug)
        .await
        .ok_or_else(|| event_error(EventError::NotFound { slug: slug.clone() }))?;
    let config = state.config().await;

    let controller = EventDetailController::new(
        entry.event,
        entry.checkout_config,
        state.events(),
        Arc::new(state.lock_managers().await),
        config.site_url,
    );

    let locale = query.locale.unwrap_or(config.default_locale);
    let details = controller
        .details(query.viewer.as_ref(), &locale)
        .await
        .map_err(event_error)?;
    Ok(Json(details))
}
