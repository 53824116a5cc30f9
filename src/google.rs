//! Google Calendar API adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gcal_core::service::{
    CalendarEntry, CalendarService, CreatedEvent, EventDraft, EventEntry, EventQuery, EventStart,
};
use gcal_core::{AuthenticatedHandle, RemoteError};
use google_calendar::Client;
use google_calendar::types::{EventDateTime, MinAccessRole, OrderBy, SendUpdates};
use tracing::debug;

pub struct GoogleCalendar {
    client: Client,
}

impl GoogleCalendar {
    /// Create a Google Calendar client from an authenticated session
    pub fn new(handle: &AuthenticatedHandle) -> Self {
        let config = handle.config();
        GoogleCalendar {
            client: Client::new(
                config.client_id.clone(),
                config.client_secret.clone(),
                config.redirect_uri.clone(),
                handle.access_token().to_string(),
                handle.refresh_token().to_string(),
            ),
        }
    }
}

/// Largest page the events endpoint serves.
const MAX_PAGE_SIZE: usize = 2500;

/// `maxResults` for one page of events.
fn page_size(query: &EventQuery) -> i64 {
    query.max_results.clamp(1, MAX_PAGE_SIZE) as i64
}

fn remote(e: impl std::fmt::Display) -> RemoteError {
    RemoteError::new(e.to_string())
}

fn to_google_time(dt: DateTime<Utc>) -> EventDateTime {
    EventDateTime {
        date: None,
        date_time: Some(dt),
        time_zone: String::new(),
    }
}

fn from_google_event(event: google_calendar::types::Event) -> EventEntry {
    let start = event.start.and_then(|start| {
        if let Some(dt) = start.date_time {
            Some(EventStart::DateTime(dt))
        } else {
            start.date.map(EventStart::Date)
        }
    });

    EventEntry {
        id: event.id,
        summary: event.summary,
        start,
    }
}

fn to_google_event(draft: &EventDraft) -> google_calendar::types::Event {
    google_calendar::types::Event {
        summary: draft.summary.clone(),
        description: draft.description.clone(),
        location: draft.location.clone(),
        start: Some(to_google_time(draft.start)),
        end: Some(to_google_time(draft.end)),
        visibility: draft.visibility.as_str().to_string(),
        guests_can_modify: draft.guests_can_modify,
        ..Default::default()
    }
}

#[async_trait(?Send)]
impl CalendarService for GoogleCalendar {
    async fn list_calendars(&self) -> Result<Vec<CalendarEntry>, RemoteError> {
        let calendars = self
            .client
            .calendar_list()
            .list_all(MinAccessRole::default(), false, false)
            .await
            .map_err(remote)?
            .body;

        Ok(calendars
            .into_iter()
            .map(|cal| CalendarEntry {
                id: cal.id,
                summary: cal.summary,
                primary: cal.primary,
            })
            .collect())
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<EventEntry>, RemoteError> {
        let order_by = if query.order_by_start_time {
            OrderBy::StartTime
        } else {
            OrderBy::default()
        };
        let time_min = query.time_min.to_rfc3339();

        let events = self
            .client
            .events()
            .list(
                calendar_id,
                "",
                0,
                page_size(query),
                order_by,
                "", // first page only
                &[],
                "", // search query
                &[],
                query.show_deleted,
                false,
                query.single_events,
                "",
                &time_min,
                "",
                "",
            )
            .await
            .map_err(remote)?
            .body;

        debug!(fetched = events.len(), limit = query.max_results, "Listed events");

        Ok(events.into_iter().map(from_google_event).collect())
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &EventDraft,
    ) -> Result<CreatedEvent, RemoteError> {
        let response = self
            .client
            .events()
            .insert(
                calendar_id,
                0,
                0,
                false,
                SendUpdates::None,
                false,
                &to_google_event(event),
            )
            .await
            .map_err(remote)?;

        Ok(CreatedEvent {
            id: response.body.id,
            html_link: response.body.html_link,
        })
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), RemoteError> {
        self.client
            .events()
            .delete(calendar_id, event_id, false, SendUpdates::None)
            .await
            .map_err(remote)?;
        Ok(())
    }
}
