//! The calendar API as seen by the command router.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::error::RemoteError;

/// A calendar from the user's calendar list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub id: String,
    pub summary: String,
    pub primary: bool,
}

/// Start of an event: a timed event or an all-day date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStart {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl fmt::Display for EventStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventStart::DateTime(dt) => write!(f, "{}", dt.with_timezone(&Local).to_rfc3339()),
            EventStart::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEntry {
    pub id: String,
    pub summary: String,
    pub start: Option<EventStart>,
}

/// Filters for listing events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub show_deleted: bool,
    /// Expand recurring events into their individual instances.
    pub single_events: bool,
    pub time_min: DateTime<Utc>,
    pub max_results: usize,
    pub order_by_start_time: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Default,
    Public,
    Private,
    Confidential,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Default => "default",
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Confidential => "confidential",
        }
    }
}

/// An event to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub visibility: Visibility,
    pub guests_can_modify: bool,
}

/// What the API returns for an inserted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEvent {
    pub id: String,
    pub html_link: String,
}

/// An authenticated calendar API.
///
/// Failures carry the API's own error text; the router decides what they mean.
#[async_trait(?Send)]
pub trait CalendarService {
    async fn list_calendars(&self) -> Result<Vec<CalendarEntry>, RemoteError>;

    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<EventEntry>, RemoteError>;

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &EventDraft,
    ) -> Result<CreatedEvent, RemoteError>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), RemoteError>;
}
