//! Maps a `(verb, object)` pair onto one calendar operation.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::command::{CommandSpec, Object, Verb};
use crate::error::{GcalError, GcalResult};
use crate::service::{
    CalendarEntry, CalendarService, CreatedEvent, EventDraft, EventEntry, EventQuery, Visibility,
};

/// Upcoming events shown by `list events`.
pub const UPCOMING_EVENT_LIMIT: usize = 10;

pub const DEFAULT_SUMMARY: &str = "Default Summary";
pub const DEFAULT_DESCRIPTION: &str = "Default Description";
pub const DEFAULT_LOCATION: &str = "Here";
const DEFAULT_START_OFFSET_MINUTES: i64 = 30;
const DEFAULT_END_OFFSET_MINUTES: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListCalendars,
    ListEvents,
    AddEvent,
    DeleteEvent,
}

/// Every supported `(verb, object)` pair and what it does. Anything not in
/// here is an unknown command.
pub const SUPPORTED_COMMANDS: &[(Verb, Object, Operation)] = &[
    (Verb::List, Object::Calendars, Operation::ListCalendars),
    (Verb::List, Object::Events, Operation::ListEvents),
    (Verb::Add, Object::Events, Operation::AddEvent),
    (Verb::Delete, Object::Events, Operation::DeleteEvent),
];

pub fn operation_for(verb: Verb, object: Object) -> Option<Operation> {
    SUPPORTED_COMMANDS
        .iter()
        .find(|(v, o, _)| *v == verb && *o == object)
        .map(|(_, _, op)| *op)
}

/// A fully validated request, ready to hand to the calendar API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListCalendars,
    ListEvents {
        calendar_id: String,
        query: EventQuery,
    },
    InsertEvent {
        calendar_id: String,
        event: EventDraft,
    },
    DeleteEvent {
        calendar_id: String,
        event_id: String,
    },
}

impl Request {
    /// Check the pair against the dispatch table and pull out the required
    /// positional arguments. Never touches the network.
    pub fn resolve(spec: &CommandSpec, now: DateTime<Utc>) -> GcalResult<Request> {
        let operation = operation_for(spec.verb(), spec.object()).ok_or_else(|| {
            GcalError::UnknownCommand(format!("{} {}", spec.verb(), spec.object()))
        })?;

        let request = match operation {
            Operation::ListCalendars => Request::ListCalendars,
            Operation::ListEvents => Request::ListEvents {
                calendar_id: calendar_id(spec)?,
                query: EventQuery {
                    show_deleted: false,
                    single_events: true,
                    time_min: now,
                    max_results: UPCOMING_EVENT_LIMIT,
                    order_by_start_time: true,
                },
            },
            Operation::AddEvent => {
                let calendar_id = calendar_id(spec)?;
                if spec.args().len() < 2 {
                    return Err(GcalError::MissingArgument("event name"));
                }
                let name = spec.args()[1..].join(" ");

                Request::InsertEvent {
                    calendar_id,
                    event: EventDraft {
                        summary: name,
                        ..default_event(now)
                    },
                }
            }
            Operation::DeleteEvent => Request::DeleteEvent {
                calendar_id: calendar_id(spec)?,
                event_id: spec
                    .arg(1)
                    .ok_or(GcalError::MissingArgument("event id"))?
                    .to_string(),
            },
        };

        Ok(request)
    }
}

fn calendar_id(spec: &CommandSpec) -> GcalResult<String> {
    spec.arg(0)
        .map(str::to_string)
        .ok_or(GcalError::MissingArgument("calendar id"))
}

/// The event `add events` starts from before the operator's name is applied.
pub fn default_event(now: DateTime<Utc>) -> EventDraft {
    EventDraft {
        summary: DEFAULT_SUMMARY.to_string(),
        description: DEFAULT_DESCRIPTION.to_string(),
        location: DEFAULT_LOCATION.to_string(),
        start: now + Duration::minutes(DEFAULT_START_OFFSET_MINUTES),
        end: now + Duration::minutes(DEFAULT_END_OFFSET_MINUTES),
        visibility: Visibility::Public,
        guests_can_modify: true,
    }
}

/// Result of a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Calendars(Vec<CalendarEntry>),
    Events(Vec<EventEntry>),
    Created(CreatedEvent),
    Deleted { event_id: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Calendars(calendars) => {
                writeln!(f, "Upcoming calendars:")?;
                if calendars.is_empty() {
                    return writeln!(f, "No calendars found.");
                }
                for cal in calendars {
                    writeln!(f, "\t{} :: {}", cal.summary, cal.id)?;
                }
                Ok(())
            }
            Outcome::Events(events) => {
                writeln!(f, "Upcoming events:")?;
                if events.is_empty() {
                    return writeln!(f, "No upcoming events found.");
                }
                for event in events {
                    match &event.start {
                        Some(start) => writeln!(f, "\t{} :: {} :: ({})", event.summary, event.id, start)?,
                        None => writeln!(f, "\t{} :: {}", event.summary, event.id)?,
                    }
                }
                Ok(())
            }
            Outcome::Created(created) => {
                writeln!(f, "Event created: {}", created.html_link)?;
                writeln!(f, "\t{}", created.id)
            }
            Outcome::Deleted { event_id } => writeln!(f, "Event deleted: {}", event_id),
        }
    }
}

/// Dispatches commands to a calendar API. No retries; the first remote
/// failure ends the command.
pub struct CommandRouter<'a, S: ?Sized> {
    service: &'a S,
}

impl<'a, S: CalendarService + ?Sized> CommandRouter<'a, S> {
    pub fn new(service: &'a S) -> Self {
        CommandRouter { service }
    }

    pub async fn dispatch(&self, spec: CommandSpec, now: DateTime<Utc>) -> GcalResult<Outcome> {
        let request = Request::resolve(&spec, now)?;
        debug!(?request, "Dispatching");
        self.execute(request).await
    }

    pub async fn execute(&self, request: Request) -> GcalResult<Outcome> {
        let remote = |e: crate::error::RemoteError| GcalError::RemoteOperationFailed(e.0);

        match request {
            Request::ListCalendars => {
                let calendars = self.service.list_calendars().await.map_err(remote)?;
                Ok(Outcome::Calendars(calendars))
            }
            Request::ListEvents { calendar_id, query } => {
                let events = self
                    .service
                    .list_events(&calendar_id, &query)
                    .await
                    .map_err(remote)?;
                Ok(Outcome::Events(events))
            }
            Request::InsertEvent { calendar_id, event } => {
                let created = self
                    .service
                    .insert_event(&calendar_id, &event)
                    .await
                    .map_err(remote)?;
                Ok(Outcome::Created(created))
            }
            Request::DeleteEvent {
                calendar_id,
                event_id,
            } => {
                self.service
                    .delete_event(&calendar_id, &event_id)
                    .await
                    .map_err(remote)?;
                Ok(Outcome::Deleted { event_id })
            }
        }
    }
}
