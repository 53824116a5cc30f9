//! Recording stubs for the external collaborators.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use async_trait::async_trait;
use url::Url;

use crate::auth::{Operator, TokenEndpoint};
use crate::credential::{ClientConfig, TokenGrant};
use crate::error::RemoteError;
use crate::service::{
    CalendarEntry, CalendarService, CreatedEvent, EventDraft, EventEntry, EventQuery,
};

pub fn grant(access_token: &str, refresh_token: Option<&str>) -> TokenGrant {
    TokenGrant {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expires_in: Some(3600),
        token_type: Some("Bearer".to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointCall {
    Exchange(String),
    Refresh(String),
}

/// Token endpoint with canned answers. Clones share one call log.
#[derive(Clone)]
pub struct RecordingEndpoint {
    exchange: Result<TokenGrant, RemoteError>,
    refresh: Result<TokenGrant, RemoteError>,
    calls: Rc<RefCell<Vec<EndpointCall>>>,
}

impl RecordingEndpoint {
    pub fn new(
        exchange: Result<TokenGrant, RemoteError>,
        refresh: Result<TokenGrant, RemoteError>,
    ) -> Self {
        RecordingEndpoint {
            exchange,
            refresh,
            calls: Rc::default(),
        }
    }

    pub fn calls(&self) -> Vec<EndpointCall> {
        self.calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl TokenEndpoint for RecordingEndpoint {
    async fn exchange_code(
        &self,
        _config: &ClientConfig,
        code: &str,
    ) -> Result<TokenGrant, RemoteError> {
        self.calls
            .borrow_mut()
            .push(EndpointCall::Exchange(code.to_string()));
        self.exchange.clone()
    }

    async fn refresh(
        &self,
        _config: &ClientConfig,
        refresh_token: &str,
    ) -> Result<TokenGrant, RemoteError> {
        self.calls
            .borrow_mut()
            .push(EndpointCall::Refresh(refresh_token.to_string()));
        self.refresh.clone()
    }
}

/// Operator that types one prepared line, or nothing at all.
pub struct ScriptedOperator {
    input: Option<String>,
    pub presented: Vec<String>,
}

impl ScriptedOperator {
    pub fn new(input: Option<&str>) -> Self {
        ScriptedOperator {
            input: input.map(str::to_string),
            presented: Vec::new(),
        }
    }
}

impl Operator for ScriptedOperator {
    fn present(&mut self, authorization_url: &Url) {
        self.presented.push(authorization_url.to_string());
    }

    fn read_code(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.take())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
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

/// Calendar API stub that records every call and answers with empty results,
/// or with `failure` when set.
#[derive(Default)]
pub struct RecordingCalendar {
    failure: Option<RemoteError>,
    calls: RefCell<Vec<ServiceCall>>,
}

impl RecordingCalendar {
    pub fn failing(error: RemoteError) -> Self {
        RecordingCalendar {
            failure: Some(error),
            calls: RefCell::default(),
        }
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: ServiceCall) -> Result<(), RemoteError> {
        self.calls.borrow_mut().push(call);
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl CalendarService for RecordingCalendar {
    async fn list_calendars(&self) -> Result<Vec<CalendarEntry>, RemoteError> {
        self.record(ServiceCall::ListCalendars)?;
        Ok(Vec::new())
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<EventEntry>, RemoteError> {
        self.record(ServiceCall::ListEvents {
            calendar_id: calendar_id.to_string(),
            query: query.clone(),
        })?;
        Ok(Vec::new())
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &EventDraft,
    ) -> Result<CreatedEvent, RemoteError> {
        self.record(ServiceCall::InsertEvent {
            calendar_id: calendar_id.to_string(),
            event: event.clone(),
        })?;
        Ok(CreatedEvent {
            id: "created-id".to_string(),
            html_link: "https://www.google.com/calendar/event?eid=created-id".to_string(),
        })
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), RemoteError> {
        self.record(ServiceCall::DeleteEvent {
            calendar_id: calendar_id.to_string(),
            event_id: event_id.to_string(),
        })
    }
}
