//! Core of the gcal calendar CLI: OAuth session handling, the command
//! router and the shell-completion tree.

pub mod auth;
pub mod command;
pub mod completion;
pub mod credential;
pub mod error;
pub mod router;
pub mod service;
pub mod session;
pub mod store;

pub use auth::{AuthorizationFlow, Operator, TokenEndpoint};
pub use command::{CommandSpec, Object, Verb};
pub use credential::{ClientConfig, StoredCredential, TokenGrant};
pub use error::{GcalError, GcalResult, RemoteError};
pub use router::{CommandRouter, Outcome, Request};
pub use service::CalendarService;
pub use session::{AuthenticatedHandle, SessionManager};
pub use store::CredentialStore;

#[cfg(test)]
pub(crate) mod testing;
