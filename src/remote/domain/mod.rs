//! Domain model for remote-system access.
//!
//! Record types mirror the JSON shapes returned by the remote API. Numeric
//! identifiers are accepted either as JSON numbers or as numeric strings.

mod case;
mod catalog;
mod error;
mod ids;
mod token;

pub use case::{
    ContactRef, RemoteLawsuit, RemoteTask, StatusRef, TaskLink, TaskParticipant, TaskPayload,
};
pub use catalog::{RemoteOffice, RemoteTaskSubtype, RemoteTaskType, RemoteUser, TaskTypeCatalog};
pub use error::{AuthError, RemoteError, RemoteResult};
pub use ids::{ExternalId, ParseExternalIdError, lenient_i64};
pub use token::AccessToken;
