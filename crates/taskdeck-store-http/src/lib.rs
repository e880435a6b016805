//! HTTP backend for taskdeck.
//!
//! [`HttpTaskStore`] implements [`taskdeck_app::RemoteTaskStore`] against the task
//! service's REST API; [`AuthClient`] covers its login and registration endpoints.

mod auth;
mod error;
mod tasks;

pub use auth::{AuthClient, Credentials, Registration, User};
pub use error::HttpStoreError;
pub use tasks::HttpTaskStore;
