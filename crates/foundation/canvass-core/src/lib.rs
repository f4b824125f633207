//! # Canvass Core
//!
//! Domain model for the survey service: users, social connections, surveys and
//! responses, plus the listing and aggregation layer that backs the dashboard.
//!
//! ```text
//!   HTTP handlers ──> services ──> repository traits ──> memory | mongodb
//!                                      │
//!                                      └── page / stats (pure)
//! ```
//!
//! Nothing in this crate talks to the network. Storage backends implement the
//! traits in [`repository`]; [`memory`] ships an in-process implementation used
//! by tests and the `memory` database backend.

pub mod memory;
pub mod model;
pub mod page;
pub mod repository;
pub mod stats;
pub mod validate;

pub use memory::InMemoryStore;
pub use model::{
    NewResponse, NewSurvey, NewUser, Response, SocialConnection, SocialProfile, Survey,
    SurveyPatch, User,
};
pub use page::{Page, PageMeta, PageRequest};
pub use repository::{
    Repositories, ResponseFilter, ResponseRepository, SocialConnectionRepository,
    SurveyFilter, SurveyRepository, UserRepository,
};
pub use stats::{DashboardStats, SurveyStatItem, SurveyStatus};

/// Result type for canvass operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by every layer. The web crate maps each variant to a
/// status code exactly once.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{message}")]
    Validation { message: String, errors: Vec<String> },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Upstream service failed: {0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn survey_not_found(id: &str) -> Self {
        Error::NotFound(format!("Survey with ID {id} not found"))
    }

    pub fn response_not_found(id: &str) -> Self {
        Error::NotFound(format!("Response with ID {id} not found"))
    }

    /// Validation failure carrying one message per offending field.
    pub fn invalid(errors: Vec<String>) -> Self {
        Error::Validation {
            message: "Invalid request data".to_string(),
            errors,
        }
    }
}
