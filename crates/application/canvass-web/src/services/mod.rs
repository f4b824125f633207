//! Service layer. Each service is built once from repository handles and
//! shared through the application state.

mod responses;
mod summary;
mod surveys;

pub use responses::ResponseService;
pub use summary::{SummaryService, NO_DATA_SUMMARY, SUMMARY_FAILED};
pub use surveys::SurveyService;
