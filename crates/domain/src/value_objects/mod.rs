//! Value Objects - Immutable, identity-less domain primitives

mod email_address;
mod report_window;
mod search_budget;

pub use email_address::EmailAddress;
pub use report_window::{ReportWindow, WINDOW_DATE_FORMAT};
pub use search_budget::{DEFAULT_SEARCH_BUDGET, MAX_SEARCH_BUDGET, SearchBudget};
