pub mod contact;
pub mod validation;

pub use contact::{ContactId, ContactRecord, ContactSubmission};
pub use validation::{validate_submission, ValidationErrors, Violation, ViolationCode};
