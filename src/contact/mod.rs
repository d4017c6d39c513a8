//! Contact-form submission pipeline
//!
//! One request flows validate -> compose -> deliver, with no state shared
//! between requests beyond the injected `AppContext`.

mod compose;
mod request;
mod routes;

pub use compose::{compose, html_escape};
pub use request::{ContactRequest, Submission};
pub use routes::{ContactResponse, router};
