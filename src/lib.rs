//! Contact form handling: field validation, message composition from
//! templates, and an optional Akismet spam check on the message body.

pub mod akismet;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod form;
pub mod infrastructure;
pub mod mail;

pub use app::{ContactApp, IncomingSubmission, Outcome};
pub use error::ContactFormError;
pub use form::{ContactForm, FormClass};
