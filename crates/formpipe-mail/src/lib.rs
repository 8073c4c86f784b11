//! # formpipe-mail
//!
//! Email for formpipe: message backends, owner notification routing, and
//! submitter confirmation emails. Delivery failures are logged and reported
//! as outcomes; they never fail a submission.
//!
//! ## Modules
//!
//! - [`email`] - Messages and backends
//! - [`mailer`] - Templated form emails
//! - [`routing`] - Recipient routing for owner notifications
//! - [`confirmation`] - Submitter confirmation emails

pub mod confirmation;
pub mod email;
pub mod mailer;
pub mod routing;

pub use confirmation::{send_confirmation, Confirmation};
pub use email::{ConsoleBackend, EmailBackend, EmailMessage, InMemoryBackend};
pub use mailer::Mailer;
pub use routing::{route, send_email_submissions, Notification};
