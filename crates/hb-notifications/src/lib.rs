//! # hb-notifications
//!
//! E-mail for Hourbook.
//!
//! ## Features
//!
//! - E-mail message and address types
//! - The `EmailSender` collaborator, with a console (tracing) sender and an in-memory sender
//! - The project summary page and mail renderer

pub mod email;
pub mod summary_mail;

pub use email::{
    ConsoleEmailSender, EmailAddress, EmailError, EmailMessage, EmailResult, EmailSender,
    MemoryEmailSender,
};
pub use summary_mail::SummaryMailRenderer;
