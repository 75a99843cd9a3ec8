mod base;
mod postmark;

pub use base::{EmailClientError, MailSender};
pub use postmark::Postmark;
