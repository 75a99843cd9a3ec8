mod login;
mod password_reset;
mod register;
mod verify;

pub use login::{log_in, log_out};
pub use password_reset::{forgot_password, reset_password};
pub use register::register;
pub use verify::{resend_verification, verify_email};
