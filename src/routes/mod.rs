mod auth;
mod error;
mod health_check;
mod merchants;

pub use auth::{
    forgot_password, log_in, log_out, register, resend_verification, reset_password,
    verify_email,
};
pub use error::ApiError;
pub use health_check::health_check;
pub use merchants::{get_profile, patch_profile};
