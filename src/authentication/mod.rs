mod error;
mod middleware;
mod password;
mod service;

pub use error::AuthError;
pub use middleware::{reject_anonymous_users, MerchantId, PgSessionStorage};
pub use password::CredentialHasher;
pub use service::{AuthService, AuthSettings, Credentials, Registration};
