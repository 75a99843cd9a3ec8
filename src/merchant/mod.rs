mod service;

pub use service::{MerchantService, ProfileError};
