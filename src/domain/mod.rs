mod account;
mod contact;
mod merchant_email;
mod merchant_name;
mod new_merchant;
mod password_policy;
mod token;

pub use account::{AccountStatus, MerchantAccount, ProfileUpdate};
pub use contact::{ContactPhone, ProfileText};
pub use merchant_email::MerchantEmail;
pub use merchant_name::MerchantName;
pub use new_merchant::{DomainError, MerchantProfile, NewMerchant};
pub use password_policy::PasswordPolicy;
pub use token::{IssuedToken, TokenConsumption, TokenPurpose, VerificationToken};
