use secrecy::Secret;

use super::{ContactPhone, MerchantEmail, MerchantName, ProfileText};

#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("{0}")]
    InvalidMerchantEmail(String),
    #[error("{0}")]
    InvalidMerchantName(String),
    #[error("{0}")]
    InvalidContactPhone(String),
    #[error("{0}")]
    InvalidProfileText(String),
    #[error("{0}")]
    WeakPassword(String),
    #[error("{0} is not a valid account status.")]
    InvalidAccountStatus(String),
    #[error("The token expiry is out of range.")]
    TokenExpiryOutOfRange,
}

/// 가입할 때 함께 받는 프로필 정보
#[derive(Debug, Clone)]
pub struct MerchantProfile {
    pub name: MerchantName,
    pub phone: Option<ContactPhone>,
    pub address: Option<ProfileText>,
    pub description: Option<ProfileText>,
}

impl MerchantProfile {
    pub fn new(name: MerchantName) -> Self {
        Self {
            name,
            phone: None,
            address: None,
            description: None,
        }
    }
}

pub struct NewMerchant {
    pub email: MerchantEmail,
    // 평문 비밀번호는 해시를 계산할 때까지만 살아있다.
    pub password: Secret<String>,
    pub profile: MerchantProfile,
}

impl NewMerchant {
    pub fn new(email: MerchantEmail, password: Secret<String>, profile: MerchantProfile) -> Self {
        Self {
            email,
            password,
            profile,
        }
    }
}
