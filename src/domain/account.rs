use chrono::{DateTime, Utc};
use secrecy::Secret;
use uuid::Uuid;

use super::{new_merchant::DomainError, ContactPhone, MerchantEmail, MerchantName, ProfileText};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Unverified,
    Active,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Unverified => "unverified",
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
        }
    }
}

impl TryFrom<&str> for AccountStatus {
    type Error = DomainError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "unverified" => Ok(Self::Unverified),
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            other => Err(DomainError::InvalidAccountStatus(other.to_string())),
        }
    }
}

/// 저장소에 저장된 가맹점 계정.
/// `password_hash`는 `Secret`이므로 `Debug`로 출력해도 노출되지 않는다.
#[derive(Debug, Clone)]
pub struct MerchantAccount {
    pub id: Uuid,
    pub email: MerchantEmail,
    pub password_hash: Secret<String>,
    pub name: MerchantName,
    pub phone: Option<ContactPhone>,
    pub address: Option<ProfileText>,
    pub description: Option<ProfileText>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 프로필 수정 요청.
/// 이메일과 계정 id는 여기에서 바꿀 수 없다.
/// `None`인 항목은 기존 값을 유지한다.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<MerchantName>,
    pub phone: Option<ContactPhone>,
    pub address: Option<ProfileText>,
    pub description: Option<ProfileText>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.description.is_none()
    }

    /// 변경 사항을 계정에 적용한다.
    pub fn apply_to(&self, account: &mut MerchantAccount) {
        if let Some(name) = &self.name {
            account.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            account.phone = Some(phone.clone());
        }
        if let Some(address) = &self.address {
            account.address = Some(address.clone());
        }
        if let Some(description) = &self.description {
            account.description = Some(description.clone());
        }
    }
}
