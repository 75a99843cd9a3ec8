use chrono::{DateTime, Utc};
use secrecy::Secret;
use uuid::Uuid;

use crate::domain::{
    AccountStatus, IssuedToken, MerchantAccount, MerchantEmail, MerchantProfile, ProfileUpdate,
    TokenConsumption, VerificationToken,
};

use super::MerchantDBError;

/// 가맹점 계정 저장소.
/// 각 쓰기 연산은 원자적이어야 한다.
#[trait_variant::make(Send)]
pub trait MerchantRepository {
    async fn find_by_email(
        &self,
        email: &MerchantEmail,
    ) -> Result<Option<MerchantAccount>, MerchantDBError>;

    /// 계정이 없으면 `MerchantDBError::NotFound`를 반환한다.
    async fn find_by_id(&self, merchant_id: Uuid) -> Result<MerchantAccount, MerchantDBError>;

    /// 새 계정을 `Unverified` 상태로 만든다.
    /// 이메일이 이미 있으면 `MerchantDBError::DuplicateEmail`을 반환한다.
    async fn create(
        &self,
        email: &MerchantEmail,
        password_hash: Secret<String>,
        profile: &MerchantProfile,
    ) -> Result<MerchantAccount, MerchantDBError>;

    async fn update_password(
        &self,
        merchant_id: Uuid,
        password_hash: Secret<String>,
    ) -> Result<(), MerchantDBError>;

    async fn update_status(
        &self,
        merchant_id: Uuid,
        status: AccountStatus,
    ) -> Result<(), MerchantDBError>;

    /// 같은 용도로 발급되어 아직 쓰지 않은 토큰을 모두 폐기하고 새 토큰을 저장한다.
    async fn update_token(&self, issued_token: &IssuedToken) -> Result<(), MerchantDBError>;

    /// 이메일 인증 토큰을 소비하고 `Unverified` 계정을 `Active`로 바꾼 뒤 계정을 반환한다.
    /// 다른 상태의 계정은 바꾸지 않는다.
    /// 토큰 소비와 상태 변경은 함께 반영되거나 함께 취소되어야 한다.
    async fn activate_with_token(
        &self,
        token: &VerificationToken,
        now: DateTime<Utc>,
    ) -> Result<TokenConsumption<MerchantAccount>, MerchantDBError>;

    /// 비밀번호 재설정 토큰을 소비하고 비밀번호 해시를 바꾼다.
    /// 계정에 남은 다른 재설정 토큰도 함께 폐기한다.
    /// 세 변경은 함께 반영되거나 함께 취소되어야 한다.
    async fn reset_password_with_token(
        &self,
        token: &VerificationToken,
        password_hash: Secret<String>,
        now: DateTime<Utc>,
    ) -> Result<TokenConsumption, MerchantDBError>;

    async fn update_profile(
        &self,
        merchant_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<MerchantAccount, MerchantDBError>;
}
