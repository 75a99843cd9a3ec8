use base64::Engine;
use chrono::{DateTime, Utc};
use rand::RngCore;
use uuid::Uuid;

use super::new_merchant::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    EmailVerify,
    PasswordReset,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerify => "email_verify",
            TokenPurpose::PasswordReset => "password_reset",
        }
    }
}

/// 이메일 인증, 비밀번호 재설정 링크에 실리는 일회용 토큰
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationToken(String);

impl VerificationToken {
    const RANDOM_BYTES: usize = 32;

    /// OS 난수 32바이트를 base64url(패딩 없음)로 인코딩한 토큰을 생성한다.
    pub fn generate() -> VerificationToken {
        let mut bytes = [0u8; Self::RANDOM_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        VerificationToken(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    /// 외부에서 받은 토큰 문자열을 감싼다.
    /// 형식이 맞지 않는 토큰은 저장소에서 찾지 못할 뿐이므로 따로 검증하지 않는다.
    pub fn from_raw(raw: impl Into<String>) -> VerificationToken {
        VerificationToken(raw.into())
    }
}

impl AsRef<str> for VerificationToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// 토큰은 비밀값이므로 로그에 남기지 않는다.
impl std::fmt::Debug for VerificationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VerificationToken([REDACTED])")
    }
}

/// 발급된 토큰과 그 소유 계정, 용도, 만료 시각
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: VerificationToken,
    pub merchant_id: Uuid,
    pub purpose: TokenPurpose,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    pub fn issue(
        merchant_id: Uuid,
        purpose: TokenPurpose,
        issued_at: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Result<IssuedToken, DomainError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(DomainError::TokenExpiryOutOfRange)?;
        Ok(IssuedToken {
            token: VerificationToken::generate(),
            merchant_id,
            purpose,
            expires_at,
        })
    }
}

/// 토큰 소비 시도의 결과.
/// 저장소는 확인과 소비, 그에 따른 계정 변경을 하나의 원자적 연산으로 처리한다.
/// `Consumed`에는 변경된 계정에 대한 값이 실린다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenConsumption<T = Uuid> {
    Consumed(T),
    NotFound,
    Expired,
    AlreadyUsed,
}

impl<T> TokenConsumption<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TokenConsumption<U> {
        match self {
            TokenConsumption::Consumed(value) => TokenConsumption::Consumed(f(value)),
            TokenConsumption::NotFound => TokenConsumption::NotFound,
            TokenConsumption::Expired => TokenConsumption::Expired,
            TokenConsumption::AlreadyUsed => TokenConsumption::AlreadyUsed,
        }
    }
}
