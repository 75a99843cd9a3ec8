use crate::{domain::DomainError, utils::error_chain_fmt};

// `migrations`에서 정의한 이메일 유니크 인덱스 이름
const MERCHANTS_EMAIL_KEY: &str = "merchants_email_key";

// 저장소 구현을 바꾸더라도 호출자는 같은 오류를 다룬다.
#[derive(thiserror::Error)]
pub enum MerchantDBError {
    #[error("The merchant account was not found.")]
    NotFound,
    #[error("The email address is already registered.")]
    DuplicateEmail,
    // 호출자가 다시 시도할 수 있는 일시적인 저장소 오류
    #[error("Storage failure")]
    StorageFailure(#[source] anyhow::Error),
    // 저장된 값이 도메인 규칙을 만족하지 않는다.
    #[error("Stored merchant record is corrupted")]
    CorruptedRecord(#[source] DomainError),
}

impl std::fmt::Debug for MerchantDBError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<sqlx::Error> for MerchantDBError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => MerchantDBError::NotFound,
            sqlx::Error::Database(ref db_error)
                if db_error.is_unique_violation()
                    && db_error.constraint() == Some(MERCHANTS_EMAIL_KEY) =>
            {
                MerchantDBError::DuplicateEmail
            }
            // 존재하지 않는 계정에 토큰을 발급하려는 경우
            sqlx::Error::Database(ref db_error) if db_error.is_foreign_key_violation() => {
                MerchantDBError::NotFound
            }
            e => MerchantDBError::StorageFailure(e.into()),
        }
    }
}

impl From<DomainError> for MerchantDBError {
    fn from(e: DomainError) -> Self {
        MerchantDBError::CorruptedRecord(e)
    }
}
