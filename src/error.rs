use crate::{database::MerchantDBError, email_client::EmailClientError, utils::error_chain_fmt};

// 서버를 구성하고 구동할 때 발생하는 오류를 모으는 래퍼 타입
// 요청 처리 중의 오류는 `routes::ApiError`로 다룬다.
#[derive(thiserror::Error)]
pub enum BackofficeError {
    #[error("IO Error")]
    IOError(#[from] std::io::Error),

    #[error("Config Error")]
    ConfigError(#[from] config::ConfigError),

    #[error("Database Error")]
    DatabaseError(#[from] MerchantDBError),

    #[error("Email Client Error")]
    EmailClientError(#[from] EmailClientError),

    #[error("Session Key Error: {0}")]
    SessionKeyError(String),

    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for BackofficeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
