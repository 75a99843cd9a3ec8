use crate::{database::MerchantDBError, email_client::EmailClientError, utils::error_chain_fmt};

#[derive(thiserror::Error)]
pub enum AuthError {
    #[error("The email address is already registered.")]
    DuplicateEmail,
    #[error("{0}")]
    WeakCredential(String),
    // 알 수 없는 이메일과 틀린 비밀번호를 구분하지 않는다.
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("The account has not been verified yet.")]
    AccountNotVerified,
    #[error("The account has been suspended.")]
    AccountSuspended,
    #[error("The link is invalid.")]
    TokenNotFound,
    #[error("The link has expired.")]
    TokenExpired,
    #[error("The link has already been used.")]
    TokenAlreadyUsed,
    #[error("The merchant account was not found.")]
    NotFound,
    #[error("Failed to send an email.")]
    MailDispatchFailed(#[source] EmailClientError),
    #[error("Storage failure. Please retry.")]
    StorageFailure(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

// 저장소 실패를 성공으로 바꾸지 않는다.
impl From<MerchantDBError> for AuthError {
    fn from(e: MerchantDBError) -> Self {
        match e {
            MerchantDBError::NotFound => AuthError::NotFound,
            MerchantDBError::DuplicateEmail => AuthError::DuplicateEmail,
            MerchantDBError::StorageFailure(e) => AuthError::StorageFailure(e),
            e @ MerchantDBError::CorruptedRecord(_) => AuthError::UnexpectedError(e.into()),
        }
    }
}

impl From<EmailClientError> for AuthError {
    fn from(e: EmailClientError) -> Self {
        AuthError::MailDispatchFailed(e)
    }
}
