use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;

use crate::{
    authentication::AuthError, domain::DomainError, merchant::ProfileError,
    utils::error_chain_fmt,
};

/// 핸들러가 반환하는 오류.
/// 모든 오류는 `{"error": {"kind", "message"}}` 형태의 본문으로 응답한다.
#[derive(thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    InvalidInput(#[from] DomainError),
    #[error("Authentication required.")]
    Unauthenticated,
    #[error("Something went wrong.")]
    Unexpected(#[source] anyhow::Error),
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(serde::Serialize)]
struct ErrorDetail {
    kind: &'static str,
    message: String,
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Auth(e) => match e {
                AuthError::DuplicateEmail => "duplicate_email",
                AuthError::WeakCredential(_) => "weak_credential",
                AuthError::InvalidCredentials => "invalid_credentials",
                AuthError::AccountNotVerified => "account_not_verified",
                AuthError::AccountSuspended => "account_suspended",
                AuthError::TokenNotFound => "token_not_found",
                AuthError::TokenExpired => "token_expired",
                AuthError::TokenAlreadyUsed => "token_already_used",
                AuthError::NotFound => "not_found",
                AuthError::MailDispatchFailed(_) => "mail_dispatch_failed",
                AuthError::StorageFailure(_) => "storage_failure",
                AuthError::UnexpectedError(_) => "unexpected",
            },
            ApiError::Profile(e) => match e {
                ProfileError::NotFound => "not_found",
                ProfileError::AccountNotActive => "account_not_active",
                ProfileError::StorageFailure(_) => "storage_failure",
                ProfileError::UnexpectedError(_) => "unexpected",
            },
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::Unexpected(_) => "unexpected",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            "duplicate_email" | "token_already_used" => StatusCode::CONFLICT,
            "weak_credential" | "invalid_input" => StatusCode::BAD_REQUEST,
            "invalid_credentials" | "unauthenticated" => StatusCode::UNAUTHORIZED,
            "account_not_verified" | "account_suspended" | "account_not_active" => {
                StatusCode::FORBIDDEN
            }
            "token_not_found" | "not_found" => StatusCode::NOT_FOUND,
            "token_expired" => StatusCode::GONE,
            "mail_dispatch_failed" => StatusCode::BAD_GATEWAY,
            "storage_failure" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // 예상하지 못한 오류의 내부 메시지는 응답에 싣지 않는다.
    fn public_message(&self) -> String {
        match self.kind() {
            "unexpected" => "Something went wrong.".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::Span::current()
            .record("error", tracing::field::display(&self))
            .record("error_detail", tracing::field::debug(&self));

        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error.cause_chain = ?self, error.message = %self, "Request failed.");
        } else {
            tracing::warn!(error.kind = self.kind(), error.message = %self, "Request rejected.");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.kind(),
                message: self.public_message(),
            },
        };
        (status, Json(body)).into_response()
    }
}
