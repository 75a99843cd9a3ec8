use axum::{extract::State, response::IntoResponse, Json};
use secrecy::Secret;

use crate::{
    database::MerchantRepository,
    domain::{MerchantEmail, VerificationToken},
    email_client::MailSender,
    routes::ApiError,
    startup::AppState,
};

#[derive(serde::Deserialize)]
pub struct ForgotPasswordBody {
    email: String,
}

// 계정이 없어도 같은 응답을 보낸다.
#[tracing::instrument(
    name = "Forgot password",
    skip_all,
    fields(error = tracing::field::Empty, error_detail = tracing::field::Empty)
)]
pub async fn forgot_password<R, M>(
    State(state): State<AppState<R, M>>,
    Json(body): Json<ForgotPasswordBody>,
) -> Result<impl IntoResponse, ApiError>
where
    R: MerchantRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let email = MerchantEmail::try_from(body.email)?;
    state.auth.request_password_reset(email).await?;

    Ok(http::StatusCode::ACCEPTED)
}

#[derive(serde::Deserialize)]
pub struct ResetPasswordBody {
    token: String,
    new_password: Secret<String>,
}

#[tracing::instrument(
    name = "Reset password",
    skip_all,
    fields(error = tracing::field::Empty, error_detail = tracing::field::Empty)
)]
pub async fn reset_password<R, M>(
    State(state): State<AppState<R, M>>,
    Json(body): Json<ResetPasswordBody>,
) -> Result<impl IntoResponse, ApiError>
where
    R: MerchantRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    state
        .auth
        .reset_password(VerificationToken::from_raw(body.token), body.new_password)
        .await?;

    Ok(http::StatusCode::NO_CONTENT)
}
