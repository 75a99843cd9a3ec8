use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    database::MerchantRepository,
    domain::{AccountStatus, MerchantEmail, VerificationToken},
    email_client::MailSender,
    routes::ApiError,
    startup::AppState,
};

#[derive(serde::Deserialize)]
pub struct VerifyParameters {
    token: String,
}

#[derive(serde::Serialize)]
struct VerifyResponse {
    merchant_id: uuid::Uuid,
    status: AccountStatus,
}

// `curl -v 'http://127.0.0.1:8000/auth/verify?token=...'`
// => 200 OK 인증 완료
// => 404 토큰 없음, 410 만료, 409 이미 사용
#[tracing::instrument(
    name = "Verify a merchant email",
    skip_all,
    fields(error = tracing::field::Empty, error_detail = tracing::field::Empty)
)]
pub async fn verify_email<R, M>(
    State(state): State<AppState<R, M>>,
    Query(parameters): Query<VerifyParameters>,
) -> Result<impl IntoResponse, ApiError>
where
    R: MerchantRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let merchant_id = state
        .auth
        .verify_email(VerificationToken::from_raw(parameters.token))
        .await?;

    Ok(Json(VerifyResponse {
        merchant_id,
        status: AccountStatus::Active,
    }))
}

#[derive(serde::Deserialize)]
pub struct ResendBody {
    email: String,
}

#[tracing::instrument(
    name = "Resend a verification email",
    skip_all,
    fields(error = tracing::field::Empty, error_detail = tracing::field::Empty)
)]
pub async fn resend_verification<R, M>(
    State(state): State<AppState<R, M>>,
    Json(body): Json<ResendBody>,
) -> Result<impl IntoResponse, ApiError>
where
    R: MerchantRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let email = MerchantEmail::try_from(body.email)?;
    state.auth.resend_verification(email).await?;

    Ok(http::StatusCode::ACCEPTED)
}
